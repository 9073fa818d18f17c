use crate::error::WorklogError;
use crate::types::Assignee;

/// All operations on the roster of tracked assignees.
///
/// Records are keyed by `assignee_id`. Removal never deletes anything, it marks
/// the record as inactive.
pub trait AssigneeRepository: Send + Sync {
    /// Active assignees, in insertion order
    ///
    /// # Errors
    /// If the underlying store fails
    fn find_active(&self) -> Result<Vec<Assignee>, WorklogError>;

    /// Retrieves an assignee regardless of whether it is active or not
    ///
    /// # Errors
    /// If the underlying store fails
    fn find_by_assignee_id(&self, assignee_id: &str) -> Result<Option<Assignee>, WorklogError>;

    /// Stores a new assignee. An inactive record with the same identifier is replaced.
    ///
    /// # Errors
    /// * `WorklogError::DuplicateAssignee` if an active record exists
    fn add(&self, assignee: &Assignee) -> Result<Assignee, WorklogError>;

    /// Stores the assignee unless the identifier is already known.
    /// Returns `true` if it was inserted.
    ///
    /// # Errors
    /// If the underlying store fails
    fn insert_if_absent(&self, assignee: &Assignee) -> Result<bool, WorklogError>;

    /// Marks a user-added assignee as inactive. Pre-configured and unknown
    /// identifiers are left alone. Returns `true` if a record was changed.
    ///
    /// # Errors
    /// If the underlying store fails
    fn soft_remove(&self, assignee_id: &str) -> Result<bool, WorklogError>;

    /// Updates the name and email retrieved from Jira
    ///
    /// # Errors
    /// * `WorklogError::AssigneeNotFound` if the identifier is unknown
    fn update_info(
        &self,
        assignee_id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Assignee, WorklogError>;
}
