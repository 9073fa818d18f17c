use crate::config::{AssigneesConfig, PreconfiguredAssignee};
use crate::error::WorklogError;
use crate::repository::assignee_repository::AssigneeRepository;
use crate::types::{Assignee, NewAssignee};
use log::{debug, info};
use std::sync::Arc;

/// Business rules of the assignee roster on top of the repository
pub struct AssigneeService {
    repo: Arc<dyn AssigneeRepository>,
    denylist: Vec<String>,
    denied_message: String,
}

impl AssigneeService {
    pub fn new(repo: Arc<dyn AssigneeRepository>, cfg: &AssigneesConfig) -> Self {
        Self {
            repo,
            denylist: cfg.denylist.iter().map(|id| id.trim().to_string()).collect(),
            denied_message: cfg.denied_message.clone(),
        }
    }

    /// Inserts the pre-configured roster. Identifiers already present are left as they are.
    ///
    /// # Errors
    /// If the repository fails
    pub fn seed(&self, roster: &[PreconfiguredAssignee]) -> Result<usize, WorklogError> {
        let mut inserted = 0;
        for entry in roster {
            let assignee = Assignee::preconfigured(entry.assignee_id.trim(), entry.group.clone());
            if self.repo.insert_if_absent(&assignee)? {
                inserted += 1;
            }
        }
        info!("Seeded {inserted} of {} pre-configured assignees", roster.len());
        Ok(inserted)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn find_active(&self) -> Result<Vec<Assignee>, WorklogError> {
        self.repo.find_active()
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn find(&self, assignee_id: &str) -> Result<Option<Assignee>, WorklogError> {
        self.repo.find_by_assignee_id(assignee_id)
    }

    /// Adds an assignee to the roster
    ///
    /// # Errors
    /// * `WorklogError::BadInput` if the identifier is blank
    /// * `WorklogError::AssigneeDenied` if the identifier is in the deny list
    /// * `WorklogError::DuplicateAssignee` if an active assignee with the same identifier exists
    pub fn add(&self, new: &NewAssignee) -> Result<Assignee, WorklogError> {
        let assignee_id = new.assignee_id.trim();
        if assignee_id.is_empty() {
            return Err(WorklogError::BadInput("assigneeId is required".to_string()));
        }
        if self.denylist.iter().any(|denied| denied == assignee_id) {
            debug!("Refusing to add denied assignee {assignee_id}");
            return Err(WorklogError::AssigneeDenied {
                assignee_id: assignee_id.to_string(),
                message: self.denied_message.clone(),
            });
        }
        if let Some(existing) = self.repo.find_by_assignee_id(assignee_id)? {
            if existing.is_active {
                return Err(WorklogError::DuplicateAssignee(assignee_id.to_string()));
            }
        }
        let added = self.repo.add(&Assignee::from_new(new))?;
        info!("Added assignee {}", added.assignee_id);
        Ok(added)
    }

    /// Deactivates a user-added assignee. Returns `true` if anything changed.
    ///
    /// # Errors
    /// If the repository fails
    pub fn remove(&self, assignee_id: &str) -> Result<bool, WorklogError> {
        let removed = self.repo.soft_remove(assignee_id.trim())?;
        if removed {
            info!("Removed assignee {assignee_id}");
        } else {
            debug!("Nothing removed for {assignee_id}, unknown or pre-configured");
        }
        Ok(removed)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn update_info(
        &self,
        assignee_id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Assignee, WorklogError> {
        self.repo.update_info(assignee_id, name, email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::database_manager::{DatabaseConfig, DatabaseManager};

    fn service() -> AssigneeService {
        let manager = DatabaseManager::new(&DatabaseConfig::Memory).unwrap();
        AssigneeService::new(manager.create_assignee_repository(), &AssigneesConfig::default())
    }

    #[test]
    fn seeding_twice_inserts_once() -> Result<(), WorklogError> {
        let service = service();
        let roster = AssigneesConfig::default().preconfigured;
        assert_eq!(service.seed(&roster)?, 23);
        assert_eq!(service.seed(&roster)?, 0);
        let active = service.find_active()?;
        assert_eq!(active.len(), 23);
        assert!(active.iter().all(|a| a.is_preconfigured && a.is_active));
        assert_eq!(active[0].id, "preconfigured-6310531bea661fd37d4f042a");
        Ok(())
    }

    #[test]
    fn denied_identifier_is_rejected_with_message() {
        let result = service().add(&NewAssignee::with_id(
            "712020:021cc494-3a62-45a8-bd3d-db7e0a9dd057",
        ));
        match result {
            Err(e @ WorklogError::AssigneeDenied { .. }) => assert_eq!(
                e.to_string(),
                "Cannot add this assignee, please check their worklog manually"
            ),
            other => panic!("Expected a denial, got {other:?}"),
        }
    }

    #[test]
    fn blank_identifier_is_rejected() {
        assert!(matches!(
            service().add(&NewAssignee::with_id("   ")),
            Err(WorklogError::BadInput(_))
        ));
    }

    #[test]
    fn duplicate_is_rejected() -> Result<(), WorklogError> {
        let service = service();
        service.add(&NewAssignee::with_id("abc"))?;
        let err = service.add(&NewAssignee::with_id("abc")).unwrap_err();
        assert_eq!(err.to_string(), "Assignee already exists");
        Ok(())
    }

    #[test]
    fn removed_assignee_can_be_added_again() -> Result<(), WorklogError> {
        let service = service();
        service.add(&NewAssignee::with_id("abc"))?;
        assert!(service.remove("abc")?);
        assert!(service.find_active()?.is_empty());
        assert!(!service.find("abc")?.unwrap().is_active);
        service.add(&NewAssignee::with_id("abc"))?;
        assert_eq!(service.find_active()?.len(), 1);
        Ok(())
    }

    #[test]
    fn preconfigured_assignee_is_not_removed() -> Result<(), WorklogError> {
        let service = service();
        service.seed(&AssigneesConfig::default().preconfigured)?;
        assert!(!service.remove("6310531bea661fd37d4f042a")?);
        assert_eq!(service.find_active()?.len(), 23);
        Ok(())
    }
}
