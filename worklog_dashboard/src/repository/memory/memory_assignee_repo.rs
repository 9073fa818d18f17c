use super::{read, write};
use crate::error::WorklogError;
use crate::repository::assignee_repository::AssigneeRepository;
use crate::types::Assignee;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryAssigneeRepository {
    assignees: RwLock<Vec<Assignee>>,
}

impl MemoryAssigneeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssigneeRepository for MemoryAssigneeRepository {
    fn find_active(&self) -> Result<Vec<Assignee>, WorklogError> {
        Ok(read(&self.assignees)?
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect())
    }

    fn find_by_assignee_id(&self, assignee_id: &str) -> Result<Option<Assignee>, WorklogError> {
        Ok(read(&self.assignees)?
            .iter()
            .find(|a| a.assignee_id == assignee_id)
            .cloned())
    }

    fn add(&self, assignee: &Assignee) -> Result<Assignee, WorklogError> {
        let mut assignees = write(&self.assignees)?;
        match assignees
            .iter_mut()
            .find(|a| a.assignee_id == assignee.assignee_id)
        {
            Some(existing) if existing.is_active => {
                return Err(WorklogError::DuplicateAssignee(assignee.assignee_id.clone()))
            }
            // Inactive record keeps its position but is otherwise replaced
            Some(existing) => *existing = assignee.clone(),
            None => assignees.push(assignee.clone()),
        }
        Ok(assignee.clone())
    }

    fn insert_if_absent(&self, assignee: &Assignee) -> Result<bool, WorklogError> {
        let mut assignees = write(&self.assignees)?;
        if assignees
            .iter()
            .any(|a| a.assignee_id == assignee.assignee_id)
        {
            return Ok(false);
        }
        assignees.push(assignee.clone());
        Ok(true)
    }

    fn soft_remove(&self, assignee_id: &str) -> Result<bool, WorklogError> {
        let mut assignees = write(&self.assignees)?;
        match assignees
            .iter_mut()
            .find(|a| a.assignee_id == assignee_id && !a.is_preconfigured && a.is_active)
        {
            Some(assignee) => {
                assignee.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update_info(
        &self,
        assignee_id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Assignee, WorklogError> {
        let mut assignees = write(&self.assignees)?;
        let assignee = assignees
            .iter_mut()
            .find(|a| a.assignee_id == assignee_id)
            .ok_or_else(|| WorklogError::AssigneeNotFound(assignee_id.to_string()))?;
        assignee.name = name.map(ToString::to_string);
        assignee.email = email.map(ToString::to_string);
        Ok(assignee.clone())
    }
}
