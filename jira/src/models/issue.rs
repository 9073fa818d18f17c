use super::core::{Fields, IssueKey};
use serde::{Deserialize, Serialize};

/// Represents a page of Jira issues retrieved from Jira
#[derive(Debug, Deserialize, Serialize)]
pub struct IssuesPage {
    #[serde(alias = "startAt", default)]
    pub start_at: i32,
    #[serde(alias = "maxResults", default)]
    pub max_results: i32,
    pub total: Option<i32>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// Represents a jira issue
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct Issue {
    /// Numeric id of the jira issue
    pub id: String,
    #[serde(alias = "self", default)]
    pub self_url: String,
    /// The key of the jira issue, typically used and referenced by the user.
    pub key: IssueKey,

    #[serde(default)]
    pub fields: Fields,
}
