use super::core::Author;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct WorklogsPage {
    #[serde(alias = "startAt", default)]
    pub start_at: usize,
    #[serde(alias = "maxResults", default)]
    pub max_results: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
}

/// A single worklog item of an issue.
///
/// The comment is deliberately left out, version 3 of the REST API returns it as an
/// Atlassian Document, which we have no use for.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Worklog {
    pub id: String,
    pub author: Author,
    #[serde(deserialize_with = "jira_timestamp::deserialize")]
    pub started: DateTime<Utc>,
    #[serde(alias = "timeSpentSeconds")]
    pub time_spent_seconds: i64,
    /// Numeric FK to issue
    #[serde(alias = "issueId", default)]
    pub issue_id: String,
}

/// Jira formats timestamps like `2024-01-10T09:00:00.000+0000`, i.e. without the colon
/// in the offset, which is not valid RFC 3339.
pub mod jira_timestamp {
    use chrono::{DateTime, ParseResult, Utc};
    use serde::{de, Deserialize, Deserializer};

    #[allow(clippy::missing_errors_doc)]
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(de::Error::custom)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn parse(s: &str) -> ParseResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .map(|dt| dt.with_timezone(&Utc))
    }

}
