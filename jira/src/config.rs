use std::env;
use std::fmt::{self, Formatter};

use crate::builder::JiraEnvVars;

/// The parameters needed to connect to Jira.
///
/// These are only ever supplied through the process environment, they are never
/// written to disk nor exposed through any API.
#[derive(PartialEq, Clone)]
pub struct JiraClientConfiguration {
    pub jira_url: String,
    pub user: String,
    pub token: String,
}

impl JiraClientConfiguration {
    /// Reads `JIRA_URL`, `JIRA_USER_EMAIL` and `JIRA_API_TOKEN` from the environment.
    /// Returns `None` if any of them is missing or blank.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`JiraClientConfiguration::from_env`], but with a pluggable lookup
    /// so that it can be tested without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Some(JiraClientConfiguration {
            jira_url: value(JiraEnvVars::HOST)?,
            user: value(JiraEnvVars::USER)?,
            token: value(JiraEnvVars::TOKEN)?,
        })
    }
}

impl fmt::Debug for JiraClientConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraClientConfiguration")
            .field("jira_url", &self.jira_url)
            .field("user", &self.user)
            .field("token", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn all_variables_present() {
        let cfg = JiraClientConfiguration::from_lookup(lookup_from(&[
            ("JIRA_URL", "https://norn.atlassian.net"),
            ("JIRA_USER_EMAIL", "someone@norn.com"),
            ("JIRA_API_TOKEN", "abc123"),
        ]))
        .expect("configuration should be complete");
        assert_eq!(cfg.user, "someone@norn.com");
        assert_eq!(cfg.token, "abc123");
        assert!(!format!("{cfg:?}").contains("abc123"));
    }

    #[test]
    fn blank_variable_means_not_configured() {
        let cfg = JiraClientConfiguration::from_lookup(lookup_from(&[
            ("JIRA_URL", "https://norn.atlassian.net"),
            ("JIRA_USER_EMAIL", "  "),
            ("JIRA_API_TOKEN", "abc123"),
        ]));
        assert!(cfg.is_none());
    }
}
