use jira::builder::JiraEnvVars;
use jira::{Credentials, Jira};

/// Creates a client for the Jira instance used for integration testing.
///
/// The credentials are taken from the very same environment variables the
/// dashboard server uses.
#[cfg(test)]
pub fn create_jira_client() -> Jira {
    let (host, user, token) = get_jira_params();
    Jira::new(&host, Credentials::Basic(user, token)).expect("Error initializing jira client")
}

fn get_env(name: &str, example: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| {
        panic!("Environment variable {name} not set. Set it to something like '{example}'")
    })
}

pub(crate) fn get_jira_host() -> String {
    get_env(JiraEnvVars::HOST, "https://norn.atlassian.net")
}

pub(crate) fn get_jira_user() -> String {
    get_env(JiraEnvVars::USER, "user@domain.com")
}

pub(crate) fn get_jira_token() -> String {
    get_env(JiraEnvVars::TOKEN, "secret")
}

/// Convenience function to obtain all the jira parameters required, in one go
pub(crate) fn get_jira_params() -> (String, String, String) {
    (get_jira_host(), get_jira_user(), get_jira_token())
}
