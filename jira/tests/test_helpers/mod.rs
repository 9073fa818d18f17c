pub mod jira_client;
