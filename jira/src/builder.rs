//!
//! ```rust,ignore
//! // 1. Using the builder with explicit configuration
//! let jira = Jira::builder()
//!     .host("https://your-jira.atlassian.net")
//!     .basic_auth("username@example.com", "your_api_token")
//!     .timeout(30)
//!     .build()?;
//!
//! // 2. Using environment variables
//! let jira = Jira::builder()
//!     .from_env()
//!     .timeout(30)
//!     .build()?;
//! ```
use crate::config::JiraClientConfiguration;
use crate::{Credentials, Jira};
use log::debug;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Error type for `JiraBuilder` operations
#[derive(Error, Debug)]
pub enum JiraBuilderError {
    #[error("Environment variable {0} not set")]
    EnvVarNotSet(String),

    #[error("URL parsing error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Jira client initialization error: {0}")]
    ClientInitError(String),

    #[error("Timeout must be positive")]
    InvalidTimeout,
}

/// Names of the environment variables holding the Jira configuration
pub struct JiraEnvVars;

impl JiraEnvVars {
    pub const HOST: &'static str = "JIRA_URL";
    pub const USER: &'static str = "JIRA_USER_EMAIL";
    pub const TOKEN: &'static str = "JIRA_API_TOKEN";
}

pub const DEFAULT_API_VERSION: &str = "3";

/// Builder for creating Jira client instances with flexible configuration options
#[derive(Default)]
pub struct JiraBuilder {
    host: Option<String>,
    api_version: Option<String>,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
}

impl JiraBuilder {
    /// Creates a new `JiraBuilder` with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Jira host URL
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the API version (default is "3")
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets basic authentication credentials
    #[must_use]
    pub fn basic_auth(mut self, username: impl Into<String>, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Basic(username.into(), token.into()));
        self
    }

    /// Sets a timeout applied to every request
    #[must_use]
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(Duration::from_secs(seconds));
        self
    }

    /// Takes host and credentials from a client configuration
    #[must_use]
    pub fn from_config(self, cfg: &JiraClientConfiguration) -> Self {
        self.host(cfg.jira_url.clone())
            .basic_auth(cfg.user.clone(), cfg.token.clone())
    }

    /// Attempts to load configuration from environment variables
    #[must_use]
    pub fn from_env(self) -> Self {
        match JiraClientConfiguration::from_env() {
            Some(cfg) => self.from_config(&cfg),
            None => self,
        }
    }

    /// Builds a Jira client instance with the configured parameters
    ///
    /// # Errors
    /// If the host or the credentials are missing, the host is not a valid url or the
    /// timeout is zero.
    pub fn build(self) -> Result<Jira, JiraBuilderError> {
        let host = self
            .host
            .ok_or_else(|| JiraBuilderError::EnvVarNotSet(JiraEnvVars::HOST.to_string()))?;

        let credentials = self.credentials.ok_or_else(|| {
            JiraBuilderError::EnvVarNotSet(format!("{} and {}", JiraEnvVars::USER, JiraEnvVars::TOKEN))
        })?;

        let api_version = self
            .api_version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let host_url = Jira::parse_host(&host).map_err(|e| match e {
            crate::JiraError::ParseError(e) => JiraBuilderError::UrlParseError(e),
            other => JiraBuilderError::ClientInitError(other.to_string()),
        })?;

        let mut client_builder = Client::builder();
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(JiraBuilderError::InvalidTimeout);
            }
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| JiraBuilderError::ClientInitError(e.to_string()))?;

        let jira = Jira {
            host: host_url,
            api: Jira::api_prefix(&api_version),
            credentials,
            client,
        };
        debug!("Created Jira client: {:?}", jira);

        Ok(jira)
    }
}

impl Jira {
    /// Create a Jira client builder
    #[must_use]
    pub fn builder() -> JiraBuilder {
        JiraBuilder::new()
    }
}
