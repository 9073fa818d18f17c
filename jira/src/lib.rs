//!
//! `jira` is a collection of useful functions when interacting with
//! Jira using the official REST interface.
//!
//! The types have been declared specifically for the purpose of collecting daily
//! work logs for a roster of users, and are hence not generic.
use std::{
    collections::BTreeMap,
    error::Error,
    fmt::{self, Formatter},
};

use builder::DEFAULT_API_VERSION;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use models::{
    issue::{Issue, IssuesPage},
    user::User,
    worklog::{Worklog, WorklogsPage},
};
use reqwest::{
    header::ACCEPT,
    Client, RequestBuilder, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::{ParseError, Url};

pub mod builder;
pub mod config;
pub mod models;

type Result<T> = std::result::Result<T, JiraError>;

/// Fields requested when searching for issues, nothing else is needed for the dashboard
const ISSUE_FIELDS: &str = "summary,status,assignee";
const SEARCH_PAGE_SIZE: i32 = 100;
const WORKLOG_PAGE_SIZE: usize = 1000;

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Errors {
    #[serde(rename = "errorMessages", default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug)]
pub enum JiraError {
    Unauthorized,
    MethodNotAllowed,
    NotFound(String),
    Fault { code: StatusCode, errors: Errors },
    RequiredParameter(String),
    RequestError(reqwest::Error),
    SerializationError(serde_json::error::Error),
    ParseError(ParseError),
    UnexpectedStatus(StatusCode),
}

#[allow(clippy::enum_glob_use)]
impl fmt::Display for JiraError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use crate::JiraError::*;

        match self {
            RequiredParameter(param_name) => write!(f, "Parameter '{param_name}' must contain a value"),
            RequestError(e) => write!(f, "Internal error in reqwest library: {e}"),
            ParseError(e) => write!(f, "Could not connect to Jira: {e:?}!"),
            SerializationError(e) => write!(f, "Could not serialize/deserialize: {e:?}!"),
            Fault {
                ref code,
                ref errors,
            } => write!(f, "Jira Client Error ({code}): {:?} {:?}", errors.error_messages, errors.errors),
            Unauthorized => write!(f, "Jira rejected the credentials (401 Unauthorized)"),
            MethodNotAllowed => write!(f, "Method not allowed"),
            NotFound(url) => write!(f, "Not found: '{url}'"),
            UnexpectedStatus(code) => write!(f, "Unexpected response status from Jira: {code}"),
        }
    }
}

impl Error for JiraError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            JiraError::RequestError(e) => Some(e),
            JiraError::SerializationError(e) => Some(e),
            JiraError::ParseError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for JiraError {
    fn from(error: ParseError) -> JiraError {
        JiraError::ParseError(error)
    }
}

impl From<reqwest::Error> for JiraError {
    fn from(error: reqwest::Error) -> JiraError {
        JiraError::RequestError(error)
    }
}

impl From<serde_json::error::Error> for JiraError {
    fn from(error: serde_json::error::Error) -> JiraError {
        JiraError::SerializationError(error)
    }
}

/// Jira Cloud only accepts an e-mail address and an API token
#[derive(Clone)]
pub enum Credentials {
    Basic(String, String),
}

impl Credentials {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Basic(user, token) => request.basic_auth(user, Some(token)),
        }
    }
}

// Never let the secrets end up in a log file
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic(user, _) => write!(f, "Basic({user}, ***)"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Jira {
    host: Url,
    /// Path prefix of the REST resources, i.e. `rest/api/3/`
    api: String,
    credentials: Credentials,
    pub client: Client,
}

impl Jira {
    #[allow(clippy::missing_errors_doc)]
    pub fn new<H>(host: H, credentials: Credentials) -> Result<Jira>
    where
        H: Into<String>,
    {
        Ok(Jira {
            host: Self::parse_host(&host.into())?,
            api: Self::api_prefix(DEFAULT_API_VERSION),
            client: Client::new(),
            credentials,
        })
    }

    /// Parses the host url, making sure the path ends with a `/` so that
    /// the REST resources are resolved below it rather than replacing the last segment.
    pub(crate) fn parse_host(host: &str) -> Result<Url> {
        let mut url = Url::parse(host)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub(crate) fn api_prefix(api_version: &str) -> String {
        format!("rest/api/{api_version}/")
    }

    /// GETs a REST resource below the api prefix and deserializes the JSON response
    #[allow(clippy::missing_errors_doc)]
    pub async fn get<D>(&self, endpoint: &str) -> Result<D>
    where
        D: DeserializeOwned,
    {
        let url = self
            .host
            .join(&format!("{}{}", self.api, endpoint.trim_start_matches('/')))?;

        let request = self
            .credentials
            .apply(self.client.get(url.clone()).header(ACCEPT, "application/json"));
        debug!("request '{:?}'", request);

        let response = request.send().await?;

        let status = response.status();
        let body = &response.text().await?;
        debug!("status {:?} body '{:?}'", status, body);
        match status {
            StatusCode::UNAUTHORIZED => Err(JiraError::Unauthorized),
            StatusCode::METHOD_NOT_ALLOWED => Err(JiraError::MethodNotAllowed),
            StatusCode::NOT_FOUND => Err(JiraError::NotFound(url.to_string())),
            client_err if client_err.is_client_error() => Err(JiraError::Fault {
                code: status,
                errors: serde_json::from_str::<Errors>(body).unwrap_or_else(|_| Errors {
                    error_messages: vec![body.clone()],
                    errors: BTreeMap::new(),
                }),
            }),
            server_err if server_err.is_server_error() => Err(JiraError::UnexpectedStatus(status)),
            _ => {
                let data = if body.is_empty() { "null" } else { body };
                Ok(serde_json::from_str::<D>(data)?)
            }
        }
    }

    /// Retrieves the user owning the credentials, handy for verifying that the
    /// credentials are accepted by Jira.
    #[allow(clippy::missing_errors_doc)]
    pub async fn get_current_user(&self) -> Result<User> {
        self.get::<User>("/myself").await
    }

    /// Looks up a user by the Atlassian account id
    #[allow(clippy::missing_errors_doc)]
    pub async fn get_user(&self, account_id: &str) -> Result<User> {
        if account_id.trim().is_empty() {
            return Err(JiraError::RequiredParameter("account_id".to_string()));
        }
        let resource = format!("/user?accountId={}", urlencoding::encode(account_id));
        self.get::<User>(&resource).await
    }

    /// Finds all the issues assigned to `assignee_id` having work logged on `worklog_date`.
    ///
    /// Jira matches `worklogDate` against worklogs of any author, the caller is
    /// expected to filter the worklogs of each issue.
    #[allow(
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::missing_errors_doc
    )]
    pub async fn search_issues_with_worklogs_on(
        &self,
        assignee_id: &str,
        worklog_date: NaiveDate,
    ) -> Result<Vec<Issue>> {
        if assignee_id.trim().is_empty() {
            return Err(JiraError::RequiredParameter("assignee_id".to_string()));
        }
        let mut resource = Self::compose_search_resource(assignee_id, worklog_date, 0, SEARCH_PAGE_SIZE);

        let mut issues = Vec::<Issue>::new();
        loop {
            let mut issue_page = self.get::<IssuesPage>(&resource).await?;

            let fetched = issue_page.start_at + issue_page.issues.len() as i32;
            // issues.len() will be invalid once we move the contents of the issues into our result
            let is_last_page = issue_page.issues.is_empty()
                || issue_page.issues.len() < issue_page.max_results as usize
                || issue_page.total.is_some_and(|total| fetched >= total);
            if !is_last_page {
                resource = Self::compose_search_resource(
                    assignee_id,
                    worklog_date,
                    fetched,
                    issue_page.max_results,
                );
            }
            issues.append(&mut issue_page.issues);
            if is_last_page {
                break;
            }
        }
        debug!(
            "Found {} issues for {} with work logged on {}",
            issues.len(),
            assignee_id,
            worklog_date
        );
        Ok(issues)
    }

    /// Retrieves all the worklogs of an issue, optionally only those started after the
    /// supplied point in time.
    #[allow(clippy::missing_errors_doc)]
    pub async fn get_worklogs_for(
        &self,
        issue_key: &str,
        started_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Worklog>> {
        if issue_key.trim().is_empty() {
            return Err(JiraError::RequiredParameter("issue_key".to_string()));
        }
        let mut resource_name =
            Self::compose_worklogs_url(issue_key, 0, WORKLOG_PAGE_SIZE, started_after);
        let mut worklogs: Vec<Worklog> = Vec::<Worklog>::new();

        debug!("Retrieving worklogs for {}", issue_key);
        loop {
            let mut worklog_page = self.get::<WorklogsPage>(&resource_name).await?;
            let fetched = worklog_page.start_at + worklog_page.worklogs.len();
            let is_last_page = worklog_page.worklogs.is_empty()
                || worklog_page.worklogs.len() < worklog_page.max_results
                || fetched >= worklog_page.total;
            if !is_last_page {
                resource_name = Self::compose_worklogs_url(
                    issue_key,
                    fetched,
                    worklog_page.max_results,
                    started_after,
                );
            }
            worklogs.append(&mut worklog_page.worklogs);
            if is_last_page {
                break;
            }
        }
        Ok(worklogs)
    }

    // -----------------------
    // Static methods

    /// Composes the JQL search resource. The account id is quoted as Atlassian account ids
    /// may contain `:` which is a reserved character in JQL.
    fn compose_search_resource(
        assignee_id: &str,
        worklog_date: NaiveDate,
        start_at: i32,
        max_results: i32,
    ) -> String {
        let jql = format!(
            "worklogDate = '{}' AND assignee = \"{}\"",
            worklog_date.format("%Y-%m-%d"),
            assignee_id.replace('"', "\\\"")
        );
        format!(
            "/search?jql={}&startAt={}&maxResults={}&fields={}",
            urlencoding::encode(&jql),
            start_at,
            max_results,
            ISSUE_FIELDS
        )
    }

    fn compose_worklogs_url(
        issue_key: &str,
        start_at: usize,
        max_results: usize,
        started_after: Option<DateTime<Utc>>,
    ) -> String {
        let mut resource = format!(
            "/issue/{}/worklog?startAt={}&maxResults={}",
            urlencoding::encode(issue_key),
            start_at,
            max_results
        );
        if let Some(started_after) = started_after {
            resource.push_str(&format!("&startedAfter={}", started_after.timestamp_millis()));
        }
        resource
    }
}
