use crate::date;
use crate::error::WorklogError;
use chrono::NaiveTime;
use chrono_tz::Tz;
use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Environment variable holding the path to the configuration file
pub const CONFIG_ENV_VAR: &str = "WORKLOG_DASHBOARD_CONFIG";

pub const DEFAULT_DENIED_MESSAGE: &str =
    "Cannot add this assignee, please check their worklog manually";

/// Application configuration struct.
/// Every section is optional, a missing file gives the defaults. The Jira
/// credentials are never part of this, they are read from the environment.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(default)]
pub struct AppConfiguration {
    pub server: ServerConfig,
    pub schedule: ScheduleConfig,
    pub jira: JiraConfig,
    pub storage: StorageConfig,
    pub assignees: AssigneesConfig,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0:5000".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Wall clock time of the daily run, `HH:MM`
    pub time: String,
    /// IANA time zone the daily run and the worklog dates are evaluated in
    pub timezone: String,
    pub enabled: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            time: "09:00".to_string(),
            timezone: "UTC".to_string(),
            enabled: true,
        }
    }
}

impl ScheduleConfig {
    #[allow(clippy::missing_errors_doc)]
    pub fn time_of_day(&self) -> Result<NaiveTime, WorklogError> {
        date::parse_time_of_day(&self.time).map_err(|e| WorklogError::InvalidConfig(e.to_string()))
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn time_zone(&self) -> Result<Tz, WorklogError> {
        date::parse_time_zone(&self.timezone)
            .map_err(|e| WorklogError::InvalidConfig(e.to_string()))
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct JiraConfig {
    /// Timeout in seconds for every request sent to Jira
    pub timeout_secs: u64,
    pub api_version: String,
}

impl Default for JiraConfig {
    fn default() -> Self {
        JiraConfig {
            timeout_secs: 30,
            api_version: jira::builder::DEFAULT_API_VERSION.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub kind: StorageKind,
    /// Sqlite database file, defaults to a file in the platform data directory
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Path of the Sqlite database file
    #[allow(clippy::missing_errors_doc)]
    pub fn sqlite_path(&self) -> Result<PathBuf, WorklogError> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => database_file().ok_or_else(|| {
                WorklogError::InvalidConfig(
                    "Unable to determine a location for the database, set [storage] path"
                        .to_string(),
                )
            }),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct PreconfiguredAssignee {
    pub assignee_id: String,
    #[serde(default)]
    pub group: Option<String>,
}

impl PreconfiguredAssignee {
    fn new(assignee_id: &str, group: &str) -> Self {
        PreconfiguredAssignee {
            assignee_id: assignee_id.to_string(),
            group: Some(group.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct AssigneesConfig {
    /// Identifiers which can not be added
    pub denylist: Vec<String>,
    /// Message returned when a denied identifier is added
    pub denied_message: String,
    /// The roster seeded into the assignee store at start up
    pub preconfigured: Vec<PreconfiguredAssignee>,
}

impl Default for AssigneesConfig {
    fn default() -> Self {
        AssigneesConfig {
            denylist: vec!["712020:021cc494-3a62-45a8-bd3d-db7e0a9dd057".to_string()],
            denied_message: DEFAULT_DENIED_MESSAGE.to_string(),
            preconfigured: default_roster(),
        }
    }
}

fn default_roster() -> Vec<PreconfiguredAssignee> {
    const PJ: [&str; 6] = [
        "6310531bea661fd37d4f042a",
        "6172d230bcb57400683c2b26",
        "712020:310bd121-4bb2-4f01-8b57-714904f5173b",
        "712020:5250aaaa-d837-4a01-b4de-02c39ab1d798",
        "712020:e3b7ede2-e7a1-49f9-b0f0-936feef4e3a7",
        "712020:02822ff5-fc9b-44cf-b689-23f485aa21e7",
    ];
    const AG: [&str; 7] = [
        "5fcde79ffee793007501bfd0",
        "712020:41db7dd0-6a8f-4cb2-b2f7-eb561d8c7ad4",
        "63f328c0e2c4c692c976d233",
        "712020:8a12e762-834f-4275-978d-abfc6c054b91",
        "712020:91daf228-75c7-4065-83a4-868cc5c38db5",
        "712020:40f4f0e6-1ff5-41b4-a503-056203b8bd3f",
        "712020:7666dbdf-2547-4378-ad51-49d1e1ae0404",
    ];
    const LOS: [&str; 10] = [
        "5e6b6d87fb668c0ce7ae3d9c",
        "5e33e03a9029c30ca0bcb575",
        "63f328c04c355259db9bcb77",
        "712020:26e66222-0759-4f5c-9f50-2ec08dc0a2ef",
        "712020:57691069-7afa-4907-9dca-fc5607364cf5",
        "62c7d9c4e16ddfe82be0a873",
        "712020:161e10b1-00f2-41ca-901e-d353513bfd0a",
        "62f3616dd49df231b629d715",
        "712020:6fd6f338-fcfe-42e9-8438-abb270461897",
        "712020:a65ab84d-ded3-4d2d-836b-00920f33ab25",
    ];

    PJ.iter()
        .map(|id| PreconfiguredAssignee::new(id, "PJ"))
        .chain(AG.iter().map(|id| PreconfiguredAssignee::new(id, "AG")))
        .chain(LOS.iter().map(|id| PreconfiguredAssignee::new(id, "LOS")))
        .collect()
}

impl AppConfiguration {
    /// Checks the values which can not be verified by the parser
    ///
    /// # Errors
    /// Returns `WorklogError::InvalidConfig` describing the first offending value
    pub fn validate(&self) -> Result<(), WorklogError> {
        self.schedule.time_of_day()?;
        self.schedule.time_zone()?;
        if self.jira.timeout_secs == 0 {
            return Err(WorklogError::InvalidConfig(
                "[jira] timeout_secs must be positive".to_string(),
            ));
        }
        if self.jira.api_version.trim().is_empty() {
            return Err(WorklogError::InvalidConfig(
                "[jira] api_version can not be blank".to_string(),
            ));
        }
        if let Some(entry) = self
            .assignees
            .preconfigured
            .iter()
            .find(|p| p.assignee_id.trim().is_empty())
        {
            return Err(WorklogError::InvalidConfig(format!(
                "Pre-configured assignee with blank identifier in group {:?}",
                entry.group
            )));
        }
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "norn", "worklog-dashboard")
}

/// Default location of the configuration file
#[must_use]
pub fn configuration_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.preference_dir().join("config.toml"))
}

/// Default location of the Sqlite database
#[must_use]
pub fn database_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("worklog-dashboard.db"))
}

/// Loads the configuration.
///
/// An explicitly supplied path is used first, then the path in the
/// `WORKLOG_DASHBOARD_CONFIG` environment variable. Both must exist. Otherwise the
/// platform default location is tried, and if nothing is found there the
/// defaults are used.
///
/// # Errors
/// If a file can not be read or parsed, or if the result does not validate
pub fn load(explicit: Option<&Path>) -> Result<AppConfiguration, WorklogError> {
    let env_path = env::var(CONFIG_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    let app_config = match explicit.map(Path::to_path_buf).or(env_path) {
        Some(path) => {
            if !path.exists() {
                return Err(WorklogError::ConfigFileNotFound { path });
            }
            read(&path)?
        }
        None => match configuration_file().filter(|p| p.exists()) {
            Some(path) => read(&path)?,
            None => {
                info!("No configuration file found, using defaults");
                AppConfiguration::default()
            }
        },
    };
    app_config.validate()?;
    Ok(app_config)
}

/// Parses the configuration from a TOML string
///
/// # Errors
/// If the TOML is malformed
pub fn parse(contents: &str, path: &Path) -> Result<AppConfiguration, WorklogError> {
    toml::from_str::<AppConfiguration>(contents).map_err(|source| WorklogError::TomlParse {
        path: path.into(),
        source,
    })
}

/// Reads the configuration from the supplied TOML file
fn read(path: &Path) -> Result<AppConfiguration, WorklogError> {
    debug!("Reading configuration from {}", path.display());
    let mut file = File::open(path).map_err(|source| WorklogError::ApplicationConfig {
        path: path.into(),
        source,
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|source| WorklogError::ApplicationConfig {
            path: path.into(),
            source,
        })?;
    parse(&contents, path)
}
