use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Number of hours, held as a decimal and always presented as a string with an
/// `h` suffix, rounded to one decimal place, i.e. `2.5h`, `1h` or `0h`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Hours(f64);

impl Hours {
    pub const ZERO: Hours = Hours(0.0);

    #[must_use]
    pub fn new(hours: f64) -> Self {
        Hours(hours)
    }

    /// Converts a number of seconds into hours, rounded to one decimal
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_seconds(seconds: i64) -> Self {
        Hours(round_to_tenth(seconds as f64 / 3600.0))
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Share of an eight hour working day, as a whole percentage clamped at 100
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn progress_percent(&self) -> u8 {
        let percent = (self.0 / WORKING_DAY_HOURS * 100.0).round();
        percent.clamp(0.0, 100.0) as u8
    }
}

/// Target number of hours for a working day
pub const WORKING_DAY_HOURS: f64 = 8.0;

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl Display for Hours {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rounded = round_to_tenth(self.0);
        // Avoids printing "-0h"
        let rounded = if rounded == 0.0 { 0.0 } else { rounded };
        write!(f, "{rounded}h")
    }
}

impl FromStr for Hours {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix('h').unwrap_or(trimmed);
        number
            .trim()
            .parse::<f64>()
            .map(Hours)
            .map_err(|_| format!("Invalid number of hours: '{s}'"))
    }
}

impl Add for Hours {
    type Output = Hours;

    fn add(self, rhs: Self) -> Self::Output {
        Hours(self.0 + rhs.0)
    }
}

impl Sum for Hours {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Hours::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Hours> for Hours {
    fn sum<I: Iterator<Item = &'a Hours>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A person whose work logs are tracked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub id: String,
    pub assignee_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub group: Option<String>,
    pub is_preconfigured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Prefix of the store identifier of assignees seeded from the configuration
pub const PRECONFIGURED_ID_PREFIX: &str = "preconfigured-";

impl Assignee {
    /// Creates an entry for the pre-configured roster
    #[must_use]
    pub fn preconfigured(assignee_id: &str, group: Option<String>) -> Self {
        Assignee {
            id: format!("{PRECONFIGURED_ID_PREFIX}{assignee_id}"),
            assignee_id: assignee_id.to_string(),
            name: None,
            email: None,
            group,
            is_preconfigured: true,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Creates a new record with a fresh identifier from the user supplied data
    #[must_use]
    pub fn from_new(new: &NewAssignee) -> Self {
        Assignee {
            id: uuid::Uuid::new_v4().to_string(),
            assignee_id: new.assignee_id.trim().to_string(),
            name: non_blank(new.name.as_deref()),
            email: non_blank(new.email.as_deref()),
            group: non_blank(new.group.as_deref()),
            is_preconfigured: new.is_preconfigured.unwrap_or(false),
            is_active: new.is_active.unwrap_or(true),
            created_at: Utc::now(),
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Request to add an assignee
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignee {
    pub assignee_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub is_preconfigured: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl NewAssignee {
    #[must_use]
    pub fn with_id(assignee_id: &str) -> Self {
        NewAssignee {
            assignee_id: assignee_id.to_string(),
            ..Default::default()
        }
    }
}

/// Hours logged by one assignee on one task on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogEntry {
    pub id: String,
    pub assignee_id: String,
    pub assignee_name: Option<String>,
    pub task_key: String,
    pub task_summary: Option<String>,
    pub task_status: Option<String>,
    pub hours_logged: Hours,
    pub worklog_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A worklog entry which has not yet been stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorklogEntry {
    pub assignee_id: String,
    pub assignee_name: Option<String>,
    pub task_key: String,
    pub task_summary: Option<String>,
    pub task_status: Option<String>,
    pub hours_logged: Hours,
    pub worklog_date: NaiveDate,
}

impl NewWorklogEntry {
    /// Assigns an identifier and a creation time
    #[must_use]
    pub fn into_entry(self) -> WorklogEntry {
        WorklogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            assignee_id: self.assignee_id,
            assignee_name: self.assignee_name,
            task_key: self.task_key,
            task_summary: self.task_summary,
            task_status: self.task_status,
            hours_logged: self.hours_logged,
            worklog_date: self.worklog_date,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_are_displayed_with_suffix() {
        assert_eq!(Hours::new(2.5).to_string(), "2.5h");
        assert_eq!(Hours::new(1.0).to_string(), "1h");
        assert_eq!(Hours::ZERO.to_string(), "0h");
        assert_eq!((Hours::new(0.1) + Hours::new(0.2)).to_string(), "0.3h");
    }

    #[test]
    fn hours_from_seconds_are_rounded() {
        assert_eq!(Hours::from_seconds(9000), Hours::new(2.5));
        assert_eq!(Hours::from_seconds(3600), Hours::new(1.0));
        // 20 minutes
        assert_eq!(Hours::from_seconds(1200), Hours::new(0.3));
        assert_eq!(Hours::from_seconds(0), Hours::ZERO);
    }

    #[test]
    fn hours_are_parsed_with_or_without_suffix() {
        assert_eq!("2.5h".parse::<Hours>(), Ok(Hours::new(2.5)));
        assert_eq!("3".parse::<Hours>(), Ok(Hours::new(3.0)));
        assert!("three hours".parse::<Hours>().is_err());
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(Hours::new(3.5).progress_percent(), 44);
        assert_eq!(Hours::new(8.0).progress_percent(), 100);
        assert_eq!(Hours::new(11.0).progress_percent(), 100);
        assert_eq!(Hours::ZERO.progress_percent(), 0);
    }

    #[test]
    fn progress_is_non_decreasing() {
        let mut previous = 0;
        for tenths in 0..=120 {
            let p = Hours::new(f64::from(tenths) / 10.0).progress_percent();
            assert!(p >= previous);
            previous = p;
        }
    }

    #[test]
    fn hours_serialize_as_string() {
        let json = serde_json::to_string(&Hours::new(2.5)).unwrap();
        assert_eq!(json, "\"2.5h\"");
        let back: Hours = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Hours::new(2.5));
    }

    #[test]
    fn assignee_uses_camel_case() {
        let assignee = Assignee::preconfigured("abc", Some("PJ".to_string()));
        let json = serde_json::to_value(&assignee).unwrap();
        assert_eq!(json["id"], "preconfigured-abc");
        assert_eq!(json["assigneeId"], "abc");
        assert_eq!(json["isPreconfigured"], true);
        assert_eq!(json["isActive"], true);
        assert!(json["name"].is_null());
    }

    #[test]
    fn new_assignee_blank_fields_are_dropped() {
        let new: NewAssignee =
            serde_json::from_str(r#"{"assigneeId":" abc ","name":"","group":"AG"}"#).unwrap();
        let assignee = Assignee::from_new(&new);
        assert_eq!(assignee.assignee_id, "abc");
        assert_eq!(assignee.name, None);
        assert_eq!(assignee.group.as_deref(), Some("AG"));
        assert!(assignee.is_active);
        assert!(!assignee.is_preconfigured);
        assert!(uuid::Uuid::parse_str(&assignee.id).is_ok());
    }
}
