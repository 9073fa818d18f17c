use std::{
    cmp::Ordering,
    fmt::{self, Formatter},
};

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize,
};

/// Represents a Jira user as embedded in issues and worklog items
#[derive(Debug, Deserialize, Serialize, PartialOrd, PartialEq, Eq, Hash, Clone)]
#[allow(non_snake_case)]
pub struct Author {
    #[serde(default)]
    pub accountId: String,
    /// Only present if the privacy settings of the user allows it
    pub emailAddress: Option<String>,
    #[serde(default)]
    pub displayName: String,
}

/// The issue fields requested when searching, see `ISSUE_FIELDS`
#[derive(Clone, Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Fields {
    #[serde(default)]
    pub summary: String,
    pub status: Option<Status>,
    pub assignee: Option<Author>,
}

impl Fields {
    #[must_use]
    pub fn status_name(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.name.as_str())
    }

    #[must_use]
    pub fn assignee_display_name(&self) -> Option<&str> {
        self.assignee
            .as_ref()
            .map(|a| a.displayName.as_str())
            .filter(|name| !name.trim().is_empty())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Status {
    pub name: String,
}

/// Represents a Jira issue key like for instance `TIME-148`
/// This struct is typically known as a "value object" in other programming languages.
#[derive(Debug, Serialize, Default, Eq, PartialEq, Clone)]
pub struct IssueKey {
    #[serde(rename = "key")]
    pub value: String,
}

impl IssueKey {
    ///
    /// # Panics
    /// If the supplied value is empty
    #[must_use]
    pub fn new(input: &str) -> Self {
        assert!(
            !(input.is_empty() || input.trim().is_empty()),
            "IssueKey may not be empty!"
        );
        IssueKey {
            value: input.to_uppercase(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl From<&str> for IssueKey {
    fn from(value: &str) -> Self {
        IssueKey::new(value)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Ord for IssueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl PartialOrd for IssueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'de> Deserialize<'de> for IssueKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IssueKeyVisitor;

        impl<'de> Visitor<'de> for IssueKeyVisitor {
            type Value = IssueKey;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or a map with a key field")
            }

            fn visit_str<E>(self, value: &str) -> Result<IssueKey, E>
            where
                E: de::Error,
            {
                Ok(IssueKey {
                    value: value.to_string(),
                })
            }

            fn visit_map<M>(self, mut map: M) -> Result<IssueKey, M::Error>
            where
                M: de::MapAccess<'de>,
            {
                let mut value = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == "key" {
                        if value.is_some() {
                            return Err(de::Error::duplicate_field("key"));
                        }
                        value = Some(map.next_value()?);
                    } else {
                        let _: de::IgnoredAny = map.next_value()?;
                    }
                }
                let value = value.ok_or_else(|| de::Error::missing_field("key"))?;
                Ok(IssueKey { value })
            }
        }

        deserializer.deserialize_any(IssueKeyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_key() {
        let k1 = IssueKey::from("TIME-40");
        let k2 = IssueKey::from("TIME-40");
        assert_eq!(&k1, &k2, "Seems IssueKey does not compare by value");
    }

    #[test]
    fn test_issue_key_uppercase() {
        let k1 = IssueKey::from("time-147");
        assert_eq!(k1.to_string(), "TIME-147".to_string());
    }

    #[test]
    fn test_issue_key_from_map() {
        let key: IssueKey = serde_json::from_str(r#"{"key": "PJ-7", "id": "1"}"#).unwrap();
        assert_eq!(key.as_str(), "PJ-7");
    }

    #[test]
    fn blank_assignee_name_is_treated_as_missing() {
        let fields = Fields {
            summary: "x".into(),
            status: None,
            assignee: Some(Author {
                accountId: "a".into(),
                emailAddress: None,
                displayName: "  ".into(),
            }),
        };
        assert_eq!(fields.assignee_display_name(), None);
        assert_eq!(fields.status_name(), None);
    }
}
