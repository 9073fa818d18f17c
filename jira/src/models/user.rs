use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(alias = "self", default)]
    pub self_url: String,
    #[serde(alias = "accountId")]
    pub account_id: String,
    /// Hidden by Jira unless the privacy settings of the user allows it
    #[serde(alias = "emailAddress")]
    pub email_address: Option<String>,
    #[serde(alias = "displayName", default)]
    pub display_name: String,
    #[serde(alias = "timeZone")]
    pub time_zone: Option<String>,
}
