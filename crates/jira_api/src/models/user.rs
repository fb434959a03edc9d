use serde::Deserialize;

/// The authenticated account, as returned by `GET /myself`.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub account_id: String,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}
