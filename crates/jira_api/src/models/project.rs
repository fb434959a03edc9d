use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Option<String>,
    pub key: String,
    pub name: Option<String>,
    #[serde(default)]
    pub project_type_key: Option<String>,
}
