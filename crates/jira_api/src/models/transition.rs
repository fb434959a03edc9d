use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

impl Transition {
    pub fn is_named(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TransitionList {
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// Body of `POST /issue/{key}/transitions`.
#[derive(Debug, Serialize)]
pub struct TransitionRequest<'a> {
    pub transition: TransitionId<'a>,
}

#[derive(Debug, Serialize)]
pub struct TransitionId<'a> {
    pub id: &'a str,
}
