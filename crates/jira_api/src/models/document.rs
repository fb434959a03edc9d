//! Atlassian Document Format bodies used for descriptions and worklog comments.

use serde::{Deserialize, Serialize};

/// Root `doc` node of a rich-text body.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Document {
    pub version: u32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<DocumentNode>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<DocumentNode>,
}

impl Document {
    /// A document holding one paragraph with a single text run.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            version: 1,
            kind: "doc".to_string(),
            content: vec![DocumentNode {
                kind: "paragraph".to_string(),
                text: None,
                content: vec![DocumentNode {
                    kind: "text".to_string(),
                    text: Some(text.into()),
                    content: Vec::new(),
                }],
            }],
        }
    }

    /// Concatenated text runs, paragraphs separated by newlines.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(DocumentNode::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DocumentNode {
    fn plain_text(&self) -> String {
        let mut out = self.text.clone().unwrap_or_default();
        for child in &self.content {
            out.push_str(&child.plain_text());
        }
        out
    }
}
