//! Core domain types for Content Factory batches.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// BatchId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one batch run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub Uuid);

impl BatchId {
    /// Generate a new time-sortable batch identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Generation model identifiers offered to the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    #[default]
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "gpt-4")]
    Gpt4,
}

impl Model {
    /// All selectable models, in menu order.
    pub const ALL: [Model; 2] = [Model::Gpt35Turbo, Model::Gpt4];

    /// Wire identifier sent to the generation service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt35Turbo => "gpt-3.5-turbo",
            Self::Gpt4 => "gpt-4",
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(Model::as_str).collect();
                format!("unknown model '{s}': expected one of {}", known.join(", "))
            })
    }
}

// ---------------------------------------------------------------------------
// TopicRow
// ---------------------------------------------------------------------------

/// One row of the input table, enriched in place as generation results arrive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRow {
    /// Topic label; unique within a batch.
    pub topic: String,
    /// Keyword used as the document title and URL slug source.
    pub h1_keyword: String,
    /// Category used to group related topics.
    pub category: String,
    /// Slug path derived from the H1 keyword (e.g. `/content-marketing`).
    pub url_path: String,
    /// Absolute URL on the target domain.
    pub full_url: String,
    /// Ordered outline sections for the article prompt.
    pub sections: Vec<String>,
    /// Generated short definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Generated article markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    /// Raw input cells in header order, reproduced in the summary table.
    #[serde(default)]
    pub record: Vec<String>,
}

/// A same-category peer of a topic, offered to the model as a cross-link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLink {
    pub label: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// StyledBlock
// ---------------------------------------------------------------------------

/// Formatting applied to a block when it is written to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    /// Document title level; the converter never emits it.
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Paragraph,
    BulletItem,
    NumberedItem,
}

/// A single styled run of text produced by the document converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledBlock {
    pub kind: BlockKind,
    pub text: String,
}

impl StyledBlock {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}
