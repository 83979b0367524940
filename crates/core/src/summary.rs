//! The structured summary record and its visualization payload.
//!
//! Field names follow the JSON layout of the stored collection (`videoId`,
//! `viz_data`, `suggested_viz`, ideas as `{text, timestamp}`), so records
//! written by earlier tooling deserialize unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::lexicon::{MAX_FACTS, MAX_IDEAS, MAX_INSIGHTS, MAX_QUOTES, MAX_STATS};

/// Raw input document: opaque text plus its source identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub source_id: String,
    pub text: String,
}

impl RawDocument {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source_id: source_id.into(), text: text.into() }
    }
}

/// One bullet from the IDEAS section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IdeaRepr")]
pub struct Idea {
    pub text: String,
    /// Seconds into the video, when the bullet carried a `[[MM:SS]]` marker.
    #[serde(rename = "timestamp")]
    pub timestamp_seconds: Option<u32>,
}

impl Idea {
    pub fn new(text: impl Into<String>, timestamp_seconds: Option<u32>) -> Self {
        Self { text: text.into(), timestamp_seconds }
    }
}

/// Stored ideas are either bare strings or `{text, timestamp}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdeaRepr {
    Text(String),
    Full {
        text: String,
        #[serde(default)]
        timestamp: Option<u32>,
    },
}

impl From<IdeaRepr> for Idea {
    fn from(repr: IdeaRepr) -> Self {
        match repr {
            IdeaRepr::Text(text) => Idea { text, timestamp_seconds: None },
            IdeaRepr::Full { text, timestamp } => Idea { text, timestamp_seconds: timestamp },
        }
    }
}

/// Canonical normalized record for one document.
///
/// Deserialization is lenient so stored records from older tooling still
/// load: required fields default when absent ([`crate::validate`] is what
/// enforces them), and optional fields of the wrong shape read as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredSummary {
    #[serde(rename = "videoId", default)]
    pub source_id: String,

    #[serde(default)]
    pub tldr: String,

    #[serde(default)]
    pub ideas: Vec<Idea>,

    #[serde(default)]
    pub insights: Vec<String>,

    #[serde(default, deserialize_with = "lenient_strings", skip_serializing_if = "Vec::is_empty")]
    pub quotes: Vec<String>,

    #[serde(default, deserialize_with = "lenient_strings", skip_serializing_if = "Vec::is_empty")]
    pub facts: Vec<String>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub takeaway: Option<String>,

    #[serde(default, deserialize_with = "lenient_viz", skip_serializing_if = "Option::is_none")]
    pub viz_data: Option<VizData>,

    #[serde(default, deserialize_with = "lenient_strings", skip_serializing_if = "Vec::is_empty")]
    pub suggested_viz: Vec<String>,

    /// Keys outside the schema (e.g. `status`, `title`), kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StructuredSummary {
    /// Idea texts in order, timestamps dropped.
    pub fn idea_texts(&self) -> impl Iterator<Item = &str> {
        self.ideas.iter().map(|idea| idea.text.as_str())
    }

    /// True when there is at least one idea or insight.
    pub fn has_content(&self) -> bool {
        !self.ideas.is_empty() || !self.insights.is_empty()
    }

    /// Truncates every list to its cap, keeping the first entries.
    pub fn enforce_caps(&mut self) {
        self.ideas.truncate(MAX_IDEAS);
        self.insights.truncate(MAX_INSIGHTS);
        self.quotes.truncate(MAX_QUOTES);
        self.facts.truncate(MAX_FACTS);
        if let Some(viz) = &mut self.viz_data {
            viz.stats.truncate(MAX_STATS);
        }
    }
}

/// Optional string list: null or a non-list reads as empty, non-string items are dropped.
fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_viz<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<VizData>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Derived visualization payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VizData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mindmap: Option<Mindmap>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stats: Vec<Stat>,
}

impl VizData {
    pub fn is_empty(&self) -> bool {
        self.mindmap.is_none() && self.stats.is_empty()
    }
}

/// Mindmap tree. The root node is stored as `{root, children}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mindmap {
    pub root: String,
    pub children: Vec<MindmapNode>,
}

/// A labeled branch of the mindmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindmapNode {
    pub label: String,
    pub children: Vec<MindmapChild>,
}

impl MindmapNode {
    /// Builds a branch whose children are all leaves.
    pub fn leaves<I, S>(label: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { label: label.to_string(), children: items.into_iter().map(|s| MindmapChild::Leaf(s.into())).collect() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MindmapChild {
    Leaf(String),
    Node(MindmapNode),
}

/// A numeric token with its unit plus a short context excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub value: String,
    pub label: String,
}
