//! JSON collection store for analyzed videos.
//!
//! The store is a single file shaped `{"videos": [...], "updated_at": ms}`.
//! Record summaries are kept as raw JSON so hand-edited content survives a
//! load/save cycle untouched; [`VideoRecord::parsed_summary`] gives the typed
//! view.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::debug;

use crate::summary::StructuredSummary;
use crate::{Result, TldwError};

/// File name of the collection inside the data directory.
pub const DATA_FILE_NAME: &str = "videos.json";

/// One analyzed video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel: String,
    /// Seconds.
    #[serde(default, deserialize_with = "lenient_count")]
    pub duration: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub insights_count: u64,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub analyzed_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VideoRecord {
    /// Typed view of the stored summary, if it parses.
    pub fn parsed_summary(&self) -> Option<StructuredSummary> {
        let value = self.summary.as_ref()?;
        serde_json::from_value(value.clone()).ok()
    }

    /// True when a non-empty summary object is stored.
    pub fn has_summary(&self) -> bool {
        match &self.summary {
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }

    /// True when the stored summary has ideas or insights; such records are
    /// never re-extracted.
    pub fn is_summarized(&self) -> bool {
        let non_empty = |key: &str| {
            self.summary
                .as_ref()
                .and_then(|s| s.get(key))
                .and_then(Value::as_array)
                .is_some_and(|items| !items.is_empty())
        };
        non_empty("ideas") || non_empty("insights")
    }

    pub fn set_summary(&mut self, summary: &StructuredSummary) -> Result<()> {
        self.summary = Some(serde_json::to_value(summary)?);
        Ok(())
    }
}

/// Accepts integers, floats and null for count-like fields.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value).unwrap_or(0))
}

pub(crate) fn count_from_value(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.round() as u64))
}

/// Whether [`Collection::upsert`] added or replaced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// The full contents of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub videos: Vec<VideoRecord>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Collection {
    pub fn get(&self, id: &str) -> Option<&VideoRecord> {
        self.videos.iter().find(|v| v.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut VideoRecord> {
        self.videos.iter_mut().find(|v| v.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Inserts or replaces the record with the same id.
    ///
    /// When the incoming record carries no summary, the stored one is kept.
    pub fn upsert(&mut self, mut record: VideoRecord) -> Upsert {
        match self.get_mut(&record.id) {
            Some(existing) => {
                if record.summary.is_none() {
                    record.summary = existing.summary.take();
                }
                *existing = record;
                Upsert::Updated
            }
            None => {
                self.videos.push(record);
                Upsert::Inserted
            }
        }
    }
}

/// File-backed collection store.
#[derive(Debug, Clone)]
pub struct VideoStore {
    path: PathBuf,
}

impl VideoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data dir>/tldw/videos.json`.
    pub fn default_location() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| TldwError::StoreError("no data directory for this platform".to_string()))?;
        Ok(Self::new(dir.join("tldw").join(DATA_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the collection; a missing file yields an empty collection.
    pub fn load(&self) -> Result<Collection> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "store file missing, starting empty");
            return Ok(Collection::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Stamps `updated_at` and writes the collection as pretty JSON.
    pub fn save(&self, collection: &mut Collection) -> Result<()> {
        collection.updated_at = Some(now_millis());
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(collection)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), videos = collection.videos.len(), "store saved");
        Ok(())
    }
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
