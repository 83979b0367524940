//! Per-document pipeline driver and batch runner.
//!
//! [`Pipeline::process`] is the per-document contract: split, normalize,
//! validate, then optionally synthesize visualization data. The batch
//! helpers apply results to a [`Collection`] and never let one bad document
//! stop the rest.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::Result;
use crate::error::ValidationError;
use crate::extract::extract_summary_with_validator;
use crate::store::{Collection, VideoRecord};
use crate::summary::{RawDocument, StructuredSummary};
use crate::validate::Validator;
use crate::viz::synthesize;

/// Pipeline settings.
///
/// # Example
///
/// ```rust
/// use tldw_core::PipelineConfig;
///
/// let config = PipelineConfig::builder().synthesize_viz(false).build();
/// assert!(!config.synthesize_viz);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Run the visualization stage on freshly extracted summaries (default: true).
    pub synthesize_viz: bool,

    /// Leave records whose stored summary already has ideas or insights
    /// untouched (default: true).
    pub skip_summarized: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { synthesize_viz: true, skip_summarized: true }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

/// Builder for PipelineConfig.
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self { config: PipelineConfig::default() }
    }

    /// Sets whether the visualization stage runs.
    pub fn synthesize_viz(mut self, value: bool) -> Self {
        self.config.synthesize_viz = value;
        self
    }

    /// Sets whether already summarized records are skipped.
    pub fn skip_summarized(mut self, value: bool) -> Self {
        self.config.skip_summarized = value;
        self
    }

    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a document produced no update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The stored summary already has ideas or insights.
    AlreadySummarized,
    /// The extracted summary has neither ideas nor insights.
    NoContent,
    /// No record with this source id exists in the collection.
    UnknownSource,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::AlreadySummarized => "already summarized",
            SkipReason::NoContent => "no ideas or insights",
            SkipReason::UnknownSource => "no matching record",
        };
        f.write_str(text)
    }
}

/// Result of processing one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Updated(StructuredSummary),
    Skipped(SkipReason),
    Failed(ValidationError),
}

/// What a batch run did, per source id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub updated: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
    pub failed: Vec<(String, ValidationError)>,
}

/// The extraction pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    validator: Validator,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config, validator: Validator::new() }
    }

    /// Replaces the validator, e.g. to register extra repair passes.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes one document against its stored record, if any.
    pub fn process(&self, doc: &RawDocument, existing: Option<&VideoRecord>) -> Outcome {
        if self.config.skip_summarized && existing.is_some_and(VideoRecord::is_summarized) {
            return Outcome::Skipped(SkipReason::AlreadySummarized);
        }

        let mut summary = match extract_summary_with_validator(&doc.text, &doc.source_id, &self.validator) {
            Ok(validation) => validation.summary,
            Err(e) => return Outcome::Failed(e),
        };

        if !summary.has_content() {
            return Outcome::Skipped(SkipReason::NoContent);
        }

        if self.config.synthesize_viz {
            attach_viz(&mut summary);
        }

        Outcome::Updated(summary)
    }

    /// Applies a batch of documents to the records they belong to.
    ///
    /// Updated records get the new summary and `insights_count` set to the
    /// number of ideas.
    pub fn run(&self, docs: &[RawDocument], collection: &mut Collection) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for doc in docs {
            let id = doc.source_id.clone();
            let Some(record) = collection.get_mut(&id) else {
                debug!(source_id = %id, "no matching record");
                report.skipped.push((id, SkipReason::UnknownSource));
                continue;
            };

            match self.process(doc, Some(&*record)) {
                Outcome::Updated(summary) => {
                    record.insights_count = summary.ideas.len() as u64;
                    record.set_summary(&summary)?;
                    debug!(source_id = %id, ideas = summary.ideas.len(), "summary stored");
                    report.updated.push(id);
                }
                Outcome::Skipped(reason) => {
                    debug!(source_id = %id, %reason, "document skipped");
                    report.skipped.push((id, reason));
                }
                Outcome::Failed(e) => {
                    warn!(source_id = %id, kind = e.kind(), error = %e, "document failed validation");
                    report.failed.push((id, e));
                }
            }
        }

        info!(
            updated = report.updated.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "batch finished"
        );
        Ok(report)
    }

    /// Adds visualization data to stored summaries that lack it.
    ///
    /// Only `viz_data` and `suggested_viz` are written; the rest of each stored
    /// summary is left byte-for-byte as it was. Returns the updated ids.
    pub fn backfill_viz(&self, collection: &mut Collection) -> Vec<String> {
        let mut updated = Vec::new();

        for record in &mut collection.videos {
            let Some(Value::Object(stored)) = &mut record.summary else {
                continue;
            };
            if stored.get("viz_data").is_some_and(is_truthy) {
                continue;
            }
            let Ok(summary) = serde_json::from_value::<StructuredSummary>(Value::Object(stored.clone())) else {
                warn!(source_id = %record.id, "stored summary does not parse, skipping");
                continue;
            };
            if !summary.has_content() {
                continue;
            }

            let synthesis = synthesize(&summary);
            if synthesis.viz_data.is_empty() {
                continue;
            }
            stored.insert("viz_data".to_string(), serde_json::json!(synthesis.viz_data));
            if !synthesis.suggested_viz.is_empty() {
                stored.insert("suggested_viz".to_string(), serde_json::json!(synthesis.suggested_viz));
            }
            updated.push(record.id.clone());
        }

        info!(updated = updated.len(), "visualization backfill finished");
        updated
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Stores synthesized visualization on the summary; returns false when
/// there was nothing to store.
pub fn attach_viz(summary: &mut StructuredSummary) -> bool {
    let synthesis = synthesize(summary);
    if synthesis.viz_data.is_empty() {
        return false;
    }
    summary.viz_data = Some(synthesis.viz_data);
    if !synthesis.suggested_viz.is_empty() {
        summary.suggested_viz = synthesis.suggested_viz;
    }
    true
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Number(_) => true,
    }
}
