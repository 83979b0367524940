//! Turns semi-structured video summaries into validated records and
//! visualization data.
//!
//! The pipeline runs leaf-first: [`sections::split`] cuts a document into
//! named sections, [`normalize`] turns each into a typed field,
//! [`validate`] repairs and checks the assembled candidate, and
//! [`viz::synthesize`] derives a mindmap, numeric stats and suggested
//! visualization tags.
//!
//! # Example
//!
//! ```rust
//! use tldw_core::{extract_summary, synthesize_visualization};
//!
//! let doc = "# SUMMARY\n> Launch costs collapsed.\n\n# IDEAS\n- Reuse cut costs 90%\n# INSIGHTS\n- Cheap access changes everything\n";
//! let summary = extract_summary(doc, "dQw4w9WgXcQ").unwrap();
//! let (viz, tags) = synthesize_visualization(&summary);
//! assert_eq!(viz.stats[0].value, "90%");
//! assert_eq!(tags, vec!["stats"]);
//! ```

pub mod error;
pub mod extract;
pub mod fetch;
pub mod lexicon;
pub mod normalize;
pub mod pipeline;
pub mod sections;
pub mod source;
pub mod store;
pub mod summary;
pub mod validate;
pub mod viz;

pub use error::{Result, TldwError, ValidationError};
pub use extract::{extract_summary, extract_summary_with_validator, synthesize_visualization};
#[cfg(feature = "fetch")]
pub use fetch::YtDlpFetcher;
pub use fetch::{FetchConfig, MetadataFetcher, VideoMetadata};
pub use normalize::{Draft, Field, normalize};
pub use pipeline::{
    BatchReport, Outcome, Pipeline, PipelineConfig, PipelineConfigBuilder, SkipReason, attach_viz,
};
pub use sections::{Section, SectionKind, split};
pub use source::{TranscriptEntry, discover_summaries, discover_transcripts, read_input};
pub use store::{Collection, Upsert, VideoRecord, VideoStore, now_millis};
pub use summary::{Idea, Mindmap, MindmapChild, MindmapNode, RawDocument, Stat, StructuredSummary, VizData};
pub use validate::{FlattenNested, RepairPass, Validation, Validator, validate};
pub use viz::{Synthesis, build_mindmap, detect_comparison, extract_stats, synthesize};
