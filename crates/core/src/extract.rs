//! Document-level entry points.
//!
//! [`extract_summary`] composes splitting, normalization and validation;
//! [`synthesize_visualization`] is the optional second stage and accepts any
//! valid summary, including ones produced elsewhere.

use tracing::debug;

use crate::error::ValidationError;
use crate::normalize::Draft;
use crate::sections::split;
use crate::summary::{StructuredSummary, VizData};
use crate::validate::{Validation, Validator};
use crate::viz::synthesize;

/// Extracts a validated summary from raw document text.
///
/// # Errors
///
/// Returns a [`ValidationError`] when the document lacks a SUMMARY, IDEAS or
/// INSIGHTS section, or when the summary body is empty.
///
/// # Example
///
/// ```rust
/// use tldw_core::extract_summary;
///
/// let doc = "# SUMMARY\n> Rockets got cheap.\n\n# IDEAS\n- Reuse changes cost [[12:05]]\n# INSIGHTS\n- Scale wins\n";
/// let summary = extract_summary(doc, "abc123").unwrap();
/// assert_eq!(summary.tldr, "Rockets got cheap.");
/// assert_eq!(summary.ideas[0].timestamp_seconds, Some(725));
/// ```
pub fn extract_summary(raw: &str, source_id: &str) -> Result<StructuredSummary, ValidationError> {
    extract_summary_with_validator(raw, source_id, &Validator::new()).map(|v| v.summary)
}

/// Like [`extract_summary`], with a caller-supplied validator and the full report.
pub fn extract_summary_with_validator(
    raw: &str, source_id: &str, validator: &Validator,
) -> Result<Validation, ValidationError> {
    let sections = split(raw);
    debug!(
        source_id,
        sections = ?sections.iter().map(|s| s.name()).collect::<Vec<_>>(),
        "split document"
    );

    let draft = Draft::from_sections(&sections);
    validator.validate(draft.into_candidate(), source_id)
}

/// Derives visualization data and suggested tags for a summary.
pub fn synthesize_visualization(summary: &StructuredSummary) -> (VizData, Vec<String>) {
    let synthesis = synthesize(summary);
    (synthesis.viz_data, synthesis.suggested_viz)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# SUMMARY

> 可重复使用火箭让太空发射成本下降了 90%。

# 💡 IDEAS
- 传统火箭一次性使用 [[01:15]](https://youtu.be/x?t=75)
- 新型火箭可以回收 [[12:05]]
- 发射次数增长 3倍

# 🧠 INSIGHTS
- 成本决定规模

# 🗣️ QUOTES
- \"Reuse is everything.\" - Speaker 1 [02:00]

# 🧪 FACTS
- 2023年 发射 96 次

# 🚀 ONE-SENTENCE TAKEAWAY
Reuse wins.
";

    #[test]
    fn test_extract_full_document() {
        let summary = extract_summary(DOC, "vid").unwrap();

        assert_eq!(summary.source_id, "vid");
        assert_eq!(summary.tldr, "可重复使用火箭让太空发射成本下降了 90%。");
        assert_eq!(summary.ideas.len(), 3);
        assert_eq!(summary.ideas[0].text, "传统火箭一次性使用");
        assert_eq!(summary.ideas[0].timestamp_seconds, Some(75));
        assert_eq!(summary.ideas[2].timestamp_seconds, None);
        assert_eq!(summary.insights, vec!["成本决定规模"]);
        assert_eq!(summary.quotes, vec!["Reuse is everything."]);
        assert_eq!(summary.facts, vec!["2023年 发射 96 次"]);
        assert_eq!(summary.takeaway.as_deref(), Some("Reuse wins."));
    }

    #[test]
    fn test_missing_sections_fail_validation() {
        let err = extract_summary("# SUMMARY\nJust a summary.\n", "vid").unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["ideas", "insights"]));
    }

    #[test]
    fn test_synthesize_visualization() {
        let summary = extract_summary(DOC, "vid").unwrap();
        let (viz, tags) = synthesize_visualization(&summary);

        let values: Vec<_> = viz.stats.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["2023年", "3倍"]);
        assert_eq!(tags, vec!["stats", "comparison"]);
        assert_eq!(viz.mindmap.unwrap().children.len(), 5);
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let first = extract_summary(DOC, "vid").unwrap();
        let second = extract_summary(DOC, "vid").unwrap();
        assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
        assert_eq!(synthesize_visualization(&first), synthesize_visualization(&second));
    }
}
