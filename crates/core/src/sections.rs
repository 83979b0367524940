//! Section splitting for semi-structured summary documents.
//!
//! A document is scanned line by line. Heading lines (`#`-prefixed, or a bare
//! `SUMMARY` marker optionally wrapped in `>`/`**`) are matched against the
//! fixed vocabulary in [`crate::lexicon::HEADINGS`]; everything else is body
//! text for whichever section is open.
//!
//! Rules:
//! - the first occurrence of a heading wins, later duplicates are dropped
//!   together with their bodies;
//! - an unrecognized heading closes the open section when it sits at the
//!   same or a shallower level, and its own text is dropped;
//! - the SUMMARY body is a single paragraph: leading blank lines are skipped,
//!   the first blank line after content ends it, and `>` quote markers are
//!   removed from each line.
//!
//! # Example
//!
//! ```rust
//! use tldw_core::sections::{SectionKind, split};
//!
//! let sections = split("# IDEAS\n- one\n- two\n# FACTS\n- three\n");
//! assert_eq!(sections[0].kind, SectionKind::Ideas);
//! assert_eq!(sections[1].body, "- three");
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lexicon;

/// The recognized section names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SectionKind {
    Summary,
    Ideas,
    Insights,
    Quotes,
    Facts,
    Takeaway,
}

impl SectionKind {
    /// Canonical heading keyword for this section.
    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Summary => "SUMMARY",
            SectionKind::Ideas => "IDEAS",
            SectionKind::Insights => "INSIGHTS",
            SectionKind::Quotes => "QUOTES",
            SectionKind::Facts => "FACTS",
            SectionKind::Takeaway => "TAKEAWAY",
        }
    }
}

/// A named, contiguous span of a document owned by one heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub body: String,
}

impl Section {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// A classified heading line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Heading {
    /// Number of leading `#`; 0 for a bare SUMMARY marker.
    level: usize,
    kind: Option<SectionKind>,
}

enum State<'a> {
    Idle,
    Collecting { kind: SectionKind, level: usize, lines: Vec<&'a str>, started: bool },
}

/// Splits raw document text into recognized sections, in document order.
///
/// Never fails: a heading that does not occur simply yields no section.
pub fn split(raw: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut state = State::Idle;

    for line in raw.lines() {
        if let Some(heading) = classify_heading(line) {
            match heading.kind {
                Some(kind) => {
                    close(&mut state, &mut sections);
                    if sections.iter().any(|s| s.kind == kind) {
                        debug!(section = kind.name(), "duplicate heading ignored");
                        continue;
                    }
                    state = State::Collecting { kind, level: heading.level, lines: Vec::new(), started: false };
                }
                None => {
                    let closes = match &state {
                        State::Collecting { level, .. } => *level == 0 || heading.level <= *level,
                        State::Idle => false,
                    };
                    if closes {
                        close(&mut state, &mut sections);
                    } else if let State::Collecting { lines, .. } = &mut state {
                        lines.push(line);
                    }
                }
            }
            continue;
        }

        let paragraph_done = match &mut state {
            State::Idle => false,
            State::Collecting { kind: SectionKind::Summary, lines, started, .. } => {
                let text = strip_quote_markers(line);
                if text.trim().is_empty() {
                    *started
                } else {
                    *started = true;
                    lines.push(text);
                    false
                }
            }
            State::Collecting { lines, .. } => {
                lines.push(line);
                false
            }
        };

        if paragraph_done {
            close(&mut state, &mut sections);
        }
    }

    close(&mut state, &mut sections);
    sections
}

/// Finishes the open section, if any, and resets to idle.
fn close(state: &mut State<'_>, sections: &mut Vec<Section>) {
    if let State::Collecting { kind, lines, .. } = std::mem::replace(state, State::Idle) {
        let body = lines.join("\n").trim().to_string();
        sections.push(Section { kind, body });
    }
}

fn classify_heading(line: &str) -> Option<Heading> {
    let trimmed = line.trim();

    if let Some(rest) = trimmed.strip_prefix('#') {
        let level = 1 + rest.chars().take_while(|c| *c == '#').count();
        let text = rest.trim_start_matches('#');
        return Some(Heading { level, kind: lexicon::heading_kind(&normalize_keyword(text)) });
    }

    let unquoted = strip_quote_markers(trimmed);
    if is_list_item(unquoted) {
        return None;
    }
    if normalize_keyword(unquoted) == "SUMMARY" {
        return Some(Heading { level: 0, kind: Some(SectionKind::Summary) });
    }

    None
}

/// A bullet marker followed by whitespace; `**SUMMARY**` is not a list item.
fn is_list_item(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(chars.next(), Some(c) if lexicon::BULLET_MARKERS.contains(&c))
        && chars.next().is_some_and(char::is_whitespace)
}

/// Strips leading/trailing decoration (emoji, `*`, `:`) and folds case and separators.
fn normalize_keyword(text: &str) -> String {
    text.trim_matches(|c: char| !c.is_alphanumeric())
        .to_uppercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes leading `>` quote markers and the whitespace around them.
pub(crate) fn strip_quote_markers(line: &str) -> &str {
    line.trim_start().trim_start_matches(|c: char| c == '>' || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = "# SUMMARY\n\n> A short recap of the talk.\n\n# 💡 IDEAS:\n- first [[01:05]]\n- second\n\n## 🧠 insights\n* deep point\n\n# 🚀 ONE-SENTENCE TAKEAWAY\n\nShip it.\n";

    #[test]
    fn test_split_in_document_order() {
        let sections = split(SAMPLE);
        let kinds: Vec<_> = sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SectionKind::Summary, SectionKind::Ideas, SectionKind::Insights, SectionKind::Takeaway]
        );
        assert_eq!(sections[0].body, "A short recap of the talk.");
        assert_eq!(sections[1].body, "- first [[01:05]]\n- second");
        assert_eq!(sections[3].body, "Ship it.");
    }

    #[rstest]
    #[case("# IDEAS", Some(SectionKind::Ideas))]
    #[case("## 💡 Ideas:", Some(SectionKind::Ideas))]
    #[case("# 🗣️ QUOTES", Some(SectionKind::Quotes))]
    #[case("### **Facts**", Some(SectionKind::Facts))]
    #[case("# ONE SENTENCE TAKEAWAY", Some(SectionKind::Takeaway))]
    #[case("# Takeaway", Some(SectionKind::Takeaway))]
    #[case("# RECOMMENDATIONS", None)]
    fn test_classify_hash_headings(#[case] line: &str, #[case] expected: Option<SectionKind>) {
        assert_eq!(classify_heading(line).map(|h| h.kind), Some(expected));
    }

    #[rstest]
    #[case("SUMMARY")]
    #[case("**SUMMARY**")]
    #[case("> **Summary**")]
    fn test_bare_summary_marker(#[case] line: &str) {
        assert_eq!(classify_heading(line), Some(Heading { level: 0, kind: Some(SectionKind::Summary) }));
    }

    #[rstest]
    #[case("- Summary")]
    #[case("* **Summary**")]
    #[case("• SUMMARY")]
    #[case("> - summary")]
    fn test_summary_bullet_is_not_a_heading(#[case] line: &str) {
        assert_eq!(classify_heading(line), None);
    }

    #[test]
    fn test_summary_bullet_stays_in_list() {
        let doc = "# SUMMARY\nRecap.\n\n# IDEAS\n- first idea\n- Summary\n- third idea\n# INSIGHTS\n- deep\n";
        let sections = split(doc);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1].body, "- first idea\n- Summary\n- third idea");
        assert_eq!(sections[2].kind, SectionKind::Insights);
    }

    #[test]
    fn test_plain_text_is_not_a_heading() {
        assert_eq!(classify_heading("- a bullet"), None);
        assert_eq!(classify_heading("The summary of it all"), None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let sections = split("# FACTS\n- kept\n# FACTS\n- dropped\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "- kept");
    }

    #[test]
    fn test_unrecognized_heading_drops_its_body() {
        let sections = split("# IDEAS\n- one\n# RECOMMENDATIONS\n- not an idea\n# FACTS\n- fact\n");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body, "- one");
        assert_eq!(sections[1].body, "- fact");
    }

    #[test]
    fn test_deeper_unrecognized_heading_stays_in_body() {
        let sections = split("# IDEAS\n- one\n## Part two\n- two\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "- one\n## Part two\n- two");
    }

    #[test]
    fn test_summary_stops_at_blank_line() {
        let sections = split("**SUMMARY**\n> Line one\n> line two\n\nstray paragraph\n# IDEAS\n- a\n");
        assert_eq!(sections[0].body, "Line one\nline two");
        assert_eq!(sections[1].kind, SectionKind::Ideas);
    }

    #[test]
    fn test_missing_sections_are_absent() {
        assert!(split("no headings at all\n- just text").is_empty());
        assert!(split("").is_empty());
    }

    #[test]
    fn test_crlf_input() {
        let sections = split("# FACTS\r\n- one\r\n- two\r\n");
        assert_eq!(sections[0].body, "- one\n- two");
    }
}
