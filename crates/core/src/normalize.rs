//! Field normalization: turns each [`Section`] into a typed field value.
//!
//! List sections keep only bulleted lines (`-`, `*`, `•`), clean each item
//! with per-field rules and truncate to the field's cap. Scalar sections keep
//! the trimmed body. Nothing here fails; odd input degrades to empty or absent
//! values and the validator decides what is acceptable.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::lexicon::{BULLET_MARKERS, MAX_FACTS, MAX_IDEAS, MAX_INSIGHTS, MAX_QUOTES, QUOTE_MARKS};
use crate::sections::{Section, SectionKind, strip_quote_markers};
use crate::summary::Idea;

/// `[[MM:SS]]`, `[MM:SS]` or the half-doubled forms.
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[?(\d+):(\d+)\]?\]").unwrap());

/// A timestamp token plus an optional `(link)` suffix and the whitespace before it.
static TIMESTAMP_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[\[?\d+:\d+\]?\](?:\([^)]*\))?").unwrap());

static SPEAKER_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*-\s*Speaker.*$").unwrap());

static TRAILING_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\[\[?\d+:\d+\]?\].*$").unwrap());

/// A normalized section value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Tldr(Option<String>),
    Ideas(Vec<Idea>),
    Insights(Vec<String>),
    Quotes(Vec<String>),
    Facts(Vec<String>),
    Takeaway(Option<String>),
}

/// Normalizes one section according to its kind.
pub fn normalize(section: &Section) -> Field {
    let body = section.body.as_str();
    match section.kind {
        SectionKind::Summary => Field::Tldr(scalar(body)),
        SectionKind::Takeaway => Field::Takeaway(scalar(body)),
        SectionKind::Ideas => Field::Ideas(
            bullets(body)
                .map(parse_idea)
                .filter(|idea| !idea.text.is_empty())
                .take(MAX_IDEAS)
                .collect(),
        ),
        SectionKind::Insights => Field::Insights(collect(body, clean_insight, MAX_INSIGHTS)),
        SectionKind::Quotes => Field::Quotes(collect(body, clean_quote, MAX_QUOTES)),
        SectionKind::Facts => Field::Facts(collect(body, |s| s.trim().to_string(), MAX_FACTS)),
    }
}

/// Partially populated summary assembled from normalized sections.
///
/// `None` means the section never appeared; `Some(vec![])` means it appeared
/// without usable items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub tldr: Option<String>,
    pub ideas: Option<Vec<Idea>>,
    pub insights: Option<Vec<String>>,
    pub quotes: Option<Vec<String>>,
    pub facts: Option<Vec<String>>,
    pub takeaway: Option<String>,
}

impl Draft {
    /// Normalizes every section and collects the results.
    pub fn from_sections(sections: &[Section]) -> Self {
        let mut draft = Draft::default();
        for section in sections {
            draft.apply(normalize(section));
        }
        draft
    }

    pub fn apply(&mut self, field: Field) {
        match field {
            Field::Tldr(v) => self.tldr = v,
            Field::Ideas(v) => self.ideas = Some(v),
            Field::Insights(v) => self.insights = Some(v),
            Field::Quotes(v) => self.quotes = Some(v),
            Field::Facts(v) => self.facts = Some(v),
            Field::Takeaway(v) => self.takeaway = v,
        }
    }

    /// Renders the draft as a candidate object for the validator.
    ///
    /// Absent fields are left out so the validator can name them.
    pub fn into_candidate(self) -> Value {
        let mut map = Map::new();
        if let Some(tldr) = self.tldr {
            map.insert("tldr".to_string(), Value::String(tldr));
        }
        if let Some(ideas) = self.ideas {
            map.insert("ideas".to_string(), json!(ideas));
        }
        if let Some(insights) = self.insights {
            map.insert("insights".to_string(), json!(insights));
        }
        if let Some(quotes) = self.quotes {
            map.insert("quotes".to_string(), json!(quotes));
        }
        if let Some(facts) = self.facts {
            map.insert("facts".to_string(), json!(facts));
        }
        if let Some(takeaway) = self.takeaway {
            map.insert("takeaway".to_string(), Value::String(takeaway));
        }
        Value::Object(map)
    }
}

/// Bulleted lines of a body, marker and leading whitespace removed.
fn bullets(body: &str) -> impl Iterator<Item = &str> {
    body.lines().filter_map(|line| {
        let line = line.trim();
        let mut chars = line.chars();
        match chars.next() {
            Some(c) if BULLET_MARKERS.contains(&c) => Some(chars.as_str().trim_start()),
            _ => None,
        }
    })
}

fn collect(body: &str, clean: impl Fn(&str) -> String, cap: usize) -> Vec<String> {
    bullets(body).map(clean).filter(|s| !s.is_empty()).take(cap).collect()
}

fn scalar(body: &str) -> Option<String> {
    let text = body.lines().map(strip_quote_markers).collect::<Vec<_>>().join("\n");
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

/// Splits an idea bullet into text and an optional timestamp in seconds.
pub fn parse_idea(item: &str) -> Idea {
    let timestamp_seconds = TIMESTAMP.captures(item).and_then(|caps| {
        let minutes: u32 = caps[1].parse().ok()?;
        let seconds: u32 = caps[2].parse().ok()?;
        minutes.checked_mul(60)?.checked_add(seconds)
    });
    let text = TIMESTAMP_TOKEN.replace_all(item, "").trim().to_string();
    Idea { text, timestamp_seconds }
}

fn clean_insight(item: &str) -> String {
    TIMESTAMP_TOKEN.replace_all(item, "").trim().to_string()
}

/// Drops a `- Speaker` attribution, a trailing timestamp and surrounding quote marks.
fn clean_quote(item: &str) -> String {
    let text = SPEAKER_SUFFIX.replace(item, "");
    let text = TRAILING_TIMESTAMP.replace(&text, "");
    text.trim().trim_matches(QUOTE_MARKS).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn section(kind: SectionKind, body: &str) -> Section {
        Section { kind, body: body.to_string() }
    }

    #[rstest]
    #[case("Rockets are cheap now [[12:05]]", "Rockets are cheap now", Some(725))]
    #[case("Linked [12:05](https://youtu.be/x?t=725) point", "Linked point", Some(725))]
    #[case("Doubled link [[00:30]](https://youtu.be/x?t=30)", "Doubled link", Some(30))]
    #[case("No marker here", "No marker here", None)]
    fn test_parse_idea(#[case] input: &str, #[case] text: &str, #[case] ts: Option<u32>) {
        let idea = parse_idea(input);
        assert_eq!(idea.text, text);
        assert_eq!(idea.timestamp_seconds, ts);
    }

    #[test]
    fn test_timestamp_token_removed() {
        let idea = parse_idea("Point [[12:05]]");
        assert!(!idea.text.contains("12:05"));
        assert_eq!(idea.timestamp_seconds, Some(725));
    }

    #[test]
    fn test_only_bulleted_lines_count() {
        let field = normalize(&section(SectionKind::Facts, "- one\nnot a bullet\n\n* two\n• three\n  - four"));
        assert_eq!(
            field,
            Field::Facts(vec!["one".into(), "two".into(), "three".into(), "four".into()])
        );
    }

    #[rstest]
    #[case(r#"- "Stay hungry." - Speaker 1 [03:10]"#, "Stay hungry.")]
    #[case("- “Move fast.” [01:00]", "Move fast.")]
    #[case("- 'Plain quote'", "Plain quote")]
    fn test_quote_cleanup(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(normalize(&section(SectionKind::Quotes, body)), Field::Quotes(vec![expected.to_string()]));
    }

    #[test]
    fn test_insight_timestamps_stripped() {
        let field = normalize(&section(SectionKind::Insights, "- Deep [[02:00]](https://x)\n- [[03:00]]"));
        assert_eq!(field, Field::Insights(vec!["Deep".to_string()]));
    }

    #[test]
    fn test_caps_keep_first_items() {
        let body: String = (1..=20).map(|i| format!("- idea {}\n", i)).collect();
        let Field::Ideas(ideas) = normalize(&section(SectionKind::Ideas, &body)) else {
            panic!("expected ideas");
        };
        assert_eq!(ideas.len(), MAX_IDEAS);
        assert_eq!(ideas[0].text, "idea 1");
        assert_eq!(ideas[14].text, "idea 15");

        let Field::Quotes(quotes) = normalize(&section(SectionKind::Quotes, &body)) else {
            panic!("expected quotes");
        };
        assert_eq!(quotes.len(), MAX_QUOTES);
    }

    #[test]
    fn test_scalar_fields() {
        assert_eq!(
            normalize(&section(SectionKind::Summary, "> quoted\n> recap")),
            Field::Tldr(Some("quoted\nrecap".to_string()))
        );
        assert_eq!(normalize(&section(SectionKind::Takeaway, "   ")), Field::Takeaway(None));
    }

    #[test]
    fn test_draft_candidate_omits_absent_fields() {
        let draft = Draft::from_sections(&[section(SectionKind::Summary, "tl;dr"), section(SectionKind::Ideas, "")]);
        let candidate = draft.into_candidate();
        assert_eq!(candidate, json!({"tldr": "tl;dr", "ideas": []}));
    }
}
