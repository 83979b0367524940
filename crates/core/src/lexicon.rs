//! Fixed lexicons shared by the extraction and synthesis stages.
//!
//! These tables are the de-facto wire format of stored summaries: heading
//! keywords, bullet markers, list caps, numeric stat patterns, comparison
//! keywords and mindmap labels. Changing any entry changes the output for
//! existing documents, so bump [`LEXICON_VERSION`] alongside it.

use crate::sections::SectionKind;

/// Revision of the tables in this module.
pub const LEXICON_VERSION: u32 = 1;

/// Heading keywords, compared after decoration stripping, uppercasing and
/// folding `-`/`_` runs into single spaces.
pub const HEADINGS: &[(&str, SectionKind)] = &[
    ("SUMMARY", SectionKind::Summary),
    ("IDEAS", SectionKind::Ideas),
    ("INSIGHTS", SectionKind::Insights),
    ("QUOTES", SectionKind::Quotes),
    ("FACTS", SectionKind::Facts),
    ("TAKEAWAY", SectionKind::Takeaway),
    ("ONE SENTENCE TAKEAWAY", SectionKind::Takeaway),
];

/// Characters that open a list item.
pub const BULLET_MARKERS: &[char] = &['-', '*', '•'];

/// Characters stripped from both ends of a quote.
pub const QUOTE_MARKS: &[char] = &['"', '\'', '“', '”', '‘', '’', '「', '」'];

pub const MAX_IDEAS: usize = 15;
pub const MAX_INSIGHTS: usize = 10;
pub const MAX_QUOTES: usize = 5;
pub const MAX_FACTS: usize = 8;
pub const MAX_STATS: usize = 6;

/// Characters of the source sentence kept as a stat label.
pub const STAT_LABEL_CHARS: usize = 20;

/// Characters of the tldr kept as the mindmap root label.
pub const MINDMAP_ROOT_CHARS: usize = 30;

/// Items kept per mindmap branch.
pub const MINDMAP_BRANCH_ITEMS: usize = 3;

/// Where the unit goes when a stat value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitPlacement {
    Prefix,
    Suffix,
}

/// One row of the numeric stat table.
///
/// `pattern` has exactly one capture group holding the number.
#[derive(Debug, Clone, Copy)]
pub struct StatPattern {
    pub pattern: &'static str,
    pub unit: &'static str,
    pub placement: UnitPlacement,
}

/// Ordered stat patterns; earlier rows are evaluated first for each sentence.
pub const STAT_PATTERNS: &[StatPattern] = &[
    StatPattern { pattern: r"(\d+(?:\.\d+)?)\s*万", unit: "万", placement: UnitPlacement::Suffix },
    StatPattern { pattern: r"(\d+(?:\.\d+)?)\s*亿", unit: "亿", placement: UnitPlacement::Suffix },
    StatPattern { pattern: r"(\d+(?:\.\d+)?)\s*%", unit: "%", placement: UnitPlacement::Suffix },
    StatPattern { pattern: r"\$(\d+(?:\.\d+)?[KMB]?)", unit: "$", placement: UnitPlacement::Prefix },
    StatPattern { pattern: r"(\d+(?:-\d+)?)\s*年", unit: "年", placement: UnitPlacement::Suffix },
    StatPattern { pattern: r"(\d+(?:\.\d+)?)\s*倍", unit: "倍", placement: UnitPlacement::Suffix },
];

/// Substrings that mark an idea list as comparative.
pub const COMPARISON_KEYWORDS: &[&str] = &[
    "vs", "VS", "对比", "相比", "优势", "劣势", "传统", "新型", "地面", "太空", "之前", "之后",
];

/// Mindmap branch for the first third of the ideas ("core viewpoints").
pub const LABEL_CORE_VIEWPOINTS: &str = "核心观点";
/// Mindmap branch for the middle third of the ideas ("key arguments").
pub const LABEL_KEY_ARGUMENTS: &str = "关键论据";
/// Mindmap branch for the remaining ideas ("further reflections").
pub const LABEL_FURTHER_REFLECTIONS: &str = "延伸思考";
/// Mindmap branch for insights ("deep insights").
pub const LABEL_DEEP_INSIGHTS: &str = "深度洞察";
/// Mindmap branch holding the takeaway ("core conclusion").
pub const LABEL_CORE_CONCLUSION: &str = "核心结论";
/// Mindmap root when the tldr is empty ("video summary").
pub const LABEL_FALLBACK_ROOT: &str = "视频总结";

/// Tag added to `suggested_viz` when stats were extracted.
pub const TAG_STATS: &str = "stats";
/// Tag added to `suggested_viz` when the ideas read as a comparison.
pub const TAG_COMPARISON: &str = "comparison";

/// Keys the repair pass carries over from the outer object when flattening.
pub const REPAIR_METADATA_FIELDS: &[&str] =
    &["status", "video_id", "sourceId", "title", "channel", "duration", "views", "likes"];

/// Required summary fields, in schema order.
pub const REQUIRED_FIELDS: &[&str] = &["tldr", "ideas", "insights"];

/// Looks up the section kind for a normalized heading keyword.
pub fn heading_kind(keyword: &str) -> Option<SectionKind> {
    HEADINGS
        .iter()
        .find(|(name, _)| *name == keyword)
        .map(|(_, kind)| *kind)
}
