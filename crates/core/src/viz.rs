//! Visualization synthesis from a validated summary.
//!
//! Produces three things, all deterministic for a given summary:
//! - a mindmap clustering ideas into thirds plus insight and takeaway branches,
//! - up to [`MAX_STATS`] numeric stats scanned from facts then ideas,
//! - a coarse "is this a comparison" flag from keyword matching.
//!
//! Nothing here fails; the worst case is an empty [`VizData`].

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::{
    COMPARISON_KEYWORDS, LABEL_CORE_CONCLUSION, LABEL_CORE_VIEWPOINTS, LABEL_DEEP_INSIGHTS, LABEL_FALLBACK_ROOT,
    LABEL_FURTHER_REFLECTIONS, LABEL_KEY_ARGUMENTS, MAX_STATS, MINDMAP_BRANCH_ITEMS, MINDMAP_ROOT_CHARS,
    STAT_LABEL_CHARS, STAT_PATTERNS, StatPattern, TAG_COMPARISON, TAG_STATS, UnitPlacement,
};
use crate::summary::{Mindmap, MindmapNode, Stat, StructuredSummary, VizData};

static STAT_REGEXES: LazyLock<Vec<(Regex, StatPattern)>> = LazyLock::new(|| {
    STAT_PATTERNS
        .iter()
        .map(|row| (Regex::new(row.pattern).unwrap(), *row))
        .collect()
});

/// Output of [`synthesize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synthesis {
    pub viz_data: VizData,
    /// `"stats"` and/or `"comparison"`, in that order.
    pub suggested_viz: Vec<String>,
}

/// Builds visualization data and suggested tags for a summary.
///
/// # Example
///
/// ```rust
/// use tldw_core::{extract_summary, synthesize};
///
/// let doc = "# SUMMARY\nRevenue grew.\n# IDEAS\n- Sales rose 30% year over year\n# INSIGHTS\n- Margins matter\n";
/// let summary = extract_summary(doc, "abc").unwrap();
/// let synthesis = synthesize(&summary);
/// assert_eq!(synthesis.viz_data.stats[0].value, "30%");
/// assert_eq!(synthesis.suggested_viz, vec!["stats"]);
/// ```
pub fn synthesize(summary: &StructuredSummary) -> Synthesis {
    let mindmap = build_mindmap(summary);
    let stats = extract_stats(summary.facts.iter().map(String::as_str).chain(summary.idea_texts()));

    let mut suggested_viz = Vec::new();
    if !stats.is_empty() {
        suggested_viz.push(TAG_STATS.to_string());
    }
    if detect_comparison(summary) {
        suggested_viz.push(TAG_COMPARISON.to_string());
    }

    Synthesis { viz_data: VizData { mindmap, stats }, suggested_viz }
}

/// Clusters ideas, insights and the takeaway into a two-level mindmap.
///
/// Ideas are only clustered when there are at least three, `len / 3` per
/// branch with the remainder in the last, so exactly three ideas give three
/// single-item branches. The mindmap is `None` when no branch would be produced.
pub fn build_mindmap(summary: &StructuredSummary) -> Option<Mindmap> {
    let ideas: Vec<&str> = summary.idea_texts().collect();
    let mut children = Vec::new();

    if ideas.len() >= 3 {
        let third = ideas.len() / 3;
        let groups = [
            (LABEL_CORE_VIEWPOINTS, &ideas[..third]),
            (LABEL_KEY_ARGUMENTS, &ideas[third..2 * third]),
            (LABEL_FURTHER_REFLECTIONS, &ideas[2 * third..]),
        ];
        for (label, group) in groups {
            children.push(MindmapNode::leaves(label, group.iter().take(MINDMAP_BRANCH_ITEMS).copied()));
        }
    }

    if !summary.insights.is_empty() {
        children.push(MindmapNode::leaves(
            LABEL_DEEP_INSIGHTS,
            summary.insights.iter().take(MINDMAP_BRANCH_ITEMS).map(String::as_str),
        ));
    }

    if let Some(takeaway) = summary.takeaway.as_deref().filter(|t| !t.is_empty()) {
        children.push(MindmapNode::leaves(LABEL_CORE_CONCLUSION, [takeaway]));
    }

    if children.is_empty() {
        return None;
    }

    Some(Mindmap { root: root_label(&summary.tldr), children })
}

/// First [`MINDMAP_ROOT_CHARS`] characters of the tldr, `...` when cut.
fn root_label(tldr: &str) -> String {
    if tldr.is_empty() {
        return LABEL_FALLBACK_ROOT.to_string();
    }
    if tldr.chars().count() > MINDMAP_ROOT_CHARS {
        let head: String = tldr.chars().take(MINDMAP_ROOT_CHARS).collect();
        format!("{}...", head)
    } else {
        tldr.to_string()
    }
}

/// Scans sentences for numeric stats, first occurrence of each value wins.
///
/// Sentences are scanned in the given order and each sentence against the
/// pattern table in order; collection stops at [`MAX_STATS`].
pub fn extract_stats<'a>(sources: impl IntoIterator<Item = &'a str>) -> Vec<Stat> {
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .flat_map(stat_candidates)
        .filter(|stat| seen.insert(stat.value.clone()))
        .take(MAX_STATS)
        .collect()
}

fn stat_candidates(text: &str) -> impl Iterator<Item = Stat> + '_ {
    let label = text.chars().take(STAT_LABEL_CHARS).collect::<String>().trim().to_string();
    STAT_REGEXES.iter().flat_map(move |(re, row)| {
        let label = label.clone();
        re.captures_iter(text)
            .map(move |caps| Stat { value: render_value(row, &caps[1]), label: label.clone() })
    })
}

fn render_value(row: &StatPattern, number: &str) -> String {
    match row.placement {
        UnitPlacement::Prefix => format!("{}{}", row.unit, number),
        UnitPlacement::Suffix => format!("{}{}", number, row.unit),
    }
}

/// True when the joined idea texts contain any comparison keyword.
pub fn detect_comparison(summary: &StructuredSummary) -> bool {
    let joined = summary.idea_texts().collect::<Vec<_>>().join(" ");
    COMPARISON_KEYWORDS.iter().any(|keyword| joined.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{Idea, MindmapChild};
    use serde_json::Map;

    fn summary(ideas: &[&str], insights: &[&str], takeaway: Option<&str>) -> StructuredSummary {
        StructuredSummary {
            source_id: "vid".to_string(),
            tldr: "A talk about rockets".to_string(),
            ideas: ideas.iter().map(|t| Idea::new(*t, None)).collect(),
            insights: insights.iter().map(|s| s.to_string()).collect(),
            quotes: vec![],
            facts: vec![],
            takeaway: takeaway.map(str::to_string),
            viz_data: None,
            suggested_viz: vec![],
            extra: Map::new(),
        }
    }

    fn leaves(node: &MindmapNode) -> Vec<&str> {
        node.children
            .iter()
            .map(|child| match child {
                MindmapChild::Leaf(s) => s.as_str(),
                MindmapChild::Node(n) => n.label.as_str(),
            })
            .collect()
    }

    #[test]
    fn test_two_ideas_no_mindmap() {
        assert_eq!(build_mindmap(&summary(&["a", "b"], &[], None)), None);
    }

    #[test]
    fn test_three_ideas_split_into_thirds() {
        let mindmap = build_mindmap(&summary(&["a", "b", "c"], &[], None)).unwrap();
        let labels: Vec<_> = mindmap.children.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec![LABEL_CORE_VIEWPOINTS, LABEL_KEY_ARGUMENTS, LABEL_FURTHER_REFLECTIONS]);
        assert_eq!(leaves(&mindmap.children[0]), vec!["a"]);
        assert_eq!(leaves(&mindmap.children[1]), vec!["b"]);
        assert_eq!(leaves(&mindmap.children[2]), vec!["c"]);
    }

    #[test]
    fn test_branches_capped_at_three_items() {
        let ideas: Vec<String> = (1..=11).map(|i| format!("i{}", i)).collect();
        let ideas: Vec<&str> = ideas.iter().map(String::as_str).collect();
        let mindmap = build_mindmap(&summary(&ideas, &["s1", "s2", "s3", "s4"], Some("done"))).unwrap();

        assert_eq!(mindmap.children.len(), 5);
        assert_eq!(leaves(&mindmap.children[0]), vec!["i1", "i2", "i3"]);
        assert_eq!(leaves(&mindmap.children[1]), vec!["i4", "i5", "i6"]);
        assert_eq!(leaves(&mindmap.children[2]), vec!["i7", "i8", "i9"]);
        assert_eq!(leaves(&mindmap.children[3]), vec!["s1", "s2", "s3"]);
        assert_eq!(mindmap.children[4].label, LABEL_CORE_CONCLUSION);
        assert_eq!(leaves(&mindmap.children[4]), vec!["done"]);
    }

    #[test]
    fn test_insights_alone_make_a_mindmap() {
        let mindmap = build_mindmap(&summary(&["only one"], &["deep"], None)).unwrap();
        assert_eq!(mindmap.children.len(), 1);
        assert_eq!(mindmap.children[0].label, LABEL_DEEP_INSIGHTS);
    }

    #[test]
    fn test_root_label() {
        assert_eq!(root_label(""), LABEL_FALLBACK_ROOT);
        assert_eq!(root_label("short"), "short");
        let long = "这是一个非常长的总结句子用来测试截断逻辑是否按照字符而不是字节进行处理的情况";
        let label = root_label(long);
        assert!(label.ends_with("..."));
        assert_eq!(label.chars().count(), MINDMAP_ROOT_CHARS + 3);
    }

    #[test]
    fn test_stat_values_and_units() {
        let stats = extract_stats(["用户达到 12万，增长 30%", "融资 $4.5M，估值 3 亿", "2020-2024年 增长 5倍"]);
        let values: Vec<_> = stats.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["12万", "30%", "3亿", "$4.5M", "2020-2024年", "5倍"]);
    }

    #[test]
    fn test_stat_label_is_first_twenty_chars() {
        let stats = extract_stats(["  The market grew by 40% over the last decade"]);
        assert_eq!(stats[0].label, "The market grew by");
    }

    #[test]
    fn test_stats_deduplicated_and_capped() {
        let stats = extract_stats(["10% 20% 10%", "30% 40% 50% 60% 70%", "80%"]);
        let values: Vec<_> = stats.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["10%", "20%", "30%", "40%", "50%", "60%"]);
    }

    #[test]
    fn test_facts_scanned_before_ideas() {
        let mut s = summary(&["ideas say 5倍"], &[], None);
        s.facts = vec!["facts say 7倍".to_string()];
        let synthesis = synthesize(&s);
        assert_eq!(synthesis.viz_data.stats[0].value, "7倍");
        assert_eq!(synthesis.viz_data.stats[1].value, "5倍");
    }

    #[test]
    fn test_comparison_detection() {
        let s = summary(&["传统方案成本更高", "新型方案更高效"], &[], None);
        assert!(detect_comparison(&s));
        assert_eq!(synthesize(&s).suggested_viz, vec![TAG_COMPARISON]);

        assert!(!detect_comparison(&summary(&["nothing comparative"], &[], None)));
    }

    #[test]
    fn test_empty_summary_synthesizes_nothing() {
        let synthesis = synthesize(&summary(&[], &[], None));
        assert!(synthesis.viz_data.is_empty());
        assert!(synthesis.suggested_viz.is_empty());
    }
}
