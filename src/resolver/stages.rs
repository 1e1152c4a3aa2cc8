use super::tables::RuleTables;
use crate::schema::RootCategory;
use regex::Regex;
use std::sync::LazyLock;

/// One stage of the resolution chain. Stages are pure functions over the
/// rule tables; the first stage to return `Some` wins.
pub trait ResolveStage: Sync {
    fn name(&self) -> &'static str;
    fn resolve(&self, label: &str, tables: &RuleTables) -> Option<RootCategory>;
}

/// Dash-like separators between a root prefix and the sub-label: ASCII
/// hyphen, en dash, em dash, full-width hyphen. Runs collapse into one.
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-–—－]+").expect("separator pattern"));

/// Text before the first separator, trimmed and run through the alias table.
pub(super) fn normalized_prefix<'a>(label: &'a str, tables: &'a RuleTables) -> &'a str {
    let prefix = SEPARATOR.split(label).next().unwrap_or(label);
    tables.apply_alias(prefix)
}

/// English marker substrings per root. Fixed, not configuration: these are
/// the normalization vocabulary, not the keyword heuristics. Checked in
/// `RootCategory::ALL` order; the first matching root wins even when markers
/// from several roots appear in the same string.
const ENGLISH_MARKERS: [(RootCategory, &[&str]); 4] = [
    (RootCategory::Recyclable, &["recycl"]),
    (RootCategory::Kitchen, &["kitchen", "organic", "compost"]),
    (RootCategory::Hazardous, &["hazard", "harmful", "toxic"]),
    (RootCategory::Other, &["other", "residual", "trash"]),
];

fn english_root(candidate: &str) -> Option<RootCategory> {
    let lower = candidate.to_lowercase();
    ENGLISH_MARKERS
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| lower.contains(m)))
        .map(|(root, _)| *root)
}

/// Splits off the text before the first dash-like separator, applies the
/// alias table, and accepts the candidate if it names a root directly or
/// through an English marker.
pub struct PrefixStage;

impl ResolveStage for PrefixStage {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn resolve(&self, label: &str, tables: &RuleTables) -> Option<RootCategory> {
        let candidate = normalized_prefix(label, tables);
        tables
            .roots
            .root_for(candidate)
            .or_else(|| english_root(candidate))
    }
}

/// Exact, case-insensitive match of the whole raw label against the
/// externally supplied class-name table.
pub struct LabelMapStage;

impl ResolveStage for LabelMapStage {
    fn name(&self) -> &'static str {
        "label_map"
    }

    fn resolve(&self, label: &str, tables: &RuleTables) -> Option<RootCategory> {
        tables.label_map.get(&label.trim().to_lowercase()).copied()
    }
}

/// Case-insensitive substring search against the per-root keyword lists.
/// Roots are checked in enumeration order, so a label matching keywords from
/// several roots deterministically lands on the earliest one.
pub struct KeywordStage;

impl ResolveStage for KeywordStage {
    fn name(&self) -> &'static str {
        "keywords"
    }

    fn resolve(&self, label: &str, tables: &RuleTables) -> Option<RootCategory> {
        let lower = label.to_lowercase();
        RootCategory::ALL.into_iter().find(|&root| {
            tables
                .keywords
                .for_root(root)
                .iter()
                .any(|keyword| !keyword.is_empty() && lower.contains(keyword.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_stage_accepts_all_separator_variants() {
        let tables = RuleTables::default();
        for label in ["可回收物-瓶", "可回收物－瓶", "可回收物—瓶", "可回收物--瓶"] {
            assert_eq!(
                PrefixStage.resolve(label, &tables),
                Some(RootCategory::Recyclable),
                "label: {label}"
            );
        }
    }

    #[test]
    fn prefix_stage_applies_alias_before_closed_set_check() {
        let tables = RuleTables::default();
        assert_eq!(
            PrefixStage.resolve("可回收-易拉罐", &tables),
            Some(RootCategory::Recyclable)
        );
        assert_eq!(
            PrefixStage.resolve("其它垃圾-餐盒", &tables),
            Some(RootCategory::Other)
        );
    }

    #[test]
    fn prefix_stage_normalizes_english_markers() {
        let tables = RuleTables::default();
        assert_eq!(
            PrefixStage.resolve("Recyclable-bottle", &tables),
            Some(RootCategory::Recyclable)
        );
        assert_eq!(
            PrefixStage.resolve("kitchen waste - peel", &tables),
            Some(RootCategory::Kitchen)
        );
        assert_eq!(
            PrefixStage.resolve("Hazardous Waste—battery", &tables),
            Some(RootCategory::Hazardous)
        );
    }

    #[test]
    fn prefix_stage_rejects_unrelated_prefixes() {
        let tables = RuleTables::default();
        assert_eq!(PrefixStage.resolve("banana-ish", &tables), None);
        assert_eq!(PrefixStage.resolve("widget", &tables), None);
    }

    #[test]
    fn label_map_stage_matches_whole_label_case_insensitively() {
        let tables = RuleTables::default();
        assert_eq!(
            LabelMapStage.resolve("Banana", &tables),
            Some(RootCategory::Kitchen)
        );
        assert_eq!(
            LabelMapStage.resolve("  battery ", &tables),
            Some(RootCategory::Hazardous)
        );
        // Substrings are not this stage's business.
        assert_eq!(LabelMapStage.resolve("banana peel bin", &tables), None);
    }

    #[test]
    fn keyword_stage_finds_substrings() {
        let tables = RuleTables::default();
        assert_eq!(
            KeywordStage.resolve("plastic bag", &tables),
            Some(RootCategory::Recyclable)
        );
        assert_eq!(
            KeywordStage.resolve("used tissue", &tables),
            Some(RootCategory::Other)
        );
        assert_eq!(KeywordStage.resolve("mystery object", &tables), None);
    }

    #[test]
    fn keyword_stage_breaks_multi_root_ties_by_enumeration_order() {
        let tables = RuleTables::default();
        // Matches both "plastic" (recyclable) and "tissue" (other); the
        // earlier root in enumeration order wins.
        assert_eq!(
            KeywordStage.resolve("plastic tissue wrapper", &tables),
            Some(RootCategory::Recyclable)
        );
    }
}
