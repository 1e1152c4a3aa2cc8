use crate::resolver::tables::RuleTables;
use crate::schema::{RootCategory, ScoreBreakdown};

/// Outcome of one classification request.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub winner: Option<String>,
    pub breakdown: ScoreBreakdown,
    pub is_target: bool,
}

/// Pick the winning root from an aggregated breakdown.
///
/// Canonical roots compete first; exact ties go to the earlier entry of
/// `RootCategory::ALL`. When no canonical root holds any mass the whole
/// breakdown competes instead, so a verdict still comes out of degenerate
/// input. An empty breakdown has no winner.
pub fn decide(breakdown: ScoreBreakdown, tables: &RuleTables, target: RootCategory) -> Decision {
    let mut winner: Option<(String, f64)> = None;

    for root in RootCategory::ALL {
        let name = tables.roots.name_of(root);
        if let Some(&score) = breakdown.get(name)
            && winner.as_ref().is_none_or(|(_, best)| score > *best)
        {
            winner = Some((name.to_string(), score));
        }
    }

    if winner.is_none() {
        for (name, &score) in &breakdown {
            if winner.as_ref().is_none_or(|(_, best)| score > *best) {
                winner = Some((name.clone(), score));
            }
        }
    }

    let winner = winner.map(|(name, _)| name);
    let is_target = winner.as_deref() == Some(tables.roots.name_of(target));
    Decision {
        winner,
        breakdown,
        is_target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn breakdown(entries: &[(&str, f64)]) -> ScoreBreakdown {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<BTreeMap<_, _>>()
    }

    #[test]
    fn highest_scoring_root_wins() {
        let tables = RuleTables::default();
        let decision = decide(
            breakdown(&[("可回收物", 1.3), ("其他垃圾", 0.3)]),
            &tables,
            RootCategory::Recyclable,
        );
        assert_eq!(decision.winner.as_deref(), Some("可回收物"));
        assert!(decision.is_target);
    }

    #[test]
    fn exact_tie_goes_to_enumeration_order() {
        let tables = RuleTables::default();
        let decision = decide(
            breakdown(&[("其他垃圾", 0.5), ("厨余垃圾", 0.5)]),
            &tables,
            RootCategory::Recyclable,
        );
        // Kitchen precedes Other in RootCategory::ALL.
        assert_eq!(decision.winner.as_deref(), Some("厨余垃圾"));
        assert!(!decision.is_target);
    }

    #[test]
    fn unrecognized_keys_lose_to_any_canonical_root() {
        let tables = RuleTables::default();
        let decision = decide(
            breakdown(&[("mystery", 9.0), ("其他垃圾", 0.1)]),
            &tables,
            RootCategory::Recyclable,
        );
        assert_eq!(decision.winner.as_deref(), Some("其他垃圾"));
    }

    #[test]
    fn all_unrecognized_falls_back_to_the_whole_breakdown() {
        let tables = RuleTables::default();
        let decision = decide(
            breakdown(&[("mystery", 0.2), ("widget", 0.7)]),
            &tables,
            RootCategory::Recyclable,
        );
        assert_eq!(decision.winner.as_deref(), Some("widget"));
        assert!(!decision.is_target);
    }

    #[test]
    fn empty_breakdown_has_no_winner() {
        let tables = RuleTables::default();
        let decision = decide(ScoreBreakdown::new(), &tables, RootCategory::Recyclable);
        assert_eq!(decision.winner, None);
        assert!(!decision.is_target);
        assert!(decision.breakdown.is_empty());
    }

    #[test]
    fn target_root_is_configurable() {
        let tables = RuleTables::default();
        let decision = decide(
            breakdown(&[("有害垃圾", 0.8)]),
            &tables,
            RootCategory::Hazardous,
        );
        assert!(decision.is_target);
    }
}
