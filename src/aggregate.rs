use crate::resolver;
use crate::resolver::tables::RuleTables;
use crate::schema::{RawSignal, ScoreBreakdown};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// How many per-class signals fold into one score per root. Closed set:
/// adding a policy is a compile-time-checked exhaustive match, not a string
/// fallthrough.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Every signal contributes its confidence to its root. Roots with many
    /// sub-labels accumulate mass from sheer signal count.
    #[default]
    SumAll,
    /// Only the single globally strongest signal contributes.
    Top1Max,
    /// The `top_k` strongest signals at or above `min_probability`
    /// contribute.
    TopkSum,
    /// Each signal at or above `min_probability` contributes its confidence
    /// divided by the number of distinct labels its root owns in this
    /// request, damping the many-sub-labels bias of `SumAll`.
    NormalizedSum,
}

impl AggregationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationPolicy::SumAll => "sum_all",
            AggregationPolicy::Top1Max => "top1_max",
            AggregationPolicy::TopkSum => "topk_sum",
            AggregationPolicy::NormalizedSum => "normalized_sum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown aggregation policy: {0}")]
pub struct UnknownPolicy(pub String);

impl std::str::FromStr for AggregationPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum_all" => Ok(AggregationPolicy::SumAll),
            "top1_max" => Ok(AggregationPolicy::Top1Max),
            "topk_sum" => Ok(AggregationPolicy::TopkSum),
            "normalized_sum" => Ok(AggregationPolicy::NormalizedSum),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// Fold signals into per-root totals under `policy`.
///
/// Every label is resolved first, whatever the policy; `min_probability`
/// only applies where a policy says so. Confidences are summed as given —
/// out-of-range values from a misbehaving model pass through rather than
/// erroring. Empty input yields an empty breakdown.
pub fn aggregate(
    signals: &[RawSignal],
    tables: &RuleTables,
    policy: AggregationPolicy,
    top_k: usize,
    min_probability: f64,
) -> ScoreBreakdown {
    let keys: Vec<String> = signals
        .iter()
        .map(|signal| resolver::resolve(&signal.label, tables).key(tables).to_string())
        .collect();

    let mut breakdown = ScoreBreakdown::new();
    match policy {
        AggregationPolicy::SumAll => {
            for (signal, key) in signals.iter().zip(&keys) {
                *breakdown.entry(key.clone()).or_insert(0.0) += signal.confidence;
            }
        }
        AggregationPolicy::Top1Max => {
            let mut best: Option<usize> = None;
            for (i, signal) in signals.iter().enumerate() {
                // Strictly greater, so the first of tied maxima wins.
                if best.is_none_or(|b| signal.confidence > signals[b].confidence) {
                    best = Some(i);
                }
            }
            if let Some(i) = best {
                breakdown.insert(keys[i].clone(), signals[i].confidence);
            }
        }
        AggregationPolicy::TopkSum => {
            let mut ranked: Vec<usize> = (0..signals.len()).collect();
            // Stable sort: tied confidences keep input order.
            ranked.sort_by(|&a, &b| {
                signals[b]
                    .confidence
                    .partial_cmp(&signals[a].confidence)
                    .unwrap_or(Ordering::Equal)
            });
            for &i in ranked.iter().take(top_k) {
                if signals[i].confidence >= min_probability {
                    *breakdown.entry(keys[i].clone()).or_insert(0.0) += signals[i].confidence;
                }
            }
        }
        AggregationPolicy::NormalizedSum => {
            let mut sub_labels: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
            for (signal, key) in signals.iter().zip(&keys) {
                sub_labels
                    .entry(key.as_str())
                    .or_default()
                    .insert(signal.label.as_str());
            }
            for (signal, key) in signals.iter().zip(&keys) {
                if signal.confidence < min_probability {
                    continue;
                }
                let count = sub_labels[key.as_str()].len() as f64;
                *breakdown.entry(key.clone()).or_insert(0.0) += signal.confidence / count;
            }
        }
    }
    breakdown
}
