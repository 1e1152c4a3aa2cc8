use crate::resolver::{self, Resolved};
use crate::resolver::tables::RuleTables;
use crate::schema::{AnnotatedDetection, RawSignal, RootCategory};

/// Project raw signals into presentation records.
///
/// The display threshold only sets `shown`; every signal still reaches the
/// aggregator unfiltered, so hiding a detection never changes the verdict.
pub fn annotate(
    signals: &[RawSignal],
    tables: &RuleTables,
    target: RootCategory,
    display_threshold: f64,
) -> Vec<AnnotatedDetection> {
    signals
        .iter()
        .map(|signal| {
            let resolved = resolver::resolve(&signal.label, tables);
            AnnotatedDetection {
                label: signal.label.clone(),
                root: resolved.key(tables).to_string(),
                confidence: signal.confidence,
                class_id: signal.class_id,
                bbox: signal.bbox,
                shown: signal.confidence >= display_threshold,
                is_target: resolved == Resolved::Root(target),
            }
        })
        .collect()
}
