use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

pub const SCHEMA_VERSION: &str = "0.1.0";

/// The four top-level waste classes a verdict can name.
///
/// Enumeration order is load-bearing: keyword checks and decision tie-breaks
/// walk `ALL` front to back, so the earlier variant wins an exact tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RootCategory {
    Recyclable,
    Kitchen,
    Hazardous,
    Other,
}

impl RootCategory {
    pub const ALL: [RootCategory; 4] = [
        RootCategory::Recyclable,
        RootCategory::Kitchen,
        RootCategory::Hazardous,
        RootCategory::Other,
    ];

    /// Stable lowercase identifier, matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            RootCategory::Recyclable => "recyclable",
            RootCategory::Kitchen => "kitchen",
            RootCategory::Hazardous => "hazardous",
            RootCategory::Other => "other",
        }
    }
}

/// Axis-aligned pixel rectangle, serialized as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct BBox(pub [i32; 4]);

impl BBox {
    pub fn x1(&self) -> i32 {
        self.0[0]
    }

    pub fn y1(&self) -> i32 {
        self.0[1]
    }

    pub fn x2(&self) -> i32 {
        self.0[2]
    }

    pub fn y2(&self) -> i32 {
        self.0[3]
    }

    pub fn width(&self) -> i32 {
        self.x2() - self.x1()
    }

    pub fn height(&self) -> i32 {
        self.y2() - self.y1()
    }
}

/// One (label, confidence) pair from the recognition model, with geometry
/// when it came from an object detector. `class_name` is accepted as an
/// input alias for `label` because that is the upstream model's JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawSignal {
    #[serde(alias = "class_name")]
    pub label: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
}

impl RawSignal {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
            class_id: None,
            bbox: None,
        }
    }

    pub fn with_bbox(mut self, bbox: [i32; 4]) -> Self {
        self.bbox = Some(BBox(bbox));
        self
    }

    pub fn with_class_id(mut self, class_id: i64) -> Self {
        self.class_id = Some(class_id);
        self
    }
}

/// Root name (or, for degenerate input, unresolved label) to accumulated
/// score. `BTreeMap` so iteration order is deterministic.
pub type ScoreBreakdown = BTreeMap<String, f64>;

/// Presentation-only projection of one raw signal. Never feeds the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnnotatedDetection {
    pub label: String,
    pub root: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
    pub shown: bool,
    pub is_target: bool,
}

/// Per-request output: the winning root (if any), the full score breakdown,
/// and the detections that passed the display threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    pub is_target: bool,
    pub winner: Option<String>,
    pub breakdown: ScoreBreakdown,
    pub detections: Vec<AnnotatedDetection>,
    pub version: String,
}

/// What the inference collaborator hands over per request: either a list of
/// detections, or a whole-image probability vector with positional labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ModelOutput {
    Detections {
        detections: Vec<RawSignal>,
    },
    Probabilities {
        probs: Vec<f64>,
        #[serde(default)]
        labels: Vec<String>,
    },
}

impl ModelOutput {
    /// Materialize per-class signals. Vector input synthesizes one signal per
    /// index with no geometry; a missing positional label falls back to the
    /// stringified index.
    pub fn signals(&self) -> Cow<'_, [RawSignal]> {
        match self {
            ModelOutput::Detections { detections } => Cow::Borrowed(detections),
            ModelOutput::Probabilities { probs, labels } => Cow::Owned(
                probs
                    .iter()
                    .enumerate()
                    .map(|(i, &p)| RawSignal {
                        label: labels.get(i).cloned().unwrap_or_else(|| i.to_string()),
                        confidence: p,
                        class_id: Some(i as i64),
                        bbox: None,
                    })
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_serializes_as_array() {
        let signal = RawSignal::new("bottle", 0.5).with_bbox([1, 2, 3, 4]);
        let json = serde_json::to_string(&signal).unwrap();
        assert!(json.contains("\"bbox\":[1,2,3,4]"));
    }

    #[test]
    fn class_name_alias_accepted() {
        let signal: RawSignal =
            serde_json::from_str(r#"{"class_name": "bottle", "confidence": 0.9, "class_id": 3}"#)
                .unwrap();
        assert_eq!(signal.label, "bottle");
        assert_eq!(signal.class_id, Some(3));
        assert_eq!(signal.bbox, None);
    }

    #[test]
    fn detections_document_parses() {
        let output: ModelOutput = serde_json::from_str(
            r#"{"detections": [{"label": "can", "confidence": 0.8, "bbox": [0, 0, 10, 10]}]}"#,
        )
        .unwrap();
        let signals = output.signals();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].bbox.unwrap().width(), 10);
    }

    #[test]
    fn probability_vector_synthesizes_signals() {
        let output: ModelOutput =
            serde_json::from_str(r#"{"probs": [0.1, 0.7, 0.2], "labels": ["bottle", "banana"]}"#)
                .unwrap();
        let signals = output.signals();
        assert_eq!(signals.len(), 3);
        assert_eq!(signals[0].label, "bottle");
        assert_eq!(signals[1].confidence, 0.7);
        // Positional lookup ran out of labels; the index stands in.
        assert_eq!(signals[2].label, "2");
        assert!(signals.iter().all(|s| s.bbox.is_none()));
    }

    #[test]
    fn root_order_is_fixed() {
        assert_eq!(
            RootCategory::ALL,
            [
                RootCategory::Recyclable,
                RootCategory::Kitchen,
                RootCategory::Hazardous,
                RootCategory::Other,
            ]
        );
    }

    #[test]
    fn json_schema_generates() {
        let schema = schemars::schema_for!(Verdict);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("Verdict"));
    }
}
