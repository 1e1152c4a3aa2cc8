use crate::aggregate;
use crate::annotate;
use crate::config::EngineConfig;
use crate::decide;
use crate::schema::{ModelOutput, SCHEMA_VERSION, Verdict};

/// The classification engine: resolve every label, aggregate confidences per
/// root, decide a winner, annotate detections for display.
///
/// Configuration is injected once and never mutated, so one engine instance
/// serves any number of concurrent callers.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// One image's worth of signals in, one verdict out.
    ///
    /// The aggregator sees every signal regardless of the display threshold;
    /// only the returned detection list is filtered. Vector input carries no
    /// geometry and yields no detections at all.
    pub fn classify(&self, output: &ModelOutput) -> Verdict {
        let cfg = &self.config;
        let signals = output.signals();
        let breakdown = aggregate::aggregate(
            &signals,
            &cfg.tables,
            cfg.policy,
            cfg.top_k,
            cfg.min_probability,
        );
        let decision = decide::decide(breakdown, &cfg.tables, cfg.target);
        let detections = match output {
            ModelOutput::Detections { .. } => {
                annotate::annotate(&signals, &cfg.tables, cfg.target, cfg.display_threshold)
                    .into_iter()
                    .filter(|d| d.shown)
                    .collect()
            }
            ModelOutput::Probabilities { .. } => Vec::new(),
        };
        Verdict {
            is_target: decision.is_target,
            winner: decision.winner,
            breakdown: decision.breakdown,
            detections,
            version: SCHEMA_VERSION.to_string(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
