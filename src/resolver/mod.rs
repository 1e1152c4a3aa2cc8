use crate::schema::RootCategory;

pub mod stages;
pub mod tables;

use stages::{KeywordStage, LabelMapStage, PrefixStage, ResolveStage};
use tables::RuleTables;

/// Resolution result: one of the four roots, or the normalized label when no
/// stage recognized it. Callers treat `Unknown` as an unknown root, never as
/// an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Root(RootCategory),
    Unknown(String),
}

impl Resolved {
    /// Breakdown key: the canonical root name, or the unrecognized string.
    pub fn key<'a>(&'a self, tables: &'a RuleTables) -> &'a str {
        match self {
            Resolved::Root(root) => tables.roots.name_of(*root),
            Resolved::Unknown(label) => label,
        }
    }

    pub fn root(&self) -> Option<RootCategory> {
        match self {
            Resolved::Root(root) => Some(*root),
            Resolved::Unknown(_) => None,
        }
    }
}

/// The priority chain: prefix parsing, then the explicit label map, then
/// keyword heuristics. Order is the contract; see each stage for its rules.
static STAGES: [&dyn ResolveStage; 3] = [&PrefixStage, &LabelMapStage, &KeywordStage];

/// Resolve one raw class label to a root category. Never fails: labels no
/// stage recognizes degrade to `Resolved::Unknown` carrying the
/// prefix-normalized form of the input.
pub fn resolve(label: &str, tables: &RuleTables) -> Resolved {
    for stage in STAGES {
        if let Some(root) = stage.resolve(label, tables) {
            return Resolved::Root(root);
        }
    }
    // The prefix stage already rejected closed-set membership, so the
    // fallback only normalizes.
    Resolved::Unknown(stages::normalized_prefix(label, tables).to_string())
}
