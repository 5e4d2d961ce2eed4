use serde::{Deserialize, Serialize};

/// Outcome of comparing a sample's declared identity to its best-correlated reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchVerdict {
    /// Best-correlated reference equals the declared identity
    Match,
    /// Best-correlated reference differs from the declared identity
    Mismatch,
    /// No reference had a defined correlation with the sample (zero variance)
    Undefined,
}

impl MatchVerdict {
    #[must_use]
    pub fn is_match(self) -> bool {
        matches!(self, Self::Match)
    }
}

impl std::fmt::Display for MatchVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Mismatch => write!(f, "mismatch"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}
