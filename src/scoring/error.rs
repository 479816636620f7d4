use thiserror::Error;

/// Structural problems in quiz data. These surface when the catalog is
/// loaded or validated, never while a user is answering questions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no result candidates configured")]
    NoCandidates,

    #[error("quiz has no questions")]
    NoQuestions,

    #[error("no tiers configured")]
    NoTiers,

    #[error("tier {index}: invalid range '{range}' - {reason}")]
    InvalidRange {
        index: usize,
        range: String,
        reason: String,
    },

    #[error("score {0} is not covered by any tier")]
    TierGap(u8),

    #[error("score {0} is covered by more than one tier")]
    TierOverlap(u8),
}
