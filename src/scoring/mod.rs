pub mod engine;
pub mod error;
pub mod tiers;
pub mod traits;

pub use engine::{
    candidate_score, live_jitter, no_jitter, pick_best, rank_candidates, seeded_jitter,
    select_result, CandidateScore, ResultCandidate, Stat,
};
pub use error::ConfigurationError;
pub use tiers::{check_coverage, find_tier, normalize, RangeOp, Tier};
pub use traits::{score, trait_ceiling, AnswerOption, Answers, Question, TraitMap};
