pub mod catalog;
pub mod outcome;
pub mod pitch;
pub mod session;
pub mod share;
pub mod validation;

pub use catalog::{
    parse_hex_color, Badge, Catalog, ChecklistQuiz, LookupError, PitchQuiz, QuizDefinition, QuizKind, Tool,
    TraitMatchQuiz,
};
pub use outcome::{evaluate, evaluate_answers, CategoryCount, MatchOutcome, Outcome, TieredOutcome};
pub use pitch::{format_count, format_mcap, Listing};
pub use session::{Effect, Phase, Session, SessionEvent, Step, StepKind, PITCH_THEME_STEP};
pub use share::{share_links, share_text, share_url, Network, ShareLink};
pub use validation::validate_catalog;
