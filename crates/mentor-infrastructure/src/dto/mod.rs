//! Persistence DTOs.
//!
//! DTOs isolate the on-disk TOML shape from the domain models so the two
//! can evolve independently.

mod session;

pub use session::{
    AutoQuizGroup, DifferentApproachGroup, FirstReplyGroup, ManualOverrideGroup, QuizGroup,
    QuizModeGroup, SessionDto, SimplifiedGroup, TextInputGroup,
};
