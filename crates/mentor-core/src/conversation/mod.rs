//! Conversation domain module.
//!
//! This module contains the conversation state machine: the mode model, the
//! events that drive it, the transition engine, and affordance derivation.
//!
//! # Module Structure
//!
//! - `mode`: conversation state types (`ConversationMode`, `PrimaryMode`,
//!   `QuizCounters`, `SimplifiedStep`)
//! - `message`: message types (`Sender`, `ChatMessage`)
//! - `event`: engine events (`ConversationEvent`, `QuickReply`,
//!   `QuizLetter`, `TurnKind`)
//! - `engine`: the centralized transition table (`TransitionEngine`)
//! - `affordance`: derivation of the valid UI controls (`Affordances`)

mod affordance;
mod engine;
mod event;
mod message;
mod mode;

pub use affordance::{derive as derive_affordances, AffordanceSet, Affordances};
pub use engine::{is_structured_reply, Outcome, ReplyDisposition, TransitionEngine};
pub use event::{ConversationEvent, QuickReply, QuizLetter, TurnKind};
pub use message::{ChatMessage, Sender};
pub use mode::{ConversationMode, PrimaryMode, QuizCounters, SimplifiedStep, QUIZ_TURN_LIMIT};
