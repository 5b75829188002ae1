//! Conversation mode types for session state management.

use serde::{Deserialize, Serialize};

/// Number of quiz turns after which a quiz round is considered complete.
pub const QUIZ_TURN_LIMIT: u8 = 5;

/// Position within the "explain like a 5-year-old" sub-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SimplifiedStep {
    /// Sub-flow not started (or just reset).
    #[default]
    Initial,
    /// A simplified explanation has been delivered; waiting for
    /// "I understand" or "explain with another example".
    AfterExplanation,
    /// Another example has been requested; waiting for a yes/no check.
    AfterExample,
}

/// The driving sub-flow of a conversation.
///
/// Exactly one primary mode is active at a time. The quiz-turn counter that
/// belongs to a button-initiated quiz lives inside the `Quiz` variant; the
/// counters that can run concurrently with any primary mode live in
/// [`QuizCounters`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PrimaryMode {
    /// Default state: the four-option menu is offered after each reply.
    Menu,
    /// Right after the first assistant reply, before the user picked yes/no.
    AwaitingChoice,
    /// "Use a different approach": free text only, no structured buttons.
    FreeForm,
    /// Structured A/B/C/D quiz entered via button click.
    Quiz {
        /// Number of quiz answers submitted in this round (0..=5).
        question_count: u8,
    },
    /// "Explain like a 5-year-old" sub-flow.
    SimplifiedExplanation { step: SimplifiedStep },
}

impl Default for PrimaryMode {
    fn default() -> Self {
        Self::Menu
    }
}

/// Quiz-turn counters that run alongside the primary mode.
///
/// The quiz-mode counter advances on assistant replies while quiz mode is
/// active; the auto-quiz counter tracks quiz rounds entered by free-text
/// intent detection rather than a button click. The two are deliberately
/// independent of the `Quiz` primary-mode variant and of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizCounters {
    /// Quiz mode entered (by button or detected intent).
    pub quiz_mode_active: bool,
    /// Quiz-mode turns counted so far (0..=5).
    pub response_count: u8,
    /// Auto-detected quiz round in progress.
    pub auto_quiz_active: bool,
    /// Auto-detected quiz answers counted so far (0..=5).
    pub auto_quiz_count: u8,
    /// Quiz intent detected in free text; promoted to `auto_quiz_active`
    /// when the next assistant reply arrives.
    pub auto_quiz_pending: bool,
}

/// The combined per-session conversation state.
///
/// All transitions go through the transition engine; no other code path
/// mutates these fields directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationMode {
    /// The driving sub-flow.
    pub primary: PrimaryMode,
    /// Counters orthogonal to the primary mode.
    pub counters: QuizCounters,
    /// Whether flow logic currently enables the free-text box.
    pub text_input_enabled: bool,
    /// User-controlled escape hatch that force-enables free text.
    pub manual_override_enabled: bool,
}

impl ConversationMode {
    /// Whether free-text submission is accepted right now.
    ///
    /// The manual override always wins over flow logic.
    pub fn input_accepted(&self) -> bool {
        self.text_input_enabled || self.manual_override_enabled
    }

    /// True while the session waits for the initial yes/no choice.
    pub fn awaiting_initial_choice(&self) -> bool {
        matches!(self.primary, PrimaryMode::AwaitingChoice)
    }

    /// True while "use a different approach" free-form mode is active.
    pub fn free_form(&self) -> bool {
        matches!(self.primary, PrimaryMode::FreeForm)
    }

    /// True while a button-initiated quiz round is active.
    pub fn quiz_active(&self) -> bool {
        matches!(self.primary, PrimaryMode::Quiz { .. })
    }

    /// Quiz answers submitted in the current button-initiated round
    /// (0 outside the quiz mode).
    pub fn quiz_question_count(&self) -> u8 {
        match self.primary {
            PrimaryMode::Quiz { question_count } => question_count,
            _ => 0,
        }
    }

    /// True while the simplified-explanation sub-flow is active.
    pub fn simplified_active(&self) -> bool {
        matches!(self.primary, PrimaryMode::SimplifiedExplanation { .. })
    }

    /// Current simplified-explanation step (`Initial` outside the sub-flow).
    pub fn simplified_step(&self) -> SimplifiedStep {
        match self.primary {
            PrimaryMode::SimplifiedExplanation { step } => step,
            _ => SimplifiedStep::Initial,
        }
    }
}
