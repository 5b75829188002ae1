//! Affordance derivation.
//!
//! An affordance is a UI-exposed action (button or enabled text input)
//! available to the user at a given moment. The set is evaluated fresh from
//! the current [`ConversationMode`] and the message history, in priority
//! order with first match wins; it is a pure function with no hidden
//! counters.

use serde::{Deserialize, Serialize};

use super::event::QuickReply;
use super::message::{ChatMessage, Sender};
use super::mode::{ConversationMode, SimplifiedStep, QUIZ_TURN_LIMIT};

/// Which quick-reply buttons are valid next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordanceSet {
    /// No buttons (nothing yet, reply pending, or free-form mode).
    Hidden,
    /// The initial Yes/No choice.
    InitialChoice,
    /// Quiz answer letters A-D.
    QuizLetters,
    /// "I want to ask another question" / "Retake the quiz".
    PostQuiz,
    /// "I understand" / "explain with another example".
    SimplifiedCheck,
    /// The lowercase yes/no check after another example.
    SimplifiedConfirm,
    /// The four-option default menu.
    Menu,
}

impl AffordanceSet {
    /// The literal button labels this set exposes, in display order.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::Hidden => &[],
            Self::InitialChoice => &["Yes", "No"],
            Self::QuizLetters => &["A", "B", "C", "D"],
            Self::PostQuiz => &["I want to ask another question", "Retake the quiz"],
            Self::SimplifiedCheck => &["I understand", "explain with another example"],
            Self::SimplifiedConfirm => &["yes", "no"],
            Self::Menu => &[
                "I understand",
                "I want to take quiz",
                "I want you to explain like a 5-year-old",
                "Use a different approach",
            ],
        }
    }

    /// The quick replies this set exposes (empty for letter answers).
    pub fn quick_replies(&self) -> &'static [QuickReply] {
        match self {
            Self::Hidden | Self::QuizLetters => &[],
            Self::InitialChoice => &[QuickReply::Yes, QuickReply::No],
            Self::PostQuiz => &[QuickReply::AskAnotherQuestion, QuickReply::RetakeQuiz],
            Self::SimplifiedCheck => &[QuickReply::Understood, QuickReply::AnotherExample],
            Self::SimplifiedConfirm => &[QuickReply::ConfirmYes, QuickReply::ConfirmNo],
            Self::Menu => &[
                QuickReply::Understood,
                QuickReply::TakeQuiz,
                QuickReply::ExplainLikeFive,
                QuickReply::DifferentApproach,
            ],
        }
    }
}

/// The UI controls valid for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affordances {
    /// The button set to render.
    pub set: AffordanceSet,
    /// Whether the free-text box accepts input. Always false while a reply
    /// is pending; the manual override wins over flow logic otherwise.
    pub text_input: bool,
}

/// Derives the affordances for a mode and message history.
pub fn derive(
    mode: &ConversationMode,
    messages: &[ChatMessage],
    reply_pending: bool,
) -> Affordances {
    Affordances {
        set: derive_set(mode, messages, reply_pending),
        text_input: mode.input_accepted() && !reply_pending,
    }
}

fn derive_set(
    mode: &ConversationMode,
    messages: &[ChatMessage],
    reply_pending: bool,
) -> AffordanceSet {
    let last = match messages.last() {
        Some(message) if !reply_pending && message.sender == Sender::Assistant => message,
        _ => return AffordanceSet::Hidden,
    };

    if mode.awaiting_initial_choice() {
        return AffordanceSet::InitialChoice;
    }

    if mode.free_form() {
        return AffordanceSet::Hidden;
    }

    if last.is_quiz_question() && !mode.simplified_active() {
        return AffordanceSet::QuizLetters;
    }

    if !mode.counters.quiz_mode_active
        && mode.counters.response_count >= QUIZ_TURN_LIMIT
        && last.is_quiz_question()
    {
        return AffordanceSet::PostQuiz;
    }

    if mode.quiz_active()
        && mode.quiz_question_count() >= QUIZ_TURN_LIMIT
        && last_five_user_messages_are_letters(messages)
    {
        return AffordanceSet::PostQuiz;
    }

    if mode.simplified_active() {
        return match mode.simplified_step() {
            SimplifiedStep::AfterExample => AffordanceSet::SimplifiedConfirm,
            _ => AffordanceSet::SimplifiedCheck,
        };
    }

    if mode.counters.auto_quiz_active && mode.counters.auto_quiz_count >= QUIZ_TURN_LIMIT {
        return AffordanceSet::PostQuiz;
    }

    AffordanceSet::Menu
}

/// True when there are at least five user messages and the most recent five
/// are all single answer letters A-D.
fn last_five_user_messages_are_letters(messages: &[ChatMessage]) -> bool {
    let recent: Vec<&ChatMessage> = messages
        .iter()
        .rev()
        .filter(|m| m.sender == Sender::User)
        .take(QUIZ_TURN_LIMIT as usize)
        .collect();

    recent.len() == QUIZ_TURN_LIMIT as usize && recent.iter().all(|m| m.is_answer_letter())
}
