//! Conversation events consumed by the transition engine.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// The fixed quick-response vocabulary the UI emits as events.
///
/// Labels are matched case-sensitively: `Yes`/`No` answer the initial
/// choice, while the lowercase `yes`/`no` pair belongs to the
/// simplified-explanation check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum QuickReply {
    #[serde(rename = "Yes")]
    #[strum(serialize = "Yes")]
    Yes,
    #[serde(rename = "No")]
    #[strum(serialize = "No")]
    No,
    #[serde(rename = "Use a different approach")]
    #[strum(serialize = "Use a different approach")]
    DifferentApproach,
    #[serde(rename = "I want to ask another question")]
    #[strum(serialize = "I want to ask another question")]
    AskAnotherQuestion,
    #[serde(rename = "I want to take quiz")]
    #[strum(serialize = "I want to take quiz")]
    TakeQuiz,
    #[serde(rename = "Retake the quiz")]
    #[strum(serialize = "Retake the quiz")]
    RetakeQuiz,
    #[serde(rename = "I understand")]
    #[strum(serialize = "I understand")]
    Understood,
    #[serde(rename = "I want you to explain like a 5-year-old")]
    #[strum(serialize = "I want you to explain like a 5-year-old")]
    ExplainLikeFive,
    #[serde(rename = "explain with another example")]
    #[strum(serialize = "explain with another example")]
    AnotherExample,
    #[serde(rename = "yes")]
    #[strum(serialize = "yes")]
    ConfirmYes,
    #[serde(rename = "no")]
    #[strum(serialize = "no")]
    ConfirmNo,
}

/// An answer letter for a structured quiz question.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum QuizLetter {
    A,
    B,
    C,
    D,
}

/// The kind of outbound turn an assistant reply belongs to.
///
/// Every `AssistantReplyReceived` is the immediate follow-up to exactly one
/// outbound event; reply-side transition effects depend on which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// The very first mentor request of a fresh session.
    Initial,
    /// A quick-reply button press.
    Choice,
    /// A free-text submission.
    FreeText,
    /// A quiz answer letter.
    QuizAnswer,
}

/// Events that drive the conversation state machine.
///
/// Events are mutually exclusive per invocation of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    /// Fires once, right after the very first assistant reply to a freshly
    /// created session.
    InitialReplyReceived,
    /// The user pressed a quick-reply button.
    UserChoice { reply: QuickReply },
    /// The user typed and sent a message (only reachable while text input
    /// is enabled).
    FreeTextSubmitted { text: String },
    /// The user answered the current quiz question.
    QuizAnswerSubmitted { letter: QuizLetter },
    /// The external answer service returned text for the outbound message
    /// implied by one of the above events.
    AssistantReplyReceived { text: String, turn: TurnKind },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn quick_reply_labels_round_trip() {
        let labels = [
            ("Yes", QuickReply::Yes),
            ("No", QuickReply::No),
            ("Use a different approach", QuickReply::DifferentApproach),
            ("I want to ask another question", QuickReply::AskAnotherQuestion),
            ("I want to take quiz", QuickReply::TakeQuiz),
            ("Retake the quiz", QuickReply::RetakeQuiz),
            ("I understand", QuickReply::Understood),
            (
                "I want you to explain like a 5-year-old",
                QuickReply::ExplainLikeFive,
            ),
            ("explain with another example", QuickReply::AnotherExample),
            ("yes", QuickReply::ConfirmYes),
            ("no", QuickReply::ConfirmNo),
        ];

        for (label, reply) in labels {
            assert_eq!(QuickReply::from_str(label).unwrap(), reply);
            assert_eq!(reply.to_string(), label);
        }
    }

    #[test]
    fn quick_reply_matching_is_case_sensitive() {
        assert_ne!(
            QuickReply::from_str("Yes").unwrap(),
            QuickReply::from_str("yes").unwrap()
        );
        assert!(QuickReply::from_str("YES").is_err());
    }

    #[test]
    fn quiz_letters_parse() {
        assert_eq!(QuizLetter::from_str("A").unwrap(), QuizLetter::A);
        assert_eq!(QuizLetter::D.to_string(), "D");
        assert!(QuizLetter::from_str("E").is_err());
    }
}
