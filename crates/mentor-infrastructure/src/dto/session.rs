//! Persistence DTO for sessions.
//!
//! The stored shape keeps the historical per-flow field groups (quiz,
//! simplified-explanation, quiz-mode, first-reply, different-approach,
//! auto-quiz, text-input, manual-override), each with documented defaults,
//! while the domain model represents the driving sub-flow as one tagged
//! union. Conversion between the two is lossless for every state the
//! transition engine can produce.

use serde::{Deserialize, Serialize};

use mentor_core::conversation::{
    ChatMessage, ConversationMode, PrimaryMode, QuizCounters, SimplifiedStep,
};
use mentor_core::session::Session;

/// On-disk session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDto {
    pub id: String,
    #[serde(default)]
    pub topic: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub quiz: QuizGroup,
    #[serde(default)]
    pub simplified_explanation: SimplifiedGroup,
    #[serde(default)]
    pub quiz_mode: QuizModeGroup,
    #[serde(default)]
    pub first_reply: FirstReplyGroup,
    #[serde(default)]
    pub different_approach: DifferentApproachGroup,
    #[serde(default)]
    pub auto_quiz: AutoQuizGroup,
    #[serde(default)]
    pub text_input: TextInputGroup,
    #[serde(default)]
    pub manual_override: ManualOverrideGroup,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Button-initiated quiz round. Default `{false, 0}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizGroup {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub question_count: u8,
}

/// "Explain like a 5-year-old" sub-flow. Default `{false, initial}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimplifiedGroup {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub step: SimplifiedStep,
}

/// Quiz-mode turn counting. Default `{false, 0}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizModeGroup {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub response_count: u8,
}

/// Initial yes/no choice gate. Default `{false}` once persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FirstReplyGroup {
    #[serde(default)]
    pub awaiting_choice: bool,
}

/// "Use a different approach" free-form mode. Default `{false}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DifferentApproachGroup {
    #[serde(default)]
    pub active: bool,
}

/// Auto-detected quiz round. Default `{false, 0, false}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutoQuizGroup {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub count: u8,
    #[serde(default)]
    pub pending: bool,
}

/// Flow-controlled text input. Default `{false}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextInputGroup {
    #[serde(default)]
    pub enabled: bool,
}

/// User-controlled free-text override. Default `{false}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManualOverrideGroup {
    #[serde(default)]
    pub enabled: bool,
}

impl From<&Session> for SessionDto {
    fn from(session: &Session) -> Self {
        let mode = &session.mode;
        Self {
            id: session.id.clone(),
            topic: session.topic.clone(),
            created_at: session.created_at.clone(),
            updated_at: session.updated_at.clone(),
            quiz: QuizGroup {
                active: mode.quiz_active(),
                question_count: mode.quiz_question_count(),
            },
            simplified_explanation: SimplifiedGroup {
                active: mode.simplified_active(),
                step: mode.simplified_step(),
            },
            quiz_mode: QuizModeGroup {
                active: mode.counters.quiz_mode_active,
                response_count: mode.counters.response_count,
            },
            first_reply: FirstReplyGroup {
                awaiting_choice: mode.awaiting_initial_choice(),
            },
            different_approach: DifferentApproachGroup {
                active: mode.free_form(),
            },
            auto_quiz: AutoQuizGroup {
                active: mode.counters.auto_quiz_active,
                count: mode.counters.auto_quiz_count,
                pending: mode.counters.auto_quiz_pending,
            },
            text_input: TextInputGroup {
                enabled: mode.text_input_enabled,
            },
            manual_override: ManualOverrideGroup {
                enabled: mode.manual_override_enabled,
            },
            messages: session.messages.clone(),
        }
    }
}

impl SessionDto {
    /// Converts the stored field groups back into the domain model.
    ///
    /// Exactly one stored group can mark the driving sub-flow; when a
    /// legacy record carries overlapping flags, the first-reply gate wins,
    /// then free-form, quiz, and the simplified flow, mirroring the
    /// engine's own priorities.
    pub fn into_domain(self) -> Session {
        let primary = if self.first_reply.awaiting_choice {
            PrimaryMode::AwaitingChoice
        } else if self.different_approach.active {
            PrimaryMode::FreeForm
        } else if self.quiz.active {
            PrimaryMode::Quiz {
                question_count: self.quiz.question_count,
            }
        } else if self.simplified_explanation.active {
            PrimaryMode::SimplifiedExplanation {
                step: self.simplified_explanation.step,
            }
        } else {
            PrimaryMode::Menu
        };

        let mode = ConversationMode {
            primary,
            counters: QuizCounters {
                quiz_mode_active: self.quiz_mode.active,
                response_count: self.quiz_mode.response_count,
                auto_quiz_active: self.auto_quiz.active,
                auto_quiz_count: self.auto_quiz.count,
                auto_quiz_pending: self.auto_quiz.pending,
            },
            text_input_enabled: self.text_input.enabled,
            manual_override_enabled: self.manual_override.enabled,
        };

        Session {
            id: self.id,
            topic: self.topic,
            created_at: self.created_at,
            updated_at: self.updated_at,
            messages: self.messages,
            mode,
        }
    }
}
