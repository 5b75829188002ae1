//! The mode transition engine.
//!
//! All conversation state transitions are centralized here as one
//! event-to-transition table; no other code path mutates
//! [`ConversationMode`] fields. Given the current mode and a discrete
//! event, [`TransitionEngine::apply`] computes the next mode and, for
//! assistant replies, whether the reply text should be appended to the
//! transcript or discarded as machine-structured output.

use once_cell::sync::Lazy;
use regex::Regex;

use super::event::{ConversationEvent, QuickReply, TurnKind};
use super::mode::{ConversationMode, PrimaryMode, QuizCounters, SimplifiedStep, QUIZ_TURN_LIMIT};
use crate::error::{MentorError, Result};

/// Free-text pattern that routes back to the initial question flow.
static ANOTHER_QUESTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)i want to ask (another )?question").unwrap());

/// Free-text pattern that enters quiz mode without a button click.
static TAKE_QUIZ_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)take\s*quiz").unwrap());

/// What to do with an assistant reply after the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyDisposition {
    /// Conversational text: append to the transcript.
    Append,
    /// Machine-structured output (JSON object or array): do not display,
    /// do not append, do not advance mode counters.
    Discard,
}

/// Result of applying one event to a conversation mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// The updated conversation mode.
    pub next: ConversationMode,
    /// Set for `AssistantReplyReceived` events only.
    pub disposition: Option<ReplyDisposition>,
}

impl Outcome {
    fn state(next: ConversationMode) -> Self {
        Self {
            next,
            disposition: None,
        }
    }
}

/// Pure transition function over [`ConversationMode`].
pub struct TransitionEngine;

impl TransitionEngine {
    /// Applies one event to the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`MentorError::InputDisabled`] when free text is submitted
    /// while neither flow logic nor the manual override enables it. The
    /// rejection is enforced here, not just hidden by the UI.
    pub fn apply(mode: &ConversationMode, event: &ConversationEvent) -> Result<Outcome> {
        match event {
            ConversationEvent::InitialReplyReceived => Ok(Outcome::state(Self::on_initial(mode))),
            ConversationEvent::UserChoice { reply } => {
                Ok(Outcome::state(Self::on_choice(mode, *reply)))
            }
            ConversationEvent::FreeTextSubmitted { text } => {
                Ok(Outcome::state(Self::on_free_text(mode, text)?))
            }
            ConversationEvent::QuizAnswerSubmitted { .. } => {
                Ok(Outcome::state(Self::on_quiz_answer(mode)))
            }
            ConversationEvent::AssistantReplyReceived { text, turn } => {
                Ok(Self::on_assistant_reply(mode, text, *turn))
            }
        }
    }

    /// Toggles the manual free-text override.
    ///
    /// The override is user-controlled and orthogonal to flow logic, but it
    /// is still routed through the engine so that every mode mutation lives
    /// in one place.
    pub fn set_manual_override(mode: &ConversationMode, enabled: bool) -> ConversationMode {
        ConversationMode {
            manual_override_enabled: enabled,
            ..mode.clone()
        }
    }

    /// First assistant reply arrived: wait for the yes/no choice with the
    /// text box disabled.
    fn on_initial(mode: &ConversationMode) -> ConversationMode {
        ConversationMode {
            primary: PrimaryMode::AwaitingChoice,
            text_input_enabled: false,
            ..mode.clone()
        }
    }

    fn on_choice(mode: &ConversationMode, reply: QuickReply) -> ConversationMode {
        let mut next = mode.clone();
        match reply {
            // The initial yes/no answer reveals the four-option menu.
            QuickReply::Yes | QuickReply::No => {
                if next.awaiting_initial_choice() {
                    next.primary = PrimaryMode::Menu;
                }
            }
            QuickReply::DifferentApproach => {
                next.primary = PrimaryMode::FreeForm;
                next.text_input_enabled = true;
            }
            QuickReply::AskAnotherQuestion => {
                if next.free_form() {
                    next.primary = PrimaryMode::AwaitingChoice;
                } else {
                    next.primary = PrimaryMode::Menu;
                    next.counters.quiz_mode_active = false;
                    next.counters.response_count = 0;
                }
                next.text_input_enabled = false;
            }
            QuickReply::TakeQuiz | QuickReply::RetakeQuiz => {
                next.primary = PrimaryMode::Quiz { question_count: 0 };
                next.counters.quiz_mode_active = true;
                next.counters.response_count = 0;
                next.text_input_enabled = false;
            }
            QuickReply::ExplainLikeFive => {
                next.primary = PrimaryMode::SimplifiedExplanation {
                    step: SimplifiedStep::AfterExplanation,
                };
                next.text_input_enabled = false;
            }
            QuickReply::Understood => {
                if next.simplified_active() {
                    next.primary = PrimaryMode::Menu;
                }
                // Re-enables free text even outside the simplified sub-flow.
                next.text_input_enabled = true;
            }
            QuickReply::AnotherExample => {
                if next.simplified_active() {
                    next.primary = PrimaryMode::SimplifiedExplanation {
                        step: SimplifiedStep::AfterExample,
                    };
                }
                next.text_input_enabled = false;
            }
            QuickReply::ConfirmYes | QuickReply::ConfirmNo => {
                if next.simplified_step() == SimplifiedStep::AfterExample {
                    next.primary = PrimaryMode::Menu;
                    next.text_input_enabled = true;
                }
            }
        }
        next
    }

    fn on_free_text(mode: &ConversationMode, text: &str) -> Result<ConversationMode> {
        if !mode.input_accepted() {
            return Err(MentorError::InputDisabled);
        }

        let mut next = mode.clone();

        // "I want to ask another question" typed in free-form mode behaves
        // like the corresponding quick reply, in addition to being sent.
        if next.free_form() && ANOTHER_QUESTION_RE.is_match(text) {
            next.primary = PrimaryMode::AwaitingChoice;
            next.text_input_enabled = false;
        }

        // Quiz intent detected in free text arms the auto-quiz round before
        // the message is sent.
        if TAKE_QUIZ_RE.is_match(text) {
            next.counters.auto_quiz_pending = true;
            next.counters.quiz_mode_active = true;
            next.counters.response_count = 0;
            next.text_input_enabled = false;
        }

        Ok(next)
    }

    fn on_quiz_answer(mode: &ConversationMode) -> ConversationMode {
        let mut next = mode.clone();

        if next.counters.auto_quiz_active {
            next.counters.auto_quiz_count = next.counters.auto_quiz_count.saturating_add(1);
            if next.counters.auto_quiz_count >= QUIZ_TURN_LIMIT {
                next.counters.auto_quiz_active = false;
                next.counters.auto_quiz_count = 0;
                next.text_input_enabled = true;
            }
        }

        // The per-round question counter only exists while the
        // button-initiated quiz variant is active.
        if let PrimaryMode::Quiz { question_count } = next.primary {
            next.primary = PrimaryMode::Quiz {
                question_count: question_count.saturating_add(1),
            };
        }

        next.counters.response_count = next.counters.response_count.saturating_add(1);

        next
    }

    fn on_assistant_reply(mode: &ConversationMode, text: &str, turn: TurnKind) -> Outcome {
        // Structured payloads must not pollute the transcript or advance
        // any counter.
        if is_structured_reply(text) {
            return Outcome {
                next: mode.clone(),
                disposition: Some(ReplyDisposition::Discard),
            };
        }

        let mut next = mode.clone();
        match turn {
            // The initial reply's state effects are carried by the
            // dedicated `InitialReplyReceived` event.
            TurnKind::Initial => {}
            TurnKind::Choice | TurnKind::FreeText => {
                apply_reply_counters(&mut next.counters, &mut next.text_input_enabled);
            }
            TurnKind::QuizAnswer => {
                // The response counter was already advanced at submit time.
                if next.quiz_question_count() >= QUIZ_TURN_LIMIT {
                    next.text_input_enabled = true;
                    // Quiz-mode completion wins over the per-question-count
                    // enable.
                    if next.counters.quiz_mode_active
                        && next.counters.response_count >= QUIZ_TURN_LIMIT
                    {
                        next.counters.quiz_mode_active = false;
                        next.text_input_enabled = false;
                    }
                }
            }
        }

        Outcome {
            next,
            disposition: Some(ReplyDisposition::Append),
        }
    }
}

/// Reply-side counter bookkeeping shared by choice and free-text turns.
fn apply_reply_counters(counters: &mut QuizCounters, text_input_enabled: &mut bool) {
    if counters.auto_quiz_pending {
        counters.auto_quiz_active = true;
        counters.auto_quiz_count = 0;
        counters.auto_quiz_pending = false;
    }

    if counters.quiz_mode_active {
        counters.response_count = counters.response_count.saturating_add(1);
        if counters.response_count >= QUIZ_TURN_LIMIT {
            counters.quiz_mode_active = false;
            *text_input_enabled = false;
        }
    }
}

/// Classifies reply text: a reply that parses as a JSON object or array is
/// machine-structured output rather than conversational text.
pub fn is_structured_reply(text: &str) -> bool {
    matches!(
        serde_json::from_str::<serde_json::Value>(text),
        Ok(serde_json::Value::Object(_)) | Ok(serde_json::Value::Array(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::QuizLetter;

    fn apply(mode: &ConversationMode, event: ConversationEvent) -> ConversationMode {
        TransitionEngine::apply(mode, &event).unwrap().next
    }

    fn choice(mode: &ConversationMode, reply: QuickReply) -> ConversationMode {
        apply(mode, ConversationEvent::UserChoice { reply })
    }

    fn reply(mode: &ConversationMode, text: &str, turn: TurnKind) -> ConversationMode {
        apply(
            mode,
            ConversationEvent::AssistantReplyReceived {
                text: text.to_string(),
                turn,
            },
        )
    }

    #[test]
    fn initial_reply_awaits_choice_with_text_disabled() {
        let mode = apply(
            &ConversationMode::default(),
            ConversationEvent::InitialReplyReceived,
        );
        assert!(mode.awaiting_initial_choice());
        assert!(!mode.text_input_enabled);
    }

    #[test]
    fn yes_or_no_clears_awaiting_choice() {
        let awaiting = apply(
            &ConversationMode::default(),
            ConversationEvent::InitialReplyReceived,
        );

        let mode = choice(&awaiting, QuickReply::Yes);
        assert_eq!(mode.primary, PrimaryMode::Menu);

        let mode = choice(&awaiting, QuickReply::No);
        assert_eq!(mode.primary, PrimaryMode::Menu);
    }

    #[test]
    fn lowercase_yes_does_not_answer_the_initial_choice() {
        let awaiting = apply(
            &ConversationMode::default(),
            ConversationEvent::InitialReplyReceived,
        );
        let mode = choice(&awaiting, QuickReply::ConfirmYes);
        assert!(mode.awaiting_initial_choice());
    }

    #[test]
    fn different_approach_enters_free_form_and_enables_text() {
        let mode = ConversationMode {
            primary: PrimaryMode::Quiz { question_count: 3 },
            ..Default::default()
        };
        let next = choice(&mode, QuickReply::DifferentApproach);
        assert!(next.free_form());
        assert!(next.text_input_enabled);
        assert_eq!(next.quiz_question_count(), 0);
    }

    #[test]
    fn ask_another_question_from_free_form_returns_to_awaiting() {
        let mode = ConversationMode {
            primary: PrimaryMode::FreeForm,
            text_input_enabled: true,
            ..Default::default()
        };
        let next = choice(&mode, QuickReply::AskAnotherQuestion);
        assert!(next.awaiting_initial_choice());
        assert!(!next.text_input_enabled);
    }

    #[test]
    fn ask_another_question_from_menu_resets_quiz_state() {
        let mode = ConversationMode {
            primary: PrimaryMode::Quiz { question_count: 5 },
            counters: QuizCounters {
                quiz_mode_active: true,
                response_count: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        let next = choice(&mode, QuickReply::AskAnotherQuestion);
        assert_eq!(next.primary, PrimaryMode::Menu);
        assert!(!next.counters.quiz_mode_active);
        assert_eq!(next.counters.response_count, 0);
        assert!(!next.text_input_enabled);
    }

    #[test]
    fn take_quiz_starts_a_fresh_round() {
        let mode = ConversationMode {
            primary: PrimaryMode::SimplifiedExplanation {
                step: SimplifiedStep::AfterExplanation,
            },
            ..Default::default()
        };
        let next = choice(&mode, QuickReply::TakeQuiz);
        assert_eq!(next.primary, PrimaryMode::Quiz { question_count: 0 });
        assert!(next.counters.quiz_mode_active);
        assert_eq!(next.counters.response_count, 0);
        assert!(!next.text_input_enabled);
    }

    #[test]
    fn explain_like_five_enters_simplified_flow() {
        let mode = ConversationMode {
            primary: PrimaryMode::Quiz { question_count: 2 },
            ..Default::default()
        };
        let next = choice(&mode, QuickReply::ExplainLikeFive);
        assert_eq!(
            next.primary,
            PrimaryMode::SimplifiedExplanation {
                step: SimplifiedStep::AfterExplanation
            }
        );
        assert!(!next.text_input_enabled);
    }

    #[test]
    fn understood_exits_simplified_flow_and_enables_text() {
        let mode = ConversationMode {
            primary: PrimaryMode::SimplifiedExplanation {
                step: SimplifiedStep::AfterExplanation,
            },
            ..Default::default()
        };
        let next = choice(&mode, QuickReply::Understood);
        assert_eq!(next.primary, PrimaryMode::Menu);
        assert!(next.text_input_enabled);
    }

    #[test]
    fn understood_enables_text_outside_simplified_flow_too() {
        let next = choice(&ConversationMode::default(), QuickReply::Understood);
        assert_eq!(next.primary, PrimaryMode::Menu);
        assert!(next.text_input_enabled);
    }

    #[test]
    fn another_example_advances_the_simplified_step() {
        let mode = ConversationMode {
            primary: PrimaryMode::SimplifiedExplanation {
                step: SimplifiedStep::AfterExplanation,
            },
            ..Default::default()
        };
        let next = choice(&mode, QuickReply::AnotherExample);
        assert_eq!(next.simplified_step(), SimplifiedStep::AfterExample);
        assert!(!next.text_input_enabled);
    }

    #[test]
    fn confirm_after_example_exits_simplified_flow() {
        let mode = ConversationMode {
            primary: PrimaryMode::SimplifiedExplanation {
                step: SimplifiedStep::AfterExample,
            },
            ..Default::default()
        };
        for reply in [QuickReply::ConfirmYes, QuickReply::ConfirmNo] {
            let next = choice(&mode, reply);
            assert_eq!(next.primary, PrimaryMode::Menu);
            assert!(next.text_input_enabled);
        }
    }

    #[test]
    fn free_text_is_rejected_while_input_disabled() {
        let mode = ConversationMode::default();
        let err = TransitionEngine::apply(
            &mode,
            &ConversationEvent::FreeTextSubmitted {
                text: "hello".to_string(),
            },
        )
        .unwrap_err();
        assert!(err.is_input_disabled());
    }

    #[test]
    fn free_text_is_accepted_under_manual_override() {
        let mode = ConversationMode {
            manual_override_enabled: true,
            ..Default::default()
        };
        let outcome = TransitionEngine::apply(
            &mode,
            &ConversationEvent::FreeTextSubmitted {
                text: "hello".to_string(),
            },
        );
        assert!(outcome.is_ok());
    }

    #[test]
    fn free_form_ask_another_question_text_behaves_like_the_button() {
        let mode = ConversationMode {
            primary: PrimaryMode::FreeForm,
            text_input_enabled: true,
            ..Default::default()
        };
        for text in [
            "I want to ask another question",
            "i want to ask question",
            "Actually, I want to ask another question please",
        ] {
            let next = apply(
                &mode,
                ConversationEvent::FreeTextSubmitted {
                    text: text.to_string(),
                },
            );
            assert!(next.awaiting_initial_choice(), "pattern missed: {text}");
            assert!(!next.text_input_enabled);
        }
    }

    #[test]
    fn take_quiz_text_arms_the_auto_quiz_round() {
        let mode = ConversationMode {
            text_input_enabled: true,
            ..Default::default()
        };
        for text in ["I want to take quiz now", "let's TAKE   QUIZ", "takequiz"] {
            let next = apply(
                &mode,
                ConversationEvent::FreeTextSubmitted {
                    text: text.to_string(),
                },
            );
            assert!(next.counters.auto_quiz_pending, "pattern missed: {text}");
            assert!(next.counters.quiz_mode_active);
            assert_eq!(next.counters.response_count, 0);
            assert!(!next.text_input_enabled);
        }
    }

    #[test]
    fn plain_free_text_changes_nothing() {
        let mode = ConversationMode {
            text_input_enabled: true,
            ..Default::default()
        };
        let next = apply(
            &mode,
            ConversationEvent::FreeTextSubmitted {
                text: "why is the sky blue?".to_string(),
            },
        );
        assert_eq!(next, mode);
    }

    #[test]
    fn structured_reply_is_discarded_without_counter_changes() {
        let mode = ConversationMode {
            counters: QuizCounters {
                quiz_mode_active: true,
                response_count: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        for text in [r#"{"foo":1}"#, "[1,2,3]", "  {\"nested\": {\"a\": 2}} "] {
            let outcome = TransitionEngine::apply(
                &mode,
                &ConversationEvent::AssistantReplyReceived {
                    text: text.to_string(),
                    turn: TurnKind::Choice,
                },
            )
            .unwrap();
            assert_eq!(outcome.disposition, Some(ReplyDisposition::Discard));
            assert_eq!(outcome.next, mode);
        }
    }

    #[test]
    fn scalar_json_still_counts_as_conversational() {
        for text in ["42", "null", "\"just a quoted sentence\"", "plain text"] {
            assert!(!is_structured_reply(text), "misclassified: {text}");
        }
    }

    #[test]
    fn pending_auto_quiz_is_promoted_on_reply() {
        let mode = ConversationMode {
            counters: QuizCounters {
                auto_quiz_pending: true,
                quiz_mode_active: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let next = reply(&mode, "Here is your first question", TurnKind::FreeText);
        assert!(next.counters.auto_quiz_active);
        assert_eq!(next.counters.auto_quiz_count, 0);
        assert!(!next.counters.auto_quiz_pending);
        // Quiz mode also counted this reply.
        assert_eq!(next.counters.response_count, 1);
    }

    #[test]
    fn quiz_mode_completes_after_five_counted_replies() {
        let mut mode = ConversationMode {
            counters: QuizCounters {
                quiz_mode_active: true,
                response_count: 0,
                ..Default::default()
            },
            text_input_enabled: true,
            ..Default::default()
        };
        for turn in 1..=QUIZ_TURN_LIMIT {
            mode = reply(&mode, "next", TurnKind::FreeText);
            if turn < QUIZ_TURN_LIMIT {
                assert!(mode.counters.quiz_mode_active);
                assert_eq!(mode.counters.response_count, turn);
            }
        }
        assert!(!mode.counters.quiz_mode_active);
        assert!(!mode.text_input_enabled);
    }

    #[test]
    fn five_quiz_answers_complete_the_round() {
        // "I want to take quiz" then five answered questions, each reply
        // conversational.
        let mut mode = choice(&ConversationMode::default(), QuickReply::TakeQuiz);
        // The first quiz question arrives as the reply to the choice turn.
        mode = reply(&mode, "Q1 (A) a (B) b (C) c (D) d", TurnKind::Choice);
        assert_eq!(mode.counters.response_count, 1);

        for n in 1..=QUIZ_TURN_LIMIT {
            mode = apply(
                &mode,
                ConversationEvent::QuizAnswerSubmitted {
                    letter: QuizLetter::A,
                },
            );
            assert_eq!(mode.quiz_question_count(), n);
            mode = reply(&mode, "Next question (A) a (B) b (C) c (D) d", TurnKind::QuizAnswer);
        }

        // Quiz-mode completion wins over the per-question-count enable.
        assert!(mode.quiz_active());
        assert_eq!(mode.quiz_question_count(), QUIZ_TURN_LIMIT);
        assert!(!mode.counters.quiz_mode_active);
        assert!(!mode.text_input_enabled);
    }

    #[test]
    fn quiz_completion_enables_text_when_quiz_mode_already_finished() {
        // quiz_question_count reaches the limit with quiz mode long gone:
        // the per-question-count enable applies.
        let mode = ConversationMode {
            primary: PrimaryMode::Quiz { question_count: 5 },
            ..Default::default()
        };
        let next = reply(&mode, "done", TurnKind::QuizAnswer);
        assert!(next.text_input_enabled);
    }

    #[test]
    fn auto_quiz_round_completes_after_five_answers() {
        let mut mode = ConversationMode {
            counters: QuizCounters {
                auto_quiz_active: true,
                auto_quiz_count: 0,
                quiz_mode_active: true,
                response_count: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        for _ in 0..QUIZ_TURN_LIMIT {
            mode = apply(
                &mode,
                ConversationEvent::QuizAnswerSubmitted {
                    letter: QuizLetter::B,
                },
            );
        }
        assert!(!mode.counters.auto_quiz_active);
        assert_eq!(mode.counters.auto_quiz_count, 0);
        assert!(mode.text_input_enabled);
    }

    #[test]
    fn manual_override_toggle_preserves_the_rest_of_the_mode() {
        let mode = ConversationMode {
            primary: PrimaryMode::FreeForm,
            text_input_enabled: true,
            ..Default::default()
        };
        let next = TransitionEngine::set_manual_override(&mode, true);
        assert!(next.manual_override_enabled);
        assert_eq!(next.primary, mode.primary);

        let back = TransitionEngine::set_manual_override(&next, false);
        assert_eq!(back, mode);
    }
}
