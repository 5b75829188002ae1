//! Message dispatcher.
//!
//! Wraps one outbound conversation turn end-to-end: apply the user-side
//! transition, persist the user message, invoke the external answer
//! service, classify and persist the reply, apply the reply-side
//! transition, and persist the updated mode. At most one turn may be in
//! flight per session; this is a UI-level mutual exclusion backed by an
//! in-flight marker, not a server-side lock.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use mentor_core::conversation::{
    derive_affordances, Affordances, ChatMessage, ConversationEvent, ConversationMode, QuickReply,
    QuizLetter, ReplyDisposition, TransitionEngine, TurnKind,
};
use mentor_core::error::Result;
use mentor_core::session::ConversationStore;
use mentor_core::state::StateRepository;
use mentor_interaction::AnswerService;

/// Fixed apology appended as the assistant turn when the answer service
/// fails.
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't reach the mentor service just now. Please try again in a moment.";

/// The result of one dispatched turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Messages appended to the transcript by this turn, in order.
    pub appended: Vec<ChatMessage>,
    /// The conversation mode after the turn.
    pub mode: ConversationMode,
    /// The UI controls valid after the turn.
    pub affordances: Affordances,
    /// Transient error text for banner display; the apology message is
    /// already part of `appended` when this is set.
    pub service_error: Option<String>,
    /// The reply was machine-structured output and was not appended.
    pub reply_discarded: bool,
}

impl TurnOutcome {
    /// Outcome of an action skipped for lack of a session id.
    fn skipped() -> Self {
        Self {
            appended: Vec::new(),
            mode: ConversationMode::default(),
            affordances: derive_affordances(&ConversationMode::default(), &[], false),
            service_error: None,
            reply_discarded: false,
        }
    }
}

/// Orchestrates outbound turns against the answer service and the
/// conversation store.
pub struct MessageDispatcher {
    answer_service: Arc<dyn AnswerService>,
    store: Arc<dyn ConversationStore>,
    state_repository: Arc<dyn StateRepository>,
    /// Sessions with a turn currently in flight. Doubles as the
    /// pending-local-write marker: refreshes are skipped while set.
    in_flight: Arc<RwLock<HashSet<String>>>,
}

impl MessageDispatcher {
    /// Creates a new dispatcher over the given collaborators.
    pub fn new(
        answer_service: Arc<dyn AnswerService>,
        store: Arc<dyn ConversationStore>,
        state_repository: Arc<dyn StateRepository>,
    ) -> Self {
        Self {
            answer_service,
            store,
            state_repository,
            in_flight: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Sends the opening mentor request of a fresh session.
    ///
    /// The assistant's reply is the first of the session, so the
    /// initial-choice gate is armed once it arrives.
    pub async fn open_topic(
        &self,
        session_id: Option<&str>,
        topic_text: &str,
    ) -> Result<TurnOutcome> {
        self.run_turn(session_id, topic_text.to_string(), None, TurnKind::Initial)
            .await
    }

    /// Dispatches a quick-reply button press.
    pub async fn choose(&self, session_id: Option<&str>, reply: QuickReply) -> Result<TurnOutcome> {
        self.run_turn(
            session_id,
            reply.to_string(),
            Some(ConversationEvent::UserChoice { reply }),
            TurnKind::Choice,
        )
        .await
    }

    /// Dispatches a free-text submission.
    ///
    /// # Errors
    ///
    /// Returns [`mentor_core::MentorError::InputDisabled`] when neither flow
    /// logic nor the manual override enables the text box.
    pub async fn submit_text(&self, session_id: Option<&str>, text: &str) -> Result<TurnOutcome> {
        self.run_turn(
            session_id,
            text.to_string(),
            Some(ConversationEvent::FreeTextSubmitted {
                text: text.to_string(),
            }),
            TurnKind::FreeText,
        )
        .await
    }

    /// Dispatches a quiz answer letter.
    pub async fn answer_quiz(
        &self,
        session_id: Option<&str>,
        letter: QuizLetter,
    ) -> Result<TurnOutcome> {
        self.run_turn(
            session_id,
            letter.to_string(),
            Some(ConversationEvent::QuizAnswerSubmitted { letter }),
            TurnKind::QuizAnswer,
        )
        .await
    }

    /// Toggles the user-controlled free-text override.
    pub async fn set_manual_override(
        &self,
        session_id: Option<&str>,
        enabled: bool,
    ) -> Result<()> {
        let Some(id) = session_id else {
            return Ok(());
        };
        let mode = self.store.load_mode(id).await?;
        let next = TransitionEngine::set_manual_override(&mode, enabled);
        self.store.save_mode(id, &next).await
    }

    /// Re-reads the persisted messages for a periodic refresh.
    ///
    /// Returns `None` while a turn is in flight for the session: the
    /// in-memory pending state is newer than anything on disk, so the stale
    /// re-read is skipped rather than allowed to overwrite it.
    pub async fn refresh_messages(&self, session_id: &str) -> Result<Option<Vec<ChatMessage>>> {
        if self.in_flight.read().await.contains(session_id) {
            tracing::debug!(
                "[MessageDispatcher] Refresh skipped for session {}: turn in flight",
                session_id
            );
            return Ok(None);
        }
        self.store.load_messages(session_id).await.map(Some)
    }

    /// Derives the affordances for the session's current persisted state.
    pub async fn affordances(&self, session_id: &str) -> Result<Affordances> {
        let mode = self.store.load_mode(session_id).await?;
        let messages = self.store.load_messages(session_id).await?;
        let reply_pending = self.in_flight.read().await.contains(session_id);
        Ok(derive_affordances(&mode, &messages, reply_pending))
    }

    async fn run_turn(
        &self,
        session_id: Option<&str>,
        outbound_text: String,
        user_event: Option<ConversationEvent>,
        turn: TurnKind,
    ) -> Result<TurnOutcome> {
        // With no active session the action is a no-op; persistence calls
        // are simply skipped.
        let Some(id) = session_id else {
            tracing::debug!("[MessageDispatcher] No session context, skipping turn");
            return Ok(TurnOutcome::skipped());
        };

        self.begin_turn(id).await?;
        let result = self.run_turn_inner(id, outbound_text, user_event, turn).await;
        self.end_turn(id).await;
        result
    }

    async fn run_turn_inner(
        &self,
        id: &str,
        outbound_text: String,
        user_event: Option<ConversationEvent>,
        turn: TurnKind,
    ) -> Result<TurnOutcome> {
        let original_mode = self.store.load_mode(id).await?;

        // User-side transition first: a rejected submission must leave no
        // trace in the transcript.
        let pending_mode = match &user_event {
            Some(event) => TransitionEngine::apply(&original_mode, event)?.next,
            None => original_mode.clone(),
        };

        let user_message = ChatMessage::user(outbound_text.clone());
        self.store.append_message(id, &user_message).await?;
        self.store.save_mode(id, &pending_mode).await?;

        let mut appended = vec![user_message];

        let reply = self
            .answer_service
            .send_message(&outbound_text, Some(id))
            .await;

        // A response that arrives after the user switched sessions must be
        // discarded rather than misapplied to the newly active session.
        if let Some(active) = self.state_repository.get_active_session().await {
            if active != id {
                tracing::info!(
                    "[MessageDispatcher] Discarding reply for session {}: active session is {}",
                    id,
                    active
                );
                let messages = self.store.load_messages(id).await?;
                return Ok(TurnOutcome {
                    affordances: derive_affordances(&pending_mode, &messages, false),
                    appended,
                    mode: pending_mode,
                    service_error: None,
                    reply_discarded: true,
                });
            }
        }

        let outcome = match reply {
            Err(e) => {
                // Failed turns do not advance any quiz/step counter: the
                // mode reverts to its pre-turn state and only the apology
                // lands in the transcript.
                tracing::warn!("[MessageDispatcher] Answer service failed for {}: {}", id, e);
                let apology = ChatMessage::fallback(FALLBACK_REPLY);
                self.store.append_message(id, &apology).await?;
                self.store.save_mode(id, &original_mode).await?;
                appended.push(apology);

                let messages = self.store.load_messages(id).await?;
                TurnOutcome {
                    affordances: derive_affordances(&original_mode, &messages, false),
                    appended,
                    mode: original_mode,
                    service_error: Some(e.to_string()),
                    reply_discarded: false,
                }
            }
            Ok(reply_text) => {
                let reply_event = ConversationEvent::AssistantReplyReceived {
                    text: reply_text.clone(),
                    turn,
                };
                let reply_outcome = TransitionEngine::apply(&pending_mode, &reply_event)?;

                match reply_outcome.disposition {
                    Some(ReplyDisposition::Discard) => {
                        tracing::debug!(
                            "[MessageDispatcher] Discarding structured reply for session {}",
                            id
                        );
                        let messages = self.store.load_messages(id).await?;
                        TurnOutcome {
                            affordances: derive_affordances(&pending_mode, &messages, false),
                            appended,
                            mode: pending_mode,
                            service_error: None,
                            reply_discarded: true,
                        }
                    }
                    _ => {
                        let assistant_message = ChatMessage::assistant(reply_text);
                        self.store.append_message(id, &assistant_message).await?;
                        appended.push(assistant_message);

                        let mut final_mode = reply_outcome.next;
                        if turn == TurnKind::Initial {
                            // The very first assistant reply arms the
                            // yes/no gate.
                            final_mode = TransitionEngine::apply(
                                &final_mode,
                                &ConversationEvent::InitialReplyReceived,
                            )?
                            .next;
                        }
                        self.store.save_mode(id, &final_mode).await?;

                        let messages = self.store.load_messages(id).await?;
                        TurnOutcome {
                            affordances: derive_affordances(&final_mode, &messages, false),
                            appended,
                            mode: final_mode,
                            service_error: None,
                            reply_discarded: false,
                        }
                    }
                }
            }
        };

        Ok(outcome)
    }

    async fn begin_turn(&self, session_id: &str) -> Result<()> {
        let mut in_flight = self.in_flight.write().await;
        if !in_flight.insert(session_id.to_string()) {
            return Err(mentor_core::MentorError::TurnInFlight(
                session_id.to_string(),
            ));
        }
        Ok(())
    }

    async fn end_turn(&self, session_id: &str) {
        self.in_flight.write().await.remove(session_id);
    }
}
