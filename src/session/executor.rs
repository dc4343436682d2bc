//! Chat session runtime executor

use super::{SessionEvent, SessionView};
use crate::client::{AnswerService, FeedbackRequest, FeedbackService};
use crate::conversation::ConversationLog;
use crate::state_machine::{transition, ChatState, Effect, Event, SessionContext};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Owns the state and log of one conversation and applies effects.
///
/// Events are handled strictly one at a time; service calls run in spawned
/// tasks that report back through the event channel.
pub struct ChatSession<A, F>
where
    A: AnswerService + 'static,
    F: FeedbackService + 'static,
{
    context: SessionContext,
    state: ChatState,
    log: ConversationLog,
    answers: Arc<A>,
    feedback: Arc<F>,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so that dropping every handle ends the session
    event_tx: mpsc::WeakSender<Event>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    view_tx: watch::Sender<SessionView>,
}

impl<A, F> ChatSession<A, F>
where
    A: AnswerService + 'static,
    F: FeedbackService + 'static,
{
    pub fn new(
        context: SessionContext,
        answers: A,
        feedback: F,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::WeakSender<Event>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
        view_tx: watch::Sender<SessionView>,
    ) -> Self {
        Self {
            context,
            state: ChatState::Idle,
            log: ConversationLog::new(),
            answers: Arc::new(answers),
            feedback: Arc::new(feedback),
            event_rx,
            event_tx,
            broadcast_tx,
            view_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting chat session");

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        tracing::info!(
            session_id = %self.context.session_id,
            messages = self.log.len(),
            "Chat session ended"
        );
    }

    fn process_event(&mut self, event: Event) {
        let result = match transition(&self.state, &self.context, &self.log, event) {
            Ok(r) => r,
            Err(e) if e.is_silent() => {
                tracing::debug!(session_id = %self.context.session_id, reason = %e, "Ignoring event");
                return;
            }
            Err(e) => {
                tracing::warn!(session_id = %self.context.session_id, error = %e, "Rejected event");
                return;
            }
        };

        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }

        self.refresh_view();
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage { message } => {
                let index = self.log.len();
                self.log.append(message.clone());
                let _ = self
                    .broadcast_tx
                    .send(SessionEvent::MessageAppended { index, message });
            }

            Effect::ApplyFeedback { id, judgment } => {
                if self.log.update_feedback(&id, judgment) {
                    let _ = self.broadcast_tx.send(SessionEvent::FeedbackUpdated {
                        id,
                        feedback: judgment,
                    });
                } else {
                    tracing::warn!(
                        session_id = %self.context.session_id,
                        message_id = %id,
                        judgment = %judgment,
                        "Feedback recorded for a message not in the log"
                    );
                }
            }

            Effect::RequestAnswer { request } => {
                let answers = self.answers.clone();
                let event_tx = self.event_tx.clone();
                let session_id = self.context.session_id.clone();

                tokio::spawn(async move {
                    tracing::debug!(
                        session_id = %session_id,
                        history_len = request.history.as_ref().map_or(0, Vec::len),
                        "Sending chat request (background)"
                    );

                    let event = match answers.ask(&request).await {
                        Ok(response) => Event::AnswerReceived {
                            answer: response.answer,
                            id: response.id,
                        },
                        Err(error) => Event::AnswerFailed { error },
                    };
                    deliver(&event_tx, event, &session_id).await;
                });
            }

            Effect::SendFeedback { id, judgment } => {
                let feedback = self.feedback.clone();
                let event_tx = self.event_tx.clone();
                let session_id = self.context.session_id.clone();

                tokio::spawn(async move {
                    let request = FeedbackRequest::new(id.clone(), judgment);
                    let event = match feedback.record(&request).await {
                        Ok(()) => Event::FeedbackRecorded { id, judgment },
                        Err(error) => Event::FeedbackFailed {
                            id,
                            judgment,
                            error,
                        },
                    };
                    deliver(&event_tx, event, &session_id).await;
                });
            }

            Effect::ReportChatFailure { error } => {
                tracing::error!(
                    session_id = %self.context.session_id,
                    kind = error.kind.as_str(),
                    error = %error,
                    "Error fetching response"
                );
            }

            Effect::ReportFeedbackFailure {
                id,
                judgment,
                error,
            } => {
                tracing::warn!(
                    session_id = %self.context.session_id,
                    message_id = %id,
                    judgment = %judgment,
                    kind = error.kind.as_str(),
                    error = %error,
                    "Feedback not recorded, discarding judgment"
                );
            }

            Effect::PublishState => {
                let _ = self.broadcast_tx.send(SessionEvent::StateChange {
                    busy: self.state.is_busy(),
                    error: self.state.error_message().map(str::to_string),
                });
            }
        }
    }

    fn refresh_view(&self) {
        self.view_tx
            .send_replace(SessionView::capture(&self.state, &self.log));
    }
}

/// Hand a completion back to the session, unless it has already ended
async fn deliver(event_tx: &mpsc::WeakSender<Event>, event: Event, session_id: &str) {
    let Some(tx) = event_tx.upgrade() else {
        tracing::debug!(session_id = %session_id, "Session ended, discarding completion");
        return;
    };
    if tx.send(event).await.is_err() {
        tracing::debug!(session_id = %session_id, "Session ended, discarding completion");
    }
}
