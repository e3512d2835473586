//! Message relay: one inbound activity in, at most one prediction call and
//! one reply out.

use tracing::{debug, info, warn};

use flowbridge_core::SessionId;
use flowbridge_flowise::{PredictionApi, PredictionRequest};
use flowbridge_markup::Translator;

use crate::activity::Activity;
use crate::card::AdaptiveCard;
use crate::sender::{ActivitySender, Reply};

/// Sent when the chatflow answered but returned no text.
pub const EMPTY_ANSWER_FALLBACK: &str = "I'm sorry, I couldn't process that request properly.";

/// Sent when the prediction call itself failed.
pub const ERROR_FALLBACK: &str =
    "I'm sorry, I encountered an error processing your request. Please try again later.";

/// What happened to one inbound activity. Only used for logging and tests;
/// callers never have to act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Translated answer delivered as a card.
    Answered,
    /// Chatflow returned no text; the empty-answer fallback was sent.
    Fallback,
    /// Prediction call failed; the error apology was sent (or attempted).
    Failed,
    /// Greeting sent to a conversation that gained members.
    Welcomed,
    /// Nothing to do for this activity.
    Ignored,
    /// A reply was produced but could not be delivered.
    Undelivered,
}

pub struct MessageRelay<P, S> {
    prediction: P,
    sender: S,
    translator: Translator,
}

impl<P: PredictionApi, S: ActivitySender> MessageRelay<P, S> {
    pub fn new(prediction: P, sender: S, translator: Translator) -> Self {
        Self {
            prediction,
            sender,
            translator,
        }
    }

    /// Process one activity to completion. Never fails: every error is
    /// logged and folded into the outcome.
    pub async fn handle(&self, activity: &Activity) -> RelayOutcome {
        if activity.is_message() {
            self.on_message(activity).await
        } else if activity.is_conversation_update() && !activity.members_added.is_empty() {
            self.on_members_added(activity).await
        } else {
            debug!(kind = %activity.kind, "ignoring activity");
            RelayOutcome::Ignored
        }
    }

    /// Forward the user's text to the chatflow and reply with the translated
    /// answer.
    pub async fn on_message(&self, activity: &Activity) -> RelayOutcome {
        let Some(conversation) = activity.conversation_id() else {
            warn!("message activity without conversation id");
            return RelayOutcome::Ignored;
        };
        // a mention-only message still goes out, as an empty question
        let question = activity.text_without_recipient_mention();

        let session = SessionId::for_conversation(conversation);
        info!(
            conversation,
            chars = question.len(),
            "relaying message to Flowise"
        );

        let req = PredictionRequest::question(question, &session);
        match self.prediction.predict(&req).await {
            Ok(resp) => match resp.text() {
                Some(answer) => {
                    let formatted = self.translator.translate(answer);
                    let reply = Reply::Card(AdaptiveCard::text(formatted));
                    self.deliver(activity, reply, RelayOutcome::Answered).await
                }
                None => {
                    warn!(conversation, "Flowise response carried no text");
                    self.deliver(
                        activity,
                        Reply::Text(EMPTY_ANSWER_FALLBACK.to_string()),
                        RelayOutcome::Fallback,
                    )
                    .await
                }
            },
            Err(e) => {
                warn!(conversation, error = %e, "Flowise prediction failed");
                let reply = Reply::Text(ERROR_FALLBACK.to_string());
                self.deliver(activity, reply, RelayOutcome::Failed).await;
                RelayOutcome::Failed
            }
        }
    }

    /// Ask the chatflow for a greeting when members join. One call per
    /// event regardless of how many members were added.
    pub async fn on_members_added(&self, activity: &Activity) -> RelayOutcome {
        if !activity.members_added.iter().any(|m| !m.id.is_empty()) {
            return RelayOutcome::Ignored;
        }
        let Some(conversation) = activity.conversation_id() else {
            warn!("conversationUpdate without conversation id");
            return RelayOutcome::Ignored;
        };

        let session = SessionId::for_conversation(conversation);
        info!(
            conversation,
            added = activity.members_added.len(),
            "requesting welcome message"
        );

        let req = PredictionRequest::welcome(&session);
        match self.prediction.predict(&req).await {
            // the greeting is sent as written, without markup translation
            Ok(resp) => match resp.text() {
                Some(greeting) => {
                    let reply = Reply::Text(greeting.to_string());
                    self.deliver(activity, reply, RelayOutcome::Welcomed).await
                }
                None => {
                    debug!(conversation, "chatflow returned no welcome text");
                    RelayOutcome::Ignored
                }
            },
            Err(e) => {
                warn!(conversation, error = %e, "welcome prediction failed");
                RelayOutcome::Ignored
            }
        }
    }

    async fn deliver(
        &self,
        activity: &Activity,
        reply: Reply,
        outcome: RelayOutcome,
    ) -> RelayOutcome {
        match self.sender.send(activity, reply).await {
            Ok(()) => outcome,
            Err(e) => {
                warn!(error = %e, "failed to send reply to Teams");
                RelayOutcome::Undelivered
            }
        }
    }
}
