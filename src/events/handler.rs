use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::app::{Delivery, NavState, Navigator, Outcome};
use crate::channel::{MessageHandle, MessagingChannel};
use crate::docker::ContainerBackend;
use crate::types::Result;
use crate::ui::{draw, OutboundMessage};

/// Delivers an outcome to the chat.
///
/// The first `Edit` step replaces `origin` (the message whose button was
/// pressed), falling back to a new message when the edit is refused. Everything
/// else is sent as new messages, in order. A rejected message does not stop the
/// rest of the outcome; the first failure is returned once everything else has
/// been attempted.
pub async fn dispatch<C: MessagingChannel + ?Sized>(
    channel: &C,
    chat_id: i64,
    mut origin: Option<MessageHandle>,
    outcome: &Outcome,
) -> Result<()> {
    let mut first_error = None;

    for step in &outcome.steps {
        let messages = draw(&step.screen);
        let mut pending = messages.iter();

        if step.delivery == Delivery::Edit {
            if let (Some(handle), Some(first)) = (origin, messages.first()) {
                origin = None;
                pending.next();
                if let Err(e) = channel.edit_message(handle, first).await {
                    warn!("{}, sending a new message instead", e);
                    if let Err(e) = deliver(channel, chat_id, first).await {
                        first_error.get_or_insert(e);
                    }
                }
            }
        }

        for message in pending {
            if let Err(e) = deliver(channel, chat_id, message).await {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Sends `message`. If the transport rejects it, a short error notice carrying
/// the same buttons goes out in its place so the controls stay reachable.
async fn deliver<C: MessagingChannel + ?Sized>(
    channel: &C,
    chat_id: i64,
    message: &OutboundMessage,
) -> Result<()> {
    let Err(e) = channel.send_message(chat_id, message).await else {
        return Ok(());
    };
    warn!("Message to chat {} rejected: {}", chat_id, e);

    let notice = OutboundMessage {
        buttons: message.buttons.clone(),
        ..OutboundMessage::plain(format!("⚠️ Error: {}", e))
    };
    if let Err(retry) = channel.send_message(chat_id, &notice).await {
        warn!("Error notice to chat {} also rejected: {}", chat_id, retry);
    }
    Err(e)
}

/// One decoded inbound interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text {
        caller: i64,
        chat_id: i64,
        text: String,
    },
    Callback {
        caller: i64,
        origin: MessageHandle,
        payload: String,
    },
}

impl Inbound {
    pub fn chat_id(&self) -> i64 {
        match self {
            Inbound::Text { chat_id, .. } => *chat_id,
            Inbound::Callback { origin, .. } => origin.chat_id,
        }
    }
}

/// Last navigation state per chat. Holding a chat's lock serializes its events.
///
/// Only chats the operator has talked from get an entry.
#[derive(Default)]
pub struct Sessions {
    chats: Mutex<HashMap<i64, Arc<Mutex<NavState>>>>,
}

impl Sessions {
    pub async fn for_chat(&self, chat_id: i64) -> Arc<Mutex<NavState>> {
        self.chats
            .lock()
            .await
            .entry(chat_id)
            .or_insert_with(|| Arc::new(Mutex::new(NavState::Start)))
            .clone()
    }

    /// `None` for a chat that has no session yet.
    pub async fn state_of(&self, chat_id: i64) -> Option<NavState> {
        let session = self.chats.lock().await.get(&chat_id).cloned()?;
        let state = session.lock().await;
        Some(state.clone())
    }

    pub async fn len(&self) -> usize {
        self.chats.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Runs one interaction to completion: navigate, then deliver.
pub async fn handle_inbound<B, C>(
    navigator: &Navigator<B>,
    channel: &C,
    sessions: &Sessions,
    inbound: Inbound,
) -> Result<Outcome>
where
    B: ContainerBackend,
    C: MessagingChannel + ?Sized,
{
    let chat_id = inbound.chat_id();
    let (caller, origin) = match &inbound {
        Inbound::Text { caller, .. } => (*caller, None),
        Inbound::Callback { caller, origin, .. } => (*caller, Some(*origin)),
    };

    // Strangers get their refusal without a session being opened for them.
    if !navigator.permits(caller) {
        let outcome = navigate(navigator, &inbound).await;
        dispatch(channel, chat_id, origin, &outcome).await?;
        return Ok(outcome);
    }

    let session = sessions.for_chat(chat_id).await;
    let mut state = session.lock().await;
    let outcome = navigate(navigator, &inbound).await;

    if let Some(next) = &outcome.state {
        debug!("Chat {}: {:?} -> {:?}", chat_id, *state, next);
        *state = next.clone();
    }

    dispatch(channel, chat_id, origin, &outcome).await?;
    Ok(outcome)
}

async fn navigate<B: ContainerBackend>(navigator: &Navigator<B>, inbound: &Inbound) -> Outcome {
    match inbound {
        Inbound::Text { caller, text, .. } => navigator.handle_text(*caller, text).await,
        Inbound::Callback { caller, payload, .. } => navigator.handle_callback(*caller, payload).await,
    }
}
