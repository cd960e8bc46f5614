use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::app::Navigator;
use crate::channel::MessageHandle;
use crate::docker::ContainerBackend;
use crate::events::handler::{handle_inbound, Inbound, Sessions};
use crate::telegram::api::{TelegramClient, Update};

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Turns a raw update into an interaction, acknowledging button presses on the way.
async fn decode(client: &TelegramClient, update: Update) -> Option<Inbound> {
    if let Some(query) = update.callback_query {
        if let Err(e) = client.answer_callback(&query.id).await {
            warn!("Failed to answer callback: {}", e);
        }
        let message = query.message?;
        return Some(Inbound::Callback {
            caller: query.from.id,
            origin: MessageHandle {
                chat_id: message.chat.id,
                message_id: message.message_id,
            },
            payload: query.data.unwrap_or_default(),
        });
    }

    let message = update.message?;
    Some(Inbound::Text {
        caller: message.from?.id,
        chat_id: message.chat.id,
        text: message.text?,
    })
}

/// Long-polls for updates until `shutdown` resolves.
///
/// Each update runs on its own task; `Sessions` keeps one chat's updates in order.
pub async fn run<B>(
    client: TelegramClient,
    navigator: Arc<Navigator<B>>,
    poll_timeout: Duration,
    shutdown: impl Future<Output = ()>,
) where
    B: ContainerBackend + 'static,
{
    let sessions = Arc::new(Sessions::default());
    let mut offset = 0;
    tokio::pin!(shutdown);

    info!("Polling for updates");
    loop {
        let updates = tokio::select! {
            _ = &mut shutdown => break,
            updates = client.get_updates(offset, poll_timeout) => updates,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                warn!("Fetching updates failed: {}", e);
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let client = client.clone();
            let navigator = Arc::clone(&navigator);
            let sessions = Arc::clone(&sessions);
            tokio::spawn(async move {
                let Some(inbound) = decode(&client, update).await else {
                    debug!("Skipping update without text or callback");
                    return;
                };
                if let Err(e) = handle_inbound(&navigator, &client, &sessions, inbound).await {
                    warn!("Failed to deliver response: {}", e);
                }
            });
        }
    }
    info!("Stopped polling");
}
