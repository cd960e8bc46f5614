use async_trait::async_trait;

use crate::types::Result;
use crate::ui::OutboundMessage;

/// A message already delivered to a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("edit failed: {0}")]
pub struct EditFailed(pub String);

/// The chat transport the bot talks through.
#[async_trait]
pub trait MessagingChannel: Send + Sync {
    async fn send_message(&self, chat_id: i64, message: &OutboundMessage) -> Result<MessageHandle>;

    /// Replaces text and buttons of a delivered message.
    async fn edit_message(
        &self,
        handle: MessageHandle,
        message: &OutboundMessage,
    ) -> std::result::Result<(), EditFailed>;
}
