use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::channel::{EditFailed, MessageHandle, MessagingChannel};
use crate::types::{AppError, Result};
use crate::ui::{FormatMode, Keyboard, OutboundMessage};

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct InlineButton<'a> {
    text: &'a str,
    callback_data: &'a str,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup<'a> {
    inline_keyboard: Vec<Vec<InlineButton<'a>>>,
}

#[derive(Debug, Serialize)]
struct OutgoingText<'a> {
    chat_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_id: Option<i64>,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

impl<'a> OutgoingText<'a> {
    fn new(chat_id: i64, message_id: Option<i64>, message: &'a OutboundMessage) -> Self {
        Self {
            chat_id,
            message_id,
            text: &message.text,
            parse_mode: message.format.map(|mode| match mode {
                FormatMode::Html => "HTML",
            }),
            reply_markup: message.buttons.as_ref().map(markup),
        }
    }
}

fn markup(keyboard: &Keyboard) -> InlineKeyboardMarkup<'_> {
    InlineKeyboardMarkup {
        inline_keyboard: keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| InlineButton {
                        text: &b.label,
                        callback_data: &b.payload,
                    })
                    .collect()
            })
            .collect(),
    }
}

/// Telegram answers this when an edit would not change anything.
const NOT_MODIFIED: &str = "message is not modified";

/// Minimal Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base: String,
}

impl TelegramClient {
    /// `poll_timeout` is the long-poll window; HTTP requests may take a little longer.
    pub fn new(api_base_url: &str, token: &str, poll_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base: format!("{}/bot{}", api_base_url.trim_end_matches('/'), token),
        })
    }

    async fn call<P: Serialize + ?Sized, T: DeserializeOwned>(&self, method: &str, params: &P) -> Result<T> {
        // The URL embeds the token: keep it out of logs and errors.
        debug!("Telegram {}", method);
        let response: ApiResponse<T> = self
            .http
            .post(format!("{}/{}", self.base, method))
            .json(params)
            .send()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?
            .json()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        match response {
            ApiResponse { ok: true, result: Some(result), .. } => Ok(result),
            ApiResponse { description, .. } => Err(AppError::Transport(format!(
                "{}: {}",
                method,
                description.unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }

    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>> {
        let params = serde_json::json!({
            "offset": offset,
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message", "callback_query"],
        });
        self.call("getUpdates", &params).await
    }

    /// Stops the client-side spinner on a pressed button.
    pub async fn answer_callback(&self, callback_query_id: &str) -> Result<()> {
        let params = serde_json::json!({ "callback_query_id": callback_query_id });
        self.call::<_, bool>("answerCallbackQuery", &params).await.map(|_| ())
    }
}

#[async_trait]
impl MessagingChannel for TelegramClient {
    async fn send_message(&self, chat_id: i64, message: &OutboundMessage) -> Result<MessageHandle> {
        let sent: Message = self
            .call("sendMessage", &OutgoingText::new(chat_id, None, message))
            .await?;
        Ok(MessageHandle {
            chat_id: sent.chat.id,
            message_id: sent.message_id,
        })
    }

    async fn edit_message(
        &self,
        handle: MessageHandle,
        message: &OutboundMessage,
    ) -> std::result::Result<(), EditFailed> {
        let params = OutgoingText::new(handle.chat_id, Some(handle.message_id), message);
        // Result is the edited Message, or `true` for inline messages.
        match self.call::<_, serde_json::Value>("editMessageText", &params).await {
            Ok(_) => Ok(()),
            Err(AppError::Transport(detail)) if detail.contains(NOT_MODIFIED) => Ok(()),
            Err(e) => Err(EditFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Button;

    #[test]
    fn serializes_buttons_and_format() {
        let message = OutboundMessage::plain("What should I do with container <b>web</b>?")
            .html()
            .with_buttons(vec![vec![Button::new("▶️ Start", "action:start:web")]]);

        let json = serde_json::to_value(OutgoingText::new(42, Some(7), &message)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "chat_id": 42,
                "message_id": 7,
                "text": "What should I do with container <b>web</b>?",
                "parse_mode": "HTML",
                "reply_markup": {
                    "inline_keyboard": [[{ "text": "▶️ Start", "callback_data": "action:start:web" }]]
                }
            })
        );
    }

    #[test]
    fn plain_message_omits_optional_fields() {
        let json = serde_json::to_value(OutgoingText::new(42, None, &OutboundMessage::plain("hi"))).unwrap();
        assert_eq!(json, serde_json::json!({ "chat_id": 42, "text": "hi" }));
    }

    #[test]
    fn parses_callback_update() {
        let raw = r#"{
            "update_id": 10,
            "callback_query": {
                "id": "abc",
                "from": { "id": 1, "is_bot": false, "first_name": "Op" },
                "message": { "message_id": 5, "chat": { "id": 99, "type": "private" }, "date": 0 },
                "data": "select:web"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let query = update.callback_query.unwrap();
        assert_eq!(query.from.id, 1);
        assert_eq!(query.data.as_deref(), Some("select:web"));
        assert_eq!(query.message.unwrap().chat.id, 99);
    }
}
