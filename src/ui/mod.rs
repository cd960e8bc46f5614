pub mod action_result;
pub mod container_list;
pub mod container_menu;
pub mod logs;

use tracing::warn;

use crate::types::Screen;
use crate::ui::action_result::render_action_result;
use crate::ui::container_list::render_container_list;
use crate::ui::container_menu::render_container_menu;
use crate::ui::logs::render_log_page;

/// Telegram rejects a keyboard whose `callback_data` exceeds this many bytes.
pub const MAX_PAYLOAD_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    /// Opaque callback payload, echoed back by the transport on press.
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Rows of inline buttons.
pub type Keyboard = Vec<Vec<Button>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub format: Option<FormatMode>,
    pub buttons: Option<Keyboard>,
}

impl OutboundMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: None,
            buttons: None,
        }
    }

    pub fn with_buttons(mut self, buttons: Keyboard) -> Self {
        self.buttons = Some(buttons);
        self
    }

    pub fn html(mut self) -> Self {
        self.format = Some(FormatMode::Html);
        self
    }
}

/// Messages that present `screen`, in sending order. Never empty.
///
/// Buttons whose payload would not fit in a callback are left out.
pub fn draw(screen: &Screen) -> Vec<OutboundMessage> {
    let mut messages = match screen {
        Screen::ContainerList { summaries } => vec![render_container_list(summaries)],
        Screen::ContainerMenu { target } => vec![render_container_menu(target)],
        Screen::ActionResult { target, action, outcome } => {
            vec![render_action_result(target, *action, outcome)]
        }
        Screen::LogPage {
            target,
            fragments,
            next_offset,
            exhausted,
        } => render_log_page(target, fragments, *next_offset, *exhausted),
        Screen::Notice { text } => vec![OutboundMessage::plain(text.clone())],
    };

    for message in &mut messages {
        if let Some(rows) = &mut message.buttons {
            for row in rows.iter_mut() {
                row.retain(|button| {
                    let fits = button.payload.len() <= MAX_PAYLOAD_LEN;
                    if !fits {
                        warn!("Dropping button {:?}: payload too long", button.label);
                    }
                    fits
                });
            }
            rows.retain(|row| !row.is_empty());
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionKind, ContainerRef, ContainerSummary, MAX_REF_LEN};

    fn payloads(messages: &[OutboundMessage]) -> Vec<String> {
        messages
            .iter()
            .flat_map(|m| m.buttons.iter().flatten().flatten())
            .map(|b| b.payload.clone())
            .collect()
    }

    #[test]
    fn longest_names_still_fit_in_callback_data() {
        let target = ContainerRef::parse(&"n".repeat(MAX_REF_LEN)).unwrap();
        let screens = vec![
            Screen::ContainerList {
                summaries: vec![ContainerSummary {
                    name: target.clone(),
                    status: "running".to_string(),
                }],
            },
            Screen::ContainerMenu { target: target.clone() },
            Screen::ActionResult {
                target: target.clone(),
                action: ActionKind::FetchLogs,
                outcome: Err("boom".to_string()),
            },
            Screen::LogPage {
                target: target.clone(),
                fragments: vec!["line".to_string()],
                next_offset: 9_999_999_999_999,
                exhausted: false,
            },
        ];

        let mut seen = 0;
        for screen in &screens {
            for payload in payloads(&draw(screen)) {
                assert!(payload.len() <= MAX_PAYLOAD_LEN, "{} is too long", payload);
                seen += 1;
            }
        }
        // select + refresh, 4 actions + back, retry + back, show-more + back
        assert_eq!(seen, 11);
    }

    #[test]
    fn oversized_payloads_are_left_out() {
        let target = ContainerRef::parse(&"n".repeat(MAX_REF_LEN)).unwrap();
        let messages = draw(&Screen::LogPage {
            target,
            fragments: vec!["line".to_string()],
            next_offset: usize::MAX,
            exhausted: false,
        });

        let kept = payloads(&messages);
        assert_eq!(kept, vec!["back:logs".to_string()]);
    }
}
