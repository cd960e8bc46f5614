use crate::events::callback::{BackFrom, Event};
use crate::types::{ActionKind, ContainerRef};
use crate::ui::{Button, OutboundMessage};

pub fn render_action_result(
    target: &ContainerRef,
    action: ActionKind,
    outcome: &Result<String, String>,
) -> OutboundMessage {
    let msg = match outcome {
        Ok(ack) => OutboundMessage::plain(ack.clone()),
        Err(detail) => OutboundMessage::plain(format!("⚠️ Error: {}", detail)),
    };

    // Mutating actions are followed by a fresh list; a failed log fetch is not.
    if action.is_mutating() {
        msg
    } else {
        msg.with_buttons(vec![vec![
            Button::new("📜 Retry", Event::Action(action, target.clone()).payload()),
            Button::new("⬅️ Back", Event::Back(BackFrom::Logs).payload()),
        ]])
    }
}
