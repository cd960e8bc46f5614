use crate::events::callback::{BackFrom, Event};
use crate::types::{ActionKind, ContainerRef};
use crate::ui::{Button, OutboundMessage};

fn action_label(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Start => "▶️ Start",
        ActionKind::Stop => "🛑 Stop",
        ActionKind::Restart => "🔄 Restart",
        ActionKind::FetchLogs => "📜 Logs",
    }
}

pub fn render_container_menu(target: &ContainerRef) -> OutboundMessage {
    let mut rows: Vec<Vec<Button>> = ActionKind::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|&kind| {
                    Button::new(action_label(kind), Event::Action(kind, target.clone()).payload())
                })
                .collect()
        })
        .collect();
    rows.push(vec![Button::new("⬅️ Back", Event::Back(BackFrom::Menu).payload())]);

    // Names are restricted to [A-Za-z0-9_.-], nothing to escape.
    OutboundMessage::plain(format!("What should I do with container <b>{}</b>?", target))
        .html()
        .with_buttons(rows)
}
