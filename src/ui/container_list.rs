use crate::events::callback::Event;
use crate::types::ContainerSummary;
use crate::ui::{Button, OutboundMessage};

pub const LIST_PROMPT: &str = "📦 Choose a container:";
pub const NO_CONTAINERS: &str = "❌ No containers";

fn refresh_button() -> Button {
    Button::new("🔄 Refresh", Event::Refresh.payload())
}

pub fn render_container_list(summaries: &[ContainerSummary]) -> OutboundMessage {
    if summaries.is_empty() {
        return OutboundMessage::plain(NO_CONTAINERS).with_buttons(vec![vec![refresh_button()]]);
    }

    let mut rows: Vec<Vec<Button>> = summaries
        .iter()
        .map(|c| {
            vec![Button::new(
                format!("{} ({})", c.name, c.status),
                Event::Select(c.name.clone()).payload(),
            )]
        })
        .collect();
    rows.push(vec![refresh_button()]);

    OutboundMessage::plain(LIST_PROMPT).with_buttons(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContainerRef;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_row_per_container_then_refresh() {
        let summaries = vec![
            ContainerSummary {
                name: ContainerRef::parse("web").unwrap(),
                status: "running".to_string(),
            },
            ContainerSummary {
                name: ContainerRef::parse("db").unwrap(),
                status: "exited (1)".to_string(),
            },
        ];

        let msg = render_container_list(&summaries);
        assert_eq!(msg.text, LIST_PROMPT);
        assert_eq!(
            msg.buttons.unwrap(),
            vec![
                vec![Button::new("web (running)", "select:web")],
                vec![Button::new("db (exited (1))", "select:db")],
                vec![Button::new("🔄 Refresh", "refresh")],
            ]
        );
    }

    #[test]
    fn empty_list_still_offers_refresh() {
        let msg = render_container_list(&[]);
        assert_eq!(msg.text, NO_CONTAINERS);
        assert_eq!(msg.buttons.unwrap(), vec![vec![Button::new("🔄 Refresh", "refresh")]]);
    }
}
