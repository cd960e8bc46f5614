use crate::events::callback::{BackFrom, Event};
use crate::types::ContainerRef;
use crate::ui::{Button, OutboundMessage};

/// One message per fragment; the paging controls ride on the last one.
pub fn render_log_page(
    target: &ContainerRef,
    fragments: &[String],
    next_offset: usize,
    exhausted: bool,
) -> Vec<OutboundMessage> {
    let mut messages: Vec<OutboundMessage> = fragments
        .iter()
        .map(|fragment| {
            // The transport refuses blank messages.
            if fragment.trim().is_empty() {
                OutboundMessage::plain("(blank lines)")
            } else {
                OutboundMessage::plain(fragment.clone())
            }
        })
        .collect();

    let mut controls = Vec::new();
    if !exhausted {
        controls.push(Button::new(
            "⏪ Show more",
            Event::LogsMore {
                target: target.clone(),
                offset: next_offset,
            }
            .payload(),
        ));
    }
    controls.push(Button::new("⬅️ Back", Event::Back(BackFrom::Logs).payload()));

    match messages.last_mut() {
        Some(last) => last.buttons = Some(vec![controls]),
        None => messages.push(OutboundMessage::plain("(empty)").with_buttons(vec![controls])),
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn controls_attach_to_the_last_fragment() {
        let web = ContainerRef::parse("web").unwrap();
        let fragments = vec!["📜 web: lines 1-2 of 2\na".to_string(), "b".to_string()];
        let messages = render_log_page(&web, &fragments, 100, false);

        assert_eq!(messages.len(), 2);
        assert!(messages[0].buttons.is_none());
        assert_eq!(
            messages[1].buttons.clone().unwrap(),
            vec![vec![
                Button::new("⏪ Show more", "logs_more:web:100"),
                Button::new("⬅️ Back", "back:logs"),
            ]]
        );
        assert_eq!(messages[0].format, None);
    }

    #[test]
    fn exhausted_page_only_goes_back() {
        let web = ContainerRef::parse("web").unwrap();
        let messages = render_log_page(&web, &["(no more lines)".to_string()], 300, true);
        assert_eq!(
            messages[0].buttons.clone().unwrap(),
            vec![vec![Button::new("⬅️ Back", "back:logs")]]
        );
    }
}
