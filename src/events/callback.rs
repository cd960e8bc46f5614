use std::fmt;
use std::str::FromStr;

use crate::types::{ActionKind, AppError, ContainerRef, Result};

/// Which screen a back button was pressed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackFrom {
    Menu,
    Logs,
}

/// An inbound interaction, decoded once at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `/start` or `/list`.
    ShowList,
    Refresh,
    Select(ContainerRef),
    Action(ActionKind, ContainerRef),
    LogsMore { target: ContainerRef, offset: usize },
    Back(BackFrom),
}

impl Event {
    /// Decodes a text message. `None` for anything that is not a known command.
    pub fn from_command(text: &str) -> Option<Self> {
        // "/start@my_bot arg" in group chats
        let command = text.split_whitespace().next()?;
        let command = command.split('@').next()?;
        match command {
            "/start" | "/list" => Some(Event::ShowList),
            _ => None,
        }
    }

    /// Callback payload for this event, as placed on an inline button.
    pub fn payload(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::ShowList | Event::Refresh => f.write_str("refresh"),
            Event::Select(target) => write!(f, "select:{}", target),
            Event::Action(kind, target) => write!(f, "action:{}:{}", kind, target),
            Event::LogsMore { target, offset } => write!(f, "logs_more:{}:{}", target, offset),
            Event::Back(BackFrom::Menu) => f.write_str("back:menu"),
            Event::Back(BackFrom::Logs) => f.write_str("back:logs"),
        }
    }
}

fn malformed(payload: &str) -> AppError {
    AppError::MalformedEvent(format!("unrecognised payload {:?}", payload))
}

impl FromStr for Event {
    type Err = AppError;

    fn from_str(payload: &str) -> Result<Self> {
        let mut parts = payload.split(':');
        let kind = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match (kind, args.as_slice()) {
            ("refresh", []) => Ok(Event::Refresh),
            ("back", []) | ("back", ["menu"]) => Ok(Event::Back(BackFrom::Menu)),
            ("back", ["logs"]) => Ok(Event::Back(BackFrom::Logs)),
            ("select", [name]) => Ok(Event::Select(ContainerRef::parse(name)?)),
            ("action", [action, name]) => {
                Ok(Event::Action(action.parse()?, ContainerRef::parse(name)?))
            }
            ("logs_more", [name, offset]) => {
                let offset = offset.parse().map_err(|_| malformed(payload))?;
                Ok(Event::LogsMore {
                    target: ContainerRef::parse(name)?,
                    offset,
                })
            }
            _ => Err(malformed(payload)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn web() -> ContainerRef {
        ContainerRef::parse("web").unwrap()
    }

    #[test]
    fn decodes_known_payloads() {
        assert_eq!("refresh".parse::<Event>().unwrap(), Event::Refresh);
        assert_eq!("select:web".parse::<Event>().unwrap(), Event::Select(web()));
        assert_eq!(
            "action:stop:web".parse::<Event>().unwrap(),
            Event::Action(ActionKind::Stop, web())
        );
        assert_eq!(
            "action:logs:web".parse::<Event>().unwrap(),
            Event::Action(ActionKind::FetchLogs, web())
        );
        assert_eq!(
            "logs_more:web:200".parse::<Event>().unwrap(),
            Event::LogsMore { target: web(), offset: 200 }
        );
        assert_eq!("back".parse::<Event>().unwrap(), Event::Back(BackFrom::Menu));
        assert_eq!("back:logs".parse::<Event>().unwrap(), Event::Back(BackFrom::Logs));
    }

    #[test]
    fn payloads_survive_the_transport() {
        let events = [
            Event::Refresh,
            Event::Select(web()),
            Event::Action(ActionKind::Restart, web()),
            Event::LogsMore { target: web(), offset: 300 },
            Event::Back(BackFrom::Menu),
            Event::Back(BackFrom::Logs),
        ];
        for event in events {
            assert_eq!(event.payload().parse::<Event>().unwrap(), event);
        }
    }

    #[test]
    fn rejects_malformed_payloads() {
        for payload in [
            "",
            "select",
            "select:",
            "action:explode:web",
            "action:stop",
            "logs_more:web:-1",
            "logs_more:web:lots",
            "select:x; rm -rf /",
            "teleport:web",
        ] {
            let err = payload.parse::<Event>().unwrap_err();
            assert!(
                matches!(err, AppError::MalformedEvent(_) | AppError::InvalidContainerRef(_)),
                "{payload:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn recognises_commands() {
        assert_eq!(Event::from_command("/start"), Some(Event::ShowList));
        assert_eq!(Event::from_command("/list"), Some(Event::ShowList));
        assert_eq!(Event::from_command("/start@dock_bot"), Some(Event::ShowList));
        assert_eq!(Event::from_command("hello"), None);
        assert_eq!(Event::from_command(""), None);
    }
}
