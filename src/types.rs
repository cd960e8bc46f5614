use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Longest container name we accept from the operator or the backend.
///
/// Keeps `logs_more:<name>:<offset>` inside Telegram's 64-byte callback data
/// for any offset below 10^13.
pub const MAX_REF_LEN: usize = 40;

/// Name of a container, validated against Docker's `[a-zA-Z0-9][a-zA-Z0-9_.-]*`.
///
/// Every backend call takes a `ContainerRef`, so a name that would be unsafe to
/// place on a `docker` command line (including one read as an option) cannot
/// reach any backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ContainerRef(String);

impl ContainerRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut chars = raw.chars();
        let valid = raw.len() <= MAX_REF_LEN
            && chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(AppError::InvalidContainerRef(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContainerRef {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContainerRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ContainerRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub name: ContainerRef,
    /// Backend state string, e.g. "running" or "exited".
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Start,
    Stop,
    Restart,
    FetchLogs,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Start,
        ActionKind::Stop,
        ActionKind::Restart,
        ActionKind::FetchLogs,
    ];

    /// Identifier used inside callback payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Start => "start",
            ActionKind::Stop => "stop",
            ActionKind::Restart => "restart",
            ActionKind::FetchLogs => "logs",
        }
    }

    pub fn is_mutating(self) -> bool {
        !matches!(self, ActionKind::FetchLogs)
    }
}

impl FromStr for ActionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(ActionKind::Start),
            "stop" => Ok(ActionKind::Stop),
            "restart" => Ok(ActionKind::Restart),
            "logs" => Ok(ActionKind::FetchLogs),
            other => Err(AppError::MalformedEvent(format!("unknown action `{}`", other))),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position in one container's log: how many trailing lines were already shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCursor {
    pub target: ContainerRef,
    pub offset: usize,
    pub page_size: usize,
}

impl LogCursor {
    pub fn first_page(target: ContainerRef, page_size: usize) -> Self {
        Self { target, offset: 0, page_size }
    }
}

/// What the operator is shown after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    ContainerList {
        summaries: Vec<ContainerSummary>,
    },
    ContainerMenu {
        target: ContainerRef,
    },
    ActionResult {
        target: ContainerRef,
        action: ActionKind,
        outcome: std::result::Result<String, String>,
    },
    LogPage {
        target: ContainerRef,
        fragments: Vec<String>,
        next_offset: usize,
        /// Set on the "(no more lines)" and "(empty)" pages.
        exhausted: bool,
    },
    /// Standalone message: access denied, unknown action, list failure.
    Notice {
        text: String,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("access denied")]
    Unauthorized,
    #[error("container {0} not found")]
    ContainerNotFound(String),
    #[error("invalid container name: {0:?}")]
    InvalidContainerRef(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("backend timed out after {}s", .0.as_secs())]
    BackendTimeout(Duration),
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("malformed event: {0}")]
    MalformedEvent(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_docker_style_names() {
        for name in ["web", "my-app_1", "proj.db.1", "A9"] {
            assert_eq!(ContainerRef::parse(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn rejects_shell_metacharacters() {
        for name in ["x; rm -rf /", "a b", "$(id)", "a|b", "`x`", "", "name:1", "a\nb"] {
            assert!(
                matches!(ContainerRef::parse(name), Err(AppError::InvalidContainerRef(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_names_read_as_options() {
        for name in ["--help", "-t", "--since=1h", ".hidden", "_x"] {
            assert!(ContainerRef::parse(name).is_err(), "{name:?} should be rejected");
        }
        assert!(ContainerRef::parse("web-1").is_ok());
    }

    #[test]
    fn rejects_overlong_names() {
        let long = "a".repeat(MAX_REF_LEN + 1);
        assert!(ContainerRef::parse(&long).is_err());
        assert!(ContainerRef::parse(&long[..MAX_REF_LEN]).is_ok());
    }

    #[test]
    fn action_kind_ids_parse_back() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
        assert!("explode".parse::<ActionKind>().is_err());
    }
}
