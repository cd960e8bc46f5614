use tracing::{debug, info, warn};

use crate::docker::ContainerBackend;
use crate::events::callback::{BackFrom, Event};
use crate::pager::paginate;
use crate::types::{ActionKind, AppError, ContainerRef, LogCursor, Result, Screen};

pub const ACCESS_DENIED: &str = "⛔ Access denied";
pub const UNKNOWN_ACTION: &str = "❌ Unknown action";
pub const USAGE_HINT: &str = "Send /start to see your containers.";

/// Where the operator is after an event has been handled.
///
/// Recorded per chat for tracing only. Transitions are driven by the payload
/// alone (the log offset travels inside it), so a button on an older message
/// keeps working after the chat has moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    Start,
    ListShown,
    MenuShown(ContainerRef),
    ActionShown(ContainerRef, ActionKind),
    LogsShown(LogCursor),
}

/// How a rendered screen reaches the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Replace the message the interaction came from, sending anew if that fails.
    Edit,
    /// Always a new message.
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub screen: Screen,
    pub delivery: Delivery,
}

impl Step {
    fn edit(screen: Screen) -> Self {
        Self { screen, delivery: Delivery::Edit }
    }

    fn append(screen: Screen) -> Self {
        Self { screen, delivery: Delivery::Append }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub steps: Vec<Step>,
    /// `None` when the event leaves the navigation where it was.
    pub state: Option<NavState>,
}

impl Outcome {
    fn moved(state: NavState, steps: Vec<Step>) -> Self {
        Self { steps, state: Some(state) }
    }

    fn stay(step: Step) -> Self {
        Self { steps: vec![step], state: None }
    }
}

/// The single allow-listed operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator(pub i64);

impl Operator {
    pub fn permits(&self, caller: i64) -> bool {
        self.0 == caller
    }
}

/// Turns operator interactions into screens.
///
/// Holds no per-chat state: the log offset travels inside callback payloads, so
/// concurrent events never contend on anything but the backend.
pub struct Navigator<B> {
    backend: B,
    operator: Operator,
    page_size: usize,
    max_fragment_len: usize,
}

impl<B: ContainerBackend> Navigator<B> {
    pub fn new(backend: B, operator: Operator, page_size: usize, max_fragment_len: usize) -> Self {
        Self {
            backend,
            operator,
            page_size,
            max_fragment_len,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn permits(&self, caller: i64) -> bool {
        self.operator.permits(caller)
    }

    /// A text message from `caller`.
    pub async fn handle_text(&self, caller: i64, text: &str) -> Outcome {
        match Event::from_command(text) {
            Some(event) => self.handle(caller, Ok(event)).await,
            None if self.operator.permits(caller) => Outcome::stay(Step::append(Screen::Notice {
                text: USAGE_HINT.to_string(),
            })),
            None => self.handle(caller, Err(AppError::Unauthorized)).await,
        }
    }

    /// A button press carrying `payload`.
    pub async fn handle_callback(&self, caller: i64, payload: &str) -> Outcome {
        self.handle(caller, payload.parse()).await
    }

    pub async fn handle(&self, caller: i64, event: Result<Event>) -> Outcome {
        if !self.operator.permits(caller) {
            debug!("Ignoring event from unauthorised user {}", caller);
            return Outcome::stay(Step::append(Screen::Notice {
                text: ACCESS_DENIED.to_string(),
            }));
        }

        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!("Rejected event: {}", e);
                return Outcome::stay(Step::append(Screen::Notice {
                    text: UNKNOWN_ACTION.to_string(),
                }));
            }
        };
        debug!("Handling {:?}", event);

        match event {
            Event::ShowList => self.show_list(Delivery::Append).await,
            Event::Refresh | Event::Back(BackFrom::Menu) => self.show_list(Delivery::Edit).await,
            // Log pages are history; leave them in place.
            Event::Back(BackFrom::Logs) => self.show_list(Delivery::Append).await,
            Event::Select(target) => Outcome::moved(
                NavState::MenuShown(target.clone()),
                vec![Step::edit(Screen::ContainerMenu { target })],
            ),
            Event::Action(kind, target) => self.run_action(kind, target).await,
            Event::LogsMore { target, offset } => {
                self.show_logs(LogCursor {
                    target,
                    offset,
                    page_size: self.page_size,
                })
                .await
            }
        }
    }

    async fn list_screen(&self) -> Screen {
        match self.backend.list().await {
            Ok(summaries) => Screen::ContainerList { summaries },
            Err(e) => {
                warn!("Failed to list containers: {}", e);
                Screen::Notice {
                    text: format!("⚠️ Error: {}", e),
                }
            }
        }
    }

    async fn show_list(&self, delivery: Delivery) -> Outcome {
        let screen = self.list_screen().await;
        Outcome::moved(NavState::ListShown, vec![Step { screen, delivery }])
    }

    async fn run_action(&self, kind: ActionKind, target: ContainerRef) -> Outcome {
        let result = match kind {
            ActionKind::Start => self.backend.start(&target).await,
            ActionKind::Stop => self.backend.stop(&target).await,
            ActionKind::Restart => self.backend.restart(&target).await,
            ActionKind::FetchLogs => {
                return self.show_logs(LogCursor::first_page(target, self.page_size)).await;
            }
        };

        let outcome = match result {
            Ok(ack) => {
                info!("{} {}: ok", kind, target);
                Ok(ack)
            }
            Err(e) => {
                warn!("{} {} failed: {}", kind, target, e);
                Err(e.to_string())
            }
        };

        // Resync whether or not the action went through.
        let list = self.list_screen().await;

        Outcome::moved(
            NavState::ListShown,
            vec![
                Step::edit(Screen::ActionResult {
                    target,
                    action: kind,
                    outcome,
                }),
                Step::append(list),
            ],
        )
    }

    async fn show_logs(&self, cursor: LogCursor) -> Outcome {
        let raw = match self.backend.raw_logs(&cursor.target).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Fetching logs of {} failed: {}", cursor.target, e);
                let target = cursor.target;
                return Outcome::moved(
                    NavState::ActionShown(target.clone(), ActionKind::FetchLogs),
                    vec![Step::append(Screen::ActionResult {
                        target,
                        action: ActionKind::FetchLogs,
                        outcome: Err(e.to_string()),
                    })],
                );
            }
        };

        let page = paginate(&raw, &cursor, self.max_fragment_len);
        debug!("Log page for {}: {:?}", cursor.target, page.range);

        let next = LogCursor {
            offset: page.next_offset,
            ..cursor
        };
        let screen = Screen::LogPage {
            target: next.target.clone(),
            exhausted: page.is_terminal(),
            fragments: page.fragments,
            next_offset: page.next_offset,
        };

        Outcome::moved(NavState::LogsShown(next), vec![Step::append(screen)])
    }
}
