//! Container remote control over a chat bot.
//!
//! Inbound events are decoded in [`events::callback`], routed by the
//! [`app::Navigator`] state machine to a [`docker::ContainerBackend`] or the
//! log [`pager`], rendered by [`ui`] and delivered through a
//! [`channel::MessagingChannel`].

pub mod app;
pub mod channel;
pub mod config;
pub mod docker;
pub mod events;
pub mod pager;
pub mod telegram;
pub mod types;
pub mod ui;
