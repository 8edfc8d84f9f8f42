//! Slack notification channel for an on-call alerting backend.
//!
//! This crate delivers alert lifecycle notifications (new alerts, status
//! updates, bundles, and on-call rotation announcements) into Slack channels.
//! It owns three concerns:
//!
//! - resolving channel and workspace (team) metadata for the configured bot
//!   token, with bounded TTL caching and lazy, deduplicated population
//! - rendering notifications into Slack message payloads, including
//!   thread-reply and message-replacement semantics for alert updates
//! - best-effort mapping of application users to Slack identities, degrading
//!   to profile links whenever the mapping is unavailable
//!
//! The Slack Web API, permission checking, and the user/subject store are
//! boundary traits (`ChatTransport`, `PermissionChecker`, `SubjectStore`) so
//! the host application wires in its own implementations and tests can
//! substitute stubs.
//!
//! This is a library-level component: no binaries, no persisted state, and
//! no retry policy; delivery retries belong to the dispatch layer that
//! invokes [`slack::ChannelSender::send`].

pub mod core;
pub mod errors;
pub mod slack;
pub mod utils;

/// Configure structured logging with a JSON formatter.
///
/// Intended for process entry points that embed this crate; call it once at
/// startup. Tests install their own scoped subscribers instead.
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    tracing_subscriber::registry().with(fmt_layer).init();
}
