//! Pure rendering of notifications into Slack message payloads.
//!
//! Nothing in this module performs I/O or takes a lock; identity and link
//! data is resolved by the sender and passed in.

use std::collections::HashMap;

use serde_json::{Value, json};
use tracing::error;

use crate::core::models::{AlertState, AlertUser, ScheduleOnCallUsers};
use crate::utils::text::render_size;

pub const COLOR_CLOSED: &str = "#218626";
pub const COLOR_UNACKED: &str = "#862421";
pub const COLOR_ACKED: &str = "#867321";

/// Byte budget for the escaped alert details block.
const DETAILS_SIZE_LIMIT: usize = 3000;

/// Escape free text for Slack mrkdwn embedding (`&`, `<`, `>`).
#[must_use]
pub fn escape_message(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Join personnel entries into a sentence.
///
/// Zero entries renders as "None"; two as "A and B"; three or more with an
/// Oxford comma ("A, B, and C").
#[must_use]
pub fn format_personnel(links: &[String]) -> String {
    match links {
        [] => "None".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

/// One entry per user: an `@` mention when a Slack identity is mapped,
/// otherwise a link to the user's page in the alerting application.
#[must_use]
pub fn user_links(users: &[AlertUser], subject_ids: &HashMap<String, String>) -> Vec<String> {
    users
        .iter()
        .map(|user| match subject_ids.get(&user.id) {
            Some(subject_id) if !subject_id.is_empty() => {
                format!("<@{}>", escape_message(subject_id))
            }
            _ => format!(
                "<{}|{}>",
                escape_message(&user.url),
                escape_message(&user.name)
            ),
        })
        .collect()
}

/// Header text for alert messages: a linked `Alert #<id>: <summary>` line
/// followed by the personnel list.
#[must_use]
pub fn alert_link_text(alert_url: &str, alert_id: i64, summary: &str, links: &[String]) -> String {
    format!(
        "<{}|Alert #{}: {}>\nPersonnel: {}",
        alert_url,
        alert_id,
        escape_message(summary),
        format_personnel(links),
    )
}

/// Where an outbound message lands: a fresh message, a reply in the thread
/// of an earlier message, or an in-place replacement of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTarget {
    New,
    ThreadReply(String),
    Update(String),
}

/// Colored attachment wrapping the alert blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub color: String,
    pub fallback: String,
    pub blocks: Vec<Value>,
}

/// Platform-ready outbound message. Produced and consumed within a single
/// send operation; never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePayload {
    pub target: MessageTarget,
    pub text: Option<String>,
    pub attachment: Option<Attachment>,
}

impl MessagePayload {
    /// Plain-text message posted fresh to the channel.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            target: MessageTarget::New,
            text: Some(text.into()),
            attachment: None,
        }
    }
}

/// Build the attachment payload for an alert notification or status update.
///
/// `link_text` is the pre-rendered alert header (see [`alert_link_text`]).
/// Closed alerts suppress the details block entirely. Details that fail to
/// render are logged and dropped rather than failing the message.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn alert_message(
    target: MessageTarget,
    link_text: &str,
    alert_id: i64,
    summary: &str,
    details: &str,
    log_entry: &str,
    state: AlertState,
    interactive: bool,
) -> MessagePayload {
    let mut blocks = vec![json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": link_text },
    })];

    let color = match state {
        AlertState::Acknowledged => COLOR_ACKED,
        AlertState::Unacknowledged => COLOR_UNACKED,
        AlertState::Closed => COLOR_CLOSED,
    };
    let details = if state == AlertState::Closed { "" } else { details };

    if !details.is_empty() {
        match render_size(DETAILS_SIZE_LIMIT, details, |s| Ok(escape_message(s))) {
            Ok(escaped) if !escaped.is_empty() => blocks.push(json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": escaped },
            })),
            Ok(_) => {}
            Err(err) => error!(error = %err, "render alert details"),
        }
    }

    blocks.push(json!({
        "type": "context",
        "elements": [{ "type": "plain_text", "text": log_entry }],
    }));

    // No interactive actions exist yet; the flag only matters once some do.
    let actions: Vec<Value> = Vec::new();
    if interactive && !actions.is_empty() {
        blocks.extend(actions);
    }

    MessagePayload {
        target,
        text: None,
        attachment: Some(Attachment {
            color: color.to_string(),
            fallback: format!("Alert #{alert_id}: {}", escape_message(summary)),
            blocks,
        }),
    }
}

/// Single-line summary for a bundle of unacknowledged alerts on one service.
#[must_use]
pub fn bundle_text(service_name: &str, count: usize, service_url: &str) -> String {
    format!(
        "Service '{}' has {} unacknowledged alerts.\n\n<{}>",
        escape_message(service_name),
        count,
        service_url,
    )
}

/// Render an on-call rotation announcement.
///
/// Users with a mapped Slack identity become `@` mentions; everyone else
/// gets a link to their page, so the message renders even when identity
/// lookups failed entirely.
#[must_use]
pub fn on_call_text(msg: &ScheduleOnCallUsers, subject_ids: &HashMap<String, String>) -> String {
    let links = user_links(&msg.users, subject_ids);
    format!(
        "New On-Call Rotation for this week!\nPersonnel: {}\nSchedule: <{}|{}>\nPlease ACKNOWLEDGE and CLOSE any triggered alerts ASAP!",
        format_personnel(&links),
        escape_message(&msg.schedule_url),
        escape_message(&msg.schedule_name),
    )
}
