use serde::{Deserialize, Serialize};

/// A user referenced by an alert or schedule, as known to the alerting
/// backend. Reference data only; this crate never stores or mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertUser {
    pub id: String,
    pub name: String,
    /// Deep link to the user's page in the alerting application, used as
    /// the fallback when no Slack identity is mapped.
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertState {
    Unacknowledged,
    Acknowledged,
    Closed,
}

/// Reference to a previously delivered provider message, identified by the
/// platform-assigned message timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub external_id: String,
}

/// A new alert notification. When `original` is present a message for this
/// alert was already delivered, and the notification is sent as a thread
/// reply instead of a fresh message.
#[derive(Debug, Clone)]
pub struct Alert {
    pub channel_id: String,
    pub alert_id: i64,
    pub summary: String,
    pub details: String,
    pub users: Vec<AlertUser>,
    pub original: Option<MessageRef>,
}

/// A state change for an alert that already has a delivered message; the
/// original message is replaced in place.
#[derive(Debug, Clone)]
pub struct AlertStatus {
    pub channel_id: String,
    pub alert_id: i64,
    pub summary: String,
    pub details: String,
    pub users: Vec<AlertUser>,
    /// Human-readable log entry shown in the message footer.
    pub log_entry: String,
    pub new_state: AlertState,
    pub original: MessageRef,
}

/// A single notification summarizing multiple unacknowledged alerts for
/// one service.
#[derive(Debug, Clone)]
pub struct AlertBundle {
    pub channel_id: String,
    pub service_id: String,
    pub service_name: String,
    pub count: usize,
}

/// An on-call rotation announcement for a schedule.
#[derive(Debug, Clone)]
pub struct ScheduleOnCallUsers {
    pub channel_id: String,
    pub schedule_id: String,
    pub schedule_name: String,
    pub schedule_url: String,
    pub users: Vec<AlertUser>,
}

/// Closed set of notification kinds this channel can deliver.
///
/// Adding a kind means adding a variant; every `match` over this enum is
/// exhaustive, so an unhandled variant fails the build rather than falling
/// through at runtime.
#[derive(Debug, Clone)]
pub enum Notification {
    Alert(Alert),
    AlertStatus(AlertStatus),
    AlertBundle(AlertBundle),
    ScheduleOnCallUsers(ScheduleOnCallUsers),
}

impl Notification {
    /// Channel the notification is addressed to.
    #[must_use]
    pub fn channel_id(&self) -> &str {
        match self {
            Notification::Alert(n) => &n.channel_id,
            Notification::AlertStatus(n) => &n.channel_id,
            Notification::AlertBundle(n) => &n.channel_id,
            Notification::ScheduleOnCallUsers(n) => &n.channel_id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Alert(_) => "Alert",
            Notification::AlertStatus(_) => "AlertStatus",
            Notification::AlertBundle(_) => "AlertBundle",
            Notification::ScheduleOnCallUsers(_) => "ScheduleOnCallUsers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    Delivered,
}

/// Delivery receipt returned from a successful send.
///
/// `external_id` is the platform-assigned message timestamp used to target
/// later thread replies. It is empty for update operations: replacing a
/// message yields no new identifier, and future replies keep targeting the
/// original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub external_id: String,
    pub state: MessageState,
}
