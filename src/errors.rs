use slack_morphism::errors::SlackClientError;
use thiserror::Error;
use tracing::error;

/// Errors produced by the chat transport layer.
///
/// The `Api` variant carries the raw Slack error code (e.g.
/// `channel_not_found`) as its entire message, so walking a wrapped chain to
/// its innermost cause yields the bare code for comparison.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Api(String),

    #[error("Failed to send HTTP request: {0}")]
    Http(String),

    #[error("Failed to access Slack API: {0}")]
    Client(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        TransportError::Http(error.to_string())
    }
}

impl From<SlackClientError> for TransportError {
    fn from(error: SlackClientError) -> Self {
        TransportError::Client(error.to_string())
    }
}

/// Public error type for channel resolution and notification delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The caller lacks every role required for the operation.
    #[error("permission denied")]
    PermissionDenied,

    /// A field-level validation failure, typically mapped from a known
    /// remote error code.
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// A remote call failed; `op` names the operation for context and the
    /// transport error is preserved as the source.
    #[error("{op}: {source}")]
    Remote {
        op: &'static str,
        #[source]
        source: TransportError,
    },

    /// The channel listing kept returning continuation cursors past the
    /// page ceiling.
    #[error("abort after more than {0} pages of Slack channels")]
    PageLimitExceeded(usize),

    /// A dispatch layer asked this channel to deliver an event kind it has
    /// no rendering for. Not retryable; indicates a missing mapping.
    #[error("unsupported notification kind: {0}")]
    UnsupportedNotification(String),

    #[error("{0}")]
    Internal(String),
}

impl NotifyError {
    #[must_use]
    pub(crate) fn remote(op: &'static str, source: TransportError) -> Self {
        NotifyError::Remote { op, source }
    }
}

/// Walk a wrapped-error chain to its innermost cause and return its message.
#[must_use]
pub fn root_cause_message(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

/// Map known Slack error codes from a channel operation onto field-level
/// validation failures; anything unrecognized passes through unchanged.
///
/// The auth family is logged before being surfaced, since a revoked or
/// under-scoped bot token is an operator-facing misconfiguration worth
/// recording.
#[must_use]
pub fn map_channel_error(err: NotifyError) -> NotifyError {
    match root_cause_message(&err).as_str() {
        "channel_not_found" => NotifyError::Validation {
            field: "ChannelID",
            message: "Invalid Slack channel ID.".to_string(),
        },
        "missing_scope" | "invalid_auth" | "account_inactive" | "token_revoked" | "not_authed" => {
            error!(error = %err, "slack auth failure");
            NotifyError::Validation {
                field: "ChannelID",
                message: "Permission Denied.".to_string(),
            }
        }
        _ => err,
    }
}
