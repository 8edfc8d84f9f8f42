use std::error::Error;
use std::io;
use std::sync::{Arc, Mutex};

use oncall_slack::errors::{NotifyError, TransportError, map_channel_error, root_cause_message};

#[test]
fn test_notify_error_implements_error_trait() {
    fn assert_error<T: Error>(_: &T) {}

    let error = NotifyError::PermissionDenied;
    assert_error(&error);
    let error = TransportError::Api("channel_not_found".to_string());
    assert_error(&error);
}

#[test]
fn test_error_display() {
    let error = NotifyError::Validation {
        field: "ChannelID",
        message: "Invalid Slack channel ID.".to_string(),
    };
    assert_eq!(
        format!("{error}"),
        "invalid ChannelID: Invalid Slack channel ID."
    );

    let error = NotifyError::PageLimitExceeded(10);
    assert_eq!(
        format!("{error}"),
        "abort after more than 10 pages of Slack channels"
    );

    let error = NotifyError::UnsupportedNotification("Verification".to_string());
    assert_eq!(
        format!("{error}"),
        "unsupported notification kind: Verification"
    );

    let error = TransportError::Http("connection reset".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to send HTTP request: connection reset"
    );
}

#[test]
fn test_api_error_display_is_bare_code() {
    // Root-cause matching compares the innermost message against Slack
    // error codes, so the Api variant must not decorate it.
    let error = TransportError::Api("channel_not_found".to_string());
    assert_eq!(format!("{error}"), "channel_not_found");
}

#[test]
fn test_root_cause_walks_wrapped_chain() {
    let error = NotifyError::Remote {
        op: "lookup conversation info",
        source: TransportError::Api("channel_not_found".to_string()),
    };

    assert_eq!(
        format!("{error}"),
        "lookup conversation info: channel_not_found"
    );
    assert_eq!(root_cause_message(&error), "channel_not_found");
}

#[test]
fn test_channel_not_found_maps_to_validation() {
    let error = NotifyError::Remote {
        op: "lookup conversation info",
        source: TransportError::Api("channel_not_found".to_string()),
    };

    match map_channel_error(error) {
        NotifyError::Validation { field, message } => {
            assert_eq!(field, "ChannelID");
            assert_eq!(message, "Invalid Slack channel ID.");
        }
        other => panic!("expected validation error, got: {other:?}"),
    }
}

#[test]
fn test_unknown_errors_pass_through_unchanged() {
    let error = NotifyError::Remote {
        op: "list channels",
        source: TransportError::Http("connection reset".to_string()),
    };

    match map_channel_error(error) {
        NotifyError::Remote { op, .. } => assert_eq!(op, "list channels"),
        other => panic!("expected the original remote error, got: {other:?}"),
    }
}

/// Writer that captures formatted log output for assertions.
#[derive(Clone, Default)]
struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl CaptureWriter {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn test_invalid_auth_maps_to_permission_denied_and_logs_once() {
    let writer = CaptureWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_ansi(false)
        .finish();

    let error = NotifyError::Remote {
        op: "lookup team ID",
        source: TransportError::Api("invalid_auth".to_string()),
    };
    let mapped = tracing::subscriber::with_default(subscriber, || map_channel_error(error));

    match mapped {
        NotifyError::Validation { field, message } => {
            assert_eq!(field, "ChannelID");
            assert_eq!(message, "Permission Denied.");
        }
        other => panic!("expected validation error, got: {other:?}"),
    }

    let output = writer.contents();
    assert!(output.contains("slack auth failure"));
    assert_eq!(
        output.matches("invalid_auth").count(),
        1,
        "auth failures are logged exactly once: {output}"
    );
}

// Verify the From conversions compile; reqwest errors cannot be
// constructed directly.
#[allow(unused)]
fn _check_error_conversions(err: reqwest::Error) -> TransportError {
    TransportError::from(err)
}
