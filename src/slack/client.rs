//! Chat transport boundary and the production Slack Web API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::{SlackApiToken, SlackApiTokenValue};
use tracing::warn;

use super::message::{MessagePayload, MessageTarget};
use crate::core::config::ConfigSource;
use crate::errors::TransportError;

// Build the Slack client connector without panicking. If construction
// fails, store None and surface a TransportError at call sites.
static SLACK_CLIENT: std::sync::LazyLock<Option<SlackHyperClient>> =
    std::sync::LazyLock::new(|| match SlackClientHyperConnector::new() {
        Ok(connector) => Some(SlackHyperClient::new(connector)),
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    });

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Channel metadata as returned by the platform. The name is raw (no `#`
/// prefix); display formatting happens in the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationInfo {
    pub id: String,
    pub name: String,
}

/// One page of the channel listing.
#[derive(Debug, Clone)]
pub struct ListPage {
    pub channels: Vec<ConversationInfo>,
    /// Continuation cursor; `None` or empty means the listing is exhausted.
    pub next_cursor: Option<String>,
}

/// Chat platform boundary consumed by the channel sender.
///
/// The production implementation is [`SlackTransport`]; tests substitute
/// stubs to drive cache, pagination, and dispatch behavior.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Identify the workspace (team) the current token belongs to.
    async fn auth_test(&self) -> Result<String, TransportError>;

    /// Look up a single channel by ID.
    async fn conversation_info(&self, channel_id: &str)
    -> Result<ConversationInfo, TransportError>;

    /// Fetch one page of non-archived public and private channels visible
    /// to the bot, up to 200 per page.
    async fn list_conversations(&self, cursor: Option<&str>) -> Result<ListPage, TransportError>;

    /// Post, thread-reply, or update a message; returns the
    /// platform-assigned message timestamp.
    async fn post_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<String, TransportError>;
}

/// Production transport backed by the Slack Web API.
///
/// The bot token is read from configuration on every call so a rotated
/// token takes effect without rebuilding the transport.
pub struct SlackTransport {
    config: ConfigSource,
}

impl SlackTransport {
    #[must_use]
    pub fn new(config: ConfigSource) -> Self {
        Self { config }
    }

    fn api_token(&self) -> SlackApiToken {
        SlackApiToken::new(SlackApiTokenValue::new(
            self.config.snapshot().slack_bot_token,
        ))
    }

    /// Call a Web API method with a JSON body, surfacing Slack's `error`
    /// code verbatim so it can be matched as a root cause.
    async fn call_web_api(&self, method: &str, payload: &Value) -> Result<Value, TransportError> {
        let token = self.config.snapshot().slack_bot_token;
        let resp = HTTP_CLIENT
            .post(format!("https://slack.com/api/{method}"))
            .bearer_auth(&token)
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError::Http(format!("{method}: {e}")))?;

        if !resp.status().is_success() {
            return Err(TransportError::Http(format!(
                "{method} HTTP {}",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| TransportError::Http(format!("{method} JSON parse error: {e}")))?;

        if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            return Err(TransportError::Api(
                body.get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
            ));
        }

        Ok(body)
    }
}

#[async_trait]
impl ChatTransport for SlackTransport {
    async fn auth_test(&self) -> Result<String, TransportError> {
        let token = self.api_token();
        let session = SLACK_CLIENT
            .as_ref()
            .ok_or_else(|| {
                TransportError::Client("Slack HTTP connector not initialized".to_string())
            })?
            .open_session(&token);

        let resp = session.auth_test().await?;
        Ok(resp.team_id.0)
    }

    async fn conversation_info(
        &self,
        channel_id: &str,
    ) -> Result<ConversationInfo, TransportError> {
        let body = self
            .call_web_api("conversations.info", &json!({ "channel": channel_id }))
            .await?;

        let channel = body.get("channel").ok_or_else(|| {
            TransportError::Client("conversations.info: missing channel".to_string())
        })?;
        let id = channel
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                TransportError::Client("conversations.info: missing channel id".to_string())
            })?
            .to_string();
        let name = channel
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                TransportError::Client("conversations.info: missing channel name".to_string())
            })?
            .to_string();

        Ok(ConversationInfo { id, name })
    }

    async fn list_conversations(&self, cursor: Option<&str>) -> Result<ListPage, TransportError> {
        let mut payload = json!({
            "exclude_archived": true,
            "types": "public_channel,private_channel",
            "limit": 200,
        });
        if let Some(cursor) = cursor {
            payload["cursor"] = Value::String(cursor.to_string());
        }

        let body = self.call_web_api("users.conversations", &payload).await?;

        let channels = body
            .get("channels")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|ch| {
                        let id = ch.get("id").and_then(Value::as_str)?;
                        let name = ch.get("name").and_then(Value::as_str)?;
                        Some(ConversationInfo {
                            id: id.to_string(),
                            name: name.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let next_cursor = body
            .get("response_metadata")
            .and_then(|m| m.get("next_cursor"))
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(ToOwned::to_owned);

        Ok(ListPage {
            channels,
            next_cursor,
        })
    }

    async fn post_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<String, TransportError> {
        let mut body = json!({ "channel": channel_id });

        let method = match &payload.target {
            MessageTarget::New => "chat.postMessage",
            MessageTarget::ThreadReply(ts) => {
                body["thread_ts"] = Value::String(ts.clone());
                "chat.postMessage"
            }
            MessageTarget::Update(ts) => {
                body["ts"] = Value::String(ts.clone());
                "chat.update"
            }
        };

        if let Some(text) = &payload.text {
            body["text"] = Value::String(text.clone());
        }
        if let Some(attachment) = &payload.attachment {
            body["attachments"] = json!([{
                "color": attachment.color,
                "fallback": attachment.fallback,
                "blocks": attachment.blocks,
            }]);
        }

        let resp = self.call_web_api(method, &body).await?;
        resp.get("ts")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| TransportError::Client(format!("{method}: no ts in response")))
    }
}
