//! Channel/team resolution and outbound notification dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::error;

use super::cache::TtlCache;
use super::client::ChatTransport;
use super::identity::link_users;
use super::message::{self, MessagePayload, MessageTarget};
use crate::core::config::ConfigSource;
use crate::core::models::{AlertState, AlertUser, MessageState, Notification, SentMessage};
use crate::core::permission::{PermissionChecker, Role};
use crate::core::subjects::SubjectStore;
use crate::errors::{NotifyError, map_channel_error};

const CHANNEL_CACHE_SIZE: usize = 1000;
const CHANNEL_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const LIST_CACHE_SIZE: usize = 250;
const LIST_CACHE_TTL: Duration = Duration::from_secs(60);

/// Ceiling on channel-listing pages fetched in one resolution; a listing
/// that keeps returning cursors past this is aborted.
const MAX_LIST_PAGES: usize = 10;

/// Information about a Slack channel. Immutable once constructed; values
/// handed to callers are independent of cached storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    /// Display name, `#`-prefixed.
    pub name: String,
    pub team_id: String,
}

/// Workspace ID paired with the token it was resolved with. Stale the
/// moment the configured token differs from `token`.
#[derive(Debug, Clone)]
struct TeamBinding {
    team_id: String,
    token: String,
}

/// Façade coordinating channel resolution, identity linking, message
/// rendering, and delivery through the chat transport.
///
/// Three independent locks serialize the mutable state: the team binding,
/// the per-channel cache, and the channel-list cache. Each lock is held
/// for the entire check-then-populate sequence, so at most one remote
/// resolution runs per cache at a time and channel lookups never block
/// list fetches.
pub struct ChannelSender {
    config: ConfigSource,
    transport: Arc<dyn ChatTransport>,
    permissions: Arc<dyn PermissionChecker>,
    subjects: Arc<dyn SubjectStore>,

    team: Mutex<Option<TeamBinding>>,
    chan_cache: Mutex<TtlCache<String, Channel>>,
    list_cache: Mutex<TtlCache<String, Vec<Channel>>>,
}

impl ChannelSender {
    #[must_use]
    pub fn new(
        config: ConfigSource,
        transport: Arc<dyn ChatTransport>,
        permissions: Arc<dyn PermissionChecker>,
        subjects: Arc<dyn SubjectStore>,
    ) -> Self {
        Self {
            config,
            transport,
            permissions,
            subjects,
            team: Mutex::new(None),
            chan_cache: Mutex::new(TtlCache::new(CHANNEL_CACHE_SIZE, CHANNEL_CACHE_TTL)),
            list_cache: Mutex::new(TtlCache::new(LIST_CACHE_SIZE, LIST_CACHE_TTL)),
        }
    }

    /// Workspace ID for the currently configured bot token.
    ///
    /// Memoized per token: the remote identity check runs only when no
    /// binding exists or the token changed. On failure the previous
    /// binding is left untouched.
    pub async fn team_id(&self) -> Result<String, NotifyError> {
        let token = self.config.snapshot().slack_bot_token;

        let mut binding = self.team.lock().await;
        if let Some(bound) = binding.as_ref()
            && bound.token == token
        {
            return Ok(bound.team_id.clone());
        }

        let team_id = self
            .transport
            .auth_test()
            .await
            .map_err(|e| NotifyError::remote("lookup team ID", e))?;

        *binding = Some(TeamBinding {
            team_id: team_id.clone(),
            token,
        });
        Ok(team_id)
    }

    /// Look up a single channel visible to the bot, caching the result.
    pub async fn channel(&self, channel_id: &str) -> Result<Channel, NotifyError> {
        self.permissions
            .limit_check_any(&[Role::User, Role::System])?;

        let mut cache = self.chan_cache.lock().await;
        if let Some(channel) = cache.get(&channel_id.to_string()) {
            return Ok(channel.clone());
        }

        let channel = self.load_channel(channel_id).await.map_err(map_channel_error)?;
        cache.add(channel_id.to_string(), channel.clone());
        Ok(channel)
    }

    async fn load_channel(&self, channel_id: &str) -> Result<Channel, NotifyError> {
        let team_id = self.team_id().await?;

        let info = self
            .transport
            .conversation_info(channel_id)
            .await
            .map_err(|e| NotifyError::remote("lookup conversation info", e))?;

        Ok(Channel {
            id: info.id,
            name: format!("#{}", info.name),
            team_id,
        })
    }

    /// List all channels visible to the bot, cached per access token.
    pub async fn list_channels(&self) -> Result<Vec<Channel>, NotifyError> {
        self.permissions
            .limit_check_any(&[Role::User, Role::System])?;

        let token = self.config.snapshot().slack_bot_token;

        let mut cache = self.list_cache.lock().await;
        if let Some(channels) = cache.get(&token) {
            return Ok(channels.clone());
        }

        let channels = self.load_channels().await.map_err(map_channel_error)?;
        cache.add(token, channels.clone());
        Ok(channels)
    }

    async fn load_channels(&self) -> Result<Vec<Channel>, NotifyError> {
        let team_id = self.team_id().await?;

        let mut channels = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;
        loop {
            pages += 1;
            let page = self
                .transport
                .list_conversations(cursor.as_deref())
                .await
                .map_err(|e| NotifyError::remote("list channels", e))?;

            channels.extend(page.channels.into_iter().map(|ch| Channel {
                id: ch.id,
                name: format!("#{}", ch.name),
                team_id: team_id.clone(),
            }));

            match page.next_cursor {
                Some(next) if !next.is_empty() => {
                    if pages > MAX_LIST_PAGES {
                        return Err(NotifyError::PageLimitExceeded(MAX_LIST_PAGES));
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(channels)
    }

    /// Deliver a notification, returning the provider receipt.
    ///
    /// Update operations clear the receipt's `external_id`: replacing a
    /// message yields no new timestamp to thread future replies from.
    pub async fn send(&self, notification: &Notification) -> Result<SentMessage, NotifyError> {
        let cfg = self.config.snapshot();

        let mut is_update = false;
        let payload = match notification {
            Notification::Alert(alert) => match &alert.original {
                // A message for this alert already exists; reply in its
                // thread with the alert header text.
                Some(original) => MessagePayload {
                    target: MessageTarget::ThreadReply(original.external_id.clone()),
                    text: Some(
                        self.alert_link(alert.alert_id, &alert.summary, &alert.users)
                            .await,
                    ),
                    attachment: None,
                },
                None => {
                    let link = self
                        .alert_link(alert.alert_id, &alert.summary, &alert.users)
                        .await;
                    message::alert_message(
                        MessageTarget::New,
                        &link,
                        alert.alert_id,
                        &alert.summary,
                        &alert.details,
                        "Unacknowledged",
                        AlertState::Unacknowledged,
                        cfg.interactive_messages,
                    )
                }
            },
            Notification::AlertStatus(status) => {
                is_update = true;
                let link = self
                    .alert_link(status.alert_id, &status.summary, &status.users)
                    .await;
                message::alert_message(
                    MessageTarget::Update(status.original.external_id.clone()),
                    &link,
                    status.alert_id,
                    &status.summary,
                    &status.details,
                    &status.log_entry,
                    status.new_state,
                    cfg.interactive_messages,
                )
            }
            Notification::AlertBundle(bundle) => {
                let url = cfg.callback_url(&format!("/services/{}/alerts", bundle.service_id));
                MessagePayload::text(message::bundle_text(
                    &bundle.service_name,
                    bundle.count,
                    &url,
                ))
            }
            Notification::ScheduleOnCallUsers(on_call) => {
                let subject_ids = self.subjects_for(&on_call.users).await;
                MessagePayload::text(message::on_call_text(on_call, &subject_ids))
            }
        };

        let ts = self
            .transport
            .post_message(notification.channel_id(), &payload)
            .await
            .map_err(|e| NotifyError::remote("post message", e))?;

        let external_id = if is_update { String::new() } else { ts };
        Ok(SentMessage {
            external_id,
            state: MessageState::Delivered,
        })
    }

    /// Alert header text with identity-linked personnel.
    async fn alert_link(&self, alert_id: i64, summary: &str, users: &[AlertUser]) -> String {
        let subject_ids = self.subjects_for(users).await;
        let links = message::user_links(users, &subject_ids);
        let url = self
            .config
            .snapshot()
            .callback_url(&format!("/alerts/{alert_id}"));
        message::alert_link_text(&url, alert_id, summary, &links)
    }

    /// Best-effort identity resolution. Team or subject lookup failures
    /// are logged and leave every user on a fallback link; they never
    /// block delivery.
    async fn subjects_for(&self, users: &[AlertUser]) -> HashMap<String, String> {
        if users.is_empty() {
            return HashMap::new();
        }

        match self.team_id().await {
            Ok(team_id) => link_users(self.subjects.as_ref(), &team_id, users).await,
            Err(err) => {
                error!(error = %err, "lookup team ID");
                HashMap::new()
            }
        }
    }
}
