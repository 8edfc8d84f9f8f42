//! All Slack-specific functionality

pub mod cache;
pub mod client;
pub mod identity;
pub mod message;
pub mod sender;

// Re-export main types for convenience
pub use cache::TtlCache;
pub use client::{ChatTransport, ConversationInfo, ListPage, SlackTransport};
pub use message::{Attachment, MessagePayload, MessageTarget};
pub use sender::{Channel, ChannelSender};
