//! # Connections Module
//!
//! Sources of feed messages. The ingestion loop only sees the [`Feed`] trait;
//! broker mechanics (connecting, subscribing, reconnect policy) stay inside
//! each implementation.

/// The feed abstraction and the in-process channel feed.
pub mod feed;

/// Redis Pub/Sub feed.
#[cfg(feature = "connections")]
pub mod feed_redis;

// --- Public API Re-exports ---
pub use feed::{ChannelFeed, Feed, FeedStream, RawMessage, SubscriptionError};
#[cfg(feature = "connections")]
pub use feed_redis::{mask_broker_url, RedisFeed};
