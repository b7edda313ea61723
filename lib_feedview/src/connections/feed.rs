//! # Feed Abstraction
//!
//! A feed is opened once per session and yields messages one at a time in
//! delivery order. Opening covers both connecting and subscribing; either
//! failing is a [`SubscriptionError`] for the caller to report. The stream
//! ending means the connection is gone.

use std::future::Future;
use std::sync::Mutex;

use futures_util::stream::{BoxStream, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;

/// Session-level feed failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The broker could not be reached.
    #[error("failed to connect to {broker}: {reason}")]
    Connect {
        /// Broker address, with credentials masked.
        broker: String,
        /// Driver-provided reason.
        reason: String,
    },
    /// The broker refused or failed the subscription.
    #[error("failed to subscribe to {topic}: {reason}")]
    Subscribe {
        /// Topic or channel name.
        topic: String,
        /// Driver-provided reason.
        reason: String,
    },
    /// The message stream ended while the session was still running.
    #[error("feed for {topic} closed by the remote side")]
    FeedClosed {
        /// Topic or channel name.
        topic: String,
    },
}

/// One message exactly as the feed delivered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    channel: String,
    payload: Vec<u8>,
}

impl RawMessage {
    /// Wraps a payload received on `channel`.
    pub fn new(channel: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }

    /// The channel (topic) the message arrived on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Messages in delivery order.
pub type FeedStream = BoxStream<'static, RawMessage>;

/// A push-based message source.
pub trait Feed: Send + Sync {
    /// Topic or channel this feed is subscribed to.
    fn topic(&self) -> &str;

    /// Connects, subscribes and returns the message stream.
    fn open(&self) -> impl Future<Output = Result<FeedStream, SubscriptionError>> + Send;
}

fn receiver_stream(rx: mpsc::UnboundedReceiver<RawMessage>) -> FeedStream {
    futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|message| (message, rx))
    })
    .boxed()
}

/// In-process feed backed by an unbounded channel.
///
/// Used by tests and for local runs without a broker. Can be opened once;
/// dropping every [`mpsc::UnboundedSender`] ends the stream.
pub struct ChannelFeed {
    topic: String,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<RawMessage>>>,
}

impl ChannelFeed {
    /// Creates the feed and the sender that publishes into it.
    pub fn new(topic: impl Into<String>) -> (mpsc::UnboundedSender<RawMessage>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let feed = Self {
            topic: topic.into(),
            receiver: Mutex::new(Some(rx)),
        };
        (tx, feed)
    }
}

impl Feed for ChannelFeed {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn open(&self) -> Result<FeedStream, SubscriptionError> {
        let receiver = self
            .receiver
            .lock()
            .map_err(|_| SubscriptionError::Subscribe {
                topic: self.topic.clone(),
                reason: "channel feed lock poisoned".to_string(),
            })?
            .take();

        match receiver {
            Some(rx) => {
                log::info!("Channel feed '{}' opened", self.topic);
                Ok(receiver_stream(rx))
            }
            None => Err(SubscriptionError::Subscribe {
                topic: self.topic.clone(),
                reason: "channel feed was already opened".to_string(),
            }),
        }
    }
}
