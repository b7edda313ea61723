//! # Ingestion Loop
//!
//! One consumer, one message at a time, in delivery order. The loop has a
//! single suspension point, a `select!` over:
//!
//! 1. the cancellation token,
//! 2. the next feed message (decode, normalize, append, render),
//! 3. the render tick (render only: no decode, no append, no I/O on the feed).
//!
//! The view is owned by the loop, so the message arm and the tick arm never
//! run concurrently and no lock is needed. A message that has been pulled is
//! fully applied before cancellation is observed again.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::connections::{Feed, RawMessage, SubscriptionError};
use crate::core::{decode, normalize, BoundedView};
use crate::render::{DisplaySurface, PageRenderer};

/// Render tick period used when none is configured.
pub const DEFAULT_RENDER_INTERVAL: Duration = Duration::from_secs(5);

/// Counters for one ingestion session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Messages pulled from the feed.
    pub messages: u64,
    /// Messages that were not valid JSON.
    pub degraded: u64,
    /// Records evicted from the head of the view.
    pub evicted: u64,
    /// Renders the surface rejected.
    pub render_failures: u64,
}

/// Drives a feed into a [`BoundedView`] and keeps a surface rendered.
pub struct IngestionLoop<S> {
    view: BoundedView,
    renderer: PageRenderer,
    surface: S,
    render_interval: Duration,
    summary: SessionSummary,
}

impl<S: DisplaySurface> IngestionLoop<S> {
    /// A loop rendering `view` onto `surface` every [`DEFAULT_RENDER_INTERVAL`].
    pub fn new(view: BoundedView, renderer: PageRenderer, surface: S) -> Self {
        Self {
            view,
            renderer,
            surface,
            render_interval: DEFAULT_RENDER_INTERVAL,
            summary: SessionSummary::default(),
        }
    }

    /// Overrides the render tick period. A zero period keeps the current one.
    pub fn with_render_interval(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            log::warn!(
                "Render interval of zero ignored, keeping {}ms",
                self.render_interval.as_millis()
            );
        } else {
            self.render_interval = interval;
        }
        self
    }

    /// The records currently held.
    pub fn view(&self) -> &BoundedView {
        &self.view
    }

    /// The surface being rendered to.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Counters so far.
    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Runs one session: open the feed, then consume until cancelled or the feed ends.
    ///
    /// Returns the session counters when `cancel` fires. A failure to
    /// connect or subscribe, or the feed closing underneath the session, is
    /// returned as a [`SubscriptionError`]; nothing is retried here.
    pub async fn run<F: Feed>(
        &mut self,
        feed: &F,
        cancel: CancellationToken,
    ) -> Result<SessionSummary, SubscriptionError> {
        let topic = feed.topic().to_string();
        log::info!(
            "Starting ingestion for '{}' (max_rows={}, render every {}ms)",
            topic,
            self.view.max_rows(),
            self.render_interval.as_millis()
        );

        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::info!("Ingestion for '{}' cancelled before subscribing", topic);
                return Ok(self.summary);
            }
            opened = feed.open() => match opened {
                Ok(stream) => stream,
                Err(e) => {
                    log::error!("Could not open feed '{}': {}", topic, e);
                    return Err(e);
                }
            },
        };

        // Show the empty table as soon as the subscription is live.
        self.render().await;

        let mut ticker = interval_at(Instant::now() + self.render_interval, self.render_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::info!("Ingestion for '{}' cancelled", topic);
                    break;
                }
                next = stream.next() => match next {
                    Some(raw) => self.ingest(raw).await,
                    None => {
                        log::warn!(
                            "Feed '{}' closed after {} messages",
                            topic,
                            self.summary.messages
                        );
                        return Err(SubscriptionError::FeedClosed { topic });
                    }
                },
                _ = ticker.tick() => self.render().await,
            }
        }

        log::info!(
            "Ingestion for '{}' stopped: {} messages, {} degraded, {} evicted",
            topic,
            self.summary.messages,
            self.summary.degraded,
            self.summary.evicted
        );
        log::debug!("Final table:\n{}", self.renderer.render_text(self.view.iter()));
        Ok(self.summary)
    }

    /// Applies one message: decode, normalize, append, render.
    ///
    /// Malformed payloads still add a (blank) row.
    pub async fn ingest(&mut self, raw: RawMessage) {
        self.summary.messages += 1;

        let payload = decode(&raw);
        if payload.is_degraded() {
            self.summary.degraded += 1;
            log::debug!(
                "Message #{} on '{}' is not JSON, adding an empty row",
                self.summary.messages,
                raw.channel()
            );
        }

        let record = normalize(&payload);
        if self.view.append(record).is_some() {
            self.summary.evicted += 1;
        }
        log::trace!(
            "Message #{} applied, view holds {}/{} rows",
            self.summary.messages,
            self.view.len(),
            self.view.max_rows()
        );

        self.render().await;
    }

    async fn render(&mut self) {
        if let Err(e) = self.view.render(&self.renderer, &self.surface).await {
            self.summary.render_failures += 1;
            log::error!("Render failed, display keeps its previous contents: {}", e);
        }
    }
}
