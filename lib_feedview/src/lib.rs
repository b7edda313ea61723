//! # lib_feedview
//!
//! Building blocks for the `server_feedview` binary: a publish/subscribe feed
//! is consumed one message at a time, each payload is decoded and normalized
//! into a [`CanonicalRecord`], the record is appended to a fixed-capacity
//! [`BoundedView`], and the view is projected onto a display surface as an
//! HTML table.
//!
//! ```text
//! Feed ──► IngestionLoop ──► decode ──► normalize ──► BoundedView ──► DisplaySurface
//!                 ▲                                                     ▲
//!                 └──────────── render tick (render-only) ──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Records, decoding, normalization and the bounded view.
pub mod core;
/// Feed abstractions and their implementations.
pub mod connections;
/// The ingestion loop that ties a feed to a view.
pub mod ingestors;
/// Table rendering and display surfaces.
pub mod render;

// --- Public API Re-exports ---
pub use crate::core::{
    decode, normalize, BoundedView, CanonicalField, CanonicalRecord, DecodedPayload, ViewError,
    DEFAULT_MAX_ROWS,
};
pub use connections::{ChannelFeed, Feed, FeedStream, RawMessage, SubscriptionError};
#[cfg(feature = "connections")]
pub use connections::RedisFeed;
pub use ingestors::{IngestionLoop, SessionSummary, DEFAULT_RENDER_INTERVAL};
pub use render::{DisplaySurface, FileSurface, MemorySurface, PageRenderer, RenderError};
