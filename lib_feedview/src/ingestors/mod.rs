//! # Ingestors Module
//!
//! The "front door" of the pipeline. An ingestor owns the subscription,
//! drives each message through decode and normalize into the view, and keeps
//! the display surface current.
//!
//! - **`ingestion_loop`**: the single-consumer loop with its render timer.

/// The single-consumer ingestion loop.
pub mod ingestion_loop;

// --- Public API Re-exports ---
pub use ingestion_loop::{IngestionLoop, SessionSummary, DEFAULT_RENDER_INTERVAL};
