//! # Core Pipeline Module
//!
//! Everything between a raw feed payload and the ordered set of rows that
//! gets displayed. None of the components here perform I/O except
//! [`BoundedView::render`], which hands finished markup to a surface.
//!
//! - **`record`**: the six canonical display fields and the record type.
//! - **`decoder`**: tolerant UTF-8/JSON decoding with a raw-text fallback.
//! - **`normalizer`**: the key-spelling precedence table and its resolution.
//! - **`view`**: the fixed-capacity FIFO buffer of records.

/// Canonical fields and records.
pub mod record;
/// Tolerant payload decoding.
pub mod decoder;
/// Key-spelling precedence and record normalization.
pub mod normalizer;
/// Fixed-capacity ordered record buffer.
pub mod view;

// --- Public API Re-exports ---
pub use decoder::{decode, DecodedPayload};
pub use normalizer::{normalize, FieldRule, PRECEDENCE};
pub use record::{CanonicalField, CanonicalRecord};
pub use view::{BoundedView, ViewError, DEFAULT_MAX_ROWS};
