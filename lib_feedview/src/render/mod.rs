//! # Rendering Module
//!
//! Turns an ordered set of records into markup and hands it to whatever is
//! showing it.
//!
//! - **`table`**: the fixed six-column layout, as an HTML page or plain text.
//! - **`surface`**: the [`DisplaySurface`] seam plus the in-memory surface
//!   read by the HTTP viewer and the file surface used for static hosting.

/// Table layout and cell formatting.
pub mod table;
/// Display surfaces that receive rendered markup.
pub mod surface;

// --- Public API Re-exports ---
pub use surface::{DisplaySurface, FileSurface, MemorySurface, RenderError};
pub use table::{cell_text, PageRenderer};
