//! # Bounded Ordered View
//!
//! A FIFO buffer of the most recent [`CanonicalRecord`]s. Records enter at
//! the tail; once the buffer holds more than `max_rows`, exactly one record
//! leaves from the head. Survivors keep their arrival order.
//!
//! The view only lives for one session and is never persisted.

use std::collections::VecDeque;

use thiserror::Error;

use crate::core::record::CanonicalRecord;
use crate::render::{DisplaySurface, PageRenderer, RenderError};

/// Row cap used when the configuration does not supply one.
pub const DEFAULT_MAX_ROWS: usize = 1000;

/// Errors raised while constructing a view.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    /// A view must be able to hold at least one record.
    #[error("view capacity must be at least 1, got {0}")]
    ZeroCapacity(usize),
}

/// Fixed-capacity, insertion-ordered record buffer.
#[derive(Debug, Clone)]
pub struct BoundedView {
    rows: VecDeque<CanonicalRecord>,
    max_rows: usize,
}

impl BoundedView {
    /// Creates an empty view holding at most `max_rows` records.
    pub fn new(max_rows: usize) -> Result<Self, ViewError> {
        if max_rows == 0 {
            return Err(ViewError::ZeroCapacity(max_rows));
        }
        log::info!("BoundedView initialized with max_rows={}", max_rows);
        Ok(Self {
            // Large caps fill in gradually; don't reserve them up front.
            rows: VecDeque::with_capacity(max_rows.min(DEFAULT_MAX_ROWS) + 1),
            max_rows,
        })
    }

    /// Appends `record` at the tail and evicts the oldest record if the cap is exceeded.
    ///
    /// Returns the evicted record, if one was removed.
    pub fn append(&mut self, record: CanonicalRecord) -> Option<CanonicalRecord> {
        self.rows.push_back(record);
        if self.rows.len() > self.max_rows {
            self.rows.pop_front()
        } else {
            None
        }
    }

    /// An owned copy of the current rows, oldest first.
    pub fn snapshot(&self) -> Vec<CanonicalRecord> {
        self.rows.iter().cloned().collect()
    }

    /// Iterates the current rows, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalRecord> + '_ {
        self.rows.iter()
    }

    /// Number of rows currently held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows are held.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The configured row cap.
    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Re-projects the current rows onto `surface`, replacing its previous contents.
    ///
    /// Reads the view only. Calling it again without an intervening
    /// [`append`](Self::append) hands the surface identical markup.
    pub async fn render<S: DisplaySurface>(
        &self,
        renderer: &PageRenderer,
        surface: &S,
    ) -> Result<(), RenderError> {
        let markup = renderer.render_html(self.iter());
        surface.replace(markup).await
    }
}

impl Default for BoundedView {
    fn default() -> Self {
        Self {
            rows: VecDeque::with_capacity(DEFAULT_MAX_ROWS + 1),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}
