//! # Display Surfaces
//!
//! A surface receives a fully rendered page and replaces whatever it showed
//! before. Surfaces never see records, only markup, so a render is a pure
//! projection of the view.
//!
//! Optional surfaces and pairs of surfaces are surfaces themselves, which is
//! how the server feeds the HTTP viewer and an optional file at once.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

/// Failures while publishing rendered markup.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing the page to disk failed.
    #[error("failed to write rendered page to {path}: {source}")]
    Io {
        /// The file being written.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Something that shows the rendered table.
pub trait DisplaySurface: Send + Sync {
    /// Replaces the surface contents with `markup`.
    fn replace(&self, markup: String) -> impl Future<Output = Result<(), RenderError>> + Send;
}

/// In-memory surface shared with the HTTP viewer. Clones share the same page.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    page: Arc<RwLock<String>>,
    renders: Arc<AtomicU64>,
}

impl MemorySurface {
    /// An empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently rendered page.
    pub async fn current(&self) -> String {
        self.page.read().await.clone()
    }

    /// How many times the page has been replaced.
    pub fn render_count(&self) -> u64 {
        self.renders.load(Ordering::Relaxed)
    }
}

impl DisplaySurface for MemorySurface {
    async fn replace(&self, markup: String) -> Result<(), RenderError> {
        *self.page.write().await = markup;
        self.renders.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Writes each rendered page to a file, for static hosting.
///
/// The page is written next to the target and renamed over it, so readers
/// never observe a half-written file.
#[derive(Debug, Clone)]
pub struct FileSurface {
    path: PathBuf,
}

impl FileSurface {
    /// A surface writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> RenderError {
        RenderError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl DisplaySurface for FileSurface {
    async fn replace(&self, markup: String) -> Result<(), RenderError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        let staging = self.staging_path();
        tokio::fs::write(&staging, markup.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                log::warn!("Could not remove staging file {}: {}", staging.display(), cleanup);
            }
            return Err(self.io_error(e));
        }
        Ok(())
    }
}

impl<S: DisplaySurface> DisplaySurface for Option<S> {
    async fn replace(&self, markup: String) -> Result<(), RenderError> {
        match self {
            Some(surface) => surface.replace(markup).await,
            None => Ok(()),
        }
    }
}

impl<A: DisplaySurface, B: DisplaySurface> DisplaySurface for (A, B) {
    /// Both surfaces are always attempted; the first failure is reported.
    async fn replace(&self, markup: String) -> Result<(), RenderError> {
        let first = self.0.replace(markup.clone()).await;
        let second = self.1.replace(markup).await;
        first.and(second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn memory_surface_replaces_and_counts() {
        let surface = MemorySurface::new();
        let shared = surface.clone();

        surface.replace("one".to_string()).await.unwrap();
        surface.replace("two".to_string()).await.unwrap();

        assert_eq!(shared.current().await, "two");
        assert_eq!(shared.render_count(), 2);
    }

    #[tokio::test]
    async fn file_surface_writes_and_overwrites() {
        let dir = tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("pages").join("feed.html");
        let surface = FileSurface::new(&path);

        surface.replace("<p>first</p>".to_string()).await.unwrap();
        surface.replace("<p>second</p>".to_string()).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>second</p>");
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(leftovers.len(), 1, "staging file was not renamed away");
    }

    #[tokio::test]
    async fn file_surface_reports_io_failures() {
        let dir = tempdir().expect("Failed to create temporary directory");
        // A directory where the file should go makes the rename fail.
        let path = dir.path().join("occupied");
        std::fs::create_dir_all(path.join("child")).unwrap();

        let err = FileSurface::new(&path)
            .replace("x".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
        assert!(!dir.path().join("occupied.tmp").exists(), "staging file left behind");
    }

    #[tokio::test]
    async fn pair_and_option_surfaces_fan_out() {
        let a = MemorySurface::new();
        let b = MemorySurface::new();
        let pair = (a.clone(), Some(b.clone()));
        pair.replace("page".to_string()).await.unwrap();
        assert_eq!(a.current().await, "page");
        assert_eq!(b.current().await, "page");

        let only: (MemorySurface, Option<FileSurface>) = (a.clone(), None);
        only.replace("again".to_string()).await.unwrap();
        assert_eq!(a.current().await, "again");
        assert_eq!(b.current().await, "page");
    }
}
