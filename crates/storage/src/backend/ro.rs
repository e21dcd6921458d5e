//! Readonly link backend.
//!
//! This module provides a link backend implementation that wraps other
//! implementations and prevents mutating operations from executing, but
//! indicating success on return. It is how dry runs are implemented.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::{BackendHandle, LinkBackend, error::Result, models::LinkEntry};

/// Read-only link backend.
///
/// Wraps another backend and silently drops all mutating operations, logging
/// an [`info event`](tracing::Event).
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LinkBackend for ReadOnlyBackend {
    fn root(&self) -> &Path {
        self.inner.root()
    }

    async fn prepare(&self) -> Result<()> {
        tracing::info!(root = %self.root().display(), "Skipping directory creation during dry-run");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<LinkEntry>> {
        self.inner.list().await
    }

    async fn resolve(&self, content: &Path) -> Result<Option<PathBuf>> {
        self.inner.resolve(content).await
    }

    async fn link(&self, name: &str, target: &Path) -> Result<()> {
        crate::validate_name(name)?;
        tracing::info!(root = %self.root().display(), name, target = %target.display(), "Skipping link during dry-run");
        Ok(())
    }

    async fn unlink(&self, name: &str) -> Result<()> {
        crate::validate_name(name)?;
        tracing::info!(root = %self.root().display(), name, "Skipping unlink during dry-run");
        Ok(())
    }
}
