//! File handles and their lazy content accessors

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lazily reads the text of an uploaded file
///
/// Reads may suspend and may fail. Implementations must be cheap to call more
/// than once; the content pass and the ingest stage both read.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Read the full text
    async fn read_text(&self) -> Result<String>;
}

/// Text already held in memory
pub struct MemorySource {
    text: String,
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn read_text(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Text read from disk on demand
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
/// failing the read.
pub struct PathSource {
    path: PathBuf,
}

#[async_trait]
impl ContentSource for PathSource {
    async fn read_text(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// An uploaded file: name, declared size and a content accessor
///
/// Handles are immutable. Replacing a file means assigning a new handle.
#[derive(Clone)]
pub struct FileHandle {
    name: String,
    size_bytes: u64,
    source: Arc<dyn ContentSource>,
}

impl FileHandle {
    /// Create a handle over an arbitrary content source
    pub fn new(name: impl Into<String>, size_bytes: u64, source: Arc<dyn ContentSource>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            source,
        }
    }

    /// Create a handle over in-memory text; the size is the text's byte length
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let size_bytes = text.len() as u64;
        Self::new(name, size_bytes, Arc::new(MemorySource { text }))
    }

    /// Create a handle over a file on disk
    ///
    /// Only metadata is read here; the content is read when requested.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, metadata.len(), Arc::new(PathSource { path })))
    }

    /// File name as uploaded
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared size in bytes
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Read the full text
    pub async fn read_text(&self) -> Result<String> {
        self.source.read_text().await
    }
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}
