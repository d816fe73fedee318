//! Downloadable result of a successful session

use crate::config::{ArtifactConfig, SPREADSHEET_MEDIA_TYPE};

/// Spreadsheet bytes paired with a file name and media type
///
/// Only the finalize stage creates these. Saving the bytes is up to the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct ArtifactHandoff {
    file_name: String,
    media_type: &'static str,
    bytes: Vec<u8>,
}

impl ArtifactHandoff {
    pub(crate) fn new(bytes: Vec<u8>, config: &ArtifactConfig) -> Self {
        Self {
            file_name: config.file_name.clone(),
            media_type: SPREADSHEET_MEDIA_TYPE,
            bytes,
        }
    }

    /// Name the file should be saved under
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Media type of the content
    pub fn media_type(&self) -> &str {
        self.media_type
    }

    /// Artifact content
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the artifact holds no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Take ownership of the content
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl std::fmt::Debug for ArtifactHandoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactHandoff")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
