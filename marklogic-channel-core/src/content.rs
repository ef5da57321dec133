//! Local content readers and the scratch area used to stage payloads.
//!
//! - [`FileContentReader`] exposes a file on disk directly, so publishing can stream it
//!   without a copy.
//! - [`BufferContentReader`] holds content in memory and has no backing file; publishing
//!   stages it through a temp file.
//! - [`TempFileProvider`] owns the scratch directory. Temp files it hands out are removed
//!   when dropped.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::contract::ContentReader;
use crate::error::ChannelError;

/// Content backed by a file in a local content store.
#[derive(Debug, Clone)]
pub struct FileContentReader {
    path: PathBuf,
    mimetype: Option<String>,
}

impl FileContentReader {
    pub fn new(path: impl Into<PathBuf>, mimetype: Option<String>) -> Self {
        Self {
            path: path.into(),
            mimetype,
        }
    }
}

#[async_trait]
impl ContentReader for FileContentReader {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn mimetype(&self) -> Option<String> {
        self.mimetype.clone()
    }

    fn file(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    async fn copy_to(&self, target: &Path) -> Result<(), ChannelError> {
        tokio::fs::copy(&self.path, target).await?;
        Ok(())
    }
}

/// In-memory content with no backing file.
#[derive(Debug, Clone)]
pub struct BufferContentReader {
    bytes: Option<Vec<u8>>,
    mimetype: Option<String>,
}

impl BufferContentReader {
    pub fn new(bytes: Vec<u8>, mimetype: Option<String>) -> Self {
        Self {
            bytes: Some(bytes),
            mimetype,
        }
    }

    /// A reader for a document that has no content.
    pub fn empty() -> Self {
        Self {
            bytes: None,
            mimetype: None,
        }
    }
}

#[async_trait]
impl ContentReader for BufferContentReader {
    fn exists(&self) -> bool {
        self.bytes.is_some()
    }

    fn mimetype(&self) -> Option<String> {
        self.mimetype.clone()
    }

    fn file(&self) -> Option<PathBuf> {
        None
    }

    async fn copy_to(&self, target: &Path) -> Result<(), ChannelError> {
        let bytes = self.bytes.as_deref().ok_or_else(|| {
            ChannelError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no content to copy",
            ))
        })?;
        tokio::fs::write(target, bytes).await?;
        Ok(())
    }
}

/// Hands out temp files inside a dedicated, long-lived scratch directory.
#[derive(Debug, Clone)]
pub struct TempFileProvider {
    root: PathBuf,
}

impl Default for TempFileProvider {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl TempFileProvider {
    /// `root` is the parent directory; scratch areas are created below it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Scratch directory `<root>/<name>`, created if missing.
    pub async fn long_life_temp_dir(&self, name: &str) -> Result<PathBuf, ChannelError> {
        let dir = self.root.join(name);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Create an empty temp file in `dir`. The file is deleted when the returned handle drops.
    pub async fn create_temp_file(
        &self,
        prefix: &str,
        suffix: &str,
        dir: &Path,
    ) -> Result<NamedTempFile, ChannelError> {
        let (prefix, suffix, dir) = (prefix.to_string(), suffix.to_string(), dir.to_path_buf());
        let file = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(&suffix)
                .tempfile_in(&dir)
        })
        .await
        .map_err(|e| ChannelError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;
        debug!(path = %file.path().display(), "Created temp file");
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn buffer_reader_copies_into_target() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("copy.xml");
        let reader = BufferContentReader::new(b"<doc/>".to_vec(), Some("text/xml".into()));

        assert!(reader.exists());
        assert!(reader.file().is_none());
        reader.copy_to(&target).await.expect("copy succeeds");
        assert_eq!(std::fs::read(&target).unwrap(), b"<doc/>");
    }

    #[tokio::test]
    async fn empty_buffer_reader_reports_missing_content() {
        let reader = BufferContentReader::empty();
        assert!(!reader.exists());

        let dir = tempdir().unwrap();
        let err = reader.copy_to(&dir.path().join("x")).await.unwrap_err();
        assert!(matches!(err, ChannelError::Io(_)));
    }

    #[test]
    fn file_reader_exposes_its_backing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.xml");
        let reader = FileContentReader::new(&path, None);
        assert!(!reader.exists());

        std::fs::write(&path, "<doc/>").unwrap();
        assert!(reader.exists());
        assert_eq!(reader.file(), Some(path));
    }

    #[tokio::test]
    async fn temp_files_are_removed_on_drop() {
        let root = tempdir().unwrap();
        let provider = TempFileProvider::new(root.path());
        let scratch = provider.long_life_temp_dir("marklogic").await.unwrap();
        assert!(scratch.is_dir());

        let file = provider
            .create_temp_file("marklogic", "", &scratch)
            .await
            .unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("marklogic")));

        drop(file);
        assert!(!path.exists());
    }
}
