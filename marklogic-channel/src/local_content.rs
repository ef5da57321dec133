//! Content service for the CLI: serves exactly one document, read from a file or stdin.

use async_trait::async_trait;
use marklogic_channel_core::content::{BufferContentReader, FileContentReader};
use marklogic_channel_core::contract::{ContentReader, ContentService, DocumentRef};
use marklogic_channel_core::error::ChannelError;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum ContentSource {
    File(PathBuf),
    /// Content already read into memory (e.g. from stdin).
    Buffer(Vec<u8>),
}

pub struct LocalContentService {
    entry: Option<(DocumentRef, ContentSource)>,
    mimetype: Option<String>,
}

impl LocalContentService {
    pub fn new(document: DocumentRef, source: ContentSource, mimetype: Option<String>) -> Self {
        Self {
            entry: Some((document, source)),
            mimetype,
        }
    }

    /// A service with no content at all, for operations that never read any.
    pub fn empty() -> Self {
        Self {
            entry: None,
            mimetype: None,
        }
    }
}

#[async_trait]
impl ContentService for LocalContentService {
    async fn reader(&self, document: &DocumentRef) -> Result<Box<dyn ContentReader>, ChannelError> {
        let source = match &self.entry {
            Some((registered, source)) if registered == document => source,
            _ => {
                debug!(document = %document, "No local content registered for document");
                return Ok(Box::new(BufferContentReader::empty()));
            }
        };
        let reader: Box<dyn ContentReader> = match source {
            ContentSource::File(path) => {
                Box::new(FileContentReader::new(path.clone(), self.mimetype.clone()))
            }
            ContentSource::Buffer(bytes) => {
                Box::new(BufferContentReader::new(bytes.clone(), self.mimetype.clone()))
            }
        };
        Ok(reader)
    }
}
