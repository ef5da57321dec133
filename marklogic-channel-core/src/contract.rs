//! # contract: collaborator interfaces consumed by the channel
//!
//! The repository's content storage, the credential encryption service and the channel
//! framework itself are external to this crate. This module pins them down as traits so
//! the connector can be driven by real implementations, local ones (see [`crate::content`])
//! or `mockall` mocks in tests.
//!
//! ## Mocking & Testing
//! - Every collaborator trait is annotated for `mockall`; the generated `Mock*` types are
//!   exported under the `test-export-mocks` feature so integration tests can use them.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::{ChannelError, DecryptError};
use crate::properties::ChannelProperties;

/// Opaque identifier of a content item in the repository (e.g. `workspace://SpacesStore/abc-123`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef(String);

impl DocumentRef {
    pub fn new(id: impl Into<String>) -> Self {
        DocumentRef(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentRef {
    fn from(s: &str) -> Self {
        DocumentRef::new(s)
    }
}

/// What a publish call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The document was stored (HTTP 204).
    Published,
    /// The repository holds no content for the document; nothing was sent.
    NoContent,
}

/// Read access to one document's content.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentReader: Send + Sync {
    /// Whether the repository holds content for the document.
    fn exists(&self) -> bool;

    /// Media type recorded for the content, if known.
    fn mimetype(&self) -> Option<String>;

    /// Backing file in the content store, when the reader is file based.
    /// Readers returning `None` get their content copied to a temp file before upload.
    fn file(&self) -> Option<PathBuf>;

    /// Write the full content to `target`, replacing whatever is there.
    async fn copy_to(&self, target: &Path) -> Result<(), ChannelError>;
}

/// Hands out content readers for documents.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentService: Send + Sync {
    async fn reader(&self, document: &DocumentRef) -> Result<Box<dyn ContentReader>, ChannelError>;
}

/// Decrypts channel properties stored encrypted at rest.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Decryptor: Send + Sync {
    /// `key` is the property key the ciphertext was stored under.
    fn decrypt(&self, key: &str, ciphertext: &str) -> Result<String, DecryptError>;
}

/// Capability interface of a publishing channel, as registered with the host's channel registry.
#[async_trait]
pub trait ChannelType: Send + Sync {
    /// Registry identifier of the channel kind.
    fn channel_kind(&self) -> &'static str;

    /// Repository node type under which channels of this kind are stored.
    fn channel_node_type(&self) -> &'static str;

    fn supported_media_types(&self) -> &BTreeSet<String>;

    fn can_publish(&self) -> bool;

    fn can_unpublish(&self) -> bool;

    fn can_publish_status_updates(&self) -> bool;

    async fn publish(
        &self,
        document: &DocumentRef,
        properties: &ChannelProperties,
    ) -> Result<PublishOutcome, ChannelError>;

    async fn unpublish(
        &self,
        document: &DocumentRef,
        properties: &ChannelProperties,
    ) -> Result<(), ChannelError>;
}
