//! MarkLogic channel: publishes documents to, and removes them from, a MarkLogic Server
//! REST store.
//!
//! Each call is self-contained:
//!   - publish stages the payload (backing file or a temp copy), PUTs it as XML and
//!     expects `204 No Content`;
//!   - unpublish DELETEs the document and expects `200 OK`.
//!
//! A fresh HTTP client is built per call and dropped with it, so no connection outlives
//! the request. Temp copies are RAII guards and disappear on every exit path.

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, Method, Response, StatusCode};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::config::{default_supported_media_types, HttpSettings, MIMETYPE_XML};
use crate::content::TempFileProvider;
use crate::contract::{ChannelType, ContentReader, ContentService, DocumentRef, PublishOutcome};
use crate::error::ChannelError;
use crate::helper::{AuthContext, PublishingHelper, TargetUri};
use crate::properties::ChannelProperties;

pub const CHANNEL_ID: &str = "marklogic";
pub const CHANNEL_NODE_TYPE: &str = "marklogic:DeliveryChannel";

const STATUS_DOCUMENT_INSERTED: StatusCode = StatusCode::NO_CONTENT;
const STATUS_DOCUMENT_DELETED: StatusCode = StatusCode::OK;

/// Scratch directory name and temp file prefix.
const SCRATCH_NAME: &str = "marklogic";

/// Where the bytes for a publish come from.
enum Payload {
    /// The content store's own file; left untouched.
    Store(std::path::PathBuf),
    /// Temp copy, deleted when dropped.
    Scratch(NamedTempFile),
}

impl Payload {
    fn path(&self) -> &Path {
        match self {
            Payload::Store(path) => path,
            Payload::Scratch(file) => file.path(),
        }
    }
}

/// Reason phrase from the status line as the server sent it, or the canonical one when the
/// server used the standard phrase (hyper only records non-canonical phrases).
fn reason_phrase(response: &Response) -> String {
    if let Some(phrase) = response.extensions().get::<hyper::ext::ReasonPhrase>() {
        return String::from_utf8_lossy(phrase.as_bytes()).into_owned();
    }
    response
        .status()
        .canonical_reason()
        .unwrap_or("Unknown Status")
        .to_string()
}

pub struct MarkLogicChannel {
    helper: PublishingHelper,
    content: Arc<dyn ContentService>,
    temp_files: TempFileProvider,
    http: HttpSettings,
    supported_media_types: BTreeSet<String>,
}

impl MarkLogicChannel {
    pub fn new(helper: PublishingHelper, content: Arc<dyn ContentService>) -> Self {
        Self {
            helper,
            content,
            temp_files: TempFileProvider::default(),
            http: HttpSettings::default(),
            supported_media_types: default_supported_media_types(),
        }
    }

    pub fn with_temp_files(mut self, temp_files: TempFileProvider) -> Self {
        self.temp_files = temp_files;
        self
    }

    pub fn with_http_settings(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }

    pub fn with_supported_media_types<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_media_types = media_types.into_iter().map(Into::into).collect();
        self
    }

    fn check_media_type(&self, reader: &dyn ContentReader) -> Result<(), ChannelError> {
        match reader.mimetype() {
            Some(mimetype) if !self.supported_media_types.contains(&mimetype) => {
                warn!(mimetype = %mimetype, "Refusing to publish unsupported media type");
                Err(ChannelError::UnsupportedMediaType(mimetype))
            }
            _ => Ok(()),
        }
    }

    /// Use the reader's backing file when it has one, otherwise copy into the scratch area.
    async fn stage_payload(&self, reader: &dyn ContentReader) -> Result<Payload, ChannelError> {
        if let Some(path) = reader.file() {
            debug!(path = %path.display(), "Publishing straight from content store file");
            return Ok(Payload::Store(path));
        }

        let dir = self.temp_files.long_life_temp_dir(SCRATCH_NAME).await?;
        let file = self.temp_files.create_temp_file(SCRATCH_NAME, "", &dir).await?;
        let payload = Payload::Scratch(file);
        reader.copy_to(payload.path()).await?;
        debug!(path = %payload.path().display(), "Staged content into temp file");
        Ok(payload)
    }

    fn client(&self) -> Result<Client, ChannelError> {
        Client::builder()
            .timeout(self.http.timeout())
            .connect_timeout(self.http.connect_timeout())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build HTTP client");
                ChannelError::from(e)
            })
    }

    /// Send one request and require `expected` back. The client, and with it every
    /// connection it opened, is dropped before this returns.
    async fn send(
        &self,
        method: Method,
        uri: &TargetUri,
        auth: &AuthContext,
        body: Option<(Body, u64)>,
        expected: StatusCode,
        document: &DocumentRef,
    ) -> Result<(), ChannelError> {
        let client = self.client()?;
        let mut request = auth.apply(client.request(method.clone(), uri.url().clone()));
        if let Some((body, length)) = body {
            request = request
                .header(CONTENT_TYPE, MIMETYPE_XML)
                .header(CONTENT_LENGTH, length)
                .body(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = ?e, %method, uri = %uri, document = %document, "Request to MarkLogic failed");
            ChannelError::from(e)
        })?;

        let status = response.status();
        let reason = reason_phrase(&response);
        info!(
            %method,
            status = status.as_u16(),
            reason = %reason,
            document = %document,
            "MarkLogic response"
        );

        if status != expected {
            error!(
                %method,
                status = status.as_u16(),
                reason = %reason,
                expected = expected.as_u16(),
                document = %document,
                "Unexpected MarkLogic response status"
            );
            return Err(ChannelError::UnexpectedStatus {
                status: status.as_u16(),
                reason,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelType for MarkLogicChannel {
    fn channel_kind(&self) -> &'static str {
        CHANNEL_ID
    }

    fn channel_node_type(&self) -> &'static str {
        CHANNEL_NODE_TYPE
    }

    fn supported_media_types(&self) -> &BTreeSet<String> {
        &self.supported_media_types
    }

    fn can_publish(&self) -> bool {
        true
    }

    fn can_unpublish(&self) -> bool {
        true
    }

    fn can_publish_status_updates(&self) -> bool {
        false
    }

    async fn publish(
        &self,
        document: &DocumentRef,
        properties: &ChannelProperties,
    ) -> Result<PublishOutcome, ChannelError> {
        let reader = self.content.reader(document).await?;
        if !reader.exists() {
            warn!(document = %document, "No content for document, nothing published");
            return Ok(PublishOutcome::NoContent);
        }
        self.check_media_type(reader.as_ref())?;

        let payload = self.stage_payload(reader.as_ref()).await?;
        info!(document = %document, "Publishing document");

        let uri = self.helper.target_uri(document, properties)?;
        let auth = self.helper.auth_context(properties)?;
        let file = tokio::fs::File::open(payload.path()).await?;
        let length = file.metadata().await?.len();
        debug!(uri = %uri, bytes = length, "Built publish request");

        // The open handle keeps the payload readable until the request completes; the
        // temp copy itself is removed when `payload` drops at the end of this call.
        self.send(
            Method::PUT,
            &uri,
            &auth,
            Some((Body::from(file), length)),
            STATUS_DOCUMENT_INSERTED,
            document,
        )
        .await?;

        info!(document = %document, "Document published");
        Ok(PublishOutcome::Published)
    }

    async fn unpublish(
        &self,
        document: &DocumentRef,
        properties: &ChannelProperties,
    ) -> Result<(), ChannelError> {
        info!(document = %document, "Unpublishing document");

        let uri = self.helper.target_uri(document, properties)?;
        let auth = self.helper.auth_context(properties)?;

        self.send(
            Method::DELETE,
            &uri,
            &auth,
            None,
            STATUS_DOCUMENT_DELETED,
            document,
        )
        .await?;

        info!(document = %document, "Document unpublished");
        Ok(())
    }
}
