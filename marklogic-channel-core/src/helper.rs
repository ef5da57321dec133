//! Publishing helper: turns channel properties into a target URI and request credentials.

use reqwest::{RequestBuilder, Url};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

use crate::contract::{Decryptor, DocumentRef};
use crate::error::{ChannelError, DecryptError};
use crate::properties::{ChannelProperties, PROP_HOST, PROP_PASSWORD, PROP_PORT, PROP_USERNAME};

/// REST endpoint of the MarkLogic document store.
pub const STORE_PATH: &str = "store";

/// Where a set of credentials may be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScope {
    /// Any host, any port, any realm.
    Any,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authentication state for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub scope: AuthScope,
    pub credentials: Credentials,
}

impl AuthContext {
    /// Attach the credentials to an outgoing request as HTTP Basic auth.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.scope {
            AuthScope::Any => request.basic_auth(
                &self.credentials.username,
                Some(&self.credentials.password),
            ),
        }
    }
}

/// Decrypts nothing: for properties that already hold plaintext credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextDecryptor;

impl Decryptor for PlaintextDecryptor {
    fn decrypt(&self, _key: &str, ciphertext: &str) -> Result<String, DecryptError> {
        Ok(ciphertext.to_string())
    }
}

/// A validated store URI.
///
/// `as_str` keeps the composed form `http://<host>:<port>/store?uri=...` verbatim, explicit
/// default port included; `url` is the parsed equivalent used to send the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUri {
    url: Url,
    serialized: String,
}

impl TargetUri {
    pub fn as_str(&self) -> &str {
        &self.serialized
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for TargetUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialized)
    }
}

#[derive(Clone)]
pub struct PublishingHelper {
    decryptor: Arc<dyn Decryptor>,
}

impl PublishingHelper {
    pub fn new(decryptor: Arc<dyn Decryptor>) -> Self {
        Self { decryptor }
    }

    /// Build the request credentials from the channel's encrypted username and password.
    ///
    /// The decryptor is called exactly once per field. Its errors are returned unchanged.
    pub fn auth_context(&self, properties: &ChannelProperties) -> Result<AuthContext, ChannelError> {
        let username = self.decrypt_property(properties, PROP_USERNAME)?;
        let password = self.decrypt_property(properties, PROP_PASSWORD)?;
        debug!(username = %username, "Built auth context from channel properties");

        Ok(AuthContext {
            scope: AuthScope::Any,
            credentials: Credentials { username, password },
        })
    }

    /// Compose `http://<host>:<port>/store?uri=<document>` from the channel properties.
    ///
    /// The host must be a bare host name or address: anything that would change the
    /// authority, path or port of the composed URI is rejected as [`ChannelError::InvalidUri`].
    pub fn target_uri(
        &self,
        document: &DocumentRef,
        properties: &ChannelProperties,
    ) -> Result<TargetUri, ChannelError> {
        let host = properties
            .text(PROP_HOST)
            .filter(|h| !h.trim().is_empty())
            .ok_or(ChannelError::MissingProperty(PROP_HOST))?;

        let port = match properties.get(PROP_PORT) {
            None => return Err(ChannelError::MissingProperty(PROP_PORT)),
            Some(_) => properties
                .integer(PROP_PORT)
                .and_then(|p| u16::try_from(p).ok())
                .ok_or_else(|| {
                    ChannelError::InvalidUri(format!(
                        "port must be an integer between 0 and 65535, got {:?}",
                        properties.get(PROP_PORT)
                    ))
                })?,
        };

        let base = format!("http://{host}:{port}/{STORE_PATH}");
        let mut url = Url::parse(&base).map_err(|e| {
            error!(error = ?e, host, port, "Failed to build MarkLogic target URI");
            ChannelError::InvalidUri(format!("{host}:{port}: {e}"))
        })?;

        let intact = url
            .host_str()
            .is_some_and(|h| h.eq_ignore_ascii_case(host))
            && url.port_or_known_default() == Some(port)
            && url.path() == format!("/{STORE_PATH}")
            && url.username().is_empty()
            && url.password().is_none()
            && url.query().is_none()
            && url.fragment().is_none();
        if !intact {
            error!(host, port, parsed = %url, "Host does not form a plain authority");
            return Err(ChannelError::InvalidUri(format!(
                "host {host:?} is not a plain host name"
            )));
        }

        // Query quoting keeps ':' and '/' and escapes characters that are illegal in a query.
        url.set_query(Some(&format!("uri={}", document.as_str())));
        let query = url.query().unwrap_or_default();
        let serialized = format!("{base}?{query}");

        Ok(TargetUri { url, serialized })
    }

    fn decrypt_property(
        &self,
        properties: &ChannelProperties,
        key: &'static str,
    ) -> Result<String, ChannelError> {
        let ciphertext = properties
            .text(key)
            .ok_or(ChannelError::MissingProperty(key))?;
        Ok(self.decryptor.decrypt(key, ciphertext)?)
    }
}
