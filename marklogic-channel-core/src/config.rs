use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info};

use crate::properties::{
    ChannelProperties, PROP_HOST, PROP_PASSWORD, PROP_PORT, PROP_USERNAME,
};

pub const MIMETYPE_XML: &str = "application/xml";
pub const MIMETYPE_TEXT_XML: &str = "text/xml";

/// Default set of media types a MarkLogic channel accepts: XML only.
pub fn default_supported_media_types() -> BTreeSet<String> {
    [MIMETYPE_XML, MIMETYPE_TEXT_XML]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Timeouts applied to every request the channel sends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Static description of one MarkLogic channel, as loaded by a host or the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub host: String,
    pub port: u16,
    /// Stored (possibly encrypted) username.
    #[serde(default)]
    pub username: Option<String>,
    /// Stored (possibly encrypted) password.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_supported_media_types")]
    pub supported_media_types: BTreeSet<String>,
}

impl ChannelConfig {
    /// Render the channel property map handed to publish/unpublish.
    pub fn to_properties(&self) -> ChannelProperties {
        let mut props = ChannelProperties::new()
            .with(PROP_HOST, self.host.as_str())
            .with(PROP_PORT, self.port);
        if let Some(username) = &self.username {
            props.insert(PROP_USERNAME, username.as_str());
        }
        if let Some(password) = &self.password {
            props.insert(PROP_PASSWORD, password.as_str());
        }
        props
    }

    pub fn trace_loaded(&self) {
        info!(
            host = %self.host,
            port = self.port,
            username_set = self.username.is_some(),
            media_types = self.supported_media_types.len(),
            "Loaded ChannelConfig"
        );
        debug!(supported_media_types = ?self.supported_media_types, "Channel media types");
    }
}
