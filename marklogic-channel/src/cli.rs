///
/// This module implements the CLI for marklogic-channel: command parsing, wiring the core
/// channel to local content and the loaded config, and user-visible output.
///
/// All publishing logic (URI resolution, credentials, request/response handling) lives in
/// [`marklogic-channel-core`]. This module is strictly CLI glue.
///
/// ## How To Use
/// - From the shell: `marklogic-channel --help`.
/// - Programmatically / in tests: call [`run`] with a constructed [`Cli`].
///
/// [`marklogic-channel-core`]: ../../marklogic-channel-core/
use crate::load_config::{load_config, read_config, CliConfig};
use crate::local_content::{ContentSource, LocalContentService};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use marklogic_channel_core::config::MIMETYPE_XML;
use marklogic_channel_core::contract::{ChannelType, ContentService, DocumentRef, PublishOutcome};
use marklogic_channel_core::helper::{PlaintextDecryptor, PublishingHelper};
use marklogic_channel_core::MarkLogicChannel;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// CLI for marklogic-channel: publish documents to, or remove them from, MarkLogic Server.
#[derive(Parser)]
#[clap(
    name = "marklogic-channel",
    version,
    about = "Publish documents to, and unpublish them from, a MarkLogic Server REST store"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// PUT a document into the store
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Document identifier, used as the store `uri`
        #[clap(long)]
        document: String,
        /// File holding the document body, or `-` for stdin
        #[clap(long)]
        content: String,
        /// Media type of the content
        #[clap(long, default_value = MIMETYPE_XML)]
        mimetype: String,
    },
    /// DELETE a document from the store
    Unpublish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Document identifier, used as the store `uri`
        #[clap(long)]
        document: String,
    },
    /// Print the media types the configured channel accepts
    MediaTypes {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

fn build_channel(config: &CliConfig, content: Arc<dyn ContentService>) -> MarkLogicChannel {
    // CLI credentials come from the config file or environment in plaintext.
    let helper = PublishingHelper::new(Arc::new(PlaintextDecryptor));
    MarkLogicChannel::new(helper, content)
        .with_http_settings(config.http.clone())
        .with_supported_media_types(config.channel.supported_media_types.clone())
}

async fn read_source(content: &str) -> Result<ContentSource> {
    if content == "-" {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .context("Failed to read content from stdin")?;
        tracing::debug!(bytes = buf.len(), "Read content from stdin");
        Ok(ContentSource::Buffer(buf))
    } else {
        let path = PathBuf::from(content);
        let metadata = tokio::fs::metadata(&path)
            .await
            .with_context(|| format!("Failed to read content file {}", path.display()))?;
        if !metadata.is_file() {
            anyhow::bail!("Content path {} is not a file", path.display());
        }
        Ok(ContentSource::File(path))
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish {
            config,
            document,
            content,
            mimetype,
        } => {
            let config = load_config(config)?;
            let document = DocumentRef::new(document);
            tracing::info!(command = "publish", document = %document, "Starting publish");

            let source = read_source(&content).await?;
            let service = LocalContentService::new(document.clone(), source, Some(mimetype));
            let channel = build_channel(&config, Arc::new(service));

            match channel
                .publish(&document, &config.channel.to_properties())
                .await
            {
                Ok(PublishOutcome::Published) => {
                    tracing::info!(command = "publish", document = %document, "Publish complete");
                    println!("Published {document}");
                    Ok(())
                }
                Ok(PublishOutcome::NoContent) => {
                    tracing::warn!(command = "publish", document = %document, "No content found");
                    println!("No content for {document}; nothing published");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "publish", error = %e, "Publish failed");
                    Err(anyhow::Error::new(e).context(format!("Publishing {document} failed")))
                }
            }
        }
        Commands::Unpublish { config, document } => {
            let config = load_config(config)?;
            let document = DocumentRef::new(document);
            tracing::info!(command = "unpublish", document = %document, "Starting unpublish");

            let channel = build_channel(&config, Arc::new(LocalContentService::empty()));
            match channel
                .unpublish(&document, &config.channel.to_properties())
                .await
            {
                Ok(()) => {
                    tracing::info!(command = "unpublish", document = %document, "Unpublish complete");
                    println!("Unpublished {document}");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "unpublish", error = %e, "Unpublish failed");
                    Err(anyhow::Error::new(e).context(format!("Unpublishing {document} failed")))
                }
            }
        }
        Commands::MediaTypes { config } => {
            let config = read_config(config)?;
            let channel = build_channel(&config, Arc::new(LocalContentService::empty()));
            for media_type in channel.supported_media_types() {
                println!("{media_type}");
            }
            Ok(())
        }
    }
}
