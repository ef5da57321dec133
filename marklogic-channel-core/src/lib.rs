#![doc = "marklogic-channel-core: core publishing logic for MarkLogic channels."]

//! This crate holds everything needed to publish a repository document to MarkLogic Server
//! or remove it again: the collaborator contracts, the channel property model, the
//! publishing helper (target URI + credentials) and the channel connector itself.
//!
//! # Usage
//! Build a [`helper::PublishingHelper`] around a [`contract::Decryptor`], hand it to
//! [`channel::MarkLogicChannel`] together with a [`contract::ContentService`], then drive
//! it through the [`contract::ChannelType`] trait.

pub mod channel;
pub mod config;
pub mod content;
pub mod contract;
pub mod error;
pub mod helper;
pub mod properties;

pub use channel::MarkLogicChannel;
pub use contract::{ChannelType, DocumentRef, PublishOutcome};
pub use error::{ChannelError, DecryptError};
pub use helper::PublishingHelper;
pub use properties::ChannelProperties;
