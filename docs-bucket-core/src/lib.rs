#![doc = "docs-bucket-core: export and knowledge-sync pipelines for docs-bucket."]

//! This crate holds everything that talks to the outside world on behalf of
//! docs-bucket: the source and sink HTTP clients, the rate-limit handling they
//! share, and the two pipelines built on top of them.
//!
//! - [`export`]: source API → Markdown files in a staging directory
//! - [`synchronise`]: staging directory → knowledge collection(s)
//! - [`service`]: one-call triggers returning a success flag and a message
//!
//! The pipelines are written against the [`source::SourceApi`] and
//! [`sink::KnowledgeApi`] traits; mocks for both are generated with `mockall`
//! when the `test-export-mocks` feature is on (the default).

pub mod collection_cache;
pub mod config;
pub mod error;
pub mod export;
pub mod rate_limit;
pub mod report;
mod response;
pub mod sanitize;
pub mod service;
pub mod sink;
pub mod source;
pub mod synchronise;

pub use error::{Result, SyncError};
