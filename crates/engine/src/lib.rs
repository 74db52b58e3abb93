//! # CMA Engine
//!
//! Entry operations against a content management service whose entries are
//! schema-typed by separately stored content types.
//!
//! ## Key Features
//!
//! - **Field type resolution**: pairs a raw field value with the type its
//!   content type declares ([`SchemaResolver`], [`resolve_field_type`])
//! - **Upsert**: create-or-update chosen from the entry's own metadata, with
//!   the optimistic-concurrency version sent on every write ([`UpsertController`])
//! - **Lazy listing**: page-at-a-time iteration over remote entries ([`Collection`])
//!
//! Every component receives its [`Transport`](cma_api::Transport) through
//! its constructor; nothing reaches for global client state.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use cma_api::CmaClient;
//! use cma_engine::EntriesService;
//! use cma_util::ClientConfig;
//!
//! let client = Arc::new(CmaClient::new(&ClientConfig::load()?)?);
//! let entries = EntriesService::new(client);
//!
//! let mut listing = entries.list("space-id");
//! while let Some(page) = listing.next_page().await? {
//!     for entry in page {
//!         println!("{:?} v{}", entry.id(), entry.version());
//!     }
//! }
//! ```

pub mod collection;
pub mod content_types;
pub mod entries;
pub mod error;
pub mod paths;
pub mod schema;
pub mod upsert;

pub use collection::Collection;
pub use content_types::{ContentTypeCatalog, StaticCatalog, TransportCatalog};
pub use entries::EntriesService;
pub use error::ContentError;
pub use schema::{CatalogScan, SchemaResolver, resolve_field_type};
pub use upsert::{EntryTransition, UpsertController, WriteKind, WritePlan, plan_write};
