//! Packing list domain library
//!
//! Lists own categories, categories own items. This crate keeps that tree
//! consistent: ownership checks, cascade deletion, sibling ordering, deep
//! copies between lists and templates, and the moderation trail kept next
//! to it.
//!
//! Everything is written against the [`store::EntityStore`] trait, with a
//! PostgreSQL implementation for production and an in-memory one for tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use packing::{Identity, PackingService, Principal};
//! use packing::service::CreateListInput;
//! use packing::store::MemoryStore;
//!
//! # async fn run() -> packing::PackingResult<()> {
//! let service = PackingService::new(MemoryStore::new());
//! service
//!     .ensure_user(Identity::new("auth0|alice", "Alice"))
//!     .await?;
//!
//! let alice = Principal::new("auth0|alice");
//! let list_id = service
//!     .create_list(&alice, CreateListInput::named("Beach Trip"))
//!     .await?;
//! let copy_id = service.duplicate_list(&alice, list_id, None).await?;
//! # let _ = copy_id;
//! # Ok(())
//! # }
//! ```

pub mod builtin_templates;
pub mod duplication;
pub mod error;
pub mod guard;
pub mod hierarchy;
pub mod ids;
pub mod models;
pub mod ordering;
pub mod service;
pub mod store;
pub mod validation;

pub use error::{EntityKind, PackingError, PackingResult};
pub use guard::{AccessPolicy, Principal};
pub use ids::{CategoryId, ItemId, ListId, ModerationId, TemplateId, UserId};
pub use service::{Identity, PackingService};
