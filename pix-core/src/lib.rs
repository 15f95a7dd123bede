//! # Pix Core
//!
//! Shared state and persistence for pix carousels.
//!
//! - [`item_store`]: process-wide item attribute cache, shared by handle
//! - [`view_model`]: one carousel's ordered ids and its view binding
//! - [`sync`]: command dispatch with session queueing and local caches
//! - [`paths`] and [`sources`]: topic paths, tags and source locators
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pix_core::sync::{MemoryRemote, SyncEngine};
//! use pix_core::view_model::{PersistPlan, ViewModel};
//! use pix_model::{ItemId, UserId};
//!
//! async fn first_save() {
//!     let engine = SyncEngine::new(Arc::new(MemoryRemote::new()));
//!     engine.establish_session();
//!
//!     let mut carousel = ViewModel::new("cats");
//!     carousel.append(ItemId(7));
//!     if let PersistPlan::Save(view) = carousel.persist_plan(&UserId::from("ann")) {
//!         let response = engine.save(view).await;
//!         assert!(response.item.is_some());
//!     }
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod error;
/// Process-wide item attribute cache
pub mod item_store;
/// Topic path normalization and tag parsing
pub mod paths;
/// Source locator helpers
pub mod sources;
/// Remote persistence
pub mod sync;
/// Per-carousel ordered ids
pub mod view_model;

pub use error::{CacheError, CoreError, Result};
pub use item_store::ItemStore;
pub use view_model::{PersistPlan, ViewBinding, ViewModel};
