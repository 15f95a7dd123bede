//! Shared data model for pix carousels.
//!
//! Items and views are both stored as [`Record`]s in a single remote
//! collection. Carousels talk to that collection through [`Command`]s and
//! receive [`Response`]s. Nothing in this crate performs I/O.
#![allow(missing_docs)]

pub mod command;
pub mod error;
pub mod ids;
pub mod item;
pub mod prelude;
pub mod record;
pub mod view;

pub use command::{Command, DEFAULT_COLLECTION, Filter, Patch, Response, SortOrder};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ItemId, ThumbKey, UserId};
pub use item::{Item, ItemKind};
pub use record::{Record, RecordKind};
pub use view::{View, Visibility};
