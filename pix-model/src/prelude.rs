//! Flat import surface for the carousel and sync layers.

pub use super::command::{
    Command, DEFAULT_COLLECTION, Filter, Patch, Response, SortOrder,
};
pub use super::ids::{ItemId, ThumbKey, UserId};
pub use super::item::{Item, ItemKind};
pub use super::record::{Record, RecordKind};
pub use super::view::{View, Visibility};
