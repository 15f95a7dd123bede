use std::fmt::{self, Display};

use crate::ids::ItemId;

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidItem(String),
    DuplicateId(ItemId),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidItem(msg) => write!(f, "invalid item: {msg}"),
            ModelError::DuplicateId(id) => {
                write!(f, "item {id} appears more than once")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
