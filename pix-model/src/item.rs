use std::collections::BTreeMap;

use crate::error::{ModelError, Result};
use crate::ids::{ItemId, UserId};

/// What a thumbnail displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ItemKind {
    #[default]
    Image,
    /// A web page represented by a scraped image.
    Link,
    /// Embedded video or nested view.
    Embed,
    /// Placeholder shown while a file upload is in flight.
    Uploading,
}

/// A single piece of content shown as a thumbnail.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Item {
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub id: Option<ItemId>,
    pub src: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ItemKind,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub width: Option<u32>,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub height: Option<u32>,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub owner: Option<UserId>,
    /// Account that created the record.
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub author: Option<UserId>,
    /// Topic path the item was collected under.
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub path: Option<String>,
    /// Page the source was found on.
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub href: Option<String>,
    /// Target opened when a link thumbnail is tapped.
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub link: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub title: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "BTreeMap::is_empty")
    )]
    pub meta: BTreeMap<String, String>,
}

impl Item {
    pub fn new(src: impl Into<String>, kind: ItemKind) -> Self {
        Item {
            src: src.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self::new(src, ItemKind::Image)
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.author = Some(owner.clone());
        self.owner = Some(owner);
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Width over height, when both dimensions are known and non-zero.
    pub fn aspect_ratio(&self) -> Option<f32> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(w as f32 / h as f32),
            _ => None,
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner.as_ref() == Some(user)
    }

    /// Checks the fields a save command needs.
    pub fn validate(&self) -> Result<()> {
        if self.src.trim().is_empty() && self.kind != ItemKind::Uploading {
            return Err(ModelError::InvalidItem("empty source".into()));
        }
        if matches!(self.width, Some(0)) || matches!(self.height, Some(0)) {
            return Err(ModelError::InvalidItem(format!(
                "zero dimension for {}",
                self.src
            )));
        }
        Ok(())
    }
}
