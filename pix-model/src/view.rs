use std::collections::HashSet;

use crate::error::{ModelError, Result};
use crate::ids::{ItemId, UserId};

/// Who a view belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    /// Keyed by `(path, owner)`.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "view"))]
    Private,
    /// Community view keyed by path alone.
    #[cfg_attr(feature = "serde", serde(rename = "public"))]
    Public,
}

/// Persisted ordered list of item ids for one `(path, owner)` pair.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct View {
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub id: Option<ItemId>,
    pub path: String,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub owner: Option<UserId>,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub author: Option<UserId>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub visibility: Visibility,
    pub items: Vec<ItemId>,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub title: Option<String>,
}

impl View {
    pub fn private(
        path: impl Into<String>,
        owner: UserId,
        items: Vec<ItemId>,
    ) -> Self {
        View {
            path: path.into(),
            author: Some(owner.clone()),
            owner: Some(owner),
            items,
            ..Default::default()
        }
    }

    pub fn public(path: impl Into<String>, items: Vec<ItemId>) -> Self {
        View {
            path: path.into(),
            visibility: Visibility::Public,
            items,
            ..Default::default()
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = Some(id);
        self
    }

    /// Fails on the first id that repeats.
    pub fn check_unique(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for id in &self.items {
            if !seen.insert(*id) {
                return Err(ModelError::DuplicateId(*id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_are_reported() {
        let view = View::public("cats", vec![ItemId(1), ItemId(2), ItemId(1)]);
        assert_eq!(view.check_unique(), Err(ModelError::DuplicateId(ItemId(1))));
        let view = View::public("cats", vec![ItemId(1), ItemId(2)]);
        assert!(view.check_unique().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn visibility_uses_wire_names() {
        let view = View::private("cats", UserId::from("ann"), vec![ItemId(5)]);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "view");
        assert_eq!(json["items"], serde_json::json!([5]));
        let public: View =
            serde_json::from_value(serde_json::json!({"path": "cats", "type": "public"}))
                .unwrap();
        assert!(public.is_public());
        assert!(public.items.is_empty());
    }
}
