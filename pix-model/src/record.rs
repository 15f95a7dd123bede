use crate::ids::{ItemId, UserId};
use crate::item::{Item, ItemKind};
use crate::view::{View, Visibility};

/// Anything stored in the shared collection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "record", rename_all = "snake_case")
)]
pub enum Record {
    Item(Item),
    View(View),
}

/// Flattened `type` of a record, used by filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RecordKind {
    Image,
    Link,
    Embed,
    Uploading,
    View,
    Public,
}

impl From<ItemKind> for RecordKind {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Image => RecordKind::Image,
            ItemKind::Link => RecordKind::Link,
            ItemKind::Embed => RecordKind::Embed,
            ItemKind::Uploading => RecordKind::Uploading,
        }
    }
}

impl From<Visibility> for RecordKind {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Private => RecordKind::View,
            Visibility::Public => RecordKind::Public,
        }
    }
}

impl Record {
    pub fn id(&self) -> Option<ItemId> {
        match self {
            Record::Item(item) => item.id,
            Record::View(view) => view.id,
        }
    }

    pub fn set_id(&mut self, id: ItemId) {
        match self {
            Record::Item(item) => item.id = Some(id),
            Record::View(view) => view.id = Some(id),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Item(item) => item.kind.into(),
            Record::View(view) => view.visibility.into(),
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Record::Item(item) => item.path.as_deref(),
            Record::View(view) => Some(view.path.as_str()),
        }
    }

    pub fn owner(&self) -> Option<&UserId> {
        match self {
            Record::Item(item) => item.owner.as_ref(),
            Record::View(view) => view.owner.as_ref(),
        }
    }

    pub fn author(&self) -> Option<&UserId> {
        match self {
            Record::Item(item) => item.author.as_ref(),
            Record::View(view) => view.author.as_ref(),
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Record::Item(item) => Some(item),
            Record::View(_) => None,
        }
    }

    pub fn as_view(&self) -> Option<&View> {
        match self {
            Record::View(view) => Some(view),
            Record::Item(_) => None,
        }
    }

    pub fn into_item(self) -> Option<Item> {
        match self {
            Record::Item(item) => Some(item),
            Record::View(_) => None,
        }
    }

    pub fn into_view(self) -> Option<View> {
        match self {
            Record::View(view) => Some(view),
            Record::Item(_) => None,
        }
    }
}

impl From<Item> for Record {
    fn from(item: Item) -> Self {
        Record::Item(item)
    }
}

impl From<View> for Record {
    fn from(view: View) -> Self {
        Record::View(view)
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn records_carry_their_variant_tag() {
        let record = Record::from(View::public("dogs", vec![ItemId(9)]));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["record"], "view");
        assert_eq!(json["type"], "public");

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), RecordKind::Public);
        assert_eq!(back.path(), Some("dogs"));
    }
}
