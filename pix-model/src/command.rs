//! Remote command and response shapes.

use crate::ids::{ItemId, UserId};
use crate::record::{Record, RecordKind};

/// Collection every record lives in unless configured otherwise.
pub const DEFAULT_COLLECTION: &str = "pix8";

/// Record selector used by `get` and `load`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Filter {
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub ids: Option<Vec<ItemId>>,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub path: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub owner: Option<UserId>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "type", skip_serializing_if = "Option::is_none")
    )]
    pub kind: Option<RecordKind>,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub author: Option<UserId>,
}

impl Filter {
    pub fn by_id(id: ItemId) -> Self {
        Self::by_ids([id])
    }

    pub fn by_ids(ids: impl IntoIterator<Item = ItemId>) -> Self {
        Filter {
            ids: Some(ids.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Private view of `owner` at `path`.
    pub fn view(path: impl Into<String>, owner: UserId) -> Self {
        Filter {
            path: Some(path.into()),
            owner: Some(owner),
            kind: Some(RecordKind::View),
            ..Default::default()
        }
    }

    /// Community view at `path`.
    pub fn public(path: impl Into<String>) -> Self {
        Filter {
            path: Some(path.into()),
            kind: Some(RecordKind::Public),
            ..Default::default()
        }
    }

    pub fn by_author(author: UserId) -> Self {
        Filter {
            author: Some(author),
            ..Default::default()
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        if let Some(ids) = &self.ids {
            match record.id() {
                Some(id) if ids.contains(&id) => {}
                _ => return false,
            }
        }
        if let Some(path) = &self.path
            && record.path() != Some(path.as_str())
        {
            return false;
        }
        if let Some(owner) = &self.owner
            && record.owner() != Some(owner)
        {
            return false;
        }
        if let Some(kind) = self.kind
            && record.kind() != kind
        {
            return false;
        }
        if let Some(author) = &self.author
            && record.author() != Some(author)
        {
            return false;
        }
        true
    }
}

/// Order of `load` results. Ids are handed out in creation order, so the
/// id stands in for the record's age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SortOrder {
    #[default]
    Oldest,
    Newest,
}

impl SortOrder {
    pub fn is_oldest(&self) -> bool {
        *self == SortOrder::Oldest
    }

    /// Sorts `records` by id in this order. Unsaved records go last.
    pub fn arrange(self, records: &mut [Record]) {
        match self {
            SortOrder::Oldest => {
                records.sort_by_key(|record| (record.id().is_none(), record.id()))
            }
            SortOrder::Newest => records.sort_by_key(|record| {
                (record.id().is_none(), std::cmp::Reverse(record.id()))
            }),
        }
    }
}

/// Fields an `update` overwrites. Absent fields are left alone.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Patch {
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub items: Option<Vec<ItemId>>,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub title: Option<String>,
}

impl Patch {
    pub fn items(items: Vec<ItemId>) -> Self {
        Patch {
            items: Some(items),
            title: None,
        }
    }

    /// Writes the patched fields into `record`. Returns whether anything
    /// changed.
    pub fn apply(&self, record: &mut Record) -> bool {
        let mut changed = false;
        if let Some(title) = &self.title {
            let slot = match record {
                Record::Item(item) => &mut item.title,
                Record::View(view) => &mut view.title,
            };
            if slot.as_ref() != Some(title) {
                *slot = Some(title.clone());
                changed = true;
            }
        }
        if let (Some(items), Record::View(view)) = (&self.items, record)
            && &view.items != items
        {
            view.items = items.clone();
            changed = true;
        }
        changed
    }
}

/// A request to the remote store.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "cmd", rename_all = "snake_case")
)]
pub enum Command {
    Save {
        item: Record,
        collection: String,
    },
    Update {
        id: ItemId,
        set: Patch,
        collection: String,
    },
    Get {
        filter: Filter,
        collection: String,
    },
    Load {
        filter: Filter,
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        limit: Option<usize>,
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "SortOrder::is_oldest")
        )]
        order: SortOrder,
        collection: String,
    },
    /// Asks the server to recompute the public view for `path`.
    RefreshPublic { path: String, collection: String },
}

impl Command {
    pub fn save(record: impl Into<Record>) -> Self {
        Command::Save {
            item: record.into(),
            collection: DEFAULT_COLLECTION.to_owned(),
        }
    }

    pub fn update(id: ItemId, set: Patch) -> Self {
        Command::Update {
            id,
            set,
            collection: DEFAULT_COLLECTION.to_owned(),
        }
    }

    pub fn get(filter: Filter) -> Self {
        Command::Get {
            filter,
            collection: DEFAULT_COLLECTION.to_owned(),
        }
    }

    pub fn load(filter: Filter) -> Self {
        Command::Load {
            filter,
            limit: None,
            order: SortOrder::Oldest,
            collection: DEFAULT_COLLECTION.to_owned(),
        }
    }

    pub fn refresh_public(path: impl Into<String>) -> Self {
        Command::RefreshPublic {
            path: path.into(),
            collection: DEFAULT_COLLECTION.to_owned(),
        }
    }

    /// Sets the result cap of a `load`; other commands are unchanged.
    pub fn with_limit(mut self, cap: usize) -> Self {
        if let Command::Load { limit, .. } = &mut self {
            *limit = Some(cap);
        }
        self
    }

    /// Sets the result order of a `load`; other commands are unchanged.
    pub fn with_order(mut self, sort: SortOrder) -> Self {
        if let Command::Load { order, .. } = &mut self {
            *order = sort;
        }
        self
    }

    pub fn with_collection(mut self, name: &str) -> Self {
        match &mut self {
            Command::Save { collection, .. }
            | Command::Update { collection, .. }
            | Command::Get { collection, .. }
            | Command::Load { collection, .. }
            | Command::RefreshPublic { collection, .. } => {
                name.clone_into(collection);
            }
        }
        self
    }

    pub fn collection(&self) -> &str {
        match self {
            Command::Save { collection, .. }
            | Command::Update { collection, .. }
            | Command::Get { collection, .. }
            | Command::Load { collection, .. }
            | Command::RefreshPublic { collection, .. } => collection,
        }
    }

    /// Read-only commands that a local cache may answer.
    pub fn is_query(&self) -> bool {
        matches!(self, Command::Get { .. } | Command::Load { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Save { .. } => "save",
            Command::Update { .. } => "update",
            Command::Get { .. } => "get",
            Command::Load { .. } => "load",
            Command::RefreshPublic { .. } => "refresh_public",
        }
    }
}

/// Raw result of a command. Empty when the transport failed or nothing
/// matched.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Response {
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub item: Option<Record>,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub items: Option<Vec<Record>>,
}

impl Response {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_item(record: impl Into<Record>) -> Self {
        Response {
            item: Some(record.into()),
            items: None,
        }
    }

    pub fn with_items(records: Vec<Record>) -> Self {
        Response {
            item: None,
            items: Some(records),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_none() && self.items.is_none()
    }

    /// Every record in the response, single item first.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.item.iter().chain(self.items.iter().flatten())
    }

    pub fn into_records(self) -> Vec<Record> {
        let mut out: Vec<Record> = self.item.into_iter().collect();
        out.extend(self.items.unwrap_or_default());
        out
    }
}
