//! Topic paths and `path@owner` tags.

use pix_model::UserId;

/// Hosts and prefixes whose first following segment names the topic.
const TOPIC_MARKERS: [&str; 5] =
    ["images.lh", "pix8.co", "th.ai", "preload.lh", "/wiki"];

/// Reduces a URL or free-form tag to the topic path a view is keyed by.
///
/// Known hosting prefixes collapse to the segment after them. Anything that
/// is not an `http` URL is lower-cased and loses its `@owner` suffix.
pub fn normalize_path(raw: &str) -> String {
    let mut path = raw.trim().to_owned();
    for marker in TOPIC_MARKERS {
        if let Some(at) = path.find(marker) {
            let rest = path.get(at + marker.len() + 1..).unwrap_or_default();
            path = rest.split('/').next().unwrap_or_default().to_owned();
        }
    }
    if !path.starts_with("http") {
        path = path.to_lowercase();
        if let Some((head, _)) = path.split_once('@') {
            path = head.to_owned();
        }
    }
    path
}

/// Whose view a tag asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOwner {
    /// No `@`: the acting user's private view.
    Current,
    /// Trailing `@` with nothing after it: the public view.
    Public,
    User(UserId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub path: String,
    pub owner: TagOwner,
}

/// Parses `path@owner`. A tag starting with `@` takes its path from
/// `parent_path` (the carousel above).
pub fn parse_tag(tag: &str, parent_path: Option<&str>) -> Tag {
    let tag = tag.trim();
    let (path, owner) = match tag.split_once('@') {
        None => (tag, TagOwner::Current),
        Some((path, "")) => (path, TagOwner::Public),
        Some((path, owner)) => (path, TagOwner::User(UserId::new(owner))),
    };
    let path = if path.is_empty() {
        parent_path.unwrap_or_default()
    } else {
        path
    };
    Tag {
        path: normalize_path(path),
        owner,
    }
}
