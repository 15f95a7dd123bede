//! Helpers for item source locators.

use once_cell::sync::Lazy;
use pix_model::ItemKind;
use regex::Regex;
use url::Url;

use crate::error::{CoreError, Result};

static YOUTUBE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:youtube\.com/(?:embed/|v/|watch\?(?:.*&)?v=)|youtu\.be/)([A-Za-z0-9_-]+)",
    )
    .expect("youtube regex should compile")
});
static VIMEO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"vimeo\.com/(\d+)").expect("vimeo regex should compile")
});

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "gif", "png"];

/// Prefixes `http://` unless the locator already names a scheme we load.
pub fn with_scheme(src: &str) -> String {
    let src = src.trim();
    if ["http://", "https://", "ipfs://"]
        .iter()
        .any(|scheme| src.contains(scheme))
    {
        src.to_owned()
    } else {
        format!("http://{src}")
    }
}

/// Scheme-defaulted locator, rejected when it does not parse as a URL.
pub fn checked_source(src: &str) -> Result<String> {
    if src.trim().is_empty() {
        return Err(CoreError::InvalidSource("empty source".into()));
    }
    let src = with_scheme(src);
    Url::parse(&src)
        .map_err(|err| CoreError::InvalidSource(format!("{src}: {err}")))?;
    Ok(src)
}

/// Rewrites `ipfs://` locators onto an HTTP gateway.
pub fn format_url(src: &str, gateway: &str) -> String {
    match src.strip_prefix("ipfs://") {
        Some(hash) => format!("{}/{hash}", gateway.trim_end_matches('/')),
        None => src.to_owned(),
    }
}

/// Pulls the real image out of search-result links carrying `imgurl=`.
pub fn unwrap_search_link(src: &str) -> String {
    Url::parse(src)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "imgurl")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_else(|| src.to_owned())
}

/// Maps imgur pages and wikimedia thumbnails to the full-size image.
pub fn full_resolution_url(src: &str) -> String {
    if src.contains("imgur.com") {
        let ext = src.rsplit('.').next().unwrap_or_default().to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return src.to_owned();
        }
        let bare = src
            .split_once("://")
            .map_or(src, |(_, rest)| rest);
        return match bare.split('/').nth(1) {
            Some(id) if !id.is_empty() => format!("http://i.imgur.com/{id}.jpg"),
            _ => src.to_owned(),
        };
    }
    if src.contains("upload.wikimedia.org") && src.contains("/thumb/") {
        let mut segments: Vec<&str> = src.split('/').collect();
        segments.pop();
        if let Some(at) = segments.iter().position(|s| *s == "thumb") {
            segments.remove(at);
        }
        return segments.join("/");
    }
    src.to_owned()
}

/// True when `src` belongs to a host whose sources are saved unprobed.
pub fn skips_probe(src: &str, hosts: &[String]) -> bool {
    hosts.iter().any(|host| src.contains(host.as_str()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoProvider {
    Youtube,
    Vimeo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub provider: VideoProvider,
    pub id: String,
}

impl VideoRef {
    pub fn embed_url(&self) -> String {
        match self.provider {
            VideoProvider::Youtube => {
                format!("https://www.youtube.com/embed/{}?rel=0", self.id)
            }
            VideoProvider::Vimeo => {
                format!("http://player.vimeo.com/video/{}", self.id)
            }
        }
    }

    /// Still image for the thumbnail. Vimeo needs an API lookup, so none.
    pub fn thumbnail_url(&self) -> Option<String> {
        match self.provider {
            VideoProvider::Youtube => Some(format!(
                "http://img.youtube.com/vi/{}/sddefault.jpg",
                self.id
            )),
            VideoProvider::Vimeo => None,
        }
    }
}

pub fn parse_video_url(src: &str) -> Option<VideoRef> {
    if let Some(caps) = YOUTUBE_PATTERN.captures(src) {
        return Some(VideoRef {
            provider: VideoProvider::Youtube,
            id: caps[1].to_owned(),
        });
    }
    VIMEO_PATTERN.captures(src).map(|caps| VideoRef {
        provider: VideoProvider::Vimeo,
        id: caps[1].to_owned(),
    })
}

/// Kind a freshly included source starts as.
pub fn kind_for_source(src: &str) -> ItemKind {
    if parse_video_url(src).is_some() {
        ItemKind::Embed
    } else {
        ItemKind::Image
    }
}
