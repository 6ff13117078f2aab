//! Folder-level listing results and the helpers used to present them.

use std::sync::LazyLock;

use jiff::Timestamp;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// File name that marks an object as the scene metadata source.
pub const METADATA_FILE_NAME: &str = "scenes.json";

/// Delimiter used to present the flat key space as folders.
pub const DELIMITER: char = '/';

static IMAGE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp)$").expect("image extension pattern is valid")
});

/// Returns `true` if `name` ends with one of the displayable image extensions.
pub fn is_image_name(name: &str) -> bool {
    IMAGE_EXTENSION.is_match(name)
}

/// A single object as returned by the store's listing call.
///
/// Every field except `name` is optional so that partial responses (and other
/// store emulators) still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEntry {
    /// Full object key.
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    /// Byte count, transmitted by the store as a numeric string.
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub generation: Option<String>,
    #[serde(default)]
    pub metageneration: Option<String>,
    #[serde(default)]
    pub time_created: Option<Timestamp>,
    #[serde(default)]
    pub updated: Option<Timestamp>,
    #[serde(default)]
    pub storage_class: Option<String>,
    #[serde(default)]
    pub md5_hash: Option<String>,
    #[serde(default)]
    pub media_link: Option<String>,
    #[serde(default)]
    pub self_link: Option<String>,
}

impl ObjectEntry {
    /// Creates an entry carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parses the size string into a byte count.
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.trim().parse().ok())
    }

    /// Size in kilobytes with two decimals, e.g. `"1.50 KB"`.
    pub fn size_kb_label(&self) -> Option<String> {
        self.size_bytes()
            .map(|bytes| format!("{:.2} KB", bytes as f64 / 1024.0))
    }

    /// Last path segment of the object name.
    pub fn display_name(&self) -> &str {
        self.name.rsplit(DELIMITER).next().unwrap_or(&self.name)
    }

    /// Returns `true` if the object looks like a displayable image.
    pub fn is_image(&self) -> bool {
        is_image_name(&self.name)
    }

    /// Returns `true` if the object is the scene metadata file.
    pub fn is_metadata(&self) -> bool {
        self.name.ends_with(METADATA_FILE_NAME)
    }
}

/// Result of listing exactly one prefix level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Direct child folder prefixes.
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Objects directly under the listed prefix.
    #[serde(default)]
    pub items: Vec<ObjectEntry>,
    /// Continuation token; recorded but never followed.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Listing {
    /// Returns `true` if the store reported more results than this page holds.
    pub fn is_truncated(&self) -> bool {
        self.next_page_token.is_some()
    }

    /// Items that should appear in the media collection.
    pub fn images(&self) -> impl Iterator<Item = &ObjectEntry> {
        self.items.iter().filter(|item| item.is_image())
    }

    /// First item that is a scene metadata file.
    pub fn metadata_entry(&self) -> Option<&ObjectEntry> {
        self.items.iter().find(|item| item.is_metadata())
    }
}

/// Short label for a folder prefix: its last non-empty segment.
pub fn folder_label(prefix: &str) -> &str {
    prefix
        .split(DELIMITER)
        .filter(|segment| !segment.is_empty())
        .next_back()
        .unwrap_or(prefix)
}

/// Prefix one level above `path`, or the root for top-level paths.
pub fn parent_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split(DELIMITER)
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.split_last() {
        Some((_, [])) | None => String::new(),
        Some((_, parents)) => format!("{}{DELIMITER}", parents.join("/")),
    }
}

/// One navigable element of the path trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    pub path: String,
    /// The crumb for the current location is not navigable.
    pub is_current: bool,
}

/// Builds the path trail, starting with the bucket root.
pub fn breadcrumbs(bucket: &str, path: &str) -> Vec<Breadcrumb> {
    let segments: Vec<&str> = path
        .split(DELIMITER)
        .filter(|segment| !segment.is_empty())
        .collect();

    let mut crumbs = Vec::with_capacity(segments.len() + 1);
    crumbs.push(Breadcrumb {
        label: format!("gs://{bucket}"),
        path: String::new(),
        is_current: segments.is_empty(),
    });

    for (index, segment) in segments.iter().enumerate() {
        crumbs.push(Breadcrumb {
            label: (*segment).to_owned(),
            path: format!("{}{DELIMITER}", segments[..=index].join("/")),
            is_current: index + 1 == segments.len(),
        });
    }

    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_pattern_is_case_insensitive() {
        assert!(is_image_name("a/b/photo.JPG"));
        assert!(is_image_name("x.webp"));
        assert!(is_image_name("x.jpeg"));
        assert!(!is_image_name("x.png.txt"));
        assert!(!is_image_name("scenes.json"));
    }

    #[test]
    fn test_listing_deserializes_store_response() {
        let body = r#"{
            "kind": "storage#objects",
            "prefixes": ["shots/"],
            "items": [{
                "kind": "storage#object",
                "name": "shots/a.png",
                "bucket": "demo",
                "size": "1536",
                "contentType": "image/png",
                "timeCreated": "2024-05-01T10:00:00.000Z"
            }]
        }"#;

        let listing: Listing = serde_json::from_str(body).unwrap();
        assert_eq!(listing.prefixes, vec!["shots/".to_owned()]);
        assert_eq!(listing.items.len(), 1);

        let item = &listing.items[0];
        assert_eq!(item.content_type.as_deref(), Some("image/png"));
        assert_eq!(item.size_bytes(), Some(1536));
        assert_eq!(item.size_kb_label().as_deref(), Some("1.50 KB"));
        assert!(item.time_created.is_some());
        assert!(!listing.is_truncated());
    }

    #[test]
    fn test_empty_response_has_no_prefixes_or_items() {
        let listing: Listing = serde_json::from_str(r#"{"kind":"storage#objects"}"#).unwrap();
        assert!(listing.prefixes.is_empty());
        assert!(listing.items.is_empty());
    }

    #[test]
    fn test_metadata_and_images() {
        let listing = Listing {
            items: vec![
                ObjectEntry::named("a/readme.txt"),
                ObjectEntry::named("a/one.png"),
                ObjectEntry::named("a/scenes.json"),
                ObjectEntry::named("a/two.GIF"),
            ],
            ..Default::default()
        };

        assert_eq!(
            listing.metadata_entry().map(|e| e.name.as_str()),
            Some("a/scenes.json")
        );
        let images: Vec<_> = listing.images().map(ObjectEntry::display_name).collect();
        assert_eq!(images, vec!["one.png", "two.GIF"]);
    }

    #[test]
    fn test_folder_label_and_parent() {
        assert_eq!(folder_label("a/b/"), "b");
        assert_eq!(folder_label("top/"), "top");
        assert_eq!(parent_path("a/b/"), "a/");
        assert_eq!(parent_path("a/"), "");
        assert_eq!(parent_path(""), "");
    }

    #[test]
    fn test_breadcrumbs() {
        let crumbs = breadcrumbs("demo", "a/b/");
        let paths: Vec<_> = crumbs.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["", "a/", "a/b/"]);
        assert_eq!(crumbs[0].label, "gs://demo");
        assert!(crumbs[2].is_current);
        assert!(!crumbs[1].is_current);

        let root = breadcrumbs("demo", "");
        assert_eq!(root.len(), 1);
        assert!(root[0].is_current);
    }
}
