//! Image reference resolution.
//!
//! Source rows carry image references in whatever shape the operator pasted:
//! a full share link, a query-parameter link, or a bare file id. Resolution
//! is a pure string transform to a fully qualified thumbnail URL.

use std::sync::LazyLock;

use regex::Regex;

/// Thumbnail rendering endpoint; `w1000` keeps enough resolution for the
/// product grid without shipping originals.
const THUMBNAIL_BASE: &str = "https://drive.google.com/thumbnail";

/// Recognized reference shapes, tried in order; first match wins.
static ID_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    let pattern = |re| Regex::new(re).expect("hard-coded pattern compiles");
    [
        // /file/d/<id>/view style path segment
        pattern(r"/d/([A-Za-z0-9_-]+)"),
        // ...?id=<id> query parameter
        pattern(r"id=([A-Za-z0-9_-]+)"),
        // bare identifier
        pattern(r"^([A-Za-z0-9_-]+)$"),
    ]
});

/// Extract the file identifier from an image reference.
///
/// Falls back to the whole (trimmed) input when no pattern matches.
#[must_use]
pub fn extract_file_id(image_ref: &str) -> &str {
    let trimmed = image_ref.trim();
    for pattern in ID_PATTERNS.iter() {
        if let Some(found) = pattern.captures(trimmed).and_then(|c| c.get(1)) {
            return found.as_str();
        }
    }
    trimmed
}

/// Resolve an image reference to a fully qualified thumbnail URL.
#[must_use]
pub fn thumbnail_url(image_ref: &str) -> String {
    format!("{THUMBNAIL_BASE}?id={}&sz=w1000", extract_file_id(image_ref))
}
