//! Cover image reconstruction from partial CMS data.
//!
//! The CMS stores covers under a dozen different keys, sometimes as bare
//! filenames whose directory lives in a sibling field. This module resolves
//! them to a path fragment (or absolute URL) in two passes:
//!
//! 1. the first truthy cover candidate, qualified with a directory when it is
//!    a bare filename;
//! 2. if that yields nothing, the plain `gambar` field under the same rule.
//!
//! Turning the fragment into a displayable URL is done later by
//! [`crate::images::resolve_image_url`].

use super::lookup::{first_truthy, opt_text};
use serde_json::Value;

/// Cover candidates in priority order.
pub const COVER_KEYS: &[&str] = &[
    "gambar_detail",
    "cover",
    "gambar",
    "foto",
    "thumbnail",
    "gambar_kecil",
    "image",
    "gambar_utama",
    "foto_utama",
    "img",
    "url_gambar",
    "feature_image",
    "thumb_url",
    "image_url",
    "cover_url",
];

/// Explicit directory fields on the raw record.
pub const FOLDER_KEYS: &[&str] = &["folder", "file_folder", "directory", "path"];

/// Keys of an image object that may carry its location.
const IMAGE_OBJECT_KEYS: &[&str] = &["url", "path", "file"];

/// Resolve the cover of a raw news record.
///
/// `channel_id` is the already-resolved channel id (`0` when unknown).
/// Returns an empty string when nothing usable is found.
pub fn reconstruct_cover(raw: &Value, channel_id: i64) -> String {
    let folder = opt_text(raw, FOLDER_KEYS);

    let primary = first_truthy(raw, COVER_KEYS)
        .map(image_source)
        .unwrap_or_default();
    let resolved = qualify(&primary, folder.as_deref(), channel_id);
    if !resolved.is_empty() {
        return resolved;
    }

    // `gambar_detail` can be present but unusable while `gambar` holds the file.
    match opt_text(raw, &["gambar"]) {
        Some(gambar) => qualify(&gambar, folder.as_deref(), channel_id),
        None => String::new(),
    }
}

/// Extract a location string from a string or object image value.
fn image_source(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) => opt_text(value, IMAGE_OBJECT_KEYS).unwrap_or_default(),
        _ => String::new(),
    }
}

/// Qualify a bare filename with a directory.
///
/// Absolute URLs and paths that already contain a `/` pass through. Bare
/// names take the explicit folder first, then `channel/<id>/`; with neither
/// the result is empty.
pub fn qualify(source: &str, folder: Option<&str>, channel_id: i64) -> String {
    if source.is_empty() {
        return String::new();
    }
    if source.starts_with("http") || source.contains('/') {
        return source.to_string();
    }
    match folder {
        Some(folder) => format!("{}/{}", folder.trim_end_matches('/'), source),
        None if channel_id != 0 => format!("channel/{}/{}", channel_id, source),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_filename_uses_channel_directory() {
        let raw = json!({"gambar": "x.jpg", "id_channel": 7});
        assert_eq!(reconstruct_cover(&raw, 7), "channel/7/x.jpg");
    }

    #[test]
    fn test_relative_path_is_kept() {
        let raw = json!({"gambar": "sub/x.jpg"});
        assert_eq!(reconstruct_cover(&raw, 0), "sub/x.jpg");
    }

    #[test]
    fn test_absolute_url_is_kept() {
        let raw = json!({"cover": "http://host/x.jpg", "id_channel": 3});
        assert_eq!(reconstruct_cover(&raw, 3), "http://host/x.jpg");
    }

    #[test]
    fn test_folder_wins_over_channel() {
        let raw = json!({"foto": "a.png", "folder": "uploads/2025/"});
        assert_eq!(reconstruct_cover(&raw, 4), "uploads/2025/a.png");
    }

    #[test]
    fn test_bare_filename_without_directory_is_unresolved() {
        let raw = json!({"thumbnail": "lonely.jpg"});
        assert_eq!(reconstruct_cover(&raw, 0), "");
    }

    #[test]
    fn test_priority_order_of_cover_keys() {
        let raw = json!({
            "cover_url": "http://last/z.jpg",
            "cover": "http://second/y.jpg",
        });
        assert_eq!(reconstruct_cover(&raw, 0), "http://second/y.jpg");
    }

    #[test]
    fn test_object_image_value() {
        let raw = json!({"image": {"path": "media/p.jpg", "file": "ignored.jpg"}});
        assert_eq!(reconstruct_cover(&raw, 0), "media/p.jpg");

        let raw = json!({"image": {"file": "f.jpg"}, "directory": "docs"});
        assert_eq!(reconstruct_cover(&raw, 0), "docs/f.jpg");
    }

    #[test]
    fn test_gambar_fallback_when_primary_is_unusable() {
        // gambar_detail is truthy but carries no location, so the first pass is empty.
        let raw = json!({"gambar_detail": {"alt": "no url"}, "gambar": "g.jpg", "cid": 12});
        assert_eq!(reconstruct_cover(&raw, 12), "channel/12/g.jpg");
    }

    #[test]
    fn test_nothing_available() {
        assert_eq!(reconstruct_cover(&json!({}), 5), "");
    }

    #[test]
    fn test_qualify_rules() {
        assert_eq!(qualify("", Some("dir"), 1), "");
        assert_eq!(qualify("https://cdn/x.jpg", Some("dir"), 1), "https://cdn/x.jpg");
        assert_eq!(qualify("x.jpg", Some("dir"), 1), "dir/x.jpg");
        assert_eq!(qualify("x.jpg", None, 1), "channel/1/x.jpg");
        assert_eq!(qualify("x.jpg", None, 0), "");
    }
}
