//! Display URL resolution for covers and article bodies.
//!
//! The normalizer only produces path fragments such as `channel/7/x.jpg`.
//! This module turns them into absolute URLs on the image host, inserting
//! the `/storage/` segment the host serves uploads from.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Shown when an item has no usable cover.
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/800x600/eee/999?text=SinPo+Media";

static IMG_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(<img[^>]+src=["'])([^"']+)(["'])"#).expect("static img regex")
});

/// Resolve a cover fragment against the image host.
///
/// - empty → [`PLACEHOLDER_IMAGE`]
/// - `http…` → unchanged
/// - `storage/…` or `uploads/…` → `{base}/{path}`
/// - anything else → `{base}/storage/{path}`
pub fn resolve_image_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return PLACEHOLDER_IMAGE.to_string();
    }
    if path.starts_with("http") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let clean = path.strip_prefix('/').unwrap_or(path);
    if clean.starts_with("storage/") || clean.starts_with("uploads/") {
        format!("{base}/{clean}")
    } else {
        format!("{base}/storage/{clean}")
    }
}

/// Rewrite relative `<img src>` values inside article HTML to absolute
/// storage URLs. `http:`, `https:` and `data:` sources are left alone.
pub fn fix_content_images(base: &str, html: &str) -> String {
    let base = base.trim_end_matches('/');
    IMG_SRC
        .replace_all(html, |caps: &Captures| {
            let src = &caps[2];
            if src.starts_with("http:") || src.starts_with("https:") || src.starts_with("data:") {
                return caps[0].to_string();
            }
            let clean = src.strip_prefix('/').unwrap_or(src);
            format!("{}{}/storage/{}{}", &caps[1], base, clean, &caps[3])
        })
        .into_owned()
}
