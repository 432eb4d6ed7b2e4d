//! Utility functions for display text, dates and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Slug and HTML text helpers shared by the normalizer and renderers
//! - Indonesian date formatting and relative time
//! - Author / category display fallbacks
//! - File system validation for output directories

use crate::models::{CategoryRef, NewsItem};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use scraper::Html;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

const MONTHS: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` bytes (on a char boundary) with an
/// ellipsis and byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Lowercase `name` and replace every whitespace run with a single `-`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(kebab_case("Hukum dan Kriminal"), "hukum-dan-kriminal");
/// ```
pub fn kebab_case(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(c);
            in_space = false;
        }
    }
    slug
}

/// Capitalize the first character of a string.
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Text content of an HTML fragment, entities decoded.
pub fn strip_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    Html::parse_fragment(html).root_element().text().collect()
}

/// Plain-text excerpt of at most `max` characters, `...` appended when cut.
pub fn truncate_text(text: &str, max: usize) -> String {
    let clean = strip_html(text);
    if clean.chars().count() <= max {
        return clean;
    }
    let cut: String = clean.chars().take(max).collect();
    format!("{cut}...")
}

/// Parse the date shapes the CMS emits (`YYYY-MM-DD HH:MM:SS`, RFC 3339,
/// bare dates) into local wall time.
pub fn parse_cms_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Long Indonesian date, e.g. `20 Desember 2025`.
pub fn format_date(value: &str) -> String {
    use chrono::Datelike;

    match parse_cms_date(value) {
        Some(dt) => format!("{} {} {}", dt.day(), MONTHS[dt.month0() as usize], dt.year()),
        None => "Tanggal tidak valid".to_string(),
    }
}

/// Relative Indonesian time against the current local clock.
pub fn format_relative_time(value: &str) -> String {
    format_relative_time_at(value, Local::now().naive_local())
}

/// Relative Indonesian time against `now`; older than a week falls back to
/// [`format_date`].
pub fn format_relative_time_at(value: &str, now: NaiveDateTime) -> String {
    let Some(dt) = parse_cms_date(value) else {
        return "Baru saja".to_string();
    };
    let secs = (now - dt).num_seconds();
    match secs {
        s if s < 60 => "Baru saja".to_string(),
        s if s < 3_600 => format!("{} menit yang lalu", s / 60),
        s if s < 86_400 => format!("{} jam yang lalu", s / 3_600),
        s if s < 604_800 => format!("{} hari yang lalu", s / 86_400),
        _ => format_date(value),
    }
}

/// Byline: journalist, then author name, then `Redaksi`.
pub fn author_display_name(item: &NewsItem) -> &str {
    [item.journalist.as_str(), item.author.name.as_str()]
        .into_iter()
        .find(|name| !name.is_empty())
        .unwrap_or("Redaksi")
}

pub fn category_display_name(category: &CategoryRef) -> &str {
    if category.name.is_empty() {
        "Umum"
    } else {
        category.name.as_str()
    }
}

/// Author avatar, or a generated initials avatar.
pub fn avatar_url(item: &NewsItem) -> String {
    if !item.author.avatar.is_empty() {
        return item.author.avatar.clone();
    }
    format!(
        "https://ui-avatars.com/api/?name={}",
        urlencoding::encode(author_display_name(item))
    )
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let scratch_path = format!("{}/..__write_check__", path.trim_end_matches('/'));
    match stdfs::File::create(&scratch_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&scratch_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_char_boundary() {
        let result = truncate_for_log("ééé", 3);
        assert!(result.starts_with("é…"));
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("Hello World"), "hello-world");
        assert_eq!(kebab_case("Hukum   dan\tKriminal"), "hukum-dan-kriminal");
        assert_eq!(kebab_case(" Umum"), "-umum");
        assert_eq!(kebab_case(""), "");
    }

    #[test]
    fn test_upcase() {
        assert_eq!(upcase("hello"), "Hello");
        assert_eq!(upcase(""), "");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Satu <b>dua</b></p>"), "Satu dua");
        assert_eq!(strip_html("a &amp; b"), "a & b");
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("<i>pendek</i>", 100), "pendek");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-12-20 08:00:00"), "20 Desember 2025");
        assert_eq!(format_date("2025-01-05"), "5 Januari 2025");
        assert_eq!(format_date("2025-08-17T10:00:00"), "17 Agustus 2025");
        assert_eq!(format_date(""), "Tanggal tidak valid");
        assert_eq!(format_date("kemarin"), "Tanggal tidak valid");
    }

    #[test]
    fn test_format_relative_time() {
        let now = at(2025, 12, 20, 12, 0, 0);
        assert_eq!(format_relative_time_at("2025-12-20 11:59:30", now), "Baru saja");
        assert_eq!(format_relative_time_at("2025-12-20 11:15:00", now), "45 menit yang lalu");
        assert_eq!(format_relative_time_at("2025-12-20 09:00:00", now), "3 jam yang lalu");
        assert_eq!(format_relative_time_at("2025-12-18 12:00:00", now), "2 hari yang lalu");
        assert_eq!(format_relative_time_at("2025-11-01 12:00:00", now), "1 November 2025");
        assert_eq!(format_relative_time_at("", now), "Baru saja");
    }

    #[test]
    fn test_author_display_name_priority() {
        let mut item = NewsItem::default();
        assert_eq!(author_display_name(&item), "Redaksi");

        item.author.name = "Budi".to_string();
        assert_eq!(author_display_name(&item), "Budi");

        item.journalist = "Wartawan Lapangan".to_string();
        assert_eq!(author_display_name(&item), "Wartawan Lapangan");

        item.journalist.clear();
        item.author.name.clear();
        assert_eq!(author_display_name(&item), "Redaksi");
    }

    #[test]
    fn test_avatar_url_fallback() {
        let mut item = NewsItem::default();
        item.journalist = "Siti Aminah".to_string();
        assert_eq!(avatar_url(&item), "https://ui-avatars.com/api/?name=Siti%20Aminah");

        item.author.avatar = "https://cdn/a.png".to_string();
        assert_eq!(avatar_url(&item), "https://cdn/a.png");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("out/pages");
        ensure_writable_dir(nested.to_str().unwrap()).await.unwrap();
        assert!(nested.is_dir());
    }
}
