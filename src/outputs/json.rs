//! JSON output of rendered pages.
//!
//! The document is the [`Page`] itself, tagged with a `page` field:
//!
//! ```json
//! {"page": "home", "headline": {...}, "latest": [...], "latest_cursor": {"offset": 15, "has_more": true}}
//! ```

use crate::pages::Page;
use tracing::{debug, instrument};

/// Serialize a page as pretty-printed JSON.
#[instrument(level = "debug", skip_all, fields(page = %page.file_stem()))]
pub fn page_to_json(page: &Page) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(page)?;
    debug!(bytes = json.len(), "Serialized page");
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tests::news;
    use crate::pages::{CategoryPage, HomePage};
    use serde_json::Value;

    #[test]
    fn test_home_json_shape() {
        let page = Page::Home(HomePage {
            headline: Some(news(1)),
            latest: vec![news(2), news(3)],
            ..HomePage::default()
        });
        let value: Value = serde_json::from_str(&page_to_json(&page).unwrap()).unwrap();

        assert_eq!(value["page"], "home");
        assert_eq!(value["headline"]["id"], 1);
        assert_eq!(value["latest"].as_array().unwrap().len(), 2);
        assert_eq!(value["latest_cursor"]["has_more"], true);
        assert!(value["secondary"].is_null());
    }

    #[test]
    fn test_category_json_keeps_cursor() {
        let mut page = CategoryPage {
            category_id: "4".to_string(),
            ..CategoryPage::default()
        };
        page.cursor.offset = 20;
        page.cursor.has_more = false;

        let value: Value =
            serde_json::from_str(&page_to_json(&Page::Category(page)).unwrap()).unwrap();
        assert_eq!(value["cursor"]["offset"], 20);
        assert_eq!(value["cursor"]["has_more"], false);
    }
}
