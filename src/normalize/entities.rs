//! Per-entity field tables and mapping functions.

use super::image::reconstruct_cover;
use super::lookup::{first_truthy, get_path, int, opt_int, opt_text, text};
use crate::models::{
    Ad, Author, Category, CategoryRef, Channel, ChannelRef, Comment, GalleryItem, Link, NewsItem,
    Newsletter, Photo, Poll, PollOption, StaticPage,
};
use crate::utils::{kebab_case, strip_html};
use serde_json::Value;

const SUMMARY_CHARS: usize = 160;
const LEGACY_POLL_SLOTS: usize = 6;

const NEWS_ID: &[&str] = &["id", "id_berita"];
const TITLE: &[&str] = &["title", "judul"];
const CONTENT: &[&str] = &["isi", "content"];
const COVER_CREDIT: &[&str] = &["caption", "cover_credit"];
const CREATED_AT: &[&str] = &["created_at", "tanggal_tayang"];
const PUBLISHED_AT: &[&str] = &["published_at", "tanggal_tayang"];
const VIEWS: &[&str] = &["views", "counter"];
const AUTHOR_OBJECT: &[&str] = &["datawartawan", "author", "quartawan"];
const CHANNEL_ID: &[&str] = &["id_channel", "channel_id", "channel.id", "datachannel.id", "cid"];
const CHANNEL_NAME: &[&str] = &["channel.name", "datachannel.nama"];
const CATEGORY_ID: &[&str] = &["category.id", "id_categories"];
const CATEGORY_NAME: &[&str] = &["category.name", "datakategori.nama"];
const NAME: &[&str] = &["nama", "name"];
const GALLERY_TITLE: &[&str] = &["judul", "title"];
const GALLERY_IMAGE: &[&str] = &["gambar", "image"];

/// Map one raw article record, legacy or modern, onto [`NewsItem`].
///
/// Every field is looked up through its candidate key list, first truthy
/// value wins. The cover is rebuilt from whichever image key is present.
/// Category and channel slugs are kebab-cased from their names when the
/// record carries none.
///
/// # Arguments
///
/// * `raw` - A record as returned by `/berita`, `/headline`, `/populer` or
///   `/terkait`
///
/// # Returns
///
/// A fully populated `NewsItem`. Missing fields fall back to empty strings,
/// `0`, or `"Umum"` for the category name; this never fails.
///
/// # Examples
///
/// ```ignore
/// let raw = json!({ "id_berita": 7, "judul": "Banjir", "tag": "cuaca, jakarta" });
/// let item = news_item(&raw);
/// assert_eq!(item.title, "Banjir");
/// assert_eq!(item.tags, vec!["cuaca", "jakarta"]);
/// ```
pub fn news_item(raw: &Value) -> NewsItem {
    let channel_id = int(raw, CHANNEL_ID, 0);
    let channel_name = text(raw, CHANNEL_NAME, "");
    let category_name = opt_text(raw, CATEGORY_NAME)
        .or_else(|| Some(channel_name.clone()).filter(|name| !name.is_empty()))
        .unwrap_or_else(|| "Umum".to_string());

    let cover = reconstruct_cover(raw, channel_id);
    let image = Some(cover.clone()).filter(|c| !c.is_empty());

    let author = first_truthy(raw, AUTHOR_OBJECT)
        .map(author)
        .unwrap_or_default();

    let gallery = match get_path(raw, "datagallery") {
        Some(Value::Array(items)) => items.iter().map(gallery_item).collect(),
        _ => Vec::new(),
    };

    NewsItem {
        id: int(raw, NEWS_ID, 0),
        title: text(raw, TITLE, ""),
        slug: text(raw, &["slug"], ""),
        summary: summary(raw),
        content: text(raw, CONTENT, ""),
        cover,
        image,
        cover_credit: text(raw, COVER_CREDIT, ""),
        created_at: text(raw, CREATED_AT, ""),
        updated_at: text(raw, &["updated_at"], ""),
        published_at: text(raw, PUBLISHED_AT, ""),
        views: int(raw, VIEWS, 0),
        tags: tags(raw),
        category: CategoryRef {
            id: int(raw, CATEGORY_ID, 0),
            slug: opt_text(raw, &["category.slug"]).unwrap_or_else(|| kebab_case(&category_name)),
            name: category_name,
        },
        author,
        channel: ChannelRef {
            id: channel_id,
            slug: opt_text(raw, &["channel.slug"]).unwrap_or_else(|| kebab_case(&channel_name)),
            name: channel_name,
        },
        editor: text(raw, &["penulis"], ""),
        journalist: text(raw, &["wartawan"], ""),
        gallery,
    }
}

fn summary(raw: &Value) -> String {
    if let Some(summary) = opt_text(raw, &["summary"]) {
        return summary;
    }
    opt_text(raw, &["isi"])
        .map(|html| strip_html(&html).chars().take(SUMMARY_CHARS).collect())
        .unwrap_or_default()
}

/// `tags` array verbatim, else the comma-separated `tag` string.
fn tags(raw: &Value) -> Vec<String> {
    match first_truthy(raw, &["tags"]) {
        Some(Value::Array(items)) => items.iter().filter_map(super::lookup::as_text).collect(),
        Some(Value::String(joined)) => split_tags(joined),
        _ => opt_text(raw, &["tag"])
            .map(|joined| split_tags(&joined))
            .unwrap_or_default(),
    }
}

fn split_tags(joined: &str) -> Vec<String> {
    joined.split(',').map(|t| t.trim().to_string()).collect()
}

/// Journalist record; unnamed authors become `"Redaksi"`.
pub fn author(raw: &Value) -> Author {
    Author {
        id: int(raw, &["id"], 0),
        name: text(raw, NAME, "Redaksi"),
        avatar: text(raw, &["avatar"], ""),
        bio: text(raw, &["bio"], ""),
        status: text(raw, &["status"], ""),
    }
}

/// Category with a derived slug when the CMS omits one.
pub fn category(raw: &Value) -> Category {
    let name = text(raw, NAME, "Umum");
    Category {
        id: int(raw, &["id"], 0),
        slug: opt_text(raw, &["slug"]).unwrap_or_else(|| kebab_case(&name)),
        name,
    }
}

/// Channel record. `tipe`, `navigasi` and `urut` are kept as sent.
pub fn channel(raw: &Value) -> Channel {
    let name = text(raw, NAME, "");
    Channel {
        id: int(raw, &["id"], 0),
        slug: opt_text(raw, &["slug"]).unwrap_or_else(|| kebab_case(&name)),
        name,
        kind: opt_text(raw, &["tipe"]),
        navigation: opt_text(raw, &["navigasi"]),
        order: opt_int(raw, &["urut"]),
    }
}

pub fn gallery_item(raw: &Value) -> GalleryItem {
    GalleryItem {
        id: int(raw, &["id"], 0),
        title: text(raw, GALLERY_TITLE, ""),
        article_id: opt_int(raw, &["id_berita"]),
        image: text(raw, GALLERY_IMAGE, ""),
        created_at: opt_text(raw, &["created_at"]),
    }
}

pub fn photo(raw: &Value) -> Photo {
    Photo {
        id: int(raw, &["id"], 0),
        title: text(raw, &["judul"], ""),
        token: text(raw, &["token"], ""),
        image: text(raw, &["gambar"], ""),
        created_at: opt_text(raw, &["created_at"]),
    }
}

/// Reader comment. Only `publish == "1"` counts as published.
pub fn comment(raw: &Value) -> Comment {
    Comment {
        id: int(raw, &["id"], 0),
        name: text(raw, &["nama"], ""),
        email: text(raw, &["email"], ""),
        comment: text(raw, &["komentar"], ""),
        article_id: opt_int(raw, &["id_berita"]),
        channel_id: opt_int(raw, &["id_channel"]),
        category_id: opt_int(raw, &["id_categories"]),
        is_published: opt_text(raw, &["publish"]).is_some_and(|flag| flag == "1"),
        date: text(raw, &["tanggal"], ""),
    }
}

pub fn static_page(raw: &Value) -> StaticPage {
    StaticPage {
        id: int(raw, &["id"], 0),
        title: text(raw, &["judul"], ""),
        content: text(raw, &["isi"], ""),
        channel_id: opt_int(raw, &["id_channel"]),
        category_id: opt_int(raw, &["id_categories"]),
        created_at: opt_text(raw, &["created_at"]),
    }
}

/// Ad slot ("iklan") with its scheduling window.
pub fn ad(raw: &Value) -> Ad {
    Ad {
        id: int(raw, &["id"], 0),
        name: text(raw, &["nama"], ""),
        kind: text(raw, &["jenis"], ""),
        position: text(raw, &["posisi"], ""),
        status: text(raw, &["status"], ""),
        order: int(raw, &["urutan"], 0),
        start_date: text(raw, &["awal_tayang"], ""),
        end_date: text(raw, &["akhir_tayang"], ""),
        image: opt_text(raw, &["gambar"]),
        url: opt_text(raw, &["url"]),
    }
}

pub fn link(raw: &Value) -> Link {
    Link {
        id: int(raw, &["id"], 0),
        name: text(raw, &["nama"], ""),
        url: text(raw, &["url"], ""),
        channel_id: opt_int(raw, &["id_channel"]),
        category_id: opt_int(raw, &["id_categories"]),
    }
}

pub fn newsletter(raw: &Value) -> Newsletter {
    Newsletter {
        id: int(raw, &["id"], 0),
        email: text(raw, &["email"], ""),
        channel_id: opt_int(raw, &["id_channel"]),
        status: text(raw, &["stts"], ""),
    }
}

/// Map a poll record onto [`Poll`].
///
/// Structured `options` win outright; legacy `answerN`/`voteN` slots are
/// only scanned when that array is missing or empty. Empty legacy slots are
/// skipped.
///
/// # Arguments
///
/// * `raw` - A `/polling` list entry or detail record
///
/// # Returns
///
/// The poll with its options in slot order. `total_votes` is taken from the
/// record and is not recomputed from the options.
pub fn poll(raw: &Value) -> Poll {
    let mut options: Vec<PollOption> = match get_path(raw, "options") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|opt| PollOption {
                id: int(opt, &["id"], 0),
                label: text(opt, &["label"], ""),
                votes: int(opt, &["votes"], 0),
            })
            .collect(),
        _ => Vec::new(),
    };

    if options.is_empty() {
        for slot in 1..=LEGACY_POLL_SLOTS {
            let answer_key = format!("answer{slot}");
            let vote_key = format!("vote{slot}");
            if let Some(label) = opt_text(raw, &[answer_key.as_str()]) {
                options.push(PollOption {
                    id: slot as i64,
                    label,
                    votes: int(raw, &[vote_key.as_str()], 0),
                });
            }
        }
    }

    Poll {
        id: int(raw, &["id"], 0),
        title: text(raw, &["title"], ""),
        question: text(raw, &["question"], ""),
        total_votes: int(raw, &["total_votes"], 0),
        options,
        created_at: opt_text(raw, &["created_at"]),
    }
}
