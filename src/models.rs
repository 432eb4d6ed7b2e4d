//! Canonical entity shapes produced by the normalizer.
//!
//! The CMS API returns records whose field names drift between legacy
//! (Indonesian) and modern versions. Everything downstream of
//! [`crate::normalize`] only ever sees the types in this module:
//! - [`NewsItem`] with its nested [`CategoryRef`], [`ChannelRef`] and [`Author`]
//! - listing entities: [`Category`], [`Channel`], [`GalleryItem`], [`Photo`],
//!   [`Comment`], [`StaticPage`], [`Ad`], [`Link`], [`Newsletter`], [`Poll`]
//! - the [`Envelope`] every API response is wrapped in
//!
//! Every field has a concrete default so rendering code never deals with
//! missing values.

use crate::normalize::lookup::{as_text, is_truthy, opt_int};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Untyped entity payload as returned by the CMS.
pub type RawRecord = Value;

/// A news article.
///
/// `id` is the de-duplication key of the feed allocator; `0` means the raw
/// record carried no identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: String,
    /// Article body as HTML.
    pub content: String,
    /// Cover path fragment or absolute URL; empty when nothing resolved.
    pub cover: String,
    /// Same as `cover`, `None` when empty.
    pub image: Option<String>,
    pub cover_credit: String,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: String,
    pub views: i64,
    pub tags: Vec<String>,
    pub category: CategoryRef,
    pub author: Author,
    pub channel: ChannelRef,
    pub editor: String,
    pub journalist: String,
    pub gallery: Vec<GalleryItem>,
}

/// Category summary embedded in a [`NewsItem`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Channel summary embedded in a [`NewsItem`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// A journalist ("wartawan").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub avatar: String,
    pub bio: String,
    pub status: String,
}

impl Default for Author {
    fn default() -> Self {
        Self {
            id: 0,
            name: "Redaksi".to_string(),
            avatar: String::new(),
            bio: String::new(),
            status: String::new(),
        }
    }
}

/// A category ("kategori") listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// A channel listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub kind: Option<String>,
    pub navigation: Option<String>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: i64,
    pub title: String,
    pub article_id: Option<i64>,
    pub image: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub title: String,
    pub token: String,
    pub image: String,
    pub created_at: Option<String>,
}

/// A reader comment ("komentar").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub comment: String,
    pub article_id: Option<i64>,
    pub channel_id: Option<i64>,
    pub category_id: Option<i64>,
    pub is_published: bool,
    pub date: String,
}

/// A static page ("statis"), e.g. the editorial board or opinion columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPage {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub channel_id: Option<i64>,
    pub category_id: Option<i64>,
    pub created_at: Option<String>,
}

/// An advertisement slot ("iklan").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub position: String,
    pub status: String,
    pub order: i64,
    pub start_date: String,
    pub end_date: String,
    pub image: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub channel_id: Option<i64>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Newsletter {
    pub id: i64,
    pub email: String,
    pub channel_id: Option<i64>,
    pub status: String,
}

/// A reader poll ("polling").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: i64,
    pub title: String,
    pub question: String,
    pub total_votes: i64,
    pub options: Vec<PollOption>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: i64,
    pub label: String,
    pub votes: i64,
}

/// The entity kinds the normalizer knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    News,
    Category,
    Channel,
    Author,
    Gallery,
    Photo,
    Comment,
    StaticPage,
    Ad,
    Link,
    Newsletter,
    Poll,
}

/// One normalized entity of any [`EntityKind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entity", rename_all = "camelCase")]
pub enum Entity {
    News(NewsItem),
    Category(Category),
    Channel(Channel),
    Author(Author),
    Gallery(GalleryItem),
    Photo(Photo),
    Comment(Comment),
    StaticPage(StaticPage),
    Ad(Ad),
    Link(Link),
    Newsletter(Newsletter),
    Poll(Poll),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::News(_) => EntityKind::News,
            Entity::Category(_) => EntityKind::Category,
            Entity::Channel(_) => EntityKind::Channel,
            Entity::Author(_) => EntityKind::Author,
            Entity::Gallery(_) => EntityKind::Gallery,
            Entity::Photo(_) => EntityKind::Photo,
            Entity::Comment(_) => EntityKind::Comment,
            Entity::StaticPage(_) => EntityKind::StaticPage,
            Entity::Ad(_) => EntityKind::Ad,
            Entity::Link(_) => EntityKind::Link,
            Entity::Newsletter(_) => EntityKind::Newsletter,
            Entity::Poll(_) => EntityKind::Poll,
        }
    }
}

/// Response envelope shared by every CMS endpoint.
///
/// `data` stays raw here; the client normalizes it according to the
/// endpoint's entity kind. The other members are read as leniently as the
/// records themselves: a `message` or `meta` of an unexpected shape is
/// dropped instead of failing the whole response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Envelope {
    /// Only an explicit boolean counts; only `false` is a failure.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub success: Option<bool>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default, deserialize_with = "lenient_meta")]
    pub meta: Option<Meta>,
}

/// Pagination metadata attached to list responses.
///
/// Numbers and numeric strings are both accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Meta {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub total: Option<i64>,
    pub total_pages: Option<i64>,
}

impl Meta {
    fn from_raw(raw: &Value) -> Option<Meta> {
        if !raw.is_object() {
            return None;
        }
        Some(Meta {
            page: opt_int(raw, &["page"]),
            limit: opt_int(raw, &["limit"]),
            total: opt_int(raw, &["total"]),
            total_pages: opt_int(raw, &["total_pages"]),
        })
    }
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_bool())
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(Some(&value).filter(|v| is_truthy(v)).and_then(as_text))
}

fn lenient_meta<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Meta>, D::Error> {
    Ok(Meta::from_raw(&Value::deserialize(deserializer)?))
}
