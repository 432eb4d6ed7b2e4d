//! Raw CMS records → canonical entities.
//!
//! The normalizer is a total, pure function: any JSON value maps to exactly
//! one entity of the requested [`EntityKind`], with missing or malformed
//! fields degraded to documented defaults. Sequences are mapped element-wise
//! and keep their length and order.
//!
//! # Submodules
//!
//! - [`lookup`]: first-match-wins candidate key resolution
//! - [`image`]: two-pass cover image reconstruction
//! - [`entities`]: field tables and mapping per entity

pub mod entities;
pub mod image;
pub mod lookup;

use crate::models::{
    Ad, Author, Category, Channel, Comment, Entity, EntityKind, GalleryItem, Link, NewsItem,
    Newsletter, Photo, Poll, RawRecord, StaticPage,
};

/// Typed entry point used by the API client to normalize straight into a
/// concrete entity type.
pub trait FromRaw: Sized {
    const KIND: EntityKind;

    fn from_raw(raw: &RawRecord) -> Self;
}

macro_rules! impl_from_raw {
    ($($ty:ty => $kind:ident, $map:path;)*) => {
        $(
            impl FromRaw for $ty {
                const KIND: EntityKind = EntityKind::$kind;

                fn from_raw(raw: &RawRecord) -> Self {
                    $map(raw)
                }
            }
        )*
    };
}

impl_from_raw! {
    NewsItem => News, entities::news_item;
    Category => Category, entities::category;
    Channel => Channel, entities::channel;
    Author => Author, entities::author;
    GalleryItem => Gallery, entities::gallery_item;
    Photo => Photo, entities::photo;
    Comment => Comment, entities::comment;
    StaticPage => StaticPage, entities::static_page;
    Ad => Ad, entities::ad;
    Link => Link, entities::link;
    Newsletter => Newsletter, entities::newsletter;
    Poll => Poll, entities::poll;
}

/// Map one raw record to an entity of the requested kind.
pub fn normalize(raw: &RawRecord, kind: EntityKind) -> Entity {
    match kind {
        EntityKind::News => Entity::News(NewsItem::from_raw(raw)),
        EntityKind::Category => Entity::Category(Category::from_raw(raw)),
        EntityKind::Channel => Entity::Channel(Channel::from_raw(raw)),
        EntityKind::Author => Entity::Author(Author::from_raw(raw)),
        EntityKind::Gallery => Entity::Gallery(GalleryItem::from_raw(raw)),
        EntityKind::Photo => Entity::Photo(Photo::from_raw(raw)),
        EntityKind::Comment => Entity::Comment(Comment::from_raw(raw)),
        EntityKind::StaticPage => Entity::StaticPage(StaticPage::from_raw(raw)),
        EntityKind::Ad => Entity::Ad(Ad::from_raw(raw)),
        EntityKind::Link => Entity::Link(Link::from_raw(raw)),
        EntityKind::Newsletter => Entity::Newsletter(Newsletter::from_raw(raw)),
        EntityKind::Poll => Entity::Poll(Poll::from_raw(raw)),
    }
}

/// Element-wise [`normalize`]; never drops an element.
pub fn normalize_all(raws: &[RawRecord], kind: EntityKind) -> Vec<Entity> {
    raws.iter().map(|raw| normalize(raw, kind)).collect()
}

/// Element-wise [`FromRaw::from_raw`].
pub fn normalize_many<T: FromRaw>(raws: &[RawRecord]) -> Vec<T> {
    raws.iter().map(T::from_raw).collect()
}
