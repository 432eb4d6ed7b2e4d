//! De-duplicating feed allocation.
//!
//! A page is built from one or more pools fetched in a single request each.
//! Sections draw exact counts from a pool in a fixed order, and a page-wide
//! [`SeenIds`] set guarantees that no article appears in two sections.
//!
//! # Submodules
//!
//! - [`cursor`]: per-section pagination cursor and the "load more"
//!   continuation with bounded retry
//! - [`session`]: page-scoped state (seen ids, cursors, busy flags) shared
//!   between concurrently running continuations

pub mod cursor;
pub mod session;

use crate::models::{NewsItem, RawRecord};
use crate::normalize::lookup;
use std::collections::{HashSet, VecDeque};

pub use cursor::{extend_section, Cursor, Extension, FeedQuery, FeedSource, SectionPlan};
pub use session::{PageSession, Section, SharedSession};

/// Anything that carries a numeric de-duplication key.
pub trait Identified {
    /// `0` marks an unidentified record.
    fn feed_id(&self) -> i64;
}

impl Identified for NewsItem {
    fn feed_id(&self) -> i64 {
        self.id
    }
}

impl Identified for RawRecord {
    fn feed_id(&self) -> i64 {
        lookup::int(self, &["id", "id_berita"], 0)
    }
}

/// Ids already allocated to a section of the current page.
///
/// The unidentified id `0` is never recorded, so unidentified records are
/// never filtered out.
#[derive(Debug, Clone, Default)]
pub struct SeenIds(HashSet<i64>);

impl SeenIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`; returns `false` if it was already present or is `0`.
    pub fn register(&mut self, id: i64) -> bool {
        id != 0 && self.0.insert(id)
    }

    pub fn register_item<T: Identified>(&mut self, item: &T) -> bool {
        self.register(item.feed_id())
    }

    pub fn contains(&self, id: i64) -> bool {
        id != 0 && self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Forget everything; called at the start of every full page render.
    pub fn reset(&mut self) {
        self.0.clear();
    }
}

/// Pop records from the front of `pool` until `count` unseen ones are
/// collected or the pool runs dry.
///
/// Every popped record is consumed, whether it was taken or skipped. Taken
/// records are registered in `seen` immediately, so duplicates inside the
/// pool itself are skipped too.
pub fn take_unique<T: Identified>(
    pool: &mut VecDeque<T>,
    count: usize,
    seen: &mut SeenIds,
) -> Vec<T> {
    let mut found = Vec::with_capacity(count);
    while found.len() < count {
        let Some(item) = pool.pop_front() else {
            break;
        };
        if !seen.contains(item.feed_id()) {
            seen.register_item(&item);
            found.push(item);
        }
    }
    found
}

/// A single-consumption queue of records from one fetch, with bookkeeping
/// for the continuation offset.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    items: VecDeque<T>,
    returned: usize,
    consumed: usize,
}

impl<T: Identified> Pool<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            returned: items.len(),
            items: items.into(),
            consumed: 0,
        }
    }

    pub fn take_unique(&mut self, count: usize, seen: &mut SeenIds) -> Vec<T> {
        let before = self.items.len();
        let found = take_unique(&mut self.items, count, seen);
        self.consumed += before - self.items.len();
        found
    }

    pub fn take_one(&mut self, seen: &mut SeenIds) -> Option<T> {
        self.take_unique(1, seen).into_iter().next()
    }

    /// Records popped so far, taken or skipped.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    /// Cursor for continuing after this pool.
    ///
    /// The offset is the number of consumed records, not the number placed
    /// into sections. The cursor starts exhausted only when upstream returned
    /// less than `requested` and nothing is left unscanned.
    pub fn continuation(&self, requested: usize) -> Cursor {
        let upstream_short = self.returned < requested;
        Cursor {
            offset: self.consumed,
            has_more: !(upstream_short && self.items.is_empty()),
        }
    }
}
