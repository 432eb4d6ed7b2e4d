//! "Load more" continuation for a single page section.
//!
//! Each section keeps a [`Cursor`] into the upstream listing. A continuation
//! over-fetches a batch, keeps at most `quota` records that were not shown
//! anywhere on the page yet, and advances the cursor by the batch size that
//! was requested. A full batch that yields nothing new is retried from the
//! advanced cursor, up to [`MAX_ATTEMPTS`] fetches in total.
//!
//! # State
//!
//! A cursor is `ACTIVE` (`has_more`) until upstream returns a short batch,
//! after which it is `EXHAUSTED` for the rest of the page view.

use super::{take_unique, Identified, SeenIds};
use crate::error::ApiError;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, instrument, warn};

/// Upper bound on fetches per continuation.
pub const MAX_ATTEMPTS: usize = 5;

/// Pagination bookkeeping of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cursor {
    pub offset: usize,
    pub has_more: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            offset: 0,
            has_more: true,
        }
    }
}

impl Cursor {
    pub fn at(offset: usize) -> Self {
        Self {
            offset,
            has_more: true,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        !self.has_more
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// How many items a continuation shows and how many it fetches to find them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionPlan {
    pub quota: usize,
    pub batch_size: usize,
}

/// Upstream filters of a section's listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    pub kategori: Option<String>,
    pub channel: Option<String>,
    pub penulis: Option<String>,
    pub q: Option<String>,
}

/// Outcome of one continuation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "items", rename_all = "snake_case")]
pub enum Extension<T> {
    /// 1..=quota new items; more may follow.
    Found(Vec<T>),
    /// Upstream ran out; 0..=quota new items; no further continuation.
    Exhausted(Vec<T>),
    /// Every attempt returned a full batch of already shown items. The
    /// cursor stays active so the reader can retry by hand.
    RetryBudgetExceeded,
}

impl<T> Extension<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Extension::Found(items) | Extension::Exhausted(items) => items,
            Extension::RetryBudgetExceeded => &[],
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Extension::Found(items) | Extension::Exhausted(items) => items,
            Extension::RetryBudgetExceeded => Vec::new(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Extension::Exhausted(_))
    }
}

/// A paginated upstream listing.
pub trait FeedSource {
    type Item: Identified;

    /// Fetch up to `limit` records starting at `offset`.
    async fn fetch_batch(
        &self,
        query: &FeedQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Self::Item>, ApiError>;
}

pub(crate) enum Step<T> {
    Done(Extension<T>),
    Retry,
}

/// Fold one fetched batch into the cursor and seen set.
pub(crate) fn absorb_batch<T: Identified>(
    cursor: &mut Cursor,
    seen: &mut SeenIds,
    batch: Vec<T>,
    plan: SectionPlan,
) -> Step<T> {
    let returned = batch.len();
    cursor.offset += plan.batch_size;

    let mut batch: VecDeque<T> = batch.into();
    let fresh = take_unique(&mut batch, plan.quota, seen);

    if returned < plan.batch_size {
        cursor.has_more = false;
        Step::Done(Extension::Exhausted(fresh))
    } else if fresh.is_empty() {
        Step::Retry
    } else {
        Step::Done(Extension::Found(fresh))
    }
}

/// One fetch-and-fold round of a continuation.
///
/// Implemented once for an exclusively borrowed cursor ([`extend_section`])
/// and once for a cursor that lives in a shared page session, so both run
/// through the same [`run_attempts`] budget.
pub(crate) trait Continuation {
    type Item;
    type Error;

    async fn step(&mut self) -> Result<Step<Self::Item>, Self::Error>;
}

/// Drive `continuation` until a step settles or [`MAX_ATTEMPTS`] fetches
/// have been spent.
pub(crate) async fn run_attempts<C: Continuation>(
    continuation: &mut C,
) -> Result<Extension<C::Item>, C::Error> {
    for attempt in 1..=MAX_ATTEMPTS {
        match continuation.step().await? {
            Step::Done(extension) => return Ok(extension),
            Step::Retry => debug!(attempt, "Full batch had no unseen items; retrying"),
        }
    }

    warn!(
        attempts = MAX_ATTEMPTS,
        "Retry budget exceeded without finding unseen items"
    );
    Ok(Extension::RetryBudgetExceeded)
}

struct LocalContinuation<'a, S> {
    source: &'a S,
    query: &'a FeedQuery,
    cursor: &'a mut Cursor,
    seen: &'a mut SeenIds,
    plan: SectionPlan,
}

impl<S: FeedSource> Continuation for LocalContinuation<'_, S> {
    type Item = S::Item;
    type Error = ApiError;

    async fn step(&mut self) -> Result<Step<S::Item>, ApiError> {
        let batch = self
            .source
            .fetch_batch(self.query, self.cursor.offset, self.plan.batch_size)
            .await?;
        Ok(absorb_batch(&mut *self.cursor, &mut *self.seen, batch, self.plan))
    }
}

/// Extend a section with at most `plan.quota` items not yet on the page.
///
/// A fetch error is returned as-is and leaves the cursor where the failed
/// fetch started. An exhausted cursor short-circuits without fetching.
///
/// # Arguments
///
/// * `source` - Listing to fetch batches from
/// * `query` - Upstream filters of the section
/// * `cursor` - The section's cursor; advanced by `plan.batch_size` per fetch
/// * `seen` - Ids already on the page; fresh items are registered here
/// * `plan` - Quota and over-fetch batch size
///
/// # Returns
///
/// [`Extension::Found`], [`Extension::Exhausted`] or
/// [`Extension::RetryBudgetExceeded`] after [`MAX_ATTEMPTS`] full batches
/// without anything new.
#[instrument(level = "debug", skip_all, fields(offset = cursor.offset, quota = plan.quota))]
pub async fn extend_section<S: FeedSource>(
    source: &S,
    query: &FeedQuery,
    cursor: &mut Cursor,
    seen: &mut SeenIds,
    plan: SectionPlan,
) -> Result<Extension<S::Item>, ApiError> {
    if cursor.is_exhausted() {
        return Ok(Extension::Exhausted(Vec::new()));
    }

    run_attempts(&mut LocalContinuation {
        source,
        query,
        cursor,
        seen,
        plan,
    })
    .await
}
