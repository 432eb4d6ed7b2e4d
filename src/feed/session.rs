//! Page-scoped allocation state.
//!
//! A [`PageSession`] owns the seen-id set and the continuation cursors of
//! one page view. [`SharedSession`] puts it behind an async mutex so that
//! "load more" on different sections can run concurrently: the lock is only
//! held while reading or folding state, never across a network fetch. A
//! per-section busy flag keeps at most one continuation in flight per
//! section, and a generation counter stops a slow response from writing into
//! a page that has since been re-rendered.

use super::cursor::{
    absorb_batch, run_attempts, Continuation, Cursor, Extension, FeedQuery, FeedSource, SectionPlan,
    Step,
};
use super::{Identified, SeenIds};
use crate::error::FeedError;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, instrument, warn};

/// Sections that support "load more".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Home timeline ("Berita Terkini").
    Latest,
    /// Home "Berita Utama" list.
    BeritaUtama,
    /// Category page main list.
    Category,
    /// Search results.
    Search,
}

impl Section {
    pub fn name(self) -> &'static str {
        match self {
            Section::Latest => "latest",
            Section::BeritaUtama => "berita_utama",
            Section::Category => "category",
            Section::Search => "search",
        }
    }

    /// Items shown per continuation and the over-fetch batch used to find them.
    pub fn plan(self) -> SectionPlan {
        match self {
            Section::Latest | Section::BeritaUtama => SectionPlan {
                quota: 5,
                batch_size: 20,
            },
            Section::Category => SectionPlan {
                quota: 12,
                batch_size: 24,
            },
            Section::Search => SectionPlan {
                quota: 10,
                batch_size: 20,
            },
        }
    }
}

#[derive(Debug, Clone)]
struct SectionState {
    cursor: Cursor,
    query: FeedQuery,
    plan: SectionPlan,
    busy: bool,
}

/// Seen ids and cursors of the current page view.
#[derive(Debug, Default)]
pub struct PageSession {
    seen: SeenIds,
    sections: HashMap<Section, SectionState>,
    generation: u64,
}

impl PageSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new page view: forget seen ids and drop every cursor.
    pub fn reset(&mut self) {
        self.seen.reset();
        self.sections.clear();
        self.generation += 1;
    }

    pub fn seen(&self) -> &SeenIds {
        &self.seen
    }

    pub fn seen_mut(&mut self) -> &mut SeenIds {
        &mut self.seen
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Register a continuable section with its initial cursor.
    pub fn open_section(&mut self, section: Section, query: FeedQuery, cursor: Cursor) {
        self.sections.insert(
            section,
            SectionState {
                cursor,
                query,
                plan: section.plan(),
                busy: false,
            },
        );
    }

    pub fn cursor(&self, section: Section) -> Option<Cursor> {
        self.sections.get(&section).map(|state| state.cursor)
    }

    pub fn is_busy(&self, section: Section) -> bool {
        self.sections.get(&section).is_some_and(|state| state.busy)
    }

    /// Sections of this page that can still be extended.
    pub fn active_sections(&self) -> Vec<Section> {
        let mut active: Vec<Section> = self
            .sections
            .iter()
            .filter(|(_, state)| !state.cursor.is_exhausted())
            .map(|(section, _)| *section)
            .collect();
        active.sort_by_key(|section| section.name());
        active
    }
}

/// A [`PageSession`] shared between concurrently running continuations.
#[derive(Debug, Clone, Default)]
pub struct SharedSession(Arc<Mutex<PageSession>>);

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> MutexGuard<'_, PageSession> {
        self.0.lock().await
    }

    /// "Load more" for `section`.
    ///
    /// Fails with [`FeedError::Busy`] while another continuation of the same
    /// section is in flight and with [`FeedError::Superseded`] when the page
    /// was reset before the response arrived. The busy flag is cleared on
    /// every exit, so a failed attempt can be retried.
    #[instrument(level = "info", skip_all, fields(section = section.name()))]
    pub async fn load_more<S: FeedSource>(
        &self,
        source: &S,
        section: Section,
    ) -> Result<Extension<S::Item>, FeedError> {
        let (query, plan, generation) = {
            let mut session = self.lock().await;
            let generation = session.generation;
            let state = session
                .sections
                .get_mut(&section)
                .ok_or(FeedError::UnknownSection(section.name()))?;
            if state.cursor.is_exhausted() {
                return Ok(Extension::Exhausted(Vec::new()));
            }
            if state.busy {
                return Err(FeedError::Busy(section.name()));
            }
            state.busy = true;
            (state.query.clone(), state.plan, generation)
        };

        let result = run_attempts(&mut SessionContinuation {
            shared: self,
            source,
            section,
            query,
            plan,
            generation,
        })
        .await;

        {
            let mut session = self.lock().await;
            if session.generation == generation {
                if let Some(state) = session.sections.get_mut(&section) {
                    state.busy = false;
                }
            }
        }

        match &result {
            Ok(extension) => info!(
                items = extension.items().len(),
                exhausted = extension.is_exhausted(),
                "Section extended"
            ),
            Err(e) => warn!(error = %e, "Section continuation failed"),
        }
        result
    }

    /// Offset of `section`, provided the page is still the one that
    /// started the continuation.
    async fn offset_for(&self, section: Section, generation: u64) -> Result<usize, FeedError> {
        let session = self.lock().await;
        if session.generation != generation {
            return Err(FeedError::Superseded(section.name()));
        }
        session
            .sections
            .get(&section)
            .map(|state| state.cursor.offset)
            .ok_or(FeedError::UnknownSection(section.name()))
    }

    /// Fold a fetched batch into the section's cursor and the page's seen
    /// set, unless the page was reset while the batch was in flight.
    async fn absorb<T: Identified>(
        &self,
        section: Section,
        generation: u64,
        batch: Vec<T>,
        plan: SectionPlan,
    ) -> Result<Step<T>, FeedError> {
        let mut guard = self.lock().await;
        let session = &mut *guard;
        if session.generation != generation {
            return Err(FeedError::Superseded(section.name()));
        }
        let state = session
            .sections
            .get_mut(&section)
            .ok_or(FeedError::UnknownSection(section.name()))?;
        Ok(absorb_batch(&mut state.cursor, &mut session.seen, batch, plan))
    }
}

/// Continuation whose cursor lives in a [`SharedSession`]. The lock is taken
/// to read the offset and again to fold the batch, never across the fetch.
struct SessionContinuation<'a, S> {
    shared: &'a SharedSession,
    source: &'a S,
    section: Section,
    query: FeedQuery,
    plan: SectionPlan,
    generation: u64,
}

impl<S: FeedSource> Continuation for SessionContinuation<'_, S> {
    type Item = S::Item;
    type Error = FeedError;

    async fn step(&mut self) -> Result<Step<S::Item>, FeedError> {
        let offset = self.shared.offset_for(self.section, self.generation).await?;
        let batch = self
            .source
            .fetch_batch(&self.query, offset, self.plan.batch_size)
            .await?;
        self.shared
            .absorb(self.section, self.generation, batch, self.plan)
            .await
    }
}
