//! Page assembly.
//!
//! Each page fans its API calls out concurrently, then hands the results to
//! a pure `assemble_*` function that distributes articles over the page's
//! sections through the shared [`PageSession`]. Only a missing primary
//! record (article, journalist) is fatal; every other failed fetch renders
//! as an empty section with a logged warning.

use crate::api::{CmsClient, ListQuery};
use crate::error::{ApiError, PageError};
use crate::feed::{Cursor, FeedQuery, FeedSource, PageSession, Pool, Section, SharedSession};
use crate::models::{Author, Category, Comment, GalleryItem, NewsItem, Photo, Poll, StaticPage};
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, instrument, warn};

const HOME_POOL: usize = 60;
const HOME_POPULAR: usize = 15;
const POPULAR_SIDEBAR: usize = 2;
const POPULAR_MOBILE: usize = 5;
const TRENDING_CHUNK: usize = 5;

const CATEGORY_POOL: usize = 20;

const SEARCH_POOL: usize = 20;
const SEARCH_FIRST: usize = 10;

const RELATED_LIMIT: usize = 6;
const RELATED_COLUMN: usize = 3;
const COMMENT_LIMIT: usize = 10;
const ARTICLE_POPULAR: usize = 7;
const ALSO_READ: usize = 2;
const ARTICLE_POPULAR_LIST: usize = 5;

const AUTHOR_ARTICLES: usize = 12;
const GALLERY_PHOTOS: usize = 12;
const GALLERY_ALBUMS: usize = 8;

/// Link label shown on the full-page error.
pub const BACK_HOME: &str = "Kembali ke Beranda";

fn or_empty<T: Default>(result: Result<T, ApiError>, section: &'static str) -> T {
    result.unwrap_or_else(|e| {
        warn!(section, error = %e, "Section fetch failed; rendering it empty");
        T::default()
    })
}

/// `Some` on success; a failure is logged and reported as `None` so the
/// caller can keep the section open for a later retry.
fn fetched<T>(result: Result<T, ApiError>, section: &'static str) -> Option<T> {
    result
        .inspect_err(|e| warn!(section, error = %e, "Pool fetch failed; section stays open for retry"))
        .ok()
}

/// Continuation cursor of a pool, or a fresh active cursor when the pool
/// could not be fetched at all.
fn pool_cursor(pool: &Pool<NewsItem>, fetched: bool, requested: usize) -> Cursor {
    if fetched {
        pool.continuation(requested)
    } else {
        Cursor::at(0)
    }
}

fn head(items: &[NewsItem], n: usize) -> &[NewsItem] {
    &items[..items.len().min(n)]
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HomePage {
    pub headline: Option<NewsItem>,
    pub secondary: Option<NewsItem>,
    pub featured: Vec<NewsItem>,
    pub latest: Vec<NewsItem>,
    pub berita_utama: Vec<NewsItem>,
    /// Shown as returned; never de-duplicated against the rest of the page.
    pub popular: Vec<NewsItem>,
    pub latest_cursor: Cursor,
    pub berita_utama_cursor: Cursor,
}

impl HomePage {
    pub fn popular_sidebar(&self) -> &[NewsItem] {
        head(&self.popular, POPULAR_SIDEBAR)
    }

    pub fn popular_mobile(&self) -> &[NewsItem] {
        head(&self.popular, POPULAR_MOBILE)
    }

    /// Popular items in rows of five; a partial row is dropped.
    pub fn trending(&self) -> Vec<&[NewsItem]> {
        let shown = self.popular.len().min(HOME_POPULAR) / TRENDING_CHUNK * TRENDING_CHUNK;
        self.popular[..shown].chunks(TRENDING_CHUNK).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticlePage {
    pub article: NewsItem,
    pub related_left: Vec<NewsItem>,
    pub related_right: Vec<NewsItem>,
    pub comments: Vec<Comment>,
    /// "Tidak Kalah Penting"
    pub also_read: Vec<NewsItem>,
    pub popular: Vec<NewsItem>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryPage {
    /// Value sent as `kategori` to the API.
    pub category_id: String,
    pub name: String,
    pub hero: Option<NewsItem>,
    pub hero_list: Vec<NewsItem>,
    pub highlight: Vec<NewsItem>,
    pub main: Vec<NewsItem>,
    pub sidebar: Vec<NewsItem>,
    pub cursor: Cursor,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorPage {
    pub author: Author,
    pub articles: Vec<NewsItem>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GalleryPage {
    pub photos: Vec<Photo>,
    pub galleries: Vec<GalleryItem>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchPage {
    pub query: String,
    pub results: Vec<NewsItem>,
    pub cursor: Cursor,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPage {
    pub message: String,
    pub action: &'static str,
}

impl ErrorPage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action: BACK_HOME,
        }
    }
}

/// Any rendered page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    Home(HomePage),
    Article(ArticlePage),
    Category(CategoryPage),
    Author(AuthorPage),
    Gallery(GalleryPage),
    Search(SearchPage),
    Poll(Poll),
    Static(StaticPage),
    Error(ErrorPage),
}

impl Page {
    /// File stem used when writing the page to disk.
    pub fn file_stem(&self) -> String {
        match self {
            Page::Home(_) => "home".to_string(),
            Page::Article(p) => format!("article-{}", p.article.id),
            Page::Category(p) => format!("category-{}", p.category_id),
            Page::Author(p) => format!("author-{}", p.author.id),
            Page::Gallery(_) => "gallery".to_string(),
            Page::Search(p) => format!("search-{}", crate::utils::kebab_case(&p.query)),
            Page::Poll(p) => format!("poll-{}", p.id),
            Page::Static(p) => format!("static-{}", p.id),
            Page::Error(_) => "error".to_string(),
        }
    }

    fn section_mut(&mut self, section: Section) -> Option<(&mut Vec<NewsItem>, &mut Cursor)> {
        match (self, section) {
            (Page::Home(p), Section::Latest) => Some((&mut p.latest, &mut p.latest_cursor)),
            (Page::Home(p), Section::BeritaUtama) => {
                Some((&mut p.berita_utama, &mut p.berita_utama_cursor))
            }
            (Page::Category(p), Section::Category) => Some((&mut p.main, &mut p.cursor)),
            (Page::Search(p), Section::Search) => Some((&mut p.results, &mut p.cursor)),
            _ => None,
        }
    }
}

// ---- Pure assembly ----

/// Distribute the home pool: headline first, then secondary 1, featured 3,
/// timeline 5 and Berita Utama 5, each drawn from what is left.
///
/// `pool` is `None` when the pool fetch failed. The continuable sections
/// then open at offset 0 and stay active, so "load more" retries the fetch.
pub fn assemble_home(
    headline: Option<NewsItem>,
    pool: Option<Vec<NewsItem>>,
    popular: Vec<NewsItem>,
    session: &mut PageSession,
) -> HomePage {
    session.reset();
    if let Some(headline) = &headline {
        session.seen_mut().register_item(headline);
    }

    let was_fetched = pool.is_some();
    let mut pool = Pool::new(pool.unwrap_or_default());
    let seen = session.seen_mut();
    let secondary = pool.take_one(seen);
    let featured = pool.take_unique(3, seen);
    let latest = pool.take_unique(5, seen);
    let berita_utama = pool.take_unique(5, seen);

    let cursor = pool_cursor(&pool, was_fetched, HOME_POOL);
    session.open_section(Section::Latest, FeedQuery::default(), cursor);
    session.open_section(Section::BeritaUtama, FeedQuery::default(), cursor);

    HomePage {
        headline,
        secondary,
        featured,
        latest,
        berita_utama,
        popular,
        latest_cursor: cursor,
        berita_utama_cursor: cursor,
    }
}

pub fn assemble_article(
    article: NewsItem,
    related: Vec<NewsItem>,
    comments: Vec<Comment>,
    popular: Vec<NewsItem>,
    session: &mut PageSession,
) -> ArticlePage {
    session.reset();
    let seen = session.seen_mut();
    seen.register_item(&article);

    let mut related = Pool::new(related);
    let related_left = related.take_unique(RELATED_COLUMN, seen);
    let related_right = related.take_unique(RELATED_COLUMN, seen);

    let mut popular = Pool::new(popular);
    let also_read = popular.take_unique(ALSO_READ, seen);
    let popular = popular.take_unique(ARTICLE_POPULAR_LIST, seen);

    ArticlePage {
        article,
        related_left,
        related_right,
        comments,
        also_read,
        popular,
    }
}

/// Find a category by slug or name, case-insensitively, or by numeric id.
pub fn find_category<'a>(categories: &'a [Category], key: &str) -> Option<&'a Category> {
    let needle = key.trim().to_lowercase();
    let numeric = needle.parse::<i64>().ok();
    categories.iter().find(|c| {
        c.slug.to_lowercase() == needle
            || c.name.to_lowercase() == needle
            || numeric.is_some_and(|id| id == c.id)
    })
}

/// Distribute the category pool: hero 1, hero list 4, highlight 5, main
/// list 5, sidebar 5. A `None` pool keeps the main list continuable.
pub fn assemble_category(
    category_id: String,
    name: String,
    pool: Option<Vec<NewsItem>>,
    session: &mut PageSession,
) -> CategoryPage {
    session.reset();
    let was_fetched = pool.is_some();
    let mut pool = Pool::new(pool.unwrap_or_default());
    let seen = session.seen_mut();
    let hero = pool.take_one(seen);
    let hero_list = pool.take_unique(4, seen);
    let highlight = pool.take_unique(5, seen);
    let main = pool.take_unique(5, seen);
    let sidebar = pool.take_unique(5, seen);

    let cursor = pool_cursor(&pool, was_fetched, CATEGORY_POOL);
    let query = FeedQuery {
        kategori: Some(category_id.clone()),
        ..FeedQuery::default()
    };
    session.open_section(Section::Category, query, cursor);

    CategoryPage {
        category_id,
        name,
        hero,
        hero_list,
        highlight,
        main,
        sidebar,
        cursor,
    }
}

pub fn assemble_search(
    query: String,
    pool: Option<Vec<NewsItem>>,
    session: &mut PageSession,
) -> SearchPage {
    session.reset();
    let was_fetched = pool.is_some();
    let mut pool = Pool::new(pool.unwrap_or_default());
    let results = pool.take_unique(SEARCH_FIRST, session.seen_mut());

    let cursor = pool_cursor(&pool, was_fetched, SEARCH_POOL);
    let feed = FeedQuery {
        q: Some(query.clone()),
        ..FeedQuery::default()
    };
    session.open_section(Section::Search, feed, cursor);

    SearchPage {
        query,
        results,
        cursor,
    }
}

// ---- Fetch + assemble ----

#[instrument(level = "info", skip_all)]
pub async fn home(client: &CmsClient, session: &SharedSession) -> HomePage {
    let headline_query = ListQuery::limit(1);
    let pool_query = ListQuery::limit(HOME_POOL);
    let popular_query = ListQuery::limit(HOME_POPULAR);
    let (headline, pool, popular) = tokio::join!(
        client.headline(&headline_query),
        client.news_list(&pool_query),
        client.popular(&popular_query),
    );
    let headline = or_empty(headline, "headline").into_iter().next();
    let pool = fetched(pool, "news pool").map(|listing| listing.items);
    let popular = or_empty(popular, "popular");

    let page = assemble_home(headline, pool, popular, &mut *session.lock().await);
    info!(
        featured = page.featured.len(),
        latest = page.latest.len(),
        berita_utama = page.berita_utama.len(),
        offset = page.latest_cursor.offset,
        "Assembled home page"
    );
    page
}

#[instrument(level = "info", skip(client, session))]
pub async fn article(
    client: &CmsClient,
    session: &SharedSession,
    id: i64,
) -> Result<ArticlePage, PageError> {
    let comment_query = ListQuery::limit(COMMENT_LIMIT).article(id);
    let related_query = ListQuery::limit(RELATED_LIMIT);
    let popular_query = ListQuery::limit(ARTICLE_POPULAR);
    let (detail, related, comments, popular) = tokio::join!(
        client.news_detail(id),
        client.related(id, &related_query),
        client.comments(&comment_query),
        client.popular(&popular_query),
    );
    let article = detail?.ok_or(PageError::NotFound("Artikel"))?;
    let related = or_empty(related, "related");
    let comments = or_empty(comments, "comments").items;
    let popular = or_empty(popular, "popular");

    let page = assemble_article(article, related, comments, popular, &mut *session.lock().await);
    info!(
        related = page.related_left.len() + page.related_right.len(),
        comments = page.comments.len(),
        "Assembled article page"
    );
    Ok(page)
}

/// Category page for a numeric id, slug or name. Unknown keys are passed to
/// the API unchanged and titled with the upper-cased key.
#[instrument(level = "info", skip(client, session))]
pub async fn category(client: &CmsClient, session: &SharedSession, key: &str) -> CategoryPage {
    let categories = or_empty(client.categories().await, "categories");
    let (category_id, name) = match find_category(&categories, key) {
        Some(found) => {
            info!(id = found.id, name = %found.name, "Resolved category");
            (found.id.to_string(), found.name.clone())
        }
        None => (key.to_string(), key.to_uppercase()),
    };

    let query = ListQuery::limit(CATEGORY_POOL).offset(0).kategori(category_id.clone());
    let pool = fetched(client.news_list(&query).await, "category pool").map(|listing| listing.items);

    let page = assemble_category(category_id, name, pool, &mut *session.lock().await);
    info!(
        hero = page.hero.is_some(),
        main = page.main.len(),
        offset = page.cursor.offset,
        "Assembled category page"
    );
    page
}

#[instrument(level = "info", skip(client))]
pub async fn author(client: &CmsClient, id: i64) -> Result<AuthorPage, PageError> {
    let article_query = ListQuery::limit(AUTHOR_ARTICLES).penulis(id.to_string());
    let (detail, articles) = tokio::join!(client.author(id), client.news_list(&article_query));
    let author = detail?.ok_or(PageError::NotFound("Profil wartawan"))?;
    let articles = or_empty(articles, "author articles").items;
    Ok(AuthorPage { author, articles })
}

#[instrument(level = "info", skip_all)]
pub async fn gallery(client: &CmsClient) -> GalleryPage {
    let photo_query = ListQuery::limit(GALLERY_PHOTOS);
    let album_query = ListQuery::limit(GALLERY_ALBUMS);
    let (photos, galleries) = tokio::join!(
        client.photos(&photo_query),
        client.galleries(&album_query),
    );
    GalleryPage {
        photos: or_empty(photos, "photos").items,
        galleries: or_empty(galleries, "galleries").items,
    }
}

#[instrument(level = "info", skip(client, session))]
pub async fn search(client: &CmsClient, session: &SharedSession, query: &str) -> SearchPage {
    let list_query = ListQuery::limit(SEARCH_POOL).search(query);
    let pool = fetched(client.news_list(&list_query).await, "search").map(|listing| listing.items);
    assemble_search(query.to_string(), pool, &mut *session.lock().await)
}

/// A reader poll with its tally. A missing poll is fatal.
#[instrument(level = "info", skip(client))]
pub async fn poll(client: &CmsClient, id: i64) -> Result<Poll, PageError> {
    let poll = client.poll(id).await?.ok_or(PageError::NotFound("Polling"))?;
    info!(options = poll.options.len(), "Loaded poll");
    Ok(poll)
}

#[instrument(level = "info", skip(client))]
pub async fn static_page(client: &CmsClient, id: i64) -> Result<StaticPage, PageError> {
    client.static_page(id).await?.ok_or(PageError::NotFound("Halaman"))
}

/// Run `rounds` "load more" clicks on every still-active section of `page`.
///
/// Sections of one round run concurrently. A failed continuation is logged
/// and leaves its section as it was; the next round tries it again.
#[instrument(level = "info", skip(source, session, page))]
pub async fn load_more<S>(source: &S, session: &SharedSession, page: &mut Page, rounds: usize)
where
    S: FeedSource<Item = NewsItem>,
{
    for round in 1..=rounds {
        let active = session.lock().await.active_sections();
        if active.is_empty() {
            info!(round, "No section has more items");
            break;
        }

        let results = join_all(active.iter().map(|&section| session.load_more(source, section))).await;

        let session = session.lock().await;
        for (section, result) in active.into_iter().zip(results) {
            let Some((items, cursor)) = page.section_mut(section) else {
                continue;
            };
            match result {
                Ok(extension) => items.extend(extension.into_items()),
                Err(e) => warn!(round, section = section.name(), error = %e, "Load more failed"),
            }
            if let Some(current) = session.cursor(section) {
                *cursor = current;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::cursor::tests::MockSource;
    use crate::feed::tests::{ids, news};
    use serde_json::json;
    use std::collections::HashSet;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn all_ids(lists: &[&Vec<NewsItem>]) -> Vec<i64> {
        lists.iter().flat_map(|l| ids(l)).collect()
    }

    fn assert_unique(found: &[i64]) {
        let set: HashSet<_> = found.iter().collect();
        assert_eq!(set.len(), found.len(), "duplicate ids in {found:?}");
    }

    #[test]
    fn test_assemble_home_distribution() {
        let pool: Vec<NewsItem> = (0..60).map(|i| news(100 + (i % 20))).collect();
        let popular: Vec<NewsItem> = [100, 101, 900].into_iter().map(news).collect();
        let mut session = PageSession::new();

        let page = assemble_home(Some(news(102)), Some(pool), popular, &mut session);

        assert_eq!(page.secondary.as_ref().map(|n| n.id), Some(100));
        assert_eq!(ids(&page.featured), vec![101, 103, 104]);
        assert_eq!(ids(&page.latest), vec![105, 106, 107, 108, 109]);
        assert_eq!(ids(&page.berita_utama), vec![110, 111, 112, 113, 114]);
        assert_eq!(page.latest_cursor, Cursor::at(15));
        assert_eq!(session.cursor(Section::BeritaUtama), Some(Cursor::at(15)));

        // Popular overlaps the pool on purpose and is kept verbatim.
        assert_eq!(ids(&page.popular), vec![100, 101, 900]);
        assert_eq!(ids(page.popular_sidebar()), vec![100, 101]);
        assert!(!session.seen().contains(900));
    }

    #[test]
    fn test_assemble_home_empty_inputs() {
        let mut session = PageSession::new();
        let page = assemble_home(None, Some(Vec::new()), Vec::new(), &mut session);
        assert!(page.secondary.is_none());
        assert!(page.featured.is_empty());
        assert!(page.latest_cursor.is_exhausted());
        assert!(session.active_sections().is_empty());
    }

    #[test]
    fn test_trending_rows_of_five() {
        let mut page = HomePage {
            popular: (1..=12).map(news).collect(),
            ..HomePage::default()
        };
        let rows = page.trending();
        assert_eq!(rows.len(), 2);
        assert_eq!(ids(rows[1]), vec![6, 7, 8, 9, 10]);

        page.popular.truncate(4);
        assert!(page.trending().is_empty());
        assert_eq!(page.popular_mobile().len(), 4);
    }

    #[test]
    fn test_assemble_article_dedups_sidebars() {
        let article = news(50);
        let related: Vec<NewsItem> = [50, 1, 2, 3, 4, 5].into_iter().map(news).collect();
        let popular: Vec<NewsItem> = [1, 6, 7, 50, 8, 9, 10].into_iter().map(news).collect();
        let mut session = PageSession::new();

        let page = assemble_article(article, related, Vec::new(), popular, &mut session);

        assert_eq!(ids(&page.related_left), vec![1, 2, 3]);
        assert_eq!(ids(&page.related_right), vec![4, 5]);
        assert_eq!(ids(&page.also_read), vec![6, 7]);
        assert_eq!(ids(&page.popular), vec![8, 9, 10]);
        assert_unique(&all_ids(&[
            &page.related_left,
            &page.related_right,
            &page.also_read,
            &page.popular,
        ]));
    }

    #[test]
    fn test_find_category() {
        let categories = vec![
            Category {
                id: 4,
                name: "Hukum dan Kriminal".to_string(),
                slug: "hukum-dan-kriminal".to_string(),
            },
            Category {
                id: 9,
                name: "Politik".to_string(),
                slug: "politik".to_string(),
            },
        ];
        assert_eq!(find_category(&categories, "POLITIK").map(|c| c.id), Some(9));
        assert_eq!(find_category(&categories, "hukum-dan-kriminal").map(|c| c.id), Some(4));
        assert_eq!(find_category(&categories, "hukum dan kriminal").map(|c| c.id), Some(4));
        assert_eq!(find_category(&categories, "4").map(|c| c.id), Some(4));
        assert!(find_category(&categories, "olahraga").is_none());
    }

    #[test]
    fn test_assemble_category_splits_pool() {
        let pool: Vec<NewsItem> = (1..=20).map(news).collect();
        let mut session = PageSession::new();
        session.seen_mut().register(999);

        let page = assemble_category("4".to_string(), "Hukum".to_string(), Some(pool), &mut session);

        assert_eq!(page.hero.as_ref().map(|n| n.id), Some(1));
        assert_eq!(ids(&page.hero_list), vec![2, 3, 4, 5]);
        assert_eq!(ids(&page.highlight), vec![6, 7, 8, 9, 10]);
        assert_eq!(ids(&page.main), vec![11, 12, 13, 14, 15]);
        assert_eq!(ids(&page.sidebar), vec![16, 17, 18, 19, 20]);
        assert_eq!(page.cursor, Cursor::at(20));
        assert!(!session.seen().contains(999));
    }

    #[test]
    fn test_assemble_search_short_pool_is_exhausted() {
        let mut session = PageSession::new();
        let page = assemble_search(
            "banjir".to_string(),
            Some((1..=4).map(news).collect()),
            &mut session,
        );
        assert_eq!(ids(&page.results), vec![1, 2, 3, 4]);
        assert!(page.cursor.is_exhausted());
        assert!(session.active_sections().is_empty());
    }

    #[tokio::test]
    async fn test_load_more_rounds_extend_home() {
        let pool: Vec<NewsItem> = (1..=60).map(news).collect();
        let shared = SharedSession::new();
        let home = assemble_home(Some(news(1)), Some(pool), Vec::new(), &mut *shared.lock().await);
        assert_eq!(home.latest_cursor.offset, 15);
        let mut page = Page::Home(home);

        let source = MockSource::with_ids(1..=100);
        load_more(&source, &shared, &mut page, 2).await;

        let Page::Home(home) = &page else {
            panic!("page changed kind");
        };
        assert_eq!(home.latest.len(), 15);
        assert_eq!(home.berita_utama.len(), 15);
        let mut every = all_ids(&[&home.featured, &home.latest, &home.berita_utama]);
        every.extend(home.secondary.iter().map(|n| n.id));
        every.push(1);
        assert_unique(&every);
        assert!(home.latest_cursor.offset > 15);
    }

    #[tokio::test]
    async fn test_load_more_stops_when_exhausted() {
        let shared = SharedSession::new();
        let search = assemble_search(
            "x".to_string(),
            Some((1..=20).map(news).collect()),
            &mut *shared.lock().await,
        );
        let mut page = Page::Search(search);

        let source = MockSource::with_ids(1..=25);
        load_more(&source, &shared, &mut page, 5).await;

        let Page::Search(search) = &page else {
            panic!("page changed kind");
        };
        // The short batch holds 15 unseen items; the quota keeps 10 of them.
        assert_eq!(ids(&search.results), (1..=20).collect::<Vec<_>>());
        assert!(search.cursor.is_exhausted());
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_article_not_found_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/berita/77"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": null})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
            .mount(&server)
            .await;

        let client = CmsClient::new(&server.uri(), None).unwrap();
        let err = article(&client, &SharedSession::new(), 77).await.unwrap_err();
        assert!(matches!(err, PageError::NotFound("Artikel")));
        assert_eq!(err.to_string(), "Artikel tidak ditemukan");
    }

    #[tokio::test]
    async fn test_home_degrades_failed_sections() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/headline"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/berita"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{"id": 1}, {"id": 2}, {"id": 3}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/populer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .mount(&server)
            .await;

        let client = CmsClient::new(&server.uri(), None).unwrap();
        let page = home(&client, &SharedSession::new()).await;

        assert!(page.headline.is_none());
        assert_eq!(page.secondary.as_ref().map(|n| n.id), Some(1));
        assert_eq!(ids(&page.featured), vec![2, 3]);
        assert!(page.popular.is_empty());
        // Three records against a limit of 60: upstream really ran out.
        assert!(page.latest_cursor.is_exhausted());
    }

    #[tokio::test]
    async fn test_home_pool_failure_keeps_sections_open() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/berita"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
            .mount(&server)
            .await;

        let client = CmsClient::new(&server.uri(), None).unwrap();
        let shared = SharedSession::new();
        let home = home(&client, &shared).await;

        assert!(home.latest.is_empty());
        assert_eq!(home.latest_cursor, Cursor::at(0));
        assert!(home.berita_utama_cursor.has_more);
        assert_eq!(
            shared.lock().await.active_sections(),
            vec![Section::BeritaUtama, Section::Latest]
        );

        // The next round fetches again instead of reporting exhaustion.
        let mut page = Page::Home(home);
        let source = MockSource::with_ids(1..=100);
        load_more(&source, &shared, &mut page, 1).await;
        let Page::Home(home) = &page else {
            panic!("page changed kind");
        };
        assert_eq!(home.latest.len() + home.berita_utama.len(), 10);
        assert_eq!(source.call_count(), 2);
    }

    #[test]
    fn test_failed_pools_open_active_cursors() {
        let mut session = PageSession::new();
        let page = assemble_category("4".to_string(), "Hukum".to_string(), None, &mut session);
        assert!(page.hero.is_none());
        assert_eq!(page.cursor, Cursor::at(0));
        assert_eq!(session.active_sections(), vec![Section::Category]);

        let page = assemble_search("banjir".to_string(), None, &mut session);
        assert!(page.results.is_empty());
        assert_eq!(page.cursor, Cursor::at(0));
        assert_eq!(session.active_sections(), vec![Section::Search]);
    }

    #[tokio::test]
    async fn test_poll_and_static_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/polling/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"id": 4, "title": "Pilkada", "options": [{"id": 1, "label": "Ya", "votes": 3}]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/statis/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
            .mount(&server)
            .await;

        let client = CmsClient::new(&server.uri(), None).unwrap();
        let found = poll(&client, 4).await.unwrap();
        assert_eq!(found.options[0].label, "Ya");
        assert_eq!(Page::Poll(found).file_stem(), "poll-4");

        let err = static_page(&client, 9).await.unwrap_err();
        assert_eq!(err.to_string(), "Halaman tidak ditemukan");
    }

    #[test]
    fn test_page_file_stem_and_tag() {
        let page = Page::Search(SearchPage {
            query: "Harga Beras".to_string(),
            ..SearchPage::default()
        });
        assert_eq!(page.file_stem(), "search-harga-beras");
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["page"], "search");

        let error = Page::Error(ErrorPage::new("Artikel tidak ditemukan"));
        assert_eq!(serde_json::to_value(&error).unwrap()["action"], BACK_HOME);
    }
}
