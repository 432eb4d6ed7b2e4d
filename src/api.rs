//! HTTP client for the SinPo CMS API.
//!
//! Every endpoint answers with the same envelope (`success`, `data`,
//! `message`, `meta`). The client checks the envelope, then runs `data`
//! through the normalizer so callers only ever see canonical entities.
//!
//! # Architecture
//!
//! - [`CmsClient`]: thin wrapper over a shared `reqwest::Client` with the
//!   base URL and bearer token baked in
//! - [`ListQuery`]: the query parameters the listing endpoints understand
//! - [`decode_envelope`]: pure envelope check, usable without a network
//!
//! The client never retries on its own. "Load more" retries live in
//! [`crate::feed`] and only cover the empty-batch case.

use crate::error::ApiError;
use crate::feed::{FeedQuery, FeedSource};
use crate::models::{
    Ad, Author, Category, Channel, Comment, Envelope, GalleryItem, Link, Meta, NewsItem,
    Newsletter, Photo, Poll, RawRecord, StaticPage,
};
use crate::normalize::lookup::is_truthy;
use crate::normalize::{normalize_many, FromRaw};
use crate::utils::truncate_for_log;
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Production API root.
pub const DEFAULT_API_URL: &str = "https://api.sinpo.id/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sort direction understood by the listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Asc,
    Desc,
}

impl Sort {
    fn as_str(self) -> &'static str {
        match self {
            Sort::Asc => "asc",
            Sort::Desc => "desc",
        }
    }
}

/// Query parameters of a listing endpoint. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub page: Option<usize>,
    pub sort: Option<Sort>,
    pub q: Option<String>,
    pub kategori: Option<String>,
    pub channel: Option<String>,
    pub penulis: Option<String>,
    pub tag: Option<String>,
    pub id_berita: Option<i64>,
}

impl ListQuery {
    pub fn limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn kategori(mut self, kategori: impl Into<String>) -> Self {
        self.kategori = Some(kategori.into());
        self
    }

    pub fn penulis(mut self, penulis: impl Into<String>) -> Self {
        self.penulis = Some(penulis.into());
        self
    }

    pub fn search(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn article(mut self, id: i64) -> Self {
        self.id_berita = Some(id);
        self
    }

    /// The `/berita` query for one continuation batch.
    pub fn for_feed(query: &FeedQuery, offset: usize, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            q: query.q.clone(),
            kategori: query.kategori.clone(),
            channel: query.channel.clone(),
            penulis: query.penulis.clone(),
            ..Self::default()
        }
    }

    /// Query pairs in a stable order; `fallback` fills an unset limit and sort.
    fn pairs(&self, fallback: Option<(usize, Sort)>) -> Vec<(&'static str, String)> {
        let (limit, sort) = match fallback {
            Some((limit, sort)) => (self.limit.or(Some(limit)), self.sort.or(Some(sort))),
            None => (self.limit, self.sort),
        };

        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((key, value));
            }
        };
        push("limit", limit.map(|n| n.to_string()));
        push("offset", self.offset.map(|n| n.to_string()));
        push("page", self.page.map(|n| n.to_string()));
        push("sort", sort.map(|s| s.as_str().to_string()));
        push("q", self.q.clone());
        push("kategori", self.kategori.clone());
        push("channel", self.channel.clone());
        push("penulis", self.penulis.clone());
        push("tag", self.tag.clone());
        push("id_berita", self.id_berita.map(|id| id.to_string()));
        pairs
    }
}

/// Normalized list payload plus pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub meta: Option<Meta>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            meta: None,
        }
    }
}

/// Append `/api` unless the URL already ends with it.
pub fn api_base_url(url: &str) -> Result<String, ApiError> {
    let trimmed = url.trim().trim_end_matches('/');
    Url::parse(trimmed)?;
    if trimmed.ends_with("/api") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/api"))
    }
}

/// Parse a response body and reject `success: false`, whatever the HTTP status.
pub fn decode_envelope(body: &str) -> Result<Envelope, ApiError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.success == Some(false) {
        let message = envelope
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Request failed".to_string());
        return Err(ApiError::Rejected(message));
    }
    Ok(envelope)
}

/// Records of a list payload. Anything but an array counts as empty.
fn list_records(data: &Value) -> &[RawRecord] {
    match data {
        Value::Array(items) => items,
        _ => &[],
    }
}

/// Record of a detail payload; a one-element array is unwrapped.
fn detail_record(data: &Value) -> Option<&RawRecord> {
    match data {
        Value::Array(items) => items.first().filter(|raw| is_truthy(raw)),
        other if is_truthy(other) => Some(other),
        _ => None,
    }
}

/// Client for the CMS REST API.
#[derive(Debug, Clone)]
pub struct CmsClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl CmsClient {
    /// Build a client for `base_url` (with or without the trailing `/api`).
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sinpo_news/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: api_base_url(base_url)?,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// The resolved API root, always ending in `/api`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header(reqwest::header::ACCEPT, "*/*");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Envelope, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                %endpoint,
                body = %truncate_for_log(&body, 300),
                "API error response"
            );
            return Err(ApiError::Http {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        decode_envelope(&body).inspect_err(|e| warn!(%endpoint, error = %e, "Envelope rejected"))
    }

    async fn get(&self, path: &str, query: &[(&'static str, String)]) -> Result<Envelope, ApiError> {
        debug!(%path, ?query, "GET");
        self.send(self.request(Method::GET, path).query(query), path).await
    }

    async fn list<T: FromRaw>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Listing<T>, ApiError> {
        let envelope = self.get(path, query).await?;
        let items = normalize_many(list_records(&envelope.data));
        debug!(%path, count = items.len(), "Fetched listing");
        Ok(Listing {
            items,
            meta: envelope.meta,
        })
    }

    async fn detail<T: FromRaw>(&self, path: &str) -> Result<Option<T>, ApiError> {
        let envelope = self.get(path, &[]).await?;
        Ok(detail_record(&envelope.data).map(T::from_raw))
    }

    async fn post_form(&self, path: &str, form: Form) -> Result<Option<String>, ApiError> {
        let envelope = self
            .send(self.request(Method::POST, path).multipart(form), path)
            .await?;
        info!(%path, "Form submitted");
        Ok(envelope.message)
    }

    // ---- Berita ----

    /// `/berita`; defaults to `limit=10&sort=desc`.
    #[instrument(level = "debug", skip(self))]
    pub async fn news_list(&self, query: &ListQuery) -> Result<Listing<NewsItem>, ApiError> {
        self.list("/berita", &query.pairs(Some((10, Sort::Desc))))
            .await
    }

    /// `/berita/{id}`. `Ok(None)` when the CMS answers with no record.
    #[instrument(level = "debug", skip(self))]
    pub async fn news_detail(&self, id: i64) -> Result<Option<NewsItem>, ApiError> {
        self.detail(&format!("/berita/{id}")).await
    }

    /// Headline rail for the front page.
    pub async fn headline(&self, query: &ListQuery) -> Result<Vec<NewsItem>, ApiError> {
        Ok(self.list("/headline", &query.pairs(None)).await?.items)
    }

    pub async fn popular(&self, query: &ListQuery) -> Result<Vec<NewsItem>, ApiError> {
        Ok(self.list("/populer", &query.pairs(None)).await?.items)
    }

    /// Articles related to `id`, from `/terkait/{id}`.
    ///
    /// # Arguments
    ///
    /// * `id` - The article the sidebar belongs to
    /// * `query` - Usually just a limit; no default is applied
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx statuses and rejected envelopes all
    /// surface as [`ApiError`]. The article page degrades the sidebar to
    /// empty on error.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let related = client.related(1201, &ListQuery::limit(5)).await?;
    /// ```
    pub async fn related(&self, id: i64, query: &ListQuery) -> Result<Vec<NewsItem>, ApiError> {
        Ok(self
            .list(&format!("/terkait/{id}"), &query.pairs(None))
            .await?
            .items)
    }

    // ---- Taxonomy ----

    /// Every category. Used to resolve a category key by slug or name.
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self.list("/kategori", &[]).await?.items)
    }

    pub async fn category(&self, id: i64) -> Result<Option<Category>, ApiError> {
        self.detail(&format!("/kategori/{id}")).await
    }

    pub async fn channels(&self) -> Result<Vec<Channel>, ApiError> {
        Ok(self.list("/channel", &[]).await?.items)
    }

    pub async fn channel(&self, id: i64) -> Result<Option<Channel>, ApiError> {
        self.detail(&format!("/channel/{id}")).await
    }

    // ---- People and media ----

    /// `/wartawan`, oldest first unless `query.sort` says otherwise.
    pub async fn authors(&self, query: &ListQuery) -> Result<Listing<Author>, ApiError> {
        self.list("/wartawan", &query.pairs(Some((10, Sort::Asc))))
            .await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn author(&self, id: i64) -> Result<Option<Author>, ApiError> {
        self.detail(&format!("/wartawan/{id}")).await
    }

    /// Album covers. Each entry may point back at an article via `article_id`.
    pub async fn galleries(&self, query: &ListQuery) -> Result<Listing<GalleryItem>, ApiError> {
        self.list("/gallery", &query.pairs(Some((10, Sort::Asc))))
            .await
    }

    pub async fn photos(&self, query: &ListQuery) -> Result<Listing<Photo>, ApiError> {
        self.list("/photo", &query.pairs(Some((10, Sort::Asc)))).await
    }

    // ---- Reader interaction ----

    /// Comments, filtered with `query.id_berita` for a single article.
    pub async fn comments(&self, query: &ListQuery) -> Result<Listing<Comment>, ApiError> {
        self.list("/komentar", &query.pairs(Some((10, Sort::Asc))))
            .await
    }

    pub async fn polls(&self, query: &ListQuery) -> Result<Listing<Poll>, ApiError> {
        self.list("/polling", &query.pairs(Some((10, Sort::Asc))))
            .await
    }

    /// One poll with its options and tally.
    pub async fn poll(&self, id: i64) -> Result<Option<Poll>, ApiError> {
        self.detail(&format!("/polling/{id}")).await
    }

    pub async fn newsletters(&self, query: &ListQuery) -> Result<Listing<Newsletter>, ApiError> {
        self.list("/newsletter", &query.pairs(Some((10, Sort::Asc))))
            .await
    }

    /// POST `/komentar`. The email field is only sent when present.
    #[instrument(level = "info", skip(self, comment))]
    pub async fn store_comment(
        &self,
        article_id: i64,
        name: &str,
        email: Option<&str>,
        comment: &str,
    ) -> Result<Option<String>, ApiError> {
        let mut form = Form::new()
            .text("berita_id", article_id.to_string())
            .text("nama", name.to_string());
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            form = form.text("email", email.to_string());
        }
        form = form.text("komentar", comment.to_string());
        self.post_form("/komentar", form).await
    }

    /// POST `/newsletter` with a single `email` field.
    #[instrument(level = "info", skip(self))]
    pub async fn subscribe(&self, email: &str) -> Result<Option<String>, ApiError> {
        let form = Form::new().text("email", email.to_string());
        self.post_form("/newsletter", form).await
    }

    /// Cast a vote for `option_id` on `poll_id`.
    ///
    /// # Returns
    ///
    /// The CMS confirmation message, if it sent one.
    ///
    /// # Errors
    ///
    /// [`ApiError::Http`] when the poll is closed or unknown upstream, and
    /// [`ApiError::Rejected`] when the envelope reports `success: false`.
    #[instrument(level = "info", skip(self))]
    pub async fn vote(&self, poll_id: i64, option_id: i64) -> Result<Option<String>, ApiError> {
        let form = Form::new().text("option", option_id.to_string());
        self.post_form(&format!("/polling/{poll_id}/vote"), form)
            .await
    }

    // ---- Site furniture ----

    pub async fn static_pages(&self, query: &ListQuery) -> Result<Vec<StaticPage>, ApiError> {
        Ok(self.list("/statis", &query.pairs(None)).await?.items)
    }

    /// `/statis/{id}`: editorial board, guidelines, opinion columns.
    pub async fn static_page(&self, id: i64) -> Result<Option<StaticPage>, ApiError> {
        self.detail(&format!("/statis/{id}")).await
    }

    /// Ad slots as sent. `start_date`/`end_date` are not checked here.
    pub async fn ads(&self, query: &ListQuery) -> Result<Vec<Ad>, ApiError> {
        Ok(self
            .list("/iklan", &query.pairs(Some((10, Sort::Asc))))
            .await?
            .items)
    }

    pub async fn links(&self, query: &ListQuery) -> Result<Vec<Link>, ApiError> {
        Ok(self
            .list("/link", &query.pairs(Some((10, Sort::Asc))))
            .await?
            .items)
    }
}

impl FeedSource for CmsClient {
    type Item = NewsItem;

    async fn fetch_batch(
        &self,
        query: &FeedQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<NewsItem>, ApiError> {
        let listing = self
            .news_list(&ListQuery::for_feed(query, offset, limit))
            .await?;
        Ok(listing.items)
    }
}
