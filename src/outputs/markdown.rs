//! Markdown rendering of pages.
//!
//! Article bodies stay HTML (Markdown passes inline HTML through), with
//! relative `<img>` sources rewritten to the image host. Every cover goes
//! through [`resolve_image_url`], so items without a cover show the
//! placeholder instead of a broken link.

use crate::images::{fix_content_images, resolve_image_url};
use crate::models::{Comment, NewsItem, Poll, StaticPage};
use crate::pages::{
    ArticlePage, AuthorPage, CategoryPage, ErrorPage, GalleryPage, HomePage, Page, SearchPage,
};
use crate::feed::Cursor;
use crate::theme::Theme;
use crate::utils::{
    author_display_name, avatar_url, category_display_name, format_date, format_relative_time,
    truncate_text, upcase,
};
use itertools::Itertools;
use std::fmt::{self, Write};

const SUMMARY_CHARS: usize = 150;

/// Settings shared by every renderer.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub image_base: String,
    pub theme: Theme,
}

impl RenderContext {
    pub fn new(image_base: impl Into<String>, theme: Theme) -> Self {
        Self {
            image_base: image_base.into(),
            theme,
        }
    }

    fn image(&self, path: &str) -> String {
        resolve_image_url(&self.image_base, path)
    }
}

/// `12345` → `12.345`
fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|group| std::str::from_utf8(group).unwrap_or_default())
        .join(".");
    if n < 0 { format!("-{grouped}") } else { grouped }
}

fn published(item: &NewsItem) -> &str {
    if item.published_at.is_empty() {
        &item.created_at
    } else {
        &item.published_at
    }
}

fn article_link(item: &NewsItem) -> String {
    format!("/berita/{}", item.id)
}

fn byline(item: &NewsItem) -> String {
    format!(
        "*{}* · {} · {}",
        category_display_name(&item.category).to_uppercase(),
        author_display_name(item),
        format_date(published(item))
    )
}

/// Large card: heading, cover, byline, excerpt.
fn news_card(out: &mut String, item: &NewsItem, level: usize, ctx: &RenderContext) -> fmt::Result {
    writeln!(out, "{} [{}]({})\n", "#".repeat(level), item.title, article_link(item))?;
    writeln!(out, "![{}]({})\n", item.title, ctx.image(&item.cover))?;
    writeln!(out, "{}\n", byline(item))?;
    if !item.summary.is_empty() {
        writeln!(out, "{}\n", truncate_text(&item.summary, SUMMARY_CHARS))?;
    }
    Ok(())
}

fn news_list(out: &mut String, items: &[NewsItem], empty: &str) -> fmt::Result {
    if items.is_empty() {
        return writeln!(out, "_{empty}_\n");
    }
    for item in items {
        writeln!(out, "- [{}]({}) · {}", item.title, article_link(item), byline(item))?;
    }
    writeln!(out)
}

fn timeline(out: &mut String, items: &[NewsItem]) -> fmt::Result {
    for item in items {
        writeln!(
            out,
            "- ![]({}) **{}** · {}  \n  [{}]({})",
            avatar_url(item),
            author_display_name(item),
            format_relative_time(published(item)),
            item.title,
            article_link(item)
        )?;
    }
    writeln!(out)
}

fn ranked(out: &mut String, items: &[NewsItem]) -> fmt::Result {
    for (rank, item) in items.iter().enumerate() {
        writeln!(out, "{}. [{}]({})", rank + 1, item.title, article_link(item))?;
    }
    writeln!(out)
}

fn more_hint(out: &mut String, cursor: &Cursor) -> fmt::Result {
    if cursor.has_more {
        writeln!(out, "_Muat lebih banyak (offset {})_\n", cursor.offset)
    } else {
        writeln!(out, "_Semua berita telah dimuat_\n")
    }
}

fn home(out: &mut String, page: &HomePage, ctx: &RenderContext) -> fmt::Result {
    if let Some(headline) = &page.headline {
        news_card(out, headline, 1, ctx)?;
    }
    if let Some(secondary) = &page.secondary {
        news_card(out, secondary, 2, ctx)?;
    }
    if !page.featured.is_empty() {
        news_list(out, &page.featured, "")?;
    }

    if !page.popular.is_empty() {
        writeln!(out, "## Berita Terpopuler\n")?;
        ranked(out, page.popular_mobile())?;
    }

    writeln!(out, "## Berita Terkini\n")?;
    timeline(out, &page.latest)?;
    more_hint(out, &page.latest_cursor)?;

    writeln!(out, "## Berita Utama\n")?;
    news_list(out, &page.berita_utama, "Belum ada berita utama.")?;
    more_hint(out, &page.berita_utama_cursor)?;

    let rows = page.trending();
    if !rows.is_empty() {
        writeln!(out, "## Trending\n")?;
        for row in rows {
            writeln!(out, "{}\n", row.iter().map(|item| item.title.as_str()).join(" | "))?;
        }
    }

    if !page.popular_sidebar().is_empty() {
        writeln!(out, "## Populer\n")?;
        news_list(out, page.popular_sidebar(), "")?;
    }
    Ok(())
}

fn comment(out: &mut String, comment: &Comment) -> fmt::Result {
    writeln!(
        out,
        "> **{}** · {}\n>\n> {}\n",
        comment.name,
        format_date(&comment.date),
        comment.comment
    )
}

fn article(out: &mut String, page: &ArticlePage, ctx: &RenderContext) -> fmt::Result {
    let item = &page.article;
    let journalist = if item.journalist.is_empty() { "TIM REDAKSI" } else { item.journalist.as_str() };
    let editor = if item.editor.is_empty() { "Tim Redaksi" } else { item.editor.as_str() };

    writeln!(out, "# {}\n", item.title)?;
    writeln!(
        out,
        "WARTAWAN **{}** | EDITOR {} | TERBIT {} | DILIHAT {} KALI\n",
        journalist,
        editor,
        format_date(published(item)),
        thousands(item.views)
    )?;
    writeln!(out, "![{}]({})", item.title, ctx.image(&item.cover))?;
    if !item.cover_credit.is_empty() {
        writeln!(out, "*{}*", item.cover_credit)?;
    }
    writeln!(out)?;
    writeln!(out, "{}\n", fix_content_images(&ctx.image_base, &item.content))?;

    if !item.tags.is_empty() {
        writeln!(out, "**Tag:** {}\n", item.tags.iter().map(|t| format!("#{t}")).join(" "))?;
    }
    if !item.gallery.is_empty() {
        writeln!(out, "## Galeri\n")?;
        for photo in &item.gallery {
            writeln!(out, "![{}]({})", photo.title, ctx.image(&photo.image))?;
        }
        writeln!(out)?;
    }

    writeln!(out, "## Berita Terkait\n")?;
    let related = page.related_left.iter().chain(&page.related_right).cloned().collect_vec();
    news_list(out, &related, "Tidak ada berita terkait.")?;

    writeln!(out, "## Komentar ({})\n", page.comments.len())?;
    if page.comments.is_empty() {
        writeln!(out, "_Belum ada komentar._\n")?;
    }
    for c in &page.comments {
        comment(out, c)?;
    }

    if !page.also_read.is_empty() {
        writeln!(out, "## Tidak Kalah Penting\n")?;
        news_list(out, &page.also_read, "")?;
    }
    if !page.popular.is_empty() {
        writeln!(out, "## Berita Terpopuler\n")?;
        ranked(out, &page.popular)?;
    }
    Ok(())
}

fn category(out: &mut String, page: &CategoryPage, ctx: &RenderContext) -> fmt::Result {
    writeln!(out, "# {}\n", page.name.to_uppercase())?;
    match &page.hero {
        Some(hero) => news_card(out, hero, 2, ctx)?,
        None => writeln!(out, "_Belum ada berita di kategori ini._\n")?,
    }
    if !page.hero_list.is_empty() {
        news_list(out, &page.hero_list, "")?;
    }
    if !page.highlight.is_empty() {
        writeln!(out, "## Sorotan\n")?;
        news_list(out, &page.highlight, "")?;
    }
    writeln!(out, "## Berita Lainnya\n")?;
    news_list(out, &page.main, "Tidak ada berita lainnya.")?;
    more_hint(out, &page.cursor)?;
    writeln!(out, "## Berita Terkini\n")?;
    news_list(out, &page.sidebar, "Belum ada berita terkini.")
}

fn author(out: &mut String, page: &AuthorPage) -> fmt::Result {
    let profile = &page.author;
    let avatar = if profile.avatar.is_empty() {
        format!(
            "https://ui-avatars.com/api/?name={}&background=D91B1B&color=fff&size=256",
            urlencoding::encode(&profile.name)
        )
    } else {
        profile.avatar.clone()
    };

    writeln!(out, "# {}\n", profile.name)?;
    writeln!(out, "![{}]({})\n", profile.name, avatar)?;
    writeln!(out, "**REDAKSI SINPO**\n")?;
    if !profile.bio.is_empty() {
        writeln!(out, "{}\n", profile.bio)?;
    }
    writeln!(out, "## Berita oleh {}\n", upcase(&profile.name))?;
    news_list(out, &page.articles, "Belum ada berita dari wartawan ini.")
}

fn gallery(out: &mut String, page: &GalleryPage, ctx: &RenderContext) -> fmt::Result {
    writeln!(out, "# Galeri Foto\n")?;
    if page.photos.is_empty() {
        writeln!(out, "_Belum ada foto._\n")?;
    }
    for photo in &page.photos {
        writeln!(out, "- ![{}]({}) {}", photo.title, ctx.image(&photo.image), photo.title)?;
    }
    writeln!(out)?;

    if !page.galleries.is_empty() {
        writeln!(out, "## Galeri Berita\n")?;
        for item in &page.galleries {
            let link = item
                .article_id
                .map(|id| format!(" ([baca](/berita/{id}))"))
                .unwrap_or_default();
            writeln!(out, "- ![{}]({}){}", item.title, ctx.image(&item.image), link)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn search(out: &mut String, page: &SearchPage) -> fmt::Result {
    writeln!(out, "# Hasil pencarian: \"{}\"\n", page.query)?;
    news_list(out, &page.results, "Tidak ada hasil.")?;
    if !page.results.is_empty() {
        more_hint(out, &page.cursor)?;
    }
    Ok(())
}

/// Options with vote counts and shares. `total_votes` wins when the CMS
/// sends it; otherwise the options are summed.
fn poll(out: &mut String, poll: &Poll) -> fmt::Result {
    let heading = if poll.title.is_empty() { &poll.question } else { &poll.title };
    writeln!(out, "# {heading}\n")?;
    if !poll.question.is_empty() && poll.question != *heading {
        writeln!(out, "{}\n", poll.question)?;
    }

    let total = if poll.total_votes > 0 {
        poll.total_votes
    } else {
        poll.options.iter().map(|o| o.votes).sum()
    };
    if poll.options.is_empty() {
        writeln!(out, "_Belum ada pilihan._\n")?;
    }
    for option in &poll.options {
        let share = if total > 0 { option.votes * 100 / total } else { 0 };
        writeln!(
            out,
            "- `{}` {} · {} suara ({share}%)",
            option.id,
            option.label,
            thousands(option.votes)
        )?;
    }
    writeln!(out, "\nTotal {} suara", thousands(total))
}

fn static_page(out: &mut String, page: &StaticPage, ctx: &RenderContext) -> fmt::Result {
    writeln!(out, "# {}\n", page.title)?;
    writeln!(out, "{}", fix_content_images(&ctx.image_base, &page.content))
}

fn error(out: &mut String, page: &ErrorPage) -> fmt::Result {
    writeln!(out, "# Oops! Ada Masalah\n")?;
    writeln!(out, "{}\n", page.message)?;
    writeln!(out, "[{}](/)", page.action)
}

/// Render any page as Markdown.
pub fn page_to_markdown(page: &Page, ctx: &RenderContext) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "<!-- theme: {} -->\n", ctx.theme)?;
    match page {
        Page::Home(p) => home(&mut out, p, ctx)?,
        Page::Article(p) => article(&mut out, p, ctx)?,
        Page::Category(p) => category(&mut out, p, ctx)?,
        Page::Author(p) => author(&mut out, p)?,
        Page::Gallery(p) => gallery(&mut out, p, ctx)?,
        Page::Search(p) => search(&mut out, p)?,
        Page::Poll(p) => poll(&mut out, p)?,
        Page::Static(p) => static_page(&mut out, p, ctx)?,
        Page::Error(p) => error(&mut out, p)?,
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tests::news;
    use crate::models::{Author, PollOption};

    fn ctx() -> RenderContext {
        RenderContext::new("https://sinpo.id", Theme::Light)
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(12345), "12.345");
        assert_eq!(thousands(1234567), "1.234.567");
        assert_eq!(thousands(-4500), "-4.500");
    }

    #[test]
    fn test_article_markdown() {
        let mut item = news(12);
        item.title = "Banjir Jakarta".to_string();
        item.content = r#"<p>Isi</p><img src="/foto/a.jpg">"#.to_string();
        item.cover = "channel/3/a.jpg".to_string();
        item.views = 2500;
        item.tags = vec!["banjir".to_string(), "jakarta".to_string()];

        let page = ArticlePage {
            article: item,
            related_left: vec![news(1)],
            related_right: Vec::new(),
            comments: Vec::new(),
            also_read: Vec::new(),
            popular: vec![news(2)],
        };
        let md = page_to_markdown(&Page::Article(page), &ctx()).unwrap();

        assert!(md.starts_with("<!-- theme: light -->"));
        assert!(md.contains("# Banjir Jakarta"));
        assert!(md.contains("WARTAWAN **TIM REDAKSI**"));
        assert!(md.contains("DILIHAT 2.500 KALI"));
        assert!(md.contains("https://sinpo.id/storage/channel/3/a.jpg"));
        assert!(md.contains(r#"src="https://sinpo.id/storage/foto/a.jpg""#));
        assert!(md.contains("**Tag:** #banjir #jakarta"));
        assert!(md.contains("[Berita 1](/berita/1)"));
        assert!(md.contains("_Belum ada komentar._"));
        assert!(md.contains("1. [Berita 2](/berita/2)"));
    }

    #[test]
    fn test_home_markdown_uses_placeholder_and_hints() {
        let mut timeline_item = news(2);
        timeline_item.journalist = "Budi".to_string();
        let page = HomePage {
            headline: Some(news(1)),
            latest: vec![timeline_item],
            ..HomePage::default()
        };
        let md = page_to_markdown(&Page::Home(page), &ctx()).unwrap();

        assert!(md.contains("# [Berita 1](/berita/1)"));
        assert!(md.contains(crate::images::PLACEHOLDER_IMAGE));
        assert!(md.contains("![](https://ui-avatars.com/api/?name=Budi) **Budi**"));
        assert!(md.contains("_Muat lebih banyak (offset 0)_"));
        assert!(md.contains("_Belum ada berita utama._"));
        assert!(!md.contains("## Trending"));
    }

    #[test]
    fn test_category_empty_sections() {
        let mut page = CategoryPage {
            name: "politik".to_string(),
            ..CategoryPage::default()
        };
        page.cursor.has_more = false;
        let md = page_to_markdown(&Page::Category(page), &ctx()).unwrap();

        assert!(md.contains("# POLITIK"));
        assert!(md.contains("Tidak ada berita lainnya."));
        assert!(md.contains("Belum ada berita terkini."));
        assert!(md.contains("_Semua berita telah dimuat_"));
    }

    #[test]
    fn test_poll_shares_fall_back_to_option_sum() {
        let page = Poll {
            id: 3,
            title: String::new(),
            question: "Setuju kenaikan tarif?".to_string(),
            total_votes: 0,
            options: vec![
                PollOption { id: 1, label: "Ya".to_string(), votes: 1500 },
                PollOption { id: 2, label: "Tidak".to_string(), votes: 500 },
            ],
            created_at: None,
        };
        let md = page_to_markdown(&Page::Poll(page), &ctx()).unwrap();

        assert!(md.contains("# Setuju kenaikan tarif?"));
        assert_eq!(md.matches("Setuju kenaikan tarif?").count(), 1);
        assert!(md.contains("- `1` Ya · 1.500 suara (75%)"));
        assert!(md.contains("- `2` Tidak · 500 suara (25%)"));
        assert!(md.contains("Total 2.000 suara"));
    }

    #[test]
    fn test_static_page_rewrites_images() {
        let page = StaticPage {
            id: 1,
            title: "Redaksi".to_string(),
            content: r#"<img src="tim.jpg">"#.to_string(),
            channel_id: None,
            category_id: None,
            created_at: None,
        };
        let md = page_to_markdown(&Page::Static(page), &ctx()).unwrap();
        assert!(md.contains("# Redaksi"));
        assert!(md.contains("https://sinpo.id/storage/tim.jpg"));
    }

    #[test]
    fn test_author_avatar_fallback() {
        let page = AuthorPage {
            author: Author {
                id: 3,
                name: "Rina Wati".to_string(),
                ..Author::default()
            },
            articles: Vec::new(),
        };
        let md = page_to_markdown(&Page::Author(page), &ctx()).unwrap();
        assert!(md.contains("name=Rina%20Wati&background=D91B1B"));
        assert!(md.contains("Belum ada berita dari wartawan ini."));
    }
}
