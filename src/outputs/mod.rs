//! Output generation for rendered pages.
//!
//! # Submodules
//!
//! - [`json`]: serializes a [`Page`](crate::pages::Page) for API-style consumers
//! - [`markdown`]: renders a page as a readable Markdown document
//!
//! # Output Structure
//!
//! With `--output-dir` each page lands in its own file:
//!
//! ```text
//! output_dir/
//! ├── home.md
//! ├── article-1201.json
//! └── category-4.md
//! ```
//!
//! Without it the rendered page goes to stdout.

pub mod json;
pub mod markdown;

use crate::cli::Format;
use crate::pages::Page;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Render `page` in `format`.
pub fn render(page: &Page, format: Format, ctx: &markdown::RenderContext) -> Result<String, Box<dyn Error>> {
    match format {
        Format::Json => Ok(json::page_to_json(page)?),
        Format::Markdown => Ok(markdown::page_to_markdown(page, ctx)?),
    }
}

fn extension(format: Format) -> &'static str {
    match format {
        Format::Json => "json",
        Format::Markdown => "md",
    }
}

/// Write a rendered page to `{output_dir}/{file_stem}.{ext}` and return the path.
#[instrument(level = "info", skip(body), fields(bytes = body.len()))]
pub async fn write_page(
    output_dir: &str,
    file_stem: &str,
    format: Format,
    body: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let path = PathBuf::from(output_dir).join(format!("{file_stem}.{}", extension(format)));
    fs::write(&path, body).await?;
    info!(path = %path.display(), "Wrote page");
    Ok(path)
}
