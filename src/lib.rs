//! # SinPo News
//!
//! Command-line reader for the SinPo news CMS. It fetches content from the
//! CMS API, normalizes the drifting legacy/modern record shapes into one
//! canonical model, and lays articles out over page sections so that no
//! article appears twice on a page.
//!
//! ## Usage
//!
//! ```sh
//! sinpo_news home --load-more 1
//! sinpo_news --format json -o ./out article 1201
//! sinpo_news theme toggle
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: [`api::CmsClient`] calls the endpoints a page needs,
//!    concurrently
//! 2. **Normalizing**: [`normalize`] maps raw records to [`models`] entities
//! 3. **Allocating**: [`pages`] distributes pools over sections through the
//!    de-duplicating [`feed`] allocator; "load more" continues per section
//! 4. **Output**: [`outputs`] renders JSON or Markdown to stdout or a file
//!
//! The binary in `main.rs` is a thin shell over these modules; everything it
//! does is reachable from here as a library.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod images;
pub mod models;
pub mod normalize;
pub mod outputs;
pub mod pages;
pub mod theme;
pub mod utils;
