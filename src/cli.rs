//! Command-line interface definitions for SinPo News.
//!
//! Global options can come from flags, environment variables or the YAML
//! config file (see [`crate::config`]). Each subcommand renders one page or
//! submits one reader action.

use crate::theme::Theme;
use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for the SinPo News reader.
///
/// # Examples
///
/// ```sh
/// # Front page as Markdown on stdout
/// sinpo_news home
///
/// # Category page with two "load more" rounds, written as JSON
/// sinpo_news --format json -o ./out category politik --load-more 2
///
/// # Against a staging API
/// SINPO_API_URL=https://staging.sinpo.id sinpo_news article 1201
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// CMS API base URL (`/api` is appended when missing)
    #[arg(long, env = "SINPO_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token sent with every API request
    #[arg(long, env = "SINPO_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Host that serves cover images and uploads
    #[arg(long, env = "SINPO_IMAGE_BASE")]
    pub image_base: Option<String>,

    /// Directory holding reader preferences (theme)
    #[arg(long, env = "SINPO_STATE_DIR")]
    pub state_dir: Option<String>,

    /// Output format of rendered pages
    #[arg(short, long, value_enum, default_value_t = Format::Markdown)]
    pub format: Format,

    /// Write pages into this directory instead of stdout
    #[arg(short, long)]
    pub output_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Markdown,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Front page
    Home {
        /// "Load more" rounds for the timeline and Berita Utama
        #[arg(long, default_value_t = 0)]
        load_more: usize,
    },
    /// Article detail with related news and comments
    Article { id: i64 },
    /// Category page by numeric id, slug or name
    Category {
        category: String,
        #[arg(long, default_value_t = 0)]
        load_more: usize,
    },
    /// Journalist profile and their latest articles
    Author { id: i64 },
    /// Photo and gallery overview
    Gallery,
    /// Full-text search
    Search {
        query: String,
        #[arg(long, default_value_t = 0)]
        load_more: usize,
    },
    /// Post a reader comment on an article
    Comment {
        article_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        comment: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Subscribe an address to the newsletter
    Subscribe { email: String },
    /// Show a reader poll with its current tally
    Poll { id: i64 },
    /// Vote in a reader poll
    Vote { poll_id: i64, option_id: i64 },
    /// Static page such as the editorial board or an opinion column
    Static { id: i64 },
    /// Show or change the persisted colour theme
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    Show,
    Toggle,
    Light,
    Dark,
}

impl ThemeAction {
    /// The theme to persist, given the current one; `None` for `show`.
    pub fn apply(self, current: Theme) -> Option<Theme> {
        match self {
            ThemeAction::Show => None,
            ThemeAction::Toggle => Some(current.toggle()),
            ThemeAction::Light => Some(Theme::Light),
            ThemeAction::Dark => Some(Theme::Dark),
        }
    }
}
