//! `sinpo_news` binary: parse the command line, then fetch and render one
//! page or run one reader action against the CMS.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use sinpo_news::api::CmsClient;
use sinpo_news::cli::{Cli, Command};
use sinpo_news::config::{self, Settings};
use sinpo_news::error::PageError;
use sinpo_news::feed::SharedSession;
use sinpo_news::outputs::{self, markdown::RenderContext};
use sinpo_news::pages::{self, ErrorPage, Page};
use sinpo_news::theme;
use sinpo_news::utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("sinpo_news starting up");

    let args = Cli::parse();
    debug!(command = ?args.command, format = ?args.format, "Parsed CLI arguments");

    let settings = config::settings(&args).await?;
    let theme = theme::load(&settings.state_dir).await;

    match &args.command {
        Command::Theme { action } => {
            let current = match action.apply(theme) {
                Some(next) => {
                    theme::save(&settings.state_dir, next).await?;
                    next
                }
                None => theme,
            };
            println!("{current}");
        }
        Command::Comment {
            article_id,
            name,
            comment,
            email,
        } => {
            let client = CmsClient::new(&settings.api_url, settings.api_token.clone())?;
            let message = client
                .store_comment(*article_id, name, email.as_deref(), comment)
                .await?;
            println!(
                "{}",
                message.unwrap_or_else(|| {
                    "Komentar Anda telah dikirim dan sedang menunggu moderasi.".to_string()
                })
            );
        }
        Command::Subscribe { email } => {
            let client = CmsClient::new(&settings.api_url, settings.api_token.clone())?;
            let message = client.subscribe(email).await?;
            println!("{}", message.unwrap_or_else(|| "Berhasil berlangganan.".to_string()));
        }
        Command::Vote { poll_id, option_id } => {
            let client = CmsClient::new(&settings.api_url, settings.api_token.clone())?;
            let message = client.vote(*poll_id, *option_id).await?;
            println!("{}", message.unwrap_or_else(|| "Terima kasih atas suara Anda.".to_string()));
        }
        command => {
            let client = CmsClient::new(&settings.api_url, settings.api_token.clone())?;
            debug!(base_url = %client.base_url(), "CMS client ready");
            let page = render_page(&client, command).await;
            let ctx = RenderContext::new(settings.image_base.clone(), theme);
            emit(&args, &settings, &page, &ctx).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Fetch, assemble and extend the page a command asks for. Fatal page
/// errors become an error page.
#[instrument(level = "info", skip(client))]
async fn render_page(client: &CmsClient, command: &Command) -> Page {
    let session = SharedSession::new();

    let (result, rounds): (Result<Page, PageError>, usize) = match command {
        Command::Home { load_more } => (Ok(Page::Home(pages::home(client, &session).await)), *load_more),
        Command::Article { id } => (pages::article(client, &session, *id).await.map(Page::Article), 0),
        Command::Category {
            category,
            load_more,
        } => (
            Ok(Page::Category(pages::category(client, &session, category).await)),
            *load_more,
        ),
        Command::Author { id } => (pages::author(client, *id).await.map(Page::Author), 0),
        Command::Gallery => (Ok(Page::Gallery(pages::gallery(client).await)), 0),
        Command::Poll { id } => (pages::poll(client, *id).await.map(Page::Poll), 0),
        Command::Static { id } => (pages::static_page(client, *id).await.map(Page::Static), 0),
        Command::Search { query, load_more } => (
            Ok(Page::Search(pages::search(client, &session, query).await)),
            *load_more,
        ),
        other => {
            warn!(command = ?other, "Command does not render a page");
            return Page::Error(ErrorPage::new("Halaman tidak dikenal"));
        }
    };

    match result {
        Ok(mut page) => {
            if rounds > 0 {
                pages::load_more(client, &session, &mut page, rounds).await;
            }
            page
        }
        Err(e) => {
            error!(error = %e, "Page failed to render");
            Page::Error(ErrorPage::new(e.to_string()))
        }
    }
}

async fn emit(
    args: &Cli,
    settings: &Settings,
    page: &Page,
    ctx: &RenderContext,
) -> Result<(), Box<dyn Error>> {
    let body = outputs::render(page, args.format, ctx)?;

    match &settings.output_dir {
        Some(dir) => {
            if let Err(e) = ensure_writable_dir(dir).await {
                error!(
                    path = %dir,
                    error = %e,
                    "Output directory is not writable (fix perms or choose a different path)"
                );
                return Err(e);
            }
            let path = outputs::write_page(dir, &page.file_stem(), args.format, &body).await?;
            println!("{}", path.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}
