mod config;
mod interactive;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use clap::CommandFactory;
use clap::FromArgMatches;
use clap::Parser;
use clap::Subcommand;
use clap::builder::PossibleValuesParser;
use listing_client::AddItemPage;
use listing_client::HttpTransport;
use listing_client::Navigator;
use listing_client::PageView;
use listing_client::SubmitOutcome;
use listing_client::TempDirPreviewStore;
use listing_client::items_endpoint;
use listing_client::load_image_attachment;
use listing_protocol::ListingField;
use listing_protocol::catalog;
use tracing_subscriber::EnvFilter;

use crate::config::ConfigStore;
use crate::interactive::SessionEnd;

#[derive(Parser, Debug)]
#[command(version, about = "Create a marketplace listing with up to five images")]
struct Cli {
    /// Base URL of the marketplace API (defaults to `api_base_url` from the config file, then
    /// `http://localhost:5000`).
    #[arg(long, env = "LISTING_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Config file to use instead of `~/.listing/config.toml`.
    #[arg(long, env = "LISTING_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Edit the listing at a prompt before submitting.
    #[arg(long, short = 'i')]
    interactive: bool,

    #[command(flatten)]
    listing: ListingArgs,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Args, Debug, Default)]
struct ListingArgs {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long, value_parser = PossibleValuesParser::new(catalog::SIZES.iter().copied()))]
    size: Option<String>,

    #[arg(long, value_parser = PossibleValuesParser::new(catalog::CATEGORIES.iter().copied()))]
    category: Option<String>,

    #[arg(long, value_parser = PossibleValuesParser::new(catalog::GENDERS.iter().copied()))]
    gender: Option<String>,

    #[arg(
        long,
        value_parser = PossibleValuesParser::new(catalog::AGE_CATEGORIES.iter().copied())
    )]
    age_category: Option<String>,

    /// Comma-separated tags, e.g. `vintage, casual, summer`.
    #[arg(long)]
    tags: Option<String>,

    /// Image to attach. Repeat for more images (at most five).
    #[arg(long = "image", value_name = "PATH")]
    images: Vec<String>,
}

impl ListingArgs {
    fn field_values(&self) -> Vec<(ListingField, &str)> {
        [
            (ListingField::Title, &self.title),
            (ListingField::Description, &self.description),
            (ListingField::Size, &self.size),
            (ListingField::Category, &self.category),
            (ListingField::Gender, &self.gender),
            (ListingField::AgeCategory, &self.age_category),
            (ListingField::Tags, &self.tags),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|value| (field, value)))
        .collect()
    }
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Remember the signed-in user and API token.
    Login {
        #[arg(long)]
        user: String,

        #[arg(long, env = "LISTING_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Forget the signed-in user.
    Logout,
}

/// Prints where the listing can be seen once it has been created.
struct TerminalNavigator {
    dashboard_url: String,
}

impl Navigator for TerminalNavigator {
    fn go_to_dashboard(&mut self) {
        println!("Item added. Continue at {}", self.dashboard_url);
    }
}

fn parse_cli() -> Cli {
    let matches = Cli::command()
        .version(listing_client::LISTING_VERSION)
        .get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = parse_cli();

    let store = match &cli.config {
        Some(path) => ConfigStore::new(path.clone()),
        None => ConfigStore::new_default()?,
    };

    match &cli.command {
        Some(CliCommand::Login { user, token }) => {
            store
                .set_session(user, token)
                .with_context(|| format!("save session to {}", store.path().display()))?;
            println!("Signed in as {user}.");
            return Ok(());
        }
        Some(CliCommand::Logout) => {
            store
                .clear_session()
                .with_context(|| format!("clear session in {}", store.path().display()))?;
            println!("Signed out.");
            return Ok(());
        }
        None => {}
    }

    let settings = store.load().context("load listing config")?;
    let api_base_url = settings.resolve_api_base_url(cli.api_base_url.as_deref());
    let dashboard_url = settings.resolve_dashboard_url(&api_base_url);

    let previews = TempDirPreviewStore::new().context("create preview directory")?;
    let mut page = match PageView::open(settings.user, previews, items_endpoint(&api_base_url)) {
        PageView::Form(page) => page,
        PageView::LoginRequired => {
            eprint!("{}", render::render_login_required());
            std::process::exit(1);
        }
    };

    for (field, value) in cli.listing.field_values() {
        page.set_field(field, value);
    }
    attach_images(&mut page, &cli.listing.images)?;

    let transport =
        HttpTransport::new(page.user().token.clone()).context("build HTTP client")?;
    let mut navigator = TerminalNavigator { dashboard_url };

    let created = if cli.interactive {
        match interactive::run(&mut page, &transport, &mut navigator).await? {
            SessionEnd::Submitted => true,
            SessionEnd::Quit => return Ok(()),
        }
    } else {
        matches!(
            page.submit(&transport, &mut navigator).await,
            SubmitOutcome::NavigateToDashboard
        )
    };

    if !created {
        if let Some(message) = page.message() {
            eprintln!("{}", render::render_error(message));
        }
        // `std::process::exit` skips destructors, so explicitly drop the page to delete the
        // preview files before exiting.
        drop(page);
        std::process::exit(1);
    }
    Ok(())
}

/// Load every `--image` and attach them as one batch.
///
/// An unreadable image or a batch over the attachment limit aborts the run.
fn attach_images(
    page: &mut AddItemPage<TempDirPreviewStore>,
    paths: &[String],
) -> anyhow::Result<()> {
    if paths.is_empty() {
        return Ok(());
    }
    let batch = paths
        .iter()
        .map(String::as_str)
        .map(load_image_attachment)
        .collect::<Result<Vec<_>, _>>()
        .context("load images")?;
    page.add_images(batch).context("attach images")?;
    tracing::debug!("attached {} image(s)", page.attachments().count());
    Ok(())
}
