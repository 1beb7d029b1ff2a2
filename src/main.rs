use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use spodcli::{
    cli,
    config::{self, OAuthSettings},
    error,
    management::{FileTokenStore, TokenManager},
    spotify::SpotifyClient,
    warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Token file location (overrides SPOTIFY_TOKEN_PATH)
    #[clap(long, global = true)]
    token_path: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API (default), or manage stored tokens
    Auth(AuthOptions),

    /// Show details of an episode
    Episode(EpisodeOptions),

    /// Show details of a show/podcast
    Show(ShowOptions),

    /// List saved episodes
    Saved(SavedOptions),

    /// Search saved episodes by episode or show name
    Search(SearchOptions),

    /// Search the Spotify catalog
    Catalog(CatalogOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Subcommands under `auth`; without one the login flow runs
    #[command(subcommand)]
    pub command: Option<AuthSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AuthSubcommand {
    /// Run the OAuth login flow
    Login,
    /// Check authentication status
    Status,
    /// Refresh the access token
    Refresh,
    /// Clear stored tokens
    Logout,
}

#[derive(Parser, Debug, Clone)]
pub struct EpisodeOptions {
    /// Spotify episode ID
    #[clap(long = "id")]
    pub episode_id: String,

    /// Market code (e.g. US, GB)
    #[clap(long)]
    pub market: Option<String>,

    /// Output JSON instead of markdown
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowOptions {
    /// Spotify show ID
    #[clap(long = "id")]
    pub show_id: String,

    /// Output JSON instead of markdown
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SavedOptions {
    /// Maximum episodes to return (1-50)
    #[clap(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub limit: u32,

    /// Pagination offset
    #[clap(long, default_value_t = 0)]
    pub offset: u32,

    /// Market code (e.g. US, GB)
    #[clap(long)]
    pub market: Option<String>,

    /// Output JSON instead of markdown
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Search term (matches episode or show name)
    #[clap(long)]
    pub query: String,

    /// Maximum results to return
    #[clap(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: u32,

    /// Output JSON instead of markdown
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CatalogOptions {
    /// Search keywords
    #[clap(long)]
    pub query: String,

    /// Comma separated item types
    #[clap(long = "type", default_value = "episode,show")]
    pub types: String,

    /// Maximum results per type (1-50)
    #[clap(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub limit: u32,

    /// Pagination offset
    #[clap(long, default_value_t = 0)]
    pub offset: u32,

    /// Market code (e.g. US, GB)
    #[clap(long)]
    pub market: Option<String>,

    /// Output JSON instead of markdown
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SPODCLI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment file. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let settings = match OAuthSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("{}", e),
    };

    let store = FileTokenStore::new(config::token_path(cli.token_path));
    let tokens = TokenManager::load(settings, Box::new(store)).await;

    match cli.command {
        Command::Auth(opt) => match opt.command {
            None | Some(AuthSubcommand::Login) => cli::auth(tokens).await,
            Some(AuthSubcommand::Status) => cli::status(tokens).await,
            Some(AuthSubcommand::Refresh) => cli::refresh(tokens).await,
            Some(AuthSubcommand::Logout) => cli::logout(tokens).await,
        },

        Command::Episode(opt) => {
            cli::episode(SpotifyClient::new(tokens), opt.episode_id, opt.market, opt.json).await
        }

        Command::Show(opt) => cli::show(SpotifyClient::new(tokens), opt.show_id, opt.json).await,

        Command::Saved(opt) => {
            cli::saved(
                SpotifyClient::new(tokens),
                opt.limit,
                opt.offset,
                opt.market,
                opt.json,
            )
            .await
        }

        Command::Search(opt) => {
            cli::search(
                SpotifyClient::new(tokens),
                opt.query,
                opt.limit as usize,
                opt.json,
            )
            .await
        }

        Command::Catalog(opt) => {
            let query = cli::CatalogQuery {
                query: opt.query,
                types: opt.types,
                limit: opt.limit,
                offset: opt.offset,
                market: opt.market,
            };
            cli::catalog(SpotifyClient::new(tokens), query, opt.json).await
        }

        Command::Completions(_) => {}
    }
}
