//! # CLI Module
//!
//! The command-line layer of Spodcli. Each command receives an explicitly
//! constructed [`crate::management::TokenManager`] (wrapped in a
//! [`crate::spotify::SpotifyClient`] for the read commands), performs one
//! operation and renders the result.
//!
//! ## Command Categories
//!
//! ### Authentication
//!
//! - [`auth`] - Runs the OAuth authorization code flow
//! - [`status`] - Shows whether a usable token is stored and for how long
//! - [`refresh`] - Forces a token refresh
//! - [`logout`] - Removes stored tokens
//!
//! ### Reading
//!
//! - [`episode`] - Episode details
//! - [`show`] - Show details
//! - [`saved`] - One page of saved episodes
//! - [`search`] - Searches saved episodes by episode or show name
//! - [`catalog`] - Searches the public catalog
//!
//! ## Output
//!
//! Results go to stdout as markdown, or as pretty printed JSON with
//! `--json`. Progress and diagnostics go to stderr through the crate's
//! logging macros. Any unrecovered error is printed with `error!`, which
//! exits with status 1.

mod auth;
mod catalog;
mod episode;
mod saved;
mod show;

pub use auth::auth;
pub use auth::logout;
pub use auth::refresh;
pub use auth::status;
pub use catalog::CatalogQuery;
pub use catalog::catalog;
pub use catalog::catalog_json;
pub use catalog::catalog_markdown;
pub use episode::episode;
pub use episode::episode_json;
pub use episode::episode_markdown;
pub use saved::collect_saved_episodes;
pub use saved::saved;
pub use saved::saved_json;
pub use saved::saved_markdown;
pub use saved::search;
pub use saved::search_json;
pub use saved::search_markdown;
pub use show::show;
pub use show::show_json;
pub use show::show_markdown;

use serde::Serialize;

use crate::error;

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to render JSON output: {}", e),
    }
}
