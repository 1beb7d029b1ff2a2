//! # Spotify Integration Module
//!
//! The layer between the command line and Spotify's services: the OAuth 2.0
//! authorization code flow against the accounts service, and authenticated
//! reads against the Web API.
//!
//! ## Architecture
//!
//! ```text
//! CLI commands
//!      ↓
//! SpotifyClient (fetch helper, error mapping)
//!      ↓
//! TokenManager (token lifecycle, persistence)
//!      ↓
//! auth (authorization code protocol) ── CallbackServer (loopback redirect)
//!      ↓
//! Transport (reqwest) / Clock
//! ```
//!
//! ## Modules
//!
//! - [`auth`] - Authorization session and CSRF `state`, authorization URL,
//!   Basic client authentication, code exchange and refresh grants, and the
//!   [`auth::CallbackReceiver`] seam with its loopback implementation.
//! - [`client`] - [`SpotifyClient`]: one GET per call with a 10 second
//!   timeout; 401, 403, 404, 429 and 5xx each map to their own error kind.
//! - [`transport`] - The [`Transport`] and [`Clock`] seams. Tests swap them
//!   for scripted doubles.
//!
//! ## API Coverage
//!
//! - `GET /me/episodes` - Saved episodes, paginated (`user-library-read`)
//! - `GET /episodes/{id}` - Episode details
//! - `GET /shows/{id}` - Show details
//! - `GET /search` - Catalog search
//! - `POST /api/token` - Code exchange and refresh
//!
//! ## Error Handling
//!
//! Every failure is terminal for the call that hit it: no retries, no
//! backoff. Callers get a [`crate::error::SpotifyError`] whose message says
//! what to do next.

pub mod auth;
pub mod client;
pub mod transport;

pub use client::SpotifyClient;
pub use transport::Clock;
pub use transport::HttpReply;
pub use transport::ReqwestTransport;
pub use transport::SystemClock;
pub use transport::Transport;
pub use transport::TransportError;
