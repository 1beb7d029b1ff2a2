//! # API Module
//!
//! HTTP handlers for the one-shot OAuth callback listener.
//!
//! - [`callback`] - Receives the redirect on `/callback`, answers with a
//!   success or error page and hands the query parameters to the waiting
//!   authorization flow.
//! - [`unexpected_path`] - Answers anything else with 404. It still counts as
//!   the single request the listener serves.
//!
//! The handlers share a [`CallbackState`] through an axum `Extension`. Axum
//! does not log requests on its own, so the listener adds no noise to the
//! terminal while the user is logging in.

mod callback;

pub use callback::CallbackOutcome;
pub use callback::CallbackState;
pub use callback::callback;
pub use callback::parse_callback_query;
pub use callback::unexpected_path;
