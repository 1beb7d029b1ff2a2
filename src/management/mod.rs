mod auth;
mod store;

pub use auth::TokenManager;
pub use store::FileTokenStore;
pub use store::TokenStore;
