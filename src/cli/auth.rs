use crate::{error, info, management::TokenManager, success, utils};

/// Runs the authorization flow unless a valid token is already stored.
pub async fn auth(mut tokens: TokenManager) {
    if tokens.has_valid_token() {
        info!("Already authenticated with valid tokens.");
        info!("Token file: {}", tokens.token_location());
        info!("To re-authenticate, first run: spodcli auth logout");
        return;
    }

    info!("=== Spotify Authentication ===");
    match tokens.authenticate().await {
        Ok(()) => {
            success!("Authentication successful!");
            info!("Tokens saved to: {}", tokens.token_location());
        }
        Err(e) => error!("{}", e),
    }
}

/// Prints scopes, token file and remaining lifetime. Exits non-zero when
/// there is no usable token.
pub async fn status(tokens: TokenManager) {
    let Some(record) = tokens.record() else {
        error!("Not authenticated\n\nRun: spodcli auth");
    };

    if !tokens.has_valid_token() {
        error!("Tokens expired\n\nRun: spodcli auth refresh");
    }

    success!("Authenticated");
    info!("Token file: {}", tokens.token_location());
    info!("Scopes: {}", record.scope);
    if let Some(remaining_ms) = tokens.expires_in_ms() {
        info!("Expires in: {}", utils::format_remaining(remaining_ms / 1000));
    }
}

/// Forces a refresh of the access token.
pub async fn refresh(mut tokens: TokenManager) {
    if !tokens.is_authenticated() {
        error!("Not authenticated\n\nRun: spodcli auth");
    }

    match tokens.refresh().await {
        Ok(()) => success!("Token refreshed successfully"),
        Err(e) => error!(
            "{}\n\nYou may need to re-authenticate:\n  spodcli auth logout\n  spodcli auth",
            e
        ),
    }
}

/// Removes stored tokens.
pub async fn logout(mut tokens: TokenManager) {
    if !tokens.is_authenticated() {
        info!("Not authenticated (no tokens to clear)");
        return;
    }

    let location = tokens.token_location();
    tokens.clear_tokens().await;
    success!("Logged out successfully");
    info!("Tokens cleared from {}", location);
    info!("To authenticate again, run: spodcli auth");
}
