//! Session commands.
//!
//! The session file (see `GM_SESSION_FILE`) makes sign-in sticky across
//! invocations: `login` writes it, every other command reads it, `logout`
//! clears it.

use green_mango_client::{ApiError, Client};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthCommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No saved session, or the saved tokens can no longer be renewed.
    #[error("Not signed in. Run `gm-cli auth login` first.")]
    NotSignedIn,
}

/// Sign in and persist the session.
#[allow(clippy::print_stdout)]
pub async fn login(client: &Client, email: &str, password: &str) -> Result<(), AuthCommandError> {
    let profile = client.auth().login(email, password).await?;
    println!("Signed in as {} <{}>", profile.full_name, profile.email);
    Ok(())
}

/// Sign out, notifying the backend best-effort.
#[allow(clippy::print_stdout)]
pub async fn logout(client: &Client) {
    client.auth().logout().await;
    println!("Signed out.");
}

/// Show the signed-in user, renewing the access token if needed.
#[allow(clippy::print_stdout)]
pub async fn whoami(client: &Client) -> Result<(), AuthCommandError> {
    if !client.session().is_valid().await {
        return Err(AuthCommandError::NotSignedIn);
    }

    let profile = client.auth().fetch_user_info().await?;
    println!("{} <{}>", profile.full_name, profile.email);
    println!("  role:     {}", profile.role);
    println!("  verified: {}", profile.verified);
    Ok(())
}
