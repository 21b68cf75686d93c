//! Authentication commands for GitHub credentials management.
//!
//! The CLI authenticates with a GitHub personal access token. The token is read from the
//! `GITHUB_TOKEN` environment variable when set, and from the system keyring otherwise.
//! `branch-sync auth github` stores a token in the keyring.

use std::io::Write;

use clap::Subcommand;
use github_client::{create_token_client, GitHubClient, RepositoryClient};
use keyring::Entry;
use secrecy::SecretString;
use tracing::{debug, error, info, instrument};

use crate::errors::Error;

pub const KEY_RING_SERVICE_NAME: &str = "branch_sync_cli";
pub const KEY_RING_USER_TOKEN: &str = "github_token";

/// Environment variable that takes precedence over the keyring
pub const GITHUB_TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

#[cfg(test)]
#[path = "auth_cmd_tests.rs"]
mod tests;

/// Authentication subcommands for managing GitHub credentials.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store a GitHub personal access token in the system keyring.
    #[command(name = "github")]
    GitHub {
        /// Authentication method to configure. Only "token" is supported.
        #[arg(default_value = "token")]
        method: String,
    },

    /// Resolve the configured token and show the authenticated user.
    Check,
}

/// Executes the specified authentication command.
///
/// # Errors
///
/// Returns an error if keyring operations fail, the method is not supported, or the
/// token is rejected by GitHub.
#[instrument]
pub async fn execute(cmd: &AuthCommands) -> Result<(), Error> {
    match cmd {
        AuthCommands::GitHub { method } => auth_github(method).await,
        AuthCommands::Check => {
            let client = create_github_client()?;
            let login = check_authentication(&client).await?;
            println!("Authenticated as {}", login);
            Ok(())
        }
    }
}

#[instrument]
async fn auth_github(method: &str) -> Result<(), Error> {
    debug!(message = "Authenticating with GitHub", method = method);

    if method != "token" {
        let err = Error::InvalidArguments(format!("Unsupported authentication method: {}", method));
        error!(message = "Unsupported authentication method", method = method, error = ?err);
        return Err(err);
    }

    info!(message = "GitHub Personal Access Token Authentication");
    println!("GitHub Personal Access Token Authentication");
    println!("------------------------------------------");
    println!("Please provide your GitHub Personal Access Token.");
    print!("Token: ");
    std::io::stdout()
        .flush()
        .map_err(|_| Error::StdOutFlushFailed)?;

    let mut token = String::new();
    std::io::stdin()
        .read_line(&mut token)
        .map_err(|e| Error::Auth(format!("Failed to read input: {}", e)))?;
    let token = token.trim();
    debug!(message = "Read token from stdin");

    if token.is_empty() {
        let err = Error::Auth("Token cannot be empty".to_string());
        error!(message = "Token cannot be empty", error = ?err);
        return Err(err);
    }

    let keyring = Entry::new(KEY_RING_SERVICE_NAME, KEY_RING_USER_TOKEN)
        .map_err(|e| Error::Auth(format!("Failed to create an entry in the keyring: {}", e)))?;
    keyring
        .set_password(token)
        .map_err(|e| Error::Auth(format!("Failed to save token to keyring: {}", e)))?;
    debug!(message = "Saved token to keyring");

    println!("GitHub token authentication configured successfully!");
    Ok(())
}

/// Picks the token from the environment value, falling back to the keyring lookup.
///
/// Blank values are ignored. The keyring is only consulted when the environment does not
/// provide a token.
pub fn token_from_sources<F>(env_token: Option<String>, keyring_token: F) -> Result<SecretString, Error>
where
    F: FnOnce() -> Result<String, String>,
{
    if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
        debug!("Using token from {}", GITHUB_TOKEN_ENV_VAR);
        return Ok(SecretString::from(token.trim().to_string()));
    }

    let token = keyring_token().map_err(|e| {
        Error::Auth(format!(
            "No token found. Set {} or run 'branch-sync auth github' ({})",
            GITHUB_TOKEN_ENV_VAR, e
        ))
    })?;
    if token.trim().is_empty() {
        return Err(Error::Auth("The stored token is empty".to_string()));
    }

    debug!("Using token from the system keyring");
    Ok(SecretString::from(token.trim().to_string()))
}

/// Resolves the GitHub token from `GITHUB_TOKEN` or the system keyring.
pub fn resolve_token() -> Result<SecretString, Error> {
    token_from_sources(std::env::var(GITHUB_TOKEN_ENV_VAR).ok(), || {
        Entry::new(KEY_RING_SERVICE_NAME, KEY_RING_USER_TOKEN)
            .and_then(|entry| entry.get_password())
            .map_err(|e| e.to_string())
    })
}

/// Builds an authenticated GitHub client from the resolved token.
pub fn create_github_client() -> Result<GitHubClient, Error> {
    let token = resolve_token()?;
    let octocrab = create_token_client(&token).map_err(|e| Error::Auth(e.to_string()))?;
    Ok(GitHubClient::new(octocrab))
}

/// Returns the login of the user the client is authenticated as.
pub async fn check_authentication(client: &dyn RepositoryClient) -> Result<String, Error> {
    let user = client
        .get_authenticated_user()
        .await
        .map_err(|e| Error::Auth(e.to_string()))?;
    info!(login = %user.login, "Authenticated with GitHub");
    Ok(user.login)
}
