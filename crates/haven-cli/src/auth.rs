//! Account session handling.
//!
//! The backend keeps authentication in a session cookie, which lives only as
//! long as the process. `auth.json` under the config dir records which account
//! was linked so later runs can re-authenticate with just a password prompt.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use haven_api::ApiClient;
use haven_chat::LocalStore;
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Stored account link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub email: String,
    pub verified: bool,
}

impl AuthSession {
    fn path() -> PathBuf {
        Config::config_dir().join("auth.json")
    }

    /// Load the stored account link, if any
    pub fn load() -> Option<Self> {
        let raw = fs::read_to_string(Self::path()).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Forget the account link
    pub fn clear() -> Result<()> {
        match fs::remove_file(Self::path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Log into an existing account and sync any guest-saved listings to it
pub async fn login(client: &ApiClient, local: &LocalStore, email: Option<String>) -> Result<AuthSession> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = prompt("Password")?;

    client
        .login(&email, &password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    sync_guest_properties(client, local).await?;

    let session = AuthSession {
        email,
        verified: true,
    };
    session.save()?;
    Ok(session)
}

/// Register a new account, verify it with the emailed code, and sync
/// guest-saved listings
pub async fn register(client: &ApiClient, local: &LocalStore) -> Result<AuthSession> {
    let email = prompt("Email")?;
    let password = prompt("Password")?;

    client
        .register(&email, &password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    println!("A verification code was sent to {email}.");
    let otp = prompt("Code")?;
    client
        .verify(&email, &otp)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    sync_guest_properties(client, local).await?;

    let session = AuthSession {
        email,
        verified: true,
    };
    session.save()?;
    Ok(session)
}

/// Re-authenticate a linked account at startup
pub async fn reauthenticate(client: &ApiClient, local: &LocalStore, session: &AuthSession) -> Result<()> {
    println!("Signed in as {} (password required each run).", session.email);
    let password = prompt("Password")?;
    client
        .login(&session.email, &password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    sync_guest_properties(client, local).await?;
    Ok(())
}

/// Move guest-saved listings onto the account. The local file is drained,
/// listings the account already holds are deduplicated server-side.
async fn sync_guest_properties(client: &ApiClient, local: &LocalStore) -> Result<()> {
    let properties = local
        .take_all()
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    for property in &properties {
        if let Err(e) = client.save_property(&property.url).await {
            tracing::warn!(url = %property.url, error = %e, "failed to sync saved listing");
        }
    }
    if !properties.is_empty() {
        println!("Synced {} saved listing(s) to your account.", properties.len());
    }
    Ok(())
}
