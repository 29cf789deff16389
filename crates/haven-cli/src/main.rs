//! haven - rental property chat in the terminal

mod auth;
mod commands;
mod config;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use haven_api::ApiClient;
use haven_chat::{prompts, ChatSession, HttpBackend, LocalStore, PropertyStore, RemoteStore};
use tracing_subscriber::EnvFilter;

use crate::auth::AuthSession;
use crate::config::Config;

/// haven - rental property chat assistant
#[derive(Parser, Debug)]
#[command(name = "haven")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (overrides config)
    #[arg(short, long)]
    backend: Option<String>,

    /// Open the conversation on a specific property id
    #[arg(long)]
    property: Option<String>,

    /// Start with a rental search in this location
    #[arg(long)]
    search: Option<String>,

    /// Monthly budget for --search
    #[arg(long, default_value = "2000")]
    budget: String,

    /// Number of occupants for --search
    #[arg(long, default_value_t = 1)]
    occupants: u32,

    /// Move-in date for --search (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    move_in: Option<String>,

    /// Log into an existing account before starting
    #[arg(long)]
    login: bool,

    /// Register a new account before starting
    #[arg(long)]
    register: bool,

    /// Forget the linked account and exit
    #[arg(long)]
    logout: bool,

    /// Skip account re-authentication and run as a guest
    #[arg(long)]
    guest: bool,

    /// Write an example config file and exit
    #[arg(long)]
    init_config: bool,

    /// Verbose logging (written to the log file, stderr belongs to the TUI)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        init_logging()?;
    }

    if args.init_config {
        let path = Config::config_path();
        if path.exists() {
            println!("Config file already exists at: {}", path.display());
        } else {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(&path, config::example_config())?;
            println!("Config file created at: {}", path.display());
        }
        return Ok(());
    }

    if args.logout {
        AuthSession::clear()?;
        println!("Logged out.");
        return Ok(());
    }

    let cfg = Config::load();
    let base_url = args.backend.clone().unwrap_or_else(|| cfg.backend_url());
    let client = ApiClient::new(&base_url)
        .with_context(|| format!("invalid backend URL '{base_url}'"))?;

    let local = Arc::new(
        LocalStore::load(
            Config::config_dir().join("saved_properties.json"),
            client.clone(),
        )
        .map_err(|e| anyhow::anyhow!(e.user_message()))?,
    );

    // Account handling happens on stdio before the TUI takes the terminal
    let mut account: Option<String> = None;
    if args.register {
        let session = auth::register(&client, &local).await?;
        account = Some(session.email);
    } else if args.login {
        let stored = AuthSession::load().map(|s| s.email);
        let session = auth::login(&client, &local, stored).await?;
        account = Some(session.email);
    } else if !args.guest
        && let Some(stored) = AuthSession::load()
    {
        match auth::reauthenticate(&client, &local, &stored).await {
            Ok(()) => account = Some(stored.email),
            Err(e) => {
                eprintln!("Could not sign in ({e}); continuing as guest.");
            }
        }
    }

    let (store, guest): (Arc<dyn PropertyStore>, Option<Arc<LocalStore>>) = if account.is_some() {
        (Arc::new(RemoteStore::new(client.clone())), None)
    } else {
        (local.clone(), Some(local))
    };

    let initial_prompt = initial_prompt(&args)?;

    let backend = Arc::new(HttpBackend::new(client.clone()));
    let mut session = ChatSession::new(backend);

    ui::run_tui(
        &mut session,
        &client,
        store,
        guest,
        &cfg,
        account,
        initial_prompt,
    )
    .await
}

/// Prompt submitted automatically at startup, from a property deep link or a
/// stored search handoff
fn initial_prompt(args: &Args) -> anyhow::Result<Option<String>> {
    if let Some(id) = &args.property {
        return Ok(Some(prompts::property_prompt(id)));
    }
    if let Some(location) = &args.search {
        let move_in = match &args.move_in {
            Some(raw) => chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("'{raw}' is not a date (expected YYYY-MM-DD)"))?,
            None => chrono::Local::now().date_naive(),
        };
        return Ok(Some(prompts::search_handoff_prompt(
            location,
            &args.budget,
            &args.occupants.to_string(),
            &move_in.format("%Y-%m-%d").to_string(),
        )));
    }
    Ok(None)
}

fn init_logging() -> anyhow::Result<()> {
    let dir = Config::config_dir();
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("haven.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("haven=debug")),
        )
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_prompt_from_property_id() {
        let args = Args::parse_from(["haven", "--property", "1bD2"]);
        assert_eq!(
            initial_prompt(&args).unwrap().as_deref(),
            Some("Show me the property with id 1bD2")
        );
    }

    #[test]
    fn test_initial_prompt_from_search() {
        let args = Args::parse_from([
            "haven",
            "--search",
            "Camden",
            "--budget",
            "1800",
            "--occupants",
            "2",
            "--move-in",
            "2026-10-01",
        ]);
        assert_eq!(
            initial_prompt(&args).unwrap().as_deref(),
            Some(
                "Find me rental properties in Camden within the budget of 1800 \
                 allowing the occupancy of 2 with the availability to move in on 2026-10-01"
            )
        );
    }

    #[test]
    fn test_bad_move_in_date_is_rejected() {
        let args = Args::parse_from(["haven", "--search", "Camden", "--move-in", "soon"]);
        assert!(initial_prompt(&args).is_err());
    }
}
