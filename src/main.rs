use std::io::Write;

use clap::{Parser, Subcommand};
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

use floorscout::config::{load_config, AppConfig};
use floorscout::console;
use floorscout::console::command_handler::{Repl, ReplAction};
use floorscout::engine::QueryEngineImpl;
use floorscout::loader::{DatasetCache, SheetLoader};
use floorscout::model::StorageError;
use floorscout::storage::UserStore;

#[derive(Parser)]
#[command(name = "floorscout", about = "Dealer floor price lookup")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.json")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and search the price sheet interactively (the default)
    Run,
    /// Create a user account
    AddUser { username: String },
    /// List user accounts
    ListUsers,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Load configuration from file
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let store = match UserStore::new(&config.users_db) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to open user store: {e}");
            return;
        }
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config, store).await,
        Command::AddUser { username } => add_user(&store, &username).await,
        Command::ListUsers => list_users(&store),
    }
}

async fn run(config: AppConfig, store: UserStore) {
    let loader = SheetLoader::new(&config.price_sheet);
    let cache = match DatasetCache::open(loader, &config.price_sheet).await {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load price sheet: {e}");
            return;
        }
    };
    info!(
        "Loaded {} products from {}",
        cache.current().len(),
        config.price_sheet
    );

    let mut lines = console::input_lines();
    let Some(session) = console::login(&mut lines, &store, &config.admins).await else {
        return;
    };
    info!("Session opened for {}", session.username);

    let mut repl = Repl {
        engine: QueryEngineImpl::new(),
        cache,
        store,
        session,
        search: config.search.clone(),
    };

    println!("Enter a product model to search, or /help for commands.");

    let mut reload_tick = interval(Duration::from_secs(config.reload_interval_seconds.max(1)));
    reload_tick.tick().await; // the first tick completes immediately

    let mut show_prompt = true;
    loop {
        if show_prompt {
            print!("> ");
            let _ = std::io::stdout().flush();
        }
        show_prompt = tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if matches!(repl.handle_line(&line).await, ReplAction::Quit) {
                            println!("Bye.");
                            break;
                        }
                        true
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Input error: {e}");
                        break;
                    }
                }
            }
            _ = reload_tick.tick() => {
                match repl.cache.refresh_if_stale().await {
                    Ok(true) => info!("Price sheet changed on disk, snapshot refreshed."),
                    Ok(false) => {}
                    Err(e) => warn!("Reload failed: {e}"),
                }
                false
            }
        };
    }
}

async fn add_user(store: &UserStore, username: &str) {
    let mut lines = console::input_lines();
    let Some(password) = console::prompt(&mut lines, "Password: ").await else {
        return;
    };
    let Some(confirm) = console::prompt(&mut lines, "Confirm password: ").await else {
        return;
    };

    if password.is_empty() {
        println!("Please enter a username and password.");
        return;
    }
    if password != confirm {
        println!("Passwords do not match.");
        return;
    }
    match store.create_user(username, &password) {
        Ok(()) => println!("User created successfully! You can now log in."),
        Err(StorageError::UsernameTaken) => println!("Username already exists."),
        Err(e) => error!("Failed to create user: {e}"),
    }
}

fn list_users(store: &UserStore) {
    match store.list_users() {
        Ok(users) if users.is_empty() => println!("No users found."),
        Ok(users) => {
            for user in users {
                println!("{}\t{}", user.username, user.created_at.format("%Y-%m-%d %H:%M"));
            }
        }
        Err(e) => error!("Failed to list users: {e}"),
    }
}
