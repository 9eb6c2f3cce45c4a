// console/command_handler.rs

use std::collections::HashSet;

use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::engine::{QueryEngine, QueryEngineImpl};
use crate::loader::{DatasetCache, SheetLoader};
use crate::model::{MatchMode, QueryError, QueryOutcome};
use crate::session::Session;
use crate::storage::UserStore;

pub enum ReplAction {
    Continue,
    Quit,
}

/// Interactive state: one logged-in session working against the current
/// dataset snapshot.
pub struct Repl {
    pub engine: QueryEngineImpl,
    pub cache: DatasetCache<SheetLoader>,
    pub store: UserStore,
    pub session: Session,
    pub search: SearchConfig,
}

impl Repl {
    /// Lines starting with `/` are commands; anything else is a search query.
    pub async fn handle_line(&mut self, line: &str) -> ReplAction {
        let line = line.trim();
        if line.is_empty() {
            return ReplAction::Continue;
        }
        if line.starts_with('/') {
            return self.handle_command(line).await;
        }
        self.run_query(line);
        ReplAction::Continue
    }

    async fn handle_command(&mut self, command_text: &str) -> ReplAction {
        info!("Handling command: {}", command_text);
        let mut parts = command_text.split_whitespace();
        let command = parts.next().unwrap_or("");

        match command {
            "/help" => {
                println!(
                    "📋 Available commands:\n\
                     /help — command list\n\
                     /reload — reload the price sheet\n\
                     /mode phrase|words — switch match mode\n\
                     /stats — dataset summary\n\
                     /users — registered users (admin)\n\
                     /quit — exit"
                );
            }
            "/quit" | "/exit" => return ReplAction::Quit,
            "/reload" => match self.cache.refresh().await {
                Ok(snapshot) => {
                    println!("🔄 Reloaded {} ({} products).", snapshot.source, snapshot.len());
                }
                Err(e) => warn!("/reload error: {e}"),
            },
            "/mode" => match parts.next() {
                Some("phrase") => {
                    self.search.match_mode = MatchMode::Phrase;
                    println!("Match mode: whole phrase.");
                }
                Some("words") | Some("any_word") => {
                    self.search.match_mode = MatchMode::AnyWord;
                    println!("Match mode: any word.");
                }
                _ => println!("Usage: /mode phrase|words"),
            },
            "/stats" => {
                let snapshot = self.cache.current();
                let brands: HashSet<&str> =
                    snapshot.records.iter().map(|r| r.brand.as_str()).collect();
                println!(
                    "📊 {} products, {} brands. Loaded {} from {}.",
                    snapshot.len(),
                    brands.len(),
                    snapshot.loaded_at.format("%Y-%m-%d %H:%M:%S"),
                    snapshot.source
                );
            }
            "/users" => {
                if !self.session.is_admin {
                    println!("You do not have permission to view the user list.");
                    return ReplAction::Continue;
                }
                match self.store.list_users() {
                    Ok(users) if users.is_empty() => println!("No users found."),
                    Ok(users) => {
                        println!("Registered users:");
                        for user in users {
                            println!(
                                "  {} (since {})",
                                user.username,
                                user.created_at.format("%Y-%m-%d")
                            );
                        }
                    }
                    Err(e) => warn!("/users error: {e}"),
                }
            }
            _ => println!("Unknown command: {command}. Try /help."),
        }
        ReplAction::Continue
    }

    fn run_query(&self, query: &str) {
        let snapshot = self.cache.current();
        match self.engine.find_floor_prices(query, &snapshot, &self.search) {
            Ok(QueryOutcome::Matches(records)) => {
                println!("Floor prices for '{query}':");
                print!("{}", super::render_table(&records, &snapshot.extra_columns));
            }
            Ok(QueryOutcome::NoMatches) => {
                println!("No products found for '{query}'.");
            }
            Err(QueryError::Blank) => {
                println!("Please enter a model to search.");
            }
        }
    }
}
