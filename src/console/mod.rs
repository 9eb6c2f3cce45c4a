// Console presentation: login flow, prompts, result rendering.

pub mod command_handler;

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use crate::model::{ProductRecord, StorageError};
use crate::session::Session;
use crate::storage::UserStore;

pub type InputLines = Lines<BufReader<Stdin>>;

pub fn input_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Prints `label` without a newline and reads one trimmed line.
/// Returns `None` when stdin closes.
pub async fn prompt(lines: &mut InputLines, label: &str) -> Option<String> {
    print!("{label}");
    let _ = std::io::stdout().flush();
    match lines.next_line().await {
        Ok(Some(line)) => Some(line.trim().to_string()),
        _ => None,
    }
}

const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// Login loop. `/signup` at the username prompt creates an account and drops
/// back to login. Returns `None` when stdin closes or attempts run out.
pub async fn login(
    lines: &mut InputLines,
    store: &UserStore,
    admins: &[String],
) -> Option<Session> {
    println!("🔐 Log in to search dealer prices (type /signup to create an account).");

    let mut attempts = 0;
    while attempts < MAX_LOGIN_ATTEMPTS {
        let username = prompt(lines, "Username: ").await?;
        if username == "/signup" {
            signup(lines, store).await?;
            continue;
        }
        if username.is_empty() {
            continue;
        }
        let password = prompt(lines, "Password: ").await?;

        match store.verify_user(&username, &password) {
            Ok(true) => {
                println!("✅ Logged in as {username}.");
                return Some(Session::open(&username, admins));
            }
            Ok(false) => {
                attempts += 1;
                println!("❌ Invalid username or password.");
            }
            Err(e) => {
                warn!("Credential check failed: {e}");
                return None;
            }
        }
    }

    println!("Too many failed attempts.");
    None
}

async fn signup(lines: &mut InputLines, store: &UserStore) -> Option<()> {
    let username = prompt(lines, "New username: ").await?;
    let password = prompt(lines, "New password: ").await?;

    if username.is_empty() || password.is_empty() {
        println!("Please enter a username and password.");
        return Some(());
    }
    match store.create_user(&username, &password) {
        Ok(()) => println!("User created successfully! You can now log in."),
        Err(StorageError::UsernameTaken) => println!("Username already exists."),
        Err(e) => warn!("Sign-up failed: {e}"),
    }
    Some(())
}

/// Column-aligned text table for query results. Passthrough columns are
/// appended after the price.
pub fn render_table(records: &[ProductRecord], extra_columns: &[String]) -> String {
    let mut headers: Vec<String> = ["dealer", "brand", "cat", "product", "price"]
        .into_iter()
        .map(str::to_string)
        .collect();
    headers.extend(extra_columns.iter().cloned());

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            let mut row = vec![
                r.dealer_id.clone(),
                r.brand.clone(),
                r.cat.clone(),
                r.name.clone().unwrap_or_default(),
                format!("{:.2}", r.price),
            ];
            for col in extra_columns {
                row.push(
                    r.extras
                        .iter()
                        .find(|(k, _)| k == col)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default(),
                );
            }
            row
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = String::new();
    out.push_str(format_row(&headers).trim_end());
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');
    for row in &rows {
        out.push_str(format_row(row).trim_end());
        out.push('\n');
    }
    out
}
