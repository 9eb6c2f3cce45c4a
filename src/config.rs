use serde::Deserialize;
use std::fs;

use crate::model::MatchMode;

/// Per-query settings handed to the engine by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub match_mode: MatchMode,
    /// Optional markup applied to selected prices, e.g. 1.01 for +1%.
    pub markup_factor: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub price_sheet: String,
    pub users_db: String,
    #[serde(default)]
    pub admins: Vec<String>,
    pub reload_interval_seconds: u64,
    pub search: SearchConfig,
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
