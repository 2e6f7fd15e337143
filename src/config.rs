use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::board::OrderPolicy;
use crate::db::Database;
use crate::followup::DEFAULT_FOLLOW_UP_DAYS;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database: PathBuf,
    pub follow_up_days: i64,
    pub board_order: OrderPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Database::default_path(),
            follow_up_days: DEFAULT_FOLLOW_UP_DAYS,
            board_order: OrderPolicy::default(),
        }
    }
}

/// `config.toml` contents; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    database: Option<PathBuf>,
    follow_up_days: Option<i64>,
    board_order: Option<OrderPolicy>,
}

impl Config {
    /// Defaults, then `config.toml`, then `JOBTRACK_*` environment variables.
    pub fn load() -> Result<Self> {
        let file = match Self::file_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "reading config");
                Some(
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read config file: {}", path.display()))?,
                )
            }
            _ => None,
        };
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "jobtrack")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn from_sources(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(raw) = file {
            let parsed: FileConfig = toml::from_str(raw).context("Invalid config.toml")?;
            if let Some(path) = parsed.database {
                config.database = path;
            }
            if let Some(days) = parsed.follow_up_days {
                config.follow_up_days = days;
            }
            if let Some(order) = parsed.board_order {
                config.board_order = order;
            }
        }

        if let Some(path) = env("JOBTRACK_DB") {
            config.database = PathBuf::from(path);
        }
        if let Some(days) = env("JOBTRACK_FOLLOW_UP_DAYS") {
            config.follow_up_days = days
                .trim()
                .parse()
                .with_context(|| format!("JOBTRACK_FOLLOW_UP_DAYS is not a number: {}", days))?;
        }
        if let Some(order) = env("JOBTRACK_ORDER") {
            config.board_order = match order.trim().to_lowercase().as_str() {
                "date" | "bydate" => OrderPolicy::ByDate,
                "manual" | "preservemanual" => OrderPolicy::PreserveManual,
                other => anyhow::bail!("JOBTRACK_ORDER must be 'date' or 'manual', got '{}'", other),
            };
        }

        Ok(config)
    }
}
