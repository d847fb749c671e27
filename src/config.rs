//! Configuration loading and environment overrides.
//!
//! Loads `./config.toml` (or `$BAZAAR_CONFIG_PATH`). Environment variables
//! override file values; file values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::admin::permissions;

/// Env var pointing at an alternate config file.
pub const CONFIG_PATH_ENV: &str = "BAZAAR_CONFIG_PATH";

// ── Top-level config ────────────────────────────────────────────

/// Top-level bot configuration loaded from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bot identity and token lookup.
    pub bot: BotConfig,
    /// SQLite location.
    pub database: DatabaseConfig,
    /// Admin allow-list and role presets.
    pub admin: AdminConfig,
    /// Input and paging limits.
    pub limits: Limits,
    /// Log level and directory.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = config_path_with(|key| std::env::var(key).ok());
        let mut config = Self::load_from(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a TOML file only, no env overrides. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
                    .with_context(|| format!("failed to parse config at {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config at {}: {e}",
                path.display()
            )),
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("failed to parse config TOML")
    }

    /// Apply environment variable overrides.
    ///
    /// Takes a resolver function so tests never touch the process environment.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("BAZAAR_DATABASE_PATH") {
            self.database.path = v;
        }
        if let Some(v) = env("BAZAAR_BOT_NAME") {
            self.bot.name = v;
        }
        if let Some(v) = env("BAZAAR_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env("BAZAAR_LOGS_DIR") {
            self.logging.logs_dir = v;
        }
        if let Some(v) = env("BAZAAR_ADMIN_IDS") {
            match parse_id_list(&v) {
                Ok(ids) => self.admin.allowed_ids = ids,
                Err(bad) => tracing::warn!(
                    var = "BAZAAR_ADMIN_IDS",
                    value = %bad,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("BAZAAR_SUPER_ADMIN_ID") {
            match v.trim().parse() {
                Ok(id) => self.admin.super_admin_id = Some(id),
                Err(_) => tracing::warn!(
                    var = "BAZAAR_SUPER_ADMIN_ID",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }

    /// The static admin allow-list as a set.
    pub fn allow_list(&self) -> BTreeSet<i64> {
        self.admin.allowed_ids.iter().copied().collect()
    }
}

/// Resolve the config file path using a custom env resolver.
pub fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    env(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Parse a comma-separated list of ids. Returns the offending token on failure.
fn parse_id_list(raw: &str) -> std::result::Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().map_err(|_| s.to_owned()))
        .collect()
}

// ── Sections ────────────────────────────────────────────────────

/// Bot identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Display name used in greetings.
    pub name: String,
    /// Name of the env / `.env` variable holding the bot token.
    pub token_env: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "Marketplace".to_owned(),
            token_env: "BAZAAR_BOT_TOKEN".to_owned(),
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "marketplace.db".to_owned(),
        }
    }
}

/// Admin allow-list and role presets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Telegram user ids permitted to reach the admin panel at all.
    pub allowed_ids: Vec<i64>,
    /// Actor provisioned by `create-admin` when no id is given.
    pub super_admin_id: Option<i64>,
    /// Role name to permission list.
    pub roles: BTreeMap<String, Vec<String>>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            allowed_ids: Vec::new(),
            super_admin_id: None,
            roles: default_roles(),
        }
    }
}

impl AdminConfig {
    /// Permissions configured for `role`, if the role exists.
    pub fn role_permissions(&self, role: &str) -> Option<&[String]> {
        self.roles.get(role).map(Vec::as_slice)
    }
}

fn default_roles() -> BTreeMap<String, Vec<String>> {
    let owned = |list: &[&str]| list.iter().map(|p| (*p).to_owned()).collect::<Vec<_>>();

    let mut roles = BTreeMap::new();
    roles.insert("super_admin".to_owned(), owned(permissions::ALL));
    roles.insert(
        "admin".to_owned(),
        permissions::ALL
            .iter()
            .filter(|p| **p != permissions::MANAGE_ADMINS)
            .map(|p| (*p).to_owned())
            .collect(),
    );
    roles.insert(
        "moderator".to_owned(),
        owned(&[
            permissions::MANAGE_LISTINGS,
            permissions::WARN_USERS,
            permissions::VIEW_ANALYTICS,
            permissions::EDIT_ANY_LISTING,
        ]),
    );
    roles
}

/// Input validation and paging limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum photos per listing.
    pub max_photos: usize,
    /// Minimum listing title length in characters.
    pub title_min: usize,
    /// Maximum listing title length in characters.
    pub title_max: usize,
    /// Maximum listing description length.
    pub description_max: usize,
    /// Maximum listing price in whole currency units.
    pub price_max: i64,
    /// Listings per page in search results.
    pub page_size: u32,
    /// Rows per page in the admin panel.
    pub admin_page_size: u32,
    /// Minimum buyer/seller message length.
    pub message_min: usize,
    /// Maximum buyer/seller message length.
    pub message_max: usize,
    /// Maximum review comment length.
    pub comment_max: usize,
    /// Maximum profile location length.
    pub location_max: usize,
    /// Maximum profile bio length.
    pub bio_max: usize,
    /// Maximum profile phone length.
    pub phone_max: usize,
    /// Maximum moderation reason length.
    pub reason_max: usize,
    /// Minimum search keyword length.
    pub keywords_min: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_photos: 5,
            title_min: 3,
            title_max: 100,
            description_max: 2000,
            price_max: 1_000_000,
            page_size: 5,
            admin_page_size: 10,
            message_min: 2,
            message_max: 1000,
            comment_max: 500,
            location_max: 100,
            bio_max: 500,
            phone_max: 32,
            reason_max: 500,
            keywords_min: 2,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for rotated JSON log files.
    pub logs_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            logs_dir: "logs".to_owned(),
        }
    }
}
