//! Bazaar CLI entry point.
//!
//! Provides `start`, `migrate`, `create-admin`, and `check-setup`
//! subcommands for running the bot, applying the schema, provisioning the
//! first admin, and diagnosing a deployment.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use bazaar::config::{config_path_with, Config};
use bazaar::credentials::{load_credentials, Credentials};
use bazaar::db::Store;
use bazaar::telegram::{run_bot, SharedState};

/// Default `.env` location, relative to the working directory.
const ENV_FILE: &str = ".env";

/// Telegram marketplace bot.
#[derive(Parser)]
#[command(name = "bazaar", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Run the bot until interrupted.
    Start,
    /// Open the database and apply the schema.
    Migrate,
    /// Provision an admin grant.
    CreateAdmin {
        /// Telegram user id; defaults to `admin.super_admin_id`.
        #[arg(long)]
        telegram_id: Option<i64>,
        /// Role preset from `admin.roles`.
        #[arg(long, default_value = "super_admin")]
        role: String,
    },
    /// Print configuration and database diagnostics.
    CheckSetup,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Start => handle_start().await,
        Command::Migrate => handle_migrate().await,
        Command::CreateAdmin { telegram_id, role } => handle_create_admin(telegram_id, &role).await,
        Command::CheckSetup => handle_check_setup().await,
    }
}

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    let path = Path::new(&config.database.path);
    Store::open(path)
        .await
        .with_context(|| format!("failed to open database {}", path.display()))
}

/// Run the bot.
async fn handle_start() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    let _logging_guard =
        bazaar::logging::init_production(Path::new(&config.logging.logs_dir), &config.logging.level)?;

    let credentials = load_credentials(Path::new(ENV_FILE))?;
    let token = credentials
        .require_with(&config.bot.token_env, |key| std::env::var(key).ok())
        .context("bot token not configured")?;

    if config.admin.allowed_ids.is_empty() {
        warn!("admin allow-list is empty; the admin panel is unreachable");
    }

    let store = open_store(&config).await?;
    info!(
        database = %config.database.path,
        admins = config.admin.allowed_ids.len(),
        version = env!("CARGO_PKG_VERSION"),
        "bazaar starting"
    );

    let shared = SharedState::new(config, store);
    run_bot(&token, shared).await
}

/// Apply the schema and report.
async fn handle_migrate() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    bazaar::logging::init_cli(&config.logging.level);

    let store = open_store(&config).await?;
    let missing = store.missing_tables().await?;
    anyhow::ensure!(
        missing.is_empty(),
        "schema applied but tables are missing: {}",
        missing.join(", ")
    );
    info!(database = %config.database.path, "schema up to date");
    Ok(())
}

/// Create or replace a grant from a role preset.
async fn handle_create_admin(telegram_id: Option<i64>, role: &str) -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    bazaar::logging::init_cli(&config.logging.level);

    let actor_id = telegram_id
        .or(config.admin.super_admin_id)
        .context("no --telegram-id given and admin.super_admin_id is not set")?;
    let permissions = config.admin.role_permissions(role).with_context(|| {
        let known: Vec<&str> = config.admin.roles.keys().map(String::as_str).collect();
        format!("unknown role {role:?}; known roles: {}", known.join(", "))
    })?;

    if !config.allow_list().contains(&actor_id) {
        warn!(
            actor_id,
            "actor is not on admin.allowed_ids; the grant has no effect until it is added"
        );
    }

    let store = open_store(&config).await?;
    let grant = store
        .upsert_grant(actor_id, role, permissions.iter().cloned())
        .await
        .context("failed to write admin grant")?;

    info!(
        actor_id = grant.actor_id,
        role = %grant.role,
        permissions = grant.permissions.len(),
        "admin grant provisioned"
    );
    Ok(())
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "\u{2713}"
    } else {
        "\u{2717}"
    }
}

/// Print deployment diagnostics.
async fn handle_check_setup() -> anyhow::Result<()> {
    let config_path: PathBuf = config_path_with(|key| std::env::var(key).ok());
    let config = Config::load().context("failed to load configuration")?;
    bazaar::logging::init_cli(&config.logging.level);

    println!(
        "{} config file {}",
        mark(config_path.exists()),
        config_path.display()
    );

    let credentials: Credentials = load_credentials(Path::new(ENV_FILE))?;
    let token = credentials.require_with(&config.bot.token_env, |key| std::env::var(key).ok());
    println!("{} bot token ({})", mark(token.is_ok()), config.bot.token_env);

    let allow_list = config.allow_list();
    println!(
        "{} admin allow-list: {} id(s)",
        mark(!allow_list.is_empty()),
        allow_list.len()
    );
    match config.admin.super_admin_id {
        Some(id) => println!(
            "{} super admin id {id}{}",
            mark(allow_list.contains(&id)),
            if allow_list.contains(&id) {
                ""
            } else {
                " (not on the allow-list)"
            }
        ),
        None => println!("{} super admin id not set", mark(false)),
    }

    let store = match open_store(&config).await {
        Ok(store) => {
            println!("{} database {}", mark(true), config.database.path);
            store
        }
        Err(e) => {
            println!("{} database {}: {e:#}", mark(false), config.database.path);
            return Ok(());
        }
    };

    let missing = store.missing_tables().await?;
    if missing.is_empty() {
        println!("{} all tables present", mark(true));
    } else {
        println!("{} missing tables: {}", mark(false), missing.join(", "));
    }

    let active = store.count_active_grants().await?;
    println!("{} active admin grants: {active}", mark(active > 0));
    Ok(())
}
