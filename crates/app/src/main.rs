mod cli;
mod commands;
mod terminal;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use services::{AppServices, Clock, QuizConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("QUIZ_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database url: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("could not create {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("could not create {}", path.display()))?;
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = QuizConfig::from_env()?;
    if let Some(db) = cli.db.as_deref() {
        config.db_url = db.to_owned();
    }
    if let Some(api) = cli.api.as_deref() {
        config.api_base_url = api.trim().to_owned();
    }
    config.db_url = normalize_sqlite_url(&config.db_url);

    if let Some(route) = cli.command.route() {
        tracing::debug!(%route, "dispatching");
    }

    // Rating needs no storage or network.
    if let Command::Rate { topic } = &cli.command {
        commands::rate(topic);
        return Ok(());
    }

    prepare_sqlite_file(&config.db_url)?;
    let services = AppServices::new_sqlite(&config, Clock::system())
        .await
        .context("could not open local storage")?;

    match cli.command {
        Command::Topics => commands::topics(&services).await,
        Command::Rate { .. } => Ok(()),
        Command::Guidelines {
            topic,
            rating,
            accept,
        } => commands::guidelines(&services, &config, topic, rating, accept).await,
        Command::Quiz { topic, rating } => commands::quiz(&services, topic, rating).await,
        Command::Results { html, clear } => {
            commands::results(&services, html.as_deref(), clear).await
        }
        Command::Login { username } => commands::login(&services, &username).await,
        Command::Logout => commands::logout(&services).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}
