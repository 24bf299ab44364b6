//! volmap - command line front end for the volunteer map data layer.
//!
//! Shows per-country volunteer records, global statistics across countries,
//! and passes a few queries through to the REST backend.

mod app;
mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use volmap_core::models::{Role, Status};
use volmap_core::{Config, Locale, SourceKind};

use app::{AddArgs, App, DEFAULT_TOP};

// ============================================================================
// Command line
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "volmap", version)]
#[command(about = "Volunteer map country data")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Where country records come from: dir, http or api
    #[arg(long, global = true, env = "VOLMAP_SOURCE")]
    source: Option<SourceKind>,

    /// Data directory for the dir source
    #[arg(long, global = true, env = "VOLMAP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Base URL for the http or api source
    #[arg(long, global = true, env = "VOLMAP_BASE_URL")]
    base_url: Option<String>,

    /// Bearer token for the REST backend
    #[arg(long, global = true, env = "VOLMAP_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Seconds a loaded country stays fresh
    #[arg(long, global = true, env = "VOLMAP_TTL_SECS")]
    ttl_secs: Option<u64>,

    /// Display language: en or zh
    #[arg(long, global = true, env = "VOLMAP_LOCALE")]
    locale: Option<Locale>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "VOLMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true, env = "VOLMAP_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one country's volunteers and statistics
    Show {
        code: String,
        /// Retry once if the load fails
        #[arg(long)]
        refresh: bool,
    },
    /// Totals and ranking across countries
    Stats {
        /// Countries to include (defaults to the configured list)
        codes: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_TOP)]
        top: usize,
    },
    /// Add a volunteer to a country
    Add {
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long = "language")]
        languages: Vec<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        status: Option<Status>,
        /// Write the updated record back to the source
        #[arg(long)]
        save: bool,
    },
    /// Write an empty data file for a country
    Init {
        code: String,
        #[arg(long)]
        force: bool,
    },
    /// List regions known to the REST backend
    Regions,
    /// Backend-wide volunteer summary
    Summary,
    /// Interactive session sharing one cache
    Browse,
    /// Write the effective configuration to the config file
    SaveConfig,
}

impl Cli {
    /// Config file first, then flags and environment on top
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match self.config {
            Some(ref path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(ref dir) = self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(ref url) = self.base_url {
            match config.source {
                SourceKind::Http => config.static_url = url.clone(),
                _ => config.api_url = url.clone(),
            }
        }
        if let Some(ref token) = self.api_token {
            config.api_token = Some(token.clone());
        }
        if let Some(secs) = self.ttl_secs {
            config.cache_ttl_secs = secs;
        }
        if let Some(locale) = self.locale {
            config.locale = locale;
        }
        Ok(config)
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` controls the level (default `warn`). Returns the guard that
/// flushes the log file, if one was requested.
fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "volmap.log".into());
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
    guard
}

// ============================================================================
// Entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref());

    let config = cli.resolve_config()?;
    info!(source = ?config.source, locale = ?config.locale, "volmap starting");

    if let Command::SaveConfig = cli.command {
        config.save()?;
        println!("Saved {}", Config::config_path()?.display());
        return Ok(());
    }

    let app = App::new(config, cli.json)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Show { ref code, refresh } => app.show(code, refresh, &mut out).await?,
        Command::Stats { ref codes, top } => app.stats(codes, top, &mut out).await?,
        Command::Add {
            ref code,
            ref name,
            role,
            ref languages,
            ref location,
            status,
            save,
        } => {
            let args = AddArgs {
                name: name.clone(),
                role,
                languages: languages.clone(),
                location: location.clone(),
                status,
                save,
            };
            app.add(code, &args, &mut out).await?;
        }
        Command::Init { ref code, force } => {
            let path = app.init(code, force).await?;
            writeln!(out, "Wrote {}", path.display())?;
        }
        Command::Regions => app.regions(cli.json, &mut out).await?,
        Command::Summary => app.summary(cli.json, &mut out).await?,
        Command::Browse => {
            drop(out);
            browse(&app).await?;
        }
        Command::SaveConfig => {}
    }

    Ok(())
}

/// Read commands from stdin until `quit` or end of input
async fn browse(app: &App) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let mut out = io::stdout();
        match app.run_line(&line, &mut out).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("Error: {:#}", e),
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "volmap> ")?;
    out.flush()
}
