//! Phototag - interactive picture tagging from the terminal.
//!
//! Reads one command per line from stdin and applies it to the open
//! directory. Command output goes to stdout, diagnostics to stderr.

mod repl;

use anyhow::{Context, Result};
use clap::Parser;
use phototag_core::config::{AppConfig, PathsConfig};
use phototag_core::PhotoTagApi;
use repl::{Outcome, Session};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "phototag")]
#[command(about = "Tag pictures by renaming them: 'sunset @beach @2024.jpg'")]
struct Args {
    /// Directory to open at startup
    directory: Option<PathBuf>,

    /// Include subdirectories of the startup directory
    #[arg(short, long)]
    recursive: bool,

    /// Settings file (defaults to the platform config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Do not save settings on exit
    #[arg(long)]
    no_save: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug, args.log_json);

    let settings_path = args.settings.clone().unwrap_or_else(default_settings_path);
    info!("Settings file: {}", settings_path.display());

    let api = PhotoTagApi::builder(&settings_path)
        .build()
        .with_context(|| format!("Failed to start with settings {}", settings_path.display()))?;
    let mut session = Session::new(api);

    if let Some(dir) = &args.directory {
        match session.open(dir.clone(), args.recursive).await {
            Ok(output) => print!("{}", output),
            Err(e) => eprintln!("error: {:#}", e),
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match session.handle_line(&line).await {
            Ok(Outcome::Continue(output)) => print!("{}", output),
            Ok(Outcome::Quit) => break,
            Err(e) => {
                if !repl::is_user_error(&e) {
                    warn!("Command failed: {:#}", e);
                }
                eprintln!("error: {:#}", e);
            }
        }
    }

    if args.no_save {
        info!("Exiting without saving settings");
    } else {
        session
            .save()
            .with_context(|| format!("Failed to save settings to {}", settings_path.display()))?;
    }
    Ok(())
}

fn init_logging(debug: bool, json: bool) {
    let log_level = if debug { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(PathsConfig::APP_DIR_NAME))
        .unwrap_or_default()
        .join(PathsConfig::SETTINGS_FILE_NAME)
}

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}> ", AppConfig::APP_NAME)?;
    stdout.flush()?;
    Ok(())
}
