//! Pepper server binary.
//!
//! Serves the bundled `content/` directory (templates and static files)
//! according to a TOML configuration file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use include_dir::{include_dir, Dir};

use pepper::config::{load_config, parse_config};
use pepper::lifecycle;
use pepper::observability::init_logging;
use pepper::security::hash_password;

static CONTENT: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/content");

#[derive(Parser)]
#[command(name = "pepper")]
#[command(about = "Embeddable web server shell", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "pepper.toml")]
    config: PathBuf,

    /// Log the template used for each rendered page
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a bcrypt hash for a password file entry
    HashPassword { password: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Commands::HashPassword { password }) = &cli.command {
        println!("{}", hash_password(password)?);
        return Ok(());
    }

    let config_found = cli.config.is_file();
    let mut config = if config_found {
        load_config(&cli.config)?
    } else {
        parse_config("", |name| std::env::var(name).ok())?
    };
    config.debug |= cli.debug;

    init_logging(&config.observability)?;
    tracing::info!("pepper v{} starting", env!("CARGO_PKG_VERSION"));
    if config_found {
        tracing::info!(path = %cli.config.display(), "configuration loaded");
    } else {
        tracing::warn!(path = %cli.config.display(), "configuration file not found, using defaults");
    }

    lifecycle::run(config, &CONTENT, |_routes| {}).await?;
    Ok(())
}
