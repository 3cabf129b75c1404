use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: String,
    pub database_url: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Photo-sharing backend API")]
pub struct Args {
    /// Host to bind to (overrides PHOTO_SHARE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PHOTO_SHARE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where uploaded photos are stored (overrides PHOTO_SHARE_UPLOAD_DIR)
    #[arg(long)]
    pub upload_dir: Option<String>,

    /// Database URL (overrides PHOTO_SHARE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("PHOTO_SHARE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("PHOTO_SHARE_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PHOTO_SHARE_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 8081,
            Err(err) => return Err(err).context("reading PHOTO_SHARE_PORT"),
        };
        let env_uploads =
            env::var("PHOTO_SHARE_UPLOAD_DIR").unwrap_or_else(|_| "./data/images".into());
        let env_db = env::var("PHOTO_SHARE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/photo_share.db".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            upload_dir: args.upload_dir.unwrap_or(env_uploads),
            database_url: args.database_url.unwrap_or(env_db),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
