//! CLI command implementations
//!
//! `init` writes a default configuration file; `serve` loads it, builds the
//! engine and blocks on the HTTP server.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::auth::{JwtConfig, SessionConfig};
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::{log_event, log_event_with_fields, Event};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins; empty means permissive
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// JWT signing secret
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Access token lifetime in minutes
    #[serde(default = "default_access_token_ttl_minutes")]
    pub access_token_ttl_minutes: i64,

    /// Refresh token lifetime in hours
    #[serde(default = "default_refresh_token_ttl_hours")]
    pub refresh_token_ttl_hours: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_jwt_secret() -> String {
    "CHANGE_THIS_SECRET_IN_PRODUCTION".to_string()
}

fn default_access_token_ttl_minutes() -> i64 {
    15
}

fn default_refresh_token_ttl_hours() -> i64 {
    24 * 30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            jwt_secret: default_jwt_secret(),
            access_token_ttl_minutes: default_access_token_ttl_minutes(),
            refresh_token_ttl_hours: default_refresh_token_ttl_hours(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> CliResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            CliError::config_error(format!("cannot parse {}: {}", path.display(), e))
        })
    }

    /// The HTTP server slice of the configuration
    pub fn http_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
        }
    }

    /// The JWT slice of the configuration
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.jwt_secret.clone(),
            access_token_ttl: Duration::minutes(self.access_token_ttl_minutes),
            ..JwtConfig::default()
        }
    }

    /// The refresh session slice of the configuration
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            refresh_token_ttl: Duration::hours(self.refresh_token_ttl_hours),
        }
    }
}

/// Parse arguments and dispatch
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Execute a single command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Init { config } => init(&config),
        Command::Serve { config } => serve(&config),
    }
}

/// Write a default configuration file, refusing to overwrite
pub fn init(path: &Path) -> CliResult<()> {
    if path.exists() {
        return Err(CliError::already_initialized(format!(
            "{} already exists",
            path.display()
        )));
    }

    let config = Config::default();
    let contents = serde_json::to_string_pretty(&config)
        .map_err(|e| CliError::config_error(e.to_string()))?;
    fs::write(path, contents)?;

    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Boot the engine and serve the status API
pub fn serve(path: &Path) -> CliResult<()> {
    log_event(Event::BootStart);

    let config = Config::load(path)?;
    log_event_with_fields(Event::ConfigLoaded, &[("config", &path.display().to_string())]);

    let server = HttpServer::with_parts(
        config.http_config(),
        config.jwt_config(),
        config.session_config(),
    );

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("runtime: {}", e)))?;

    log_event_with_fields(Event::BootComplete, &[("addr", &server.socket_addr())]);
    runtime
        .block_on(server.start())
        .map_err(|e| CliError::boot_failed(e.to_string()))
}
