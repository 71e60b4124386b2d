//! Configuration file management for plotkeeper.
//!
//! Provides a TOML-based config file at `~/.config/plotkeeper/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use plotkeeper_db::config::DbConfig;

/// Default address the HTTP server binds to.
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_owned()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the plotkeeper config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/plotkeeper` or
/// `~/.config/plotkeeper`, on every platform.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("plotkeeper");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("plotkeeper")
}

/// Return the path to the plotkeeper config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix, since the URL may carry a password.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct PlotkeeperConfig {
    pub db_config: DbConfig,
    pub bind: String,
    pub port: u16,
}

impl PlotkeeperConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `PLOTKEEPER_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Bind: `PLOTKEEPER_BIND` > `server.bind` > `127.0.0.1`
    /// - Port: `PLOTKEEPER_PORT` > `server.port` > `3000`
    ///
    /// The `serve` command applies its own `--bind`/`--port` flags on top.
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = load_config().ok();

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var("PLOTKEEPER_DATABASE_URL") {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let bind = if let Ok(bind) = std::env::var("PLOTKEEPER_BIND") {
            bind
        } else if let Some(ref cfg) = file_config {
            cfg.server.bind.clone()
        } else {
            DEFAULT_BIND.to_string()
        };

        let port = if let Ok(raw) = std::env::var("PLOTKEEPER_PORT") {
            raw.parse::<u16>()
                .with_context(|| format!("PLOTKEEPER_PORT is not a valid port: {raw:?}"))?
        } else if let Some(ref cfg) = file_config {
            cfg.server.port
        } else {
            DEFAULT_PORT
        };

        Ok(Self {
            db_config: DbConfig::new(db_url),
            bind,
            port,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
