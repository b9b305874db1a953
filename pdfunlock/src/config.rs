//! Application configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment variable overrides. The
//! configuration file path defaults to `config.yaml` but can be specified via `-f` flag or
//! `PDFUNLOCK_CONFIG` environment variable. A missing file is not an error: every field has a
//! default, so the service runs with no configuration at all.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **Defaults** - see [`Config::default`]
//! 2. **YAML config file** - default: `config.yaml`
//! 3. **Environment variables** - Variables prefixed with `PDFUNLOCK_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `PDFUNLOCK_LIMITS__MAX_UPLOAD_SIZE=10485760` sets the `limits.max_upload_size` field.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! PDFUNLOCK_PORT=8080
//!
//! # Only listen on loopback
//! PDFUNLOCK_HOST=127.0.0.1
//!
//! # Accept uploads up to 10 MiB
//! PDFUNLOCK_LIMITS__MAX_UPLOAD_SIZE=10485760
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PDFUNLOCK_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Default tracing filter, used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Prefix prepended to the original filename of every unlocked download
    pub download_prefix: String,
    /// Resource limits for uploads
    pub limits: LimitsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            log_filter: "info".to_string(),
            download_prefix: "LIBERADO_".to_string(),
            limits: LimitsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum accepted request body size for uploads, in bytes
    pub max_upload_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(figment::Error::from)?;
        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.limits.max_upload_size == 0 {
            return Err("Config validation: limits.max_upload_size must be greater than zero".to_string());
        }

        if self.download_prefix.is_empty() {
            return Err("Config validation: download_prefix cannot be empty".to_string());
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(&args.config))
            // PDFUNLOCK_CONFIG names the file itself, it is not a config key
            .merge(Env::prefixed("PDFUNLOCK_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
