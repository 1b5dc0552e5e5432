//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `FANTADEBITO_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `FANTADEBITO_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `FANTADEBITO_STORAGE__BUCKET=my-bucket` sets the `storage.bucket` field.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Storage**: `storage.bucket`, `storage.prefix`, `storage.backend` - where the table
//!   objects live. The `s3` backend takes the endpoint, region, credentials and path-style
//!   flag of any S3-compatible provider; the `local` backend keeps objects in a directory
//!   and exists for development and tests.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! FANTADEBITO_PORT=8080
//! FANTADEBITO_STORAGE__BUCKET="fantadebito"
//! FANTADEBITO_STORAGE__BACKEND__TYPE=s3
//! FANTADEBITO_STORAGE__BACKEND__ACCESS_KEY_ID="..."
//! FANTADEBITO_STORAGE__BACKEND__SECRET_ACCESS_KEY="..."
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "FANTADEBITO_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Loaded from YAML and environment variables; all fields have defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Object storage configuration for the table files
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            storage: StorageConfig::default(),
        }
    }
}

/// Where and how the table objects are stored.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Bucket holding the table objects
    pub bucket: String,
    /// Key prefix prepended to every table object name (e.g., "prod/")
    pub prefix: String,
    /// Storage backend - S3-compatible service or local directory
    pub backend: StorageBackend,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "fantadebito".to_string(),
            prefix: String::new(),
            backend: StorageBackend::default(),
        }
    }
}

/// Object storage backend selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageBackend {
    /// Any S3-compatible object store
    S3 {
        /// Service endpoint URL
        endpoint: String,
        /// Region name (most S3-compatible providers accept any value here)
        region: String,
        access_key_id: String,
        secret_access_key: String,
        /// Use path-style addressing (`endpoint/bucket/key`) instead of
        /// virtual-hosted-style. Required by several S3-compatible providers.
        force_path_style: bool,
    },
    /// Directory-backed store for development and tests
    Local { path: PathBuf },
}

impl Default for StorageBackend {
    fn default() -> Self {
        StorageBackend::Local {
            path: PathBuf::from("./data"),
        }
    }
}

impl Config {
    /// Load configuration from the YAML file and `FANTADEBITO_` environment overrides.
    pub fn load(args: &Args) -> Result<Self, Error> {
        let figment = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("FANTADEBITO_").split("__"));

        let config: Config = figment.extract().map_err(|e| Error::Validation {
            message: format!("invalid configuration: {e}"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check the loaded configuration for values that cannot work.
    pub fn validate(&self) -> Result<(), Error> {
        if self.storage.bucket.is_empty() {
            return Err(Error::Validation {
                message: "storage.bucket must not be empty".to_string(),
            });
        }
        if let StorageBackend::S3 {
            access_key_id,
            secret_access_key,
            ..
        } = &self.storage.backend
            && (access_key_id.is_empty() || secret_access_key.is_empty())
        {
            return Err(Error::Validation {
                message: "s3 backend requires access_key_id and secret_access_key".to_string(),
            });
        }
        Ok(())
    }

    /// Address the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert!(matches!(config.storage.backend, StorageBackend::Local { .. }));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                port: 9000
                storage:
                  bucket: bets
                  prefix: "prod/"
                "#,
            )?;
            jail.set_env("FANTADEBITO_PORT", "9100");

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");
            assert_eq!(config.port, 9100);
            assert_eq!(config.storage.bucket, "bets");
            assert_eq!(config.storage.prefix, "prod/");
            Ok(())
        });
    }

    #[test]
    fn test_empty_bucket_rejected() {
        let mut config = Config::default();
        config.storage.bucket = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_backend_requires_credentials() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::S3 {
            endpoint: "https://s3.cubbit.eu".to_string(),
            region: "us-east-1".to_string(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            force_path_style: true,
        };
        assert!(config.validate().is_err());
    }
}
