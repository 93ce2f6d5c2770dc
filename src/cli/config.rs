//! ballot-ledger configuration file handling
//!
//! Configuration files are TOML and live under the user config directory
//! (`~/.config/ballot-ledger/config.toml` on Linux) unless `--config` points
//! elsewhere. Every section is optional; command-line flags override the file.

use ballot_ledger::ledger::{ReaderOptions, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 2;
const DEFAULT_RETRY_BASE_MS: u64 = 250;
const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Config file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

/// ballot-ledger configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub rpc: RpcConfig,

    #[serde(default)]
    pub reader: ReaderConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// JSON-RPC endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Node URL (e.g. https://sepolia.infura.io/v3/<key>)
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Proposal reader tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Refuse contracts reporting more proposals than this
    #[serde(default = "default_max_proposals")]
    pub max_proposals: usize,

    /// Extra attempts for reads that fail in transport
    #[serde(default = "default_retries")]
    pub transport_retries: u32,

    /// Delay before the first retry, doubled on each following one
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
}

/// Text output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Decimals of the voting token; vote weights are shown in token units
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u8,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_proposals() -> usize {
    ballot_ledger::ledger::reader::DEFAULT_MAX_PROPOSALS
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

fn default_retry_base_ms() -> u64 {
    DEFAULT_RETRY_BASE_MS
}

fn default_token_decimals() -> u8 {
    ballot_ledger::report::TOKEN_DECIMALS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_proposals: default_max_proposals(),
            transport_retries: DEFAULT_RETRIES,
            retry_base_ms: DEFAULT_RETRY_BASE_MS,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            token_decimals: default_token_decimals(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given, else the default file if present, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Per-request timeout for the RPC client
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc.timeout_secs)
    }

    /// Reader options derived from `[rpc]` and `[reader]`
    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            retry: RetryPolicy {
                max_retries: self.reader.transport_retries,
                base_delay: Duration::from_millis(self.reader.retry_base_ms),
                max_delay: MAX_RETRY_DELAY,
            },
            call_timeout: Some(self.rpc_timeout()),
            max_proposals: self.reader.max_proposals,
        }
    }

    /// Decimals for text output; `raw` prints integer weights
    pub fn display_decimals(&self, raw: bool) -> u8 {
        if raw {
            0
        } else {
            self.display.token_decimals
        }
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml() -> String {
        format!(
            r#"# ballot-ledger configuration
#
# Command-line flags override values in this file.

[rpc]
# JSON-RPC endpoint of an Ethereum node (required unless --rpc-url is given)
# endpoint = "https://sepolia.infura.io/v3/<api-key>"

# Per-request timeout in seconds
timeout_secs = {timeout}

[reader]
# Refuse contracts that report more proposals than this
max_proposals = {max_proposals}

# Extra attempts for reads that fail in transport (never for end-of-list)
transport_retries = {retries}

# Delay before the first retry in milliseconds, doubled on each retry
retry_base_ms = {retry_base_ms}

[display]
# Decimals of the voting token. Vote weights are printed in token units
# (1500000000000000000 -> 1.5); --raw prints the integers instead.
token_decimals = {decimals}

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG overrides)
level = "{level}"
"#,
            timeout = DEFAULT_TIMEOUT_SECS,
            max_proposals = default_max_proposals(),
            retries = DEFAULT_RETRIES,
            retry_base_ms = DEFAULT_RETRY_BASE_MS,
            decimals = default_token_decimals(),
            level = DEFAULT_LOG_LEVEL,
        )
    }

    /// Write the commented default configuration to `path`
    pub fn create_default(path: &Path, force: bool) -> Result<(), ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        write_file(path, &Self::generate_default_toml())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Create parent directory if needed
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    fs::write(path, contents).map_err(io_err)
}

/// Get the default config file path
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ballot-ledger")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();

        assert_eq!(config.rpc.endpoint, None);
        assert_eq!(config.rpc.timeout_secs, 30);
        assert_eq!(config.reader.transport_retries, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_serialized_config_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = LedgerConfig::default();
        config.rpc.endpoint = Some("http://localhost:8545".to_string());
        config.reader.max_proposals = 16;
        config.display.token_decimals = 6;
        fs::write(&config_path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = LedgerConfig::load(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_generated_default_toml_parses_to_defaults() {
        let config: LedgerConfig = toml::from_str(&LedgerConfig::generate_default_toml()).unwrap();
        assert_eq!(config, LedgerConfig::default());
    }

    #[test]
    fn test_create_default_makes_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        LedgerConfig::create_default(&config_path, false).unwrap();
        assert_eq!(LedgerConfig::load(&config_path).unwrap(), LedgerConfig::default());
    }

    #[test]
    fn test_display_decimals() {
        let config = LedgerConfig::default();
        assert_eq!(config.display_decimals(false), 18);
        assert_eq!(config.display_decimals(true), 0);
    }

    #[test]
    fn test_create_default_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        LedgerConfig::create_default(&config_path, false).unwrap();
        assert!(config_path.exists());

        let again = LedgerConfig::create_default(&config_path, false);
        assert!(matches!(again, Err(ConfigError::AlreadyExists(_))));

        LedgerConfig::create_default(&config_path, true).unwrap();
    }

    #[test]
    fn test_load_config_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"
[rpc]
endpoint = "https://rpc.sepolia.org"
"#,
        )
        .unwrap();

        let config = LedgerConfig::load(&config_path).unwrap();
        assert_eq!(config.rpc.endpoint.as_deref(), Some("https://rpc.sepolia.org"));
        assert_eq!(config.rpc.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.toml");
        assert!(matches!(
            LedgerConfig::resolve(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[reader]\nmax_proposals = \"lots\"\n").unwrap();

        assert!(matches!(
            LedgerConfig::load(&config_path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_reader_options_from_config() {
        let mut config = LedgerConfig::default();
        config.reader.transport_retries = 4;
        config.reader.retry_base_ms = 10;
        config.rpc.timeout_secs = 3;

        let options = config.reader_options();
        assert_eq!(options.retry.max_retries, 4);
        assert_eq!(options.retry.base_delay, Duration::from_millis(10));
        assert_eq!(options.call_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_default_config_path_file_name() {
        let path = default_config_path();
        assert!(path.ends_with("ballot-ledger/config.toml"));
    }
}
