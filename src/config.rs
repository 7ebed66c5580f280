//! # Configuration Management
//!
//! Centralized configuration for the codec, its compression stage, the
//! transfer helpers, and logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()` (`FRAMEWIRE_*` variables)
//!
//! ## Example
//! ```toml
//! [codec]
//! nesting_ceiling = 8
//! max_buffer_size = 16777216
//!
//! [compression]
//! enabled = true
//! kind = "zstd"
//! level = 3
//! ```

use crate::error::{CodecError, Result};
use crate::utils::compression::CompressionKind;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Default maximum nesting depth for records and sequences
pub const DEFAULT_NESTING_CEILING: usize = 8;

/// Max allowed size of an encoded or decompressed buffer (16 MB)
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Whether to enable compression by default
pub const ENABLE_COMPRESSION: bool = true;

/// Default read chunk for the transfer helpers
pub const DEFAULT_READ_CHUNK: usize = 4096;

/// Default timeout for one transfer
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(10);

/// Top-level configuration holding every section
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct FramewireConfig {
    /// Codec limits
    #[serde(default)]
    pub codec: CodecConfig,

    /// Compression stage
    #[serde(default)]
    pub compression: CompressionConfig,

    /// Transfer helpers
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FramewireConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| CodecError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CodecError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| CodecError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(ceiling) = std::env::var("FRAMEWIRE_NESTING_CEILING") {
            if let Ok(val) = ceiling.parse::<usize>() {
                config.codec.nesting_ceiling = val;
            }
        }

        if let Ok(max) = std::env::var("FRAMEWIRE_MAX_BUFFER_SIZE") {
            if let Ok(val) = max.parse::<usize>() {
                config.codec.max_buffer_size = val;
            }
        }

        if let Ok(enabled) = std::env::var("FRAMEWIRE_COMPRESSION") {
            if let Ok(val) = enabled.parse::<bool>() {
                config.compression.enabled = val;
            }
        }

        if let Ok(kind) = std::env::var("FRAMEWIRE_COMPRESSION_KIND") {
            match kind.to_ascii_lowercase().as_str() {
                "lz4" => config.compression.kind = CompressionKind::Lz4,
                "zstd" => config.compression.kind = CompressionKind::Zstd,
                other => {
                    return Err(CodecError::ConfigError(format!(
                        "Unknown compression kind in FRAMEWIRE_COMPRESSION_KIND: '{other}'"
                    )))
                }
            }
        }

        if let Ok(address) = std::env::var("FRAMEWIRE_ADDRESS") {
            config.transport.address = address;
        }

        if let Ok(timeout) = std::env::var("FRAMEWIRE_IO_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.transport.io_timeout = Duration::from_millis(val);
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CodecError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| CodecError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.codec.validate());
        errors.extend(self.compression.validate());
        errors.extend(self.transport.validate(self.codec.max_buffer_size));
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CodecError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Codec limits
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum number of nested record/sequence levels
    pub nesting_ceiling: usize,

    /// Maximum size of an encoded buffer, before and after compression
    pub max_buffer_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            nesting_ceiling: DEFAULT_NESTING_CEILING,
            max_buffer_size: MAX_BUFFER_SIZE,
        }
    }
}

impl CodecConfig {
    /// Validate codec configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.nesting_ceiling == 0 {
            errors.push("Nesting ceiling must be greater than 0".to_string());
        } else if self.nesting_ceiling > 256 {
            errors.push(format!(
                "Nesting ceiling too large: {} (maximum: 256)",
                self.nesting_ceiling
            ));
        }

        if self.max_buffer_size < 1024 {
            errors.push("Max buffer size too small (minimum: 1 KB)".to_string());
        } else if self.max_buffer_size > u32::MAX as usize {
            errors.push(format!(
                "Max buffer size too large: {} bytes (maximum: 4 GB)",
                self.max_buffer_size
            ));
        }

        errors
    }
}

/// Compression stage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Whether to compress encoded buffers
    pub enabled: bool,

    /// Which built-in compressor to use
    pub kind: CompressionKind,

    /// Compression level (Zstd only)
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: ENABLE_COMPRESSION,
            kind: CompressionKind::Lz4,
            level: 3,
        }
    }
}

impl CompressionConfig {
    /// Validate compression configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.enabled
            && self.kind == CompressionKind::Zstd
            && (self.level < 1 || self.level > 22)
        {
            errors.push(format!(
                "Invalid compression level: {} (valid range: 1-22)",
                self.level
            ));
        }

        errors
    }
}

/// Transfer helper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Address used by the demo listener and sender
    pub address: String,

    /// Bytes requested per read while receiving a buffer
    pub read_chunk_size: usize,

    /// Timeout for one complete send or receive
    #[serde(with = "duration_serde")]
    pub io_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            address: String::from("127.0.0.1:9000"),
            read_chunk_size: DEFAULT_READ_CHUNK,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Validate transport configuration against the codec's buffer limit
    pub fn validate(&self, max_buffer_size: usize) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push("Transport address cannot be empty".to_string());
        } else if self.address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "Invalid transport address format: '{}' (expected format: '127.0.0.1:9000')",
                self.address
            ));
        }

        if self.read_chunk_size == 0 {
            errors.push("Read chunk size must be greater than 0".to_string());
        } else if self.read_chunk_size > max_buffer_size {
            errors.push("Read chunk size cannot be larger than max buffer size".to_string());
        }

        if self.io_timeout.as_millis() < 10 {
            errors.push("I/O timeout too short (minimum: 10ms)".to_string());
        } else if self.io_timeout.as_secs() > 300 {
            errors.push("I/O timeout too long (maximum: 300s)".to_string());
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("framewire"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
