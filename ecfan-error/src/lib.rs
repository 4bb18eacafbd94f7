//! Unified error handling for ecfan
//!
//! Every fatal condition of the controller is one of these variants. The
//! control loop never retries: an error travels up to the scheduler, which
//! hands the fan back to firmware and returns it to the caller.

use std::io;
use std::path::PathBuf;

/// Result type alias using EcfanError
pub type Result<T> = std::result::Result<T, EcfanError>;

/// Unified error type for all ecfan operations
#[derive(thiserror::Error, Debug)]
pub enum EcfanError {
    // ============================================================================
    // File System Errors
    // ============================================================================
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    // ============================================================================
    // Hardware Access Errors
    // ============================================================================
    #[error("Failed to read temperature from {path}: {reason}")]
    TemperatureRead {
        path: PathBuf,
        reason: String,
    },

    #[error("Failed to open EC device {path}: {source}")]
    RegisterOpen {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to read EC register {addr:#04x} from {path}: {source}")]
    RegisterRead {
        path: PathBuf,
        addr: u64,
        source: io::Error,
    },

    #[error("Failed to write {value} to EC register {addr:#04x} on {path}: {source}")]
    RegisterWrite {
        path: PathBuf,
        addr: u64,
        value: u8,
        source: io::Error,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    // ============================================================================
    // Privilege Errors
    // ============================================================================
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl EcfanError {
    /// Create an invalid configuration value error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from the temperature sensor or the EC device
    pub fn is_hardware(&self) -> bool {
        matches!(
            self,
            Self::TemperatureRead { .. }
                | Self::RegisterOpen { .. }
                | Self::RegisterRead { .. }
                | Self::RegisterWrite { .. }
        )
    }
}
