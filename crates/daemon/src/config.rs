// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Receiver configuration.
//!
//! Resolution order is defaults, then `OTELBOX_*` environment variables,
//! then whatever the CLI layers on top with the setters.

use std::path::{Path, PathBuf};

use otelbox_storage::WriterConfig;
use thiserror::Error;

use crate::env;

pub const DEFAULT_PORT: u16 = 4318;
pub const DEFAULT_OUTPUT_DIR: &str = "./telemetry";
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 100;
pub const DEFAULT_MAX_CONSECUTIVE_FILE_ERRORS: u32 = 10;
pub const DEFAULT_MAX_ERROR_HISTORY_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverConfig {
    pub port: u16,
    pub output_dir: PathBuf,
    pub max_file_size_mb: u64,
    /// Consecutive write failures before health turns `Degraded`
    pub max_consecutive_file_errors: u32,
    pub max_error_history_size: usize,
    pub pretty_json: bool,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            max_consecutive_file_errors: DEFAULT_MAX_CONSECUTIVE_FILE_ERRORS,
            max_error_history_size: DEFAULT_MAX_ERROR_HISTORY_SIZE,
            pretty_json: false,
        }
    }
}

impl ReceiverConfig {
    otelbox_core::setters! {
        into {
            output_dir: PathBuf,
        }
        set {
            port: u16,
            max_file_size_mb: u64,
            max_consecutive_file_errors: u32,
            max_error_history_size: usize,
            pretty_json: bool,
        }
    }

    /// Defaults overridden by any `OTELBOX_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(port) = parse_var(env::PORT)? {
            config.port = port;
        }
        if let Some(dir) = env::var(env::OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(mb) = parse_var(env::MAX_FILE_SIZE_MB)? {
            config.max_file_size_mb = mb;
        }
        if let Some(n) = parse_var(env::MAX_CONSECUTIVE_FILE_ERRORS)? {
            config.max_consecutive_file_errors = n;
        }
        if let Some(n) = parse_var(env::MAX_ERROR_HISTORY)? {
            config.max_error_history_size = n;
        }
        if let Some(raw) = env::var(env::PRETTY_JSON) {
            config.pretty_json = parse_bool(env::PRETTY_JSON, &raw)?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.max_file_size_mb == 0 {
            return Err(ConfigError::Zero("max_file_size_mb"));
        }
        if self.max_consecutive_file_errors == 0 {
            return Err(ConfigError::Zero("max_consecutive_file_errors"));
        }
        if self.max_error_history_size == 0 {
            return Err(ConfigError::Zero("max_error_history_size"));
        }
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(ConfigError::OutputNotDirectory(self.output_dir.clone()));
        }
        Ok(())
    }

    /// `output_dir` made absolute against the current directory.
    ///
    /// Lexical only; the directory need not exist yet.
    pub fn absolute_output_dir(&self) -> PathBuf {
        absolutize(&self.output_dir)
    }

    pub fn writer_config(&self) -> WriterConfig {
        WriterConfig::new(self.absolute_output_dir())
            .max_file_size_mb(self.max_file_size_mb)
            .pretty_json(self.pretty_json)
    }
}

/// Make `path` absolute and drop `.` components.
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    };
    joined.components().filter(|c| !matches!(c, std::path::Component::CurDir)).collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("port must be between 1 and 65535")]
    InvalidPort,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("output directory {} exists and is not a directory", .0.display())]
    OutputNotDirectory(PathBuf),

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var: name, value: raw }),
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv { var: name, value: raw.to_string() }),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
