//! TOML loading shared by every configurable part of the bridge.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or mapping it onto the target type.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Parses `T` from TOML source text.
pub fn from_toml_str<T: DeserializeOwned>(source: &str) -> Result<T> {
	Ok(toml::from_str(source)?)
}

/// Reads and parses `T` from a TOML file.
pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
	let path = path.as_ref();
	let source = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
		path: path.to_path_buf(),
		error,
	})?;
	tracing::debug!(path = %path.display(), "loaded configuration file");
	from_toml_str(&source)
}
