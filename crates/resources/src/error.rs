use keel_container::config::ConfigError;
use thiserror::Error;
use url::Url;

/// Errors raised while resolving resources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResourceError {
	/// A space listed `path` as present but could not turn it into a resource.
	///
	/// Listing and lookup disagree, which means the module itself is inconsistent.
	#[error("{space} space could not resolve {path:?} to a resource")]
	Unresolvable { space: &'static str, path: String },

	#[error("invalid resource pattern {pattern:?}: {source}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: globset::Error,
	},

	#[error("invalid resource location {location:?}: {reason}")]
	InvalidLocation { location: String, reason: String },

	/// Configured prefixes must be empty or end with their only `:`.
	#[error("invalid resource prefix {0:?}")]
	InvalidPrefix(String),

	#[error("prefix {0:?} is mapped to more than one resource space")]
	DuplicatePrefix(String),

	#[error("cannot read {0}: not a file resource")]
	NotAFile(Url),

	#[error("failed to read {url}: {error}")]
	Io {
		url: Url,
		#[source]
		error: std::io::Error,
	},

	#[error(transparent)]
	Config(#[from] ConfigError),
}

pub type Result<T, E = ResourceError> = std::result::Result<T, E>;
