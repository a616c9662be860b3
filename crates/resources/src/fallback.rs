//! Resolvers for locations no resource space claims.

use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::module::walk;
use crate::{PathPattern, Resource, ResourceError, Result};

/// Handles locations and patterns after prefix routing gave up on them.
///
/// Receives the full location, prefix included.
pub trait FallbackResolver: Send + Sync {
	fn resolve(&self, location: &str) -> Result<Option<Resource>>;

	fn resolve_all(&self, pattern: &str) -> Result<Vec<Resource>>;
}

/// Resolves nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFallback;

impl FallbackResolver for NoFallback {
	fn resolve(&self, _location: &str) -> Result<Option<Resource>> {
		Ok(None)
	}

	fn resolve_all(&self, _pattern: &str) -> Result<Vec<Resource>> {
		Ok(Vec::new())
	}
}

/// Resolves `file:` URLs on the local host, either a single file or a glob over the filesystem.
///
/// Locations are decoded the way [`Url`] encodes them, so the URL of any resolved resource
/// resolves again. Other schemes resolve to nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemFallback;

impl FileSystemFallback {
	fn file_path(location: &str) -> Result<Option<PathBuf>> {
		let url = match Url::parse(location) {
			Ok(url) if url.scheme() == "file" => url,
			_ => {
				debug!(location, "no fallback for location");
				return Ok(None);
			}
		};
		url.to_file_path().map(Some).map_err(|()| ResourceError::InvalidLocation {
			location: location.to_string(),
			reason: "not a path on the local host".into(),
		})
	}

	fn resolve_path(path: &Path) -> Result<Option<Resource>> {
		if !path.is_file() {
			return Ok(None);
		}
		Resource::from_path(path).map(Some)
	}
}

impl FallbackResolver for FileSystemFallback {
	fn resolve(&self, location: &str) -> Result<Option<Resource>> {
		match Self::file_path(location)? {
			Some(path) => Self::resolve_path(&path),
			None => Ok(None),
		}
	}

	fn resolve_all(&self, pattern: &str) -> Result<Vec<Resource>> {
		// `?` and `#` are wildcards here, not URL delimiters.
		let escaped = pattern.replace('?', "%3F").replace('#', "%23");
		let Some(path) = Self::file_path(&escaped)? else {
			return Ok(Vec::new());
		};
		let path = path.to_str().ok_or_else(|| ResourceError::InvalidLocation {
			location: pattern.to_string(),
			reason: "decoded path is not UTF-8".into(),
		})?;
		let matcher = PathPattern::new(path)?;
		let literal = matcher.literal_base();
		if literal == path {
			return Ok(Self::resolve_path(Path::new(path))?.into_iter().collect());
		}

		let base = Path::new(literal);
		if !base.is_dir() {
			return Ok(Vec::new());
		}
		let prefix = literal.trim_end_matches('/');
		let mut found = Vec::new();
		for name in walk(base) {
			if name.ends_with('/') {
				continue;
			}
			let candidate = format!("{prefix}/{name}");
			if matcher.is_match(&candidate) {
				found.push(Resource::from_path(&candidate)?);
			}
		}
		debug!(pattern, matches = found.len(), "filesystem fallback search");
		Ok(found)
	}
}
