use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::{ResourceError, Result};

const PROTOCOL_SEPARATOR: char = ':';

/// A location or pattern split into its protocol prefix and path.
///
/// The prefix runs up to and including the first `:`; without a `:` it is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLocation<'a> {
	pub prefix: &'a str,
	pub path: &'a str,
}

impl<'a> ResourceLocation<'a> {
	pub fn parse(location: &'a str) -> Self {
		let split = location.find(PROTOCOL_SEPARATOR).map_or(0, |idx| idx + PROTOCOL_SEPARATOR.len_utf8());
		let (prefix, path) = location.split_at(split);
		Self { prefix, path }
	}
}

/// Handle to one concrete resource.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Resource {
	url: Url,
}

impl Resource {
	pub fn new(url: Url) -> Self {
		Self { url }
	}

	/// Resource for an absolute filesystem path.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		Url::from_file_path(path).map(Self::new).map_err(|()| ResourceError::InvalidLocation {
			location: path.display().to_string(),
			reason: "not an absolute path".into(),
		})
	}

	pub fn url(&self) -> &Url {
		&self.url
	}

	pub fn as_str(&self) -> &str {
		self.url.as_str()
	}

	/// Last non-empty path segment.
	pub fn file_name(&self) -> Option<&str> {
		self.url.path_segments()?.filter(|segment| !segment.is_empty()).next_back()
	}

	pub fn to_file_path(&self) -> Option<PathBuf> {
		if self.url.scheme() != "file" {
			return None;
		}
		self.url.to_file_path().ok()
	}

	/// Reads the whole resource. Only `file:` resources can be read.
	pub fn read(&self) -> Result<Vec<u8>> {
		let path = self.to_file_path().ok_or_else(|| ResourceError::NotAFile(self.url.clone()))?;
		std::fs::read(path).map_err(|error| ResourceError::Io {
			url: self.url.clone(),
			error,
		})
	}

	pub fn into_url(self) -> Url {
		self.url
	}
}

impl From<Url> for Resource {
	fn from(url: Url) -> Self {
		Self::new(url)
	}
}

impl fmt::Debug for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Resource").field(&self.url.as_str()).finish()
	}
}

impl fmt::Display for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.url.as_str())
	}
}
