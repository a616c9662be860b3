use globset::{GlobBuilder, GlobMatcher};

use crate::{ResourceError, Result};

/// Compiled path pattern.
///
/// `*` matches within one `/`-separated segment, `**` across any number of segments and `?`
/// a single character.
#[derive(Debug, Clone)]
pub struct PathPattern {
	source: String,
	matcher: GlobMatcher,
}

impl PathPattern {
	pub fn new(pattern: &str) -> Result<Self> {
		let glob = GlobBuilder::new(pattern)
			.literal_separator(true)
			.build()
			.map_err(|source| ResourceError::InvalidPattern {
				pattern: pattern.to_string(),
				source,
			})?;
		Ok(Self {
			source: pattern.to_string(),
			matcher: glob.compile_matcher(),
		})
	}

	pub fn as_str(&self) -> &str {
		&self.source
	}

	pub fn is_match(&self, path: &str) -> bool {
		self.matcher.is_match(path)
	}

	/// Leading part of the pattern that contains no wildcard, cut back to a whole segment.
	pub fn literal_base(&self) -> &str {
		let wildcard = self.source.find(['*', '?', '[', '{']).unwrap_or(self.source.len());
		if wildcard == self.source.len() {
			return &self.source;
		}
		self.source[..wildcard].rfind('/').map_or("", |slash| &self.source[..=slash])
	}
}
