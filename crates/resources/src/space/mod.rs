//! Resource spaces: where a prefix sends a lookup.

use std::sync::Arc;

use tracing::trace;
use url::Url;

use crate::{Module, PathPattern, Resource, ResourceError, Result};

/// One searchable view of a module's content.
pub trait ResourceSpace: Send + Sync {
	/// Short name used in logs and errors.
	fn name(&self) -> &'static str;

	/// Every candidate in the space, as a path comparable against `pattern`.
	fn candidates(&self, pattern: &str) -> Vec<String>;

	/// Resource at `path`, if the space has one.
	fn locate(&self, path: &str) -> Option<Url>;

	/// Resolves a path the caller knows to exist.
	///
	/// # Errors
	///
	/// [`ResourceError::Unresolvable`] when the space cannot produce it.
	fn resolve_resource(&self, path: &str) -> Result<Resource> {
		self.locate(path).map(Resource::new).ok_or_else(|| ResourceError::Unresolvable {
			space: self.name(),
			path: path.to_string(),
		})
	}

	/// Resolves every non-directory candidate matching `pattern`, in listing order.
	fn resolve_resources(&self, pattern: &str) -> Result<Vec<Resource>> {
		let matcher = PathPattern::new(pattern)?;
		let mut found = Vec::new();
		for candidate in self.candidates(pattern) {
			if candidate.ends_with('/') || !matcher.is_match(&candidate) {
				continue;
			}
			trace!(space = self.name(), %candidate, pattern, "candidate matched");
			found.push(self.resolve_resource(&candidate)?);
		}
		Ok(found)
	}
}

/// The module's own packaged content.
///
/// Candidates are relative to the module root. When the pattern is rooted (`/static/*.css`)
/// candidates are rooted too.
pub struct PackageSpace {
	module: Arc<dyn Module>,
}

impl PackageSpace {
	pub fn new(module: Arc<dyn Module>) -> Self {
		Self { module }
	}
}

impl ResourceSpace for PackageSpace {
	fn name(&self) -> &'static str {
		"package"
	}

	fn candidates(&self, pattern: &str) -> Vec<String> {
		let entries = self.module.entries();
		if pattern.starts_with('/') {
			entries.into_iter().map(|entry| format!("/{entry}")).collect()
		} else {
			entries
		}
	}

	fn locate(&self, path: &str) -> Option<Url> {
		self.module.entry(path)
	}
}

/// Everything visible through the module's namespace, imports included.
pub struct NamespaceSpace {
	module: Arc<dyn Module>,
}

impl NamespaceSpace {
	pub fn new(module: Arc<dyn Module>) -> Self {
		Self { module }
	}
}

impl ResourceSpace for NamespaceSpace {
	fn name(&self) -> &'static str {
		"namespace"
	}

	fn candidates(&self, _pattern: &str) -> Vec<String> {
		self.module.namespace_entries()
	}

	fn locate(&self, path: &str) -> Option<Url> {
		self.module.namespace_resource(path)
	}
}
