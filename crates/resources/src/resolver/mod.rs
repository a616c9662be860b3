use std::path::Path;
use std::sync::Arc;

use indexmap::IndexSet;
use keel_container::TypeLoader;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
	FallbackResolver, Module, NamespaceSpace, PackageSpace, Resource, ResourceError, ResourceLocation, ResourceSpace, ResolverConfig, Result,
};

/// Routes locations and patterns to the resource space named by their prefix.
///
/// The prefix table is fixed at construction. A prefix without a space sends the whole string
/// to the fallback. A single-location lookup never falls back once a space claimed it; a pattern
/// lookup falls back when the space matched nothing.
pub struct PatternResolver {
	module: Arc<dyn Module>,
	spaces: FxHashMap<String, Arc<dyn ResourceSpace>>,
	fallback: Arc<dyn FallbackResolver>,
}

impl PatternResolver {
	/// Resolver with the default prefix table.
	pub fn new(module: Arc<dyn Module>, fallback: Arc<dyn FallbackResolver>) -> Self {
		let package: Arc<dyn ResourceSpace> = Arc::new(PackageSpace::new(module.clone()));
		let namespace: Arc<dyn ResourceSpace> = Arc::new(NamespaceSpace::new(module.clone()));
		let defaults = ResolverConfig::default();
		let spaces = defaults
			.package_prefixes
			.into_iter()
			.map(|prefix| (prefix, package.clone()))
			.chain(defaults.namespace_prefixes.into_iter().map(|prefix| (prefix, namespace.clone())))
			.collect();
		Self { module, spaces, fallback }
	}

	/// Resolver with the prefix table described by `config`.
	///
	/// # Errors
	///
	/// [`ResourceError::InvalidPrefix`] for a prefix that is neither empty nor ends with its only
	/// `:`, and [`ResourceError::DuplicatePrefix`] for a prefix listed twice.
	pub fn from_config(config: &ResolverConfig, module: Arc<dyn Module>, fallback: Arc<dyn FallbackResolver>) -> Result<Self> {
		let package: Arc<dyn ResourceSpace> = Arc::new(PackageSpace::new(module.clone()));
		let namespace: Arc<dyn ResourceSpace> = Arc::new(NamespaceSpace::new(module.clone()));
		let routes = config
			.package_prefixes
			.iter()
			.map(|prefix| (prefix, &package))
			.chain(config.namespace_prefixes.iter().map(|prefix| (prefix, &namespace)));

		let mut spaces = FxHashMap::default();
		for (prefix, space) in routes {
			if ResourceLocation::parse(prefix).prefix != prefix {
				return Err(ResourceError::InvalidPrefix(prefix.clone()));
			}
			if spaces.insert(prefix.clone(), space.clone()).is_some() {
				return Err(ResourceError::DuplicatePrefix(prefix.clone()));
			}
		}
		Ok(Self { module, spaces, fallback })
	}

	/// Reads the prefix table from a TOML file.
	pub fn load(path: impl AsRef<Path>, module: Arc<dyn Module>, fallback: Arc<dyn FallbackResolver>) -> Result<Self> {
		let config = ResolverConfig::load(path)?;
		Self::from_config(&config, module, fallback)
	}

	/// Resolves a single location.
	///
	/// # Errors
	///
	/// [`ResourceError::Unresolvable`] when a space claims the prefix but has nothing at the path.
	pub fn resolve(&self, location: &str) -> Result<Option<Resource>> {
		let ResourceLocation { prefix, path } = ResourceLocation::parse(location);
		debug!(module = self.module.name(), prefix, path, "resolving resource");
		match self.spaces.get(prefix) {
			Some(space) => space.resolve_resource(path).map(Some),
			None => self.fallback.resolve(location),
		}
	}

	/// Resolves every resource matching `pattern`, without duplicates, in first-seen order.
	pub fn resolve_all(&self, pattern: &str) -> Result<Vec<Resource>> {
		let ResourceLocation { prefix, path } = ResourceLocation::parse(pattern);
		debug!(module = self.module.name(), prefix, path, "resolving resources");
		let found = match self.spaces.get(prefix) {
			Some(space) => {
				let found = space.resolve_resources(path)?;
				if found.is_empty() {
					debug!(space = space.name(), pattern, "no matches, trying fallback");
					self.fallback.resolve_all(pattern)?
				} else {
					found
				}
			}
			None => self.fallback.resolve_all(pattern)?,
		};
		let unique: IndexSet<Resource> = found.into_iter().collect();
		Ok(unique.into_iter().collect())
	}

	/// Type loader of the module's namespace.
	pub fn type_loader(&self) -> Arc<dyn TypeLoader> {
		self.module.type_loader()
	}

	pub fn module(&self) -> &Arc<dyn Module> {
		&self.module
	}

	/// Prefixes claimed by a resource space.
	pub fn prefixes(&self) -> impl Iterator<Item = &str> {
		self.spaces.keys().map(String::as_str)
	}
}

impl std::fmt::Debug for PatternResolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut prefixes: Vec<_> = self.prefixes().collect();
		prefixes.sort_unstable();
		f.debug_struct("PatternResolver")
			.field("module", &self.module.name())
			.field("prefixes", &prefixes)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests;
