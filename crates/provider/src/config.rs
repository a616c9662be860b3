use std::path::Path;

pub use keel_container::config::ConfigError;
use keel_container::{ModuleIdentity, config};
use serde::Deserialize;

use crate::DEFAULT_MAX_FACTORY_DEPTH;

/// Settings for one client-side provider.
///
/// ```toml
/// filter = "(&(objectClass=keel.container.ComponentRegistry)(keel.container.symbolicname=shop.web))"
/// max-factory-depth = 16
/// probe-on-wait = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProviderConfig {
	/// Filter selecting the host registry entry. Opaque to the provider.
	pub filter: String,
	/// Longest factory chain accepted during type resolution.
	pub max_factory_depth: usize,
	/// Whether the first wait probes for an already published registry.
	pub probe_on_wait: bool,
}

impl Default for ProviderConfig {
	fn default() -> Self {
		Self {
			filter: String::new(),
			max_factory_depth: DEFAULT_MAX_FACTORY_DEPTH,
			probe_on_wait: true,
		}
	}
}

impl ProviderConfig {
	/// Default settings targeting the registry of `identity`.
	pub fn for_module(identity: &ModuleIdentity) -> Self {
		Self {
			filter: identity.registry_filter(),
			..Self::default()
		}
	}

	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		config::from_toml_str(source)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		config::load(path)
	}
}
