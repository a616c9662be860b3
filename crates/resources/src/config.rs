use std::path::Path;

use keel_container::config::{self, ConfigError};
use serde::Deserialize;

/// Prefix routing for a [`PatternResolver`](crate::PatternResolver).
///
/// ```toml
/// package-prefixes = ["local:", ""]
/// namespace-prefixes = ["classpath:", "classpath*:"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ResolverConfig {
	/// Prefixes routed to the module's packaged content. `""` covers unprefixed locations.
	pub package_prefixes: Vec<String>,
	/// Prefixes routed to the module's namespace.
	pub namespace_prefixes: Vec<String>,
}

impl Default for ResolverConfig {
	fn default() -> Self {
		Self {
			package_prefixes: vec!["local:".into(), String::new()],
			namespace_prefixes: vec!["classpath:".into(), "classpath*:".into()],
		}
	}
}

impl ResolverConfig {
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		config::from_toml_str(source)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		config::load(path)
	}
}
