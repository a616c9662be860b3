use std::fmt;

/// Service class under which host containers publish their registry.
pub const REGISTRY_SERVICE_CLASS: &str = "keel.container.ComponentRegistry";

/// Registry property carrying the owning module's symbolic name.
pub const SYMBOLIC_NAME_PROPERTY: &str = "keel.container.symbolicname";

/// Registry property carrying the owning module's version.
pub const VERSION_PROPERTY: &str = "keel.container.version";

/// Identity of the module whose host container a client wants to reach.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleIdentity {
	pub symbolic_name: String,
	pub version: String,
}

impl ModuleIdentity {
	pub fn new(symbolic_name: impl Into<String>, version: impl Into<String>) -> Self {
		Self {
			symbolic_name: symbolic_name.into(),
			version: version.into(),
		}
	}

	/// Filter matching exactly this module's registry entry.
	pub fn registry_filter(&self) -> String {
		format!(
			"(&(objectClass={REGISTRY_SERVICE_CLASS})({SYMBOLIC_NAME_PROPERTY}={})({VERSION_PROPERTY}={}))",
			escape_value(&self.symbolic_name),
			escape_value(&self.version)
		)
	}
}

impl fmt::Display for ModuleIdentity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} [{}]", self.symbolic_name, self.version)
	}
}

/// Escapes the characters that are special inside a filter value.
fn escape_value(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for ch in value.chars() {
		if matches!(ch, '\\' | '*' | '(' | ')') {
			escaped.push('\\');
		}
		escaped.push(ch);
	}
	escaped
}
