//! Declarative component metadata.
//!
//! Metadata describes how the host builds a component without building it. The client only
//! reads it; ownership stays with the host container.

use std::fmt;

/// Lifecycle scope declared for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentScope {
	/// One shared instance per container generation.
	#[default]
	Singleton,
	/// A fresh instance per lookup.
	Prototype,
	/// Any other host-defined scope.
	Other,
}

impl ComponentScope {
	/// Parses a host scope name. Unknown names map to [`ComponentScope::Other`].
	pub fn parse(name: &str) -> Self {
		match name {
			"singleton" => Self::Singleton,
			"prototype" => Self::Prototype,
			_ => Self::Other,
		}
	}

	/// Returns the host scope name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Singleton => "singleton",
			Self::Prototype => "prototype",
			Self::Other => "other",
		}
	}
}

impl fmt::Display for ComponentScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Component whose instance is used to invoke a bean's factory method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryTarget {
	/// Factory declared inline inside the bean.
	Inline(Box<ComponentMetadata>),
	/// Factory declared elsewhere, referenced by component id.
	Ref(String),
}

impl FactoryTarget {
	/// Returns the component id the target points at.
	pub fn component_id(&self) -> &str {
		match self {
			Self::Inline(metadata) => metadata.id(),
			Self::Ref(id) => id,
		}
	}
}

/// Metadata of a bean-like component.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BeanMetadata {
	pub id: String,
	/// Class to instantiate, or to call a static factory method on.
	pub class_name: Option<String>,
	pub factory_method: Option<String>,
	/// Present when the factory method is invoked on another component's instance.
	pub factory_component: Option<FactoryTarget>,
	pub scope: ComponentScope,
}

impl BeanMetadata {
	/// Creates bean metadata with only an id.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}

	pub fn class(mut self, class_name: impl Into<String>) -> Self {
		self.class_name = Some(class_name.into());
		self
	}

	pub fn factory_method(mut self, method: impl Into<String>) -> Self {
		self.factory_method = Some(method.into());
		self
	}

	pub fn factory_ref(mut self, component_id: impl Into<String>) -> Self {
		self.factory_component = Some(FactoryTarget::Ref(component_id.into()));
		self
	}

	pub fn factory_inline(mut self, metadata: ComponentMetadata) -> Self {
		self.factory_component = Some(FactoryTarget::Inline(Box::new(metadata)));
		self
	}

	pub fn scope(mut self, scope: ComponentScope) -> Self {
		self.scope = scope;
		self
	}
}

/// Metadata of a reference-like component, a proxy to a service published elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceMetadata {
	pub id: String,
	/// Interface the referenced service must implement.
	pub interface: Option<String>,
}

impl ReferenceMetadata {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			interface: None,
		}
	}

	pub fn interface(mut self, name: impl Into<String>) -> Self {
		self.interface = Some(name.into());
		self
	}
}

/// Immutable description of one declared component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentMetadata {
	Bean(BeanMetadata),
	Reference(ReferenceMetadata),
	/// Any other metadata kind the host declares (reference lists, passthroughs, ...).
	Unsupported { id: String, kind: String },
}

impl ComponentMetadata {
	pub fn id(&self) -> &str {
		match self {
			Self::Bean(bean) => &bean.id,
			Self::Reference(reference) => &reference.id,
			Self::Unsupported { id, .. } => id,
		}
	}

	/// Short name of the metadata kind, used in diagnostics.
	pub fn kind(&self) -> &str {
		match self {
			Self::Bean(_) => "bean",
			Self::Reference(_) => "reference",
			Self::Unsupported { kind, .. } => kind,
		}
	}

	/// Returns true for the two kinds a client can resolve: beans and references.
	pub const fn is_supported(&self) -> bool {
		matches!(self, Self::Bean(_) | Self::Reference(_))
	}

	/// Scope of the component. Only beans declare one.
	pub fn scope(&self) -> ComponentScope {
		match self {
			Self::Bean(bean) => bean.scope,
			_ => ComponentScope::Other,
		}
	}
}

impl From<BeanMetadata> for ComponentMetadata {
	fn from(bean: BeanMetadata) -> Self {
		Self::Bean(bean)
	}
}

impl From<ReferenceMetadata> for ComponentMetadata {
	fn from(reference: ReferenceMetadata) -> Self {
		Self::Reference(reference)
	}
}
