//! In-memory host container.
//!
//! [`MemoryRegistry`] plays the host side of the bridge: it holds declared metadata, creates
//! instances through registered factories, and caches singletons the way a real host would.
//! [`MemoryLocator`] is the matching service lookup used for discovery probes.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::config::{self, ConfigError};
use crate::{
	BeanMetadata, ComponentInstance, ComponentMetadata, ComponentRegistry, ComponentScope, ReferenceMetadata, RegistryError, RegistryHandle,
	RegistryLocator,
};

type Factory = Arc<dyn Fn() -> Result<ComponentInstance, String> + Send + Sync>;

struct Declared {
	metadata: ComponentMetadata,
	factory: Option<Factory>,
}

/// Host container backed by declared metadata and instance factories.
#[derive(Default)]
pub struct MemoryRegistry {
	components: IndexMap<String, Declared>,
	singletons: Mutex<FxHashMap<String, ComponentInstance>>,
}

impl MemoryRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares a component without a factory. Instantiating it fails.
	pub fn declare(mut self, metadata: impl Into<ComponentMetadata>) -> Self {
		let metadata = metadata.into();
		self.components.insert(metadata.id().to_string(), Declared { metadata, factory: None });
		self
	}

	/// Declares a component together with the factory producing its instances.
	pub fn component<F>(self, metadata: impl Into<ComponentMetadata>, factory: F) -> Self
	where
		F: Fn() -> ComponentInstance + Send + Sync + 'static,
	{
		self.fallible_component(metadata, move || Ok(factory()))
	}

	/// Declares a component whose factory may fail.
	pub fn fallible_component<F>(mut self, metadata: impl Into<ComponentMetadata>, factory: F) -> Self
	where
		F: Fn() -> Result<ComponentInstance, String> + Send + Sync + 'static,
	{
		let metadata = metadata.into();
		self.components.insert(
			metadata.id().to_string(),
			Declared {
				metadata,
				factory: Some(Arc::new(factory)),
			},
		);
		self
	}

	/// Attaches a factory to an already declared component.
	pub fn with_factory<F>(mut self, id: &str, factory: F) -> Self
	where
		F: Fn() -> ComponentInstance + Send + Sync + 'static,
	{
		if let Some(declared) = self.components.get_mut(id) {
			declared.factory = Some(Arc::new(move || Ok(factory())));
		}
		self
	}

	/// Parses `[[component]]` declarations.
	///
	/// ```toml
	/// [[component]]
	/// id = "cart"
	/// kind = "bean"
	/// factory-method = "create"
	/// factory-ref = "cartFactory"
	/// scope = "prototype"
	/// ```
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		let file: RegistryFile = config::from_toml_str(source)?;
		Ok(file.into_registry())
	}

	/// Reads `[[component]]` declarations from a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let file: RegistryFile = config::load(path)?;
		Ok(file.into_registry())
	}

	/// Wraps the registry in a shareable handle.
	pub fn into_handle(self) -> RegistryHandle {
		RegistryHandle::from_registry(self)
	}

	fn create(&self, id: &str, declared: &Declared) -> Result<ComponentInstance, RegistryError> {
		let factory = declared.factory.as_ref().ok_or_else(|| RegistryError::Instantiation {
			id: id.to_string(),
			reason: "no factory registered".into(),
		})?;
		trace!(component = id, "creating component instance");
		factory().map_err(|reason| RegistryError::Instantiation {
			id: id.to_string(),
			reason,
		})
	}
}

impl ComponentRegistry for MemoryRegistry {
	fn component_ids(&self) -> Vec<String> {
		self.components.keys().cloned().collect()
	}

	fn component_metadata(&self, id: &str) -> Result<ComponentMetadata, RegistryError> {
		self.components
			.get(id)
			.map(|declared| declared.metadata.clone())
			.ok_or_else(|| RegistryError::NoSuchComponent(id.to_string()))
	}

	fn component_instance(&self, id: &str) -> Result<ComponentInstance, RegistryError> {
		let declared = self.components.get(id).ok_or_else(|| RegistryError::NoSuchComponent(id.to_string()))?;
		if declared.metadata.scope() == ComponentScope::Prototype {
			return self.create(id, declared);
		}

		if let Some(instance) = self.singletons.lock().get(id) {
			return Ok(instance.clone());
		}
		// Factories may look up other components, so they run unlocked. A racing creation loses.
		let instance = self.create(id, declared)?;
		Ok(self.singletons.lock().entry(id.to_string()).or_insert(instance).clone())
	}
}

#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
	#[serde(rename = "component", default)]
	components: Vec<ComponentDecl>,
}

impl RegistryFile {
	fn into_registry(self) -> MemoryRegistry {
		let mut registry = MemoryRegistry::new();
		for decl in self.components {
			registry = registry.declare(decl.into_metadata());
		}
		debug!(components = registry.components.len(), "declared components");
		registry
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ComponentDecl {
	id: String,
	#[serde(default = "default_kind")]
	kind: String,
	class: Option<String>,
	factory_method: Option<String>,
	factory_ref: Option<String>,
	scope: Option<String>,
	interface: Option<String>,
}

fn default_kind() -> String {
	"bean".into()
}

impl ComponentDecl {
	fn into_metadata(self) -> ComponentMetadata {
		match self.kind.as_str() {
			"bean" => ComponentMetadata::Bean(BeanMetadata {
				id: self.id,
				class_name: self.class,
				factory_method: self.factory_method,
				factory_component: self.factory_ref.map(crate::FactoryTarget::Ref),
				scope: self.scope.as_deref().map(ComponentScope::parse).unwrap_or_default(),
			}),
			"reference" => ComponentMetadata::Reference(ReferenceMetadata {
				id: self.id,
				interface: self.interface,
			}),
			_ => ComponentMetadata::Unsupported {
				id: self.id,
				kind: self.kind,
			},
		}
	}
}

/// Published registries keyed by the filter that selects them.
#[derive(Debug, Default, Clone)]
pub struct MemoryLocator {
	inner: Arc<RwLock<FxHashMap<String, RegistryHandle>>>,
}

impl MemoryLocator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Publishes `handle` under `filter`, returning the handle it replaced.
	pub fn publish(&self, filter: impl Into<String>, handle: RegistryHandle) -> Option<RegistryHandle> {
		self.inner.write().insert(filter.into(), handle)
	}

	/// Withdraws the registry published under `filter`.
	pub fn withdraw(&self, filter: &str) -> Option<RegistryHandle> {
		self.inner.write().remove(filter)
	}

	/// Returns published filters sorted by name.
	pub fn filters(&self) -> Vec<String> {
		let mut filters: Vec<_> = self.inner.read().keys().cloned().collect();
		filters.sort();
		filters
	}
}

impl RegistryLocator for MemoryLocator {
	fn locate(&self, filter: &str) -> Option<RegistryHandle> {
		self.inner.read().get(filter).cloned()
	}
}
