//! Host registry contract.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::{ComponentInstance, ComponentMetadata};

/// Native errors reported by a host container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	#[error("no component with id '{0}'")]
	NoSuchComponent(String),
	#[error("failed to instantiate '{id}': {reason}")]
	Instantiation { id: String, reason: String },
}

/// A live host container publishing named components.
pub trait ComponentRegistry: Send + Sync {
	/// Ids of all top-level components, in declaration order.
	fn component_ids(&self) -> Vec<String>;

	/// Declarative metadata of one component.
	fn component_metadata(&self, id: &str) -> Result<ComponentMetadata, RegistryError>;

	/// Returns the instance for `id`, creating it if the scope requires.
	fn component_instance(&self, id: &str) -> Result<ComponentInstance, RegistryError>;
}

/// Reference to the live host container.
#[derive(Clone)]
pub struct RegistryHandle {
	inner: Arc<dyn ComponentRegistry>,
}

impl RegistryHandle {
	pub fn new(registry: Arc<dyn ComponentRegistry>) -> Self {
		Self { inner: registry }
	}

	pub fn from_registry<R: ComponentRegistry + 'static>(registry: R) -> Self {
		Self::new(Arc::new(registry))
	}

	/// Returns true when both handles reference the same container.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Deref for RegistryHandle {
	type Target = dyn ComponentRegistry;

	fn deref(&self) -> &Self::Target {
		&*self.inner
	}
}

impl fmt::Debug for RegistryHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("RegistryHandle")
			.field(&Arc::as_ptr(&self.inner).cast::<()>())
			.finish()
	}
}

/// One-shot discovery of an already published registry matching a filter.
pub trait RegistryLocator: Send + Sync {
	/// Looks up the registry matching `filter` without blocking.
	fn locate(&self, filter: &str) -> Option<RegistryHandle>;
}

impl<F> RegistryLocator for F
where
	F: Fn(&str) -> Option<RegistryHandle> + Send + Sync,
{
	fn locate(&self, filter: &str) -> Option<RegistryHandle> {
		self(filter)
	}
}
