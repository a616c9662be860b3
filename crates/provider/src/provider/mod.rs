//! Component provider facade.

use std::sync::Arc;

use keel_container::{ComponentInstance, ComponentScope, RegistryHandle, RegistryLocator, TypeLoader, TypeRef};
use tracing::{debug, warn};

use crate::error::MissingCause;
use crate::{AvailabilityGate, Error, Lookup, ProviderConfig, Result, TypeResolver, WaitContext};

/// Uniform lookup contract consumed by the wiring layer.
///
/// Every operation waits for the host registry first and may therefore block.
pub trait ComponentProvider {
	/// Returns the instance of component `id`.
	fn get_by_name(&self, id: &str) -> Result<ComponentInstance>;

	/// Returns the instance of component `id`, checking it is assignable to `ty`.
	fn get_by_name_and_type(&self, id: &str, ty: &TypeRef) -> Result<ComponentInstance>;

	/// Returns the only component whose declared type is assignable to `ty`.
	fn get_by_type(&self, ty: &TypeRef) -> Result<ComponentInstance>;

	/// Returns true when the host declares component `id`.
	fn contains(&self, id: &str) -> Result<bool>;

	fn is_singleton(&self, id: &str) -> Result<bool>;

	/// Returns the declared runtime type of `id`, `None` when it cannot be known.
	fn resolve_type(&self, id: &str) -> Result<Option<TypeRef>>;
}

/// [`ComponentProvider`] backed by a gated host registry.
pub struct RegistryProvider {
	gate: Arc<AvailabilityGate>,
	loader: Arc<dyn TypeLoader>,
	max_factory_depth: usize,
	wait: WaitContext,
}

impl RegistryProvider {
	pub fn new(gate: Arc<AvailabilityGate>, loader: Arc<dyn TypeLoader>) -> Self {
		Self {
			gate,
			loader,
			max_factory_depth: crate::DEFAULT_MAX_FACTORY_DEPTH,
			wait: WaitContext::new(),
		}
	}

	/// Builds the gate and the provider from configuration.
	pub fn from_config(config: &ProviderConfig, locator: Arc<dyn RegistryLocator>, loader: Arc<dyn TypeLoader>) -> Self {
		let gate = Arc::new(AvailabilityGate::from_config(config, locator));
		Self::new(gate, loader).with_max_factory_depth(config.max_factory_depth)
	}

	pub fn with_max_factory_depth(mut self, max_factory_depth: usize) -> Self {
		self.max_factory_depth = max_factory_depth;
		self
	}

	/// Uses `wait` for registry waits made through the provider itself, so cancelling it aborts
	/// those lookups. Callers needing their own cancellation go through [`Self::with_wait`].
	pub fn with_wait_context(mut self, wait: WaitContext) -> Self {
		self.wait = wait;
		self
	}

	/// Gate the event source should deliver lifecycle events to.
	pub fn gate(&self) -> &Arc<AvailabilityGate> {
		&self.gate
	}

	pub fn wait_context(&self) -> &WaitContext {
		&self.wait
	}

	pub fn type_loader(&self) -> &Arc<dyn TypeLoader> {
		&self.loader
	}

	/// View of this provider whose lookups wait on `wait` instead of the provider's own context.
	///
	/// Cancelling `wait` fails only the lookups made through the view.
	pub fn with_wait<'a>(&'a self, wait: &'a WaitContext) -> ScopedProvider<'a> {
		ScopedProvider { provider: self, wait }
	}

	fn scoped(&self) -> ScopedProvider<'_> {
		self.with_wait(&self.wait)
	}

	pub fn is_prototype(&self, id: &str) -> Result<bool> {
		self.scoped().is_prototype(id)
	}

	/// Returns true when the current instance of `id` is assignable to `ty`.
	pub fn is_type_match(&self, id: &str, ty: &TypeRef) -> Result<bool> {
		self.scoped().is_type_match(id, ty)
	}

	/// Ids of resolvable components (beans and references), in host order.
	pub fn component_names(&self) -> Result<Vec<String>> {
		self.scoped().component_names()
	}

	pub fn component_count(&self) -> Result<usize> {
		self.scoped().component_count()
	}

	/// Ids of all components whose declared type is assignable to `ty`, sorted.
	///
	/// Components that cannot be resolved are logged and skipped. Malformed metadata
	/// ([`Error::InvalidMetadata`]) aborts the scan.
	pub fn names_for_type(&self, ty: &TypeRef) -> Result<Vec<String>> {
		self.scoped().names_for_type(ty)
	}
}

impl ComponentProvider for RegistryProvider {
	fn get_by_name(&self, id: &str) -> Result<ComponentInstance> {
		self.scoped().get_by_name(id)
	}

	fn get_by_name_and_type(&self, id: &str, ty: &TypeRef) -> Result<ComponentInstance> {
		self.scoped().get_by_name_and_type(id, ty)
	}

	fn get_by_type(&self, ty: &TypeRef) -> Result<ComponentInstance> {
		self.scoped().get_by_type(ty)
	}

	fn contains(&self, id: &str) -> Result<bool> {
		self.scoped().contains(id)
	}

	fn is_singleton(&self, id: &str) -> Result<bool> {
		self.scoped().is_singleton(id)
	}

	fn resolve_type(&self, id: &str) -> Result<Option<TypeRef>> {
		self.scoped().resolve_type(id)
	}
}

/// [`RegistryProvider`] lookups bound to one caller's [`WaitContext`].
#[derive(Clone, Copy)]
pub struct ScopedProvider<'a> {
	provider: &'a RegistryProvider,
	wait: &'a WaitContext,
}

impl<'a> ScopedProvider<'a> {
	pub fn wait_context(&self) -> &'a WaitContext {
		self.wait
	}

	pub fn is_prototype(&self, id: &str) -> Result<bool> {
		self.has_scope(id, ComponentScope::Prototype)
	}

	pub fn is_type_match(&self, id: &str, ty: &TypeRef) -> Result<bool> {
		let instance = self.get_by_name(id)?;
		Ok(self.provider.loader.is_assignable(ty, instance.type_ref()))
	}

	pub fn component_names(&self) -> Result<Vec<String>> {
		let registry = self.registry()?;
		let resolver = self.resolver(&registry);
		Ok(registry
			.component_ids()
			.into_iter()
			.filter(|id| resolver.metadata(id).is_ok())
			.collect())
	}

	pub fn component_count(&self) -> Result<usize> {
		self.component_names().map(|names| names.len())
	}

	pub fn names_for_type(&self, ty: &TypeRef) -> Result<Vec<String>> {
		let registry = self.registry()?;
		self.scan(&registry, ty)
	}

	fn scan(&self, registry: &RegistryHandle, ty: &TypeRef) -> Result<Vec<String>> {
		let resolver = self.resolver(registry);
		let mut names = Vec::new();
		for id in registry.component_ids() {
			match resolver.resolve(&id) {
				Ok(Some(resolved)) if self.provider.loader.is_assignable(ty, &resolved) => names.push(id),
				Ok(_) => {}
				Err(err @ Error::InvalidMetadata { .. }) => return Err(err),
				Err(Error::NoSuchComponent {
					cause: MissingCause::UnsupportedKind(kind),
					..
				}) => {
					debug!(component = %id, %kind, "skipping unsupported component kind");
				}
				Err(err) => warn!(component = %id, error = %err, "skipping unresolvable component"),
			}
		}
		names.sort();
		Ok(names)
	}

	fn registry(&self) -> Result<RegistryHandle> {
		self.provider.gate.await_handle_with(self.wait)
	}

	fn resolver<'r>(&self, registry: &'r RegistryHandle) -> TypeResolver<'r>
	where
		'a: 'r,
	{
		let provider = self.provider;
		TypeResolver::new(&**registry, &*provider.loader).with_max_depth(provider.max_factory_depth)
	}

	fn has_scope(&self, id: &str, scope: ComponentScope) -> Result<bool> {
		let registry = self.registry()?;
		let metadata = registry.component_metadata(id)?;
		Ok(metadata.scope() == scope)
	}
}

impl ComponentProvider for ScopedProvider<'_> {
	fn get_by_name(&self, id: &str) -> Result<ComponentInstance> {
		let registry = self.registry()?;
		Ok(registry.component_instance(id)?)
	}

	fn get_by_name_and_type(&self, id: &str, ty: &TypeRef) -> Result<ComponentInstance> {
		let instance = self.get_by_name(id)?;
		if !self.provider.loader.is_assignable(ty, instance.type_ref()) {
			return Err(Error::TypeMismatch {
				id: id.to_string(),
				expected: ty.clone(),
				actual: instance.type_ref().clone(),
			});
		}
		Ok(instance)
	}

	fn get_by_type(&self, ty: &TypeRef) -> Result<ComponentInstance> {
		let registry = self.registry()?;
		let mut names = self.scan(&registry, ty)?;
		match names.len() {
			0 => Err(Error::NoSuchComponent {
				lookup: Lookup::Type(ty.clone()),
				cause: MissingCause::NoMatch,
			}),
			1 => {
				let id = names.remove(0);
				debug!(component = %id, ty = %ty, "resolved component by type");
				Ok(registry.component_instance(&id)?)
			}
			_ => Err(Error::AmbiguousComponent {
				ty: ty.clone(),
				candidates: names,
			}),
		}
	}

	fn contains(&self, id: &str) -> Result<bool> {
		let registry = self.registry()?;
		Ok(registry.component_metadata(id).is_ok())
	}

	fn is_singleton(&self, id: &str) -> Result<bool> {
		self.has_scope(id, ComponentScope::Singleton)
	}

	fn resolve_type(&self, id: &str) -> Result<Option<TypeRef>> {
		let registry = self.registry()?;
		self.resolver(&registry).resolve(id)
	}
}

impl std::fmt::Debug for ScopedProvider<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ScopedProvider")
			.field("provider", self.provider)
			.field("cancelled", &self.wait.is_cancelled())
			.finish()
	}
}

impl std::fmt::Debug for RegistryProvider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RegistryProvider")
			.field("gate", &self.gate)
			.field("max_factory_depth", &self.max_factory_depth)
			.finish_non_exhaustive()
	}
}
