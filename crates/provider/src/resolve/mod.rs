//! Component type resolution from declarative metadata.
//!
//! Types are computed without instantiating anything: instantiation can have side effects, and
//! type queries run for every component during a type-based lookup.
//!
//! | metadata                           | resolved type                                   |
//! |------------------------------------|-------------------------------------------------|
//! | reference with interface           | the interface                                   |
//! | reference without interface        | unknown (`None`)                                |
//! | bean, class only                   | the class                                       |
//! | bean, class + factory method       | the method's return type on the class           |
//! | bean, factory method + factory ref | the method's return type on the factory's type  |

use keel_container::{BeanMetadata, ComponentMetadata, ComponentRegistry, FactoryTarget, TypeLoader, TypeRef};
use tracing::trace;

use crate::error::MissingCause;
use crate::{Error, Result};

/// Default bound on the length of a factory chain.
pub const DEFAULT_MAX_FACTORY_DEPTH: usize = 32;

/// Resolves component types against one registry generation.
pub struct TypeResolver<'a> {
	registry: &'a dyn ComponentRegistry,
	loader: &'a dyn TypeLoader,
	max_depth: usize,
}

impl<'a> TypeResolver<'a> {
	pub fn new(registry: &'a dyn ComponentRegistry, loader: &'a dyn TypeLoader) -> Self {
		Self {
			registry,
			loader,
			max_depth: DEFAULT_MAX_FACTORY_DEPTH,
		}
	}

	/// Caps how many factory components may be chained before the metadata is rejected.
	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = max_depth;
		self
	}

	/// Resolves the runtime type of component `id`.
	///
	/// Returns `Ok(None)` for references that do not declare an interface.
	///
	/// # Errors
	///
	/// [`Error::NoSuchComponent`] when `id` (or a factory it depends on) is unknown, has an
	/// unsupported metadata kind, or names a type or method the loader cannot find.
	/// [`Error::InvalidMetadata`] when a bean declares neither class nor factory method, a
	/// factory method without a factory component, or a factory chain longer than the cap.
	pub fn resolve(&self, id: &str) -> Result<Option<TypeRef>> {
		let metadata = self.metadata(id)?;
		self.resolve_metadata(&metadata, 0)
	}

	/// Fetches metadata for `id`, rejecting unsupported kinds.
	pub fn metadata(&self, id: &str) -> Result<ComponentMetadata> {
		let metadata = self.registry.component_metadata(id)?;
		supported(metadata)
	}

	fn resolve_metadata(&self, metadata: &ComponentMetadata, depth: usize) -> Result<Option<TypeRef>> {
		if depth > self.max_depth {
			return Err(Error::invalid(
				metadata.id(),
				format!("factory chain is deeper than {} components", self.max_depth),
			));
		}

		match metadata {
			ComponentMetadata::Reference(reference) => match &reference.interface {
				Some(interface) => self.load(&reference.id, interface).map(Some),
				None => Ok(None),
			},
			ComponentMetadata::Bean(bean) => self.resolve_bean(bean, depth).map(Some),
			ComponentMetadata::Unsupported { id, kind } => Err(Error::missing(id, MissingCause::UnsupportedKind(kind.clone()))),
		}
	}

	fn resolve_bean(&self, bean: &BeanMetadata, depth: usize) -> Result<TypeRef> {
		trace!(component = %bean.id, depth, "resolving bean type");
		match (&bean.class_name, &bean.factory_method) {
			(None, None) => Err(Error::invalid(&bean.id, "neither class name nor factory method is declared")),
			(None, Some(method)) => {
				let target = bean
					.factory_component
					.as_ref()
					.ok_or_else(|| Error::invalid(&bean.id, "factory method declared without a class name or factory component"))?;
				let factory_type = self.factory_type(bean, target, depth)?;
				self.return_type(&bean.id, &factory_type, method)
			}
			(Some(class), Some(method)) => {
				let owner = self.load(&bean.id, class)?;
				self.return_type(&bean.id, &owner, method)
			}
			(Some(class), None) => self.load(&bean.id, class),
		}
	}

	/// The factory component may itself come out of another factory.
	fn factory_type(&self, bean: &BeanMetadata, target: &FactoryTarget, depth: usize) -> Result<TypeRef> {
		let resolved = match target {
			FactoryTarget::Ref(factory_id) => {
				let factory = self.metadata(factory_id)?;
				self.resolve_metadata(&factory, depth + 1)?
			}
			FactoryTarget::Inline(factory) => self.resolve_metadata(factory, depth + 1)?,
		};
		resolved.ok_or_else(|| Error::missing(&bean.id, MissingCause::UnresolvedFactory(target.component_id().to_string())))
	}

	fn load(&self, id: &str, name: &str) -> Result<TypeRef> {
		self.loader.load_type(name).map_err(|err| Error::missing(id, err))
	}

	fn return_type(&self, id: &str, owner: &TypeRef, method: &str) -> Result<TypeRef> {
		self.loader.declared_return_type(owner, method).map_err(|err| Error::missing(id, err))
	}
}

fn supported(metadata: ComponentMetadata) -> Result<ComponentMetadata> {
	match metadata {
		ComponentMetadata::Unsupported { id, kind } => Err(Error::missing(&id, MissingCause::UnsupportedKind(kind))),
		metadata => Ok(metadata),
	}
}
