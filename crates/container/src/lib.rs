//! Host component container model.
//!
//! A host container publishes named components through a [`ComponentRegistry`]. Clients never
//! see the container's internals; they only read declarative [`ComponentMetadata`], ask for
//! [`ComponentInstance`]s, and load runtime types through a [`TypeLoader`].
//!
//! The crate also ships an in-memory host ([`MemoryRegistry`], [`MemoryLocator`]) and a static
//! type catalog ([`TypeCatalog`]) so that both sides of a bridge can be assembled without a
//! foreign runtime.

pub mod config;
mod identity;
mod instance;
pub mod memory;
mod metadata;
mod registry;
pub mod types;

pub use identity::ModuleIdentity;
pub use instance::{ComponentInstance, InstancePtr};
pub use memory::{MemoryLocator, MemoryRegistry};
pub use metadata::{BeanMetadata, ComponentMetadata, ComponentScope, FactoryTarget, ReferenceMetadata};
pub use registry::{ComponentRegistry, RegistryError, RegistryHandle, RegistryLocator};
pub use types::{TypeCatalog, TypeDecl, TypeLoadError, TypeLoader, TypeRef};
