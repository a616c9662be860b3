//! Runtime type names and the type-loading capability.
//!
//! Component type resolution never instantiates anything. It needs three questions answered:
//! does a named type exist, what does a named zero-argument method on it return, and is one
//! type assignable to another. [`TypeLoader`] is that capability; [`TypeCatalog`] is a static
//! implementation backed by declared types.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

mod catalog;

pub use catalog::{TypeCatalog, TypeDecl};

/// Name of a runtime type known to a [`TypeLoader`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(Arc<str>);

impl TypeRef {
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(Arc::from(name.as_ref()))
	}

	pub fn name(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for TypeRef {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for TypeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TypeRef({})", self.0)
	}
}

impl fmt::Display for TypeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for TypeRef {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<String> for TypeRef {
	fn from(name: String) -> Self {
		Self(Arc::from(name))
	}
}

/// Failure to load a type or find a method on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeLoadError {
	#[error("type not found: {0}")]
	UnknownType(String),
	#[error("method '{method}' not found on {owner}")]
	UnknownMethod { owner: TypeRef, method: String },
}

/// Loads runtime types by name and answers structural questions about them.
pub trait TypeLoader: Send + Sync {
	/// Loads the type registered under `name`.
	fn load_type(&self, name: &str) -> Result<TypeRef, TypeLoadError>;

	/// Returns the declared return type of the zero-argument method `method` on `owner`,
	/// including methods inherited from supertypes.
	fn declared_return_type(&self, owner: &TypeRef, method: &str) -> Result<TypeRef, TypeLoadError>;

	/// Returns true when a value of type `candidate` can be used where `target` is expected.
	fn is_assignable(&self, target: &TypeRef, candidate: &TypeRef) -> bool;
}

impl<L: TypeLoader + ?Sized> TypeLoader for Arc<L> {
	fn load_type(&self, name: &str) -> Result<TypeRef, TypeLoadError> {
		(**self).load_type(name)
	}

	fn declared_return_type(&self, owner: &TypeRef, method: &str) -> Result<TypeRef, TypeLoadError> {
		(**self).declared_return_type(owner, method)
	}

	fn is_assignable(&self, target: &TypeRef, candidate: &TypeRef) -> bool {
		(**self).is_assignable(target, candidate)
	}
}

#[cfg(test)]
mod tests;
