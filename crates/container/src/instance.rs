use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::TypeRef;

/// Type-erased pointer to a component instance owned by the host container.
pub type InstancePtr = Arc<dyn Any + Send + Sync + 'static>;

/// A component instance tagged with the runtime type the host created it as.
#[derive(Clone)]
pub struct ComponentInstance {
	ty: TypeRef,
	value: InstancePtr,
}

impl ComponentInstance {
	pub fn new<T: Any + Send + Sync>(ty: impl Into<TypeRef>, value: T) -> Self {
		Self {
			ty: ty.into(),
			value: Arc::new(value),
		}
	}

	pub fn from_ptr(ty: impl Into<TypeRef>, value: InstancePtr) -> Self {
		Self { ty: ty.into(), value }
	}

	/// Runtime type of the instance.
	pub fn type_ref(&self) -> &TypeRef {
		&self.ty
	}

	pub fn value(&self) -> &InstancePtr {
		&self.value
	}

	/// Returns the instance as a concrete Rust type, if it is one.
	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		Arc::clone(&self.value).downcast::<T>().ok()
	}

	/// Returns true when both handles point at the same instance.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.value, &other.value)
	}
}

impl fmt::Debug for ComponentInstance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentInstance")
			.field("type", &self.ty)
			.field("ptr", &Arc::as_ptr(&self.value).cast::<()>())
			.finish()
	}
}
