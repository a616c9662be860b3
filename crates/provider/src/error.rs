use std::fmt;

use keel_container::{RegistryError, TypeLoadError, TypeRef};

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What a failed lookup was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
	Name(String),
	Type(TypeRef),
}

impl fmt::Display for Lookup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Lookup::Name(id) => write!(f, "'{id}'"),
			Lookup::Type(ty) => write!(f, "of type {ty}"),
		}
	}
}

/// Why a component could not be found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MissingCause {
	#[error("not declared")]
	Unknown,
	#[error("unsupported metadata kind '{0}'")]
	UnsupportedKind(String),
	#[error(transparent)]
	TypeLoad(#[from] TypeLoadError),
	#[error("type of factory component '{0}' is unknown")]
	UnresolvedFactory(String),
	/// The host failed while producing the instance.
	#[error("{0}")]
	Registry(String),
	#[error("no candidate matched")]
	NoMatch,
}

/// Every failure a provider caller can observe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The host registry was torn down; it will never come back for this gate.
	#[error("registry {filter} has been shut down")]
	RegistryUnavailable { filter: String },
	/// This caller stopped waiting for the registry.
	#[error("wait for registry {filter} was cancelled")]
	WaitCancelled { filter: String },
	#[error("no such component {lookup}: {cause}")]
	NoSuchComponent { lookup: Lookup, cause: MissingCause },
	#[error("component '{id}' is of type {actual}, expected {expected}")]
	TypeMismatch { id: String, expected: TypeRef, actual: TypeRef },
	#[error("more than one component of type {ty}: {}", .candidates.join(", "))]
	AmbiguousComponent { ty: TypeRef, candidates: Vec<String> },
	/// The host's declarations are malformed. Not retryable.
	#[error("invalid metadata for '{id}': {reason}")]
	InvalidMetadata { id: String, reason: String },
}

impl Error {
	pub(crate) fn missing(id: &str, cause: impl Into<MissingCause>) -> Self {
		Error::NoSuchComponent {
			lookup: Lookup::Name(id.to_string()),
			cause: cause.into(),
		}
	}

	pub(crate) fn invalid(id: &str, reason: impl Into<String>) -> Self {
		Error::InvalidMetadata {
			id: id.to_string(),
			reason: reason.into(),
		}
	}

	/// Returns true for the not-found family, whatever the cause.
	pub fn is_no_such_component(&self) -> bool {
		matches!(self, Error::NoSuchComponent { .. })
	}

	/// Returns true for failures raised by the availability gate.
	pub fn is_gate_failure(&self) -> bool {
		matches!(self, Error::RegistryUnavailable { .. } | Error::WaitCancelled { .. })
	}
}

impl From<RegistryError> for Error {
	fn from(err: RegistryError) -> Self {
		match err {
			RegistryError::NoSuchComponent(id) => Error::missing(&id, MissingCause::Unknown),
			RegistryError::Instantiation { id, reason } => Error::missing(&id, MissingCause::Registry(reason)),
		}
	}
}
