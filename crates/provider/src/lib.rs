//! Registry-backed component provider.
//!
//! Client code looks components up by name or by type as if they were registered locally,
//! while the components actually live in a host container published asynchronously:
//!
//! - [`AvailabilityGate`] blocks lookups until the host registry is published, and fails them
//!   once it is torn down for good.
//! - [`TypeResolver`] computes a component's runtime type from declarative metadata, following
//!   factory chains, without instantiating anything.
//! - [`RegistryProvider`] composes both behind the [`ComponentProvider`] contract and
//!   normalises every host failure into [`enum@Error`].

mod cancel;
mod config;
mod error;
mod gate;
mod provider;
mod resolve;

pub use cancel::WaitContext;
pub use config::{ConfigError, ProviderConfig};
pub use error::{Error, Lookup, MissingCause, Result};
pub use gate::{AvailabilityGate, RegistryEvent};
pub use provider::{ComponentProvider, RegistryProvider, ScopedProvider};
pub use resolve::{DEFAULT_MAX_FACTORY_DEPTH, TypeResolver};
