//! Resource pattern resolution for a module.
//!
//! A location such as `classpath:config/app.toml` or a pattern such as `local:static/**/*.css`
//! is split at its first `:`. The prefix selects a [`ResourceSpace`]: the module's own packaged
//! content ([`PackageSpace`]) or everything visible through its namespace ([`NamespaceSpace`]).
//! Locations whose prefix no space claims go to a [`FallbackResolver`].

mod config;
mod error;
mod fallback;
mod location;
mod matcher;
mod module;
mod resolver;
mod space;

pub use config::ResolverConfig;
pub use error::{ResourceError, Result};
pub use fallback::{FallbackResolver, FileSystemFallback, NoFallback};
pub use location::{Resource, ResourceLocation};
pub use matcher::PathPattern;
pub use module::{FsModule, Module};
pub use resolver::PatternResolver;
pub use space::{NamespaceSpace, PackageSpace, ResourceSpace};
