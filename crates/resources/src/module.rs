//! Modules whose content the resolver searches.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;
use indexmap::IndexSet;
use keel_container::TypeLoader;
use tracing::{debug, trace, warn};
use url::Url;

use crate::{ResourceError, Result};

/// A deployed unit of code and content.
///
/// Paths are `/`-separated and relative to the module root; directories end with `/`.
pub trait Module: Send + Sync {
	fn name(&self) -> &str;

	/// Every entry packaged in the module itself, recursively.
	fn entries(&self) -> Vec<String>;

	/// Packaged entry at `path`, if present.
	fn entry(&self, path: &str) -> Option<Url>;

	/// Every name visible through the module's namespace, recursively. Includes the module's own
	/// content and whatever it imports.
	fn namespace_entries(&self) -> Vec<String>;

	/// First resource visible under `name` through the namespace.
	fn namespace_resource(&self, name: &str) -> Option<Url>;

	/// Type loader of the module's namespace.
	fn type_loader(&self) -> Arc<dyn TypeLoader>;
}

/// Module laid out on the local filesystem.
///
/// The package root holds the module's own content. The namespace searches the package root
/// first, then each imported root in the order added.
pub struct FsModule {
	name: String,
	root: PathBuf,
	imports: Vec<PathBuf>,
	loader: Arc<dyn TypeLoader>,
}

impl FsModule {
	pub fn new(name: impl Into<String>, root: impl Into<PathBuf>, loader: Arc<dyn TypeLoader>) -> Result<Self> {
		Ok(Self {
			name: name.into(),
			root: absolute_dir(root.into())?,
			imports: Vec::new(),
			loader,
		})
	}

	/// Makes the content under `root` visible through the namespace.
	pub fn with_import(mut self, root: impl Into<PathBuf>) -> Result<Self> {
		self.imports.push(absolute_dir(root.into())?);
		Ok(self)
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn namespace_roots(&self) -> impl Iterator<Item = &Path> {
		std::iter::once(self.root.as_path()).chain(self.imports.iter().map(PathBuf::as_path))
	}
}

impl Module for FsModule {
	fn name(&self) -> &str {
		&self.name
	}

	fn entries(&self) -> Vec<String> {
		walk(&self.root)
	}

	fn entry(&self, path: &str) -> Option<Url> {
		locate(&self.root, path)
	}

	fn namespace_entries(&self) -> Vec<String> {
		let names: IndexSet<String> = self.namespace_roots().flat_map(walk).collect();
		names.into_iter().collect()
	}

	fn namespace_resource(&self, name: &str) -> Option<Url> {
		self.namespace_roots().find_map(|root| locate(root, name))
	}

	fn type_loader(&self) -> Arc<dyn TypeLoader> {
		self.loader.clone()
	}
}

impl std::fmt::Debug for FsModule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FsModule")
			.field("name", &self.name)
			.field("root", &self.root)
			.field("imports", &self.imports)
			.finish_non_exhaustive()
	}
}

fn absolute_dir(root: PathBuf) -> Result<PathBuf> {
	if !root.is_absolute() {
		return Err(ResourceError::InvalidLocation {
			location: root.display().to_string(),
			reason: "module roots must be absolute".into(),
		});
	}
	if !root.is_dir() {
		return Err(ResourceError::InvalidLocation {
			location: root.display().to_string(),
			reason: "not a directory".into(),
		});
	}
	Ok(root)
}

/// Lists everything below `root` in file name order.
///
/// Symlinks are listed by what they point at and are not descended into. Unreadable entries,
/// dangling links and names that are not UTF-8 are skipped, so every listed name can be located.
pub(crate) fn walk(root: &Path) -> Vec<String> {
	let mut names = Vec::new();
	let walker = WalkBuilder::new(root)
		.standard_filters(false)
		.follow_links(false)
		.sort_by_file_name(|a, b| a.cmp(b))
		.build();
	for entry in walker {
		let entry = match entry {
			Ok(entry) => entry,
			Err(error) => {
				warn!(root = %root.display(), %error, "skipping unreadable module entry");
				continue;
			}
		};
		if entry.depth() == 0 {
			continue;
		}
		let Ok(relative) = entry.path().strip_prefix(root) else {
			continue;
		};
		let Some(mut name) = entry_name(relative) else {
			debug!(path = %entry.path().display(), "skipping entry with non UTF-8 name");
			continue;
		};
		let metadata = match std::fs::metadata(entry.path()) {
			Ok(metadata) => metadata,
			Err(error) => {
				debug!(path = %entry.path().display(), %error, "skipping entry without readable target");
				continue;
			}
		};
		if metadata.is_dir() {
			name.push('/');
		}
		names.push(name);
	}
	trace!(root = %root.display(), entries = names.len(), "listed module entries");
	names
}

fn entry_name(relative: &Path) -> Option<String> {
	let segments = relative
		.components()
		.map(|component| component.as_os_str().to_str())
		.collect::<Option<Vec<_>>>()?;
	Some(segments.join("/"))
}

fn locate(root: &Path, name: &str) -> Option<Url> {
	let relative = name.trim_start_matches('/');
	if relative.split('/').any(|segment| segment == "..") {
		return None;
	}
	let path = root.join(relative);
	if path.is_dir() {
		Url::from_directory_path(&path).ok()
	} else if path.is_file() {
		Url::from_file_path(&path).ok()
	} else {
		None
	}
}
