use std::collections::VecDeque;
use std::path::Path;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use super::{TypeLoadError, TypeLoader, TypeRef};
use crate::config::{self, ConfigError};

/// Declaration of one type in a [`TypeCatalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDecl {
	pub name: String,
	/// Direct supertypes (superclass and implemented interfaces).
	#[serde(default)]
	pub supertypes: Vec<String>,
	/// Zero-argument methods, name to declared return type.
	#[serde(default)]
	pub methods: IndexMap<String, String>,
}

impl TypeDecl {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn extends(mut self, supertype: impl Into<String>) -> Self {
		self.supertypes.push(supertype.into());
		self
	}

	pub fn method(mut self, name: impl Into<String>, returns: impl Into<String>) -> Self {
		self.methods.insert(name.into(), returns.into());
		self
	}
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
	#[serde(rename = "type", default)]
	types: Vec<TypeDecl>,
}

#[derive(Debug)]
struct TypeEntry {
	supertypes: Vec<TypeRef>,
	methods: FxHashMap<String, TypeRef>,
}

/// Static [`TypeLoader`] over a fixed set of declared types.
///
/// ```toml
/// [[type]]
/// name = "shop.CartFactory"
/// methods = { create = "shop.Cart" }
///
/// [[type]]
/// name = "shop.Cart"
/// supertypes = ["shop.Basket"]
/// ```
#[derive(Debug, Default)]
pub struct TypeCatalog {
	types: FxHashMap<TypeRef, TypeEntry>,
}

impl TypeCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds (or replaces) a declared type.
	pub fn with(mut self, decl: TypeDecl) -> Self {
		self.insert(decl);
		self
	}

	/// Adds (or replaces) a declared type.
	pub fn insert(&mut self, decl: TypeDecl) {
		let entry = TypeEntry {
			supertypes: decl.supertypes.into_iter().map(TypeRef::from).collect(),
			methods: decl.methods.into_iter().map(|(name, ret)| (name, TypeRef::from(ret))).collect(),
		};
		self.types.insert(TypeRef::from(decl.name), entry);
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Parses a catalog from `[[type]]` tables.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		let file: CatalogFile = config::from_toml_str(source)?;
		Ok(Self::from_decls(file.types))
	}

	/// Reads a catalog from a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let file: CatalogFile = config::load(path)?;
		Ok(Self::from_decls(file.types))
	}

	fn from_decls(decls: Vec<TypeDecl>) -> Self {
		let mut catalog = Self::new();
		for decl in decls {
			catalog.insert(decl);
		}
		catalog
	}

	/// Visits `start` and all of its transitive supertypes breadth-first, stopping when
	/// `visit` returns `Some`.
	fn walk_hierarchy<T>(&self, start: &TypeRef, mut visit: impl FnMut(&TypeRef, Option<&TypeEntry>) -> Option<T>) -> Option<T> {
		let mut seen = FxHashSet::default();
		let mut queue = VecDeque::from([start.clone()]);
		while let Some(ty) = queue.pop_front() {
			if !seen.insert(ty.clone()) {
				continue;
			}
			let entry = self.types.get(&ty);
			if let Some(found) = visit(&ty, entry) {
				return Some(found);
			}
			if let Some(entry) = entry {
				queue.extend(entry.supertypes.iter().cloned());
			}
		}
		None
	}
}

impl TypeLoader for TypeCatalog {
	fn load_type(&self, name: &str) -> Result<TypeRef, TypeLoadError> {
		self.types
			.get_key_value(name)
			.map(|(ty, _)| ty.clone())
			.ok_or_else(|| TypeLoadError::UnknownType(name.to_string()))
	}

	fn declared_return_type(&self, owner: &TypeRef, method: &str) -> Result<TypeRef, TypeLoadError> {
		if !self.types.contains_key(owner) {
			return Err(TypeLoadError::UnknownType(owner.name().to_string()));
		}
		self.walk_hierarchy(owner, |_, entry| entry.and_then(|e| e.methods.get(method)).cloned())
			.ok_or_else(|| TypeLoadError::UnknownMethod {
				owner: owner.clone(),
				method: method.to_string(),
			})
	}

	fn is_assignable(&self, target: &TypeRef, candidate: &TypeRef) -> bool {
		self.walk_hierarchy(candidate, |ty, _| (ty == target).then_some(())).is_some()
	}
}
