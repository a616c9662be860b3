use pretty_assertions::assert_eq;

use super::*;

fn shop() -> TypeCatalog {
	TypeCatalog::new()
		.with(TypeDecl::new("shop.Basket"))
		.with(TypeDecl::new("shop.Cart").extends("shop.Basket").method("checkout", "shop.Order"))
		.with(TypeDecl::new("shop.ExpressCart").extends("shop.Cart"))
		.with(TypeDecl::new("shop.CartFactory").method("create", "shop.ExpressCart"))
		.with(TypeDecl::new("shop.Order"))
}

#[test]
fn test_load_known_and_unknown_types() {
	let catalog = shop();
	assert_eq!(catalog.load_type("shop.Cart").unwrap(), TypeRef::new("shop.Cart"));
	assert_eq!(
		catalog.load_type("shop.Missing"),
		Err(TypeLoadError::UnknownType("shop.Missing".into()))
	);
}

#[test]
fn test_declared_return_type_follows_supertypes() {
	let catalog = shop();
	let express = TypeRef::new("shop.ExpressCart");
	assert_eq!(catalog.declared_return_type(&express, "checkout").unwrap(), TypeRef::new("shop.Order"));

	let err = catalog.declared_return_type(&express, "refund").unwrap_err();
	assert_eq!(
		err,
		TypeLoadError::UnknownMethod {
			owner: express,
			method: "refund".into()
		}
	);
}

#[test]
fn test_declared_return_type_on_unknown_owner() {
	let catalog = shop();
	let err = catalog.declared_return_type(&TypeRef::new("shop.Ghost"), "create").unwrap_err();
	assert_eq!(err, TypeLoadError::UnknownType("shop.Ghost".into()));
}

#[test]
fn test_assignability_is_transitive_and_reflexive() {
	let catalog = shop();
	let basket = TypeRef::new("shop.Basket");
	let express = TypeRef::new("shop.ExpressCart");
	assert!(catalog.is_assignable(&basket, &express));
	assert!(catalog.is_assignable(&express, &express));
	assert!(!catalog.is_assignable(&express, &basket));
}

#[test]
fn test_assignability_survives_cyclic_declarations() {
	let catalog = TypeCatalog::new()
		.with(TypeDecl::new("a.A").extends("a.B"))
		.with(TypeDecl::new("a.B").extends("a.A"));
	assert!(!catalog.is_assignable(&TypeRef::new("a.C"), &TypeRef::new("a.A")));
}

#[test]
fn test_catalog_from_toml() {
	let catalog = TypeCatalog::from_toml_str(
		r#"
		[[type]]
		name = "shop.CartFactory"
		methods = { create = "shop.Cart" }

		[[type]]
		name = "shop.Cart"
		supertypes = ["shop.Basket"]
		"#,
	)
	.unwrap();

	assert_eq!(catalog.len(), 2);
	let factory = catalog.load_type("shop.CartFactory").unwrap();
	assert_eq!(catalog.declared_return_type(&factory, "create").unwrap().name(), "shop.Cart");
	assert!(catalog.is_assignable(&TypeRef::new("shop.Basket"), &TypeRef::new("shop.Cart")));
}
