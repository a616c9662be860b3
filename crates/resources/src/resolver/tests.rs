use std::path::Path;

use keel_container::{TypeCatalog, TypeDecl, TypeRef};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

use super::*;
use crate::{FileSystemFallback, FsModule, NoFallback};

struct Fixture {
	own: TempDir,
	_imported: TempDir,
	resolver: PatternResolver,
}

fn write(root: &Path, path: &str, contents: &str) {
	let path = root.join(path);
	std::fs::create_dir_all(path.parent().unwrap()).unwrap();
	std::fs::write(path, contents).unwrap();
}

fn module(own: &Path, imported: &Path) -> Arc<dyn Module> {
	let catalog = TypeCatalog::new().with(TypeDecl::new("shop.Cart"));
	Arc::new(
		FsModule::new("shop.web", own, Arc::new(catalog))
			.unwrap()
			.with_import(imported)
			.unwrap(),
	)
}

fn fixture_with(fallback: Arc<dyn FallbackResolver>) -> Fixture {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
	let own = tempfile::tempdir().unwrap();
	let imported = tempfile::tempdir().unwrap();
	write(own.path(), "config/app.toml", "name = \"shop\"");
	write(own.path(), "static/site.css", "");
	write(own.path(), "static/themes/dark.css", "");
	write(imported.path(), "META/shared.xml", "");
	write(imported.path(), "config/app.toml", "name = \"imported\"");

	let resolver = PatternResolver::new(module(own.path(), imported.path()), fallback);
	Fixture {
		own,
		_imported: imported,
		resolver,
	}
}

fn fixture() -> Fixture {
	fixture_with(Arc::new(FileSystemFallback))
}

fn file_names(resources: &[Resource]) -> Vec<&str> {
	resources.iter().filter_map(Resource::file_name).collect()
}

#[rstest]
#[case::package_prefix("local:config/app.toml", "name = \"shop\"")]
#[case::unprefixed("config/app.toml", "name = \"shop\"")]
#[case::namespace_prefers_own_content("classpath:config/app.toml", "name = \"shop\"")]
#[case::namespace_sees_imports("classpath*:META/shared.xml", "")]
fn test_resolve_routes_by_prefix(#[case] location: &str, #[case] contents: &str) {
	let fixture = fixture();
	let resource = fixture.resolver.resolve(location).unwrap().unwrap();
	assert_eq!(String::from_utf8(resource.read().unwrap()).unwrap(), contents);
}

#[test]
fn test_resolve_without_fallback_for_claimed_prefix() {
	let fixture = fixture();
	let err = fixture.resolver.resolve("local:META/shared.xml").unwrap_err();
	assert!(matches!(err, ResourceError::Unresolvable { space: "package", .. }), "{err}");
}

#[test]
fn test_resolve_unknown_prefix_uses_fallback() {
	let fixture = fixture();
	let location = format!("file:{}", fixture.own.path().join("config/app.toml").display());
	let resource = fixture.resolver.resolve(&location).unwrap().unwrap();
	assert_eq!(resource.to_file_path(), Some(fixture.own.path().join("config/app.toml")));
	assert_eq!(fixture.resolver.resolve("https://example.com/x").unwrap(), None);
}

#[test]
fn test_resolve_all_matches_files_in_listing_order() {
	let fixture = fixture();
	let found = fixture.resolver.resolve_all("local:static/**/*.css").unwrap();
	assert_eq!(file_names(&found), vec!["site.css", "dark.css"]);

	let namespace = fixture.resolver.resolve_all("classpath*:**/*.xml").unwrap();
	assert_eq!(file_names(&namespace), vec!["shared.xml"]);
}

#[test]
fn test_single_and_pattern_lookups_agree() {
	let fixture = fixture();
	let single = fixture.resolver.resolve("local:static/site.css").unwrap().unwrap();
	let matched = fixture.resolver.resolve_all("local:static/site.*").unwrap();
	assert_eq!(matched, vec![single]);
}

#[test]
fn test_resolve_all_is_idempotent() {
	let fixture = fixture();
	let first = fixture.resolver.resolve_all("classpath:**/*").unwrap();
	let second = fixture.resolver.resolve_all("classpath:**/*").unwrap();
	assert_eq!(first, second);
	assert_eq!(file_names(&first), vec!["app.toml", "site.css", "dark.css", "shared.xml"]);
}

#[test]
fn test_resolve_all_falls_back_when_space_matches_nothing() {
	let fixture = fixture();
	assert!(fixture.resolver.resolve_all("local:**/*.json").unwrap().is_empty());

	let pattern = format!("file:{}/static/**/*.css", fixture.own.path().display());
	let found = fixture.resolver.resolve_all(&pattern).unwrap();
	assert_eq!(file_names(&found), vec!["site.css", "dark.css"]);
}

#[cfg(unix)]
#[test]
fn test_resolve_all_tolerates_links_in_module_content() {
	use std::os::unix::fs::symlink;

	let fixture = fixture();
	let root = fixture.own.path();
	symlink(root.join("static/gone.css"), root.join("static/broken.css")).unwrap();
	symlink(root.join("static/themes"), root.join("static/linked")).unwrap();

	let found = fixture.resolver.resolve_all("local:static/**/*.css").unwrap();
	assert_eq!(file_names(&found), vec!["site.css", "dark.css"]);

	let top = fixture.resolver.resolve_all("local:static/*").unwrap();
	assert_eq!(file_names(&top), vec!["site.css"]);
}

/// Returns the same resource twice and counts calls.
struct Recording {
	calls: std::sync::atomic::AtomicUsize,
	resource: Resource,
}

impl FallbackResolver for Recording {
	fn resolve(&self, _location: &str) -> Result<Option<Resource>> {
		self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
		Ok(Some(self.resource.clone()))
	}

	fn resolve_all(&self, _pattern: &str) -> Result<Vec<Resource>> {
		self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
		Ok(vec![self.resource.clone(), self.resource.clone()])
	}
}

#[test]
fn test_fallback_asymmetry_and_dedup() {
	let recording = Arc::new(Recording {
		calls: Default::default(),
		resource: Resource::from_path("/srv/fallback.toml").unwrap(),
	});
	let fixture = fixture_with(recording.clone());

	assert!(fixture.resolver.resolve("local:missing.toml").is_err());
	assert_eq!(recording.calls.load(std::sync::atomic::Ordering::SeqCst), 0);

	let found = fixture.resolver.resolve_all("local:**/*.json").unwrap();
	assert_eq!(found, vec![recording.resource.clone()]);
	assert_eq!(recording.calls.load(std::sync::atomic::Ordering::SeqCst), 1);

	assert_eq!(fixture.resolver.resolve_all("local:config/*.toml").unwrap().len(), 1);
	assert_eq!(recording.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn test_type_loader_comes_from_module() {
	let fixture = fixture_with(Arc::new(NoFallback));
	assert_eq!(fixture.resolver.type_loader().load_type("shop.Cart").unwrap(), TypeRef::new("shop.Cart"));
}

#[test]
fn test_custom_prefix_table() {
	let fixture = fixture_with(Arc::new(NoFallback));
	let config = ResolverConfig {
		package_prefixes: vec!["bundle:".into()],
		namespace_prefixes: vec!["cp:".into()],
	};
	let resolver = PatternResolver::from_config(&config, fixture.resolver.module().clone(), Arc::new(NoFallback)).unwrap();

	assert!(resolver.resolve("bundle:config/app.toml").unwrap().is_some());
	assert!(resolver.resolve("cp:META/shared.xml").unwrap().is_some());
	assert_eq!(resolver.resolve("config/app.toml").unwrap(), None);
	assert_eq!(resolver.resolve("local:config/app.toml").unwrap(), None);
}

#[rstest]
#[case::missing_colon(vec!["bundle".into()], vec![])]
#[case::inner_colon(vec!["a:b:".into()], vec![])]
fn test_invalid_prefixes(#[case] package_prefixes: Vec<String>, #[case] namespace_prefixes: Vec<String>) {
	let fixture = fixture_with(Arc::new(NoFallback));
	let config = ResolverConfig {
		package_prefixes,
		namespace_prefixes,
	};
	let err = PatternResolver::from_config(&config, fixture.resolver.module().clone(), Arc::new(NoFallback)).unwrap_err();
	assert!(matches!(err, ResourceError::InvalidPrefix(_)), "{err}");
}

#[test]
fn test_duplicate_prefix() {
	let fixture = fixture_with(Arc::new(NoFallback));
	let config = ResolverConfig {
		package_prefixes: vec!["x:".into()],
		namespace_prefixes: vec!["x:".into()],
	};
	let err = PatternResolver::from_config(&config, fixture.resolver.module().clone(), Arc::new(NoFallback)).unwrap_err();
	assert!(matches!(err, ResourceError::DuplicatePrefix(ref prefix) if prefix == "x:"));
}

#[test]
fn test_load_prefix_table() {
	let fixture = fixture_with(Arc::new(NoFallback));
	let path = fixture.own.path().join("resources.toml");
	std::fs::write(&path, "package-prefixes = [\"bundle:\"]\n").unwrap();
	let resolver = PatternResolver::load(&path, fixture.resolver.module().clone(), Arc::new(NoFallback)).unwrap();
	let mut prefixes: Vec<_> = resolver.prefixes().collect();
	prefixes.sort_unstable();
	assert_eq!(prefixes, vec!["bundle:", "classpath*:", "classpath:"]);
}
