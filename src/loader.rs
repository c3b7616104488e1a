//! Fixture loading orchestration.
//!
//! [`FixtureLoader`] turns a directory of JSON fixture files into populated
//! collections: every `*.json` file under the configured root joined with
//! the requested subdirectory is parsed, its placeholder tokens resolved,
//! and each document inserted into the collection named by the file. The
//! loader records what it inserted so tests can look documents and assigned
//! identifiers back up afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bson::{Bson, Document};
use serde_json::Value;

use crate::error::{FixtureError, FixtureResult};
use crate::rewrite::rewrite_body;
use crate::store::DocumentStore;
use crate::token::TokenCaches;

/// Configuration for a [`FixtureLoader`].
#[derive(Debug, Clone)]
pub struct FixtureConfig {
	/// Fixture root directory. Defaults to `test/fixtures`.
	pub directory: PathBuf,

	/// Whether to drop each target collection before inserting its
	/// fixtures. Defaults to `true`.
	pub drop_before: bool,
}

impl Default for FixtureConfig {
	fn default() -> Self {
		Self {
			directory: PathBuf::from("test/fixtures"),
			drop_before: true,
		}
	}
}

impl FixtureConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the fixture root directory.
	pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
		self.directory = directory.into();
		self
	}

	/// Sets whether collections are dropped before loading.
	pub fn with_drop_before(mut self, drop_before: bool) -> Self {
		self.drop_before = drop_before;
		self
	}
}

/// Loads JSON fixture files into a document store and indexes the results.
///
/// Fixture files are named `<prefix>-<collection>.json`; the prefix orders
/// the load (files are processed in filename order, one fully before the
/// next) and everything after the first hyphen names the target collection.
/// The file's top level is a JSON object mapping a file-local document key
/// to one document body.
///
/// Token caches and the fixture index live for the lifetime of the loader,
/// so tags and `<collection>.<key>` references resolve consistently across
/// every file and every `load` call made on one instance.
///
/// # Example
///
/// ```ignore
/// let mut loader = FixtureLoader::new(store);
/// loader.load("accounts").await?;
///
/// let alice = loader.document("users", "alice").unwrap();
/// let alice_id = loader.oid("users.alice").unwrap();
/// assert_eq!(alice.get("_id"), Some(alice_id));
/// ```
pub struct FixtureLoader<S> {
	store: S,
	config: FixtureConfig,
	caches: TokenCaches,
	data: HashMap<String, HashMap<String, Document>>,
}

impl<S: DocumentStore> FixtureLoader<S> {
	/// Creates a loader with the default configuration.
	pub fn new(store: S) -> Self {
		Self::with_config(store, FixtureConfig::default())
	}

	/// Creates a loader with an explicit configuration.
	pub fn with_config(store: S, config: FixtureConfig) -> Self {
		Self {
			store,
			config,
			caches: TokenCaches::new(),
			data: HashMap::new(),
		}
	}

	/// Loads every `*.json` fixture file under `<directory>/<data_dir>`.
	///
	/// Files are processed strictly sequentially in filename order; each
	/// document's assigned identifier is recorded before the next document
	/// is rewritten, so later fixtures can reference earlier ones.
	///
	/// # Errors
	///
	/// Fails fatally on the first unreadable file, malformed JSON body,
	/// bad token literal, or store error. Files already processed stay in
	/// the database; there is no rollback.
	pub async fn load(&mut self, data_dir: &str) -> FixtureResult<()> {
		let dir = self.config.directory.join(data_dir);
		if !dir.is_dir() {
			tracing::warn!(directory = %dir.display(), "fixture directory not found, nothing to load");
			return Ok(());
		}

		let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
			.collect::<Result<Vec<_>, _>>()?
			.into_iter()
			.map(|entry| entry.path())
			.filter(|path| path.extension().is_some_and(|ext| ext == "json"))
			.collect();
		paths.sort();

		for path in &paths {
			self.load_single_file(path).await?;
		}
		tracing::debug!(directory = %dir.display(), files = paths.len(), "fixtures loaded");
		Ok(())
	}

	/// Returns the loaded documents for a collection, keyed by their
	/// file-local document keys, or `None` if the collection was never
	/// loaded.
	pub fn get(&self, collection: &str) -> Option<&HashMap<String, Document>> {
		self.data.get(collection)
	}

	/// Returns one loaded document by collection and document key.
	pub fn document(&self, collection: &str, key: &str) -> Option<&Document> {
		self.data.get(collection).and_then(|docs| docs.get(key))
	}

	/// Whether the given collection was loaded.
	pub fn contains(&self, collection: &str) -> bool {
		self.data.contains_key(collection)
	}

	/// Looks up a resolved identifier by `$oid` tag or by
	/// `<collection>.<key>` name, or `None` if nothing resolved under that
	/// name.
	pub fn oid(&self, name: &str) -> Option<&Bson> {
		self.caches.id(name)
	}

	/// Returns the underlying document store.
	pub fn store(&self) -> &S {
		&self.store
	}

	async fn load_single_file(&mut self, path: &Path) -> FixtureResult<()> {
		let collection = collection_name(path)?;
		let file = path.display().to_string();
		tracing::debug!(%file, %collection, "loading fixture file");

		if self.config.drop_before {
			self.store.drop_collection(&collection).await?;
		}

		let text = std::fs::read_to_string(path)?;
		let top: Value = serde_json::from_str(&text)?;
		let Value::Object(documents) = top else {
			return Err(FixtureError::InvalidFixture {
				file,
				message: "top-level value must be a JSON object".to_string(),
			});
		};

		let mut loaded = HashMap::new();
		for (doc_ref, body) in documents {
			let mut document = rewrite_body(&file, body, &mut self.caches)?;
			let id = self.store.insert_one(&collection, document.clone()).await?;
			document.insert("_id", id.clone());
			// Recorded before the next document so later fixtures in the
			// same file can already reference this one by <collection>.<key>.
			self.caches.record_id(format!("{collection}.{doc_ref}"), id);
			loaded.insert(doc_ref, document);
		}
		// A second file for the same collection replaces its index entry.
		self.data.insert(collection, loaded);
		Ok(())
	}
}

/// Derives the collection name from a fixture filename: everything in the
/// stem after the first hyphen. `01-users.json` targets `users`.
fn collection_name(path: &Path) -> FixtureResult<String> {
	let stem = path
		.file_stem()
		.and_then(|stem| stem.to_str())
		.ok_or_else(|| FixtureError::InvalidFilename(path.display().to_string()))?;
	match stem.split_once('-') {
		Some((_, collection)) if !collection.is_empty() => Ok(collection.to_string()),
		_ => Err(FixtureError::InvalidFilename(path.display().to_string())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_config_defaults() {
		let config = FixtureConfig::default();
		assert_eq!(config.directory, PathBuf::from("test/fixtures"));
		assert!(config.drop_before);
	}

	#[rstest]
	fn test_config_builders() {
		let config = FixtureConfig::new()
			.with_directory("fixtures")
			.with_drop_before(false);
		assert_eq!(config.directory, PathBuf::from("fixtures"));
		assert!(!config.drop_before);
	}

	#[rstest]
	#[case::simple("01-users.json", "users")]
	#[case::hyphenated_collection("01-user-accounts.json", "user-accounts")]
	#[case::word_prefix("setup-events.json", "events")]
	fn test_collection_name(#[case] file: &str, #[case] expected: &str) {
		assert_eq!(collection_name(Path::new(file)).unwrap(), expected);
	}

	#[rstest]
	#[case::no_hyphen("users.json")]
	#[case::empty_collection("01-.json")]
	fn test_collection_name_rejects_bad_stems(#[case] file: &str) {
		let result = collection_name(Path::new(file));
		assert!(matches!(result, Err(FixtureError::InvalidFilename(_))));
	}
}
