//! Document store seam.
//!
//! The loader only needs two operations from the database: dropping a
//! collection and inserting a single document. This module defines that
//! boundary as a trait, a MongoDB adapter (behind the `mongodb` feature,
//! enabled by default), and an in-process store for tests that need no
//! running database.

use std::collections::HashMap;

use async_trait::async_trait;
use bson::{Bson, Document};
use bson::oid::ObjectId;
use parking_lot::RwLock;

use crate::error::FixtureResult;

/// Minimal document-database interface consumed by the fixture loader.
///
/// Implementations are expected to fail fatally: the loader performs no
/// retries, and an insert error aborts the whole load.
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Drops the collection, discarding any documents it held.
	///
	/// Dropping a collection that does not exist is not an error.
	async fn drop_collection(&self, collection: &str) -> FixtureResult<()>;

	/// Inserts a single document and returns the identifier the store
	/// assigned to it (the document's own `_id` when it carries one).
	async fn insert_one(&self, collection: &str, document: Document) -> FixtureResult<Bson>;
}

/// MongoDB-backed [`DocumentStore`] over a [`mongodb::Database`].
///
/// # Example
///
/// ```ignore
/// let client = mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
/// let store = MongoStore::new(client.database("myapp_test"));
/// let mut loader = FixtureLoader::new(store);
/// loader.load("smoke").await?;
/// ```
#[cfg(feature = "mongodb")]
pub struct MongoStore {
	database: mongodb::Database,
}

#[cfg(feature = "mongodb")]
impl MongoStore {
	/// Creates a store over the given database.
	pub fn new(database: mongodb::Database) -> Self {
		Self { database }
	}
}

#[cfg(feature = "mongodb")]
#[async_trait]
impl DocumentStore for MongoStore {
	async fn drop_collection(&self, collection: &str) -> FixtureResult<()> {
		self.database
			.collection::<Document>(collection)
			.drop()
			.await
			.map_err(|e| crate::error::FixtureError::Database(e.to_string()))
	}

	async fn insert_one(&self, collection: &str, document: Document) -> FixtureResult<Bson> {
		let result = self
			.database
			.collection::<Document>(collection)
			.insert_one(document)
			.await
			.map_err(|e| crate::error::FixtureError::Database(e.to_string()))?;
		Ok(result.inserted_id)
	}
}

/// In-process [`DocumentStore`] for tests.
///
/// Assigns a fresh `ObjectId` to documents inserted without an `_id`, the
/// way the MongoDB driver does.
#[derive(Debug, Default)]
pub struct MemoryStore {
	collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a snapshot of a collection's documents, in insertion order.
	pub fn documents(&self, collection: &str) -> Vec<Document> {
		self.collections.read().get(collection).cloned().unwrap_or_default()
	}

	/// Pre-populates a collection, for exercising drop-before-load behavior.
	pub fn seed(&self, collection: &str, documents: Vec<Document>) {
		self.collections.write().entry(collection.to_string()).or_default().extend(documents);
	}
}

#[async_trait]
impl DocumentStore for MemoryStore {
	async fn drop_collection(&self, collection: &str) -> FixtureResult<()> {
		self.collections.write().remove(collection);
		Ok(())
	}

	async fn insert_one(&self, collection: &str, mut document: Document) -> FixtureResult<Bson> {
		let id = match document.get("_id") {
			Some(id) => id.clone(),
			None => {
				let id = Bson::ObjectId(ObjectId::new());
				document.insert("_id", id.clone());
				id
			}
		};
		self.collections.write().entry(collection.to_string()).or_default().push(document);
		Ok(id)
	}
}
