//! Declarative JSON fixture loading for MongoDB test setup.
//!
//! This crate loads directories of JSON fixture files into a document
//! database, resolving placeholder tokens that generate or reference
//! synthetic identifiers and timestamps. Fixtures get consistent,
//! reproducible values across files, and documents inserted by one fixture
//! file can be referenced by id from another file in the same load.
//!
//! # Fixture files
//!
//! A fixture file is a JSON object mapping a file-local document key to one
//! document body, named `<prefix>-<collection>.json` — the prefix orders the
//! load, the rest names the target collection (`01-users.json`):
//!
//! ```json
//! {
//!   "alice": {
//!     "name": "Alice",
//!     "id": "$oid<alice_id>",
//!     "joined": "$isodate<signup>('2020-01-01T00:00:00.000+0000')"
//!   },
//!   "bob": {
//!     "name": "Bob",
//!     "invited_by": "$oid<alice_id>",
//!     "joined_year": "$isodate<signup>.format('%Y')"
//!   }
//! }
//! ```
//!
//! Both `$oid<alice_id>` occurrences resolve to the same identifier, and
//! `joined_year` renders the cached `signup` timestamp as `"2020"`.
//!
//! # Quick start
//!
//! ```ignore
//! use fixturedata::prelude::*;
//!
//! let client = mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
//! let store = MongoStore::new(client.database("myapp_test"));
//!
//! let mut loader = FixtureLoader::new(store);
//! loader.load("accounts").await?;
//!
//! let alice = loader.document("users", "alice").unwrap();
//! assert_eq!(loader.oid("users.alice"), alice.get("_id"));
//! assert_eq!(loader.oid("alice_id"), alice.get("id"));
//! ```
//!
//! # Tokens
//!
//! Two token kinds are recognized when they make up an entire string value:
//!
//! - `$oid[<tag>][.to_s]` — a synthetic identifier; `.to_s` embeds the hex
//!   string form instead of a native ObjectId.
//! - `$isodate[<tag>][('literal')][.format('pattern')]` — a synthetic
//!   timestamp; without a literal the current time is used, with `.format`
//!   a rendered string is embedded instead of a native datetime.
//!
//! A tag binds its resolved value for reuse anywhere in the same load. The
//! identifier namespace also contains every inserted document under
//! `<collection>.<key>`, so `$oid<users.alice>` in a later file reuses the
//! id the database assigned to that document.
//!
//! # Architecture
//!
//! - [`Token`](token::Token) / [`TokenCaches`](token::TokenCaches) — token
//!   grammar and per-tag resolution caches
//! - [`rewrite`] — bottom-up JSON → BSON rewriting of string leaves
//! - [`DocumentStore`](store::DocumentStore) — the database seam, with
//!   [`MongoStore`](store::MongoStore) (feature `mongodb`, default) and an
//!   in-process [`MemoryStore`](store::MemoryStore) for tests
//! - [`FixtureLoader`](loader::FixtureLoader) — orchestration and the
//!   queryable fixture index

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod loader;
pub mod prelude;
pub mod rewrite;
pub mod store;
pub mod token;

// Re-export commonly used types at crate root
pub use error::{FixtureError, FixtureResult};
pub use loader::{FixtureConfig, FixtureLoader};
pub use store::{DocumentStore, MemoryStore};
pub use token::{Token, TokenCaches};

#[cfg(feature = "mongodb")]
pub use store::MongoStore;
