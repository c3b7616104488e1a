//! Convenience re-exports for common usage.
//!
//! # Example
//!
//! ```ignore
//! use fixturedata::prelude::*;
//!
//! let mut loader = FixtureLoader::new(MemoryStore::new());
//! loader.load("accounts").await?;
//! ```

// Error types
pub use crate::error::{FixtureError, FixtureResult};

// Loader types
pub use crate::loader::{FixtureConfig, FixtureLoader};

// Store types
pub use crate::store::{DocumentStore, MemoryStore};

#[cfg(feature = "mongodb")]
pub use crate::store::MongoStore;

// Token types
pub use crate::token::{Token, TokenCaches};
