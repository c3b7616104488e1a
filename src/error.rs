//! Error types for fixture loading.
//!
//! This module defines the error types used throughout the fixturedata crate.

use thiserror::Error;

/// Errors that can occur while loading fixtures.
///
/// Every variant is fatal for the load that produced it: there are no
/// retries, and a failing load leaves the database in whatever partially
/// mutated state the already-processed files put it in.
#[derive(Debug, Error)]
pub enum FixtureError {
	/// I/O operation failed.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// Fixture file is not valid JSON.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// Fixture file content has the wrong shape.
	#[error("Invalid fixture in {file}: {message}")]
	InvalidFixture {
		/// Path of the offending fixture file.
		file: String,
		/// What was wrong with it.
		message: String,
	},

	/// Fixture filename does not follow the `<prefix>-<collection>.json` convention.
	#[error("Invalid fixture filename (expected '<prefix>-<collection>.json'): {0}")]
	InvalidFilename(String),

	/// A `$isodate('...')` literal did not parse as an ISO-8601 timestamp.
	#[error("Invalid timestamp literal '{literal}': {source}")]
	InvalidTimestamp {
		/// The literal as written in the fixture.
		literal: String,
		/// Underlying chrono parse error.
		source: chrono::ParseError,
	},

	/// A `.format('...')` pattern could not be rendered.
	#[error("Invalid timestamp format pattern '{0}'")]
	InvalidTimestampFormat(String),

	/// Database operation failed.
	#[error("Database error: {0}")]
	Database(String),
}

/// Result type alias for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;
