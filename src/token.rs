//! Placeholder token grammar and resolution.
//!
//! Fixture files embed tokens inside JSON string values to request synthetic
//! identifiers and timestamps:
//!
//! - `$oid`, optionally followed by `<tag>`, optionally followed by `.to_s`
//! - `$isodate`, optionally followed by `<tag>`, optionally followed by
//!   `('<iso-8601 literal>')`, optionally followed by `.format('<pattern>')`
//!
//! A token must occupy the entire string value; a string with trailing text
//! after an otherwise valid token is treated as an ordinary literal and
//! passed through unchanged, as is anything that does not match the grammar.
//!
//! Tags are cross-reference names: the first occurrence of a tag resolves
//! the value and caches it, and every later occurrence of the same tag (in
//! any file of the same load) reuses the cached value. Identifier tags and
//! timestamp tags live in separate namespaces.

use std::collections::HashMap;
use std::fmt::Write as _;

use bson::Bson;
use bson::oid::ObjectId;
use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{FixtureError, FixtureResult};

/// Format accepted by `$isodate('...')` literals: ISO-8601 with millisecond
/// precision and a numeric timezone offset, e.g. `2020-01-01T00:00:00.000+0000`.
const ISODATE_LITERAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// A successfully parsed placeholder token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	/// `$oid` — a synthetic identifier.
	SyntheticId {
		/// Cross-reference name, shared with the `<collection>.<key>` index.
		tag: Option<String>,
		/// `.to_s` was present: embed the hex string instead of a native id.
		as_string: bool,
	},

	/// `$isodate` — a synthetic timestamp.
	SyntheticTimestamp {
		/// Cross-reference name.
		tag: Option<String>,
		/// Explicit ISO-8601 literal; when absent the current time is used.
		literal: Option<String>,
		/// strftime pattern: embed a rendered string instead of a native timestamp.
		format: Option<String>,
	},
}

impl Token {
	/// Parses a string value as a token.
	///
	/// Returns `None` when the value is not a token (no marker, malformed
	/// tag or argument, or trailing text after the token) — such values are
	/// kept as ordinary strings.
	pub fn parse(input: &str) -> Option<Token> {
		if let Some(rest) = input.strip_prefix("$isodate") {
			let (tag, rest) = take_tag(rest)?;
			let (literal, rest) = take_quoted(rest, "('")?;
			let (format, rest) = take_quoted(rest, ".format('")?;
			rest.is_empty().then_some(Token::SyntheticTimestamp { tag, literal, format })
		} else if let Some(rest) = input.strip_prefix("$oid") {
			let (tag, rest) = take_tag(rest)?;
			let (as_string, rest) = match rest.strip_prefix(".to_s") {
				Some(rest) => (true, rest),
				None => (false, rest),
			};
			rest.is_empty().then_some(Token::SyntheticId { tag, as_string })
		} else {
			None
		}
	}
}

/// Consumes an optional `<tag>` group. The tag must be non-empty.
fn take_tag(input: &str) -> Option<(Option<String>, &str)> {
	let Some(rest) = input.strip_prefix('<') else {
		return Some((None, input));
	};
	let end = rest.find('>')?;
	if end == 0 {
		return None;
	}
	Some((Some(rest[..end].to_string()), &rest[end + 1..]))
}

/// Consumes an optional single-quoted argument group opened by `opener`
/// (e.g. `('` or `.format('`) and closed by `')`. The argument must be
/// non-empty and may not itself contain a single quote.
fn take_quoted<'a>(input: &'a str, opener: &str) -> Option<(Option<String>, &'a str)> {
	let Some(rest) = input.strip_prefix(opener) else {
		return Some((None, input));
	};
	let end = rest.find('\'')?;
	if end == 0 {
		return None;
	}
	let after = rest[end + 1..].strip_prefix(')')?;
	Some((Some(rest[..end].to_string()), after))
}

/// Per-load caches of resolved token values.
///
/// Owned by one loader session and threaded through every resolution, so a
/// given tag resolves to exactly one value across all files of one load.
/// The identifier map doubles as the `<collection>.<key>` index: the loader
/// records each inserted document's assigned id here, which is what lets a
/// later file write `$oid<users.alice>` and get that document's id back.
#[derive(Debug, Default)]
pub struct TokenCaches {
	ids: HashMap<String, Bson>,
	dates: HashMap<String, DateTime<FixedOffset>>,
}

impl TokenCaches {
	/// Creates empty caches.
	pub fn new() -> Self {
		Self::default()
	}

	/// Resolves a parsed token into the value to embed in the document.
	pub fn resolve(&mut self, token: Token) -> FixtureResult<Bson> {
		match token {
			Token::SyntheticId { tag, as_string } => Ok(self.resolve_id(tag, as_string)),
			Token::SyntheticTimestamp { tag, literal, format } => {
				self.resolve_timestamp(tag, literal, format)
			}
		}
	}

	/// Records an assigned identifier under a resolvable name.
	pub fn record_id(&mut self, name: impl Into<String>, id: Bson) {
		self.ids.insert(name.into(), id);
	}

	/// Looks up a resolved identifier by tag or `<collection>.<key>` name.
	pub fn id(&self, name: &str) -> Option<&Bson> {
		self.ids.get(name)
	}

	fn resolve_id(&mut self, tag: Option<String>, as_string: bool) -> Bson {
		let id = match tag.as_deref().and_then(|tag| self.ids.get(tag)).cloned() {
			Some(cached) => cached,
			None => {
				let id = Bson::ObjectId(ObjectId::new());
				if let Some(tag) = tag {
					self.ids.insert(tag, id.clone());
				}
				id
			}
		};
		if as_string { Bson::String(id_string(&id)) } else { id }
	}

	fn resolve_timestamp(
		&mut self,
		tag: Option<String>,
		literal: Option<String>,
		format: Option<String>,
	) -> FixtureResult<Bson> {
		let date = match tag.as_deref().and_then(|tag| self.dates.get(tag)).copied() {
			// An already resolved tag wins; the literal, if any, is ignored.
			Some(cached) => cached,
			None => {
				let date = match literal {
					Some(literal) => DateTime::parse_from_str(&literal, ISODATE_LITERAL_FORMAT)
						.map_err(|source| FixtureError::InvalidTimestamp { literal, source })?,
					None => Utc::now().fixed_offset(),
				};
				if let Some(tag) = tag {
					self.dates.insert(tag, date);
				}
				date
			}
		};
		match format {
			Some(pattern) => {
				let mut rendered = String::new();
				write!(rendered, "{}", date.format(&pattern))
					.map_err(|_| FixtureError::InvalidTimestampFormat(pattern))?;
				Ok(Bson::String(rendered))
			}
			None => Ok(Bson::DateTime(bson::DateTime::from_millis(date.timestamp_millis()))),
		}
	}
}

/// String form of an identifier: hex for ObjectIds, verbatim for strings.
fn id_string(id: &Bson) -> String {
	match id {
		Bson::ObjectId(oid) => oid.to_hex(),
		Bson::String(s) => s.clone(),
		other => other.to_string(),
	}
}
