//! Document tree rewriting.
//!
//! Converts a decoded JSON tree into a BSON document, routing every string
//! leaf through the token resolver. The transform is pure and bottom-up: it
//! never adds, removes, or reorders keys or array elements, and non-string
//! scalars pass through untouched.

use bson::{Bson, Document};
use serde_json::{Map, Value};

use crate::error::{FixtureError, FixtureResult};
use crate::token::{Token, TokenCaches};

/// Rewrites one decoded JSON value into its BSON counterpart.
///
/// Strings that parse as tokens are replaced by their resolved values;
/// all other strings are kept verbatim. Integers become `Bson::Int64` when
/// they fit, doubles otherwise.
pub fn rewrite_value(value: Value, caches: &mut TokenCaches) -> FixtureResult<Bson> {
	match value {
		Value::Null => Ok(Bson::Null),
		Value::Bool(b) => Ok(Bson::Boolean(b)),
		Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				Ok(Bson::Int64(i))
			} else {
				// u64 beyond i64::MAX or a fractional value.
				Ok(Bson::Double(n.as_f64().unwrap_or(f64::NAN)))
			}
		}
		Value::String(s) => match Token::parse(&s) {
			Some(token) => caches.resolve(token),
			None => Ok(Bson::String(s)),
		},
		Value::Array(items) => {
			let mut rewritten = Vec::with_capacity(items.len());
			for item in items {
				rewritten.push(rewrite_value(item, caches)?);
			}
			Ok(Bson::Array(rewritten))
		}
		Value::Object(map) => Ok(Bson::Document(rewrite_document(map, caches)?)),
	}
}

/// Rewrites a JSON object into a BSON document, preserving key order.
pub fn rewrite_document(map: Map<String, Value>, caches: &mut TokenCaches) -> FixtureResult<Document> {
	let mut document = Document::new();
	for (key, value) in map {
		document.insert(key, rewrite_value(value, caches)?);
	}
	Ok(document)
}

/// Rewrites a JSON value that must be an object (a fixture document body).
pub fn rewrite_body(file: &str, value: Value, caches: &mut TokenCaches) -> FixtureResult<Document> {
	match value {
		Value::Object(map) => rewrite_document(map, caches),
		other => Err(FixtureError::InvalidFixture {
			file: file.to_string(),
			message: format!("document body must be a JSON object, got {other}"),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_non_token_values_unchanged() {
		let mut caches = TokenCaches::new();
		let value = json!({
			"name": "Alice",
			"age": 42,
			"score": 1.5,
			"active": true,
			"note": null
		});
		let Bson::Document(doc) = rewrite_value(value, &mut caches).unwrap() else {
			panic!("expected document");
		};
		assert_eq!(doc.get("name"), Some(&Bson::String("Alice".to_string())));
		assert_eq!(doc.get("age"), Some(&Bson::Int64(42)));
		assert_eq!(doc.get("score"), Some(&Bson::Double(1.5)));
		assert_eq!(doc.get("active"), Some(&Bson::Boolean(true)));
		assert_eq!(doc.get("note"), Some(&Bson::Null));
	}

	#[rstest]
	fn test_string_leaves_rewritten_in_arrays_and_nested_maps() {
		let mut caches = TokenCaches::new();
		let value = json!({
			"ids": ["$oid<a>", "$oid<a>", "plain"],
			"nested": { "deep": { "id": "$oid<a>" } }
		});
		let Bson::Document(doc) = rewrite_value(value, &mut caches).unwrap() else {
			panic!("expected document");
		};
		let Some(Bson::Array(ids)) = doc.get("ids") else { panic!("expected array") };
		assert!(matches!(ids[0], Bson::ObjectId(_)));
		assert_eq!(ids[0], ids[1]);
		assert_eq!(ids[2], Bson::String("plain".to_string()));

		let Some(Bson::Document(nested)) = doc.get("nested") else { panic!("expected document") };
		let Some(Bson::Document(deep)) = nested.get("deep") else { panic!("expected document") };
		assert_eq!(deep.get("id"), Some(&ids[0]));
	}

	#[rstest]
	fn test_key_order_preserved() {
		let mut caches = TokenCaches::new();
		let value: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
		let Bson::Document(doc) = rewrite_value(value, &mut caches).unwrap() else {
			panic!("expected document");
		};
		let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
		assert_eq!(keys, vec!["z", "a", "m"]);
	}

	#[rstest]
	fn test_bad_literal_propagates() {
		let mut caches = TokenCaches::new();
		let value = json!({ "at": "$isodate('not-a-date')" });
		let result = rewrite_value(value, &mut caches);
		assert!(matches!(result, Err(FixtureError::InvalidTimestamp { .. })));
	}

	#[rstest]
	fn test_body_must_be_object() {
		let mut caches = TokenCaches::new();
		let result = rewrite_body("01-users.json", json!(["not", "an", "object"]), &mut caches);
		assert!(matches!(result, Err(FixtureError::InvalidFixture { .. })));
	}
}
