//! An eagerly-materialized JSON value tree (spec.md §4.3 "added": the
//! Rust-idiomatic analogue of the `JSONValue` union type spec.md §9 insists
//! be "a tagged variant, not an untyped bag"). Round-trips through the same
//! description table that backs the lazy `Object`/`Array` facade: build one
//! from a description with [`Value::from_description`], write it back out
//! with [`Value::to_json`].
//!
//! Kept free of any `serde` *derive* — the manual [`serde::Serialize`]/
//! [`serde::Deserialize`] impls below are what `jzon::Decoder::deserialize_any`
//! falls back to for untyped targets, the same role `serde_json::Value`
//! plays for `serde_json`.

use std::fmt;

use jzon_description::{DescriptionTable, DescriptionView};
use jzon_types::Tag;
use serde::{
	de::{self, MapAccess, SeqAccess, Visitor},
	ser::{SerializeMap, SerializeSeq},
	Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{error::Error, literal};

/// The open-ended, owned analogue of a description record: a JSON value
/// kind preserving `Int` vs `Float` per spec.md §9's Open Question ("an
/// implementation should preserve `Int` when the record tag is `integer`
/// and only widen on explicit request").
///
/// Objects keep member order (`Vec<(String, Value)>`, not a `BTreeMap`) —
/// spec.md §8's round-trip law requires member order survive a decode/encode
/// cycle, so an order-erasing map type would be wrong here even though it
/// costs a linear-scan `get`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Bool(bool),
	Integer(i64),
	Float(f64),
	String(String),
	Array(Vec<Value>),
	Object(Vec<(String, Value)>),
}

impl Value {
	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Integer(n) => Some(*n),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Integer(n) => Some(*n as f64),
			Self::Float(n) => Some(*n),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(a) => Some(a),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_object(&self) -> Option<&[(String, Value)]> {
		match self {
			Self::Object(o) => Some(o),
			_ => None,
		}
	}

	/// Look up a member by key on an `Object`; `None` on any other variant
	/// or a missing key. Linear scan, matching `keyOffset`'s own raw-bytes
	/// comparison (spec.md §4.2) rather than building an index.
	#[must_use]
	pub fn get(&self, key: &str) -> Option<&Value> {
		match self {
			Self::Object(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
			_ => None,
		}
	}

	/// Materialize a value from a description record, recursively
	/// descending into every child (spec.md §4.3 "added" `from_description`).
	pub fn from_description(json: &[u8], view: DescriptionView<'_>) -> Result<Self, Error> {
		Ok(match view.tag()? {
			Tag::Null => Self::Null,
			Tag::BoolTrue => Self::Bool(true),
			Tag::BoolFalse => Self::Bool(false),
			Tag::Integer => {
				let (s, e) = view.data_bounds()?;
				let raw = &json[s..e];
				literal::decode_i64(raw).map(Self::Integer).unwrap_or_else(|| {
					Self::Float(literal::decode_f64(raw).unwrap_or(f64::NAN))
				})
			}
			Tag::Float => {
				let (s, e) = view.data_bounds()?;
				let raw = &json[s..e];
				Self::Float(literal::decode_f64(raw).ok_or(Error::InvalidUtf8)?)
			}
			Tag::String => {
				let (s, e) = view.data_bounds()?;
				Self::String(literal::decode_string(&json[s..e], false)?)
			}
			Tag::StringEscaped => {
				let (s, e) = view.data_bounds()?;
				Self::String(literal::decode_string(&json[s..e], true)?)
			}
			Tag::Array => {
				let mut out = Vec::with_capacity(view.member_count()? as usize);
				for offset in view.array_elements()? {
					out.push(Self::from_description(json, view.child_at(offset))?);
				}
				Self::Array(out)
			}
			Tag::Object => {
				let mut out = Vec::with_capacity(view.member_count()? as usize);
				for (key_offset, value_offset) in view.object_members()? {
					let key_view = view.child_at(key_offset);
					let (ks, ke) = key_view.data_bounds()?;
					let escaped = key_view.tag()? == Tag::StringEscaped;
					let key = literal::decode_string(&json[ks..ke], escaped)?;
					let value = Self::from_description(json, view.child_at(value_offset))?;
					out.push((key, value));
				}
				Self::Object(out)
			}
		})
	}

	/// Parse a complete JSON document straight into an owned tree, with no
	/// surviving description table or byte buffer — the cheapest entry
	/// point when the caller wants a `serde_json::Value`-shaped result and
	/// never needs the lazy facade.
	pub fn parse(json: &[u8]) -> Result<Self, Error> {
		let (table, _consumed) = DescriptionTable::build(json)?;
		Self::from_description(json, table.root())
	}

	/// Serialize this tree to JSON text, in the same escaping/number-format
	/// rules the lazy facade's `literal` module uses (spec.md §4.5).
	#[must_use]
	pub fn to_json(&self) -> Vec<u8> {
		let mut out = Vec::new();
		self.write_json(&mut out);
		out
	}

	fn write_json(&self, out: &mut Vec<u8>) {
		match self {
			Self::Null => literal::write_null(out),
			Self::Bool(b) => literal::write_bool(out, *b),
			Self::Integer(n) => literal::write_i64(out, *n),
			Self::Float(n) => literal::write_f64(out, *n),
			Self::String(s) => literal::write_escaped_string(out, s),
			Self::Array(items) => {
				out.push(b'[');
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						out.push(b',');
					}
					item.write_json(out);
				}
				out.push(b']');
			}
			Self::Object(members) => {
				out.push(b'{');
				for (i, (key, value)) in members.iter().enumerate() {
					if i > 0 {
						out.push(b',');
					}
					literal::write_escaped_string(out, key);
					out.push(b':');
					value.write_json(out);
				}
				out.push(b'}');
			}
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&String::from_utf8_lossy(&self.to_json()))
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Null => serializer.serialize_unit(),
			Self::Bool(b) => serializer.serialize_bool(*b),
			Self::Integer(n) => serializer.serialize_i64(*n),
			Self::Float(n) => serializer.serialize_f64(*n),
			Self::String(s) => serializer.serialize_str(s),
			Self::Array(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			Self::Object(members) => {
				let mut map = serializer.serialize_map(Some(members.len()))?;
				for (key, value) in members {
					map.serialize_entry(key, value)?;
				}
				map.end()
			}
		}
	}
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
	type Value = Value;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("any valid JSON value")
	}

	fn visit_unit<E>(self) -> Result<Self::Value, E> {
		Ok(Value::Null)
	}
	fn visit_none<E>(self) -> Result<Self::Value, E> {
		Ok(Value::Null)
	}
	fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
		Ok(Value::Bool(v))
	}
	fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
		Ok(Value::Integer(v))
	}
	fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
		i64::try_from(v).map(Value::Integer).or(Ok(Value::Float(v as f64)))
	}
	fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
		Ok(Value::Float(v))
	}
	fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
		Ok(Value::String(v.to_owned()))
	}
	fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
		Ok(Value::String(v))
	}
	fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
		Deserialize::deserialize(deserializer)
	}
	fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
		let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
		while let Some(item) = seq.next_element()? {
			out.push(item);
		}
		Ok(Value::Array(out))
	}
	fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
		let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
		while let Some((key, value)) = map.next_entry::<String, Value>()? {
			out.push((key, value));
		}
		Ok(Value::Object(out))
	}
}

impl<'de> Deserialize<'de> for Value {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_any(ValueVisitor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn materializes_nested_document() {
		let json = br#"{"id":42,"name":"Joannis","tags":["a","b"],"active":true,"note":null}"#;
		let value = Value::parse(json).unwrap();
		assert_eq!(value.get("id"), Some(&Value::Integer(42)));
		assert_eq!(value.get("name"), Some(&Value::String("Joannis".into())));
		assert_eq!(
			value.get("tags"),
			Some(&Value::Array(vec![Value::String("a".into()), Value::String("b".into())]))
		);
		assert_eq!(value.get("active"), Some(&Value::Bool(true)));
		assert_eq!(value.get("note"), Some(&Value::Null));
	}

	#[test]
	fn preserves_integer_over_float_widening() {
		let value = Value::parse(b"42").unwrap();
		assert_eq!(value, Value::Integer(42));
	}

	#[test]
	fn round_trips_member_order() {
		let json = br#"{"b":1,"a":2}"#;
		let value = Value::parse(json).unwrap();
		assert_eq!(value.to_json(), json);
	}

	#[test]
	fn escaped_string_materializes_correctly() {
		let json = "{\"s\":\"a\\\"b\\n\\u00e9\"}".into_bytes();
		let value = Value::parse(&json).unwrap();
		assert_eq!(value.get("s"), Some(&Value::String("a\"b\n\u{e9}".into())));
	}
}
