//! The ordered-map facade over `(JSON buffer, description table)`
//! (spec.md §4.3). Holds both pieces as plain owned data rather than the
//! teacher's GC'd, interior-mutable `ObjValue` — JSON objects here have no
//! cycles and no shared mutable parents, so `&mut self` on plain fields is
//! enough (SPEC_FULL.md §4.3 "added").

use jzon_description::{rewrite, DescriptionTable};
use jzon_types::Tag;

use crate::{
	error::Error,
	field::{materialize_field, prepare_value, Field, SetValue},
	literal,
	owned::Value,
};

#[derive(Debug, Clone)]
pub struct Object {
	json: Vec<u8>,
	table: DescriptionTable,
}

impl Object {
	/// Parse a complete JSON document that must be an object at its root
	/// (spec.md §4.3 "fail with `expectedObject` ... if the root tag
	/// mismatches").
	pub fn parse(json: &[u8]) -> Result<Self, Error> {
		let (table, _consumed) = DescriptionTable::build(json)?;
		table.root().require_object()?;
		Ok(Self { json: json.to_vec(), table })
	}

	/// An empty object, `{}` — the "literal-construction form" spec.md §4.3
	/// calls out as starting "from `{}`... with an empty description".
	#[must_use]
	pub fn new() -> Self {
		let (table, _) = DescriptionTable::build(b"{}").expect("`{}` always parses");
		Self { json: b"{}".to_vec(), table }
	}

	pub(crate) fn from_parts(json: Vec<u8>, table: DescriptionTable) -> Self {
		Self { json, table }
	}

	#[must_use]
	pub fn as_json(&self) -> &[u8] {
		&self.json
	}

	pub(crate) fn description(&self) -> &DescriptionTable {
		&self.table
	}

	pub fn len(&self) -> Result<usize, Error> {
		Ok(self.table.root().member_count()? as usize)
	}

	pub fn is_empty(&self) -> Result<bool, Error> {
		Ok(self.len()? == 0)
	}

	/// Every member key, in source order, unescaping where needed.
	pub fn keys(&self) -> Result<Vec<String>, Error> {
		self.table
			.root()
			.object_members()?
			.into_iter()
			.map(|(key_offset, _)| {
				let view = self.table.view_at(key_offset);
				let (s, e) = view.data_bounds()?;
				let escaped = view.tag()? == Tag::StringEscaped;
				Ok(literal::decode_string(&self.json[s..e], escaped)?)
			})
			.collect()
	}

	pub fn contains_key(&self, key: &str) -> Result<bool, Error> {
		Ok(self.table.root().value_offset(&self.json, key, false)?.is_some())
	}

	/// Typed subscript read (spec.md §4.3 "Read path"). `None` if `key` is
	/// absent; nested containers come back as standalone facades.
	pub fn get(&self, key: &str) -> Result<Option<Field>, Error> {
		match self.table.root().value_offset(&self.json, key, false)? {
			Some(offset) => Ok(Some(materialize_field(&self.json, &self.table, offset)?)),
			None => Ok(None),
		}
	}

	/// Typed subscript write (spec.md §4.3 "Write path"). Assigning `None`
	/// removes the key, matching the "Write path — assign nil" rule.
	pub fn set<'a>(&mut self, key: &str, value: impl Into<SetValue<'a>>) -> Result<(), Error> {
		let value = value.into();
		if matches!(value, SetValue::Null) {
			self.remove(key)?;
			return Ok(());
		}
		let (value_json, value_table) = prepare_value(value)?;
		if let Some(existing) = self.table.root().value_offset(&self.json, key, false)? {
			rewrite::rewrite(&mut self.json, &mut self.table, existing, &value_json, &value_table)?;
		} else {
			let mut key_json = Vec::new();
			literal::write_escaped_string(&mut key_json, key);
			rewrite::append_object_member(
				&mut self.json,
				&mut self.table,
				0,
				&key_json,
				&value_json,
				&value_table,
			)?;
		}
		Ok(())
	}

	/// Remove `key`'s member if present, returning whether it was found
	/// (spec.md §4.2 `removeObjectMember`).
	pub fn remove(&mut self, key: &str) -> Result<bool, Error> {
		Ok(rewrite::remove_object_member(&mut self.json, &mut self.table, 0, key, false)?)
	}

	/// Materialize the full tree as an owned [`Value`], e.g. for
	/// serialization or deep equality.
	pub fn to_owned_value(&self) -> Result<Value, Error> {
		Value::from_description(&self.json, self.table.root())
	}
}

impl Default for Object {
	fn default() -> Self {
		Self::new()
	}
}

impl PartialEq for Object {
	fn eq(&self, other: &Self) -> bool {
		self.to_owned_value().ok() == other.to_owned_value().ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_and_reads_scalar_members() {
		let obj = Object::parse(br#"{"id":42,"name":"Joannis"}"#).unwrap();
		assert_eq!(obj.get("id").unwrap(), Some(Field::Integer(42)));
		assert_eq!(obj.get("name").unwrap(), Some(Field::String("Joannis".into())));
		assert_eq!(obj.get("missing").unwrap(), None);
		assert_eq!(obj.keys().unwrap(), vec!["id".to_string(), "name".to_string()]);
	}

	#[test]
	fn set_then_remove_matches_spec_scenario_5() {
		let mut obj = Object::parse(br#"{"a":1}"#).unwrap();
		obj.set("b", 2i64).unwrap();
		obj.remove("a").unwrap();
		assert_eq!(obj.as_json(), br#"{"b":2}"#);
		assert_eq!(obj.len().unwrap(), 1);
	}

	#[test]
	fn set_existing_key_rewrites_in_place() {
		let mut obj = Object::parse(br#"{"a":1,"b":2}"#).unwrap();
		obj.set("a", 999i64).unwrap();
		assert_eq!(obj.as_json(), br#"{"a":999,"b":2}"#);
	}

	#[test]
	fn set_null_on_present_key_removes_it() {
		let mut obj = Object::parse(br#"{"a":1,"b":2}"#).unwrap();
		obj.set("a", SetValue::Null).unwrap();
		assert_eq!(obj.as_json(), br#"{"b":2}"#);
	}

	#[test]
	fn nested_object_subscript_is_standalone() {
		let obj = Object::parse(br#"{"inner":{"x":1}}"#).unwrap();
		let Field::Object(inner) = obj.get("inner").unwrap().unwrap() else { panic!("expected object") };
		assert_eq!(inner.as_json(), br#"{"x":1}"#);
		assert_eq!(inner.get("x").unwrap(), Some(Field::Integer(1)));
	}

	#[test]
	fn append_into_empty_object_needs_no_comma() {
		let mut obj = Object::new();
		obj.set("only", "v").unwrap();
		assert_eq!(obj.as_json(), br#"{"only":"v"}"#);
	}

	#[test]
	fn graft_object_value_into_another_object() {
		let mut host = Object::new();
		let nested = Object::parse(br#"{"x":1}"#).unwrap();
		host.set("child", &nested).unwrap();
		assert_eq!(host.as_json(), br#"{"child":{"x":1}}"#);
		let Field::Object(child) = host.get("child").unwrap().unwrap() else { panic!() };
		assert_eq!(child.get("x").unwrap(), Some(Field::Integer(1)));
	}

	#[test]
	fn structural_equality_ignores_byte_layout() {
		let a = Object::parse(br#"{"a":1,"b":2}"#).unwrap();
		let mut b = Object::new();
		b.set("a", 1i64).unwrap();
		b.set("b", 2i64).unwrap();
		assert_eq!(a, b);
	}
}
