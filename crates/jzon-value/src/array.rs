//! The ordered-sequence facade over `(JSON buffer, description table)`
//! (spec.md §4.3), the array-shaped twin of [`crate::object::Object`].

use jzon_description::{rewrite, DescriptionTable};

use crate::{
	error::Error,
	field::{materialize_field, prepare_value, Field, SetValue},
	owned::Value,
};

#[derive(Debug, Clone)]
pub struct Array {
	json: Vec<u8>,
	table: DescriptionTable,
}

impl Array {
	/// Parse a complete JSON document that must be an array at its root
	/// (spec.md §4.3 "fail with ... `expectedArray` if the root tag
	/// mismatches").
	pub fn parse(json: &[u8]) -> Result<Self, Error> {
		let (table, _consumed) = DescriptionTable::build(json)?;
		table.root().require_array()?;
		Ok(Self { json: json.to_vec(), table })
	}

	/// An empty array, `[]`.
	#[must_use]
	pub fn new() -> Self {
		let (table, _) = DescriptionTable::build(b"[]").expect("`[]` always parses");
		Self { json: b"[]".to_vec(), table }
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

	/// Typed subscript read by position (spec.md §8 scenario 2). `None` if
	/// `index` is out of bounds.
	pub fn get(&self, index: usize) -> Result<Option<Field>, Error> {
		let elements = self.table.root().array_elements()?;
		match elements.get(index) {
			Some(&offset) => Ok(Some(materialize_field(&self.json, &self.table, offset)?)),
			None => Ok(None),
		}
	}

	/// Replace the element at `index` in place (spec.md §4.3 "array[i] =
	/// v"). Out-of-bounds is a no-op returning `false`.
	pub fn set<'a>(&mut self, index: usize, value: impl Into<SetValue<'a>>) -> Result<bool, Error> {
		let elements = self.table.root().array_elements()?;
		let Some(&offset) = elements.get(index) else { return Ok(false) };
		let (value_json, value_table) = prepare_value(value.into())?;
		rewrite::rewrite(&mut self.json, &mut self.table, offset, &value_json, &value_table)?;
		Ok(true)
	}

	/// Append a new element at the end (spec.md §4.3 "append (array)").
	pub fn push<'a>(&mut self, value: impl Into<SetValue<'a>>) -> Result<(), Error> {
		let (value_json, value_table) = prepare_value(value.into())?;
		rewrite::append_array_element(&mut self.json, &mut self.table, 0, &value_json, &value_table)?;
		Ok(())
	}

	/// All elements, in source order.
	pub fn iter(&self) -> Result<Vec<Field>, Error> {
		self.table
			.root()
			.array_elements()?
			.into_iter()
			.map(|offset| materialize_field(&self.json, &self.table, offset))
			.collect()
	}

	pub fn to_owned_value(&self) -> Result<Value, Error> {
		Value::from_description(&self.json, self.table.root())
	}
}

impl Default for Array {
	fn default() -> Self {
		Self::new()
	}
}

impl PartialEq for Array {
	fn eq(&self, other: &Self) -> bool {
		self.to_owned_value().ok() == other.to_owned_value().ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn iterates_mixed_element_kinds_in_order() {
		let arr = Array::parse(br#"[1,2.5,true,null,"x"]"#).unwrap();
		assert_eq!(arr.len().unwrap(), 5);
		let items = arr.iter().unwrap();
		assert_eq!(items[0], Field::Integer(1));
		assert_eq!(items[1], Field::Float(2.5));
		assert_eq!(items[2], Field::Bool(true));
		assert_eq!(items[3], Field::Null);
		assert_eq!(items[4], Field::String("x".into()));
	}

	#[test]
	fn push_appends_to_end() {
		let mut arr = Array::parse(b"[1,2]").unwrap();
		arr.push(3i64).unwrap();
		assert_eq!(arr.as_json(), b"[1,2,3]");
	}

	#[test]
	fn push_into_empty_array_needs_no_comma() {
		let mut arr = Array::new();
		arr.push("only").unwrap();
		assert_eq!(arr.as_json(), br#"["only"]"#);
	}

	#[test]
	fn set_replaces_element_in_place() {
		let mut arr = Array::parse(b"[1,2,3]").unwrap();
		assert!(arr.set(1, 99i64).unwrap());
		assert_eq!(arr.as_json(), b"[1,99,3]");
	}

	#[test]
	fn set_out_of_bounds_is_a_no_op() {
		let mut arr = Array::parse(b"[1]").unwrap();
		assert!(!arr.set(5, 1i64).unwrap());
	}
}
