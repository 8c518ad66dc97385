//! The result of a typed subscript read (spec.md §4.3 "Read path"): scalars
//! are materialized immediately, while nested containers come back as
//! standalone facades over a *sliced* description, rebased to their own
//! JSON window so they can be handed around independently of the parent
//! that produced them (spec.md §3 "nested facades are always slices +
//! rebased offsets; there is no parent pointer").

use jzon_description::DescriptionTable;
use jzon_types::Tag;

use crate::{array::Array, error::Error, literal, object::Object};

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
	Null,
	Bool(bool),
	Integer(i64),
	Float(f64),
	String(String),
	Object(Object),
	Array(Array),
}

impl Field {
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
	pub fn as_object(&self) -> Option<&Object> {
		match self {
			Self::Object(o) => Some(o),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_array(&self) -> Option<&Array> {
		match self {
			Self::Array(a) => Some(a),
			_ => None,
		}
	}
}

/// Rebase the record at `at` (and all of its descendants) into a standalone
/// `(bytes, table)` pair rooted at JSON offset 0, so it can be handed out
/// as an independent [`Object`]/[`Array`] facade (spec.md GLOSSARY
/// "Rebase").
pub(crate) fn slice_at(
	json: &[u8],
	table: &DescriptionTable,
	at: usize,
) -> Result<(Vec<u8>, DescriptionTable), Error> {
	let view = table.view_at(at);
	let (start, end) = view.json_bounds()?;
	let index_len = view.index_length()?;
	let sub_json = json[start..end].to_vec();
	let mut sub_table_bytes = table.as_bytes()[at..at + index_len].to_vec();
	jzon_description::rewrite::rebase(&mut sub_table_bytes, -(start as i32))?;
	Ok((sub_json, DescriptionTable::from_raw_parts(sub_table_bytes)))
}

pub(crate) fn materialize_field(
	json: &[u8],
	table: &DescriptionTable,
	at: usize,
) -> Result<Field, Error> {
	let view = table.view_at(at);
	Ok(match view.tag()? {
		Tag::Null => Field::Null,
		Tag::BoolTrue => Field::Bool(true),
		Tag::BoolFalse => Field::Bool(false),
		Tag::Integer => {
			let (s, e) = view.data_bounds()?;
			let raw = &json[s..e];
			match literal::decode_i64(raw) {
				Some(n) => Field::Integer(n),
				None => Field::Float(literal::decode_f64(raw).ok_or(Error::InvalidUtf8)?),
			}
		}
		Tag::Float => {
			let (s, e) = view.data_bounds()?;
			Field::Float(literal::decode_f64(&json[s..e]).ok_or(Error::InvalidUtf8)?)
		}
		Tag::String => {
			let (s, e) = view.data_bounds()?;
			Field::String(literal::decode_string(&json[s..e], false)?)
		}
		Tag::StringEscaped => {
			let (s, e) = view.data_bounds()?;
			Field::String(literal::decode_string(&json[s..e], true)?)
		}
		Tag::Object => {
			let (sub_json, sub_table) = slice_at(json, table, at)?;
			Field::Object(Object::from_parts(sub_json, sub_table))
		}
		Tag::Array => {
			let (sub_json, sub_table) = slice_at(json, table, at)?;
			Field::Array(Array::from_parts(sub_json, sub_table))
		}
	})
}

/// Input accepted by [`Object::set`]/[`Array::push`]/[`Array::set`]: every
/// scalar JSON kind, plus a reference to an already-built `Object`/`Array`
/// for grafting (spec.md GLOSSARY "Grafting").
#[derive(Debug, Clone, Copy)]
pub enum SetValue<'a> {
	Null,
	Bool(bool),
	Integer(i64),
	Float(f64),
	String(&'a str),
	Object(&'a Object),
	Array(&'a Array),
}

impl From<bool> for SetValue<'_> {
	fn from(v: bool) -> Self {
		Self::Bool(v)
	}
}
impl From<i64> for SetValue<'_> {
	fn from(v: i64) -> Self {
		Self::Integer(v)
	}
}
impl From<i32> for SetValue<'_> {
	fn from(v: i32) -> Self {
		Self::Integer(i64::from(v))
	}
}
impl From<f64> for SetValue<'_> {
	fn from(v: f64) -> Self {
		Self::Float(v)
	}
}
impl<'a> From<&'a str> for SetValue<'a> {
	fn from(v: &'a str) -> Self {
		Self::String(v)
	}
}
impl<'a> From<&'a String> for SetValue<'a> {
	fn from(v: &'a String) -> Self {
		Self::String(v.as_str())
	}
}
impl<'a> From<&'a Object> for SetValue<'a> {
	fn from(v: &'a Object) -> Self {
		Self::Object(v)
	}
}
impl<'a> From<&'a Array> for SetValue<'a> {
	fn from(v: &'a Array) -> Self {
		Self::Array(v)
	}
}
impl<'a, T: Into<SetValue<'a>>> From<Option<T>> for SetValue<'a> {
	fn from(v: Option<T>) -> Self {
		v.map_or(Self::Null, Into::into)
	}
}

/// Encode `value` as standalone `(json, table)`, ready to be spliced by
/// `jzon_description::rewrite::{rewrite, append_object_member,
/// append_array_element}` (spec.md §4.3 write paths).
pub(crate) fn prepare_value(value: SetValue<'_>) -> Result<(Vec<u8>, DescriptionTable), Error> {
	let mut bytes = Vec::new();
	match value {
		SetValue::Object(o) => return Ok((o.as_json().to_vec(), o.description().clone())),
		SetValue::Array(a) => return Ok((a.as_json().to_vec(), a.description().clone())),
		SetValue::Null => literal::write_null(&mut bytes),
		SetValue::Bool(b) => literal::write_bool(&mut bytes, b),
		SetValue::Integer(n) => literal::write_i64(&mut bytes, n),
		SetValue::Float(n) => literal::write_f64(&mut bytes, n),
		SetValue::String(s) => literal::write_escaped_string(&mut bytes, s),
	}
	let (table, _) = DescriptionTable::build(&bytes)?;
	Ok((bytes, table))
}
