use std::fmt;

/// The description record's 1-byte kind discriminant (spec.md §3).
///
/// `0x00` is deliberately unassigned: zero-initialized memory must never be
/// misread as a valid tag, so a stray all-zero record is always a corrupt
/// table, not a silently-wrong `object`.
pub const TAG_OBJECT: u8 = 0x01;
pub const TAG_ARRAY: u8 = 0x02;
pub const TAG_BOOL_TRUE: u8 = 0x03;
pub const TAG_BOOL_FALSE: u8 = 0x04;
pub const TAG_STRING: u8 = 0x05;
pub const TAG_STRING_ESCAPED: u8 = 0x06;
pub const TAG_INTEGER: u8 = 0x07;
pub const TAG_FLOAT: u8 = 0x08;
pub const TAG_NULL: u8 = 0x09;

/// Typed view of a description record's tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
	Object = TAG_OBJECT,
	Array = TAG_ARRAY,
	BoolTrue = TAG_BOOL_TRUE,
	BoolFalse = TAG_BOOL_FALSE,
	String = TAG_STRING,
	StringEscaped = TAG_STRING_ESCAPED,
	Integer = TAG_INTEGER,
	Float = TAG_FLOAT,
	Null = TAG_NULL,
}

impl Tag {
	/// Decode a raw byte into a `Tag`, rejecting the reserved `0x00` and any
	/// value outside the closed set.
	#[must_use]
	pub const fn from_u8(byte: u8) -> Option<Self> {
		Some(match byte {
			TAG_OBJECT => Self::Object,
			TAG_ARRAY => Self::Array,
			TAG_BOOL_TRUE => Self::BoolTrue,
			TAG_BOOL_FALSE => Self::BoolFalse,
			TAG_STRING => Self::String,
			TAG_STRING_ESCAPED => Self::StringEscaped,
			TAG_INTEGER => Self::Integer,
			TAG_FLOAT => Self::Float,
			TAG_NULL => Self::Null,
			_ => return None,
		})
	}

	#[must_use]
	pub const fn as_u8(self) -> u8 {
		self as u8
	}

	/// Fixed byte size of a record carrying this tag, *not including* a
	/// container's children (spec.md §3 record layout table).
	#[must_use]
	pub const fn header_len(self) -> usize {
		match self {
			Self::BoolTrue | Self::BoolFalse | Self::Null => 5,
			Self::String | Self::StringEscaped | Self::Integer | Self::Float => 9,
			Self::Object | Self::Array => 17,
		}
	}

	#[must_use]
	pub const fn is_container(self) -> bool {
		matches!(self, Self::Object | Self::Array)
	}

	#[must_use]
	pub const fn is_string(self) -> bool {
		matches!(self, Self::String | Self::StringEscaped)
	}
}

impl fmt::Display for Tag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Object => "object",
			Self::Array => "array",
			Self::BoolTrue => "true",
			Self::BoolFalse => "false",
			Self::String => "string",
			Self::StringEscaped => "string (escaped)",
			Self::Integer => "integer",
			Self::Float => "float",
			Self::Null => "null",
		};
		f.write_str(name)
	}
}

static_assertions::assert_eq_size!(Tag, u8);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_is_never_a_tag() {
		assert!(Tag::from_u8(0).is_none());
	}

	#[test]
	fn round_trips_every_variant() {
		for raw in [
			TAG_OBJECT,
			TAG_ARRAY,
			TAG_BOOL_TRUE,
			TAG_BOOL_FALSE,
			TAG_STRING,
			TAG_STRING_ESCAPED,
			TAG_INTEGER,
			TAG_FLOAT,
			TAG_NULL,
		] {
			let tag = Tag::from_u8(raw).expect("known tag");
			assert_eq!(tag.as_u8(), raw);
		}
	}

	#[test]
	fn header_lengths_match_spec() {
		assert_eq!(Tag::Null.header_len(), 5);
		assert_eq!(Tag::BoolTrue.header_len(), 5);
		assert_eq!(Tag::String.header_len(), 9);
		assert_eq!(Tag::Integer.header_len(), 9);
		assert_eq!(Tag::Object.header_len(), 17);
		assert_eq!(Tag::Array.header_len(), 17);
	}
}
