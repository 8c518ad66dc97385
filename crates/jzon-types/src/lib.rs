//! Shared, dependency-light primitives used by every other `jzon` crate:
//! the closed value-kind tag, a human-facing [`ValType`], ASCII byte
//! classification, and the allocation-free numeric fast paths.
//!
//! Kept separate from `jzon-tokenizer` and `jzon-description` so neither has
//! to depend on the other just to share a byte classifier, the same way
//! `jrsonnet-types` sits below `jrsonnet-parser` and `jrsonnet-evaluator`.

pub mod bytes;
pub mod numeric;
mod tag;

pub use tag::{Tag, TAG_ARRAY, TAG_BOOL_FALSE, TAG_BOOL_TRUE, TAG_FLOAT, TAG_INTEGER, TAG_NULL,
	TAG_OBJECT, TAG_STRING, TAG_STRING_ESCAPED};

use std::fmt;

/// A value's kind, independent of the on-disk tag byte. Used in error
/// messages and by the decoding bridge's type-mismatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValType {
	Object,
	Array,
	Bool,
	String,
	Integer,
	Float,
	Null,
}

impl ValType {
	#[must_use]
	pub const fn from_tag(tag: Tag) -> Self {
		match tag {
			Tag::Object => Self::Object,
			Tag::Array => Self::Array,
			Tag::BoolTrue | Tag::BoolFalse => Self::Bool,
			Tag::String | Tag::StringEscaped => Self::String,
			Tag::Integer => Self::Integer,
			Tag::Float => Self::Float,
			Tag::Null => Self::Null,
		}
	}
}

impl fmt::Display for ValType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Object => "object",
			Self::Array => "array",
			Self::Bool => "bool",
			Self::String => "string",
			Self::Integer => "integer",
			Self::Float => "float",
			Self::Null => "null",
		};
		f.write_str(name)
	}
}
