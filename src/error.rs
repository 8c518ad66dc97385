//! The root error taxonomy (spec.md §7), uniting the lower crates' own
//! closed enums via `#[from]` the way `jrsonnet-evaluator::error::Error`
//! folds in `FormatError`/`SortError` (SPEC_FULL.md §7).

use thiserror::Error;

/// `jzon`'s top-level error, covering every failure mode the tokenizer, the
/// description table, the value facade, and the decoding/encoding bridge
/// can raise. Also the type `serde::de::Error`/`serde::ser::Error` are
/// implemented for, via [`Error::Custom`].
#[derive(Error, Debug, Clone)]
pub enum Error {
	#[error(transparent)]
	Tokenize(#[from] jzon_tokenizer::TokenizeError),
	#[error(transparent)]
	Table(#[from] jzon_description::TableError),
	#[error(transparent)]
	Build(#[from] jzon_description::BuildError),
	#[error(transparent)]
	Value(#[from] jzon_value::Error),

	#[error("decoder has no keyed container at {0}")]
	MissingKeyedContainer(String),
	#[error("decoder has no unkeyed container at {0}")]
	MissingUnkeyedContainer(String),
	#[error("decoder has no super decoder at {0}")]
	MissingSuperDecoder(String),

	#[error("key not found: {0}")]
	KeyNotFound(String),
	#[error("expected {expected} at {key_path}")]
	DecodingError { expected: &'static str, key_path: String },
	#[error("{value} does not fit in {to}")]
	TypeConversion { value: String, to: &'static str },

	#[error("invalid date: {0}")]
	InvalidDate(String),
	#[error("invalid data: {0}")]
	InvalidData(String),
	#[error("invalid url: {0}")]
	InvalidUrl(String),
	#[error("invalid decimal: {0}")]
	InvalidDecimal(String),
	#[error("unrecognized strategy variant")]
	UnknownJsonStrategy,

	#[error("trailing bytes after the top-level JSON value")]
	TrailingData,

	#[error("{0}")]
	Custom(String),
}

impl serde::de::Error for Error {
	fn custom<T: std::fmt::Display>(msg: T) -> Self {
		Self::Custom(msg.to_string())
	}
}

impl serde::ser::Error for Error {
	fn custom<T: std::fmt::Display>(msg: T) -> Self {
		Self::Custom(msg.to_string())
	}
}
