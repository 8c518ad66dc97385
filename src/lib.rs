//! A two-phase lazy JSON library: a single-pass tokenizer
//! ([`jzon_tokenizer`]) builds a compact binary description table
//! ([`jzon_description`]) that a random-access `Object`/`Array` facade
//! ([`jzon_value`]) reads and mutates in place, and that this crate's
//! [`decode`]/[`encode`] modules bridge to `serde`'s `Deserialize`/
//! `Serialize` traits.
//!
//! Mirrors the crate-splitting convention of the evaluator workspace this
//! was built out of: small, single-purpose crates wired together by a thin
//! root crate that owns the public API surface (SPEC_FULL.md §1).

pub mod date;
pub mod decode;
pub mod encode;
pub mod error;
pub mod settings;
#[cfg(feature = "stream")]
pub mod stream;

use serde::{de::DeserializeOwned, Serialize};

pub use error::Error;
pub use jzon_value::{Array, Field, Object, SetValue, Value};
pub use settings::{
	DecoderSettings, EncoderSettings, ExpansionPolicy, KeyDecodingStrategy, KeyEncodingStrategy,
	NilStrategy, UserInfo,
};

use decode::Decoder;
use encode::Encoder;
use jzon_description::DescriptionTable;

/// Decode a complete JSON document into `T` (spec.md §4.4 "decode(from:)").
///
/// # Errors
/// Returns an error if `json` is not valid JSON, has trailing non-whitespace
/// bytes after the top-level value, or does not match `T`'s shape.
pub fn decode_from_slice<T: DeserializeOwned>(
	json: &[u8],
	settings: &DecoderSettings,
) -> Result<T, Error> {
	let (value, consumed) = decode_with_consumed(json, settings)?;
	if json[consumed..].iter().any(|b| !b.is_ascii_whitespace()) {
		return Err(Error::TrailingData);
	}
	Ok(value)
}

/// Like [`decode_from_slice`] but also returns how many leading bytes of
/// `json` were consumed by the top-level value — the primitive
/// [`stream`]'s array decoder is built on (spec.md §4.4 "variant... used by
/// the streaming array decoder").
///
/// # Errors
/// Same as [`decode_from_slice`], except trailing bytes are left
/// unexamined rather than rejected.
pub fn decode_with_consumed<T: DeserializeOwned>(
	json: &[u8],
	settings: &DecoderSettings,
) -> Result<(T, usize), Error> {
	let (table, consumed) = DescriptionTable::build(json)?;
	let mut decoder = Decoder::new(json, table.as_bytes(), settings);
	let value = T::deserialize(&mut decoder)?;
	Ok((value, consumed))
}

/// Decode a complete JSON document given as a UTF-8 string.
///
/// # Errors
/// Same as [`decode_from_slice`].
pub fn decode_from_str<T: DeserializeOwned>(
	json: &str,
	settings: &DecoderSettings,
) -> Result<T, Error> {
	decode_from_slice(json.as_bytes(), settings)
}

/// Decode a value already materialized as an [`Object`] facade — re-walks
/// its own buffer through the same [`Decoder`] bridge rather than asking
/// the caller to reach into private fields.
///
/// # Errors
/// Returns an error if `object`'s contents don't match `T`'s shape.
pub fn decode_object<T: DeserializeOwned>(
	object: &Object,
	settings: &DecoderSettings,
) -> Result<T, Error> {
	decode_from_slice(object.as_json(), settings)
}

/// Decode a value already materialized as an [`Array`] facade.
///
/// # Errors
/// Returns an error if `array`'s contents don't match `T`'s shape.
pub fn decode_array<T: DeserializeOwned>(
	array: &Array,
	settings: &DecoderSettings,
) -> Result<T, Error> {
	decode_from_slice(array.as_json(), settings)
}

/// Encode `value` to a freshly allocated JSON byte vector (spec.md §4.5
/// "encode(_:) -> Data").
///
/// # Errors
/// Returns an error if `value`'s `Serialize` impl reports a failure (e.g. a
/// `HashMap` key conversion failure or a custom `serialize` error).
pub fn encode_to_vec<T: Serialize + ?Sized>(
	value: &T,
	settings: &EncoderSettings,
) -> Result<Vec<u8>, Error> {
	let mut out = Vec::with_capacity(settings.expansion.initial_capacity());
	let mut encoder = Encoder::new(&mut out, settings);
	value.serialize(&mut encoder)?;
	Ok(out)
}

/// Encode `value` into an existing buffer, appending at the end (spec.md
/// §4.5 "encodeInto... appends to a caller-supplied buffer").
///
/// # Errors
/// Same as [`encode_to_vec`].
pub fn encode_into<T: Serialize + ?Sized>(
	value: &T,
	out: &mut Vec<u8>,
	settings: &EncoderSettings,
) -> Result<(), Error> {
	let start = out.len();
	let result = {
		let mut encoder = Encoder::new(out, settings);
		value.serialize(&mut encoder)
	};
	if result.is_err() {
		out.truncate(start);
	}
	result
}

/// Encode `value`, requiring it to serialize to a JSON object, and hand
/// back an [`Object`] facade over the result (spec.md §4.5
/// "encodeToObject/encodeToArray... fail fast if the top-level shape
/// doesn't match").
///
/// # Errors
/// Returns an error if `value` does not serialize to an object.
pub fn encode_to_object<T: Serialize + ?Sized>(
	value: &T,
	settings: &EncoderSettings,
) -> Result<Object, Error> {
	let json = encode_to_vec(value, settings)?;
	Ok(Object::parse(&json)?)
}

/// Encode `value`, requiring it to serialize to a JSON array.
///
/// # Errors
/// Returns an error if `value` does not serialize to an array.
pub fn encode_to_array<T: Serialize + ?Sized>(
	value: &T,
	settings: &EncoderSettings,
) -> Result<Array, Error> {
	let json = encode_to_vec(value, settings)?;
	Ok(Array::parse(&json)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
	struct Point {
		x: i64,
		y: i64,
	}

	#[test]
	fn round_trips_a_struct() {
		let json = encode_to_vec(&Point { x: 1, y: -2 }, &EncoderSettings::default()).unwrap();
		assert_eq!(json, br#"{"x":1,"y":-2}"#);
		let back: Point = decode_from_slice(&json, &DecoderSettings::default()).unwrap();
		assert_eq!(back, Point { x: 1, y: -2 });
	}

	#[test]
	fn rejects_trailing_data() {
		let err = decode_from_slice::<Point>(br#"{"x":1,"y":2} garbage"#, &DecoderSettings::default());
		assert!(err.is_err());
	}
}
