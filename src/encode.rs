//! The encoding bridge (spec.md §4.5): `impl serde::Serializer for &mut
//! Encoder` writing JSON text directly into a caller-owned `Vec<u8>`, no
//! intermediate tree — the encoder's counterpart to [`crate::decode`].
//!
//! Rollback on a mid-serialize error is handled one layer up, by
//! [`crate::encode_into`] recording the buffer length before serializing and
//! truncating back to it on `Err`; every serializer method here just keeps
//! appending, trusting the caller to discard or truncate the buffer if it
//! returns an error (spec.md §4.5 "added": "undo is a length truncation,
//! not a tree edit").

use serde::ser::{
	self, Serialize, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
	SerializeTuple, SerializeTupleStruct, SerializeTupleVariant, Serializer,
};

use crate::{
	error::Error,
	settings::{EncoderSettings, KeyEncodingStrategy},
};

/// Writes JSON text for one value into `out`, applying `settings`'s key and
/// date/data strategies along the way. Holds no buffering state of its own;
/// every container serializer ([`SeqEncoder`], [`MapEncoder`],
/// [`StructEncoder`]) borrows `out` directly and writes through it.
pub struct Encoder<'a> {
	out: &'a mut Vec<u8>,
	settings: &'a EncoderSettings,
}

impl<'a> Encoder<'a> {
	pub(crate) fn new(out: &'a mut Vec<u8>, settings: &'a EncoderSettings) -> Self {
		Self { out, settings }
	}

	fn encode_key(&self, key: &str) -> String {
		match &self.settings.key_strategy {
			KeyEncodingStrategy::UseDefault => key.to_string(),
			KeyEncodingStrategy::ConvertToSnakeCase => crate::settings::camel_to_snake(key),
			KeyEncodingStrategy::Custom(transform) => transform(&[key.to_string()]),
		}
	}

	fn write_key(&mut self, key: &str) {
		let resolved = self.encode_key(key);
		jzon_value::literal::write_escaped_string(self.out, &resolved);
	}
}

impl<'a, 'b> Serializer for &'b mut Encoder<'a> {
	type Ok = ();
	type Error = Error;
	type SerializeSeq = SeqEncoder<'a, 'b>;
	type SerializeTuple = SeqEncoder<'a, 'b>;
	type SerializeTupleStruct = SeqEncoder<'a, 'b>;
	type SerializeTupleVariant = SeqEncoder<'a, 'b>;
	type SerializeMap = MapEncoder<'a, 'b>;
	type SerializeStruct = StructEncoder<'a, 'b>;
	type SerializeStructVariant = StructEncoder<'a, 'b>;

	fn serialize_bool(self, v: bool) -> Result<(), Error> {
		jzon_value::literal::write_bool(self.out, v);
		Ok(())
	}

	fn serialize_i8(self, v: i8) -> Result<(), Error> {
		self.serialize_i64(i64::from(v))
	}
	fn serialize_i16(self, v: i16) -> Result<(), Error> {
		self.serialize_i64(i64::from(v))
	}
	fn serialize_i32(self, v: i32) -> Result<(), Error> {
		self.serialize_i64(i64::from(v))
	}
	fn serialize_i64(self, v: i64) -> Result<(), Error> {
		jzon_value::literal::write_i64(self.out, v);
		Ok(())
	}
	fn serialize_i128(self, v: i128) -> Result<(), Error> {
		let mut buffer = itoa::Buffer::new();
		self.out.extend_from_slice(buffer.format(v).as_bytes());
		Ok(())
	}

	fn serialize_u8(self, v: u8) -> Result<(), Error> {
		self.serialize_u64(u64::from(v))
	}
	fn serialize_u16(self, v: u16) -> Result<(), Error> {
		self.serialize_u64(u64::from(v))
	}
	fn serialize_u32(self, v: u32) -> Result<(), Error> {
		self.serialize_u64(u64::from(v))
	}
	fn serialize_u64(self, v: u64) -> Result<(), Error> {
		let mut buffer = itoa::Buffer::new();
		self.out.extend_from_slice(buffer.format(v).as_bytes());
		Ok(())
	}
	fn serialize_u128(self, v: u128) -> Result<(), Error> {
		let mut buffer = itoa::Buffer::new();
		self.out.extend_from_slice(buffer.format(v).as_bytes());
		Ok(())
	}

	fn serialize_f32(self, v: f32) -> Result<(), Error> {
		let mut buffer = ryu::Buffer::new();
		self.out.extend_from_slice(buffer.format(v).as_bytes());
		Ok(())
	}
	fn serialize_f64(self, v: f64) -> Result<(), Error> {
		jzon_value::literal::write_f64(self.out, v);
		Ok(())
	}

	fn serialize_char(self, v: char) -> Result<(), Error> {
		let mut buf = [0u8; 4];
		self.serialize_str(v.encode_utf8(&mut buf))
	}

	fn serialize_str(self, v: &str) -> Result<(), Error> {
		jzon_value::literal::write_escaped_string(self.out, v);
		Ok(())
	}

	fn serialize_bytes(self, v: &[u8]) -> Result<(), Error> {
		use base64::Engine;
		let text = base64::engine::general_purpose::STANDARD.encode(v);
		jzon_value::literal::write_escaped_string(self.out, &text);
		Ok(())
	}

	fn serialize_none(self) -> Result<(), Error> {
		jzon_value::literal::write_null(self.out);
		Ok(())
	}

	fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), Error> {
		value.serialize(self)
	}

	fn serialize_unit(self) -> Result<(), Error> {
		jzon_value::literal::write_null(self.out);
		Ok(())
	}

	fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Error> {
		self.serialize_unit()
	}

	fn serialize_unit_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
	) -> Result<(), Error> {
		self.serialize_str(variant)
	}

	fn serialize_newtype_struct<T: ?Sized + Serialize>(
		self,
		_name: &'static str,
		value: &T,
	) -> Result<(), Error> {
		value.serialize(self)
	}

	fn serialize_newtype_variant<T: ?Sized + Serialize>(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
	) -> Result<(), Error> {
		self.out.push(b'{');
		self.write_key(variant);
		self.out.push(b':');
		let mut inner = Encoder::new(self.out, self.settings);
		value.serialize(&mut inner)?;
		self.out.push(b'}');
		Ok(())
	}

	fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Error> {
		let rollback = Rollback::new(self.out);
		self.out.push(b'[');
		Ok(SeqEncoder { encoder: self, first: true, rollback })
	}

	fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Error> {
		self.serialize_seq(Some(len))
	}

	fn serialize_tuple_struct(
		self,
		_name: &'static str,
		len: usize,
	) -> Result<Self::SerializeTupleStruct, Error> {
		self.serialize_seq(Some(len))
	}

	fn serialize_tuple_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeTupleVariant, Error> {
		let rollback = Rollback::new(self.out);
		self.out.push(b'{');
		self.write_key(variant);
		self.out.push(b':');
		self.out.push(b'[');
		Ok(SeqEncoder { encoder: self, first: true, rollback })
	}

	fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Error> {
		let rollback = Rollback::new(self.out);
		self.out.push(b'{');
		Ok(MapEncoder { encoder: self, first: true, pending_key: None, rollback })
	}

	fn serialize_struct(
		self,
		_name: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStruct, Error> {
		let rollback = Rollback::new(self.out);
		self.out.push(b'{');
		Ok(StructEncoder { encoder: self, first: true, rollback })
	}

	fn serialize_struct_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStructVariant, Error> {
		let rollback = Rollback::new(self.out);
		self.out.push(b'{');
		self.write_key(variant);
		self.out.push(b':');
		self.out.push(b'{');
		Ok(StructEncoder { encoder: self, first: true, rollback })
	}

	fn is_human_readable(&self) -> bool {
		true
	}
}

/// Marks where a container started writing so an abandoned (never-`end`ed)
/// serializer can erase its own partial output on drop, instead of leaving
/// an unterminated `[`/`{` for a caller to trip over. The lightest version
/// of the "must be consumed" marker-hygiene pattern the rowan parser gets
/// from `drop_bomb`: we only need to truncate a buffer, not panic, so a
/// plain `bool` flag is enough and pulling in `drop_bomb` itself buys
/// nothing.
struct Rollback {
	start: usize,
	committed: bool,
}

impl Rollback {
	fn new(out: &[u8]) -> Self {
		Self { start: out.len(), committed: false }
	}

	fn commit(&mut self) {
		self.committed = true;
	}
}

/// `[...]`, `(...)`, and tuple-struct bodies all write through this: a
/// bare comma-separated element list, no keys.
pub struct SeqEncoder<'a, 'b> {
	encoder: &'b mut Encoder<'a>,
	first: bool,
	rollback: Rollback,
}

impl<'a, 'b> Drop for SeqEncoder<'a, 'b> {
	fn drop(&mut self) {
		if !self.rollback.committed {
			self.encoder.out.truncate(self.rollback.start);
		}
	}
}

impl<'a, 'b> SerializeSeq for SeqEncoder<'a, 'b> {
	type Ok = ();
	type Error = Error;

	fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
		if !self.first {
			self.encoder.out.push(b',');
		}
		self.first = false;
		let mut inner = Encoder::new(self.encoder.out, self.encoder.settings);
		value.serialize(&mut inner)
	}

	fn end(mut self) -> Result<(), Error> {
		self.encoder.out.push(b']');
		self.rollback.commit();
		Ok(())
	}
}

impl<'a, 'b> SerializeTuple for SeqEncoder<'a, 'b> {
	type Ok = ();
	type Error = Error;
	fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
		SerializeSeq::serialize_element(self, value)
	}
	fn end(self) -> Result<(), Error> {
		SerializeSeq::end(self)
	}
}

impl<'a, 'b> SerializeTupleStruct for SeqEncoder<'a, 'b> {
	type Ok = ();
	type Error = Error;
	fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
		SerializeSeq::serialize_element(self, value)
	}
	fn end(self) -> Result<(), Error> {
		SerializeSeq::end(self)
	}
}

impl<'a, 'b> SerializeTupleVariant for SeqEncoder<'a, 'b> {
	type Ok = ();
	type Error = Error;
	fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
		SerializeSeq::serialize_element(self, value)
	}
	fn end(mut self) -> Result<(), Error> {
		self.encoder.out.push(b']');
		self.encoder.out.push(b'}');
		self.rollback.commit();
		Ok(())
	}
}

/// A string serializer used only to resolve non-string map keys (e.g. a
/// `HashMap<i32, V>`) to JSON-object-key text, the same narrowing
/// `serde_json`'s `MapKeySerializer` does — JSON has no non-string key
/// syntax, so anything that isn't a string or a number is rejected.
struct MapKeySerializer;

macro_rules! key_via_display {
	($($method:ident: $ty:ty),+ $(,)?) => {
		$(
			fn $method(self, v: $ty) -> Result<String, Error> {
				Ok(v.to_string())
			}
		)+
	};
}

impl Serializer for MapKeySerializer {
	type Ok = String;
	type Error = Error;
	type SerializeSeq = ser::Impossible<String, Error>;
	type SerializeTuple = ser::Impossible<String, Error>;
	type SerializeTupleStruct = ser::Impossible<String, Error>;
	type SerializeTupleVariant = ser::Impossible<String, Error>;
	type SerializeMap = ser::Impossible<String, Error>;
	type SerializeStruct = ser::Impossible<String, Error>;
	type SerializeStructVariant = ser::Impossible<String, Error>;

	key_via_display!(
		serialize_i8: i8, serialize_i16: i16, serialize_i32: i32, serialize_i64: i64,
		serialize_i128: i128, serialize_u8: u8, serialize_u16: u16, serialize_u32: u32,
		serialize_u64: u64, serialize_u128: u128, serialize_bool: bool,
	);

	fn serialize_str(self, v: &str) -> Result<String, Error> {
		Ok(v.to_string())
	}

	fn serialize_f32(self, _v: f32) -> Result<String, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_f64(self, _v: f64) -> Result<String, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_char(self, v: char) -> Result<String, Error> {
		Ok(v.to_string())
	}
	fn serialize_bytes(self, _v: &[u8]) -> Result<String, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_none(self) -> Result<String, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<String, Error> {
		value.serialize(self)
	}
	fn serialize_unit(self) -> Result<String, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_unit_struct(self, _name: &'static str) -> Result<String, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_unit_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
	) -> Result<String, Error> {
		Ok(variant.to_string())
	}
	fn serialize_newtype_struct<T: ?Sized + Serialize>(
		self,
		_name: &'static str,
		value: &T,
	) -> Result<String, Error> {
		value.serialize(self)
	}
	fn serialize_newtype_variant<T: ?Sized + Serialize>(
		self,
		_name: &'static str,
		_variant_index: u32,
		_variant: &'static str,
		_value: &T,
	) -> Result<String, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_tuple_struct(
		self,
		_name: &'static str,
		_len: usize,
	) -> Result<Self::SerializeTupleStruct, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_tuple_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		_variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeTupleVariant, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_struct(
		self,
		_name: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStruct, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
	fn serialize_struct_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		_variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStructVariant, Error> {
		Err(Error::Custom("map keys must serialize as strings or integers".into()))
	}
}

/// `{...}` bodies for untyped maps (e.g. `HashMap<String, V>`), as opposed
/// to [`StructEncoder`]'s statically-known field names.
pub struct MapEncoder<'a, 'b> {
	encoder: &'b mut Encoder<'a>,
	first: bool,
	pending_key: Option<String>,
	rollback: Rollback,
}

impl<'a, 'b> Drop for MapEncoder<'a, 'b> {
	fn drop(&mut self) {
		if !self.rollback.committed {
			self.encoder.out.truncate(self.rollback.start);
		}
	}
}

impl<'a, 'b> SerializeMap for MapEncoder<'a, 'b> {
	type Ok = ();
	type Error = Error;

	fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Error> {
		let raw = key.serialize(MapKeySerializer)?;
		self.pending_key = Some(self.encoder.encode_key(&raw));
		Ok(())
	}

	fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
		let key = self.pending_key.take().expect("serialize_key called first");
		if !self.first {
			self.encoder.out.push(b',');
		}
		self.first = false;
		jzon_value::literal::write_escaped_string(self.encoder.out, &key);
		self.encoder.out.push(b':');
		let mut inner = Encoder::new(self.encoder.out, self.encoder.settings);
		value.serialize(&mut inner)
	}

	fn end(mut self) -> Result<(), Error> {
		self.encoder.out.push(b'}');
		self.rollback.commit();
		Ok(())
	}
}

/// `{...}` bodies for `#[derive(Serialize)]` structs: field names are
/// `&'static str`s known at the call site, so the key strategy is applied
/// directly without the key-capturing indirection [`MapEncoder`] needs.
pub struct StructEncoder<'a, 'b> {
	encoder: &'b mut Encoder<'a>,
	first: bool,
	rollback: Rollback,
}

impl<'a, 'b> Drop for StructEncoder<'a, 'b> {
	fn drop(&mut self) {
		if !self.rollback.committed {
			self.encoder.out.truncate(self.rollback.start);
		}
	}
}

impl<'a, 'b> SerializeStruct for StructEncoder<'a, 'b> {
	type Ok = ();
	type Error = Error;

	fn serialize_field<T: ?Sized + Serialize>(
		&mut self,
		key: &'static str,
		value: &T,
	) -> Result<(), Error> {
		if !self.first {
			self.encoder.out.push(b',');
		}
		self.first = false;
		self.encoder.write_key(key);
		self.encoder.out.push(b':');
		let mut inner = Encoder::new(self.encoder.out, self.encoder.settings);
		value.serialize(&mut inner)
	}

	fn skip_field(&mut self, _key: &'static str) -> Result<(), Error> {
		Ok(())
	}

	fn end(mut self) -> Result<(), Error> {
		self.encoder.out.push(b'}');
		self.rollback.commit();
		Ok(())
	}
}

impl<'a, 'b> SerializeStructVariant for StructEncoder<'a, 'b> {
	type Ok = ();
	type Error = Error;

	fn serialize_field<T: ?Sized + Serialize>(
		&mut self,
		key: &'static str,
		value: &T,
	) -> Result<(), Error> {
		SerializeStruct::serialize_field(self, key, value)
	}

	fn skip_field(&mut self, key: &'static str) -> Result<(), Error> {
		SerializeStruct::skip_field(self, key)
	}

	fn end(mut self) -> Result<(), Error> {
		self.encoder.out.push(b'}');
		self.encoder.out.push(b'}');
		self.rollback.commit();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::settings::EncoderSettings;

	fn encode<T: Serialize>(value: &T) -> Vec<u8> {
		crate::encode_to_vec(value, &EncoderSettings::default()).unwrap()
	}

	#[test]
	fn encodes_a_struct_in_field_order() {
		#[derive(Serialize)]
		struct Point {
			x: i64,
			y: i64,
		}
		assert_eq!(encode(&Point { x: 1, y: -2 }), br#"{"x":1,"y":-2}"#);
	}

	#[test]
	fn encodes_seq_and_option() {
		assert_eq!(encode(&vec![1i32, 2, 3]), b"[1,2,3]");
		assert_eq!(encode(&None::<i32>), b"null");
		assert_eq!(encode(&Some(5i32)), b"5");
	}

	#[test]
	fn snake_case_key_strategy_converts_field_names() {
		#[derive(Serialize)]
		struct User {
			user_name: String,
		}
		let settings = EncoderSettings {
			key_strategy: KeyEncodingStrategy::ConvertToSnakeCase,
			..EncoderSettings::default()
		};
		let json =
			crate::encode_to_vec(&User { user_name: "x".into() }, &settings).unwrap();
		assert_eq!(json, br#"{"user_name":"x"}"#);
	}

	#[test]
	fn externally_tagged_enum_matches_decode_bridge() {
		#[derive(Serialize)]
		enum Shape {
			Circle { radius: f64 },
			Unit,
		}
		assert_eq!(encode(&Shape::Circle { radius: 1.5 }), br#"{"Circle":{"radius":1.5}}"#);
		assert_eq!(encode(&Shape::Unit), br#""Unit""#);
	}

	#[test]
	fn rollback_erases_a_partially_written_container_on_error() {
		struct Failing;
		impl Serialize for Failing {
			fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
				let mut s = serializer.serialize_struct("Failing", 2)?;
				s.serialize_field("ok", &1i32)?;
				Err(serde::ser::Error::custom("boom"))
			}
		}
		let mut out = b"prefix".to_vec();
		let result = crate::encode_into(&Failing, &mut out, &EncoderSettings::default());
		assert!(result.is_err());
		assert_eq!(out, b"prefix");
	}
}
