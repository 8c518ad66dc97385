//! The decoding bridge (spec.md §4.4): a schema-driven walk over a
//! description table, implemented as `impl serde::Deserializer<'de> for &mut
//! Decoder` with companion `MapAccess`/`SeqAccess` impls for keyed/unkeyed
//! containers — serde's `Deserializer` trait *is* the "keyed / unkeyed /
//! single-value container" protocol spec.md §6 calls out as an external
//! collaborator, so no bespoke protocol is invented (SPEC_FULL.md §4.4).
//!
//! `Decoder` never borrows `'de` directly: every string is materialized as
//! an owned `String` rather than returned as a zero-copy `&'de str` slice.
//! The zero-copy guarantee spec.md §3 invariant 6 promises for unescaped
//! strings is honored one layer down, in
//! `jzon_value::literal::decode_string_with` and the `Object`/`Array`
//! facade, which *do* return borrowed slices where
//! possible; the serde bridge trades that away for a simpler, single
//! lifetime parameter, which is recorded as an Open Question resolution in
//! DESIGN.md.

use jzon_description::DescriptionView;
use jzon_types::{
	numeric::{parse_float, parse_integer_wide, NarrowInteger},
	Tag,
};
use serde::de::{
	self, DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
	VariantAccess, Visitor,
};

use crate::{
	error::Error,
	settings::{snake_to_camel, DecoderSettings, KeyDecodingStrategy, NilStrategy},
};

/// A non-owning cursor into a `(JSON buffer, description table)` pair,
/// rooted at one record offset (spec.md §4.4: "0 for the top-level decoder;
/// child offset for sub-decoders"). Cheap to copy-construct for every
/// recursive descent — see the module doc comment for why this never tries
/// to borrow `'de`.
#[derive(Clone, Copy)]
pub struct Decoder<'x> {
	json: &'x [u8],
	table: &'x [u8],
	at: usize,
	settings: &'x DecoderSettings,
}

impl<'x> Decoder<'x> {
	pub(crate) fn new(json: &'x [u8], table: &'x [u8], settings: &'x DecoderSettings) -> Self {
		Self { json, table, at: 0, settings }
	}

	fn child(&self, at: usize) -> Self {
		Self { at, ..*self }
	}

	fn view(&self) -> DescriptionView<'x> {
		DescriptionView::at_offset(self.table, self.at)
	}

	fn err(&self, expected: &'static str) -> Error {
		Error::DecodingError { expected, key_path: String::new() }
	}

	fn require_integer(&self) -> Result<i128, Error> {
		let view = self.view();
		if view.tag()? != Tag::Integer {
			return Err(self.err("integer"));
		}
		let (s, e) = view.data_bounds()?;
		parse_integer_wide(&self.json[s..e]).ok_or_else(|| self.err("integer"))
	}

	fn require_float(&self) -> Result<f64, Error> {
		let view = self.view();
		let (s, e) = view.data_bounds()?;
		match view.tag()? {
			Tag::Integer => {
				let wide = parse_integer_wide(&self.json[s..e]).ok_or_else(|| self.err("number"))?;
				Ok(wide as f64)
			}
			Tag::Float => parse_float(&self.json[s..e]).ok_or_else(|| self.err("number")),
			_ => Err(self.err("number")),
		}
	}

	fn require_string(&self) -> Result<String, Error> {
		let view = self.view();
		let escaped = match view.tag()? {
			Tag::String => false,
			Tag::StringEscaped => true,
			_ => return Err(self.err("string")),
		};
		let (s, e) = view.data_bounds()?;
		Ok(jzon_value::literal::decode_string_with(
			&self.json[s..e],
			escaped,
			self.settings.decode_unicode,
		)?)
	}
}

macro_rules! impl_deserialize_int {
	($deserialize_method:ident, $visit_method:ident, $ty:ty) => {
		fn $deserialize_method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
			let wide = self.require_integer()?;
			let narrowed = <$ty as NarrowInteger>::narrow_from_wide(wide).ok_or_else(|| {
				Error::TypeConversion { value: wide.to_string(), to: stringify!($ty) }
			})?;
			visitor.$visit_method(narrowed)
		}
	};
}

impl<'a, 'de, 'x> Deserializer<'de> for &'a mut Decoder<'x> {
	type Error = Error;

	fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		let view = self.view();
		match view.tag()? {
			Tag::Null => visitor.visit_unit(),
			Tag::BoolTrue => visitor.visit_bool(true),
			Tag::BoolFalse => visitor.visit_bool(false),
			Tag::Integer => {
				let wide = self.require_integer()?;
				match i64::narrow_from_wide(wide) {
					Some(n) => visitor.visit_i64(n),
					None => visitor.visit_f64(wide as f64),
				}
			}
			Tag::Float => visitor.visit_f64(self.require_float()?),
			Tag::String | Tag::StringEscaped => visitor.visit_string(self.require_string()?),
			Tag::Array => {
				let elements = view.array_elements()?;
				visitor.visit_seq(UnkeyedAccess::new(*self, elements))
			}
			Tag::Object => {
				let members = view.object_members()?;
				visitor.visit_map(KeyedAccess::new(*self, members, None))
			}
		}
	}

	fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		match self.view().tag()? {
			Tag::BoolTrue => visitor.visit_bool(true),
			Tag::BoolFalse => visitor.visit_bool(false),
			_ => Err(self.err("bool")),
		}
	}

	impl_deserialize_int!(deserialize_i8, visit_i8, i8);
	impl_deserialize_int!(deserialize_i16, visit_i16, i16);
	impl_deserialize_int!(deserialize_i32, visit_i32, i32);
	impl_deserialize_int!(deserialize_i64, visit_i64, i64);
	impl_deserialize_int!(deserialize_i128, visit_i128, i128);
	impl_deserialize_int!(deserialize_u8, visit_u8, u8);
	impl_deserialize_int!(deserialize_u16, visit_u16, u16);
	impl_deserialize_int!(deserialize_u32, visit_u32, u32);
	impl_deserialize_int!(deserialize_u64, visit_u64, u64);
	impl_deserialize_int!(deserialize_u128, visit_u128, u128);

	fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		#[allow(clippy::cast_possible_truncation)]
		visitor.visit_f32(self.require_float()? as f32)
	}

	fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		visitor.visit_f64(self.require_float()?)
	}

	fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		let s = self.require_string()?;
		let mut chars = s.chars();
		match (chars.next(), chars.next()) {
			(Some(c), None) => visitor.visit_char(c),
			_ => Err(self.err("char")),
		}
	}

	fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		visitor.visit_string(self.require_string()?)
	}

	fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		visitor.visit_string(self.require_string()?)
	}

	fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		let view = self.view();
		match view.tag()? {
			Tag::String | Tag::StringEscaped => {
				let text = self.require_string()?;
				let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, text)
					.map_err(|e| Error::InvalidData(e.to_string()))?;
				visitor.visit_byte_buf(bytes)
			}
			Tag::Array => {
				let mut out = Vec::new();
				for offset in view.array_elements()? {
					let child = self.child(offset);
					let wide = child.require_integer()?;
					out.push(u8::narrow_from_wide(wide).ok_or_else(|| self.err("byte"))?);
				}
				visitor.visit_byte_buf(out)
			}
			_ => Err(self.err("bytes")),
		}
	}

	fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		self.deserialize_bytes(visitor)
	}

	fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		match self.view().tag()? {
			Tag::Null => visitor.visit_none(),
			_ => visitor.visit_some(self),
		}
	}

	fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		match self.view().tag()? {
			Tag::Null => visitor.visit_unit(),
			_ => Err(self.err("null")),
		}
	}

	fn deserialize_unit_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		visitor: V,
	) -> Result<V::Value, Error> {
		self.deserialize_unit(visitor)
	}

	fn deserialize_newtype_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		visitor: V,
	) -> Result<V::Value, Error> {
		visitor.visit_newtype_struct(self)
	}

	fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		let view = self.view();
		view.require_array()?;
		let elements = view.array_elements()?;
		visitor.visit_seq(UnkeyedAccess::new(*self, elements))
	}

	fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
		self.deserialize_seq(visitor)
	}

	fn deserialize_tuple_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		_len: usize,
		visitor: V,
	) -> Result<V::Value, Error> {
		self.deserialize_seq(visitor)
	}

	fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		let view = self.view();
		view.require_object()?;
		let members = view.object_members()?;
		visitor.visit_map(KeyedAccess::new(*self, members, None))
	}

	fn deserialize_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		fields: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, Error> {
		let view = self.view();
		view.require_object()?;
		let members = view.object_members()?;
		visitor.visit_map(KeyedAccess::new(*self, members, Some(fields)))
	}

	fn deserialize_enum<V: Visitor<'de>>(
		self,
		_name: &'static str,
		_variants: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, Error> {
		let view = self.view();
		match view.tag()? {
			Tag::String | Tag::StringEscaped => {
				let variant = self.require_string()?;
				visitor.visit_enum(variant.into_deserializer())
			}
			Tag::Object => {
				let members = view.object_members()?;
				if members.len() != 1 {
					return Err(self.err("externally-tagged enum (exactly one key)"));
				}
				let (key_offset, value_offset) = members[0];
				let variant = self.child(key_offset).require_string()?;
				visitor.visit_enum(ObjectEnumAccess { decoder: *self, variant, value_offset })
			}
			_ => Err(self.err("enum")),
		}
	}

	fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		self.deserialize_str(visitor)
	}

	fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		self.deserialize_any(visitor)
	}
}

/// A keyed container (spec.md §4.4 "Keyed container"). Materializes the
/// object's `(keyOffset, valueOffset)` pairs once up front via
/// `object_members()` — the member-cache optimization spec.md §4.2
/// describes, just realized as a plain precomputed vector rather than a
/// mutable mutable-on-the-decoder cache, since `Decoder` itself never needs
/// `&mut` state in this design (see module doc comment).
pub struct KeyedAccess<'x> {
	decoder: Decoder<'x>,
	members: Vec<(usize, usize)>,
	cursor: usize,
	fields: Option<&'static [&'static str]>,
	pending_value_offset: Option<usize>,
}

impl<'x> KeyedAccess<'x> {
	fn new(
		decoder: Decoder<'x>,
		members: Vec<(usize, usize)>,
		fields: Option<&'static [&'static str]>,
	) -> Self {
		Self { decoder, members, cursor: 0, fields, pending_value_offset: None }
	}

	/// Resolve the raw JSON key at `key_offset` to the name `seed`'s
	/// generated `Field` visitor should compare against, applying the key
	/// decoding strategy (spec.md §4.4 strategy dispatch table).
	fn resolve_key(&self, key_offset: usize) -> Result<String, Error> {
		let key_view = self.decoder.child(key_offset).view();
		let escaped = key_view.tag()? == Tag::StringEscaped;
		let (s, e) = key_view.data_bounds()?;
		let raw = &self.decoder.json()[s..e];
		let lenient_unicode = self.decoder.settings.decode_unicode;
		match &self.decoder.settings.key_strategy {
			KeyDecodingStrategy::UseDefault => {
				Ok(jzon_value::literal::decode_string_with(raw, escaped, lenient_unicode)?)
			}
			KeyDecodingStrategy::ConvertFromSnakeCase => {
				// Zero-allocation match against the declared struct fields when
				// they're known (spec.md §4.4: "no allocation is needed per
				// key"); otherwise fall back to an allocating conversion for
				// untyped maps, which have no fixed field list to match against.
				if let Some(fields) = self.fields {
					if let Some(&matched) =
						fields.iter().find(|f| jzon_description::snake_eq_camel(raw, f))
					{
						return Ok(matched.to_string());
					}
				}
				Ok(snake_to_camel(&jzon_value::literal::decode_string_with(
					raw,
					escaped,
					lenient_unicode,
				)?))
			}
			KeyDecodingStrategy::Custom(transform) => Ok(transform(&[
				jzon_value::literal::decode_string_with(raw, escaped, lenient_unicode)?,
			])),
		}
	}
}

impl<'x> Decoder<'x> {
	fn json(&self) -> &'x [u8] {
		self.json
	}
}

impl<'de, 'x> MapAccess<'de> for KeyedAccess<'x> {
	type Error = Error;

	fn next_key_seed<K: DeserializeSeed<'de>>(
		&mut self,
		seed: K,
	) -> Result<Option<K::Value>, Error> {
		loop {
			let Some(&(key_offset, value_offset)) = self.members.get(self.cursor) else {
				return Ok(None);
			};
			self.cursor += 1;

			if self.decoder.settings.nil_strategy == NilStrategy::TreatNilValuesAsMissing {
				let value_view = self.decoder.child(value_offset).view();
				if value_view.tag()? == Tag::Null {
					continue;
				}
			}

			let key = self.resolve_key(key_offset)?;
			self.pending_value_offset = Some(value_offset);
			return seed.deserialize(key.into_deserializer()).map(Some);
		}
	}

	fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Error> {
		let offset = self.pending_value_offset.take().expect("next_key_seed called first");
		let mut child = self.decoder.child(offset);
		seed.deserialize(&mut child)
	}

	fn size_hint(&self) -> Option<usize> {
		Some(self.members.len().saturating_sub(self.cursor))
	}
}

/// An unkeyed container (spec.md §4.4 "Unkeyed container"): a cursor over
/// the array's element offsets, advancing one per read.
pub struct UnkeyedAccess<'x> {
	decoder: Decoder<'x>,
	elements: Vec<usize>,
	cursor: usize,
}

impl<'x> UnkeyedAccess<'x> {
	fn new(decoder: Decoder<'x>, elements: Vec<usize>) -> Self {
		Self { decoder, elements, cursor: 0 }
	}
}

impl<'de, 'x> SeqAccess<'de> for UnkeyedAccess<'x> {
	type Error = Error;

	fn next_element_seed<T: DeserializeSeed<'de>>(
		&mut self,
		seed: T,
	) -> Result<Option<T::Value>, Error> {
		let Some(&offset) = self.elements.get(self.cursor) else {
			return Ok(None);
		};
		self.cursor += 1;
		let mut child = self.decoder.child(offset);
		seed.deserialize(&mut child).map(Some)
	}

	fn size_hint(&self) -> Option<usize> {
		Some(self.elements.len().saturating_sub(self.cursor))
	}
}

/// Externally-tagged enum support (`{"Variant": content}`), the standard
/// serde representation for enums with data — spec.md's source host
/// language represents `Codable` enums the same way via a single-key
/// object.
struct ObjectEnumAccess<'x> {
	decoder: Decoder<'x>,
	variant: String,
	value_offset: usize,
}

impl<'de, 'x> EnumAccess<'de> for ObjectEnumAccess<'x> {
	type Error = Error;
	type Variant = Self;

	fn variant_seed<V: DeserializeSeed<'de>>(
		self,
		seed: V,
	) -> Result<(V::Value, Self::Variant), Error> {
		let variant = self.variant.clone();
		let value = seed.deserialize(variant.into_deserializer())?;
		Ok((value, self))
	}
}

impl<'de, 'x> VariantAccess<'de> for ObjectEnumAccess<'x> {
	type Error = Error;

	fn unit_variant(self) -> Result<(), Error> {
		let view = self.decoder.child(self.value_offset).view();
		if view.tag()? == Tag::Null {
			Ok(())
		} else {
			Err(Error::DecodingError { expected: "null", key_path: self.variant })
		}
	}

	fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, Error> {
		let mut child = self.decoder.child(self.value_offset);
		seed.deserialize(&mut child)
	}

	fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
		let mut child = self.decoder.child(self.value_offset);
		de::Deserializer::deserialize_seq(&mut child, visitor)
	}

	fn struct_variant<V: Visitor<'de>>(
		self,
		fields: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, Error> {
		let mut child = self.decoder.child(self.value_offset);
		de::Deserializer::deserialize_struct(&mut child, "", fields, visitor)
	}
}
