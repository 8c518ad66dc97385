//! Settings structs and strategy enums (spec.md §4.4/§4.5/§6): the
//! encoding/decoding bridge's tunable behavior, threaded through every
//! [`crate::decode::Decoder`]/[`crate::encode::Encoder`] rather than global
//! state, so a long-lived decoder can be reused across calls (spec.md §5).

use std::{any::Any, collections::HashMap, sync::Arc};

/// The `userInfo` bag spec.md §6 lists on both settings structs: arbitrary,
/// caller-supplied values threaded through to custom key/date/data strategy
/// closures, the Rust analogue of Swift's `[CodingUserInfoKey: Any]`. Kept
/// as `Arc<dyn Any>` rather than a generic parameter on `DecoderSettings`
/// itself, since the settings structs are shared across arbitrarily many
/// unrelated `T: Deserialize` calls and must not be generic over any one
/// of them.
pub type UserInfo = HashMap<String, Arc<dyn Any + Send + Sync>>;

/// How an object member key is resolved against a Rust field name
/// (spec.md §4.4 "Key decoding" strategy table).
#[derive(Clone)]
pub enum KeyDecodingStrategy {
	/// Compare JSON keys byte-for-byte against the declared field name.
	UseDefault,
	/// A JSON `snake_case` key matches a declared `camelCase` field without
	/// materializing a converted string (spec.md GLOSSARY "snake-case
	/// equality"; exercised by spec.md §8 scenario 3).
	ConvertFromSnakeCase,
	/// Caller-supplied key transform, given the coding path accumulated so
	/// far (outermost first) and returning the JSON key to look up.
	Custom(Arc<dyn Fn(&[String]) -> String + Send + Sync>),
}

impl std::fmt::Debug for KeyDecodingStrategy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::UseDefault => f.write_str("UseDefault"),
			Self::ConvertFromSnakeCase => f.write_str("ConvertFromSnakeCase"),
			Self::Custom(_) => f.write_str("Custom(..)"),
		}
	}
}

impl Default for KeyDecodingStrategy {
	fn default() -> Self {
		Self::UseDefault
	}
}

/// The encoder's mirror of [`KeyDecodingStrategy`] (spec.md §4.5 "Applies
/// key-encoding... strategies symmetrically to the decoder's").
#[derive(Clone)]
pub enum KeyEncodingStrategy {
	UseDefault,
	ConvertToSnakeCase,
	Custom(Arc<dyn Fn(&[String]) -> String + Send + Sync>),
}

impl std::fmt::Debug for KeyEncodingStrategy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::UseDefault => f.write_str("UseDefault"),
			Self::ConvertToSnakeCase => f.write_str("ConvertToSnakeCase"),
			Self::Custom(_) => f.write_str("Custom(..)"),
		}
	}
}

impl Default for KeyEncodingStrategy {
	fn default() -> Self {
		Self::UseDefault
	}
}

/// spec.md §7 "Nil strategy table". Governs `Option<T>` handling at a
/// missing key vs. an explicit JSON `null` (see [`crate::decode::KeyedAccess`]
/// doc comment for how this maps onto serde's automatic `Option` defaulting,
/// which has no exact `decodeNil`/`decodeIfPresent` equivalent).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NilStrategy {
	#[default]
	Default,
	DecodeNilForKeyNotFound,
	TreatNilValuesAsMissing,
}

/// spec.md §4.5 byte-store growth policy.
#[derive(Debug, Clone, Copy)]
pub enum ExpansionPolicy {
	Smallest,
	Small,
	Normal(usize),
	Eager,
}

impl ExpansionPolicy {
	#[must_use]
	pub const fn initial_capacity(self) -> usize {
		match self {
			Self::Smallest => 0,
			Self::Small => 4096,
			Self::Normal(expected) => expected,
			Self::Eager => 8192,
		}
	}
}

impl Default for ExpansionPolicy {
	fn default() -> Self {
		Self::Normal(256)
	}
}

/// Per-decode settings (spec.md §6 "Settings structs ... containing:
/// userInfo map; key strategy; date strategy; data strategy; nil strategy;
/// unicode decode flag").
///
/// spec.md §4.4's date/data strategy fields are deliberately **not** members
/// here: serde gives a `Deserializer` no way to learn "the field I'm about
/// to fill is a Date" ahead of time, so an enum stored on `DecoderSettings`
/// would have nothing to dispatch on and nothing in this crate ever reads
/// it — the dead-field shape the original settings struct had. Date/Data
/// representation is instead selected per field, at the type level, by
/// which `jzon::date` wrapper the caller puts there (`Iso8601`,
/// `SecondsSince1970`, `MillisecondsSince1970`, `Formatted<F>`,
/// `Base64Data`) — see the `jzon::date` module doc comment, which is the
/// actual surface spec.md §4.4's strategy table maps onto here.
#[derive(Clone, Default)]
pub struct DecoderSettings {
	pub user_info: UserInfo,
	pub key_strategy: KeyDecodingStrategy,
	pub nil_strategy: NilStrategy,
	/// `true` replaces an unpaired UTF-16 surrogate half in a `\uXXXX`
	/// escape with U+FFFD instead of rejecting the string (spec.md §6
	/// "unicode decode flag"); see
	/// [`jzon_value::literal::decode_string_with`].
	pub decode_unicode: bool,
}

impl std::fmt::Debug for DecoderSettings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DecoderSettings")
			.field("user_info", &format_args!("{{ {} entries }}", self.user_info.len()))
			.field("key_strategy", &self.key_strategy)
			.field("nil_strategy", &self.nil_strategy)
			.field("decode_unicode", &self.decode_unicode)
			.finish()
	}
}

/// Per-encode settings, the encoder's mirror of [`DecoderSettings`] plus
/// the expansion policy and expected-size hint (spec.md §4.5/§6). See
/// [`DecoderSettings`]'s doc comment for why no `date_strategy`/
/// `data_strategy` field is carried here either.
#[derive(Clone)]
pub struct EncoderSettings {
	pub user_info: UserInfo,
	pub key_strategy: KeyEncodingStrategy,
	pub expansion: ExpansionPolicy,
}

impl std::fmt::Debug for EncoderSettings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EncoderSettings")
			.field("user_info", &format_args!("{{ {} entries }}", self.user_info.len()))
			.field("key_strategy", &self.key_strategy)
			.field("expansion", &self.expansion)
			.finish()
	}
}

impl Default for EncoderSettings {
	fn default() -> Self {
		Self {
			user_info: UserInfo::default(),
			key_strategy: KeyEncodingStrategy::default(),
			expansion: ExpansionPolicy::default(),
		}
	}
}

/// Convert a JSON `snake_case` key to `camelCase`, for untyped targets
/// (`HashMap`s, `jzon_value::Value`) that have no fixed field list to match
/// zero-allocation against via `jzon_description::snake_eq_camel`. Typed
/// structs never hit this path — see [`crate::decode::KeyedAccess::resolve_key`].
#[must_use]
pub fn snake_to_camel(snake: &str) -> String {
	let mut out = String::with_capacity(snake.len());
	let mut upper_next = false;
	for c in snake.chars() {
		if c == '_' {
			upper_next = true;
		} else if upper_next {
			out.extend(c.to_uppercase());
			upper_next = false;
		} else {
			out.push(c);
		}
	}
	out
}

/// Convert a `camelCase` Rust field name to `snake_case` for the encoder's
/// `ConvertToSnakeCase` strategy (spec.md §4.5). The decoder's matching
/// direction never allocates a converted string (see
/// `jzon_description::snake_eq_camel`); the encoder always needs to produce
/// one since it must write real bytes.
#[must_use]
pub fn camel_to_snake(camel: &str) -> String {
	let mut out = String::with_capacity(camel.len() + 4);
	for (i, c) in camel.chars().enumerate() {
		if c.is_ascii_uppercase() {
			if i > 0 {
				out.push('_');
			}
			out.push(c.to_ascii_lowercase());
		} else {
			out.push(c);
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn camel_to_snake_matches_scenario_3_in_reverse() {
		assert_eq!(camel_to_snake("userName"), "user_name");
		assert_eq!(camel_to_snake("id"), "id");
	}

	#[test]
	fn snake_to_camel_round_trips_camel_to_snake() {
		assert_eq!(snake_to_camel("user_name"), "userName");
		assert_eq!(snake_to_camel("id"), "id");
	}

	#[test]
	fn user_info_is_carried_and_debug_does_not_require_any_to_impl_debug() {
		let mut settings = DecoderSettings::default();
		settings.user_info.insert("locale".to_owned(), Arc::new("en_US".to_owned()));
		assert_eq!(settings.user_info.len(), 1);
		assert!(format!("{settings:?}").contains("1 entries"));
	}
}
