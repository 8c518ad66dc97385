//! Writing and reading JSON scalar text directly, with no `serde` in the
//! loop — the facade in `object.rs`/`array.rs` needs to splice literal JSON
//! bytes for `set`/`push` before any `Encoder`/`Decoder` exists to do it
//! for them. The full bridge (escaping rules, numeric fast paths) lives in
//! the root `jzon` crate and reuses the reader half of this module.

use jzon_types::numeric::{parse_float, parse_integer_wide, NarrowInteger};

use crate::error::Error;

/// Escapes exactly the set spec.md §4.5 names: `\`, `"`, `\n`, `\r`, `\t`,
/// `\x08` (backspace), `\x0C` (form feed). Everything else, including
/// non-ASCII UTF-8, passes through unescaped (valid UTF-8 needs no further
/// escaping to stay valid JSON).
pub fn write_escaped_string(out: &mut Vec<u8>, s: &str) {
	out.push(b'"');
	for b in s.bytes() {
		match b {
			b'\\' => out.extend_from_slice(br"\\"),
			b'"' => out.extend_from_slice(br#"\""#),
			b'\n' => out.extend_from_slice(br"\n"),
			b'\r' => out.extend_from_slice(br"\r"),
			b'\t' => out.extend_from_slice(br"\t"),
			0x08 => out.extend_from_slice(br"\b"),
			0x0C => out.extend_from_slice(br"\f"),
			_ => out.push(b),
		}
	}
	out.push(b'"');
}

pub fn write_i64(out: &mut Vec<u8>, value: i64) {
	let mut buffer = itoa::Buffer::new();
	out.extend_from_slice(buffer.format(value).as_bytes());
}

pub fn write_f64(out: &mut Vec<u8>, value: f64) {
	let mut buffer = ryu::Buffer::new();
	out.extend_from_slice(buffer.format(value).as_bytes());
}

pub fn write_bool(out: &mut Vec<u8>, value: bool) {
	out.extend_from_slice(if value { b"true" } else { b"false" });
}

pub fn write_null(out: &mut Vec<u8>) {
	out.extend_from_slice(b"null");
}

/// Decode a string record's raw JSON text (quotes stripped, per
/// `dataBounds`) into an owned `String`, resolving `\uXXXX` and the short
/// escapes. `escaped` comes straight from the description record's tag
/// (`Tag::StringEscaped` vs `Tag::String`) so unescaped spans skip this
/// pass entirely and are copied verbatim.
///
/// `lenient_unicode` governs what happens to a `\uXXXX` escape that is an
/// unpaired UTF-16 surrogate half: `false` rejects the string outright
/// (RFC 8259 §7 strictness), `true` substitutes U+FFFD and keeps going,
/// matching `DecoderSettings::decode_unicode`. Callers outside the
/// settings-aware bridge (the `Object`/`Array` facade, `owned::Value`) have
/// no settings to consult and always decode strictly.
pub fn decode_string(raw: &[u8], escaped: bool) -> Result<String, Error> {
	decode_string_with(raw, escaped, false)
}

/// See [`decode_string`]; this is the settings-aware entry point the
/// decode bridge calls with `DecoderSettings::decode_unicode`.
pub fn decode_string_with(raw: &[u8], escaped: bool, lenient_unicode: bool) -> Result<String, Error> {
	if !escaped {
		return std::str::from_utf8(raw).map(str::to_owned).map_err(|_| Error::InvalidUtf8);
	}
	let mut out = String::with_capacity(raw.len());
	let mut i = 0;
	while i < raw.len() {
		let b = raw[i];
		if b != b'\\' {
			let start = i;
			while i < raw.len() && raw[i] != b'\\' {
				i += 1;
			}
			out.push_str(std::str::from_utf8(&raw[start..i]).map_err(|_| Error::InvalidUtf8)?);
			continue;
		}
		i += 1;
		let escape = *raw.get(i).ok_or(Error::InvalidUtf8)?;
		match escape {
			b'"' => out.push('"'),
			b'\\' => out.push('\\'),
			b'/' => out.push('/'),
			b'n' => out.push('\n'),
			b'r' => out.push('\r'),
			b't' => out.push('\t'),
			b'b' => out.push('\u{8}'),
			b'f' => out.push('\u{c}'),
			b'u' => {
				let quad: [u8; 4] =
					raw.get(i + 1..i + 5).and_then(|s| s.try_into().ok()).ok_or(Error::InvalidUtf8)?;
				let high = jzon_types::bytes::hex_quad(quad).ok_or(Error::InvalidUtf8)?;
				i += 4;
				// Astral-plane characters are written as a UTF-16 surrogate
				// pair across two `\uXXXX` escapes; a high surrogate must be
				// immediately followed by a low surrogate to form one
				// codepoint, per RFC 8259 §7. An unpaired half is either
				// rejected outright or replaced with U+FFFD, depending on
				// `lenient_unicode`.
				let is_low_surrogate_pair_start = raw.get(i + 1) == Some(&b'\\')
					&& raw.get(i + 2) == Some(&b'u')
					&& raw
						.get(i + 3..i + 7)
						.and_then(|s| <[u8; 4]>::try_from(s).ok())
						.and_then(jzon_types::bytes::hex_quad)
						.is_some_and(|low| (0xDC00..=0xDFFF).contains(&low));
				let code = if (0xD800..=0xDBFF).contains(&high) {
					if !is_low_surrogate_pair_start {
						if lenient_unicode {
							out.push('\u{fffd}');
							i += 1;
							continue;
						}
						return Err(Error::InvalidUtf8);
					}
					let low_quad: [u8; 4] = raw[i + 3..i + 7].try_into().unwrap();
					let low = jzon_types::bytes::hex_quad(low_quad).unwrap();
					i += 6;
					0x10000 + (u32::from(high) - 0xD800) * 0x400 + (u32::from(low) - 0xDC00)
				} else if (0xDC00..=0xDFFF).contains(&high) {
					// A lone low surrogate with no preceding high half.
					if lenient_unicode {
						out.push('\u{fffd}');
						i += 1;
						continue;
					}
					return Err(Error::InvalidUtf8);
				} else {
					u32::from(high)
				};
				out.push(char::from_u32(code).ok_or(Error::InvalidUtf8)?);
			}
			_ => return Err(Error::InvalidUtf8),
		}
		i += 1;
	}
	Ok(out)
}

pub fn decode_i64(raw: &[u8]) -> Option<i64> {
	parse_integer_wide(raw).and_then(i64::narrow_from_wide)
}

pub fn decode_f64(raw: &[u8]) -> Option<f64> {
	parse_float(raw)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decode_string_resolves_short_escapes_and_bmp_unicode_escapes() {
		assert_eq!(decode_string(br#"a\"b\né"#, true).unwrap(), "a\"b\né");
	}

	#[test]
	fn decode_string_pairs_utf16_surrogates_into_one_astral_codepoint() {
		// U+1F389 PARTY POPPER encodes as the surrogate pair D83C DF89.
		let escaped = [b'\\', b'u', b'd', b'8', b'3', b'c', b'\\', b'u', b'd', b'f', b'8', b'9'];
		assert_eq!(decode_string(&escaped, true).unwrap(), "\u{1F389}");
	}

	#[test]
	fn decode_string_rejects_unpaired_high_surrogate() {
		assert!(decode_string(br"\ud83c", true).is_err());
		assert!(decode_string(br"\ud83cx", true).is_err());
	}

	#[test]
	fn decode_string_rejects_low_surrogate_not_preceded_by_high() {
		assert!(decode_string(br"\udf89", true).is_err());
	}

	#[test]
	fn decode_string_with_lenient_unicode_substitutes_replacement_character() {
		assert_eq!(
			decode_string_with(br"\ud83c", true, true).unwrap(),
			"\u{fffd}"
		);
		assert_eq!(
			decode_string_with(br"\udf89", true, true).unwrap(),
			"\u{fffd}"
		);
	}
}
