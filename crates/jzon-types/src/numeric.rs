//! Allocation-free numeric conversion for description records already known
//! (by the tokenizer) to be grammatically valid JSON numbers.
//!
//! spec.md §4.4 calls for "a tight digit loop (no allocation)" for integers
//! and "a two-pass lightweight strtod" for floats. The first pass of the
//! float path is the tokenizer's own grammar validation (spec.md §4.1); the
//! second pass here is the actual digit-to-`f64` conversion, which we hand
//! to `str::parse`, Rust's own correctly-rounded float parser, rather than
//! reimplement a worse one.

use crate::ValType;

/// Parse a validated JSON integer span (optional leading `-`, then ASCII
/// digits, no other bytes) into an `i128`, wide enough to hold every value
/// up to one past `u64::MAX` so narrowing to any fixed-width target can be
/// checked uniformly afterwards.
///
/// Returns `None` only on overflow past `i128`'s own range, which no valid
/// JSON document produced by a sane encoder will ever reach; callers still
/// treat `None` as a conversion failure rather than panicking.
#[must_use]
pub fn parse_integer_wide(span: &[u8]) -> Option<i128> {
	let (negative, digits) = match span.split_first() {
		Some((b'-', rest)) => (true, rest),
		_ => (false, span),
	};
	if digits.is_empty() {
		return None;
	}
	let mut acc: i128 = 0;
	for &b in digits {
		let digit = i128::from(b.checked_sub(b'0')?);
		if digit > 9 {
			return None;
		}
		acc = acc.checked_mul(10)?.checked_add(digit)?;
	}
	Some(if negative { -acc } else { acc })
}

/// Narrow a wide integer into a fixed-width target, used by the decoding
/// bridge for every `decode::<iN/uN>` call (spec.md §8 "Integer width"
/// property: exactly `[W::MIN, W::MAX]` is accepted).
pub trait NarrowInteger: Sized {
	fn narrow_from_wide(wide: i128) -> Option<Self>;
	const VAL_TYPE: ValType = ValType::Integer;
}

macro_rules! impl_narrow_integer {
	($($ty:ty),+ $(,)?) => {
		$(
			impl NarrowInteger for $ty {
				fn narrow_from_wide(wide: i128) -> Option<Self> {
					<$ty>::try_from(wide).ok()
				}
			}
		)+
	};
}
impl_narrow_integer!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, isize, usize);

/// Parse a validated JSON float span into an `f64`.
#[must_use]
pub fn parse_float(span: &[u8]) -> Option<f64> {
	std::str::from_utf8(span).ok()?.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_plain_integers() {
		assert_eq!(parse_integer_wide(b"42"), Some(42));
		assert_eq!(parse_integer_wide(b"-1"), Some(-1));
		assert_eq!(parse_integer_wide(b"0"), Some(0));
	}

	#[test]
	fn one_past_i64_max_is_representable_in_wide_but_not_i64() {
		let wide = parse_integer_wide(b"9223372036854775808").expect("fits in i128");
		assert_eq!(wide, i128::from(i64::MAX) + 1);
		assert!(i64::narrow_from_wide(wide).is_none());
	}

	#[test]
	fn narrowing_rejects_out_of_range() {
		assert!(u8::narrow_from_wide(256).is_none());
		assert_eq!(u8::narrow_from_wide(255), Some(255u8));
		assert!(i8::narrow_from_wide(-129).is_none());
	}

	#[test]
	fn float_parses_exponents_and_fractions() {
		assert_eq!(parse_float(b"2.5"), Some(2.5));
		assert_eq!(parse_float(b"-1e3"), Some(-1000.0));
	}
}
