//! Raw little-endian byte access into a description table (spec.md §3, §4.2
//! "the only endianness in the system"). Every read here is bounds-checked;
//! nothing panics on a truncated table, per SPEC_FULL.md's invariant 8.

use jzon_types::Tag;

use crate::error::TableError;

#[inline]
pub fn read_u8(table: &[u8], at: usize) -> Result<u8, TableError> {
	table.get(at).copied().ok_or(TableError::CorruptTable { at })
}

#[inline]
pub fn read_i32(table: &[u8], at: usize) -> Result<i32, TableError> {
	let bytes = table
		.get(at..at + 4)
		.ok_or(TableError::CorruptTable { at })?;
	Ok(i32::from_le_bytes(bytes.try_into().expect("slice of len 4")))
}

#[inline]
pub fn write_u8(table: &mut Vec<u8>, value: u8) {
	table.push(value);
}

#[inline]
pub fn write_i32(table: &mut Vec<u8>, value: i32) {
	table.extend_from_slice(&value.to_le_bytes());
}

#[inline]
pub fn set_u8(table: &mut [u8], at: usize, value: u8) {
	table[at] = value;
}

#[inline]
pub fn set_i32(table: &mut [u8], at: usize, value: i32) {
	table[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline]
pub fn tag_at(table: &[u8], at: usize) -> Result<Tag, TableError> {
	let byte = read_u8(table, at)?;
	Tag::from_u8(byte).ok_or(TableError::CorruptTable { at })
}

/// The record's `jsonOffset` field.
#[inline]
pub fn json_offset_at(table: &[u8], at: usize) -> Result<i32, TableError> {
	read_i32(table, at + 1)
}

/// The record's JSON span length. Bool/null records don't store this (their
/// layout has no `jsonLength` field): the literal's length is implied by
/// its tag (`true`/`null` = 4 bytes, `false` = 5).
#[inline]
pub fn json_length_at(table: &[u8], at: usize) -> Result<i32, TableError> {
	let tag = tag_at(table, at)?;
	Ok(match tag {
		Tag::BoolTrue | Tag::Null => 4,
		Tag::BoolFalse => 5,
		Tag::String
		| Tag::StringEscaped
		| Tag::Integer
		| Tag::Float
		| Tag::Object
		| Tag::Array => read_i32(table, at + 5)?,
	})
}

/// Only valid for `Object`/`Array` records.
#[inline]
pub fn member_count_at(table: &[u8], at: usize) -> Result<i32, TableError> {
	read_i32(table, at + 9)
}

/// Only valid for `Object`/`Array` records.
#[inline]
pub fn children_total_index_length_at(table: &[u8], at: usize) -> Result<i32, TableError> {
	read_i32(table, at + 13)
}

/// `indexLength(tag)` (spec.md §4.2): the number of description-table bytes
/// this record and, for containers, all of its descendants occupy. O(1)
/// for every tag because containers store their own descendant byte total.
#[inline]
pub fn index_length_at(table: &[u8], at: usize) -> Result<usize, TableError> {
	let tag = tag_at(table, at)?;
	Ok(if tag.is_container() {
		17 + children_total_index_length_at(table, at)? as usize
	} else {
		tag.header_len()
	})
}

/// Advance `offset` by `indexLength(offset)`, landing on the next sibling
/// record or the end of the enclosing container.
#[inline]
pub fn skip_index(table: &[u8], offset: &mut usize) -> Result<(), TableError> {
	*offset += index_length_at(table, *offset)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_i32() {
		let mut table = Vec::new();
		write_i32(&mut table, -12345);
		assert_eq!(read_i32(&table, 0), Ok(-12345));
	}

	#[test]
	fn truncated_read_is_corrupt_not_panic() {
		let table = vec![Tag::Null.as_u8()];
		assert_eq!(json_offset_at(&table, 0), Err(TableError::CorruptTable { at: 1 }));
	}
}
