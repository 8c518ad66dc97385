//! In-place mutation of a `(JSON buffer, description table)` pair: replacing
//! a value's JSON text and sub-table, removing an object member, and
//! rebasing a freshly-built sub-table onto a host table's coordinates
//! (spec.md §4.2 "Mutation", §9 "grafting").
//!
//! Every edit touches three things in lockstep: the JSON byte buffer, the
//! edited subtree's table bytes, and every `jsonOffset`/`jsonLength`/
//! `childrenTotalIndexLength` field elsewhere in the table that the edit
//! invalidates. There is no parent pointer to walk upward with (description
//! records only ever point at their children, never their parent — see
//! `DescriptionView`'s doc comment), so ancestor bookkeeping is done with a
//! single top-down pass that rediscovers the path to the edited node.

use jzon_types::Tag;

use crate::{
	error::TableError,
	record::{member_count_at, read_i32, set_i32, skip_index, tag_at},
	table::DescriptionTable,
};

/// Replace `json[old_start..old_end)` with `new_bytes`, using
/// [`<[T]>::copy_within`][copy_within]-backed moves rather than a raw
/// `memmove` call. The destination for the tail shift is always
/// `old_end + (new_bytes.len() as isize - (old_end - old_start) as isize)`
/// — the same formula a C implementation must get right by hand, and the
/// one spot a naive port of this library got backwards before settling on
/// `Vec::splice` here.
///
/// [copy_within]: slice::copy_within
fn splice_json(json: &mut Vec<u8>, old_start: usize, old_end: usize, new_bytes: &[u8]) {
	json.splice(old_start..old_end, new_bytes.iter().copied());
}

/// Add `delta` to every `jsonOffset` at or after `cutoff`, and grow or
/// shrink the `jsonLength` of every container whose span straddles
/// `cutoff`, restricted to the record range `span` (spec.md §9's rebase
/// pass after an edit). Description records are stored depth-first, parent
/// header immediately followed by its children, so a single linear scan
/// over `span` in storage order visits every record in the same order a
/// recursive pre-order walk would — no recursion needed.
///
/// `span` matters when a just-grafted subtree already sits at its final
/// coordinates (see [`rewrite`]): that subtree must be excluded from the
/// scan, or this would shift/grow its already-correct offsets a second
/// time.
fn advance_offsets_in_span(
	table: &mut [u8],
	span: std::ops::Range<usize>,
	cutoff: i32,
	delta: i32,
) -> Result<(), TableError> {
	let mut at = span.start;
	while at < span.end {
		let tag = tag_at(table, at)?;
		let json_offset = read_i32(table, at + 1)?;
		if json_offset >= cutoff {
			set_i32(table, at + 1, json_offset + delta);
		} else if matches!(
			tag,
			Tag::String | Tag::StringEscaped | Tag::Integer | Tag::Float | Tag::Object | Tag::Array
		) {
			let json_length = read_i32(table, at + 5)?;
			if json_offset + json_length >= cutoff {
				set_i32(table, at + 5, json_length + delta);
			}
		}
		at += tag.header_len();
	}
	Ok(())
}

/// [`advance_offsets_in_span`] over the whole table — the common case for
/// every caller except [`rewrite`], which must exclude the grafted span.
fn advance_offsets_from(table: &mut [u8], cutoff: i32, delta: i32) -> Result<(), TableError> {
	advance_offsets_in_span(table, 0..table.len(), cutoff, delta)
}

/// Rebase every `jsonOffset` in a standalone sub-table by a constant
/// `delta`, in place, before splicing it into a host table at a new JSON
/// position (spec.md §9 "grafting": "adding a constant to every jsonOffset
/// in a nested description so it fits a new host position"). Lengths and
/// member counts are untouched — only absolute offsets move.
pub fn rebase(table_bytes: &mut [u8], delta: i32) -> Result<(), TableError> {
	let mut at = 0usize;
	while at < table_bytes.len() {
		let tag = tag_at(table_bytes, at)?;
		let json_offset = read_i32(table_bytes, at + 1)?;
		set_i32(table_bytes, at + 1, json_offset + delta);
		at += tag.header_len();
	}
	Ok(())
}

/// Offsets of every container that contains `target`, root-first, followed
/// by `target` itself if `target` is a container. Used to patch
/// `childrenTotalIndexLength` fields, which (unlike `jsonLength`) are not
/// recovered by [`advance_offsets_from`]'s linear scan because a removed
/// subtree's byte count doesn't correspond to any single `jsonOffset`
/// comparison.
fn ancestor_chain(table: &[u8], target: usize) -> Result<Vec<usize>, TableError> {
	fn visit(
		table: &[u8],
		at: usize,
		target: usize,
		stack: &mut Vec<usize>,
	) -> Result<bool, TableError> {
		if at == target {
			if tag_at(table, at)?.is_container() {
				stack.push(at);
			}
			return Ok(true);
		}
		let tag = tag_at(table, at)?;
		if !tag.is_container() {
			return Ok(false);
		}
		stack.push(at);
		let member_count = member_count_at(table, at)?;
		let mut cursor = at + 17;
		for _ in 0..member_count {
			// Object members are two records (key, then value); array
			// members are one. Either way, walking record-by-record with
			// skip_index between them covers both shapes uniformly.
			if visit(table, cursor, target, stack)? {
				return Ok(true);
			}
			skip_index(table, &mut cursor)?;
			if tag == Tag::Object {
				if visit(table, cursor, target, stack)? {
					return Ok(true);
				}
				skip_index(table, &mut cursor)?;
			}
		}
		stack.pop();
		Ok(false)
	}
	let mut stack = Vec::new();
	visit(table, 0, target, &mut stack)?;
	Ok(stack)
}

fn shrink_children_total_index_length(
	table: &mut [u8],
	offsets: &[usize],
	removed_bytes: i32,
) -> Result<(), TableError> {
	for &offset in offsets {
		let current = read_i32(table, offset + 13)?;
		set_i32(table, offset + 13, current - removed_bytes);
	}
	Ok(())
}

/// Replace the record at `at` — scalar or container — with `new_json`
/// (encoded as the host's JSON text, e.g. by `jzon-value`'s encoder) and
/// its matching pre-built `new_table` (a standalone table built by
/// [`DescriptionTable::build`] over `new_json`). `new_table`'s own
/// `jsonOffset`s are rebased automatically so the grafted subtree lines up
/// with wherever `at` lands in the rewritten JSON buffer — which may
/// differ from the replaced record's old position, since `new_json` need
/// not be the same length as the text it replaces.
///
/// This is the single primitive `jzon-value`'s `updateValue` and array
/// `append` build on: both are "splice in a fresh value and fix up
/// everything downstream of it."
pub fn rewrite(
	json: &mut Vec<u8>,
	table: &mut DescriptionTable,
	at: usize,
	new_json: &[u8],
	new_table: &DescriptionTable,
) -> Result<(), TableError> {
	let view = table.view_at(at);
	let (old_json_start, old_json_end) = view.json_bounds()?;
	let old_table_end = at + view.index_length()?;

	let graft_delta = old_json_start as i32 - new_table.root().json_offset()? as i32;
	let mut new_table_bytes = new_table.as_bytes().to_vec();
	rebase(&mut new_table_bytes, graft_delta)?;

	let json_delta = new_json.len() as i32 - (old_json_end - old_json_start) as i32;
	splice_json(json, old_json_start, old_json_end, new_json);

	let removed_bytes = (old_table_end - at) as i32;
	let added_bytes = new_table_bytes.len() as i32;
	let ancestors = ancestor_chain(table.as_bytes(), at)?;

	let table_bytes = table.bytes_mut();
	table_bytes.splice(at..old_table_end, new_table_bytes.iter().copied());
	shrink_children_total_index_length(table_bytes, &ancestors, removed_bytes - added_bytes)?;

	// The grafted span `[at, grafted_end)` already sits at its final,
	// correctly-rebased coordinates — it must not be revisited by the scan
	// below, or an ancestor/later-sibling fixup would be re-applied to it
	// (e.g. replacing `1` with `999` would grow the freshly-written `999`
	// record's own jsonLength a second time). Scan the untouched prefix and
	// suffix around it instead of the whole table.
	let grafted_end = at + added_bytes as usize;
	advance_offsets_in_span(table_bytes, 0..at, old_json_end as i32, json_delta)?;
	advance_offsets_in_span(
		table_bytes,
		grafted_end..table_bytes.len(),
		old_json_end as i32,
		json_delta,
	)?;

	Ok(())
}

/// Remove `key`'s member from the object at `object_at`, deleting both its
/// JSON text (including the separating colon and one adjoining comma) and
/// its table records, and fixing up every downstream offset. Returns
/// `Ok(false)` if the object has no such member.
pub fn remove_object_member(
	json: &mut Vec<u8>,
	table: &mut DescriptionTable,
	object_at: usize,
	key: &str,
	snake_case: bool,
) -> Result<bool, TableError> {
	let json_snapshot = json.clone();
	let Some((key_offset, value_offset)) =
		table.view_at(object_at).key_value_offset(&json_snapshot, key, snake_case)?
	else {
		return Ok(false);
	};

	let key_view = table.view_at(key_offset);
	let value_view = table.view_at(value_offset);
	let (key_start, _) = key_view.json_bounds()?;
	let (_, value_end) = value_view.json_bounds()?;

	let (json_start, json_end) = widen_to_separator(&json_snapshot, key_start, value_end);
	let removed_json_len = (json_end - json_start) as i32;
	splice_json(json, json_start, json_end, &[]);

	let value_table_end = value_offset + value_view.index_length()?;
	let removed_table_len = (value_table_end - key_offset) as i32;
	let ancestors = ancestor_chain(table.as_bytes(), object_at)?;

	let table_bytes = table.bytes_mut();
	table_bytes.splice(key_offset..value_table_end, std::iter::empty());

	let member_count = member_count_at(table_bytes, object_at)?;
	set_i32(table_bytes, object_at + 9, member_count - 1);
	shrink_children_total_index_length(table_bytes, &ancestors, removed_table_len)?;
	advance_offsets_from(table_bytes, json_start as i32, -removed_json_len)?;

	Ok(true)
}

/// Append a new `(key, value)` member to the object at `object_at`, writing
/// `key_json` (an already-quoted, already-escaped JSON string literal,
/// built by the caller's string escaper) then `:` then `value_json` just
/// before the object's closing `}`, preceded by a comma when the object
/// already has members (spec.md §4.3 "Write path — new key"). `value_table`
/// must be a standalone table built over exactly `value_json`, rooted at
/// JSON offset 0 (as every `jzon-value` facade value is once sliced or
/// freshly constructed) — the same precondition [`rewrite`] places on its
/// own `new_table` argument.
pub fn append_object_member(
	json: &mut Vec<u8>,
	table: &mut DescriptionTable,
	object_at: usize,
	key_json: &[u8],
	value_json: &[u8],
	value_table: &DescriptionTable,
) -> Result<(), TableError> {
	let view = table.view_at(object_at);
	view.require_object()?;
	let (_, obj_end) = view.json_bounds()?;
	let member_count = view.member_count()?;
	let old_children_len = view.children_total_index_length()?;
	let insert_json_at = obj_end - 1;

	let mut member_text = Vec::with_capacity(key_json.len() + value_json.len() + 2);
	if member_count > 0 {
		member_text.push(b',');
	}
	member_text.extend_from_slice(key_json);
	member_text.push(b':');
	member_text.extend_from_slice(value_json);
	let comma_len = i32::from(member_count > 0);

	let (key_table, _) = DescriptionTable::build(key_json)
		.map_err(|_| TableError::CorruptTable { at: object_at })?;
	let mut key_table_bytes = key_table.as_bytes().to_vec();
	let key_delta = insert_json_at as i32 + comma_len - key_table.root().json_offset()? as i32;
	rebase(&mut key_table_bytes, key_delta)?;

	let mut value_table_bytes = value_table.as_bytes().to_vec();
	let value_json_at = insert_json_at as i32 + comma_len + key_json.len() as i32 + 1;
	let value_delta = value_json_at - value_table.root().json_offset()? as i32;
	rebase(&mut value_table_bytes, value_delta)?;

	let mut member_table_bytes = key_table_bytes;
	member_table_bytes.extend_from_slice(&value_table_bytes);

	let ancestors = ancestor_chain(table.as_bytes(), object_at)?;
	let json_delta = member_text.len() as i32;

	json.splice(insert_json_at..insert_json_at, member_text.iter().copied());

	let table_bytes = table.bytes_mut();
	advance_offsets_from(table_bytes, insert_json_at as i32, json_delta)?;
	shrink_children_total_index_length(
		table_bytes,
		&ancestors,
		-(member_table_bytes.len() as i32),
	)?;
	set_i32(table_bytes, object_at + 9, member_count as i32 + 1);

	let table_insert_at = object_at + 17 + old_children_len;
	table_bytes.splice(table_insert_at..table_insert_at, member_table_bytes.iter().copied());

	Ok(())
}

/// Append a new element to the array at `array_at`, writing `value_json`
/// just before the array's closing `]`, preceded by a comma when the array
/// already has elements. Same `value_table` precondition as
/// [`append_object_member`].
pub fn append_array_element(
	json: &mut Vec<u8>,
	table: &mut DescriptionTable,
	array_at: usize,
	value_json: &[u8],
	value_table: &DescriptionTable,
) -> Result<(), TableError> {
	let view = table.view_at(array_at);
	view.require_array()?;
	let (_, arr_end) = view.json_bounds()?;
	let element_count = view.member_count()?;
	let old_children_len = view.children_total_index_length()?;
	let insert_json_at = arr_end - 1;

	let mut element_text = Vec::with_capacity(value_json.len() + 1);
	if element_count > 0 {
		element_text.push(b',');
	}
	element_text.extend_from_slice(value_json);
	let comma_len = i32::from(element_count > 0);

	let mut value_table_bytes = value_table.as_bytes().to_vec();
	let value_json_at = insert_json_at as i32 + comma_len;
	let value_delta = value_json_at - value_table.root().json_offset()? as i32;
	rebase(&mut value_table_bytes, value_delta)?;

	let ancestors = ancestor_chain(table.as_bytes(), array_at)?;
	let json_delta = element_text.len() as i32;

	json.splice(insert_json_at..insert_json_at, element_text.iter().copied());

	let table_bytes = table.bytes_mut();
	advance_offsets_from(table_bytes, insert_json_at as i32, json_delta)?;
	shrink_children_total_index_length(
		table_bytes,
		&ancestors,
		-(value_table_bytes.len() as i32),
	)?;
	set_i32(table_bytes, array_at + 9, element_count as i32 + 1);

	let table_insert_at = array_at + 17 + old_children_len;
	table_bytes.splice(table_insert_at..table_insert_at, value_table_bytes.iter().copied());

	Ok(())
}

/// Grow `[start, end)` to also consume one adjoining comma and the
/// whitespace between it and the member it separates, so removing a member
/// never leaves `{"a":1,,"b":2}` or a dangling leading comma behind.
/// Prefers consuming a *trailing* comma (the member and the comma after
/// it); falls back to a *leading* one only when this was the last member.
fn widen_to_separator(json: &[u8], mut start: usize, mut end: usize) -> (usize, usize) {
	let mut probe = end;
	while probe < json.len() && json[probe].is_ascii_whitespace() {
		probe += 1;
	}
	if probe < json.len() && json[probe] == b',' {
		end = probe + 1;
		return (start, end);
	}
	let mut probe = start;
	while probe > 0 && json[probe - 1].is_ascii_whitespace() {
		probe -= 1;
	}
	if probe > 0 && json[probe - 1] == b',' {
		start = probe - 1;
	}
	(start, end)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::table::DescriptionTable;

	#[test]
	fn removes_middle_member_and_keeps_neighbours() {
		let mut json = br#"{"a":1,"b":2,"c":3}"#.to_vec();
		let (mut table, _) = DescriptionTable::build(&json).unwrap();
		let removed = remove_object_member(&mut json, &mut table, 0, "b", false).unwrap();
		assert!(removed);
		assert_eq!(std::str::from_utf8(&json).unwrap(), r#"{"a":1,"c":3}"#);
		assert_eq!(table.root().member_count().unwrap(), 2);
	}

	#[test]
	fn removes_last_member_dropping_leading_comma() {
		let mut json = br#"{"a":1,"b":2}"#.to_vec();
		let (mut table, _) = DescriptionTable::build(&json).unwrap();
		let removed = remove_object_member(&mut json, &mut table, 0, "b", false).unwrap();
		assert!(removed);
		assert_eq!(std::str::from_utf8(&json).unwrap(), r#"{"a":1}"#);
	}

	#[test]
	fn missing_key_is_a_no_op() {
		let mut json = br#"{"a":1}"#.to_vec();
		let (mut table, _) = DescriptionTable::build(&json).unwrap();
		let removed = remove_object_member(&mut json, &mut table, 0, "z", false).unwrap();
		assert!(!removed);
		assert_eq!(std::str::from_utf8(&json).unwrap(), r#"{"a":1}"#);
	}

	#[test]
	fn rebase_shifts_every_offset_by_a_constant() {
		let (table, _) = DescriptionTable::build(br#"{"a":1}"#).unwrap();
		let before = table.root().json_offset().unwrap();
		let mut bytes = table.as_bytes().to_vec();
		rebase(&mut bytes, 100).unwrap();
		let (shifted_table, _) = DescriptionTable::build(br#"{"a":1}"#).unwrap();
		let mut shifted_bytes = shifted_table.as_bytes().to_vec();
		rebase(&mut shifted_bytes, 100).unwrap();
		let after = crate::record::json_offset_at(&shifted_bytes, 0).unwrap();
		assert_eq!(after as usize, before + 100);
	}

	#[test]
	fn rewrite_replaces_a_scalar_value_in_place() {
		let mut json = br#"{"a":1,"b":2}"#.to_vec();
		let (mut table, _) = DescriptionTable::build(&json).unwrap();
		let value_offset = table.root().value_offset(&json, "a", false).unwrap().unwrap();
		let (new_json_table, _) = DescriptionTable::build(b"999").unwrap();
		rewrite(&mut json, &mut table, value_offset, b"999", &new_json_table).unwrap();
		assert_eq!(std::str::from_utf8(&json).unwrap(), r#"{"a":999,"b":2}"#);
		let b_offset = table.root().value_offset(&json, "b", false).unwrap().unwrap();
		assert_eq!(table.view_at(b_offset).tag().unwrap(), jzon_types::Tag::Integer);
	}

	/// Regression test: a size-growing rewrite used to re-apply the
	/// post-graft offset fixup to the just-spliced-in record itself (it sat
	/// in the scanned range at its already-correct coordinates), growing its
	/// `jsonLength` a second time and corrupting the read-back.
	#[test]
	fn rewrite_does_not_double_fix_up_the_grafted_record() {
		let mut json = br#"{"a":1,"b":2}"#.to_vec();
		let (mut table, _) = DescriptionTable::build(&json).unwrap();
		let value_offset = table.root().value_offset(&json, "a", false).unwrap().unwrap();
		let (new_value_table, _) = DescriptionTable::build(b"999").unwrap();
		rewrite(&mut json, &mut table, value_offset, b"999", &new_value_table).unwrap();

		assert_eq!(std::str::from_utf8(&json).unwrap(), r#"{"a":999,"b":2}"#);

		// The rewritten record's own span must point at exactly "999", not
		// bleed into the following `,"b"`.
		let a_offset = table.root().value_offset(&json, "a", false).unwrap().unwrap();
		let a_view = table.view_at(a_offset);
		let (a_start, a_end) = a_view.json_bounds().unwrap();
		assert_eq!(&json[a_start..a_end], b"999");

		// "b"'s value must still resolve to its own, correctly shifted span.
		let b_offset = table.root().value_offset(&json, "b", false).unwrap().unwrap();
		let (b_start, b_end) = table.view_at(b_offset).json_bounds().unwrap();
		assert_eq!(&json[b_start..b_end], b"2");

		// Re-tokenizing the rewritten JSON must produce the same shape the
		// table now claims (spec.md §8 "Mutation invariants").
		let (rebuilt, _) = DescriptionTable::build(&json).unwrap();
		assert_eq!(rebuilt.root().member_count().unwrap(), table.root().member_count().unwrap());
		assert_eq!(table.as_bytes(), rebuilt.as_bytes());
	}

	/// Same bug, but replacing a scalar with a container: every grafted
	/// child offset must land on its own text, not get shifted again.
	#[test]
	fn rewrite_replaces_a_scalar_with_a_nested_object() {
		let mut json = br#"{"a":1,"b":2}"#.to_vec();
		let (mut table, _) = DescriptionTable::build(&json).unwrap();
		let value_offset = table.root().value_offset(&json, "a", false).unwrap().unwrap();
		let new_value_json = br#"{"x":1}"#;
		let (new_value_table, _) = DescriptionTable::build(new_value_json).unwrap();
		rewrite(&mut json, &mut table, value_offset, new_value_json, &new_value_table).unwrap();

		assert_eq!(std::str::from_utf8(&json).unwrap(), r#"{"a":{"x":1},"b":2}"#);

		let a_offset = table.root().value_offset(&json, "a", false).unwrap().unwrap();
		let a_view = table.view_at(a_offset);
		assert_eq!(a_view.tag().unwrap(), jzon_types::Tag::Object);
		let (a_start, a_end) = a_view.json_bounds().unwrap();
		assert_eq!(&json[a_start..a_end], br#"{"x":1}"#);
		let x_offset = a_view.value_offset(&json, "x", false).unwrap().unwrap();
		let (x_start, x_end) = table.view_at(x_offset).json_bounds().unwrap();
		assert_eq!(&json[x_start..x_end], b"1");

		let b_offset = table.root().value_offset(&json, "b", false).unwrap().unwrap();
		let (b_start, b_end) = table.view_at(b_offset).json_bounds().unwrap();
		assert_eq!(&json[b_start..b_end], b"2");

		let (rebuilt, _) = DescriptionTable::build(&json).unwrap();
		assert_eq!(table.as_bytes(), rebuilt.as_bytes());
	}
}
