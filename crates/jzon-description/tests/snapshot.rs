//! Snapshot tests for the flattened description table, the same way the
//! rowan parser snapshots its CST dumps: a stable textual rendering of the
//! binary table structure catches accidental layout changes that a plain
//! `assert_eq!` on byte offsets would miss in review.

use jzon_description::{DescriptionTable, DescriptionView};
use jzon_types::Tag;
use std::fmt::Write;

fn dump(json: &[u8]) -> String {
	let (table, _consumed) = DescriptionTable::build(json).expect("valid JSON");
	let mut out = String::new();
	dump_node(table.as_bytes(), table.root(), json, 0, &mut out);
	out
}

fn dump_node(table: &[u8], view: DescriptionView<'_>, json: &[u8], depth: usize, out: &mut String) {
	let indent = "  ".repeat(depth);
	let tag = view.tag().expect("valid tag");
	let (start, end) = view.json_bounds().expect("valid bounds");
	match tag {
		Tag::Object => {
			writeln!(out, "{indent}Object @{start}..{end}").unwrap();
			for (key_offset, value_offset) in view.object_members().expect("object") {
				let key_view = DescriptionView::at_offset(table, key_offset);
				let (ks, ke) = key_view.data_bounds().expect("key bounds");
				let key_text = std::str::from_utf8(&json[ks..ke]).unwrap_or("<invalid utf8>");
				writeln!(out, "{indent}  key {key_text:?}").unwrap();
				let value_view = DescriptionView::at_offset(table, value_offset);
				dump_node(table, value_view, json, depth + 2, out);
			}
		}
		Tag::Array => {
			writeln!(out, "{indent}Array @{start}..{end}").unwrap();
			for element_offset in view.array_elements().expect("array") {
				let element_view = DescriptionView::at_offset(table, element_offset);
				dump_node(table, element_view, json, depth + 1, out);
			}
		}
		Tag::String | Tag::StringEscaped => {
			let (s, e) = view.data_bounds().expect("data bounds");
			writeln!(out, "{indent}String {:?}", std::str::from_utf8(&json[s..e])).unwrap();
		}
		Tag::Integer | Tag::Float => {
			let (s, e) = view.data_bounds().expect("data bounds");
			writeln!(out, "{indent}Number {}", std::str::from_utf8(&json[s..e]).unwrap()).unwrap();
		}
		Tag::BoolTrue => writeln!(out, "{indent}Bool true").unwrap(),
		Tag::BoolFalse => writeln!(out, "{indent}Bool false").unwrap(),
		Tag::Null => writeln!(out, "{indent}Null").unwrap(),
	}
}

#[test]
fn flat_object_of_scalars() {
	let dump = dump(br#"{"id":42,"name":"Joannis","active":true,"score":null}"#);
	insta::assert_snapshot!("flat_object_of_scalars", dump);
}

#[test]
fn nested_array_of_objects() {
	let dump = dump(br#"[{"x":1,"y":2},{"x":3,"y":4}]"#);
	insta::assert_snapshot!("nested_array_of_objects", dump);
}

#[test]
fn unicode_heavy_strings() {
	let dump = dump("{\"greeting\":\"héllo wörld\",\"emoji\":\"🎉\"}".as_bytes());
	insta::assert_snapshot!("unicode_heavy_strings", dump);
}

#[test]
fn deeply_nested_containers() {
	let dump = dump(br#"{"a":{"b":{"c":[1,2,[3,4]]}}}"#);
	insta::assert_snapshot!("deeply_nested_containers", dump);
}
