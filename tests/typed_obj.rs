use jzon::{DecoderSettings, EncoderSettings, KeyDecodingStrategy, KeyEncodingStrategy};
use serde::{Deserialize, Serialize};

fn roundtrip<T>(value: &T) -> T
where
	T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug,
{
	let json = jzon::encode_to_vec(value, &EncoderSettings::default()).unwrap();
	let back: T = jzon::decode_from_slice(&json, &DecoderSettings::default()).unwrap();
	assert_eq!(value, &back);
	back
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
struct A {
	a: u32,
	b: u16,
}

#[test]
fn simple_object() {
	let a: A = jzon::decode_from_str("{\"a\": 1, \"b\": 2}", &DecoderSettings::default()).unwrap();
	assert_eq!(a, A { a: 1, b: 2 });
	roundtrip(&a);
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
struct B {
	a: u32,
	#[serde(rename = "c")]
	b: u16,
}

#[test]
fn renamed_field() {
	let b: B = jzon::decode_from_str("{\"a\": 1, \"c\": 2}", &DecoderSettings::default()).unwrap();
	assert_eq!(b, B { a: 1, b: 2 });
	let json = jzon::encode_to_vec(&b, &EncoderSettings::default()).unwrap();
	assert_eq!(json, br#"{"a":1,"c":2}"#);
	roundtrip(&b);
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
struct UserName {
	user_name: String,
	user_id: u64,
}

#[test]
fn snake_case_strategy_matches_camel_case_json_without_allocating_on_read() {
	let settings =
		DecoderSettings { key_strategy: KeyDecodingStrategy::ConvertFromSnakeCase, ..Default::default() };
	let user: UserName =
		jzon::decode_from_str(r#"{"userName": "Joannis", "userId": 7}"#, &settings).unwrap();
	assert_eq!(user, UserName { user_name: "Joannis".into(), user_id: 7 });

	let encode_settings = EncoderSettings {
		key_strategy: KeyEncodingStrategy::ConvertToSnakeCase,
		..Default::default()
	};
	let json = jzon::encode_to_vec(&user, &encode_settings).unwrap();
	assert_eq!(json, br#"{"user_name":"Joannis","user_id":7}"#);
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
struct Nested {
	name: String,
	children: Vec<Nested>,
}

#[test]
fn nested_containers_round_trip() {
	let tree = Nested {
		name: "root".into(),
		children: vec![
			Nested { name: "left".into(), children: vec![] },
			Nested { name: "right".into(), children: vec![Nested { name: "leaf".into(), children: vec![] }] },
		],
	};
	roundtrip(&tree);
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
struct Optional {
	present: Option<u32>,
	absent: Option<u32>,
}

#[test]
fn missing_key_and_explicit_null_both_default_to_none() {
	let from_missing: Optional =
		jzon::decode_from_str(r#"{"present": 1}"#, &DecoderSettings::default()).unwrap();
	assert_eq!(from_missing, Optional { present: Some(1), absent: None });

	let from_null: Optional =
		jzon::decode_from_str(r#"{"present": 1, "absent": null}"#, &DecoderSettings::default()).unwrap();
	assert_eq!(from_null, Optional { present: Some(1), absent: None });
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
enum Shape {
	Circle { radius: f64 },
	Square { side: f64 },
	Origin,
}

#[test]
fn externally_tagged_enum_round_trips() {
	roundtrip(&Shape::Circle { radius: 2.5 });
	roundtrip(&Shape::Square { side: 1.0 });
	roundtrip(&Shape::Origin);
}

#[test]
fn rejects_trailing_bytes_after_the_top_level_value() {
	let err = jzon::decode_from_slice::<A>(br#"{"a":1,"b":2}, "#, &DecoderSettings::default());
	assert!(err.is_err());
}

#[test]
fn decode_with_consumed_reports_how_much_was_read() {
	let (value, consumed): (A, usize) =
		jzon::decode_with_consumed(br#"{"a":1,"b":2} trailing"#, &DecoderSettings::default()).unwrap();
	assert_eq!(value, A { a: 1, b: 2 });
	assert_eq!(consumed, r#"{"a":1,"b":2}"#.len());
}
