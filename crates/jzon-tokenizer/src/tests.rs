use crate::{ByteSpan, TokenSink, TokenizeError, Tokenizer};

#[derive(Debug, PartialEq)]
enum Event {
	ArrayStart,
	ArrayEnd(u32),
	ObjectStart,
	ObjectEnd(u32),
	True,
	False,
	Null,
	String { span: ByteSpan, escaped: bool },
	Number { span: ByteSpan, is_integer: bool },
}

#[derive(Default)]
struct RecordingSink {
	events: Vec<Event>,
}

impl TokenSink for RecordingSink {
	type ArrayContext = ();
	type ObjectContext = ();

	fn array_start(&mut self, _start_offset: usize) -> Self::ArrayContext {
		self.events.push(Event::ArrayStart);
	}
	fn array_end(&mut self, (): Self::ArrayContext, _end_offset: usize, element_count: u32) {
		self.events.push(Event::ArrayEnd(element_count));
	}
	fn object_start(&mut self, _start_offset: usize) -> Self::ObjectContext {
		self.events.push(Event::ObjectStart);
	}
	fn object_end(&mut self, (): Self::ObjectContext, _end_offset: usize, member_count: u32) {
		self.events.push(Event::ObjectEnd(member_count));
	}
	fn bool_true(&mut self, _span: ByteSpan) {
		self.events.push(Event::True);
	}
	fn bool_false(&mut self, _span: ByteSpan) {
		self.events.push(Event::False);
	}
	fn null(&mut self, _span: ByteSpan) {
		self.events.push(Event::Null);
	}
	fn string(&mut self, span: ByteSpan, escaped: bool) {
		self.events.push(Event::String { span, escaped });
	}
	fn number(&mut self, span: ByteSpan, is_integer: bool) {
		self.events.push(Event::Number { span, is_integer });
	}
}

fn run(json: &str) -> Result<(usize, Vec<Event>), TokenizeError> {
	let mut sink = RecordingSink::default();
	let consumed = Tokenizer::run(json.as_bytes(), &mut sink)?;
	Ok((consumed, sink.events))
}

#[test]
fn scans_a_flat_object_in_source_order() {
	let (consumed, events) = run(r#"{"id":42,"name":"Joannis"}"#).unwrap();
	assert_eq!(consumed, r#"{"id":42,"name":"Joannis"}"#.len());
	assert_eq!(
		events,
		vec![
			Event::ObjectStart,
			Event::String { span: ByteSpan::new(1, 4), escaped: false },
			Event::Number { span: ByteSpan::new(6, 2), is_integer: true },
			Event::String { span: ByteSpan::new(9, 6), escaped: false },
			Event::String { span: ByteSpan::new(16, 10), escaped: false },
			Event::ObjectEnd(2),
		]
	);
}

#[test]
fn scans_mixed_array_in_order() {
	let (_, events) = run(r#"[1,2.5,true,null,"x"]"#).unwrap();
	assert_eq!(
		events,
		vec![
			Event::ArrayStart,
			Event::Number { span: ByteSpan::new(1, 1), is_integer: true },
			Event::Number { span: ByteSpan::new(3, 3), is_integer: false },
			Event::True,
			Event::Null,
			Event::String { span: ByteSpan::new(18, 3), escaped: false },
			Event::ArrayEnd(5),
		]
	);
}

#[test]
fn marks_escaped_strings_distinctly() {
	let (_, events) = run(r#""a\"b\né""#).unwrap();
	assert_eq!(events, vec![Event::String { span: ByteSpan::new(0, 14), escaped: true }]);
}

#[test]
fn leading_zero_ends_the_number_rather_than_continuing_digits() {
	// "01" is not a valid JSON number, but `run` only scans one top-level
	// value and tolerates trailing bytes (for streaming); a leading `0`
	// simply can't be followed by more digits, so the second "1" is left
	// unconsumed here. Full-document callers reject leftover non-whitespace
	// bytes themselves (see `jzon::decode`).
	let (consumed, events) = run("01").unwrap();
	assert_eq!(consumed, 1);
	assert_eq!(events, vec![Event::Number { span: ByteSpan::new(0, 1), is_integer: true }]);
}

#[test]
fn accepts_bare_zero() {
	let (_, events) = run("0").unwrap();
	assert_eq!(events, vec![Event::Number { span: ByteSpan::new(0, 1), is_integer: true }]);
}

#[test]
fn rejects_trailing_comma_in_object() {
	let err = run(r#"{"a":1,}"#).unwrap_err();
	assert!(matches!(err, TokenizeError::MissingToken { .. }));
}

#[test]
fn rejects_missing_colon() {
	let err = run(r#"{"a" 1}"#).unwrap_err();
	assert!(matches!(
		err,
		TokenizeError::MissingToken { reason: crate::MissingTokenReason::Colon, .. }
	));
}

#[test]
fn rejects_truncated_literal() {
	let err = run("tru").unwrap_err();
	assert!(matches!(err, TokenizeError::InvalidLiteral { .. } | TokenizeError::MissingData { .. }));
}

#[test]
fn rejects_bad_escape() {
	let err = run(r#""\q""#).unwrap_err();
	assert!(matches!(err, TokenizeError::UnexpectedToken { .. }));
}

#[test]
fn rejects_unterminated_string() {
	let err = run(r#""abc"#).unwrap_err();
	assert!(matches!(err, TokenizeError::MissingData { .. }));
}

#[test]
fn invalid_top_level_byte_is_reported_distinctly() {
	let err = run("@").unwrap_err();
	assert!(matches!(err, TokenizeError::InvalidTopLevel { .. }));
}

#[test]
fn nested_value_uses_generic_unexpected_token() {
	let err = run("[@]").unwrap_err();
	assert!(matches!(err, TokenizeError::UnexpectedToken { .. }));
}

#[test]
fn leaves_trailing_bytes_unconsumed_for_streaming() {
	let mut sink = RecordingSink::default();
	let consumed = Tokenizer::run(b"1 garbage", &mut sink).unwrap();
	assert_eq!(consumed, 1);
}
