use jzon_types::bytes::{is_digit, is_valid_escape, is_whitespace};

use crate::{
	error::{MissingTokenReason, TokenizeError, UnexpectedTokenReason},
	location::locate,
	sink::{ByteSpan, TokenSink},
};

/// A single-pass, non-allocating JSON validator/scanner (spec.md §4.1). One
/// [`Tokenizer`] is built per call to [`Tokenizer::run`]; it borrows the
/// input window for its entire lifetime and never retains it afterwards.
pub struct Tokenizer<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Tokenizer<'a> {
	#[must_use]
	pub const fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Scan exactly one JSON value starting at the first non-whitespace
	/// byte, emitting tokens to `sink`, and return the number of bytes
	/// consumed (including leading whitespace). Trailing bytes after the
	/// value are left unconsumed, so streaming callers can keep feeding a
	/// shared buffer (spec.md §6: "variants returning `(value,
	/// bytesConsumed)` for streaming use").
	pub fn run(bytes: &'a [u8], sink: &mut impl TokenSink) -> Result<usize, TokenizeError> {
		let mut this = Self::new(bytes);
		this.skip_whitespace();
		let start = this.pos;
		match this.scan_value(sink) {
			Ok(()) => Ok(this.pos),
			Err(TokenizeError::UnexpectedToken {
				reason: UnexpectedTokenReason::ExpectedValue,
				..
			}) if this.pos == start => {
				let (line, column) = locate(this.bytes, start);
				Err(TokenizeError::InvalidTopLevel { line, column })
			}
			Err(e) => Err(e),
		}
	}

	fn peek(&self) -> Option<u8> {
		self.bytes.get(self.pos).copied()
	}

	fn bump(&mut self) -> Option<u8> {
		let b = self.peek()?;
		self.pos += 1;
		Some(b)
	}

	fn err_missing_data(&self) -> TokenizeError {
		let (line, column) = locate(self.bytes, self.pos);
		TokenizeError::MissingData { line, column }
	}

	fn err_unexpected(&self, at: usize, reason: UnexpectedTokenReason) -> TokenizeError {
		let (line, column) = locate(self.bytes, at);
		let byte = self.bytes.get(at).copied().unwrap_or(0);
		TokenizeError::UnexpectedToken { line, column, byte, reason }
	}

	fn err_missing_token(&self, at: usize, reason: MissingTokenReason) -> TokenizeError {
		let (line, column) = locate(self.bytes, at);
		let byte = self.bytes.get(at).copied().unwrap_or(0);
		TokenizeError::MissingToken { line, column, byte, reason }
	}

	fn err_invalid_literal(&self, at: usize) -> TokenizeError {
		let (line, column) = locate(self.bytes, at);
		TokenizeError::InvalidLiteral { line, column }
	}

	#[cfg(not(feature = "simd-whitespace"))]
	fn skip_whitespace(&mut self) {
		while let Some(b) = self.peek() {
			if is_whitespace(b) {
				self.pos += 1;
			} else {
				break;
			}
		}
	}

	/// Optional optimization (spec.md §4.1): check 16 bytes at a time for
	/// an all-whitespace chunk before falling back to the scalar loop for
	/// the remainder. Semantics are identical to the scalar version.
	#[cfg(feature = "simd-whitespace")]
	fn skip_whitespace(&mut self) {
		const CHUNK: usize = 16;
		loop {
			let rest = &self.bytes[self.pos..];
			if rest.len() < CHUNK {
				break;
			}
			let chunk = &rest[..CHUNK];
			if chunk.iter().all(|&b| is_whitespace(b)) {
				self.pos += CHUNK;
			} else {
				break;
			}
		}
		while let Some(b) = self.peek() {
			if is_whitespace(b) {
				self.pos += 1;
			} else {
				break;
			}
		}
	}

	fn scan_value(&mut self, sink: &mut impl TokenSink) -> Result<(), TokenizeError> {
		match self.peek() {
			None => Err(self.err_missing_data()),
			Some(b'{') => self.scan_object(sink),
			Some(b'[') => self.scan_array(sink),
			Some(b'"') => {
				let (span, escaped) = self.scan_string()?;
				sink.string(span, escaped);
				Ok(())
			}
			Some(b't') => self.scan_literal(b"true", sink),
			Some(b'f') => self.scan_literal(b"false", sink),
			Some(b'n') => self.scan_literal(b"null", sink),
			Some(b'-') | Some(b'0'..=b'9') => self.scan_number(sink),
			Some(_) => Err(self.err_unexpected(self.pos, UnexpectedTokenReason::ExpectedValue)),
		}
	}

	fn scan_literal(
		&mut self,
		literal: &'static [u8],
		sink: &mut impl TokenSink,
	) -> Result<(), TokenizeError> {
		let start = self.pos;
		if self.bytes.len() < start + literal.len() {
			return Err(self.err_invalid_literal(start));
		}
		if &self.bytes[start..start + literal.len()] != literal {
			return Err(self.err_invalid_literal(start));
		}
		self.pos += literal.len();
		let span = ByteSpan::new(start, literal.len());
		match literal {
			b"true" => sink.bool_true(span),
			b"false" => sink.bool_false(span),
			b"null" => sink.null(span),
			_ => unreachable!("scan_literal only called with true/false/null"),
		}
		Ok(())
	}

	/// Scan a `"..."` string body, validating the escape alphabet but never
	/// decoding it. Returns the span (including both quotes) and whether
	/// any backslash was present.
	fn scan_string(&mut self) -> Result<(ByteSpan, bool), TokenizeError> {
		let start = self.pos;
		debug_assert_eq!(self.peek(), Some(b'"'));
		self.pos += 1; // opening quote
		let mut escaped = false;
		loop {
			match self.bump() {
				None => return Err(self.err_missing_data()),
				Some(b'"') => break,
				Some(b'\\') => {
					escaped = true;
					let esc_at = self.pos;
					let esc = self.bump().ok_or_else(|| self.err_missing_data())?;
					if !is_valid_escape(esc) {
						return Err(self.err_unexpected(
							esc_at,
							UnexpectedTokenReason::InvalidEscape,
						));
					}
					if esc == b'u' {
						for _ in 0..4 {
							let hex_at = self.pos;
							let h = self.bump().ok_or_else(|| self.err_missing_data())?;
							if !h.is_ascii_hexdigit() {
								return Err(self.err_unexpected(
									hex_at,
									UnexpectedTokenReason::InvalidUnicodeEscape,
								));
							}
						}
					}
				}
				Some(b) if b < 0x20 => {
					return Err(self.err_unexpected(
						self.pos - 1,
						UnexpectedTokenReason::ControlCharacterInString,
					))
				}
				Some(_) => {}
			}
		}
		let span = ByteSpan::new(start, self.pos - start);
		Ok((span, escaped))
	}

	fn scan_number(&mut self, sink: &mut impl TokenSink) -> Result<(), TokenizeError> {
		let start = self.pos;
		if self.peek() == Some(b'-') {
			self.pos += 1;
		}
		match self.peek() {
			Some(b'0') => {
				self.pos += 1;
			}
			Some(b'1'..=b'9') => {
				while matches!(self.peek(), Some(b) if is_digit(b)) {
					self.pos += 1;
				}
			}
			Some(_) => {
				return Err(self.err_unexpected(self.pos, UnexpectedTokenReason::ExpectedValue))
			}
			None => return Err(self.err_missing_data()),
		}
		let mut is_integer = true;
		if self.peek() == Some(b'.') {
			is_integer = false;
			self.pos += 1;
			let frac_start = self.pos;
			while matches!(self.peek(), Some(b) if is_digit(b)) {
				self.pos += 1;
			}
			if self.pos == frac_start {
				return Err(self.err_missing_data());
			}
		}
		if matches!(self.peek(), Some(b'e') | Some(b'E')) {
			is_integer = false;
			self.pos += 1;
			if matches!(self.peek(), Some(b'+') | Some(b'-')) {
				self.pos += 1;
			}
			let exp_start = self.pos;
			while matches!(self.peek(), Some(b) if is_digit(b)) {
				self.pos += 1;
			}
			if self.pos == exp_start {
				return Err(self.err_missing_data());
			}
		}
		let span = ByteSpan::new(start, self.pos - start);
		sink.number(span, is_integer);
		Ok(())
	}

	fn expect_byte(&mut self, b: u8, reason: MissingTokenReason) -> Result<(), TokenizeError> {
		let at = self.pos;
		match self.bump() {
			Some(found) if found == b => Ok(()),
			Some(_) => Err(self.err_missing_token(at, reason)),
			None => Err(self.err_missing_data()),
		}
	}

	fn scan_object(&mut self, sink: &mut impl TokenSink) -> Result<(), TokenizeError> {
		debug_assert_eq!(self.peek(), Some(b'{'));
		let start = self.pos;
		self.pos += 1;
		let ctx = sink.object_start(start);
		self.skip_whitespace();
		let mut member_count: u32 = 0;
		if self.peek() == Some(b'}') {
			self.pos += 1;
			sink.object_end(ctx, self.pos, 0);
			return Ok(());
		}
		loop {
			self.skip_whitespace();
			let key_at = self.pos;
			if self.peek() != Some(b'"') {
				return Err(self.err_missing_token(key_at, MissingTokenReason::ObjectKey));
			}
			let (key_span, key_escaped) = self.scan_string()?;
			sink.string(key_span, key_escaped);
			self.skip_whitespace();
			self.expect_byte(b':', MissingTokenReason::Colon)?;
			self.skip_whitespace();
			self.scan_value(sink)?;
			member_count += 1;
			self.skip_whitespace();
			match self.bump() {
				Some(b',') => continue,
				Some(b'}') => break,
				Some(_) => {
					return Err(self.err_missing_token(
						self.pos - 1,
						MissingTokenReason::ObjectClose,
					))
				}
				None => return Err(self.err_missing_data()),
			}
		}
		sink.object_end(ctx, self.pos, member_count);
		Ok(())
	}

	fn scan_array(&mut self, sink: &mut impl TokenSink) -> Result<(), TokenizeError> {
		debug_assert_eq!(self.peek(), Some(b'['));
		let start = self.pos;
		self.pos += 1;
		let ctx = sink.array_start(start);
		self.skip_whitespace();
		let mut element_count: u32 = 0;
		if self.peek() == Some(b']') {
			self.pos += 1;
			sink.array_end(ctx, self.pos, 0);
			return Ok(());
		}
		loop {
			self.skip_whitespace();
			self.scan_value(sink)?;
			element_count += 1;
			self.skip_whitespace();
			match self.bump() {
				Some(b',') => continue,
				Some(b']') => break,
				Some(_) => {
					return Err(self.err_missing_token(
						self.pos - 1,
						MissingTokenReason::ArrayClose,
					))
				}
				None => return Err(self.err_missing_data()),
			}
		}
		sink.array_end(ctx, self.pos, element_count);
		Ok(())
	}
}
