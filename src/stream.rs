//! The streaming array decoder (spec.md §4.6): accumulates byte chunks
//! from a slow channel and yields decoded elements of a fixed type as soon
//! as each one completes, without ever holding the whole array in memory
//! at once.
//!
//! State machine matches spec.md exactly: `BeforeArrayOpen → InsideArray{
//! expecting_comma_or_end } → ArrayClosed`. The corrected branch from
//! spec.md §9's Open Questions is load-bearing here: when
//! `expecting_comma_or_end` is `false`, any non-whitespace byte starts a
//! new element attempt (not just `{`/`[`) — unit-typed streamed elements
//! like bare numbers or strings are otherwise indistinguishable from a
//! syntax error.

use jzon_tokenizer::TokenizeError;
use serde::de::DeserializeOwned;

use crate::{error::Error, settings::DecoderSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	BeforeArrayOpen,
	InsideArray { expecting_comma_or_end: bool },
	ArrayClosed,
}

/// Feed this chunk-by-chunk via [`StreamDecoder::feed`]; each call returns
/// every element that became decodable from the bytes seen so far.
pub struct StreamDecoder<T> {
	buffer: Vec<u8>,
	state: State,
	max_element_size: usize,
	settings: DecoderSettings,
	_marker: std::marker::PhantomData<T>,
}

impl<T: DeserializeOwned> StreamDecoder<T> {
	#[must_use]
	pub fn new(max_element_size: usize, settings: DecoderSettings) -> Self {
		Self {
			buffer: Vec::new(),
			state: State::BeforeArrayOpen,
			max_element_size,
			settings,
			_marker: std::marker::PhantomData,
		}
	}

	#[must_use]
	pub fn is_closed(&self) -> bool {
		self.state == State::ArrayClosed
	}

	fn skip_whitespace(&mut self) {
		let skip = self.buffer.iter().take_while(|b| b.is_ascii_whitespace()).count();
		self.buffer.drain(..skip);
	}

	/// Feed the next chunk of bytes, returning every array element that
	/// could be fully decoded from the buffer so far.
	///
	/// # Errors
	/// Returns an error on any tokenizer or decode fault that isn't simply
	/// "not enough bytes yet" — those are retained in the internal buffer
	/// and retried on the next call.
	pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<T>, Error> {
		self.buffer.extend_from_slice(chunk);
		let mut decoded = Vec::new();

		loop {
			self.skip_whitespace();
			if self.buffer.is_empty() {
				break;
			}

			match self.state {
				State::ArrayClosed => break,

				State::BeforeArrayOpen => {
					if self.buffer[0] == b'[' {
						self.buffer.remove(0);
						self.state = State::InsideArray { expecting_comma_or_end: false };
					} else {
						return Err(Error::Custom("expected '[' to open the streamed array".into()));
					}
				}

				State::InsideArray { expecting_comma_or_end } => {
					if self.buffer[0] == b']' {
						self.buffer.remove(0);
						self.state = State::ArrayClosed;
						break;
					}

					if expecting_comma_or_end {
						if self.buffer[0] == b',' {
							self.buffer.remove(0);
							self.state = State::InsideArray { expecting_comma_or_end: false };
						} else {
							return Err(Error::Custom("expected ',' or ']'".into()));
						}
						continue;
					}

					if self.buffer.len() > self.max_element_size {
						return Err(Error::Custom(format!(
							"streamed element exceeds the configured {} byte cap",
							self.max_element_size
						)));
					}

					match crate::decode_with_consumed::<T>(&self.buffer, &self.settings) {
						Ok((value, consumed)) => {
							self.buffer.drain(..consumed);
							decoded.push(value);
							self.state = State::InsideArray { expecting_comma_or_end: true };
						}
						Err(Error::Tokenize(TokenizeError::MissingData { .. }))
						| Err(Error::Build(jzon_description::BuildError::Tokenize(
							TokenizeError::MissingData { .. },
						))) => {
							// Incomplete element; wait for the next chunk and retry
							// from the same bytes.
							break;
						}
						Err(other) => return Err(other),
					}
				}
			}
		}

		Ok(decoded)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_elements_as_chunks_complete_them() {
		let mut decoder: StreamDecoder<i64> = StreamDecoder::new(64, DecoderSettings::default());
		let mut out = Vec::new();
		out.extend(decoder.feed(b"[1,2").unwrap());
		out.extend(decoder.feed(b",3]").unwrap());
		assert_eq!(out, vec![1, 2, 3]);
		assert!(decoder.is_closed());
	}

	#[test]
	fn splits_a_single_element_across_chunks() {
		let mut decoder: StreamDecoder<String> = StreamDecoder::new(64, DecoderSettings::default());
		let mut out = Vec::new();
		out.extend(decoder.feed(br#"["hel"#).unwrap());
		assert!(out.is_empty());
		out.extend(decoder.feed(br#"lo"]"#).unwrap());
		assert_eq!(out, vec!["hello".to_string()]);
	}

	#[test]
	fn empty_array_closes_immediately() {
		let mut decoder: StreamDecoder<i64> = StreamDecoder::new(64, DecoderSettings::default());
		let out = decoder.feed(b"[]").unwrap();
		assert!(out.is_empty());
		assert!(decoder.is_closed());
	}

	#[test]
	fn rejects_a_second_value_without_a_separating_comma() {
		let mut decoder: StreamDecoder<i64> = StreamDecoder::new(64, DecoderSettings::default());
		let err = decoder.feed(b"[1 2]");
		assert!(err.is_err());
	}
}
