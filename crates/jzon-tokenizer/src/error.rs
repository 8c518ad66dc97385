use thiserror::Error;

/// What a [`MissingToken`](TokenizeError::MissingToken) error expected to
/// find but didn't. Kept as a payload rather than separate error variants,
/// since the shape of the error (line/column/byte) is identical across all
/// of them — only the English description differs (spec.md §4.1/§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingTokenReason {
	Colon,
	Comma,
	ObjectKey,
	ObjectClose,
	ArrayClose,
}

impl std::fmt::Display for MissingTokenReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Self::Colon => "':'",
			Self::Comma => "','",
			Self::ObjectKey => "object key",
			Self::ObjectClose => "'}'",
			Self::ArrayClose => "']'",
		};
		f.write_str(s)
	}
}

/// What an [`UnexpectedToken`](TokenizeError::UnexpectedToken) error saw
/// that it couldn't make sense of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnexpectedTokenReason {
	/// The byte that should start a value (`{`, `[`, `"`, digit, `-`, or the
	/// first letter of `true`/`false`/`null`) was something else.
	ExpectedValue,
	/// An escape character that isn't in the JSON escape alphabet.
	InvalidEscape,
	/// A `\u` escape whose four following bytes aren't all hex digits.
	InvalidUnicodeEscape,
	/// A raw, unescaped control character inside a string.
	ControlCharacterInString,
}

impl std::fmt::Display for UnexpectedTokenReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Self::ExpectedValue => "expected a value",
			Self::InvalidEscape => "invalid escape sequence",
			Self::InvalidUnicodeEscape => "invalid \\u escape",
			Self::ControlCharacterInString => "unescaped control character in string",
		};
		f.write_str(s)
	}
}

/// The tokenizer's closed error taxonomy (spec.md §7).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeError {
	#[error("unexpected token at {line}:{column} (byte {byte:#04x}): {reason}")]
	UnexpectedToken {
		line: usize,
		column: usize,
		byte: u8,
		reason: UnexpectedTokenReason,
	},
	#[error("missing token at {line}:{column} (byte {byte:#04x}): expected {reason}")]
	MissingToken {
		line: usize,
		column: usize,
		byte: u8,
		reason: MissingTokenReason,
	},
	#[error("unexpected end of input at {line}:{column}")]
	MissingData { line: usize, column: usize },
	#[error("invalid literal at {line}:{column}")]
	InvalidLiteral { line: usize, column: usize },
	#[error("top-level value at {line}:{column} is not valid JSON")]
	InvalidTopLevel { line: usize, column: usize },
}
