use thiserror::Error;

/// Faults raised while querying an already-built description table
/// (spec.md §7). A `CorruptTable` is, per spec.md §4.2's edge-case
/// policies, "a bug, not user-recoverable" — it only surfaces if a caller
/// hand-built or truncated a table outside the normal tokenizer→sink path.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
	#[error("description table is corrupt: truncated record at offset {at}")]
	CorruptTable { at: usize },
	#[error("container closed before a required read")]
	EndOfObject,
	#[error("container closed before a required read")]
	EndOfArray,
	#[error("facade constructed on a record that is not an object")]
	ExpectedObject,
	#[error("facade constructed on a record that is not an array")]
	ExpectedArray,
}

/// Faults raised while building a description table from raw bytes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
	#[error(transparent)]
	Tokenize(#[from] jzon_tokenizer::TokenizeError),
	#[error("JSON buffer is too large to index (must fit in i32 offsets)")]
	BufferTooLarge,
}
