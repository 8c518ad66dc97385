use thiserror::Error;

/// Faults raised by the `Object`/`Array` facade and the owned `Value` tree.
/// Wraps the lower layers' taxonomies (spec.md §7) rather than duplicating
/// them, the same way `jzon_description::BuildError` wraps
/// `jzon_tokenizer::TokenizeError`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
	#[error(transparent)]
	Build(#[from] jzon_description::BuildError),
	#[error(transparent)]
	Table(#[from] jzon_description::TableError),
	#[error("value at this position is not valid UTF-8")]
	InvalidUtf8,
	#[error("expected a {expected} value but found a {found}")]
	TypeMismatch { expected: &'static str, found: jzon_types::ValType },
}
