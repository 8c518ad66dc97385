//! The tokenizer half of `jzon`'s two-phase lazy parser (spec.md §4.1): a
//! single linear scan over a byte buffer that validates JSON syntax and
//! emits typed tokens to a [`TokenSink`], never allocating per token.
//!
//! This crate knows nothing about the description table it will usually be
//! feeding — that coupling lives in `jzon-description`, which implements
//! [`TokenSink`] for its table builder.

mod error;
mod location;
mod scanner;
mod sink;

pub use error::{MissingTokenReason, TokenizeError, UnexpectedTokenReason};
pub use location::locate;
pub use scanner::Tokenizer;
pub use sink::{ByteSpan, TokenSink};

#[cfg(test)]
mod tests;
