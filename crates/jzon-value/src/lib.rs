//! The `Object`/`Array` value facade (spec.md §4.3) and the owned,
//! eagerly-materialized [`owned::Value`] tree (spec.md §9 "added"): the
//! layer end users reach for when they want to read or mutate JSON without
//! going through a typed `#[derive(Deserialize)]` struct.
//!
//! Sits directly on top of `jzon-description`; knows nothing about `serde`
//! or the decoding/encoding bridge, which live in the root `jzon` crate.

pub mod array;
pub mod error;
mod field;
pub mod literal;
pub mod owned;
pub mod object;

pub use array::Array;
pub use error::Error;
pub use field::{Field, SetValue};
pub use object::Object;
pub use owned::Value;
