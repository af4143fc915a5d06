//! Response normalization module
//!
//! # Overview
//!
//! Raw vendor records are deeply nested and heterogeneous. A selector tree
//! ([`EntitySelector`]) names the attributes to keep and the nested
//! collections to expose as child records; [`normalize`] applies it and
//! coerces every value to its declared type.

mod normalizer;
mod types;

pub(crate) use normalizer::lookup;
pub use normalizer::{normalize, normalize_all, records_at};
pub use types::{AttributeSelector, AttributeType, ChildSelector, EntitySelector};

#[cfg(test)]
mod tests;
