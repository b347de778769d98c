//! Field collection - gathering and validating user answers for a template.
//!
//! A `FieldValueSet` is owned by exactly one request. Values go in through
//! `submit`, which validates raw chat input against the field's declared
//! type and leaves the set untouched on failure so the user can simply be
//! reprompted.

pub mod validate;
pub mod values;

pub use validate::{validate_raw, ValidationError};
pub use values::{FieldValue, FieldValueSet};
