//! Validator module — syntactic acceptance rules for hosts-file lines.

pub mod model;
pub mod rules;

pub use model::{FileValidationError, ValidationError};
pub use rules::Validator;
