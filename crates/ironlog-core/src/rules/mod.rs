pub mod validation;

pub use validation::{validate_name, validate_set};
