pub mod key_validator;

pub use key_validator::{find_missing_properties, referenced_properties};
