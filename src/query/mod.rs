// Query module for the enricher
//
// This module covers everything between a raw Cypher query and its answer text:
// - Pre-flight validation of referenced property keys
// - Rendering result sets into answer strings

pub mod formatter;
pub mod validator;

pub use formatter::{format_result, stringify, stringify_record};
pub use validator::{find_missing_properties, referenced_properties};
