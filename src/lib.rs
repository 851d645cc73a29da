//! qa-enricher - builds question/answer datasets for text-to-Cypher benchmarks
//!
//! Reference Cypher queries are executed against a Neo4j database and their
//! result sets are rendered into deterministic answer strings.

pub mod api;
pub mod config;
pub mod core;
pub mod dataset;
pub mod query;
pub mod services;
pub mod utils;
