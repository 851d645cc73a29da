//! Neo4j HTTP transactional API backend

pub mod client;
pub mod jolt;

pub use client::{HttpGraphClient, HttpSession};
