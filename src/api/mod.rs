pub mod client;
pub mod http;

pub use client::{GraphClient, GraphSession, Params, PROPERTY_KEYS_QUERY};
pub use http::{HttpGraphClient, HttpSession};
