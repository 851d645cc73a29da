//! Database access seam
//!
//! The enricher only needs two things from a database: run a Cypher
//! statement in a session bound to a named database, and list the property
//! keys the database declares. Everything else (transport, auth, retries)
//! lives behind these traits.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::core::{EnrichError, EnrichResult, QueryError, QueryResult, Value};

/// Query parameters sent along with a statement
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Procedure listing every property key declared in the database
pub const PROPERTY_KEYS_QUERY: &str = "CALL db.propertyKeys()";

/// A session bound to one database, reused for a whole enrichment pass
#[async_trait]
pub trait GraphSession: Send {
    /// Runs a read-only statement and collects every returned row
    async fn run(&mut self, query: &str, params: &Params) -> EnrichResult<QueryResult>;

    /// Snapshot of the property keys declared anywhere in the database
    async fn property_keys(&mut self) -> EnrichResult<BTreeSet<String>> {
        let result = self.run(PROPERTY_KEYS_QUERY, &Params::new()).await?;
        result
            .first_column()
            .map(|value| match value {
                Some(Value::String(key)) => Ok(key.clone()),
                other => Err(EnrichError::from(QueryError::Protocol(format!(
                    "{} returned a non-string key: {:?}",
                    PROPERTY_KEYS_QUERY, other
                )))),
            })
            .collect()
    }
}

/// Owner of the connection to the database server
#[async_trait]
pub trait GraphClient: Send + Sync {
    type Session: GraphSession;

    /// Runs a trivial authenticated statement against `database`
    ///
    /// Fails with `EnrichError::Connectivity` when the server cannot be
    /// reached, rejects the credentials, or does not serve the database.
    async fn verify_connectivity(&self, database: &str) -> EnrichResult<()>;

    async fn session(&self, database: &str) -> EnrichResult<Self::Session>;
}
