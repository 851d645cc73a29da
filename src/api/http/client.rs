use async_trait::async_trait;
use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde_json::json;
use std::time::Duration;

use crate::api::client::{GraphClient, GraphSession, Params};
use crate::api::http::jolt;
use crate::config::Neo4jConfig;
use crate::core::{EnrichError, EnrichResult, QueryError, QueryResult};

const JOLT_MEDIA_TYPE: &str = "application/vnd.neo4j.jolt+json-seq";
const CONNECTIVITY_QUERY: &str = "RETURN 1";

/// Neo4j client speaking the HTTP transactional API
///
/// The underlying `reqwest::Client` keeps a connection pool that every
/// session shares; dropping the client releases it.
#[derive(Debug, Clone)]
pub struct HttpGraphClient {
    client: Client,
    base: Url,
    user: String,
    password: String,
}

impl HttpGraphClient {
    pub fn new(config: &Neo4jConfig) -> EnrichResult<Self> {
        let mut base = Url::parse(&config.uri)
            .map_err(|e| EnrichError::Config(format!("invalid neo4j uri {:?}: {}", config.uri, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(EnrichError::Config(format!(
                "unsupported scheme {:?} in {}: only the HTTP API (http/https) is supported",
                base.scheme(),
                config.uri
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EnrichError::Connectivity(e.to_string()))?;

        Ok(Self {
            client,
            base,
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Auto-commit endpoint of a database
    pub fn commit_url(&self, database: &str) -> EnrichResult<Url> {
        self.base
            .join(&format!("db/{}/tx/commit", database))
            .map_err(|e| EnrichError::Config(format!("invalid database name {:?}: {}", database, e)))
    }
}

#[async_trait]
impl GraphClient for HttpGraphClient {
    type Session = HttpSession;

    async fn verify_connectivity(&self, database: &str) -> EnrichResult<()> {
        // 走一次完整的带认证查询，401/403 和不存在的数据库都在这里暴露
        let mut session = self.session(database).await?;
        session
            .run(CONNECTIVITY_QUERY, &Params::new())
            .await
            .map_err(|e| EnrichError::Connectivity(format!("{}: {}", session.endpoint, e)))?;
        debug!("Connected to {} (database: {})", self.base, database);
        Ok(())
    }

    async fn session(&self, database: &str) -> EnrichResult<HttpSession> {
        Ok(HttpSession {
            client: self.client.clone(),
            endpoint: self.commit_url(database)?,
            user: self.user.clone(),
            password: self.password.clone(),
        })
    }
}

/// Read-only session on one database
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
    endpoint: Url,
    user: String,
    password: String,
}

#[async_trait]
impl GraphSession for HttpSession {
    async fn run(&mut self, query: &str, params: &Params) -> EnrichResult<QueryResult> {
        let body = json!({
            "statements": [{ "statement": query, "parameters": params }]
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.user, Some(&self.password))
            .header(ACCEPT, JOLT_MEDIA_TYPE)
            .header(CONTENT_TYPE, "application/json")
            .header("access-mode", "READ")
            .json(&body)
            .send()
            .await
            .map_err(QueryError::from)?;

        let status = response.status();
        let text = response.text().await.map_err(QueryError::from)?;
        match status {
            s if s.is_success() => Ok(jolt::parse_response(&text)?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(QueryError::Connection(format!("authentication failed ({})", status)).into())
            }
            _ => Err(QueryError::Protocol(format!("HTTP {}: {}", status, text)).into()),
        }
    }
}
