use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::core::{EnrichError, EnrichResult};

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub neo4j: Neo4jConfig,
    pub dataset: DatasetConfig,
    pub log: LogConfig,
}

/// Connection settings for the Neo4j HTTP endpoint
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub timeout_secs: u64,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "http://localhost:7474".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j_test_password".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Input/output layout of a dataset build
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    /// JSON Lines file with `question`, `schema`, `database` and `cypher` fields
    pub input: String,
    pub output_dir: String,
    pub query_field: String,
    pub answer_field: String,
    pub sources: Vec<SourceConfig>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        let sources = ["twitch", "movies", "fincen", "northwind", "recommendations"]
            .into_iter()
            .map(|name| SourceConfig {
                name: name.to_string(),
                database: format!("{}-50", name),
            })
            .collect();
        Self {
            input: "datasets/text2cypher.jsonl".to_string(),
            output_dir: "datasets".to_string(),
            query_field: "cypher".to_string(),
            answer_field: "answer".to_string(),
            sources,
        }
    }
}

/// One database the dataset is enriched against
///
/// `name` is matched against each item's database alias, `database` is the
/// name of the Neo4j database the queries run in.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub database: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "qa-enricher".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> EnrichResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| EnrichError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> EnrichResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Overrides connection settings from `NEO4J_URI`, `NEO4J_USER` and `NEO4J_PASSWORD`
    pub fn apply_env(&mut self) {
        if let Ok(uri) = env::var("NEO4J_URI") {
            self.neo4j.uri = uri;
        }
        if let Ok(user) = env::var("NEO4J_USER") {
            self.neo4j.user = user;
        }
        if let Ok(password) = env::var("NEO4J_PASSWORD") {
            self.neo4j.password = password;
        }
    }

    pub fn validate(&self) -> EnrichResult<()> {
        if self.dataset.query_field.is_empty() || self.dataset.answer_field.is_empty() {
            return Err(EnrichError::Config(
                "dataset.query_field and dataset.answer_field must not be empty".to_string(),
            ));
        }
        if let Some(source) = self
            .dataset
            .sources
            .iter()
            .find(|s| s.name.is_empty() || s.database.is_empty())
        {
            return Err(EnrichError::Config(format!(
                "dataset source {:?} needs both a name and a database",
                source
            )));
        }
        Ok(())
    }
}
