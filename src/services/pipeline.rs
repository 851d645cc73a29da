//! 数据集构建流程
//!
//! 按配置中的数据源逐个处理：筛出属于该数据源的条目，连接对应的数据库补全答案，
//! 分别写出"全部条目"和"仅有答案的条目"两个文件，最后汇总写出全量文件。

use async_trait::async_trait;
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::api::client::GraphClient;
use crate::api::http::HttpGraphClient;
use crate::config::{DatasetConfig, Neo4jConfig, SourceConfig};
use crate::core::EnrichResult;
use crate::dataset::{read_jsonl, write_jsonl, DatasetItem};
use crate::services::enricher::{EnrichStats, QaEnricher};

/// 为每个数据源创建补全器
#[async_trait]
pub trait EnricherFactory: Send + Sync {
    type Client: GraphClient;

    async fn create(&self, database: &str) -> EnrichResult<QaEnricher<Self::Client>>;
}

/// 通过 HTTP 接口连接同一个服务器上的不同数据库
#[derive(Debug, Clone)]
pub struct HttpEnricherFactory {
    config: Neo4jConfig,
}

impl HttpEnricherFactory {
    pub fn new(config: Neo4jConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EnricherFactory for HttpEnricherFactory {
    type Client = HttpGraphClient;

    async fn create(&self, database: &str) -> EnrichResult<QaEnricher<HttpGraphClient>> {
        QaEnricher::connect(&self.config, database).await
    }
}

/// 单个数据源的构建结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub name: String,
    pub database: String,
    /// 数据库节点数，获取失败时为 None
    pub node_count: Option<i64>,
    pub stats: EnrichStats,
    /// 答案非 null 的条目数
    pub filtered: usize,
}

/// 整个构建的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub sources: Vec<SourceReport>,
    pub unfiltered_total: usize,
    pub filtered_total: usize,
}

/// `{out}/{name}/questions_and_answers_{name}_{filtered|unfiltered}.jsonl`
pub fn source_output_path(output_dir: &Path, source: &str, filtered: bool) -> PathBuf {
    output_dir.join(source).join(format!(
        "questions_and_answers_{}_{}.jsonl",
        source,
        suffix(filtered)
    ))
}

/// `{out}/full_questions_and_answers_{filtered|unfiltered}.jsonl`
pub fn full_output_path(output_dir: &Path, filtered: bool) -> PathBuf {
    output_dir.join(format!("full_questions_and_answers_{}.jsonl", suffix(filtered)))
}

fn suffix(filtered: bool) -> &'static str {
    if filtered {
        "filtered"
    } else {
        "unfiltered"
    }
}

pub struct DatasetBuilder<F: EnricherFactory> {
    factory: F,
    config: DatasetConfig,
}

impl<F: EnricherFactory> DatasetBuilder<F> {
    pub fn new(factory: F, config: DatasetConfig) -> Self {
        Self { factory, config }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// 读取配置中的输入文件并构建
    pub async fn build_from_input(&self) -> EnrichResult<BuildReport> {
        let items = read_jsonl(&self.config.input)?;
        info!("Loaded {} rows from {}", items.len(), self.config.input);
        self.build(&items).await
    }

    pub async fn build(&self, items: &[DatasetItem]) -> EnrichResult<BuildReport> {
        let output_dir = Path::new(&self.config.output_dir);
        let mut report = BuildReport::default();
        let mut all_unfiltered = Vec::new();
        let mut all_filtered = Vec::new();

        for source in &self.config.sources {
            let (source_report, unfiltered, filtered) = self.build_source(source, items).await?;
            write_jsonl(source_output_path(output_dir, &source.name, true), &filtered)?;
            write_jsonl(source_output_path(output_dir, &source.name, false), &unfiltered)?;

            all_filtered.extend(filtered);
            all_unfiltered.extend(unfiltered);
            report.sources.push(source_report);
        }

        write_jsonl(full_output_path(output_dir, true), &all_filtered)?;
        write_jsonl(full_output_path(output_dir, false), &all_unfiltered)?;
        report.filtered_total = all_filtered.len();
        report.unfiltered_total = all_unfiltered.len();

        info!(
            "Dataset build finished: {} unfiltered, {} filtered",
            report.unfiltered_total, report.filtered_total
        );
        Ok(report)
    }

    async fn build_source(
        &self,
        source: &SourceConfig,
        items: &[DatasetItem],
    ) -> EnrichResult<(SourceReport, Vec<DatasetItem>, Vec<DatasetItem>)> {
        let selected: Vec<DatasetItem> = items
            .iter()
            .filter(|item| item.matches_source(&source.name))
            .cloned()
            .collect();
        info!(
            "Source {} (database: {}): {} items selected",
            source.name,
            source.database,
            selected.len()
        );

        let enricher = self.factory.create(&source.database).await?;
        let node_count = match enricher.count_nodes().await {
            Ok(count) => {
                info!("Database {} has {} nodes", source.database, count);
                Some(count)
            }
            Err(e) => {
                warn!("Cannot count nodes in {}: {}", source.database, e);
                None
            }
        };

        let pass = enricher
            .enrich_with_outcomes(selected, &self.config.query_field, &self.config.answer_field)
            .await?;
        enricher.close();

        let answer_field = self.config.answer_field.as_str();
        let filtered: Vec<DatasetItem> = pass
            .items
            .iter()
            .filter(|item| item.get(answer_field).is_some_and(|answer| !answer.is_null()))
            .cloned()
            .collect();
        info!(
            "Source {}: {} items enriched, {} with answers",
            source.name,
            pass.items.len(),
            filtered.len()
        );

        let source_report = SourceReport {
            name: source.name.clone(),
            database: source.database.clone(),
            node_count,
            stats: pass.stats,
            filtered: filtered.len(),
        };
        Ok((source_report, pass.items, filtered))
    }
}

impl DatasetBuilder<HttpEnricherFactory> {
    pub fn http(neo4j: Neo4jConfig, dataset: DatasetConfig) -> Self {
        Self::new(HttpEnricherFactory::new(neo4j), dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths() {
        let out = Path::new("datasets");
        assert_eq!(
            source_output_path(out, "movies", true),
            PathBuf::from("datasets/movies/questions_and_answers_movies_filtered.jsonl")
        );
        assert_eq!(
            source_output_path(out, "movies", false),
            PathBuf::from("datasets/movies/questions_and_answers_movies_unfiltered.jsonl")
        );
        assert_eq!(
            full_output_path(out, true),
            PathBuf::from("datasets/full_questions_and_answers_filtered.jsonl")
        );
        assert_eq!(
            full_output_path(out, false),
            PathBuf::from("datasets/full_questions_and_answers_unfiltered.jsonl")
        );
    }
}
