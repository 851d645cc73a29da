//! 问答数据集补全
//!
//! `QaEnricher` 对数据集中的每一条参考查询执行：
//! 反转义 → 属性键预检 → 在目标数据库执行 → 结果文本化 → 写回答案字段。
//!
//! 任何一步失败都只会让当前条目的答案为 null，条目本身始终保留在输出中；
//! 只有遇到无法文本化的值类型时才终止整批处理。

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value as Json;

use crate::api::client::{GraphClient, GraphSession, Params};
use crate::api::http::HttpGraphClient;
use crate::config::Neo4jConfig;
use crate::core::{EnrichError, EnrichResult, QueryError, ValidationError, Value};
use crate::dataset::DatasetItem;
use crate::query::{find_missing_properties, format_result};
use crate::utils::unescape_query;

pub const DEFAULT_QUERY_FIELD: &str = "cypher";
pub const DEFAULT_ANSWER_FIELD: &str = "answer";

const COUNT_NODES_QUERY: &str = "MATCH (n) RETURN count(n) AS count";

/// 条目处理所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ItemState {
    Pending,
    Unescaped,
    Validated,
    Executed,
    Answered,
    Skipped,
}

/// 条目被跳过的原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// 查询字段缺失、为空或不是字符串
    MissingQuery,
    /// 查询引用了数据库中不存在的属性键
    MissingProperties(Vec<String>),
    /// 获取属性键、执行或解码失败
    Failed(String),
}

/// 单个条目的处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EnrichOutcome {
    /// 查询已执行，`rows` 为 0 时答案为 null
    Answered { rows: usize },
    /// 答案为 null；`at` 为跳过前最后通过的阶段
    Skipped { at: ItemState, reason: SkipReason },
}

impl EnrichOutcome {
    pub fn state(&self) -> ItemState {
        match self {
            EnrichOutcome::Answered { .. } => ItemState::Answered,
            EnrichOutcome::Skipped { .. } => ItemState::Skipped,
        }
    }

    pub fn has_answer(&self) -> bool {
        matches!(self, EnrichOutcome::Answered { rows } if *rows > 0)
    }
}

/// 一次补全的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichStats {
    pub total: usize,
    /// 答案非空
    pub answered: usize,
    /// 执行成功但没有返回行
    pub empty: usize,
    pub missing_query: usize,
    pub missing_properties: usize,
    pub failed: usize,
}

impl EnrichStats {
    pub fn record(&mut self, outcome: &EnrichOutcome) {
        self.total += 1;
        match outcome {
            EnrichOutcome::Answered { rows: 0 } => self.empty += 1,
            EnrichOutcome::Answered { .. } => self.answered += 1,
            EnrichOutcome::Skipped { reason, .. } => match reason {
                SkipReason::MissingQuery => self.missing_query += 1,
                SkipReason::MissingProperties(_) => self.missing_properties += 1,
                SkipReason::Failed(_) => self.failed += 1,
            },
        }
    }

    /// 答案为 null 的条目数
    pub fn unanswered(&self) -> usize {
        self.total - self.answered
    }
}

/// 一次补全的完整输出，`items` 与 `outcomes` 一一对应
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichPass {
    pub items: Vec<DatasetItem>,
    pub outcomes: Vec<EnrichOutcome>,
    pub stats: EnrichStats,
}

/// 绑定到单个数据库的补全器
///
/// 持有数据库客户端；`close` 或 drop 时释放连接。
pub struct QaEnricher<C: GraphClient> {
    client: C,
    database: String,
}

impl QaEnricher<HttpGraphClient> {
    /// 通过 HTTP 接口连接数据库，服务不可达或认证失败时立即失败
    pub async fn connect(config: &Neo4jConfig, database: &str) -> EnrichResult<Self> {
        let client = HttpGraphClient::new(config)?;
        Self::new(client, database).await
    }
}

impl<C: GraphClient> QaEnricher<C> {
    pub async fn new(client: C, database: impl Into<String>) -> EnrichResult<Self> {
        let database = database.into();
        client.verify_connectivity(&database).await?;
        info!("Enricher ready for database {}", database);
        Ok(Self { client, database })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// 使用默认字段 `cypher` / `answer` 补全
    pub async fn enrich_default(&self, items: Vec<DatasetItem>) -> EnrichResult<Vec<DatasetItem>> {
        self.enrich(items, DEFAULT_QUERY_FIELD, DEFAULT_ANSWER_FIELD).await
    }

    /// 为每个条目写入答案字段，输出与输入等长且顺序一致
    pub async fn enrich(
        &self,
        items: Vec<DatasetItem>,
        query_field: &str,
        answer_field: &str,
    ) -> EnrichResult<Vec<DatasetItem>> {
        Ok(self.enrich_with_outcomes(items, query_field, answer_field).await?.items)
    }

    /// 同 `enrich`，并返回每个条目的处理结果和统计
    pub async fn enrich_with_outcomes(
        &self,
        items: Vec<DatasetItem>,
        query_field: &str,
        answer_field: &str,
    ) -> EnrichResult<EnrichPass> {
        let mut session = self.client.session(&self.database).await?;
        info!("Enriching {} items against database {}", items.len(), self.database);

        let mut enriched = Vec::with_capacity(items.len());
        let mut outcomes = Vec::with_capacity(items.len());
        let mut stats = EnrichStats::default();
        for mut item in items {
            let outcome = enrich_item(&mut session, &mut item, query_field, answer_field).await?;
            stats.record(&outcome);
            outcomes.push(outcome);
            enriched.push(item);
        }

        info!(
            "Enrichment finished (database: {}): {} answered, {} empty, {} skipped of {}",
            self.database,
            stats.answered,
            stats.empty,
            stats.missing_query + stats.missing_properties + stats.failed,
            stats.total
        );
        Ok(EnrichPass {
            items: enriched,
            outcomes,
            stats,
        })
    }

    /// 数据库中的节点总数
    pub async fn count_nodes(&self) -> EnrichResult<i64> {
        let mut session = self.client.session(&self.database).await?;
        let result = session.run(COUNT_NODES_QUERY, &Params::new()).await?;
        let first = result.first_column().next();
        match first {
            Some(Some(Value::Int(count))) => Ok(*count),
            other => Err(QueryError::Protocol(format!(
                "{} returned {:?}",
                COUNT_NODES_QUERY, other
            ))
            .into()),
        }
    }

    pub fn close(self) {
        debug!("Closing enricher for database {}", self.database);
    }
}

/// 处理单个条目；只有致命错误才返回 `Err`
pub async fn enrich_item<S>(
    session: &mut S,
    item: &mut DatasetItem,
    query_field: &str,
    answer_field: &str,
) -> EnrichResult<EnrichOutcome>
where
    S: GraphSession + ?Sized,
{
    let raw = match item.get_str(query_field) {
        Some(query) if !query.is_empty() => query.to_string(),
        _ => {
            item.set(answer_field, Json::Null);
            return Ok(EnrichOutcome::Skipped {
                at: ItemState::Pending,
                reason: SkipReason::MissingQuery,
            });
        }
    };

    let query = unescape_query(&raw).unwrap_or_else(|e| {
        debug!("Using query text as written ({}): {}", e, raw);
        raw.clone()
    });

    let mut state = ItemState::Unescaped;
    match answer_query(session, &query, &mut state).await {
        Ok((rows, answer)) => {
            item.set(answer_field, answer.map_or(Json::Null, Json::String));
            Ok(EnrichOutcome::Answered { rows })
        }
        Err(EnrichError::Validation(ValidationError::MissingProperties { keys })) => {
            warn!(
                "Query references missing properties in database: {} | {}",
                keys.join(", "),
                raw
            );
            item.set(answer_field, Json::Null);
            Ok(EnrichOutcome::Skipped {
                at: state,
                reason: SkipReason::MissingProperties(keys),
            })
        }
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!("Error executing query:\n{}\nError: {}", raw, e);
            item.set(answer_field, Json::Null);
            Ok(EnrichOutcome::Skipped {
                at: state,
                reason: SkipReason::Failed(e.to_string()),
            })
        }
    }
}

async fn answer_query<S>(
    session: &mut S,
    query: &str,
    state: &mut ItemState,
) -> EnrichResult<(usize, Option<String>)>
where
    S: GraphSession + ?Sized,
{
    let missing = find_missing_properties(query, session).await?;
    if !missing.is_empty() {
        return Err(ValidationError::MissingProperties {
            keys: missing.into_iter().collect(),
        }
        .into());
    }
    *state = ItemState::Validated;

    let result = session.run(query, &Params::new()).await?;
    *state = ItemState::Executed;
    debug!("{} rows: {}", result.len(), query);

    Ok((result.len(), format_result(&result)))
}
