//! 集成测试共享工具模块
//!
//! 提供一个按脚本应答的内存数据库客户端，以及构造数据条目和结果集的辅助函数。

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use qa_enricher::api::{GraphClient, GraphSession, Params, PROPERTY_KEYS_QUERY};
use qa_enricher::core::{EnrichError, EnrichResult, QueryError, QueryResult, Record, Value};
use qa_enricher::dataset::DatasetItem;

/// 一个数据库的应答脚本
#[derive(Debug, Clone, Default)]
pub struct Script {
    keys: BTreeSet<String>,
    responses: HashMap<String, Result<QueryResult, QueryError>>,
    node_count: i64,
}

impl Script {
    pub fn new(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn respond(mut self, query: &str, result: QueryResult) -> Self {
        self.responses.insert(query.to_string(), Ok(result));
        self
    }

    pub fn fail(mut self, query: &str, error: QueryError) -> Self {
        self.responses.insert(query.to_string(), Err(error));
        self
    }

    pub fn nodes(mut self, count: i64) -> Self {
        self.node_count = count;
        self
    }
}

/// 按脚本应答的客户端；克隆共享同一份执行记录
#[derive(Debug, Clone)]
pub struct ScriptedClient {
    script: Arc<Script>,
    reachable: bool,
    executed: Arc<Mutex<Vec<String>>>,
    sessions: Arc<AtomicUsize>,
}

impl ScriptedClient {
    pub fn new(script: Script) -> Self {
        Self {
            script: Arc::new(script),
            reachable: true,
            executed: Arc::new(Mutex::new(Vec::new())),
            sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new(Script::default())
        }
    }

    /// 按顺序执行过的全部语句，包括属性键查询
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn sessions_opened(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphClient for ScriptedClient {
    type Session = ScriptedSession;

    async fn verify_connectivity(&self, database: &str) -> EnrichResult<()> {
        if self.reachable {
            Ok(())
        } else {
            Err(EnrichError::Connectivity(format!(
                "http://127.0.0.1:7474/db/{}/tx/commit: connection refused",
                database
            )))
        }
    }

    async fn session(&self, _database: &str) -> EnrichResult<ScriptedSession> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedSession {
            script: Arc::clone(&self.script),
            executed: Arc::clone(&self.executed),
        })
    }
}

pub struct ScriptedSession {
    script: Arc<Script>,
    executed: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl GraphSession for ScriptedSession {
    async fn run(&mut self, query: &str, params: &Params) -> EnrichResult<QueryResult> {
        assert!(params.is_empty(), "queries run without parameters");
        self.executed.lock().unwrap().push(query.to_string());

        match self.script.responses.get(query) {
            Some(Ok(result)) => return Ok(result.clone()),
            Some(Err(error)) => return Err(error.clone().into()),
            None => {}
        }
        if query == PROPERTY_KEYS_QUERY {
            return Ok(column(
                "propertyKey",
                self.script.keys.iter().map(|k| Value::from(k.as_str())).collect(),
            ));
        }
        if query.starts_with("MATCH (n) RETURN count(n)") {
            return Ok(column("count", vec![Value::Int(self.script.node_count)]));
        }
        Err(QueryError::rejected(
            "Neo.ClientError.Statement.SyntaxError",
            format!("unscripted query: {}", query),
        )
        .into())
    }
}

/// 单列结果集，每个值一行
pub fn column(name: &str, values: Vec<Value>) -> QueryResult {
    QueryResult::new(
        vec![name.to_string()],
        values
            .into_iter()
            .map(|value| Record::from_pairs([(name, value)]))
            .collect(),
    )
}

pub fn item(question: &str, cypher: &str) -> DatasetItem {
    DatasetItem::new()
        .with("question", question)
        .with("cypher", cypher)
}

pub fn answers(items: &[DatasetItem]) -> Vec<Option<&str>> {
    items.iter().map(|item| item.answer("answer")).collect()
}
