//! 属性键预检
//!
//! 在执行查询之前，找出查询文本中引用了、但数据库里从未声明过的属性键。
//!
//! 这是纯文本层面的启发式扫描，不解析 Cypher 语法：
//! - 只识别 `标识符.标识符` 形式（如 `m.title`），取点号后面的部分
//! - `m['title']`、`properties(m).title` 这类写法不会被扫描到，可能漏报
//! - 字符串或数字字面量里的点号（如 `1.5`）也会被扫描，可能误报
//!
//! 结果为空只代表"没有发现缺失的键"，不代表查询正确。

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::api::client::GraphSession;
use crate::core::EnrichResult;

fn property_access_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b\w+\.(\w+)").expect("property access pattern is a valid regex")
    })
}

/// 提取查询文本中所有被访问的属性名
pub fn referenced_properties(query: &str) -> BTreeSet<String> {
    property_access_pattern()
        .captures_iter(query)
        .filter_map(|captures| captures.get(1))
        .map(|key| key.as_str().to_string())
        .collect()
}

/// 返回查询引用了、但数据库没有声明的属性键
///
/// 查询没有引用任何属性时不访问数据库；否则只查询一次属性键快照，
/// 再用这份快照比较所有引用。获取快照失败时返回错误，而不是当作"没有缺失"。
pub async fn find_missing_properties<S>(query: &str, session: &mut S) -> EnrichResult<BTreeSet<String>>
where
    S: GraphSession + ?Sized,
{
    let referenced = referenced_properties(query);
    if referenced.is_empty() {
        return Ok(BTreeSet::new());
    }

    let declared = session.property_keys().await?;
    Ok(referenced.difference(&declared).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::{Params, PROPERTY_KEYS_QUERY};
    use crate::core::{EnrichError, QueryError, QueryResult, Record};
    use async_trait::async_trait;

    /// 只回答属性键查询的会话
    struct KeysOnlySession {
        keys: Option<Vec<&'static str>>,
        calls: usize,
    }

    #[async_trait]
    impl GraphSession for KeysOnlySession {
        async fn run(&mut self, query: &str, _params: &Params) -> EnrichResult<QueryResult> {
            assert_eq!(query, PROPERTY_KEYS_QUERY);
            self.calls += 1;
            match &self.keys {
                Some(keys) => Ok(QueryResult::new(
                    vec!["propertyKey".to_string()],
                    keys.iter().map(|k| Record::from_pairs([("propertyKey", *k)])).collect(),
                )),
                None => Err(QueryError::Connection("connection reset".to_string()).into()),
            }
        }
    }

    #[test]
    fn test_referenced_properties() {
        let query = "MATCH (m:Movie)<-[r:ACTED_IN]-(p) WHERE m.released > 1990 RETURN p.name, r.roles";
        let keys: Vec<String> = referenced_properties(query).into_iter().collect();
        assert_eq!(keys, ["name", "released", "roles"]);
    }

    #[test]
    fn test_heuristic_edges() {
        // 方括号访问不会被识别
        assert!(referenced_properties("MATCH (m) RETURN m['title']").is_empty());
        // 数字字面量中的点号会被识别
        assert!(referenced_properties("RETURN 1.5").contains("5"));
        // 只取第一层点号后的名字
        assert_eq!(
            referenced_properties("RETURN a.b.c").into_iter().collect::<Vec<_>>(),
            ["b"]
        );
    }

    #[tokio::test]
    async fn test_missing_key_detected() {
        let mut session = KeysOnlySession {
            keys: Some(vec!["name", "age"]),
            calls: 0,
        };
        let missing = find_missing_properties("MATCH (m) WHERE m.ghost = 1 RETURN m", &mut session)
            .await
            .expect("keys fetched");
        assert_eq!(missing.into_iter().collect::<Vec<_>>(), ["ghost"]);
        assert_eq!(session.calls, 1);
    }

    #[tokio::test]
    async fn test_no_references_skips_database() {
        let mut session = KeysOnlySession { keys: None, calls: 0 };
        let missing = find_missing_properties("MATCH (n) RETURN count(n)", &mut session)
            .await
            .expect("no database round-trip");
        assert!(missing.is_empty());
        assert_eq!(session.calls, 0);
    }

    #[tokio::test]
    async fn test_key_fetch_failure_is_an_error() {
        let mut session = KeysOnlySession { keys: None, calls: 0 };
        let err = find_missing_properties("MATCH (n) RETURN n.name", &mut session)
            .await
            .expect_err("key fetch failed");
        assert!(matches!(err, EnrichError::Query(QueryError::Connection(_))));
    }
}
