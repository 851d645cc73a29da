use crate::core::{QueryResult, Record};
use crate::query::formatter::stringifier::stringify_entries;

/// 把一行结果按映射规则渲染成文本
pub fn stringify_record(record: &Record) -> String {
    stringify_entries(record.iter().map(|(column, value)| (column.as_str(), value)))
}

/// 把整个结果集渲染成答案文本
///
/// 没有行时返回 `None`；只有一行时返回该行文本；多行时按返回顺序用换行拼接。
/// 不做过滤，也不去重。
pub fn format_result(result: &QueryResult) -> Option<String> {
    match result.records.as_slice() {
        [] => None,
        [only] => Some(stringify_record(only)),
        records => Some(
            records
                .iter()
                .map(stringify_record)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Node, PropertyMap, Value};

    fn titles(names: &[&str]) -> QueryResult {
        QueryResult::new(
            vec!["m.title".to_string()],
            names
                .iter()
                .map(|name| Record::from_pairs([("m.title", *name)]))
                .collect(),
        )
    }

    #[test]
    fn test_zero_rows() {
        assert_eq!(format_result(&QueryResult::empty()), None);
    }

    #[test]
    fn test_single_row() {
        assert_eq!(
            format_result(&titles(&["Heat"])).as_deref(),
            Some(r#"{"title": "Heat"}"#)
        );
    }

    #[test]
    fn test_many_rows_joined_in_order() {
        assert_eq!(
            format_result(&titles(&["Heat", "Ronin", "Heat"])).as_deref(),
            Some("{\"title\": \"Heat\"}\n{\"title\": \"Ronin\"}\n{\"title\": \"Heat\"}")
        );
    }

    #[test]
    fn test_node_column_is_expanded() {
        let person = Node::new(
            "4:p:1",
            vec!["Person".to_string()],
            PropertyMap::new().with("name", "Tom Hanks").with("born", 1956i64),
        );
        let result = QueryResult::new(
            vec!["p".to_string()],
            vec![Record::from_pairs([("p", person)])],
        );
        assert_eq!(
            format_result(&result).as_deref(),
            Some(r#"{"born": "1956", "name": "Tom Hanks"}"#)
        );
    }

    #[test]
    fn test_aggregate_columns() {
        let record = Record::from_pairs([
            ("p.name", Value::from("Tom Hanks")),
            ("movies", Value::Int(12)),
        ]);
        let result = QueryResult::new(vec!["p.name".to_string(), "movies".to_string()], vec![record]);
        assert_eq!(
            format_result(&result).as_deref(),
            Some(r#"{"movies": "12", "name": "Tom Hanks"}"#)
        );
    }

    #[test]
    fn test_empty_record_renders_empty_object() {
        let result = QueryResult::new(vec![], vec![Record::default()]);
        assert_eq!(format_result(&result).as_deref(), Some("{}"));
    }
}
