//! 查询结果
//!
//! `Record` 是一行结果（列名到值的有序映射），`QueryResult` 是一次执行返回的全部行。

use crate::core::value::{PropertyMap, Value};

/// One result row: column name to value, in column order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: PropertyMap,
}

impl Record {
    pub fn new(columns: &[String], values: Vec<Value>) -> Self {
        Self {
            fields: columns.iter().cloned().zip(values).collect(),
        }
    }

    pub fn from_pairs<K: Into<String>, V: Into<Value>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            fields: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_map(&self) -> &PropertyMap {
        &self.fields
    }
}

/// Rows returned by a single query execution, in server order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Values of the first column in row order
    pub fn first_column(&self) -> impl Iterator<Item = Option<&Value>> {
        self.records.iter().map(|record| record.values().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_column_order() {
        let columns = vec!["m.title".to_string(), "m.released".to_string()];
        let record = Record::new(&columns, vec![Value::from("Heat"), Value::Int(1995)]);
        let keys: Vec<&String> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["m.title", "m.released"]);
        assert_eq!(record.get("m.released"), Some(&Value::Int(1995)));
    }

    #[test]
    fn test_first_column() {
        let result = QueryResult::new(
            vec!["key".to_string()],
            vec![
                Record::from_pairs([("key", "name")]),
                Record::from_pairs([("key", "age")]),
            ],
        );
        let firsts: Vec<Option<&str>> = result.first_column().map(|v| v.and_then(Value::as_str)).collect();
        assert_eq!(firsts, [Some("name"), Some("age")]);
    }
}
