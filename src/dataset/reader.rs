//! JSON Lines 数据集读取

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::core::{EnrichError, EnrichResult};
use crate::dataset::DatasetItem;

/// 读取 JSONL 文件，每个非空行是一个 JSON 对象
///
/// 解析失败时错误信息带上文件名和行号（从 1 开始）。
pub fn read_jsonl(path: impl AsRef<Path>) -> EnrichResult<Vec<DatasetItem>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| EnrichError::Io(format!("cannot open {}: {}", path.display(), e)))?;
    parse_lines(BufReader::new(file), &path.display().to_string())
}

fn parse_lines<R: BufRead>(reader: R, source: &str) -> EnrichResult<Vec<DatasetItem>> {
    let mut items = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str::<DatasetItem>(&line).map_err(|e| {
            EnrichError::Serialization(format!("{}:{}: {}", source, index + 1, e))
        })?;
        items.push(item);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_skips_blank_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"question":"q1","cypher":"RETURN 1"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"question":"q2","cypher":"RETURN 2"}}"#).unwrap();

        let items = read_jsonl(file.path()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].get_str("question"), Some("q2"));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let input = "{\"question\":\"ok\"}\nnot json\n";
        let err = parse_lines(input.as_bytes(), "input.jsonl").unwrap_err();
        match err {
            EnrichError::Serialization(message) => assert!(message.starts_with("input.jsonl:2:")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = read_jsonl("/nonexistent/dataset.jsonl").unwrap_err();
        assert!(matches!(err, EnrichError::Io(_)));
    }
}
