//! Jolt response decoding
//!
//! With `Accept: application/vnd.neo4j.jolt+json-seq` the transactional
//! endpoint streams one JSON event per line (optionally prefixed by the
//! record separator `0x1E`):
//!
//! ```text
//! {"header":{"fields":["m.title","m.released"]}}
//! {"data":[{"U":"Heat"},{"Z":"1995"}]}
//! {"summary":{}}
//! {"info":{}}
//! ```
//!
//! Values carry a one-key sigil object (`Z` integer, `R` float, `U` string,
//! `T` temporal, `()` node, `->` relationship, ...). Sparse mode unwraps
//! plain JSON strings, booleans, small integers and lists, so both forms are
//! accepted.

use serde_json::Value as Json;

use crate::core::{
    DateTimeValue, DateValue, DurationValue, Node, PropertyMap, QueryError, QueryResult, Record,
    Relationship, TimeValue, Value,
};

/// Decodes a whole response body into the result of its (single) statement
pub fn parse_response(body: &str) -> Result<QueryResult, QueryError> {
    let mut columns: Option<Vec<String>> = None;
    let mut records = Vec::new();

    for line in body.split(['\u{1e}', '\n']) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: Json = serde_json::from_str(line)
            .map_err(|e| QueryError::Protocol(format!("malformed response event: {}", e)))?;
        let Json::Object(event) = event else {
            return Err(QueryError::Protocol(format!("unexpected response event: {}", line)));
        };

        if let Some(error) = event.get("error") {
            return Err(error_from(error));
        }
        if let Some(errors) = event.get("errors") {
            // 服务端忽略 Accept 时返回的普通 JSON 格式
            if let Some(first) = errors.as_array().and_then(|e| e.first()) {
                return Err(rejected_from(first));
            }
        }
        if let Some(header) = event.get("header") {
            columns = Some(header_fields(header)?);
        } else if let Some(data) = event.get("data") {
            let fields = columns.as_ref().ok_or_else(|| {
                QueryError::Protocol("data event received before header".to_string())
            })?;
            let Json::Array(values) = data else {
                return Err(QueryError::Protocol(format!("data event is not a list: {}", data)));
            };
            let values = values.iter().map(decode_value).collect::<Result<Vec<_>, _>>()?;
            records.push(Record::new(fields, values));
        } else if event.contains_key("results") {
            return Err(QueryError::Protocol(
                "server answered with plain JSON instead of Jolt".to_string(),
            ));
        }
    }

    Ok(QueryResult::new(columns.unwrap_or_default(), records))
}

fn header_fields(header: &Json) -> Result<Vec<String>, QueryError> {
    header
        .get("fields")
        .and_then(Json::as_array)
        .ok_or_else(|| QueryError::Protocol(format!("header without fields: {}", header)))?
        .iter()
        .map(|field| {
            field
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| QueryError::Protocol(format!("non-string field name: {}", field)))
        })
        .collect()
}

fn error_from(error: &Json) -> QueryError {
    match error.get("errors").and_then(Json::as_array).and_then(|e| e.first()) {
        Some(first) => rejected_from(first),
        None => QueryError::Protocol(format!("error event without details: {}", error)),
    }
}

fn rejected_from(error: &Json) -> QueryError {
    let text = |key: &str| {
        error
            .get(key)
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string()
    };
    QueryError::rejected(text("code"), text("message"))
}

/// Decodes one Jolt value
pub fn decode_value(json: &Json) -> Result<Value, QueryError> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Int(i)),
            None => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| QueryError::Protocol(format!("number out of range: {}", n))),
        },
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Array(items) => decode_list(items),
        Json::Object(object) => {
            if object.len() == 1 {
                if let Some((sigil, payload)) = object.iter().next() {
                    if let Some(value) = decode_sigil(sigil, payload)? {
                        return Ok(value);
                    }
                }
            }
            decode_map(object).map(Value::Map)
        }
    }
}

/// Returns `None` when the key is not a Jolt sigil (a plain one-entry map)
fn decode_sigil(sigil: &str, payload: &Json) -> Result<Option<Value>, QueryError> {
    let value = match sigil {
        "?" => Value::Bool(match payload {
            Json::Bool(b) => *b,
            Json::String(s) if s == "true" => true,
            Json::String(s) if s == "false" => false,
            _ => return Err(malformed("boolean", payload)),
        }),
        "Z" => Value::Int(match payload {
            Json::Number(n) => n.as_i64().ok_or_else(|| malformed("integer", payload))?,
            Json::String(s) => s.parse().map_err(|_| malformed("integer", payload))?,
            _ => return Err(malformed("integer", payload)),
        }),
        "R" => Value::Float(match payload {
            Json::Number(n) => n.as_f64().ok_or_else(|| malformed("float", payload))?,
            Json::String(s) => parse_float(s).ok_or_else(|| malformed("float", payload))?,
            _ => return Err(malformed("float", payload)),
        }),
        "U" => Value::String(
            payload
                .as_str()
                .ok_or_else(|| malformed("string", payload))?
                .to_string(),
        ),
        "T" => decode_temporal(payload)?,
        "[]" => match payload {
            Json::Array(items) => decode_list(items)?,
            _ => return Err(malformed("list", payload)),
        },
        "{}" => match payload {
            Json::Object(object) => Value::Map(decode_map(object)?),
            _ => return Err(malformed("map", payload)),
        },
        "()" => decode_node(payload)?,
        "->" | "<-" => decode_relationship(sigil, payload)?,
        ".." => return Err(QueryError::UnsupportedValue("path".to_string())),
        "@" => return Err(QueryError::UnsupportedValue("point".to_string())),
        "#" => return Err(QueryError::UnsupportedValue("byte array".to_string())),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn decode_list(items: &[Json]) -> Result<Value, QueryError> {
    items
        .iter()
        .map(decode_value)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

fn decode_map(object: &serde_json::Map<String, Json>) -> Result<PropertyMap, QueryError> {
    let mut map = PropertyMap::new();
    for (key, value) in object {
        map.insert(key.clone(), decode_value(value)?);
    }
    Ok(map)
}

/// `{"()": [id, [labels...], {props}]}`
fn decode_node(payload: &Json) -> Result<Value, QueryError> {
    let Some([id, labels, properties]) = payload.as_array().map(Vec::as_slice) else {
        return Err(malformed("node", payload));
    };
    let labels = labels
        .as_array()
        .ok_or_else(|| malformed("node labels", labels))?
        .iter()
        .map(|label| {
            label
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| malformed("node label", label))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Node::new(element_id(id)?, labels, decode_properties(properties)?).into())
}

/// `{"->": [id, start, type, end, {props}]}`, `<-` lists the end node first
fn decode_relationship(sigil: &str, payload: &Json) -> Result<Value, QueryError> {
    let Some([id, first, rel_type, second, properties]) = payload.as_array().map(Vec::as_slice) else {
        return Err(malformed("relationship", payload));
    };
    let (start, end) = if sigil == "->" { (first, second) } else { (second, first) };
    let rel_type = rel_type
        .as_str()
        .ok_or_else(|| malformed("relationship type", rel_type))?;
    Ok(Relationship::new(
        element_id(id)?,
        element_id(start)?,
        rel_type,
        element_id(end)?,
        decode_properties(properties)?,
    )
    .into())
}

fn decode_properties(properties: &Json) -> Result<PropertyMap, QueryError> {
    match properties {
        Json::Object(object) => decode_map(object),
        _ => Err(malformed("properties", properties)),
    }
}

fn element_id(id: &Json) -> Result<String, QueryError> {
    match id {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) => Ok(n.to_string()),
        _ => Err(malformed("element id", id)),
    }
}

/// 所有时间类型共用 `T` 标记，按文本形状区分
fn decode_temporal(payload: &Json) -> Result<Value, QueryError> {
    let text = payload.as_str().ok_or_else(|| malformed("temporal", payload))?;
    let decoded = if text.starts_with('P') || text.starts_with("-P") {
        DurationValue::parse_iso(text).map(Value::Duration)
    } else if text.contains('T') {
        DateTimeValue::parse_iso(text).map(Value::DateTime)
    } else if text.contains(':') {
        TimeValue::parse_iso(text).map(Value::Time)
    } else {
        DateValue::parse_iso(text).map(Value::Date)
    };
    decoded.ok_or_else(|| malformed("temporal", payload))
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => text.parse().ok(),
    }
}

fn malformed(kind: &str, payload: &Json) -> QueryError {
    QueryError::Protocol(format!("malformed {} value: {}", kind, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_scalar_rows() {
        let body = "\u{1e}{\"header\":{\"fields\":[\"m.title\",\"m.released\"]}}\n\
                    \u{1e}{\"data\":[{\"U\":\"Heat\"},{\"Z\":\"1995\"}]}\n\
                    \u{1e}{\"data\":[\"Ronin\",1998]}\n\
                    \u{1e}{\"summary\":{}}\n\
                    \u{1e}{\"info\":{}}\n";
        let result = parse_response(body).expect("parse response");
        assert_eq!(result.columns, ["m.title", "m.released"]);
        assert_eq!(result.len(), 2);
        assert_eq!(result.records[0].get("m.title"), Some(&Value::from("Heat")));
        assert_eq!(result.records[1].get("m.released"), Some(&Value::Int(1998)));
    }

    #[test]
    fn test_parse_error_event() {
        let body = "{\"error\":{\"errors\":[{\"code\":\"Neo.ClientError.Statement.SyntaxError\",\"message\":\"Invalid input\"}]}}\n";
        let err = parse_response(body).expect_err("error event");
        assert_eq!(
            err,
            QueryError::rejected("Neo.ClientError.Statement.SyntaxError", "Invalid input")
        );
    }

    #[test]
    fn test_data_before_header_is_protocol_error() {
        let err = parse_response("{\"data\":[1]}").expect_err("missing header");
        assert!(matches!(err, QueryError::Protocol(_)));
    }

    #[test]
    fn test_decode_node_keeps_property_order() {
        let value = decode_value(&json!({"()": [4, ["Person"], {"name": {"U": "Keanu Reeves"}, "born": {"Z": "1964"}}]}))
            .expect("decode node");
        let Value::Node(node) = value else {
            panic!("expected node, got {:?}", value);
        };
        assert_eq!(node.element_id, "4");
        assert!(node.has_label("Person"));
        let keys: Vec<&String> = node.properties.keys().collect();
        assert_eq!(keys, ["name", "born"]);
        assert_eq!(node.properties.get("born"), Some(&Value::Int(1964)));
    }

    #[test]
    fn test_decode_relationship_directions() {
        let forward = decode_value(&json!({"->": [7, 1, "ACTED_IN", 2, {"roles": {"[]": [{"U": "Neo"}]}}]}))
            .expect("decode relationship");
        let backward = decode_value(&json!({"<-": [7, 2, "ACTED_IN", 1, {"roles": ["Neo"]}]}))
            .expect("decode relationship");
        assert_eq!(forward, backward);
        let Value::Relationship(rel) = forward else {
            panic!("expected relationship");
        };
        assert_eq!((rel.start_id.as_str(), rel.end_id.as_str()), ("1", "2"));
        assert_eq!(rel.rel_type, "ACTED_IN");
    }

    #[test]
    fn test_decode_temporals() {
        assert!(matches!(decode_value(&json!({"T": "2020-01-31"})), Ok(Value::Date(_))));
        assert!(matches!(decode_value(&json!({"T": "12:00:00Z"})), Ok(Value::Time(_))));
        assert!(matches!(
            decode_value(&json!({"T": "2020-01-31T12:00:00+01:00"})),
            Ok(Value::DateTime(_))
        ));
        assert!(matches!(decode_value(&json!({"T": "P14DT16H12M"})), Ok(Value::Duration(_))));
        assert!(matches!(decode_value(&json!({"T": "yesterday"})), Err(QueryError::Protocol(_))));
    }

    #[test]
    fn test_decode_floats_and_maps() {
        assert_eq!(decode_value(&json!({"R": "1.5"})), Ok(Value::Float(1.5)));
        assert!(matches!(decode_value(&json!({"R": "NaN"})), Ok(Value::Float(f)) if f.is_nan()));
        let map = decode_value(&json!({"{}": {"a": {"Z": "1"}, "b": null}})).expect("decode map");
        assert_eq!(map, Value::Map(PropertyMap::new().with("a", 1i64).with("b", Value::Null)));
        // 非标记的单键对象按普通映射处理
        let plain = decode_value(&json!({"title": "Heat"})).expect("decode plain map");
        assert_eq!(plain, Value::Map(PropertyMap::new().with("title", "Heat")));
    }

    #[test]
    fn test_unsupported_values_are_rejected() {
        for payload in [
            json!({"..": [{"()": [1, [], {}]}]}),
            json!({"@": "SRID=4326;POINT(1 2)"}),
            json!({"#": "0A0B"}),
        ] {
            assert!(matches!(
                decode_value(&payload),
                Err(QueryError::UnsupportedValue(_))
            ));
        }
    }
}
