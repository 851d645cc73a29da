//! 值的文本化
//!
//! 把查询返回的任意 `Value` 递归渲染成一段确定的文本。渲染规则：
//!
//! - 时间类型：ISO-8601 文本，小数秒固定 9 位
//! - 节点、关系、映射：逐个属性生成片段，见 [`stringify_entries`]
//! - 列表：全为标量时渲染成 `['a','1','b']`，否则逐项渲染后按行拼接
//! - 标量：字符串原样输出，布尔值为 `True`/`False`，null 为 `None`
//!
//! 同一个值总是得到同一段文本，不依赖调用次数或外部状态。

use crate::core::{PropertyMap, Value};
use crate::query::formatter::json_text::dumps_ordered;
use crate::utils::strip_namespace;

/// 渲染单个值
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::from("None"),
        Value::Bool(true) => String::from("True"),
        Value::Bool(false) => String::from("False"),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => float_text(*f),
        Value::String(s) => s.clone(),
        Value::Date(d) => d.iso_format(),
        Value::Time(t) => t.iso_format(),
        Value::DateTime(dt) => dt.iso_format(),
        Value::Duration(d) => d.iso_format(),
        Value::List(items) => stringify_list(items),
        Value::Node(node) => stringify_map(&node.properties),
        Value::Relationship(rel) => stringify_map(&rel.properties),
        Value::Map(map) => stringify_map(map),
    }
}

fn stringify_map(map: &PropertyMap) -> String {
    stringify_entries(map.iter().map(|(k, v)| (k.as_str(), v)))
}

/// 一个属性渲染出的片段
enum Fragment {
    /// 单字符键下的结构化值，直接展开
    Bare(String),
    /// 去掉命名空间前缀的键和值的文本
    Keyed(String, String),
}

/// 渲染一组有序的键值对（节点属性、映射或结果行）
///
/// 键只有一个字符且值需要结构化展开时（如 `RETURN n` 中的 `n`），
/// 生成裸片段；否则生成 `去前缀的键 -> 值文本` 片段。
///
/// - 存在裸片段时，所有片段的文本以单个空格拼接，键片段只贡献值文本
/// - 否则合并键片段：同名键保留最先出现的值，最后声明的键排在最前，
///   渲染成 `json.dumps` 兼容的对象文本
pub(crate) fn stringify_entries<'a>(entries: impl Iterator<Item = (&'a str, &'a Value)>) -> String {
    let fragments: Vec<Fragment> = entries
        .map(|(key, value)| {
            if key.chars().count() == 1 && value.is_entity_like() {
                Fragment::Bare(stringify(value))
            } else {
                Fragment::Keyed(strip_namespace(key).to_string(), stringify(value))
            }
        })
        .collect();

    if fragments.iter().any(|f| matches!(f, Fragment::Bare(_))) {
        let texts: Vec<String> = fragments
            .into_iter()
            .map(|fragment| match fragment {
                Fragment::Bare(text) | Fragment::Keyed(_, text) => text,
            })
            .collect();
        return texts.join(" ");
    }

    let keyed = fragments.into_iter().filter_map(|fragment| match fragment {
        Fragment::Keyed(key, text) => Some((key, text)),
        Fragment::Bare(_) => None,
    });
    dumps_ordered(&merge_front(keyed))
}

/// 每个新片段放在最前面，已有的同名键位置随之前移但保留原来的值
fn merge_front(fragments: impl Iterator<Item = (String, String)>) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = Vec::new();
    for (key, text) in fragments {
        let mut next = Vec::with_capacity(merged.len() + 1);
        next.push((key, text));
        for (existing_key, existing_text) in merged {
            if existing_key == next[0].0 {
                next[0].1 = existing_text;
            } else {
                next.push((existing_key, existing_text));
            }
        }
        merged = next;
    }
    merged
}

fn stringify_list(items: &[Value]) -> String {
    if items.iter().all(Value::is_scalar) {
        let quoted: Vec<String> = items
            .iter()
            .map(|item| format!("'{}'", stringify(item)))
            .collect();
        format!("[{}]", quoted.join(","))
    } else {
        items.iter().map(stringify).collect::<Vec<_>>().join("\n")
    }
}

/// 浮点数的最短往返表示
///
/// 整数值带 `.0`；十进制指数不在 `[-4, 16)` 内时使用科学计数法，
/// 指数至少两位并带符号，如 `1e+16`、`1.5e-07`。
pub(crate) fn float_text(f: f64) -> String {
    if f.is_nan() {
        return String::from("nan");
    }
    if f.is_infinite() {
        return String::from(if f > 0.0 { "inf" } else { "-inf" });
    }

    // `{:e}` 给出最短往返的有效数字，如 `-1.2345e3`、`0e0`
    let scientific = format!("{:e}", f);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };
    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let sign = if negative { "-" } else { "" };

    if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() <= int_len {
                format!("{}{}{}.0", sign, digits, "0".repeat(int_len - digits.len()))
            } else {
                format!("{}{}.{}", sign, &digits[..int_len], &digits[int_len..])
            }
        } else {
            let leading_zeros = (-exponent - 1) as usize;
            format!("{}0.{}{}", sign, "0".repeat(leading_zeros), digits)
        }
    } else {
        let (head, tail) = digits.split_at(1);
        let mantissa_text = if tail.is_empty() {
            head.to_string()
        } else {
            format!("{}.{}", head, tail)
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{}{}e{}{:02}", sign, mantissa_text, exp_sign, exponent.abs())
    }
}
