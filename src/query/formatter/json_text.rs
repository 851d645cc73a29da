//! Python `json.dumps` 兼容的 JSON 文本
//!
//! 已发布的数据集里，答案中的映射是用默认参数的 `json.dumps` 生成的：
//! 分隔符为 `", "` 和 `": "`，所有非 ASCII 字符转义为小写的 `\uXXXX`，
//! BMP 以外的字符拆成代理对。这里通过自定义 `serde_json::ser::Formatter`
//! 复现同样的字节序列。

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::ser::Formatter;
use std::io;

/// 生成与 Python `json.dumps` 默认输出一致的格式化器
#[derive(Debug, Default, Clone, Copy)]
pub struct PyCompatFormatter;

impl Formatter for PyCompatFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// 有序的字符串键值对，序列化时保持给定顺序
struct OrderedEntries<'a>(&'a [(String, String)]);

impl Serialize for OrderedEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// 按给定顺序把键值对渲染成 JSON 对象文本
pub fn dumps_ordered(entries: &[(String, String)]) -> String {
    let mut buffer = Vec::with_capacity(entries.len() * 16 + 2);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, PyCompatFormatter);
    // 写入 Vec<u8> 且键值都是字符串，序列化不会失败
    if OrderedEntries(entries).serialize(&mut serializer).is_err() {
        return String::from("{}");
    }
    // 所有非 ASCII 字符都已转义，输出必为 ASCII
    String::from_utf8(buffer).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
