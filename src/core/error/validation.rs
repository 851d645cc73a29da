//! 输入校验错误类型
//!
//! 涵盖属性键预检和查询文本转义解析相关的错误

use thiserror::Error;

/// 查询预检错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 查询引用了数据库中不存在的属性键
    #[error("missing property keys: {}", .keys.join(", "))]
    MissingProperties { keys: Vec<String> },
}

/// 转义序列解析错误，position 为反斜杠在原文中的字节偏移
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnescapeError {
    #[error("trailing backslash at byte {position}")]
    TrailingBackslash { position: usize },

    #[error("truncated \\{escape} escape at byte {position}")]
    TruncatedEscape { escape: char, position: usize },

    #[error("invalid code point U+{code_point:X} at byte {position}")]
    InvalidCodePoint { code_point: u32, position: usize },

    #[error("named unicode escape at byte {position} is not supported")]
    NamedEscape { position: usize },
}
