//! 查询执行错误类型
//!
//! 涵盖与数据库往返、服务端拒绝查询以及结果解码过程中的错误

use thiserror::Error;

/// 查询层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("query rejected by database: {code}: {message}")]
    Rejected { code: String, message: String },

    #[error("protocol error: {0}")]
    Protocol(String),

    /// 结果中出现了值类型集合之外的类型
    #[error("unsupported value type in result: {0}")]
    UnsupportedValue(String),
}

impl QueryError {
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        QueryError::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, QueryError::UnsupportedValue(_))
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            QueryError::Protocol(e.to_string())
        } else {
            QueryError::Connection(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message() {
        let err = QueryError::rejected("Neo.ClientError.Statement.SyntaxError", "Invalid input 'RETRN'");
        assert_eq!(
            err.to_string(),
            "query rejected by database: Neo.ClientError.Statement.SyntaxError: Invalid input 'RETRN'"
        );
        assert!(!err.is_fatal());
    }
}
