//! 统一错误处理
//!
//! 1. **按作用范围区分**：
//!    - 条目级错误（属性缺失、查询被拒绝、连接中断）只影响当前数据条目，
//!      由编排器转换为 null 答案并记录日志
//!    - 致命错误（初始连接失败、遇到封闭值集合之外的类型）直接向调用方传播
//!
//! 2. **分层转换**：子模块错误使用 `#[from]` 自动转换，
//!    外部库错误通过 `From` 实现转换为字符串
//!
//! 3. **统一接口**：`EnrichResult<T>` 作为统一返回类型

use thiserror::Error;

pub mod query;
pub mod validation;

pub use query::QueryError;
pub use validation::{UnescapeError, ValidationError};

/// 统一的错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnrichError {
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("unescape error: {0}")]
    Unescape(#[from] UnescapeError),

    #[error("connectivity error: {0}")]
    Connectivity(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// 统一的结果类型
pub type EnrichResult<T> = Result<T, EnrichError>;

impl EnrichError {
    /// 致命错误会终止整批处理，其余错误只让当前条目的答案为 null
    pub fn is_fatal(&self) -> bool {
        match self {
            EnrichError::Query(query) => query.is_fatal(),
            EnrichError::Connectivity(_) | EnrichError::Config(_) => true,
            EnrichError::Validation(_)
            | EnrichError::Unescape(_)
            | EnrichError::Io(_)
            | EnrichError::Serialization(_) => false,
        }
    }
}

impl From<serde_json::Error> for EnrichError {
    fn from(err: serde_json::Error) -> Self {
        EnrichError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for EnrichError {
    fn from(err: std::io::Error) -> Self {
        EnrichError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for EnrichError {
    fn from(err: toml::de::Error) -> Self {
        EnrichError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for EnrichError {
    fn from(err: toml::ser::Error) -> Self {
        EnrichError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for EnrichError {
    fn from(err: reqwest::Error) -> Self {
        EnrichError::Query(QueryError::from(err))
    }
}

impl From<flexi_logger::FlexiLoggerError> for EnrichError {
    fn from(err: flexi_logger::FlexiLoggerError) -> Self {
        EnrichError::Config(err.to_string())
    }
}
