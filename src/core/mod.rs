pub mod error;
pub mod graph_entity;
pub mod result;
pub mod value;

// 错误和结果类型
pub use error::{EnrichError, EnrichResult, QueryError, UnescapeError, ValidationError};

// 核心数据类型
pub use graph_entity::{Node, Relationship};
pub use result::{QueryResult, Record};
pub use value::*;
