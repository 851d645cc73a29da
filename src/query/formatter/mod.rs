//! 结果文本化
//!
//! `stringifier` 渲染单个值，`result_formatter` 把整个结果集合成一条答案，
//! `json_text` 负责映射的 JSON 文本输出。

pub mod json_text;
pub mod result_formatter;
pub mod stringifier;

pub use result_formatter::{format_result, stringify_record};
pub use stringifier::stringify;
