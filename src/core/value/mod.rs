//! Value 模块 - 查询结果值类型系统
//!
//! - 核心类型定义 (`types.rs`)
//! - 日期时间类型 (`date_time.rs`)

pub mod date_time;
pub mod types;

pub use date_time::*;
pub use types::*;
