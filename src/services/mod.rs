//! 服务层模块
//!
//! 单个数据库上的问答补全，以及按数据源组织的数据集构建流程

pub mod enricher;
pub mod pipeline;

// 重新导出常用服务
pub use enricher::{
    enrich_item, EnrichOutcome, EnrichPass, EnrichStats, ItemState, QaEnricher, SkipReason,
    DEFAULT_ANSWER_FIELD, DEFAULT_QUERY_FIELD,
};
pub use pipeline::{
    full_output_path, source_output_path, BuildReport, DatasetBuilder, EnricherFactory,
    HttpEnricherFactory, SourceReport,
};
