//! Dataset items and their JSON Lines storage

pub mod item;
pub mod reader;
pub mod writer;

pub use item::DatasetItem;
pub use reader::read_jsonl;
pub use writer::write_jsonl;
