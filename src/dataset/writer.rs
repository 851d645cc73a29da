//! JSON Lines 数据集写出

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::{EnrichError, EnrichResult};
use crate::dataset::DatasetItem;

/// 把数据项逐行写成 JSONL，非 ASCII 字符原样保留
///
/// 父目录不存在时自动创建，已有文件会被覆盖。
pub fn write_jsonl(path: impl AsRef<Path>, items: &[DatasetItem]) -> EnrichResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| EnrichError::Io(format!("cannot create {}: {}", parent.display(), e)))?;
    }

    let file = File::create(path)
        .map_err(|e| EnrichError::Io(format!("cannot create {}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);
    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
