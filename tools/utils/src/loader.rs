//! 对 `nirust::dataset` 的更一层封装. 按 "显式配置 → 环境变量 → 用户主目录" 的顺序定位图谱库.

use nirust::dataset::AtlasStore;
use std::env;
use std::path::PathBuf;

/// 指定图谱库根目录的环境变量.
pub const ATLAS_DIR_ENV: &str = "NIRUST_ATLAS_DIR";

/// 若环境变量 `$NIRUST_ATLAS_DIR` 非空, 则返回其值.
pub fn atlas_dir_from_env() -> Option<PathBuf> {
    match env::var(ATLAS_DIR_ENV) {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => None,
    }
}

/// 获取图谱库.
///
/// 1. `explicit` 非空时直接使用;
/// 2. 否则, 若环境变量 `$NIRUST_ATLAS_DIR` 非空, 则使用其值;
/// 3. 否则, 使用 `$HOME/dataset/atlases`;
/// 4. 无法确定用户主目录时返回 `None`.
pub fn atlas_store(explicit: Option<PathBuf>) -> Option<AtlasStore> {
    explicit
        .or_else(atlas_dir_from_env)
        .map(AtlasStore::new)
        .or_else(AtlasStore::from_home)
}
