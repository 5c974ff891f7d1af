use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use crate::data::LabelVolume;
use crate::error::{ParcError, ParcResult};

/// 图谱文件扩展名, 按查找优先级排列.
const ATLAS_EXTENSIONS: [&str; 2] = [".nii.gz", ".nii"];

/// 本地图谱库: 一个存放图谱文件的目录.
///
/// 名为 `name` 的图谱对应文件 `{root}/{name}.nii.gz` 或 `{root}/{name}.nii`
/// (前者优先). 图谱库的位置总是显式给出, 不依赖任何全局状态.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasStore {
    root: PathBuf,
}

impl AtlasStore {
    /// 以 `root` 为根目录创建图谱库. 目录不必已经存在.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// 以 `{用户主目录}/dataset/atlases` 为根目录创建图谱库.
    /// 无法确定用户主目录时返回 `None`.
    pub fn from_home() -> Option<Self> {
        super::home_dataset_dir_with(["atlases"]).map(Self::new)
    }

    /// 根目录.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 获取图谱 `name` 的文件路径. 图谱不存在时返回 `None`.
    pub fn path_of(&self, name: &str) -> Option<PathBuf> {
        ATLAS_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{name}{ext}")))
            .find(|p| p.is_file())
    }

    /// 打开图谱 `name`. 图谱不存在时返回 [`ParcError::AtlasNotFound`].
    pub fn open(&self, name: &str) -> ParcResult<LabelVolume> {
        let path = self
            .path_of(name)
            .ok_or_else(|| ParcError::AtlasNotFound(name.to_string()))?;
        log::info!("Loading atlas `{name}` from {:?}", path);
        LabelVolume::open(path)
    }

    /// 按字典序列出图谱库中所有图谱的名称 (去掉扩展名, 去重).
    pub fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = atlas_name(&entry.file_name()) {
                names.push(name);
            }
        }
        names.sort_unstable();
        names.dedup();
        Ok(names)
    }
}

/// 若 `file_name` 是图谱文件, 返回去掉扩展名后的图谱名称.
fn atlas_name(file_name: &OsStr) -> Option<String> {
    let file_name = file_name.to_str()?;
    ATLAS_EXTENSIONS
        .iter()
        .find_map(|ext| file_name.strip_suffix(ext))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridDescriptor;
    use ndarray::Array3;
    use tempfile::tempdir;

    fn atlas() -> LabelVolume {
        let grid = GridDescriptor::axis_aligned((2, 2, 2), [2.0; 3], [0.0; 3]).unwrap();
        LabelVolume::new(Array3::from_shape_fn((2, 2, 2), |(i, _, _)| i as u32 + 1), grid).unwrap()
    }

    #[test]
    fn test_atlas_name() {
        assert_eq!(atlas_name(OsStr::new("aal.nii.gz")), Some("aal".to_string()));
        assert_eq!(atlas_name(OsStr::new("dk.nii")), Some("dk".to_string()));
        assert_eq!(atlas_name(OsStr::new("notes.txt")), None);
        assert_eq!(atlas_name(OsStr::new(".nii")), None);
    }

    #[test]
    fn test_store_open_and_list() {
        let dir = tempdir().unwrap();
        let s = AtlasStore::new(dir.path());
        atlas().save(s.root().join("toy.nii.gz")).unwrap();
        atlas().save(s.root().join("toy.nii")).unwrap();
        std::fs::write(s.root().join("readme.txt"), "not an atlas").unwrap();

        assert!(s
            .path_of("toy")
            .unwrap()
            .to_string_lossy()
            .ends_with("toy.nii.gz"));
        assert_eq!(s.list().unwrap(), vec!["toy".to_string()]);
        assert_eq!(s.open("toy").unwrap().labels(), vec![1, 2]);
    }

    #[test]
    fn test_store_missing_atlas() {
        let dir = tempdir().unwrap();
        let s = AtlasStore::new(dir.path());
        assert_eq!(s.path_of("nope"), None);
        let err = s.open("nope").unwrap_err();
        assert!(matches!(err, ParcError::AtlasNotFound(name) if name == "nope"));
        assert!(s.list().unwrap().is_empty());

        let missing = AtlasStore::new(dir.path().join("absent"));
        assert!(missing.list().is_err());
    }
}
