//! 分区流程: 先将图谱重采样到源影像网格, 再按图谱标签聚合源影像.
//!
//! 重采样方向固定为 "图谱 → 源影像", 源影像本身从不被插值.

use std::borrow::Cow;

use crate::aggregate::{aggregate_within, Reducer, RegionTable};
use crate::consts::DEFAULT_GRID_TOLERANCE;
use crate::data::{GridAttr, LabelVolume, Volume};
use crate::error::{ParcError, ParcResult};
use crate::resample::resample_labels;

/// 可配置的分区流程.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parcellator {
    reducer: Reducer,
    tolerance: f64,
}

impl Default for Parcellator {
    fn default() -> Self {
        Self {
            reducer: Reducer::default(),
            tolerance: DEFAULT_GRID_TOLERANCE,
        }
    }
}

impl Parcellator {
    /// 使用默认配置 (`mean`, 网格误差 `1e-4`).
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置归约策略.
    #[inline]
    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    /// 设置判定 "网格一致" 时的仿射矩阵误差. 必须是有限非负数, 否则 [`Parcellator::run`]
    /// 返回 [`ParcError::InvalidTolerance`].
    #[inline]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// 运行流程.
    ///
    /// 1. 若 `atlas` 与 `source` 网格不一致, 以最近邻将 `atlas` 重采样到 `source` 网格;
    /// 2. 以 `source` 为特征体, (重采样后的) `atlas` 为标签体进行聚合.
    ///
    /// 结果的行集合是重采样 *之后* 图谱中出现的前景标签.
    pub fn run(&self, source: &Volume, atlas: &LabelVolume) -> ParcResult<RegionTable> {
        if !(self.tolerance >= 0.0 && self.tolerance.is_finite()) {
            return Err(ParcError::InvalidTolerance(self.tolerance));
        }
        let aligned = resample_labels(atlas, source.grid(), self.tolerance);
        if let Cow::Owned(ref resampled) = aligned {
            log::info!(
                "Atlas resampled {:?} -> {:?}: {} -> {} label(s)",
                atlas.shape(),
                resampled.shape(),
                atlas.labels().len(),
                resampled.labels().len()
            );
        }
        aggregate_within(source, &aligned, self.reducer, self.tolerance)
    }
}

/// 以默认网格误差运行分区流程, 见 [`Parcellator::run`].
#[inline]
pub fn parcellate(source: &Volume, atlas: &LabelVolume, reducer: Reducer) -> ParcResult<RegionTable> {
    Parcellator::new().reducer(reducer).run(source, atlas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridDescriptor;
    use ndarray::Array3;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// 细网格图谱: 偶数 x 索引处是 8 个 "粗" 标签, 奇数 x 索引处是只在细网格上存在的标签.
    fn fine_atlas() -> LabelVolume {
        let data = Array3::from_shape_fn((4, 4, 4), |(i, j, k)| {
            if i % 2 == 1 {
                100 + i as u32
            } else {
                (1 + i / 2 + 2 * (j / 2) + 4 * (k / 2)) as u32
            }
        });
        let grid = GridDescriptor::axis_aligned((4, 4, 4), [1.0; 3], [0.0; 3]).unwrap();
        LabelVolume::new(data, grid).unwrap()
    }

    fn coarse_source() -> Volume {
        let grid = GridDescriptor::axis_aligned((2, 2, 2), [2.0; 3], [0.0; 3]).unwrap();
        let data = Array3::from_shape_fn((2, 2, 2), |(i, j, k)| (i + 10 * j + 100 * k) as f32);
        Volume::from_3d(data, grid).unwrap()
    }

    #[test]
    fn test_rows_follow_resampled_atlas() {
        let atlas = fine_atlas();
        assert_eq!(atlas.labels().len(), 10);

        let t = parcellate(&coarse_source(), &atlas, Reducer::Mean).unwrap();
        assert_eq!(t.labels(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        // 粗网格体素 (1, 1, 1) 对应图谱体素 (2, 2, 2), 标签 8.
        assert!(f64_eq(t.get(8, 0).unwrap(), 111.0));
        assert!(f64_eq(t.get(2, 0).unwrap(), 1.0));
    }

    #[test]
    fn test_atlas_on_source_grid() {
        let atlas = fine_atlas();
        let data = Array3::from_elem((4, 4, 4), 2.0f32);
        let source = Volume::from_3d(data, atlas.grid().clone()).unwrap();
        let t = Parcellator::new().reducer(Reducer::Sum).run(&source, &atlas).unwrap();
        assert_eq!(t.n_regions(), 10);
        assert!(f64_eq(t.get(101, 0).unwrap(), 32.0));
    }

    #[test]
    fn test_tolerance() {
        let atlas = fine_atlas();
        let nudged = GridDescriptor::axis_aligned((4, 4, 4), [1.0; 3], [5e-4, 0.0, 0.0]).unwrap();
        let source = Volume::from_3d(Array3::from_elem((4, 4, 4), 1.0), nudged).unwrap();

        // 在误差范围内: 图谱不做重采样, 所有标签保留.
        let loose = Parcellator::new().tolerance(1e-3);
        assert_eq!(loose.run(&source, &atlas).unwrap().n_regions(), 10);

        // 默认误差下会被重采样, 但偏移远小于半个体素, 标签集合不变.
        let strict = parcellate(&source, &atlas, Reducer::Mean).unwrap();
        assert_eq!(strict.n_regions(), 10);
    }

    #[test]
    fn test_invalid_tolerance() {
        let atlas = fine_atlas();
        let source = Volume::from_3d(Array3::zeros((4, 4, 4)), atlas.grid().clone()).unwrap();
        for tol in [-1.0, f64::NAN, f64::INFINITY] {
            let err = Parcellator::new().tolerance(tol).run(&source, &atlas).unwrap_err();
            assert!(matches!(err, ParcError::InvalidTolerance(_)));
        }
        assert!(Parcellator::new().tolerance(0.0).run(&source, &atlas).is_ok());
    }

    #[test]
    fn test_background_atlas() {
        let grid = GridDescriptor::axis_aligned((2, 2, 2), [2.0; 3], [0.0; 3]).unwrap();
        let atlas = LabelVolume::new(Array3::zeros((2, 2, 2)), grid).unwrap();
        let err = parcellate(&coarse_source(), &atlas, Reducer::Mean).unwrap_err();
        assert!(matches!(err, ParcError::EmptyLabelSet));
    }
}
