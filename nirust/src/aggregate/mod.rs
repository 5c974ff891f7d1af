//! 按标签聚合: 将体数据按标签体的每个前景区域归约为一个标量 (每帧一个).

use ndarray::{Array2, ArrayView3};
use ordered_float::NotNan;

use crate::consts::DEFAULT_GRID_TOLERANCE;
use crate::data::{GridAttr, LabelVolume, Volume};
use crate::error::{ParcError, ParcResult};
use crate::Idx3d;

mod reducer;
mod table;

pub use reducer::Reducer;
pub use table::RegionTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 收集 `frame` 在 `footprint` 上的有效 (非 `NaN`) 体素值并归约.
fn reduce_footprint(frame: &ArrayView3<'_, f32>, footprint: &[Idx3d], reducer: Reducer) -> f64 {
    let mut values: Vec<NotNan<f64>> = footprint
        .iter()
        .filter_map(|pos| NotNan::new(frame[*pos] as f64).ok())
        .collect();
    reducer.reduce(&mut values)
}

/// 计算一个区域在所有帧上的归约值.
fn reduce_region(features: &Volume, footprint: &[Idx3d], reducer: Reducer) -> Vec<f64> {
    features
        .frame_iter()
        .map(|frame| reduce_footprint(&frame, footprint, reducer))
        .collect()
}

/// 按 `labels` 的每个前景标签聚合 `features`, 得到区域表.
///
/// 两者必须 "网格一致", 否则返回 [`ParcError::GridMismatch`]; 该函数从不自行重采样.
/// 区域表按标签升序排列, 对 4D 数据每帧各占一列.
///
/// 值为 `NaN` 的特征体素不在有效域内, 不参与归约; 某个标签若没有任何有效体素,
/// 该行仍然保留, 值为 `NaN`.
///
/// 标签体不含前景时返回 [`ParcError::EmptyLabelSet`].
pub fn aggregate(
    features: &Volume,
    labels: &LabelVolume,
    reducer: Reducer,
) -> ParcResult<RegionTable> {
    aggregate_within(features, labels, reducer, DEFAULT_GRID_TOLERANCE)
}

/// 同 [`aggregate`], 但以 `tol` 作为 "网格一致" 的判定误差.
pub(crate) fn aggregate_within(
    features: &Volume,
    labels: &LabelVolume,
    reducer: Reducer,
    tol: f64,
) -> ParcResult<RegionTable> {
    if !features.is_grid_identical(labels, tol) {
        let (fx, fy, fz) = features.shape();
        let (lx, ly, lz) = labels.shape();
        return Err(ParcError::GridMismatch {
            feature: [fx, fy, fz],
            label: [lx, ly, lz],
        });
    }

    let footprints = labels.footprints();
    if footprints.is_empty() {
        return Err(ParcError::EmptyLabelSet);
    }
    let regions: Vec<(u32, Vec<Idx3d>)> = footprints.into_iter().collect();
    log::debug!(
        "Aggregating {} region(s) x {} frame(s) by {reducer}",
        regions.len(),
        features.frames()
    );

    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            let rows: Vec<Vec<f64>> = regions
                .par_iter()
                .map(|(_, fp)| reduce_region(features, fp, reducer))
                .collect();
        } else {
            let rows: Vec<Vec<f64>> = regions
                .iter()
                .map(|(_, fp)| reduce_region(features, fp, reducer))
                .collect();
        }
    }

    let n_features = features.frames();
    let values = Array2::from_shape_vec(
        (regions.len(), n_features),
        rows.into_iter().flatten().collect(),
    )
    .map_err(|_| ParcError::ShapeMismatch(vec![regions.len(), n_features], vec![]))?;
    let labels = regions.into_iter().map(|(label, _)| label).collect();
    Ok(RegionTable::new(labels, values))
}
