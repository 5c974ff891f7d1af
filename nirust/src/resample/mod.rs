//! 重采样: 将体数据从其自身网格搬运到目标网格上.
//!
//! 对目标网格中的每个体素 `(i, j, k)`, 先经目标仿射矩阵得到世界坐标,
//! 再经源网格逆仿射矩阵得到源网格中的 (小数) 体素坐标, 最后按插值策略取值.
//! 两步在实现中被合成为一个 [`VoxelMap`].
//!
//! 标签体只能以最近邻方式重采样 (见 [`resample_labels`]), 对类别编码做线性插值会
//! 凭空制造出不存在的标签.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use ndarray::{Array3, Array4, ArrayView3, ArrayViewMut3, Axis, Zip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::label::BACKGROUND;
use crate::data::{GridAttr, LabelVolume, Volume};
use crate::error::{ParcError, ParcResult};
use crate::grid::{Coord3d, GridDescriptor, VoxelMap};

mod kernel;

use kernel::{sample_nearest, sample_trilinear};

/// 插值策略.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Interpolation {
    /// 最近邻. 适用于类别 (标签) 数据.
    Nearest,
    /// 三线性插值. 仅适用于连续值数据.
    Linear,
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Linear => "linear",
        };
        f.write_str(s)
    }
}

impl FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Interpolation::Nearest),
            "linear" => Ok(Interpolation::Linear),
            _ => Err(format!("unknown interpolation `{s}`, expected `nearest` or `linear`")),
        }
    }
}

/// 对输出网格的每个体素并行 (若启用 `rayon`) 地调用 `sample`.
fn fill_grid<T, F>(out: ArrayViewMut3<'_, T>, map: &VoxelMap, sample: F)
where
    T: Send,
    F: Fn(Coord3d) -> T + Sync + Send,
{
    let zip = Zip::indexed(out);
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            zip.par_for_each(|idx, v| *v = sample(map.apply(idx)));
        } else {
            zip.for_each(|idx, v| *v = sample(map.apply(idx)));
        }
    }
}

/// 对单帧做重采样, 结果写入 `out`.
fn resample_frame(
    src: ArrayView3<'_, f32>,
    out: ArrayViewMut3<'_, f32>,
    map: &VoxelMap,
    interpolation: Interpolation,
    fill: f32,
) {
    match interpolation {
        Interpolation::Nearest => fill_grid(out, map, |at| sample_nearest(&src, at, fill)),
        Interpolation::Linear => fill_grid(out, map, |at| sample_trilinear(&src, at, fill)),
    }
}

/// 将 `source` 重采样到 `target` 网格上, 不做 "网格一致" 短路.
fn resample_volume(
    source: &Volume,
    target: &GridDescriptor,
    interpolation: Interpolation,
    fill: f32,
) -> ParcResult<Volume> {
    let (sx, sy, sz, nt) = source.data().dim();
    let (gx, gy, gz) = source.shape();
    if (sx, sy, sz) != (gx, gy, gz) {
        return Err(ParcError::ShapeMismatch(vec![gx, gy, gz], vec![sx, sy, sz, nt]));
    }

    let map = target.voxel_map_to(source.grid());
    let (tx, ty, tz) = target.shape();
    let mut out = Array4::<f32>::zeros((tx, ty, tz, nt));
    for (src, dst) in source.frame_iter().zip(out.axis_iter_mut(Axis(3))) {
        resample_frame(src, dst, &map, interpolation, fill);
    }
    Ok(source.with_data(target.clone(), out))
}

/// 将连续值体数据 `source` 重采样到 `target` 网格上.
///
/// 越界的目标体素 (或线性插值中权重非零的越界邻居) 取 `fill`. 4D 数据逐帧处理,
/// 帧数保持不变. 输出网格与 `target` 完全相同.
///
/// 若源网格与目标网格 "网格一致" (默认误差), 则直接借用 `source` 返回, 不引入任何插值误差.
pub fn resample<'a>(
    source: &'a Volume,
    target: &GridDescriptor,
    interpolation: Interpolation,
    fill: f32,
) -> ParcResult<Cow<'a, Volume>> {
    if source.grid().same_grid(target) {
        log::debug!("Source already on target grid, resampling skipped");
        return Ok(Cow::Borrowed(source));
    }
    log::debug!(
        "Resampling {:?} x {} frame(s) -> {:?} ({interpolation})",
        source.shape(),
        source.frames(),
        target.shape()
    );
    resample_volume(source, target, interpolation, fill).map(Cow::Owned)
}

/// 将标签体重采样到 `target` 网格上. 总是使用最近邻, 越界体素为背景.
///
/// 输出中的标签集合一定是输入标签集合 (加上背景) 的子集.
/// 网格误差不超过 `tol` 时直接借用 `labels` 返回.
pub fn resample_labels<'a>(
    labels: &'a LabelVolume,
    target: &GridDescriptor,
    tol: f64,
) -> Cow<'a, LabelVolume> {
    if labels.grid().is_grid_identical(target, tol) {
        return Cow::Borrowed(labels);
    }
    log::debug!(
        "Resampling labels {:?} -> {:?} (nearest)",
        labels.shape(),
        target.shape()
    );
    let map = target.voxel_map_to(labels.grid());
    let src = labels.data();
    let mut out = Array3::<u32>::zeros(target.shape());
    fill_grid(out.view_mut(), &map, |at| sample_nearest(&src, at, BACKGROUND));
    Cow::Owned(labels.with_data(target.clone(), out))
}
