//! 半球掩膜.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array3, Axis, Zip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::data::{GridAttr, Volume};

/// 大脑半球. 世界坐标 `x < 0` 的一侧为左半球.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Hemisphere {
    /// 左半球 (`x < 0`).
    Left,
    /// 右半球 (`x >= 0`).
    Right,
}

impl Hemisphere {
    /// 世界坐标 `x` 是否落在该半球内.
    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        match self {
            Hemisphere::Left => x < 0.0,
            Hemisphere::Right => x >= 0.0,
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Hemisphere::Left => "left",
            Hemisphere::Right => "right",
        })
    }
}

impl FromStr for Hemisphere {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Hemisphere::Left),
            "right" => Ok(Hemisphere::Right),
            _ => Err(format!("side must be `left` or `right`, got `{s}`")),
        }
    }
}

/// 将 `volume` 中位于半球 `side` 内的体素置为 `NaN`, 返回新的体数据. 4D 数据的每一帧都被处理.
///
/// 是否在半球内由体素中心的世界坐标逐体素判定, 因此对倾斜或翻转的仿射矩阵同样适用.
/// 置为 `NaN` 的体素在后续聚合时不属于有效域.
pub fn mask_hemisphere(volume: &Volume, side: Hemisphere) -> Volume {
    let grid = volume.grid();
    let mut blank = Array3::from_elem(grid.shape(), false);
    Zip::indexed(&mut blank).for_each(|(i, j, k), b| {
        let (x, _, _) = grid.voxel_to_world(i as f64, j as f64, k as f64);
        *b = side.contains(x);
    });
    log::info!(
        "Masking {side} hemisphere: {} of {} voxel(s)",
        blank.iter().filter(|b| **b).count(),
        blank.len()
    );

    let mut data = volume.data().to_owned();
    for frame in data.axis_iter_mut(Axis(3)) {
        Zip::from(frame).and(&blank).for_each(|v, b| {
            if *b {
                *v = f32::NAN;
            }
        });
    }
    volume.with_data(grid.clone(), data)
}
