//! 单点采样核.
//!
//! 输入为源网格中的 (小数) 体素坐标, 越界时以填充值代替.

use ndarray::ArrayView3;

use crate::grid::Coord3d;

/// 最近邻采样. 坐标四舍五入 (`.5` 远离零) 到最近的整数索引; 越界返回 `None`.
#[inline]
pub(crate) fn nearest_index(dim: (usize, usize, usize), (x, y, z): Coord3d) -> Option<[usize; 3]> {
    #[inline]
    fn round_axis(v: f64, n: usize) -> Option<usize> {
        let r = v.round();
        // NaN 比较恒为 false, 因此也会落入越界分支.
        (r >= 0.0 && r < n as f64).then_some(r as usize)
    }
    let (nx, ny, nz) = dim;
    Some([round_axis(x, nx)?, round_axis(y, ny)?, round_axis(z, nz)?])
}

/// 最近邻采样任意元素类型的 3D 数组.
#[inline]
pub(crate) fn sample_nearest<T: Copy>(src: &ArrayView3<T>, at: Coord3d, fill: T) -> T {
    match nearest_index(src.dim(), at) {
        Some(idx) => src[idx],
        None => fill,
    }
}

/// 小于该值的小数部分视为 0 (或 1), 以消除仿射矩阵求逆带来的舍入误差.
const FRACTION_EPSILON: f64 = 1e-9;

#[inline]
fn snap(d: f64) -> f64 {
    if d < FRACTION_EPSILON {
        0.0
    } else if d > 1.0 - FRACTION_EPSILON {
        1.0
    } else {
        d
    }
}

/// 三线性插值.
///
/// 对 `at` 周围的 2x2x2 个体素按小数距离加权求和. 越界邻居以 `fill` 参与加权;
/// 权重为 0 的邻居不参与计算, 因此恰好落在最后一个索引上的点不会引入填充值.
pub(crate) fn sample_trilinear(src: &ArrayView3<f32>, (x, y, z): Coord3d, fill: f32) -> f32 {
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return fill;
    }
    let (nx, ny, nz) = src.dim();
    let (x0, y0, z0) = (x.floor(), y.floor(), z.floor());
    let (dx, dy, dz) = (snap(x - x0), snap(y - y0), snap(z - z0));

    // (偏移, 权重) 对.
    let wx = [(0.0, 1.0 - dx), (1.0, dx)];
    let wy = [(0.0, 1.0 - dy), (1.0, dy)];
    let wz = [(0.0, 1.0 - dz), (1.0, dz)];

    let fetch = |i: f64, j: f64, k: f64| -> f64 {
        let inside = |v: f64, n: usize| v >= 0.0 && v < n as f64;
        if inside(i, nx) && inside(j, ny) && inside(k, nz) {
            src[[i as usize, j as usize, k as usize]] as f64
        } else {
            fill as f64
        }
    };

    let mut acc = 0.0f64;
    for (ox, w_x) in wx {
        for (oy, w_y) in wy {
            for (oz, w_z) in wz {
                let w = w_x * w_y * w_z;
                if w == 0.0 {
                    continue;
                }
                acc += w * fetch(x0 + ox, y0 + oy, z0 + oz);
            }
        }
    }
    acc as f32
}
