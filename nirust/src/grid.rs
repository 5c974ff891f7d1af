//! 体素网格描述符.
//!
//! 网格由体素个数三元组 `(nx, ny, nz)` 和一个 4x4 仿射矩阵组成, 仿射矩阵把体素索引
//! `(i, j, k, 1)` 映射到物理 (世界) 坐标 `(x, y, z, 1)`. 仿射矩阵的最后一行总是视为
//! `(0, 0, 0, 1)`.

use crate::consts::{DEFAULT_GRID_TOLERANCE, QUATERNION_TOLERANCE, SINGULAR_EPSILON};
use crate::error::{ParcError, ParcResult};
use crate::Idx3d;
use log::warn;
use nalgebra::{Matrix4, RowVector4, Vector3, Vector4};
use nifti::NiftiHeader;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 4x4 仿射矩阵.
pub type Affine = Matrix4<f64>;

/// 三维坐标 (体素坐标或世界坐标).
pub type Coord3d = (f64, f64, f64);

/// 体素网格描述符. 只读值对象, 构造后不再改变.
///
/// 构造时即计算逆仿射矩阵, 因此一个已存在的 `GridDescriptor` 总是可逆的.
/// 反序列化同样经过 [`GridDescriptor::new`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RawGrid", into = "RawGrid")
)]
pub struct GridDescriptor {
    shape: Idx3d,
    affine: Affine,
    inverse: Affine,
}

impl GridDescriptor {
    /// 由形状和仿射矩阵构建网格. 仿射矩阵的最后一行总是被置为 `(0, 0, 0, 1)`.
    ///
    /// 若仿射矩阵的线性部分不可逆, 则返回 [`ParcError::SingularGrid`].
    pub fn new(shape: Idx3d, affine: Affine) -> ParcResult<Self> {
        let mut affine = affine;
        affine.set_row(3, &RowVector4::new(0.0, 0.0, 0.0, 1.0));
        let det = affine.fixed_view::<3, 3>(0, 0).determinant();
        // NaN 也视为不可逆.
        if !(det.abs() >= SINGULAR_EPSILON) {
            return Err(ParcError::SingularGrid(det));
        }
        let inverse = affine.try_inverse().ok_or(ParcError::SingularGrid(det))?;
        Ok(Self {
            shape,
            affine,
            inverse,
        })
    }

    /// 体素间距为 `spacing`, 原点为 `origin`, 坐标轴与世界坐标轴对齐的网格.
    pub fn axis_aligned(shape: Idx3d, spacing: [f64; 3], origin: [f64; 3]) -> ParcResult<Self> {
        let mut affine = Affine::new_nonuniform_scaling(&Vector3::from(spacing));
        affine.fixed_view_mut::<3, 1>(0, 3).copy_from(&Vector3::from(origin));
        Self::new(shape, affine)
    }

    /// 从 NIfTI header 中读取网格. `shape` 为数据前三维的实际大小.
    ///
    /// 优先级: `sform_code > 0` 时使用 sform; 否则 `qform_code > 0` 时使用 qform;
    /// 否则退化为以 `pixdim` 为对角线的仿射矩阵.
    pub fn from_header(header: &NiftiHeader, shape: Idx3d) -> ParcResult<Self> {
        let affine = if header.sform_code > 0 {
            header.sform_affine::<f64>()
        } else if header.qform_code > 0 {
            qform_affine(header)?
        } else {
            warn!("NIfTI header has neither sform nor qform, falling back to pixdim scaling");
            let spacing = |v: f32| if v > 0.0 { v as f64 } else { 1.0 };
            let [_, dx, dy, dz, ..] = header.pixdim;
            Affine::new_nonuniform_scaling(&Vector3::new(spacing(dx), spacing(dy), spacing(dz)))
        };
        Self::new(shape, affine)
    }

    /// 将本网格写入 `header`: sform 记录仿射矩阵, `pixdim[1..4]` 记录体素间距.
    ///
    /// header 的其他字段 (时间间隔、描述、单位等) 保持不变.
    pub fn write_header(&self, header: &mut NiftiHeader) {
        header.set_affine(&self.affine);
    }

    /// 体素个数三元组 `(nx, ny, nz)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.shape
    }

    /// 体素总数.
    #[inline]
    pub fn len(&self) -> usize {
        let (x, y, z) = self.shape;
        x * y * z
    }

    /// 网格是否不含任何体素.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 体素索引 -> 世界坐标仿射矩阵.
    #[inline]
    pub fn affine(&self) -> &Affine {
        &self.affine
    }

    /// 世界坐标 -> 体素索引仿射矩阵.
    #[inline]
    pub fn inverse_affine(&self) -> &Affine {
        &self.inverse
    }

    /// 对体素索引 `(i, j, k)` 施加仿射变换, 得到世界坐标. 索引可以是小数.
    #[inline]
    pub fn voxel_to_world(&self, i: f64, j: f64, k: f64) -> Coord3d {
        apply(&self.affine, (i, j, k))
    }

    /// 对世界坐标 `(x, y, z)` 施加逆仿射变换, 得到 (小数) 体素索引.
    #[inline]
    pub fn world_to_voxel(&self, x: f64, y: f64, z: f64) -> Coord3d {
        apply(&self.inverse, (x, y, z))
    }

    /// 每个体素轴方向上的体素间距, 即仿射矩阵线性部分的列范数.
    pub fn voxel_size(&self) -> [f64; 3] {
        let linear = self.affine.fixed_view::<3, 3>(0, 0);
        [0, 1, 2].map(|c| linear.column(c).norm())
    }

    /// 检查索引 `(i, j, k)` 是否在网格范围内.
    #[inline]
    pub fn check(&self, (i, j, k): &Idx3d) -> bool {
        let (x, y, z) = self.shape;
        *i < x && *j < y && *k < z
    }

    /// 两个网格是否 "网格一致": 形状相同且仿射矩阵逐元素误差不超过 `tol`.
    pub fn is_grid_identical(&self, other: &Self, tol: f64) -> bool {
        self.shape == other.shape
            && self
                .affine
                .iter()
                .zip(other.affine.iter())
                .all(|(a, b)| (a - b).abs() <= tol)
    }

    /// 使用默认误差 [`DEFAULT_GRID_TOLERANCE`] 判断是否网格一致.
    #[inline]
    pub fn same_grid(&self, other: &Self) -> bool {
        self.is_grid_identical(other, DEFAULT_GRID_TOLERANCE)
    }

    /// 组合映射: 本网格的体素索引 -> 世界坐标 -> `other` 网格的 (小数) 体素索引.
    pub fn voxel_map_to(&self, other: &Self) -> VoxelMap {
        VoxelMap(other.inverse * self.affine)
    }
}

/// 从一个网格的体素索引到另一个网格体素索引的仿射映射.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelMap(Affine);

impl VoxelMap {
    /// 映射单个体素索引.
    #[inline]
    pub fn apply(&self, (i, j, k): Idx3d) -> Coord3d {
        apply(&self.0, (i as f64, j as f64, k as f64))
    }
}

#[inline]
fn apply(m: &Affine, (x, y, z): Coord3d) -> Coord3d {
    let p = m * Vector4::new(x, y, z, 1.0);
    (p.x, p.y, p.z)
}

/// 读取 qform. `nifti` 遇到负的体素间距或模长大于 1 的四元数时会 panic, 这里先行检查.
fn qform_affine(header: &NiftiHeader) -> ParcResult<Affine> {
    let [qfac, dx, dy, dz, ..] = header.pixdim;
    if dx < 0.0 || dy < 0.0 || dz < 0.0 {
        return Err(ParcError::InvalidHeader(format!(
            "negative qform spacing {:?}",
            [dx, dy, dz]
        )));
    }
    let (b, c, d) = (header.quatern_b, header.quatern_c, header.quatern_d);
    let norm2 = Vector3::new(b as f64, c as f64, d as f64).norm_squared();
    if !(norm2 <= 1.0 + QUATERNION_TOLERANCE) {
        return Err(ParcError::InvalidHeader(format!(
            "qform quaternion ({b}, {c}, {d}) is not a unit quaternion"
        )));
    }

    // qfac 只取符号, 0 视为 1.
    let mut header = header.clone();
    header.pixdim[0] = if qfac < 0.0 { -1.0 } else { 1.0 };
    Ok(header.qform_affine::<f64>())
}

/// 序列化时使用的原始形式: 形状与行优先的仿射矩阵.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct RawGrid {
    shape: Idx3d,
    affine: [[f64; 4]; 4],
}

#[cfg(feature = "serde")]
impl TryFrom<RawGrid> for GridDescriptor {
    type Error = ParcError;

    fn try_from(raw: RawGrid) -> ParcResult<Self> {
        Self::new(raw.shape, Affine::from_fn(|r, c| raw.affine[r][c]))
    }
}

#[cfg(feature = "serde")]
impl From<GridDescriptor> for RawGrid {
    fn from(grid: GridDescriptor) -> Self {
        let a = grid.affine;
        Self {
            shape: grid.shape,
            affine: std::array::from_fn(|r| std::array::from_fn(|c| a[(r, c)])),
        }
    }
}
