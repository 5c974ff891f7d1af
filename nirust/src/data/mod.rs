use std::path::Path;

use nifti::{InMemNiftiVolume, NiftiHeader, NiftiObject, ReaderOptions};

use crate::error::{ParcError, ParcResult};
use crate::grid::GridDescriptor;
use crate::Idx3d;

mod label;
mod volume;

pub use label::LabelVolume;
pub use volume::Volume;

/// 体数据的网格属性和部分通用操作.
pub trait GridAttr {
    /// 获取网格描述符.
    fn grid(&self) -> &GridDescriptor;

    /// 获取空间形状 `(nx, ny, nz)`.
    #[inline]
    fn shape(&self) -> Idx3d {
        self.grid().shape()
    }

    /// 获取空间体素个数.
    #[inline]
    fn size(&self) -> usize {
        self.grid().len()
    }

    /// 检查索引是否合法.
    #[inline]
    fn check(&self, pos: &Idx3d) -> bool {
        self.grid().check(pos)
    }

    /// 获取单个体素在三个体素轴方向上的分辨率 (物理单位, 通常为毫米).
    #[inline]
    fn voxel_size(&self) -> [f64; 3] {
        self.grid().voxel_size()
    }

    /// 与 `other` 是否 "网格一致" (形状相同, 仿射矩阵逐元素误差不超过 `tol`).
    #[inline]
    fn is_grid_identical<G: GridAttr + ?Sized>(&self, other: &G, tol: f64) -> bool {
        self.grid().is_grid_identical(other.grid(), tol)
    }
}

/// 打开 nii 文件, 返回 header 与尚未转换元素类型的原始体数据.
fn read_nifti(path: &Path) -> ParcResult<(NiftiHeader, InMemNiftiVolume)> {
    log::debug!("Reading NIfTI at {:?}", path);
    let obj = ReaderOptions::new().read_file(path)?;
    let header = obj.header().clone();
    Ok((header, obj.into_volume()))
}

/// 内存中新建的体数据所使用的 header 模板.
fn blank_header() -> NiftiHeader {
    let mut header = NiftiHeader::default();
    // NIFTI_UNITS_MM | NIFTI_UNITS_SEC
    header.xyzt_units = 2 | 8;
    header
}

/// 写出时使用的 header: 以读入时的 header 为模板, 只替换仿射矩阵.
/// 数据维度与数据类型由写出器根据实际数组填充.
fn output_header(reference: &NiftiHeader, grid: &GridDescriptor) -> NiftiHeader {
    let mut header = reference.clone();
    grid.write_header(&mut header);
    header
}

/// 由 header 与实际数组形状构建网格.
fn grid_from_header(header: &NiftiHeader, shape: &[usize]) -> ParcResult<GridDescriptor> {
    let grid = GridDescriptor::from_header(header, spatial_shape(shape)?)?;
    log::debug!("Array shape {:?}, voxel size {:?}", shape, grid.voxel_size());
    Ok(grid)
}

/// 取数组形状的前三维.
fn spatial_shape(shape: &[usize]) -> ParcResult<Idx3d> {
    match shape {
        [x, y, z, ..] => Ok((*x, *y, *z)),
        _ => Err(ParcError::ShapeMismatch(vec![0; 3], shape.to_vec())),
    }
}

/// 检查数组空间形状是否与网格一致.
fn check_spatial_shape(grid: &GridDescriptor, shape: &[usize]) -> ParcResult<()> {
    let (x, y, z) = grid.shape();
    if shape.len() < 3 || shape[..3] != [x, y, z] {
        return Err(ParcError::ShapeMismatch(vec![x, y, z], shape.to_vec()));
    }
    Ok(())
}
