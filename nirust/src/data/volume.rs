use std::path::Path;

use ndarray::{Array3, Array4, ArrayD, ArrayView3, ArrayView4, Axis, Ix4};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader};

use super::{
    blank_header, check_spatial_shape, grid_from_header, output_header, read_nifti, GridAttr,
};
use crate::error::{ParcError, ParcResult};
use crate::grid::GridDescriptor;

/// 连续值体数据, 体素值以 `f32` 保存.
///
/// 数据按 NIfTI 惯例以 `[x, y, z, t]` 组织, 即体素 `(i, j, k)` 直接对应网格仿射矩阵的输入.
/// 3D 数据内部同样以 `t == 1` 的 4D 数组保存, 并记住其原始维数以便原样写出.
///
/// 从文件读入的体数据会保留原 header, 写出时只替换其中的仿射矩阵与维度信息.
///
/// 该结构构造后只读.
#[derive(Debug, Clone)]
pub struct Volume {
    grid: GridDescriptor,
    data: Array4<f32>,
    is_4d: bool,
    header: NiftiHeader,
}

impl GridAttr for Volume {
    #[inline]
    fn grid(&self) -> &GridDescriptor {
        &self.grid
    }
}

impl Volume {
    /// 由 3D 或 4D 数组和网格创建体数据.
    ///
    /// 数组前三维必须与网格形状一致, 否则返回 [`ParcError::ShapeMismatch`].
    pub fn new(data: ArrayD<f32>, grid: GridDescriptor) -> ParcResult<Self> {
        Self::with_header(data, grid, blank_header())
    }

    fn with_header(
        data: ArrayD<f32>,
        grid: GridDescriptor,
        header: NiftiHeader,
    ) -> ParcResult<Self> {
        check_spatial_shape(&grid, data.shape())?;
        let is_4d = match data.ndim() {
            3 => false,
            4 => true,
            _ => {
                let (x, y, z) = grid.shape();
                return Err(ParcError::ShapeMismatch(vec![x, y, z], data.shape().to_vec()));
            }
        };
        let shape = data.shape().to_vec();
        let data = if is_4d {
            data
        } else {
            data.insert_axis(Axis(3))
        };
        let data = data
            .into_dimensionality::<Ix4>()
            .map_err(|_| ParcError::ShapeMismatch(shape.clone(), shape))?;
        Ok(Self {
            grid,
            data,
            is_4d,
            header,
        })
    }

    /// 由 3D 数组创建体数据.
    #[inline]
    pub fn from_3d(data: Array3<f32>, grid: GridDescriptor) -> ParcResult<Self> {
        Self::new(data.into_dyn(), grid)
    }

    /// 由 4D 数组创建体数据, 第四维为重复测量 (时间点).
    #[inline]
    pub fn from_4d(data: Array4<f32>, grid: GridDescriptor) -> ParcResult<Self> {
        Self::new(data.into_dyn(), grid)
    }

    /// 打开 nii 文件格式的 3D/4D 影像. `path` 为 nii (或 nii.gz) 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> ParcResult<Self> {
        let (header, volume) = read_nifti(path.as_ref())?;
        let data = volume.into_ndarray::<f32>()?;
        let grid = grid_from_header(&header, data.shape())?;
        Self::with_header(data, grid, header)
    }

    /// 以 nii 文件格式写出. header 中的仿射矩阵由网格生成 (sform).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ParcResult<()> {
        let header = output_header(&self.header, &self.grid);
        let writer = WriterOptions::new(path.as_ref()).reference_header(&header);
        if self.is_4d {
            writer.write_nifti(&self.data)?;
        } else {
            writer.write_nifti(&self.frame(0))?;
        }
        log::debug!("Saved volume {:?} to {:?}", self.data.dim(), path.as_ref());
        Ok(())
    }

    /// 读入时的 NIfTI header. 内存中新建的体数据为一个空白模板.
    #[inline]
    pub fn header(&self) -> &NiftiHeader {
        &self.header
    }

    /// 是否为 4D (带重复测量维) 数据.
    #[inline]
    pub fn is_4d(&self) -> bool {
        self.is_4d
    }

    /// 帧数 (第四维大小). 3D 数据为 1.
    #[inline]
    pub fn frames(&self) -> usize {
        self.data.len_of(Axis(3))
    }

    /// 获取第 `t` 帧的 3D 视图.
    ///
    /// 当 `t` 越界时 panic.
    #[inline]
    pub fn frame(&self, t: usize) -> ArrayView3<'_, f32> {
        self.data.index_axis(Axis(3), t)
    }

    /// 获取能按升序迭代所有帧的迭代器.
    #[inline]
    pub fn frame_iter(&self) -> impl ExactSizeIterator<Item = ArrayView3<'_, f32>> {
        self.data.axis_iter(Axis(3))
    }

    /// 获得数据的一份不可变 shallow copy (`[x, y, z, t]`).
    #[inline]
    pub fn data(&self) -> ArrayView4<'_, f32> {
        self.data.view()
    }

    /// 消费自我, 获得底层数据. 3D 数据返回 3 维数组.
    pub fn into_data(self) -> ArrayD<f32> {
        if self.is_4d {
            self.data.into_dyn()
        } else {
            self.data.index_axis_move(Axis(3), 0).into_dyn()
        }
    }

    /// 获取 3D/4D 标记与 header 均相同, 但数据和网格被替换的新体数据.
    pub(crate) fn with_data(&self, grid: GridDescriptor, data: Array4<f32>) -> Self {
        debug_assert_eq!(data.dim().0, grid.shape().0);
        debug_assert_eq!(data.dim().1, grid.shape().1);
        debug_assert_eq!(data.dim().2, grid.shape().2);
        Self {
            grid,
            data,
            is_4d: self.is_4d,
            header: self.header.clone(),
        }
    }

    /// 获取网格与 header 均相同的单帧 3D 体数据.
    pub(crate) fn with_frame(&self, frame: Array3<f32>) -> Self {
        debug_assert_eq!(frame.dim(), self.grid.shape());
        Self {
            grid: self.grid.clone(),
            data: frame.insert_axis(Axis(3)),
            is_4d: false,
            header: self.header.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};
    use tempfile::tempdir;

    fn grid(shape: (usize, usize, usize)) -> GridDescriptor {
        GridDescriptor::axis_aligned(shape, [2.0; 3], [-10.0, 0.0, 5.0]).unwrap()
    }

    #[test]
    fn test_volume_shape_check() {
        let data = Array::<f32, _>::zeros(IxDyn(&[2, 3, 4]));
        assert!(Volume::new(data.clone(), grid((2, 3, 4))).is_ok());

        let err = Volume::new(data, grid((2, 3, 5))).unwrap_err();
        assert!(matches!(err, ParcError::ShapeMismatch(..)));

        let flat = Array::<f32, _>::zeros(IxDyn(&[2, 3]));
        assert!(Volume::new(flat, grid((2, 3, 1))).is_err());

        let five = Array::<f32, _>::zeros(IxDyn(&[2, 3, 4, 1, 2]));
        assert!(Volume::new(five, grid((2, 3, 4))).is_err());
    }

    #[test]
    fn test_volume_frames() {
        let data = Array4::from_shape_fn((2, 2, 2, 3), |(i, j, k, t)| {
            (i + 2 * j + 4 * k) as f32 + 100.0 * t as f32
        });
        let v = Volume::from_4d(data, grid((2, 2, 2))).unwrap();
        assert!(v.is_4d());
        assert_eq!(v.frames(), 3);
        assert_eq!(v.frame(2)[[1, 1, 1]], 207.0);
        assert_eq!(v.frame_iter().len(), 3);

        let v3 = Volume::from_3d(Array3::zeros((2, 2, 2)), grid((2, 2, 2))).unwrap();
        assert!(!v3.is_4d());
        assert_eq!(v3.frames(), 1);
        assert_eq!(v3.into_data().ndim(), 3);
    }

    #[test]
    fn test_volume_nifti_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("volume.nii");
        let data = Array3::from_shape_fn((3, 4, 5), |(i, j, k)| (i * 100 + j * 10 + k) as f32);
        let v = Volume::from_3d(data.clone(), grid((3, 4, 5))).unwrap();
        v.save(&path).unwrap();

        let back = Volume::open(&path).unwrap();
        assert!(!back.is_4d());
        assert_eq!(back.shape(), (3, 4, 5));
        assert_eq!(back.size(), 60);
        assert!(back.check(&(2, 3, 4)) && !back.check(&(3, 0, 0)));
        assert!(back.is_grid_identical(&v, 1e-4));
        assert_eq!(back.frame(0), data.view());
    }

    #[test]
    fn test_volume_keeps_header() {
        let dir = tempdir().unwrap();
        let (input, output) = (dir.path().join("bold.nii"), dir.path().join("copy.nii"));

        let g = grid((2, 2, 2));
        let mut header = NiftiHeader::default();
        g.write_header(&mut header);
        header.pixdim[4] = 2.5;
        header.set_description_str("resting state").unwrap();
        WriterOptions::new(&input)
            .reference_header(&header)
            .write_nifti(&Array4::<f32>::zeros((2, 2, 2, 3)))
            .unwrap();

        let v = Volume::open(&input).unwrap();
        assert_eq!(v.header().pixdim[4], 2.5);
        v.save(&output).unwrap();

        let back = NiftiHeader::from_file(&output).unwrap();
        assert_eq!(back.pixdim[4], 2.5);
        assert!(back.descrip.starts_with(b"resting state"));
        assert_eq!(back.dim[..5], [4, 2, 2, 2, 3]);
    }
}
