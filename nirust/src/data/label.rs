use std::collections::{BTreeMap, BTreeSet};
use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayD, ArrayView, Axis, Ix3};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader};
use num::ToPrimitive;

use super::{
    blank_header, check_spatial_shape, grid_from_header, output_header, read_nifti, GridAttr,
};
use crate::consts::label::is_foreground;
use crate::error::{ParcError, ParcResult};
use crate::grid::GridDescriptor;
use crate::Idx3d;

/// 标签体 (分区图谱). 体素值为非负整数, 以 `u32` 保存; 0 为背景.
///
/// 出现了哪些标签由数据本身决定, 不假设标签连续.
#[derive(Debug, Clone)]
pub struct LabelVolume {
    grid: GridDescriptor,
    data: Array3<u32>,
    header: NiftiHeader,
}

impl GridAttr for LabelVolume {
    #[inline]
    fn grid(&self) -> &GridDescriptor {
        &self.grid
    }
}

impl Index<Idx3d> for LabelVolume {
    type Output = u32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

/// 将原始体素值解码为标签. 负数、小数、非有限值均非法.
#[inline]
fn decode_label(v: f64) -> ParcResult<u32> {
    match v.to_u32() {
        Some(label) if label as f64 == v => Ok(label),
        _ => Err(ParcError::InvalidLabel(v)),
    }
}

impl LabelVolume {
    /// 由标签数组和网格创建标签体. 数组形状必须与网格一致.
    pub fn new(data: Array3<u32>, grid: GridDescriptor) -> ParcResult<Self> {
        check_spatial_shape(&grid, data.shape())?;
        Ok(Self {
            grid,
            data,
            header: blank_header(),
        })
    }

    /// 获取 header 相同, 但数据和网格被替换的新标签体.
    pub(crate) fn with_data(&self, grid: GridDescriptor, data: Array3<u32>) -> Self {
        debug_assert_eq!(data.dim(), grid.shape());
        Self {
            grid,
            data,
            header: self.header.clone(),
        }
    }

    /// 由原始 (浮点) 体素值创建标签体.
    ///
    /// `samples` 可以是 3D, 或只有一帧的 4D 数组. 任一体素不是非负整数时返回
    /// [`ParcError::InvalidLabel`].
    pub fn from_samples(samples: ArrayD<f64>, grid: GridDescriptor) -> ParcResult<Self> {
        check_spatial_shape(&grid, samples.shape())?;
        let shape = samples.shape().to_vec();
        let samples = match shape.as_slice() {
            [_, _, _] => samples,
            [_, _, _, 1] => samples.index_axis_move(Axis(3), 0),
            _ => {
                let (x, y, z) = grid.shape();
                return Err(ParcError::ShapeMismatch(vec![x, y, z], shape));
            }
        };
        let labels = samples
            .iter()
            .map(|v| decode_label(*v))
            .collect::<ParcResult<Vec<u32>>>()?;
        // 这里按逻辑顺序收集, 因此与底层内存布局无关.
        let data = Array3::from_shape_vec(grid.shape(), labels)
            .map_err(|_| ParcError::ShapeMismatch(vec![], shape))?;
        Self::new(data, grid)
    }

    /// 打开 nii 文件格式的标签体. 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> ParcResult<Self> {
        let (header, volume) = read_nifti(path.as_ref())?;
        let samples = volume.into_ndarray::<f64>()?;
        let grid = grid_from_header(&header, samples.shape())?;
        Ok(Self {
            header,
            ..Self::from_samples(samples, grid)?
        })
    }

    /// 以 nii 文件格式写出, 体素类型为 `u32`. 读入时的 header 除仿射矩阵外原样保留.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ParcResult<()> {
        let header = output_header(&self.header, &self.grid);
        WriterOptions::new(path.as_ref())
            .reference_header(&header)
            .write_nifti(&self.data)?;
        Ok(())
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u32, Ix3> {
        self.data.view()
    }

    /// 按升序获取出现过的所有前景 (正整数) 标签.
    pub fn labels(&self) -> Vec<u32> {
        self.data
            .iter()
            .copied()
            .filter(|p| is_foreground(*p))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 一次遍历收集每个前景标签覆盖的所有体素下标 (即该区域的 "足迹").
    ///
    /// 键按升序排列; 每个下标列表按行优先存储.
    pub fn footprints(&self) -> BTreeMap<u32, Vec<Idx3d>> {
        let mut ans: BTreeMap<u32, Vec<Idx3d>> = BTreeMap::new();
        for (pos, label) in self.data.indexed_iter() {
            if is_foreground(*label) {
                ans.entry(*label).or_default().push(pos);
            }
        }
        ans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr3, Array, IxDyn};
    use tempfile::tempdir;

    fn grid(shape: Idx3d) -> GridDescriptor {
        GridDescriptor::axis_aligned(shape, [1.0; 3], [0.0; 3]).unwrap()
    }

    #[test]
    fn test_labels_sorted_and_distinct() {
        let data = arr3(&[[[3, 0], [7, 1]], [[0, 3], [1, 7]]]);
        let lv = LabelVolume::new(data, grid((2, 2, 2))).unwrap();
        assert_eq!(lv.labels(), vec![1, 3, 7]);
        let fp = lv.footprints();
        assert_eq!(fp[&3].len(), 2);
        assert_eq!(fp.values().map(Vec::len).sum::<usize>(), 6);
        assert_eq!(fp.keys().copied().collect::<Vec<_>>(), vec![1, 3, 7]);
        assert_eq!(fp[&1], vec![(0, 1, 1), (1, 1, 0)]);
    }

    #[test]
    fn test_decode_labels() {
        let ok = Array::from_shape_vec(IxDyn(&[2, 1, 1, 1]), vec![0.0, 4.0]).unwrap();
        let lv = LabelVolume::from_samples(ok, grid((2, 1, 1))).unwrap();
        assert_eq!(lv[(1, 0, 0)], 4);

        for bad in [-1.0, 2.5, f64::NAN] {
            let data = Array::from_shape_vec(IxDyn(&[2, 1, 1]), vec![1.0, bad]).unwrap();
            let err = LabelVolume::from_samples(data, grid((2, 1, 1))).unwrap_err();
            assert!(matches!(err, ParcError::InvalidLabel(_)));
        }

        let two_frames = Array::<f64, _>::zeros(IxDyn(&[2, 1, 1, 2]));
        assert!(LabelVolume::from_samples(two_frames, grid((2, 1, 1))).is_err());
    }

    #[test]
    fn test_label_nifti_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.nii.gz");
        let data = Array3::from_shape_fn((4, 3, 2), |(i, j, k)| ((i + j + k) % 4) as u32 * 10);
        let lv = LabelVolume::new(data, grid((4, 3, 2))).unwrap();
        lv.save(&path).unwrap();

        let back = LabelVolume::open(&path).unwrap();

        assert_eq!(back.labels(), vec![10, 20, 30]);
        assert_eq!(back.data(), lv.data());
    }
}
