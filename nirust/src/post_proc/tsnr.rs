//! 时间信噪比 (temporal SNR).

use ndarray::{Array3, Axis, Zip};

use crate::data::{GridAttr, Volume};
use crate::error::{ParcError, ParcResult};

/// 逐体素计算时间信噪比: 时间维均值除以时间维样本标准差 (除数 `n - 1`).
///
/// 输入必须是至少两帧的 4D 体数据, 否则返回 [`ParcError::MissingTimeAxis`].
/// 结果为与输入网格、header 相同的 3D 体数据. 标准差为 0 的体素按 IEEE 规则得到
/// `inf` 或 `NaN`.
pub fn temporal_snr(volume: &Volume) -> ParcResult<Volume> {
    let frames = volume.frames();
    if !volume.is_4d() || frames < 2 {
        return Err(ParcError::MissingTimeAxis(frames));
    }
    log::info!("Computing tSNR over {frames} frame(s)");

    let data = volume.data();
    let mut out = Array3::<f32>::zeros(volume.shape());
    let n = frames as f64;
    Zip::from(&mut out)
        .and(data.lanes(Axis(3)))
        .for_each(|o, series| {
            let mean = series.iter().map(|v| *v as f64).sum::<f64>() / n;
            let var = series
                .iter()
                .map(|v| (*v as f64 - mean).powi(2))
                .sum::<f64>()
                / (n - 1.0);
            *o = (mean / var.sqrt()) as f32;
        });

    Ok(volume.with_frame(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridDescriptor;
    use ndarray::Array4;

    fn grid() -> GridDescriptor {
        GridDescriptor::axis_aligned((2, 1, 1), [1.0; 3], [0.0; 3]).unwrap()
    }

    #[test]
    fn test_tsnr() {
        // 体素 0: [1, 2, 3] -> mean 2, sample std 1 -> 2.
        // 体素 1: [5, 5, 5] -> std 0 -> inf.
        let data = Array4::from_shape_vec((2, 1, 1, 3), vec![1.0, 2.0, 3.0, 5.0, 5.0, 5.0]).unwrap();
        let v = Volume::from_4d(data, grid()).unwrap();
        let out = temporal_snr(&v).unwrap();
        assert!(!out.is_4d());
        assert_eq!(out.shape(), (2, 1, 1));
        assert!((out.frame(0)[[0, 0, 0]] - 2.0).abs() < 1e-6);
        assert!(out.frame(0)[[1, 0, 0]].is_infinite());
    }

    #[test]
    fn test_tsnr_needs_time_axis() {
        let v = Volume::from_3d(Array3::zeros((2, 1, 1)), grid()).unwrap();
        assert!(matches!(temporal_snr(&v), Err(ParcError::MissingTimeAxis(1))));

        let one = Volume::from_4d(Array4::zeros((2, 1, 1, 1)), grid()).unwrap();
        assert!(matches!(temporal_snr(&one), Err(ParcError::MissingTimeAxis(1))));
    }
}
