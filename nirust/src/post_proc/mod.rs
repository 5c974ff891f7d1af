//! 体数据后处理: 不依赖图谱的逐体素操作.

mod hemisphere;
mod tsnr;

pub use hemisphere::{mask_hemisphere, Hemisphere};
pub use tsnr::temporal_snr;
