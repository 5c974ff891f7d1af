use std::path::PathBuf;

use clap::Args;
use log::info;
use nirust::{resample, GridAttr, Interpolation, ParcResult, Volume};

use super::{Context, Execute};
use crate::profile::Profile;
use crate::result;

#[derive(Debug, Args)]
pub struct ResampleArgs {
    /// 要重采样的 NIfTI 影像.
    pub input: PathBuf,
    /// 提供目标网格的参考 NIfTI 影像.
    pub reference: PathBuf,
    /// 输出 NIfTI 文件路径.
    pub output: PathBuf,
    /// 插值策略: nearest (标签类数据) 或 linear (连续值数据).
    #[arg(long, default_value_t = Interpolation::Linear)]
    pub interpolation: Interpolation,
    /// 落在输入网格之外的体素取值, 可以为 `nan`.
    #[arg(long, default_value_t = 0.0)]
    pub fill: f32,
}

impl Execute for ResampleArgs {
    fn execute(&self, _ctx: &Context) -> ParcResult<()> {
        info!("Running resample-to-image command...");
        let mut profile = Profile::new();

        let source = Volume::open(&self.input)?;
        let reference = Volume::open(&self.reference)?;
        profile.stage("load");

        let out = resample(&source, reference.grid(), self.interpolation, self.fill)?;
        info!(
            "Resampled {:?} -> {:?} ({})",
            source.shape(),
            out.shape(),
            self.interpolation
        );
        profile.stage("resample");

        out.save(&self.output)?;
        info!("Saved resampled image at {:?}", self.output);
        profile.stage("save");

        result::log_summary("resample-to-image", None, &profile);
        Ok(())
    }
}
