use std::path::PathBuf;

use clap::Args;
use log::info;
use nirust::post_proc::{mask_hemisphere, Hemisphere};
use nirust::{ParcResult, Volume};

use super::{Context, Execute};

#[derive(Debug, Args)]
pub struct MaskArgs {
    /// 要掩膜的 NIfTI 影像.
    pub input: PathBuf,
    /// 输出 NIfTI 文件路径.
    pub output: PathBuf,
    /// 要掩膜的半球: left 或 right.
    pub side: Hemisphere,
}

impl Execute for MaskArgs {
    fn execute(&self, _ctx: &Context) -> ParcResult<()> {
        info!("Running mask-hemi command...");
        let volume = Volume::open(&self.input)?;
        mask_hemisphere(&volume, self.side).save(&self.output)?;
        info!("Saved masked image at {:?}", self.output);
        Ok(())
    }
}
