use std::path::PathBuf;

use clap::Args;
use log::info;
use nirust::post_proc::temporal_snr;
use nirust::{ParcResult, Volume};

use super::{Context, Execute};

#[derive(Debug, Args)]
pub struct TsnrArgs {
    /// 需要计算逐体素 tSNR 的 4D NIfTI 影像.
    pub input: PathBuf,
    /// 输出 tSNR NIfTI 文件路径.
    pub output: PathBuf,
}

impl Execute for TsnrArgs {
    fn execute(&self, _ctx: &Context) -> ParcResult<()> {
        info!("Running temporal-snr command...");
        let volume = Volume::open(&self.input)?;
        temporal_snr(&volume)?.save(&self.output)?;
        info!("Saved tSNR image at {:?}", self.output);
        Ok(())
    }
}
