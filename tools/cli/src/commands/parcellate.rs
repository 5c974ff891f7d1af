use std::path::PathBuf;

use clap::Args;
use log::info;
use nirust::consts::DEFAULT_GRID_TOLERANCE;
use nirust::{GridAttr, ParcResult, Parcellator, Reducer, Volume};

use super::{Context, Execute};
use crate::profile::Profile;
use crate::result;

#[derive(Debug, Args)]
pub struct ParcellateArgs {
    /// 要分区的 NIfTI 影像 (3D 或 4D).
    pub input: PathBuf,
    /// 分区图谱: NIfTI 文件路径, 或图谱库中的图谱名.
    pub parcellation: String,
    /// 输出 .tsv 文件路径.
    pub output: PathBuf,
    /// 区域内体素值的归约策略: mean, sum, median, std.
    #[arg(long, default_value_t = Reducer::Mean)]
    pub reducer: Reducer,
    /// 判定两个网格一致时允许的仿射矩阵误差.
    #[arg(long, default_value_t = DEFAULT_GRID_TOLERANCE)]
    pub tolerance: f64,
}

impl Execute for ParcellateArgs {
    fn execute(&self, ctx: &Context) -> ParcResult<()> {
        info!("Running parcellate command...");
        let mut profile = Profile::new();

        let source = Volume::open(&self.input)?;
        let atlas = ctx.open_atlas(&self.parcellation)?;
        info!(
            "Image {:?} x {} frame(s), atlas {:?} with {} label(s)",
            source.shape(),
            source.frames(),
            atlas.shape(),
            atlas.labels().len()
        );
        profile.stage("load");

        let table = Parcellator::new()
            .reducer(self.reducer)
            .tolerance(self.tolerance)
            .run(&source, &atlas)?;
        profile.stage("parcellate");

        table.save_tsv(&self.output)?;
        info!("Saved region table at {:?}", self.output);
        profile.stage("save");

        result::log_summary("parcellate", Some(&table), &profile);
        Ok(())
    }
}
