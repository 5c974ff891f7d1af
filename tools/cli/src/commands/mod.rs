//! 命令行参数与子命令.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use nirust::dataset::AtlasStore;
use nirust::{LabelVolume, ParcError, ParcResult};

mod list;
mod mask;
mod parcellate;
mod resample;
mod tsnr;

pub use list::ListArgs;
pub use mask::MaskArgs;
pub use parcellate::ParcellateArgs;
pub use resample::ResampleArgs;
pub use tsnr::TsnrArgs;

/// 将脑影像按分区图谱归约为区域表, 以及若干逐体素工具.
#[derive(Debug, Parser)]
#[command(name = "nirust", version)]
pub struct Cli {
    /// 输出调试级别日志.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 工作线程数. 默认为可用核心数.
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// 图谱库目录. 未给出时依次尝试 `$NIRUST_ATLAS_DIR` 与 `$HOME/dataset/atlases`.
    #[arg(long, global = true, value_name = "DIR")]
    pub atlas_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub action: Command,
}

/// 子命令.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 按图谱的每个区域归约影像, 写出 TSV 区域表.
    Parcellate(ParcellateArgs),
    /// 将影像重采样到参考影像的网格上.
    ResampleToImage(ResampleArgs),
    /// 将左或右半球的体素置为 NaN.
    MaskHemi(MaskArgs),
    /// 逐体素计算 4D 影像的时间信噪比.
    TemporalSnr(TsnrArgs),
    /// 列出图谱库中的所有图谱.
    ListAtlases(ListArgs),
}

impl Command {
    /// 子命令名称.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Parcellate(_) => "parcellate",
            Command::ResampleToImage(_) => "resample-to-image",
            Command::MaskHemi(_) => "mask-hemi",
            Command::TemporalSnr(_) => "temporal-snr",
            Command::ListAtlases(_) => "list-atlases",
        }
    }

    /// 执行子命令.
    pub fn execute(&self, ctx: &Context) -> ParcResult<()> {
        match self {
            Command::Parcellate(cmd) => cmd.execute(ctx),
            Command::ResampleToImage(cmd) => cmd.execute(ctx),
            Command::MaskHemi(cmd) => cmd.execute(ctx),
            Command::TemporalSnr(cmd) => cmd.execute(ctx),
            Command::ListAtlases(cmd) => cmd.execute(ctx),
        }
    }
}

/// 子命令运行时共享的配置.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// 图谱库. 无法确定任何图谱库目录时为 `None`.
    pub atlas_store: Option<AtlasStore>,
}

impl Context {
    /// 打开图谱: `atlas` 是已存在的文件时直接打开, 否则作为图谱名在图谱库中查找.
    pub fn open_atlas(&self, atlas: &str) -> ParcResult<LabelVolume> {
        let path = Path::new(atlas);
        if path.is_file() {
            return LabelVolume::open(path);
        }
        match &self.atlas_store {
            Some(store) => store.open(atlas),
            None => Err(ParcError::AtlasNotFound(atlas.to_string())),
        }
    }
}

/// 每个子命令都实现该 trait.
pub trait Execute {
    /// 执行命令.
    fn execute(&self, ctx: &Context) -> ParcResult<()>;
}
