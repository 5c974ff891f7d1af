//! 运行时错误.

use thiserror::Error;

/// 重采样、聚合与分区流程的运行时错误.
///
/// 所有错误都在构造阶段或组件调用的入口处尽早检测, 并原样向外传播.
/// 该流程是确定性的数值计算, 因此不做任何重试或自动修正.
#[derive(Debug, Error)]
pub enum ParcError {
    /// 网格仿射矩阵不可逆.
    #[error("affine is not invertible (determinant {0:e})")]
    SingularGrid(f64),

    /// NIfTI header 中的空间信息无法解释 (例如非法的 qform).
    #[error("invalid NIfTI header: {0}")]
    InvalidHeader(String),

    /// 网格一致判定的误差不是有限非负数.
    #[error("grid tolerance {0} must be finite and non-negative")]
    InvalidTolerance(f64),

    /// 数组形状与其声明的网格形状不一致, 或数组维数不受支持.
    ///
    /// 第一个参数代表期望形状, 第二个参数代表实际形状.
    #[error("array shape {1:?} does not match grid shape {0:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// 聚合时特征体与标签体不是 "网格一致" 的.
    #[error("feature grid {feature:?} and label grid {label:?} are not grid-identical")]
    GridMismatch {
        /// 特征体网格形状.
        feature: [usize; 3],
        /// 标签体网格形状.
        label: [usize; 3],
    },

    /// 标签体不含任何前景标签.
    #[error("label volume contains no foreground labels")]
    EmptyLabelSet,

    /// 标签体素值不是非负整数.
    #[error("label sample {0} is not a non-negative integer")]
    InvalidLabel(f64),

    /// 需要时间维 (至少两帧) 的操作作用在了 3D 体上.
    #[error("operation needs a 4D volume with at least 2 frames, found {0} frame(s)")]
    MissingTimeAxis(usize),

    /// 图谱库中找不到给定名称的图谱.
    #[error("atlas `{0}` not found in atlas store")]
    AtlasNotFound(String),

    /// NIfTI 读写错误.
    #[error(transparent)]
    Nifti(#[from] nifti::NiftiError),

    /// 其他底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ParcError {
    /// 错误种类名称, 供命令行输出使用.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SingularGrid(_) => "SingularGridError",
            Self::InvalidHeader(_) => "InvalidHeaderError",
            Self::InvalidTolerance(_) => "InvalidToleranceError",
            Self::ShapeMismatch(..) => "ShapeMismatchError",
            Self::GridMismatch { .. } => "GridMismatchError",
            Self::EmptyLabelSet => "EmptyLabelSetError",
            Self::InvalidLabel(_) => "InvalidLabelError",
            Self::MissingTimeAxis(_) => "MissingTimeAxisError",
            Self::AtlasNotFound(_) => "AtlasNotFoundError",
            Self::Nifti(_) => "NiftiError",
            Self::Io(_) => "IoError",
        }
    }
}

/// 分区流程运行时结果.
pub type ParcResult<T> = Result<T, ParcError>;
