#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 将 3D/4D 脑影像按分区图谱 (atlas) 归约为区域表.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 数据流
//!
//! 源影像 + 图谱 → 两者的网格描述符 → 将图谱重采样到源影像网格 →
//! 按 (对齐后的) 图谱标签聚合源影像体素 → 区域表.
//!
//! # 注意
//!
//! 1. 体数据按 NIfTI 惯例以 `[x, y, z, t]` 组织, 体素索引直接作为仿射矩阵的输入.
//! 2. 所有错误都以 [`ParcError`] 返回, 不做任何自动修正 (不自动换方向重采样,
//!   不重新编号标签).
//!
//! # 开发计划
//!
//! ### 网格描述符 ✅
//!
//! 形状 + 4x4 仿射矩阵, 体素坐标与世界坐标互转, "网格一致" 判定.
//! 支持从 NIfTI header 的 sform / qform / pixdim 读取.
//!
//! 实现位于 `nirust/src/grid.rs`.
//!
//! ### 重采样 ✅
//!
//! 最近邻与三线性插值. 标签体只允许最近邻.
//!
//! 实现位于 `nirust/src/resample`.
//!
//! ### 按标签聚合 ✅
//!
//! `mean` / `sum` / `median` / `std` 四种归约策略, 4D 数据每帧一列.
//!
//! 实现位于 `nirust/src/aggregate`.
//!
//! ### 分区流程 ✅
//!
//! 总是把图谱重采样到源影像网格, 从不重采样源影像.
//!
//! 实现位于 `nirust/src/pipeline.rs`.
//!
//! ### 本地图谱库 ✅
//!
//! 实现位于 `nirust/src/dataset`.
//!
//! ### 小功能 ✅
//!
//! 1. 半球掩膜. ✅
//! 2. 逐体素时间信噪比. ✅
//!
//! 实现位于 `nirust/src/post_proc`.
//!
//! ### 更高阶插值 ⌛️
//!
//! 连续值数据的三次 B 样条插值.

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

pub mod consts;

/// 体数据与标签体, 及其 NIfTI 读写.
pub mod data;

pub mod dataset;

mod error;

pub mod grid;

pub mod aggregate;

pub mod pipeline;

pub mod post_proc;

pub mod resample;

pub mod prelude;

pub use aggregate::{aggregate, Reducer, RegionTable};
pub use data::{GridAttr, LabelVolume, Volume};
pub use error::{ParcError, ParcResult};
pub use grid::GridDescriptor;
pub use pipeline::{parcellate, Parcellator};
pub use resample::{resample, resample_labels, Interpolation};
