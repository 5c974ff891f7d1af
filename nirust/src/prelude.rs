//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::consts::label::{is_background, is_foreground, BACKGROUND};
pub use crate::consts::DEFAULT_GRID_TOLERANCE;

pub use crate::data::{GridAttr, LabelVolume, Volume};
pub use crate::grid::{Affine, GridDescriptor};
pub use crate::{ParcError, ParcResult};

pub use crate::aggregate::{aggregate, Reducer, RegionTable};
pub use crate::pipeline::{parcellate, Parcellator};
pub use crate::resample::{resample, resample_labels, Interpolation};

pub use crate::post_proc::{mask_hemisphere, temporal_snr, Hemisphere};

pub use crate::dataset::{self, home_dataset_dir_with, AtlasStore};
