//! 通用常量.

/// 标签值.
pub mod label {
    /// 标签体中背景 (不属于任何区域) 的体素值.
    pub const BACKGROUND: u32 = 0;

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(p: u32) -> bool {
        p == BACKGROUND
    }

    /// 体素是否是前景 (属于某个区域)?
    #[inline]
    pub const fn is_foreground(p: u32) -> bool {
        !is_background(p)
    }
}

/// 判定两个网格 "网格一致" 时, 仿射矩阵逐元素允许的默认误差 (物理单位, 通常为毫米).
pub const DEFAULT_GRID_TOLERANCE: f64 = 1e-4;

/// 仿射矩阵线性部分的行列式绝对值小于该值时, 视为不可逆.
pub const SINGULAR_EPSILON: f64 = 1e-12;

/// qform 四元数 `(b, c, d)` 模长平方允许超出 1 的量.
pub const QUATERNION_TOLERANCE: f64 = 2.0 * f32::EPSILON as f64;

/// 区域表写出时, 缺失值 (`NaN`) 的文本表示.
pub const TABLE_MISSING_VALUE: &str = "n/a";

/// 区域表首列列名.
pub const TABLE_LABEL_COLUMN: &str = "label_id";
