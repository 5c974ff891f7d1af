use std::fmt;
use std::str::FromStr;

use ordered_float::NotNan;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 将一个区域内的多个体素值合并为一个标量的策略.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Reducer {
    /// 算术平均值.
    #[default]
    Mean,
    /// 求和.
    Sum,
    /// 中位数. 偶数个值时取中间两个值的平均.
    Median,
    /// 总体标准差 (除数为 `n`).
    Std,
}

impl Reducer {
    /// 所有可选策略.
    pub const ALL: [Reducer; 4] = [Reducer::Mean, Reducer::Sum, Reducer::Median, Reducer::Std];

    /// 合并 `values`. 空集合返回 `NaN`.
    ///
    /// `values` 会被原地重排 (中位数需要排序).
    pub fn reduce(&self, values: &mut [NotNan<f64>]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        let n = values.len() as f64;
        match self {
            Reducer::Sum => sum(values),
            Reducer::Mean => sum(values) / n,
            Reducer::Std => {
                let mean = sum(values) / n;
                let sq = values
                    .iter()
                    .map(|v| (v.into_inner() - mean).powi(2))
                    .sum::<f64>();
                (sq / n).sqrt()
            }
            Reducer::Median => {
                values.sort_unstable();
                let mid = values.len() / 2;
                if values.len() % 2 == 1 {
                    values[mid].into_inner()
                } else {
                    (values[mid - 1].into_inner() + values[mid].into_inner()) / 2.0
                }
            }
        }
    }
}

#[inline]
fn sum(values: &[NotNan<f64>]) -> f64 {
    values.iter().map(|v| v.into_inner()).sum()
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Reducer::Mean => "mean",
            Reducer::Sum => "sum",
            Reducer::Median => "median",
            Reducer::Std => "std",
        };
        f.write_str(s)
    }
}

impl FromStr for Reducer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Reducer::ALL
            .into_iter()
            .find(|r| r.to_string() == lower)
            .ok_or_else(|| format!("unknown reducer `{s}`, expected one of mean, sum, median, std"))
    }
}
