use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::{TABLE_LABEL_COLUMN, TABLE_MISSING_VALUE};

/// 区域表: 每行对应一个前景标签 (按标签值升序), 每列对应一个特征 (帧).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RawTable", into = "RawTable")
)]
pub struct RegionTable {
    labels: Vec<u32>,
    values: Array2<f64>,
}

impl RegionTable {
    /// 由升序标签和 `(标签数, 特征数)` 形状的值矩阵拼装.
    pub(crate) fn new(labels: Vec<u32>, values: Array2<f64>) -> Self {
        debug_assert_eq!(labels.len(), values.nrows());
        debug_assert!(labels.windows(2).all(|w| w[0] < w[1]));
        Self { labels, values }
    }

    /// 行标签, 升序.
    #[inline]
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// 值矩阵, 形状为 `(区域数, 特征数)`.
    #[inline]
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// 区域 (行) 数.
    #[inline]
    pub fn n_regions(&self) -> usize {
        self.labels.len()
    }

    /// 特征 (列) 数.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    /// 获取标签 `label` 所在的行. 标签不存在时返回 `None`.
    pub fn row(&self, label: u32) -> Option<ArrayView1<'_, f64>> {
        let r = self.labels.binary_search(&label).ok()?;
        Some(self.values.index_axis(Axis(0), r))
    }

    /// 获取标签 `label` 的第 `feature` 个特征值.
    #[inline]
    pub fn get(&self, label: u32, feature: usize) -> Option<f64> {
        self.row(label)?.get(feature).copied()
    }

    /// 以 `sep` 为分隔符写出表格. 首行为列名, `NaN` 写作 `n/a`.
    pub fn write_delimited<W: Write>(&self, mut w: W, sep: &str) -> io::Result<()> {
        let header = (1..=self.n_features()).map(|c| format!("feature_{c}"));
        writeln!(
            w,
            "{TABLE_LABEL_COLUMN}{sep}{}",
            header.format(sep)
        )?;

        #[inline]
        fn cell(v: &f64) -> String {
            if v.is_nan() {
                TABLE_MISSING_VALUE.to_string()
            } else {
                v.to_string()
            }
        }

        for (label, row) in self.labels.iter().zip(self.values.outer_iter()) {
            writeln!(w, "{label}{sep}{}", row.iter().map(cell).join(sep))?;
        }
        w.flush()
    }

    /// 以制表符为分隔符写出表格.
    #[inline]
    pub fn write_tsv<W: Write>(&self, w: W) -> io::Result<()> {
        self.write_delimited(w, "\t")
    }

    /// 将表格以 TSV 格式保存到 `path`.
    ///
    /// 先写入同目录下的临时文件, 完整写出后再重命名, 因此失败时不会留下不完整的表格.
    pub fn save_tsv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".partial");
        let tmp = Path::new(&tmp);

        let written = File::create(tmp).and_then(|f| self.write_tsv(BufWriter::new(f)));
        if let Err(e) = written {
            std::fs::remove_file(tmp).ok();
            return Err(e);
        }
        std::fs::rename(tmp, path)
    }
}

/// 序列化时使用的原始形式. 反序列化后需重新检查标签顺序与行数.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct RawTable {
    labels: Vec<u32>,
    values: Array2<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTable> for RegionTable {
    type Error = String;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        if raw.labels.len() != raw.values.nrows() {
            return Err(format!(
                "{} label(s) but {} row(s)",
                raw.labels.len(),
                raw.values.nrows()
            ));
        }
        if !raw.labels.windows(2).all(|w| w[0] < w[1]) {
            return Err("labels must be strictly ascending".to_string());
        }
        Ok(Self::new(raw.labels, raw.values))
    }
}

#[cfg(feature = "serde")]
impl From<RegionTable> for RawTable {
    fn from(table: RegionTable) -> Self {
        Self {
            labels: table.labels,
            values: table.values,
        }
    }
}
