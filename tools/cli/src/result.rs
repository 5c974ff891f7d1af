//! 命令运行结果.

use crate::profile::Profile;
use nirust::RegionTable;
use std::io::{self, Write};

const S4: &str = "    ";

#[inline]
fn f64_to_display(f: Option<f64>) -> String {
    match f {
        Some(f) => format!("{f:.6}"),
        None => "/".to_string(),
    }
}

/// 将区域表 `table` 的概要写进 `w` 中.
pub fn describe_table_into<W: Write>(table: &RegionTable, w: &mut W) -> io::Result<()> {
    let values = table.values();
    let missing = values.iter().filter(|v| v.is_nan()).count();
    let finite = || values.iter().copied().filter(|v| v.is_finite());

    writeln!(w, "Region table:")?;
    writeln!(w, "{S4}Regions: {}", table.n_regions())?;
    writeln!(w, "{S4}Features: {}", table.n_features())?;
    writeln!(
        w,
        "{S4}Label range: {} .. {}",
        table.labels().first().map_or("/".to_string(), u32::to_string),
        table.labels().last().map_or("/".to_string(), u32::to_string)
    )?;
    writeln!(w, "{S4}Missing cells: {missing}")?;
    writeln!(w, "{S4}Min value: {}", f64_to_display(finite().reduce(f64::min)))?;
    write!(w, "{S4}Max value: {}", f64_to_display(finite().reduce(f64::max)))?;
    Ok(())
}

/// 将阶段耗时 `p` 写进 `w` 中.
pub fn describe_profile_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    writeln!(w, "Profile `{name}`:")?;
    for (stage, d) in p.stages() {
        writeln!(w, "{S4}{stage}: {} ms", d.as_millis())?;
    }
    writeln!(w, "{S4}Total: {} ms", p.total().as_millis())?;
    let most = p.most_time_consuming().map_or("/", |(n, _)| n);
    write!(w, "{S4}Most time-consuming stage: {most}")?;
    Ok(())
}

/// 将上述概要以 `info` 级别写进日志.
pub fn log_summary(name: &str, table: Option<&RegionTable>, p: &Profile) {
    let mut buf = Vec::with_capacity(512);
    let written = match table {
        Some(t) => describe_table_into(t, &mut buf).and_then(|_| utils::sep_to(&mut buf)),
        None => Ok(()),
    }
    .and_then(|_| describe_profile_into(name, p, &mut buf));
    if written.is_ok() {
        log::info!("\n{}", String::from_utf8_lossy(&buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nirust::prelude::*;
    use ndarray::arr3;

    #[test]
    fn test_describe_table() {
        let g = GridDescriptor::axis_aligned((3, 1, 1), [1.0; 3], [0.0; 3]).unwrap();
        let features = Volume::from_3d(arr3(&[[[1.0]], [[f32::NAN]], [[4.0]]]), g.clone()).unwrap();
        let labels = LabelVolume::new(arr3(&[[[2]], [[5]], [[2]]]), g).unwrap();
        let table = aggregate(&features, &labels, Reducer::Sum).unwrap();

        let mut buf = Vec::new();
        describe_table_into(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Regions: 2"));
        assert!(text.contains("Label range: 2 .. 5"));
        assert!(text.contains("Missing cells: 1"));
        assert!(text.ends_with("Max value: 5.000000"));
    }

    #[test]
    fn test_describe_profile() {
        let mut p = Profile::new();
        p.stage("load");
        let mut buf = Vec::new();
        describe_profile_into("parcellate", &p, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Profile `parcellate`:"));
        assert!(text.contains("load: "));
        assert!(text.ends_with("Most time-consuming stage: load"));
    }
}
