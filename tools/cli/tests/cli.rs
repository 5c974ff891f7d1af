use std::path::Path;
use std::process::{Command, Output};

use ndarray::Array3;
use nirust::prelude::*;
use tempfile::tempdir;

fn grid() -> GridDescriptor {
    GridDescriptor::axis_aligned((2, 2, 2), [2.0; 3], [0.0; 3]).unwrap()
}

fn write_inputs(dir: &Path, labels: Array3<u32>) {
    let data = Array3::from_shape_fn((2, 2, 2), |(i, j, k)| (i + 10 * j + 100 * k) as f32);
    Volume::from_3d(data, grid()).unwrap().save(dir.join("bold.nii")).unwrap();
    LabelVolume::new(labels, grid()).unwrap().save(dir.join("atlas.nii")).unwrap();
}

fn nirust(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nirust"))
        .current_dir(dir)
        .env("NIRUST_ATLAS_DIR", dir)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_parcellate_writes_table() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), Array3::from_shape_fn((2, 2, 2), |(i, _, _)| i as u32 + 1));

    let out = nirust(dir.path(), &["parcellate", "bold.nii", "atlas.nii", "out.tsv"]);
    assert!(out.status.success());

    let text = std::fs::read_to_string(dir.path().join("out.tsv")).unwrap();
    assert_eq!(text, "label_id\tfeature_1\n1\t55\n2\t56\n");
}

#[test]
fn test_error_reported_without_partial_table() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), Array3::zeros((2, 2, 2)));

    let out = nirust(dir.path(), &["parcellate", "bold.nii", "atlas.nii", "out.tsv"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("EmptyLabelSetError: label volume contains no foreground labels"));
    assert!(!dir.path().join("out.tsv").exists());
    assert!(!dir.path().join("out.tsv.partial").exists());
}

#[test]
fn test_unknown_atlas_name() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), Array3::from_elem((2, 2, 2), 1));

    let out = nirust(dir.path(), &["parcellate", "bold.nii", "nope", "out.tsv"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("AtlasNotFoundError: "));
    assert!(!dir.path().join("out.tsv").exists());

    // 图谱库中的 `atlas.nii` 可按名称引用.
    let out = nirust(dir.path(), &["parcellate", "bold.nii", "atlas", "out.tsv"]);
    assert!(out.status.success());
}

#[test]
fn test_list_atlases() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), Array3::from_elem((2, 2, 2), 1));

    let out = nirust(dir.path(), &["list-atlases"]);
    assert!(out.status.success());
    // `bold.nii` 同样位于该目录下, 也会被列出.
    assert_eq!(String::from_utf8_lossy(&out.stdout), "atlas\nbold\n");
}
