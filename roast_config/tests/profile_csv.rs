use std::fs::File;
use std::io::Write;

use roast_config::{ProfileRow, load_profile_csv, validate_profile_rows};
use rstest::rstest;
use tempfile::tempdir;

fn write_csv(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

#[rstest]
fn loads_well_formed_profile() {
    let dir = tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "profile.csv",
        "minutes,celsius\n0.0,24.0\n0.5,100.0\n5.0,160.0\n10.0,203.0\n",
    );
    let rows = load_profile_csv(&path).expect("load");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].minutes, 0.0);
    assert_eq!(rows[3].celsius, 203.0);
}

#[rstest]
fn rejects_wrong_headers() {
    let dir = tempdir().unwrap();
    let path = write_csv(dir.path(), "bad.csv", "time,temp\n0.0,24.0\n1.0,100.0\n");
    let err = load_profile_csv(&path).expect_err("should reject headers");
    assert!(format!("{err}").contains("minutes,celsius"));
}

#[rstest]
fn rejects_non_numeric_rows() {
    let dir = tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "bad.csv",
        "minutes,celsius\n0.0,24.0\nabc,100.0\n",
    );
    let err = load_profile_csv(&path).expect_err("should reject row");
    assert!(format!("{err}").contains("row 3"));
}

#[rstest]
fn rejects_single_waypoint() {
    let dir = tempdir().unwrap();
    let path = write_csv(dir.path(), "one.csv", "minutes,celsius\n0.0,24.0\n");
    assert!(load_profile_csv(&path).is_err());
}

#[rstest]
fn rejects_non_increasing_times() {
    let dir = tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "zigzag.csv",
        "minutes,celsius\n0.0,24.0\n2.0,100.0\n1.0,150.0\n",
    );
    let err = load_profile_csv(&path).expect_err("should reject zig-zag");
    assert!(format!("{err}").contains("strictly increasing"));
}

#[rstest]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(load_profile_csv(&dir.path().join("absent.csv")).is_err());
}

#[test]
fn row_validation_catches_non_finite_values() {
    let rows = vec![
        ProfileRow {
            minutes: 0.0,
            celsius: 24.0,
        },
        ProfileRow {
            minutes: 1.0,
            celsius: f64::INFINITY,
        },
    ];
    let err = validate_profile_rows(&rows).expect_err("should reject inf");
    assert!(format!("{err}").contains("non-finite"));
}
