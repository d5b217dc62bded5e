use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_fast_config(dir: &tempfile::TempDir) -> PathBuf {
    // Big speedup and short horizon keep wall-clock time negligible.
    let toml = r#"
[simulation]
timestep_s = 1.5
preheat_temp_c = 180.0
charge_settle_s = 2.0
forecast_horizon_s = 6.0
speedup = 20000.0
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "self-check OK", "stdout")]
#[case(&["profile"], 0, "minutes,celsius", "stdout")]
#[case(&["profile", "--kind", "ramp", "--start-c", "30", "--end-c", "210"], 0, "210.00", "stdout")]
#[case(&["run", "--heater", "2.0"], 1, "--heater", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);

    let mut cmd = Command::cargo_bin("roast_cli").unwrap();
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn manual_run_completes_and_writes_history() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let out = dir.path().join("history.jsonl");

    let mut cmd = Command::cargo_bin("roast_cli").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--mode")
        .arg("manual")
        .arg("--duration-min")
        .arg("0.5")
        .arg("--output")
        .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Roast complete"));

    let body = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = body.lines().collect();
    // 0.5 min at 1.5 s per tick plus the grace tick
    assert!(lines.len() >= 21, "got {} history rows", lines.len());
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    for key in [
        "time_min",
        "drum_c",
        "bean_core_c",
        "air_c",
        "bean_probe_c",
        "env_probe_c",
        "ror_c_per_min",
        "heater",
        "fan",
    ] {
        assert!(first.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(first["ror_c_per_min"], 0.0);
}

#[test]
fn pid_run_with_csv_profile() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let profile = dir.path().join("profile.csv");
    fs::write(&profile, "minutes,celsius\n0.0,180.0\n0.5,200.0\n").unwrap();

    let mut cmd = Command::cargo_bin("roast_cli").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--mode")
        .arg("pid")
        .arg("--duration-min")
        .arg("0.25")
        .arg("--profile-csv")
        .arg(&profile);
    cmd.assert().success();
}

#[test]
fn bad_csv_profile_reports_header_hint() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let profile = dir.path().join("bad.csv");
    fs::write(&profile, "time,temp\n0.0,180.0\n1.0,200.0\n").unwrap();

    let mut cmd = Command::cargo_bin("roast_cli").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--mode")
        .arg("pid")
        .arg("--profile-csv")
        .arg(&profile);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("minutes,celsius"));
}

#[test]
fn invalid_config_is_rejected_with_field_name() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    fs::write(&path, "[simulation]\ntimestep_s = -1.0\n").unwrap();

    let mut cmd = Command::cargo_bin("roast_cli").unwrap();
    cmd.arg("--config").arg(&path).arg("self-check");
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("timestep_s"));
}

#[test]
fn json_profile_output_is_parseable() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);

    let mut cmd = Command::cargo_bin("roast_cli").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("--json")
        .arg("profile")
        .arg("--kind")
        .arg("random")
        .arg("--seed")
        .arg("7");
    let output = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!(v["waypoints"].as_array().unwrap().len() >= 6);
    assert!(v["summary"]["duration_min"].as_f64().unwrap() > 0.0);
}

#[test]
fn same_seed_gives_identical_random_profile() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);

    let run = || {
        let mut cmd = Command::cargo_bin("roast_cli").unwrap();
        cmd.arg("--config")
            .arg(&cfg)
            .arg("profile")
            .arg("--kind")
            .arg("random")
            .arg("--seed")
            .arg("123");
        cmd.assert().success().get_output().stdout.clone()
    };
    assert_eq!(run(), run());
}
