use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

const ENGINES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/engines");

fn mixture() -> Command {
    let mut cmd = Command::cargo_bin("mixture").expect("mixture bin");
    cmd.args(["--engines", ENGINES]);
    cmd
}

#[test]
fn interpolates_between_calibration_points() {
    mixture()
        .args(["--engine", "rl10b-2", "--ratio", "4.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Calibrated range: 4.00:1 - 6.00:1"))
        .stdout(predicate::str::contains("Mixture 4.50:1  466s   Thrust: 91 kN"))
        .stdout(predicate::str::contains("LqdHydrogen"));
}

#[test]
fn ratio_outside_envelope_is_clamped() {
    mixture()
        .args(["--engine", "RL10B-2", "--ratio", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mixture 6.00:1  455s   Thrust: 110 kN"));
}

#[test]
fn defaults_to_first_engine_and_configuration() {
    mixture()
        .assert()
        .success()
        .stdout(predicate::str::contains("Engine: Raptor  configuration: 'SeaLevel'"))
        .stdout(predicate::str::contains("Mixture 3.80:1"));
}

#[test]
fn unknown_configuration_fails() {
    mixture()
        .args(["--engine", "Raptor", "--config", "Orbital"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no mixture calibration named 'Orbital'"));
}

#[test]
fn unknown_engine_fails() {
    mixture()
        .args(["--engine", "J-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("engine 'J-2' not found"));
}

#[test]
fn serialize_prints_compact_calibration() {
    mixture()
        .args(["--engine", "RL10B-2", "--serialize"])
        .assert()
        .success()
        .stdout(predicate::str::contains("|4|0|85|0|470|0|0|1|180|0|0"))
        .stdout(predicate::str::contains("|6|0|110|0|455|0|0|1|170|0|0"));
}

#[test]
fn curve_export_writes_csv() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("curves").join("vacuum.csv");

    mixture()
        .args([
            "--engine",
            "Raptor",
            "--config",
            "Vacuum",
            "--ratio",
            "3.2",
            "--samples",
            "5",
            "--curve-out",
            csv_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let contents = fs::read_to_string(&csv_path).expect("csv written");
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines[0], "pressure_atm,isp_s");
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[1], "0.0,380.0");
}

#[test]
fn mixture_file_replaces_engine_calibration() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mixtures = dir.path().join("mixtures.yaml");
    fs::write(
        &mixtures,
        "- configName: Vac\n  ratio: 5.0\n  maxThrust: 100\n  atmosphereCurve: [[0, 450], [1, 200]]\n\
         - configName: Vac\n  ratio: 6.0\n  maxThrust: 120\n  atmosphereCurve: [[0, 440], [1, 190]]\n",
    )
    .expect("write mixtures");

    mixture()
        .args([
            "--engine",
            "RL10B-2",
            "--mixtures",
            mixtures.to_str().unwrap(),
            "--ratio",
            "5.5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("configuration: 'Vac'"))
        .stdout(predicate::str::contains("Calibrated range: 5.00:1 - 6.00:1"))
        .stdout(predicate::str::contains("Mixture 5.50:1  445s   Thrust: 110 kN"));
}
