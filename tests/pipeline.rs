//! End-to-end tests of the `hailgen` binary: fit, generate and climatology.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use hailgen_io::{EnsembleSelection, read_ensemble};
use tempfile::tempdir;

const NT: usize = 6;
const NY: usize = 3;
const NX: usize = 4;

/// Cells with `(y + x)` even carry strongly positive log-odds; the rest are
/// strongly negative and end up below the occurrence floor.
fn active(y: usize, x: usize) -> bool {
    (y + x) % 2 == 0
}

fn write_logits(dir: &Path) -> PathBuf {
    let path = dir.join("logits.nc");
    let mut file = netcdf::create(&path).expect("create NetCDF file");
    file.add_dimension("time", NT).expect("add dim time");
    file.add_dimension("lat", NY).expect("add dim lat");
    file.add_dimension("lon", NX).expect("add dim lon");
    {
        let lats: Vec<f64> = (0..NY).map(|i| 46.0 + i as f64 * 0.5).collect();
        let mut var = file.add_variable::<f64>("lat", &["lat"]).expect("add var lat");
        var.put_values(&lats, ..).expect("put lat values");
    }
    {
        let lons: Vec<f64> = (0..NX).map(|i| 7.0 + i as f64 * 0.5).collect();
        let mut var = file.add_variable::<f64>("lon", &["lon"]).expect("add var lon");
        var.put_values(&lons, ..).expect("put lon values");
    }
    {
        let days: Vec<f64> = (0..NT).map(|t| t as f64).collect();
        let mut var = file.add_variable::<f64>("time", &["time"]).expect("add var time");
        var.put_values(&days, ..).expect("put time values");
        var.put_attribute("units", "days since 2015-06-01")
            .expect("add time units");
    }
    {
        let mut data = Vec::with_capacity(NT * NY * NX);
        for t in 0..NT {
            for y in 0..NY {
                for x in 0..NX {
                    data.push(if active(y, x) { 1.0 + 0.4 * t as f64 } else { -6.0 });
                }
            }
        }
        let mut var = file
            .add_variable::<f64>("hail_logits", &["time", "lat", "lon"])
            .expect("add var hail_logits");
        var.put_values(&data, ..).expect("put data values");
    }
    path
}

fn hailgen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hailgen"))
        .args(args)
        .output()
        .expect("run hailgen")
}

fn ok(output: &Output) -> String {
    assert!(
        output.status.success(),
        "hailgen failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn s(p: &Path) -> &str {
    p.to_str().expect("utf-8 path")
}

#[test]
fn generate_with_estimated_parameters() {
    let dir = tempdir().unwrap();
    let input = write_logits(dir.path());
    let out = dir.path().join("ensemble.nc");

    let stdout = ok(&hailgen(&[
        "generate", "-i", s(&input), "-o", s(&out), "-n", "5", "--seed", "7",
    ]));
    assert_eq!(stdout, s(&out));

    let loaded = read_ensemble(&out, &EnsembleSelection::default()).unwrap();
    let values = loaded.ensemble.values();
    assert_eq!(values.dim(), (5, NT, NY, NX));
    for ((_, _, y, x), &m) in values.indexed_iter() {
        assert!(m >= 0.0);
        if !active(y, x) {
            assert_eq!(m, 0.0);
        }
    }
    assert!(values.iter().any(|&m| m > 0.0));
}

#[test]
fn same_seed_same_ensemble() {
    let dir = tempdir().unwrap();
    let input = write_logits(dir.path());
    let a = dir.path().join("a.nc");
    let b = dir.path().join("b.nc");
    for out in [&a, &b] {
        ok(&hailgen(&[
            "generate", "-i", s(&input), "-o", s(out), "-n", "3", "--seed", "11",
        ]));
    }
    let a = read_ensemble(&a, &EnsembleSelection::default()).unwrap();
    let b = read_ensemble(&b, &EnsembleSelection::default()).unwrap();
    assert_eq!(a.ensemble.values(), b.ensemble.values());
}

#[test]
fn fit_then_generate_from_parameter_files() {
    let dir = tempdir().unwrap();
    let input = write_logits(dir.path());
    let shape = dir.path().join("params/shape.nc");
    let scale = dir.path().join("params/scale.nc");
    ok(&hailgen(&[
        "fit", "-i", s(&input), "--shape", s(&shape), "--scale", s(&scale),
    ]));
    assert!(shape.exists());
    assert!(scale.exists());

    let out = dir.path().join("ensemble.nc");
    ok(&hailgen(&[
        "generate", "-i", s(&input), "-o", s(&out), "-n", "2", "--seed", "3",
        "--shape", s(&shape), "--scale", s(&scale), "--bbox", "46,46.5,7,8.5",
    ]));
    let loaded = read_ensemble(&out, &EnsembleSelection::default()).unwrap();
    assert_eq!(loaded.ensemble.values().dim(), (2, NT, 2, NX));
}

#[test]
fn climatology_names_file_after_selection() {
    let dir = tempdir().unwrap();
    let input = write_logits(dir.path());
    let ens = dir.path().join("ensemble.nc");
    ok(&hailgen(&[
        "generate", "-i", s(&input), "-o", s(&ens), "-n", "4", "--seed", "1",
    ]));

    let out_dir = dir.path().join("summary");
    let stdout = ok(&hailgen(&[
        "climatology", "-i", s(&ens), "--output-dir", s(&out_dir),
        "--ensemble-start", "1", "--ensemble-end", "3",
    ]));
    let expected = out_dir.join("2015-2015_ensemble_1-3.nc");
    assert_eq!(stdout, s(&expected));
    assert!(expected.exists());
}

#[test]
fn empty_window_fails_without_output() {
    let dir = tempdir().unwrap();
    let input = write_logits(dir.path());
    let out = dir.path().join("ensemble.nc");
    let output = hailgen(&[
        "generate", "-i", s(&input), "-o", s(&out), "-n", "2",
        "--start", "2030-01-01", "--end", "2030-12-31",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "stderr: {stderr}");
    assert!(!out.exists());
}

#[test]
fn unknown_config_key_is_rejected() {
    let dir = tempdir().unwrap();
    let input = write_logits(dir.path());
    let cfg = dir.path().join("hailgen.toml");
    std::fs::write(&cfg, "[sampler]\nmembers = 4\n").unwrap();
    let output = hailgen(&[
        "generate", "-c", s(&cfg), "-i", s(&input), "-o", s(&dir.path().join("x.nc")),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to parse TOML config"));
}
