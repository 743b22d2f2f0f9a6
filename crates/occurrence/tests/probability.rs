//! Integration tests for occurrence probability construction.

use approx::assert_relative_eq;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use hailgen_grid::{GridCoords, GriddedField};
use hailgen_occurrence::{
    OccurrenceConfig, OccurrenceError, build_occurrence_field, presence_field,
};
use ndarray::Array3;

fn hourly(n: usize) -> Vec<NaiveDateTime> {
    let base = NaiveDate::from_ymd_opt(2012, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n).map(|i| base + TimeDelta::hours(i as i64)).collect()
}

fn field(values: Array3<f64>) -> GriddedField {
    let (nt, ny, nx) = values.dim();
    let coords = GridCoords::new(
        (0..ny).map(|i| 35.0 + i as f64 * 0.25).collect(),
        (0..nx).map(|i| -100.0 + i as f64 * 0.25).collect(),
    );
    GriddedField::new(values, hourly(nt), coords).unwrap()
}

/// Log-odds that map exactly onto probability `p`.
fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

#[test]
fn logistic_transform_and_floor() {
    let logits = Array3::from_shape_vec((1, 1, 4), vec![0.0, logit(0.05), logit(0.9), 20.0]).unwrap();
    let occ = build_occurrence_field(&field(logits), &OccurrenceConfig::new()).unwrap();
    let v = occ.as_field().values();

    assert_relative_eq!(v[[0, 0, 0]], 0.5, epsilon = 1e-12);
    assert_eq!(v[[0, 0, 1]], 0.0);
    assert_relative_eq!(v[[0, 0, 2]], 0.9, epsilon = 1e-12);
    assert!(v[[0, 0, 3]] > 0.999);
}

#[test]
fn probability_exactly_at_floor_is_zeroed() {
    // Use the floor the transform actually produces so the equality case is
    // exercised regardless of rounding in ln/exp.
    let x = logit(0.1);
    let p = hailgen_stats::logistic(x);
    let occ = build_occurrence_field(
        &field(Array3::from_elem((2, 2, 2), x)),
        &OccurrenceConfig::new().with_threshold(p),
    )
    .unwrap();
    assert!(occ.as_field().values().iter().all(|&v| v == 0.0));
}

#[test]
fn default_floor_zeroes_point_one() {
    let occ = build_occurrence_field(
        &field(Array3::from_elem((1, 1, 1), -50.0)),
        &OccurrenceConfig::new(),
    )
    .unwrap();
    assert_eq!(occ.as_field().values()[[0, 0, 0]], 0.0);
}

#[test]
fn nan_logits_stay_missing() {
    let logits = Array3::from_shape_vec((1, 1, 2), vec![f64::NAN, 3.0]).unwrap();
    let occ = build_occurrence_field(&field(logits), &OccurrenceConfig::new()).unwrap();
    let v = occ.as_field().values();
    assert!(v[[0, 0, 0]].is_nan());
    assert!(v[[0, 0, 1]] > 0.9);
}

#[test]
fn empty_input_fails_fast() {
    let empty = field(Array3::zeros((0, 2, 2)));
    let err = build_occurrence_field(&empty, &OccurrenceConfig::new()).unwrap_err();
    assert_eq!(err, OccurrenceError::EmptyInput);
    assert_eq!(presence_field(&empty).unwrap_err(), OccurrenceError::EmptyInput);
}

#[test]
fn invalid_threshold_rejected() {
    let f = field(Array3::zeros((1, 1, 1)));
    let err = build_occurrence_field(&f, &OccurrenceConfig::new().with_threshold(1.0)).unwrap_err();
    assert!(matches!(err, OccurrenceError::InvalidConfig { .. }));
}

#[test]
fn coordinates_are_preserved() {
    let f = field(Array3::zeros((3, 2, 4)));
    let occ = build_occurrence_field(&f, &OccurrenceConfig::new()).unwrap();
    assert_eq!(occ.n_times(), 3);
    assert_eq!(occ.as_field().times(), f.times());
    assert_eq!(occ.as_field().coords(), f.coords());
}

#[test]
fn presence_marks_positive_history() {
    let hist = Array3::from_shape_vec((1, 1, 4), vec![0.0, 2.5, -1.0, f64::NAN]).unwrap();
    let occ = presence_field(&field(hist)).unwrap();
    let v: Vec<f64> = occ.into_field().values().iter().copied().collect();
    assert_eq!(v, vec![0.0, 1.0, 0.0, 0.0]);
}
