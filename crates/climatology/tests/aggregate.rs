use approx::assert_relative_eq;
use hailgen_climatology::{
    ClimatologyConfig, MagnitudeRange, aggregate, default_ranges,
};
use ndarray::Array4;

#[test]
fn constant_ensemble_lands_in_one_range() {
    let ens = Array4::from_elem((10, 5, 3, 4), 1.5);
    let summary = aggregate(ens.view(), &ClimatologyConfig::default()).unwrap();

    assert_eq!(summary.len(), 3);
    let low = summary.field_by_name("probability_0.1_1").unwrap();
    let mid = summary.field_by_name("probability_1_2").unwrap();
    let high = summary.field_by_name("probability_2_25").unwrap();
    assert!(low.iter().all(|&p| p == 0.0));
    assert!(mid.iter().all(|&p| p == 1.0));
    assert!(high.iter().all(|&p| p == 0.0));
}

#[test]
fn zeros_fall_in_no_default_range() {
    let ens = Array4::zeros((4, 6, 2, 2));
    let summary = aggregate(ens.view(), &ClimatologyConfig::default()).unwrap();
    for (_, field) in summary.iter() {
        assert!(field.iter().all(|&p| p == 0.0));
    }
}

#[test]
fn fractions_average_over_members_and_time() {
    // Cell (0, 0): one of four samples in [1, 2); cell (0, 1): three of four.
    let mut ens = Array4::zeros((2, 2, 1, 2));
    ens[[0, 0, 0, 0]] = 1.2;
    ens[[0, 0, 0, 1]] = 1.2;
    ens[[0, 1, 0, 1]] = 1.9;
    ens[[1, 1, 0, 1]] = 1.0;
    ens[[1, 0, 0, 1]] = 30.0;

    let summary = aggregate(ens.view(), &ClimatologyConfig::default()).unwrap();
    let mid = summary.field_by_name("probability_1_2").unwrap();
    assert_relative_eq!(mid[[0, 0]], 0.25);
    assert_relative_eq!(mid[[0, 1]], 0.75);
    let high = summary.field_by_name("probability_2_25").unwrap();
    assert_relative_eq!(high[[0, 1]], 0.0);
}

#[test]
fn custom_ranges_keep_order() {
    let ranges = vec![
        MagnitudeRange::new(5.0, 10.0).unwrap(),
        MagnitudeRange::new(0.5, 5.0).unwrap(),
    ];
    let ens = Array4::from_elem((1, 1, 1, 1), 7.0);
    let summary = aggregate(ens.view(), &ClimatologyConfig::new().with_ranges(ranges.clone()))
        .unwrap();
    assert_eq!(summary.ranges(), ranges.as_slice());
    assert_eq!(summary.field(0).unwrap()[[0, 0]], 1.0);
    assert_eq!(summary.field(1).unwrap()[[0, 0]], 0.0);
    assert!(summary.field(2).is_none());
}

#[test]
fn probabilities_sum_to_at_most_one() {
    let ens = Array4::from_shape_fn((8, 12, 2, 3), |(e, t, y, x)| {
        ((e * 7 + t * 3 + y + x) % 40) as f64 * 0.7
    });
    let summary = aggregate(ens.view(), &ClimatologyConfig::default()).unwrap();
    let ranges = default_ranges();
    let mut total = ndarray::Array2::<f64>::zeros((2, 3));
    for r in &ranges {
        total += &summary.field_by_name(&r.variable_name()).unwrap();
    }
    assert!(total.iter().all(|&p| (0.0..=1.0 + 1e-12).contains(&p)));
}
