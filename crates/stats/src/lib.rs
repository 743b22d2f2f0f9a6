//! Statistical helper functions for the hailgen workspace.

/// Standard logistic function, mapping log-odds to a probability.
///
/// `+inf` maps to 1, `-inf` to 0, NaN stays NaN. Written in a form that
/// never overflows `exp` for large-magnitude inputs.
pub fn logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Count, mean and population standard deviation of a sample.
///
/// `mean` and `sd` are `None` when `count == 0`, mirroring a NaN-skipping
/// reduction over an all-missing series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    /// Number of observations that contributed.
    pub count: usize,
    /// Arithmetic mean, if any observation contributed.
    pub mean: Option<f64>,
    /// Population standard deviation, if any observation contributed.
    pub sd: Option<f64>,
}

/// Moments of the strictly positive, finite values of `data`.
///
/// Zero, negative and non-finite values are treated as "no observation".
/// Uses Welford's update so long series do not lose precision.
pub fn positive_moments(data: impl IntoIterator<Item = f64>) -> Moments {
    let mut count = 0usize;
    let mut m = 0.0_f64;
    let mut m2 = 0.0_f64;
    for x in data {
        if !(x.is_finite() && x > 0.0) {
            continue;
        }
        count += 1;
        let delta = x - m;
        m += delta / count as f64;
        m2 += delta * (x - m);
    }
    if count == 0 {
        return Moments {
            count,
            mean: None,
            sd: None,
        };
    }
    Moments {
        count,
        mean: Some(m),
        sd: Some((m2 / count as f64).sqrt()),
    }
}
