//! Log-normal parameter type and statrs bridge.

use statrs::distribution::LogNormal;

use crate::error::LognormalError;

/// Log-normal parameters of one grid cell in the `(shape, scale)` convention.
///
/// `shape` is the standard deviation of `ln X` and `scale` is `exp(mu)`, the
/// median of `X`. Both are non-negative; `shape == scale == 0` marks a cell
/// with no usable distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogNormalParams {
    shape: f64,
    scale: f64,
}

impl LogNormalParams {
    /// Create parameters after validating that both are finite and
    /// non-negative.
    pub fn new(shape: f64, scale: f64) -> Option<Self> {
        if shape.is_finite() && shape >= 0.0 && scale.is_finite() && scale >= 0.0 {
            Some(Self { shape, scale })
        } else {
            None
        }
    }

    /// The "insufficient evidence" marker: both parameters zero.
    pub fn degenerate() -> Self {
        Self {
            shape: 0.0,
            scale: 0.0,
        }
    }

    /// Moment-match an arithmetic mean and standard deviation.
    ///
    /// Zero or non-finite `mean`/`sd` are first replaced by `floor`. Then
    /// `shape = sqrt(ln(1 + cv²))` and `scale = mean / sqrt(1 + cv²)` with
    /// `cv = sd / mean`.
    pub fn from_moments(mean: f64, sd: f64, floor: f64) -> Self {
        let mean = floored(mean, floor);
        let sd = floored(sd, floor);
        let cv2 = (sd / mean).powi(2);
        Self {
            shape: cv2.ln_1p().sqrt(),
            scale: mean / (1.0 + cv2).sqrt(),
        }
    }

    /// Shape parameter (sigma of `ln X`).
    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Scale parameter (`exp(mu)`).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// `true` when the cell carries a usable distribution.
    pub fn is_valid(&self) -> bool {
        self.scale > 0.0
    }

    /// Location of `ln X` (`ln(scale)`); `-inf` for a degenerate cell.
    pub fn mu(&self) -> f64 {
        self.scale.ln()
    }

    /// Median of the distribution.
    pub fn median(&self) -> f64 {
        self.scale
    }

    /// Mean of the distribution, `scale * exp(shape² / 2)`.
    pub fn mean(&self) -> f64 {
        self.scale * (0.5 * self.shape * self.shape).exp()
    }

    /// Build a [`statrs::distribution::LogNormal`].
    ///
    /// statrs parameterises by `(location, scale) = (mu, sigma)` and requires
    /// `sigma > 0`, so degenerate and zero-spread cells are rejected.
    pub fn to_statrs(&self) -> Result<LogNormal, LognormalError> {
        LogNormal::new(self.mu(), self.shape).map_err(|e| LognormalError::Distribution {
            shape: self.shape,
            scale: self.scale,
            message: e.to_string(),
        })
    }
}

/// Substitute `floor` for zero, negative or non-finite values.
fn floored(v: f64, floor: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v.max(floor) } else { floor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use statrs::distribution::ContinuousCDF;

    #[test]
    fn new_validates() {
        assert!(LogNormalParams::new(0.5, 2.0).is_some());
        assert!(LogNormalParams::new(0.0, 0.0).is_some());
        assert!(LogNormalParams::new(-0.1, 2.0).is_none());
        assert!(LogNormalParams::new(0.5, f64::NAN).is_none());
    }

    #[test]
    fn degenerate_is_invalid() {
        let p = LogNormalParams::degenerate();
        assert!(!p.is_valid());
        assert_eq!(p.shape(), 0.0);
        assert_eq!(p.scale(), 0.0);
    }

    #[test]
    fn from_moments_round_trips_mean() {
        // The moment-matched distribution reproduces the input mean.
        let p = LogNormalParams::from_moments(3.0, 1.5, 1e-6);
        assert_relative_eq!(p.mean(), 3.0, epsilon = 1e-12);
        let cv2: f64 = 0.25;
        assert_relative_eq!(p.shape(), (1.0 + cv2).ln().sqrt(), epsilon = 1e-12);
        assert_relative_eq!(p.scale(), 3.0 / (1.0 + cv2).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn from_moments_floors_zero_sd() {
        let p = LogNormalParams::from_moments(2.0, 0.0, 1e-6);
        assert!(p.shape() > 0.0 && p.shape() < 1e-6);
        assert_relative_eq!(p.scale(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn from_moments_floors_missing_mean() {
        let p = LogNormalParams::from_moments(f64::NAN, f64::NAN, 1e-6);
        // cv = 1 after flooring both.
        assert_relative_eq!(p.shape(), 2f64.ln().sqrt(), epsilon = 1e-12);
        assert_relative_eq!(p.scale(), 1e-6 / 2f64.sqrt(), epsilon = 1e-18);
    }

    #[test]
    fn statrs_bridge_median() {
        let p = LogNormalParams::new(0.5, 2.0).unwrap();
        let dist = p.to_statrs().unwrap();
        assert_relative_eq!(dist.cdf(p.median()), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn statrs_bridge_rejects_degenerate() {
        let err = LogNormalParams::degenerate().to_statrs().unwrap_err();
        assert!(matches!(err, LognormalError::Distribution { .. }));
    }
}
