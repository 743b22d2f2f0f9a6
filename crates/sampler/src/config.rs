//! Configuration for the stochastic event sampler.

use crate::error::SamplerError;

/// Default probability of "no hail" used by the legacy presence gate.
pub const DEFAULT_ZERO_PROB: f64 = 0.84;

/// How the occurrence gate decides whether hail happens in a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateModel {
    /// Canonical model: the gate input is an occurrence probability in
    /// `[0, 1]`; hail occurs with that probability.
    Probability,
    /// Legacy model: the gate input is a historical magnitude record. Hail
    /// can only occur where the historical value is positive, and then with
    /// probability `1 - zero_prob`.
    Presence {
        /// Probability of "no hail" at a cell with historical presence.
        zero_prob: f64,
    },
}

impl GateModel {
    /// Legacy presence gate with the default zero probability of 0.84.
    pub fn presence() -> Self {
        Self::Presence {
            zero_prob: DEFAULT_ZERO_PROB,
        }
    }

    /// Short name used in logs and output metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Probability => "occurrence-probability",
            Self::Presence { .. } => "historical-presence",
        }
    }

    /// Occurrence probability for one gate input value.
    ///
    /// Non-finite inputs count as 0; probabilities are clipped to `[0, 1]`.
    pub fn probability(&self, value: f64) -> f64 {
        match *self {
            Self::Probability => {
                if value.is_finite() {
                    value.clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
            Self::Presence { zero_prob } => {
                if value.is_finite() && value > 0.0 {
                    1.0 - zero_prob
                } else {
                    0.0
                }
            }
        }
    }
}

/// Configuration for sampling an ensemble of hail magnitude fields.
///
/// # Example
///
/// ```
/// use hailgen_sampler::{GateModel, SamplerConfig};
///
/// let config = SamplerConfig::new(100).with_gate(GateModel::Probability);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    n_ensemble: usize,
    gate: GateModel,
}

impl SamplerConfig {
    /// Creates a probability-gated configuration with `n_ensemble` members.
    pub fn new(n_ensemble: usize) -> Self {
        Self {
            n_ensemble,
            gate: GateModel::Probability,
        }
    }

    /// Sets the gate model.
    pub fn with_gate(mut self, gate: GateModel) -> Self {
        self.gate = gate;
        self
    }

    /// Number of ensemble members drawn per time step.
    pub fn n_ensemble(&self) -> usize {
        self.n_ensemble
    }

    /// The gate model.
    pub fn gate(&self) -> GateModel {
        self.gate
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.n_ensemble == 0 {
            return Err(SamplerError::InvalidConfig {
                reason: "ensemble size must be at least 1".to_string(),
            });
        }
        if let GateModel::Presence { zero_prob } = self.gate
            && !(0.0..=1.0).contains(&zero_prob)
        {
            return Err(SamplerError::InvalidConfig {
                reason: format!("zero_prob must be in [0, 1], got {zero_prob}"),
            });
        }
        Ok(())
    }
}
