use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level hailgen configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HailgenConfig {
    /// Global RNG seed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// I/O settings.
    #[serde(default)]
    pub io: IoToml,

    /// Time window shared by every command.
    #[serde(default)]
    pub window: WindowToml,

    /// Optional bounding box limiting the working grid.
    #[serde(default)]
    pub region: Option<RegionToml>,

    /// Probability field builder settings.
    #[serde(default)]
    pub occurrence: OccurrenceToml,

    /// Parameter estimator settings.
    #[serde(default)]
    pub estimator: EstimatorToml,

    /// Where distribution parameters come from.
    #[serde(default)]
    pub parameters: ParametersToml,

    /// Sampler settings.
    #[serde(default)]
    pub sampler: SamplerToml,

    /// Output encoding.
    #[serde(default)]
    pub encoding: EncodingToml,

    /// Climatological summary settings.
    #[serde(default)]
    pub climatology: ClimatologyToml,
}

impl HailgenConfig {
    /// Load a config file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoToml {
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    #[serde(default = "default_logits_var")]
    pub logits_var: String,
    /// Historical magnitude variable; the occurrence field is used when unset.
    #[serde(default)]
    pub historical_var: Option<String>,
    #[serde(default = "default_time_var")]
    pub time_var: String,
}

impl Default for IoToml {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: None,
            logits_var: default_logits_var(),
            historical_var: None,
            time_var: default_time_var(),
        }
    }
}

fn default_logits_var() -> String {
    hailgen_io::DEFAULT_LOGITS_VAR.to_string()
}
fn default_time_var() -> String {
    "time".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowToml {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionToml {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OccurrenceToml {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for OccurrenceToml {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

fn default_threshold() -> f64 {
    hailgen_occurrence::DEFAULT_THRESHOLD
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EstimatorToml {
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    #[serde(default = "default_floor")]
    pub floor: f64,
}

impl Default for EstimatorToml {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            floor: default_floor(),
        }
    }
}

fn default_min_samples() -> usize {
    2
}
fn default_floor() -> f64 {
    1e-6
}

/// Parameter source: `"estimate"` fits from the historical record,
/// `"precomputed"` loads `shape` and `scale` files.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParametersToml {
    #[serde(default = "default_source")]
    pub source: String,
    pub shape: Option<PathBuf>,
    pub scale: Option<PathBuf>,
    #[serde(default = "default_shape_var")]
    pub shape_var: String,
    #[serde(default = "default_scale_var")]
    pub scale_var: String,
}

impl Default for ParametersToml {
    fn default() -> Self {
        Self {
            source: default_source(),
            shape: None,
            scale: None,
            shape_var: default_shape_var(),
            scale_var: default_scale_var(),
        }
    }
}

fn default_source() -> String {
    "estimate".to_string()
}
fn default_shape_var() -> String {
    "shape".to_string()
}
fn default_scale_var() -> String {
    "scale".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplerToml {
    #[serde(default = "default_n_ensemble")]
    pub n_ensemble: usize,
    /// `"probability"` or `"presence"`.
    #[serde(default = "default_gate")]
    pub gate: String,
    #[serde(default = "default_zero_prob")]
    pub zero_prob: f64,
    /// Chunk extents `(ensemble, time, lat, lon)`.
    #[serde(default)]
    pub chunk: Option<[usize; 4]>,
}

impl Default for SamplerToml {
    fn default() -> Self {
        Self {
            n_ensemble: default_n_ensemble(),
            gate: default_gate(),
            zero_prob: default_zero_prob(),
            chunk: None,
        }
    }
}

fn default_n_ensemble() -> usize {
    100
}
fn default_gate() -> String {
    "probability".to_string()
}
fn default_zero_prob() -> f64 {
    hailgen_sampler::DEFAULT_ZERO_PROB
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncodingToml {
    #[serde(default = "default_dtype")]
    pub dtype: String,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_deflate_level")]
    pub deflate_level: u8,
    #[serde(default = "default_true")]
    pub shuffle: bool,
}

impl Default for EncodingToml {
    fn default() -> Self {
        Self {
            dtype: default_dtype(),
            compression: default_compression(),
            deflate_level: default_deflate_level(),
            shuffle: true,
        }
    }
}

fn default_dtype() -> String {
    "float32".to_string()
}
fn default_compression() -> String {
    "deflate".to_string()
}
fn default_deflate_level() -> u8 {
    hailgen_io::DEFAULT_DEFLATE_LEVEL
}
fn default_true() -> bool {
    true
}

/// Magnitude ranges as `[low, high]` pairs; the built-in ranges when unset.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClimatologyToml {
    #[serde(default)]
    pub ranges: Option<Vec<[f64; 2]>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: HailgenConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.io.logits_var, "hail_logits");
        assert_eq!(cfg.occurrence.threshold, 0.1);
        assert_eq!(cfg.estimator.min_samples, 2);
        assert_eq!(cfg.parameters.source, "estimate");
        assert_eq!(cfg.sampler.zero_prob, 0.84);
        assert_eq!(cfg.sampler.gate, "probability");
        assert_eq!(cfg.encoding.deflate_level, 4);
        assert!(cfg.region.is_none());
        assert!(cfg.climatology.ranges.is_none());
    }

    #[test]
    fn full_file_parses() {
        let cfg: HailgenConfig = toml::from_str(
            r#"
            seed = 42

            [io]
            inputs = ["a.nc", "b.nc"]
            output = "out/ensemble.nc"
            historical_var = "meshs"

            [window]
            start = "2010-01-01"
            end = "2023-12-31"

            [region]
            lat_min = 45.5
            lat_max = 48.0
            lon_min = 5.5
            lon_max = 10.5

            [sampler]
            n_ensemble = 10
            gate = "presence"
            zero_prob = 0.9
            chunk = [1, 4, 100, 100]

            [encoding]
            dtype = "float64"
            compression = "none"

            [climatology]
            ranges = [[0.5, 1.0], [1.0, 5.0]]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.io.inputs.len(), 2);
        assert_eq!(cfg.io.historical_var.as_deref(), Some("meshs"));
        assert_eq!(cfg.window.end.as_deref(), Some("2023-12-31"));
        assert_eq!(cfg.region.unwrap().lon_max, 10.5);
        assert_eq!(cfg.sampler.chunk, Some([1, 4, 100, 100]));
        assert_eq!(cfg.climatology.ranges.unwrap().len(), 2);
    }

    #[test]
    fn unknown_field_rejected() {
        let err = toml::from_str::<HailgenConfig>("[sampler]\nensembles = 3\n").unwrap_err();
        assert!(err.to_string().contains("ensembles"));
    }

    #[test]
    fn load_without_path_is_default() {
        let cfg = HailgenConfig::load(None).unwrap();
        assert_eq!(cfg.sampler.n_ensemble, 100);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hailgen.toml");
        std::fs::write(&path, "seed = 7\n[occurrence]\nthreshold = 0.2\n").unwrap();
        let cfg = HailgenConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.occurrence.threshold, 0.2);
    }

    #[test]
    fn load_missing_file_fails() {
        let err = HailgenConfig::load(Some(Path::new("/nonexistent/hailgen.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));
    }
}
