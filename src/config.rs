//! # Selector Configuration
//!
//! Everything the selector reads besides the candidates themselves: the global
//! analysis pT range, per-detector PID windows and the pT-binned cut table.
//! The configuration is built once, validated, and shared read-only.
//!
//! ## File Format
//!
//! JSON, mirroring the struct layout:
//!
//! ```json
//! {
//!   "pt_cand_min": 0.0,
//!   "pt_cand_max": 50.0,
//!   "tpc":  { "enabled": true, "pt_min": 0.15, "pt_max": 5.0,  "n_sigma": 3.0, "n_sigma_combined": 5.0 },
//!   "tof":  { "enabled": true, "pt_min": 0.15, "pt_max": 5.0,  "n_sigma": 3.0, "n_sigma_combined": 5.0 },
//!   "rich": { "enabled": true, "pt_min": 0.15, "pt_max": 10.0, "n_sigma": 3.0, "n_sigma_combined": 5.0 },
//!   "bins": { "pt_bins": [0.0, 0.5], "cuts": [{ "m": 0.4, "...": 0.0 }] }
//! }
//! ```

use crate::error::SelectorError;
use crate::selection::bins::BinTable;
use crate::SelectorResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_true() -> bool {
    true
}

fn default_n_sigma_exclusive() -> f64 {
    3.0
}

// ═══════════════════════════════════════════════════════════════════════════════
// DETECTOR PID CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// PID settings of one detector subsystem
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorPidConfig {
    /// A disabled detector is indeterminate for every track
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Lower bound of track pT for this detector's PID
    pub pt_min: f64,
    /// Upper bound of track pT for this detector's PID
    pub pt_max: f64,
    /// Half-width of the standalone nσ window
    pub n_sigma: f64,
    /// Half-width of the window used when the companion detector accepts
    pub n_sigma_combined: f64,
}

impl DetectorPidConfig {
    pub fn new(pt_min: f64, pt_max: f64, n_sigma: f64, n_sigma_combined: f64) -> Self {
        Self {
            enabled: true,
            pt_min,
            pt_max,
            n_sigma,
            n_sigma_combined,
        }
    }

    /// Detector switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(0.0, 0.0, 0.0, 0.0)
        }
    }

    fn validate(&self, name: &str) -> SelectorResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if !(self.pt_min <= self.pt_max) {
            return Err(SelectorError::InvalidParameter(format!(
                "{} pT range [{}, {}] is empty",
                name, self.pt_min, self.pt_max
            )));
        }
        if !(self.n_sigma >= 0.0) || !(self.n_sigma_combined >= 0.0) {
            return Err(SelectorError::InvalidParameter(format!(
                "{} nσ windows must be non-negative",
                name
            )));
        }
        if self.n_sigma_combined < self.n_sigma {
            log::warn!(
                "{} combined window ({}) is narrower than the standalone one ({})",
                name,
                self.n_sigma_combined,
                self.n_sigma
            );
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SELECTOR CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration for the D0 candidate selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Lower bound of candidate pT (inclusive)
    pub pt_cand_min: f64,
    /// Upper bound of candidate pT (exclusive)
    pub pt_cand_max: f64,
    pub tpc: DetectorPidConfig,
    pub tof: DetectorPidConfig,
    pub rich: DetectorPidConfig,
    /// nσ radius for the exclusive "is X and not Y" identification
    #[serde(default = "default_n_sigma_exclusive")]
    pub n_sigma_exclusive: f64,
    /// Reject candidates with normalised decay length below 1
    #[serde(default)]
    pub enforce_decay_length_normalised: bool,
    /// Evaluate batches with rayon
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Topological cuts per pT bin
    #[serde(default)]
    pub bins: BinTable,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            pt_cand_min: 0.0,
            pt_cand_max: 50.0,
            tpc: DetectorPidConfig::new(0.15, 5.0, 3.0, 5.0),
            tof: DetectorPidConfig::new(0.15, 5.0, 3.0, 5.0),
            rich: DetectorPidConfig::new(0.15, 10.0, 3.0, 5.0),
            n_sigma_exclusive: default_n_sigma_exclusive(),
            enforce_decay_length_normalised: false,
            parallel: true,
            bins: BinTable::default(),
        }
    }
}

impl SelectorConfig {
    /// TPC switched off, identification from TOF and RICH only
    pub fn tof_rich_only() -> Self {
        Self {
            tpc: DetectorPidConfig::disabled(),
            ..Self::default()
        }
    }

    /// Check every parameter; called before any candidate is processed
    pub fn validate(&self) -> SelectorResult<()> {
        if !(self.pt_cand_min < self.pt_cand_max) {
            return Err(SelectorError::InvalidParameter(format!(
                "candidate pT range [{}, {}) is empty",
                self.pt_cand_min, self.pt_cand_max
            )));
        }
        self.tpc.validate("TPC")?;
        self.tof.validate("TOF")?;
        self.rich.validate("RICH")?;
        if !(self.n_sigma_exclusive > 0.0) {
            return Err(SelectorError::InvalidParameter(format!(
                "exclusive nσ radius must be positive, got {}",
                self.n_sigma_exclusive
            )));
        }
        self.bins.validate()
    }

    /// Load and validate a JSON configuration
    pub fn load(path: impl AsRef<Path>) -> SelectorResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| SelectorError::Io(format!("Failed to read config: {}", e)))?;
        let config: SelectorConfig = serde_json::from_str(&contents)
            .map_err(|e| SelectorError::SerializationError(e.to_string()))?;
        config.validate()?;

        log::info!(
            "Loaded selector config from {:?} ({} pT bins)",
            path,
            config.bins.n_bins()
        );
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> SelectorResult<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json)
            .map_err(|e| SelectorError::Io(format!("Failed to write config: {}", e)))?;

        log::info!("Saved selector config to {:?}", path);
        Ok(())
    }

    pub fn to_json(&self) -> SelectorResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SelectorError::SerializationError(e.to_string()))
    }
}
