//! Multi-Detector Particle Identification
//!
//! A [`TrackSelectorPid`] judges one species hypothesis with up to three detectors:
//!
//! ```text
//!            ┌──────────────┐   companion   ┌──────────────┐
//!   track ──►│     TPC      │◄─────────────►│     TOF      │
//!            │ dE/dx  nσ    │               │ β      nσ    │
//!            └──────────────┘               └──────┬───────┘
//!                                                  │ companion
//!                                           ┌──────┴───────┐
//!                                           │     RICH     │
//!                                           │ θ_c    nσ    │
//!                                           └──────────────┘
//! ```
//!
//! Each detector yields a [`PidStatus`]:
//!
//! | Condition                                             | Status        |
//! |-------------------------------------------------------|---------------|
//! | detector off, no signal, or track pT outside range    | Indeterminate |
//! | nσ inside the standalone window                       | Accepted      |
//! | nσ inside the combined window, companion accepts      | Accepted      |
//! | anything else                                         | Rejected      |
//!
//! The companion verdict only uses the companion's standalone window, so two
//! detectors cannot vouch for each other through their combined windows.

use crate::candidate::{NSigma, Species, Track};
use crate::config::{DetectorPidConfig, SelectorConfig};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// DETECTORS AND STATUS
// ═══════════════════════════════════════════════════════════════════════════════

/// Detector subsystems providing PID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Detector {
    Tpc,
    Tof,
    Rich,
}

impl Detector {
    pub fn all() -> [Self; 3] {
        [Self::Tpc, Self::Tof, Self::Rich]
    }

    /// Detector whose standalone acceptance unlocks this one's combined window
    pub fn companion(&self) -> Self {
        match self {
            Self::Tpc => Self::Tof,
            Self::Tof => Self::Tpc,
            Self::Rich => Self::Tof,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tpc => "TPC",
            Self::Tof => "TOF",
            Self::Rich => "RICH",
        }
    }

    fn signal(&self, track: &Track) -> Option<NSigma> {
        match self {
            Self::Tpc => track.tpc,
            Self::Tof => track.tof,
            Self::Rich => track.rich,
        }
    }
}

/// Outcome of a PID check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PidStatus {
    /// No usable discrimination
    Indeterminate,
    Rejected,
    Accepted,
}

impl PidStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PidStatus::Accepted)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DETECTOR WINDOW
// ═══════════════════════════════════════════════════════════════════════════════

/// Validity range and nσ windows of one detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorWindow {
    pub enabled: bool,
    pub pt_min: f64,
    pub pt_max: f64,
    pub n_sigma_min: f64,
    pub n_sigma_max: f64,
    pub n_sigma_combined_min: f64,
    pub n_sigma_combined_max: f64,
}

impl DetectorWindow {
    /// Symmetric windows `[-n, +n]` from the configuration
    pub fn from_config(config: &DetectorPidConfig) -> Self {
        Self {
            enabled: config.enabled,
            pt_min: config.pt_min,
            pt_max: config.pt_max,
            n_sigma_min: -config.n_sigma,
            n_sigma_max: config.n_sigma,
            n_sigma_combined_min: -config.n_sigma_combined,
            n_sigma_combined_max: config.n_sigma_combined,
        }
    }

    pub fn in_pt_range(&self, pt: f64) -> bool {
        self.enabled && self.pt_min <= pt && pt <= self.pt_max
    }

    pub fn in_standalone(&self, n_sigma: f64) -> bool {
        self.n_sigma_min <= n_sigma && n_sigma <= self.n_sigma_max
    }

    pub fn in_combined(&self, n_sigma: f64) -> bool {
        self.n_sigma_combined_min <= n_sigma && n_sigma <= self.n_sigma_combined_max
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRACK SELECTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// PID selection of tracks for one species hypothesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSelectorPid {
    species: Species,
    tpc: DetectorWindow,
    tof: DetectorWindow,
    rich: DetectorWindow,
    /// Radius of the exclusive identification regions
    n_sigma_exclusive: f64,
}

impl TrackSelectorPid {
    pub fn new(species: Species, config: &SelectorConfig) -> Self {
        Self {
            species,
            tpc: DetectorWindow::from_config(&config.tpc),
            tof: DetectorWindow::from_config(&config.tof),
            rich: DetectorWindow::from_config(&config.rich),
            n_sigma_exclusive: config.n_sigma_exclusive,
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn window(&self, detector: Detector) -> &DetectorWindow {
        match detector {
            Detector::Tpc => &self.tpc,
            Detector::Tof => &self.tof,
            Detector::Rich => &self.rich,
        }
    }

    /// Signal of `detector` for `species`, if present and applicable at the track pT
    fn valid_signal(&self, track: &Track, detector: Detector) -> Option<NSigma> {
        if !self.window(detector).in_pt_range(track.pt) {
            return None;
        }
        detector.signal(track)
    }

    /// Whether `detector` can say anything about this track
    pub fn is_valid(&self, track: &Track, detector: Detector) -> bool {
        self.valid_signal(track, detector).is_some()
    }

    fn accepted_standalone(&self, track: &Track, detector: Detector) -> bool {
        self.valid_signal(track, detector)
            .map(|n| self.window(detector).in_standalone(n.get(self.species)))
            .unwrap_or(false)
    }

    /// Status of a single detector for this species
    pub fn status(&self, track: &Track, detector: Detector) -> PidStatus {
        let n_sigma = match self.valid_signal(track, detector) {
            Some(n) => n.get(self.species),
            None => return PidStatus::Indeterminate,
        };
        let window = self.window(detector);
        if window.in_standalone(n_sigma) {
            return PidStatus::Accepted;
        }
        if window.in_combined(n_sigma) && self.accepted_standalone(track, detector.companion()) {
            return PidStatus::Accepted;
        }
        PidStatus::Rejected
    }

    pub fn status_tpc(&self, track: &Track) -> PidStatus {
        self.status(track, Detector::Tpc)
    }

    pub fn status_tof(&self, track: &Track) -> PidStatus {
        self.status(track, Detector::Tof)
    }

    pub fn status_rich(&self, track: &Track) -> PidStatus {
        self.status(track, Detector::Rich)
    }

    /// TPC and TOF combined: any acceptance wins, then any rejection
    pub fn status_tpc_or_tof(&self, track: &Track) -> PidStatus {
        let tpc = self.status_tpc(track);
        let tof = self.status_tof(track);
        if tpc.is_accepted() || tof.is_accepted() {
            PidStatus::Accepted
        } else if tpc == PidStatus::Rejected || tof == PidStatus::Rejected {
            PidStatus::Rejected
        } else {
            PidStatus::Indeterminate
        }
    }

    /// Track identified as this species and not as `other` by TOF or RICH
    ///
    /// A detector identifies the track as X when |nσ_X| is inside the exclusive
    /// radius while |nσ_other| is not.
    pub fn is_and_not(&self, track: &Track, other: Species) -> bool {
        [Detector::Tof, Detector::Rich].iter().any(|&detector| {
            self.valid_signal(track, detector)
                .map(|n| {
                    n.get(self.species).abs() < self.n_sigma_exclusive
                        && !(n.get(other).abs() < self.n_sigma_exclusive)
                })
                .unwrap_or(false)
        })
    }
}
