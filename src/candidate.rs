//! Candidate and Track Records
//!
//! Read-only inputs to the selector. A [`Candidate`] refers to its daughters by
//! [`TrackId`]; a [`TrackLookup`] resolves the ids, so candidates never own tracks.

use crate::selection::kinematics::sum_momentum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════════════
// DECAY TYPE FLAGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Two-prong decay channels encoded as bits of [`Candidate::hf_flag`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecayType {
    D0ToPiK = 0,
    JpsiToEE = 1,
    JpsiToMuMu = 2,
}

impl DecayType {
    /// Bit mask of this channel
    pub fn mask(&self) -> u8 {
        1 << (*self as u8)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRACK
// ═══════════════════════════════════════════════════════════════════════════════

/// Index of a track in the upstream track table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub usize);

/// Species hypotheses a detector response can be compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Electron,
    Pion,
    Kaon,
}

impl Species {
    pub fn name(&self) -> &'static str {
        match self {
            Species::Electron => "electron",
            Species::Pion => "pion",
            Species::Kaon => "kaon",
        }
    }
}

/// nσ deviations of one detector's response from each species expectation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NSigma {
    pub el: f64,
    pub pi: f64,
    pub ka: f64,
}

impl NSigma {
    pub fn new(el: f64, pi: f64, ka: f64) -> Self {
        Self { el, pi, ka }
    }

    /// Deviation for the given species
    pub fn get(&self, species: Species) -> f64 {
        match species {
            Species::Electron => self.el,
            Species::Pion => self.pi,
            Species::Kaon => self.ka,
        }
    }
}

/// A reconstructed daughter track with its PID observables
///
/// `None` for a detector means the track left no usable signal there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Transverse momentum (GeV/c)
    pub pt: f64,
    /// Impact parameter to the primary vertex (cm)
    pub dca_prim0: f64,
    /// Charge sign (+1 / -1)
    pub sign: i8,
    #[serde(default)]
    pub tpc: Option<NSigma>,
    #[serde(default)]
    pub tof: Option<NSigma>,
    #[serde(default)]
    pub rich: Option<NSigma>,
}

impl Track {
    /// Track without any PID signal
    pub fn new(pt: f64, dca_prim0: f64, sign: i8) -> Self {
        Self {
            pt,
            dca_prim0,
            sign,
            tpc: None,
            tof: None,
            rich: None,
        }
    }

    pub fn with_tpc(mut self, n_sigma: NSigma) -> Self {
        self.tpc = Some(n_sigma);
        self
    }

    pub fn with_tof(mut self, n_sigma: NSigma) -> Self {
        self.tof = Some(n_sigma);
        self
    }

    pub fn with_rich(mut self, n_sigma: NSigma) -> Self {
        self.rich = Some(n_sigma);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRACK LOOKUP
// ═══════════════════════════════════════════════════════════════════════════════

/// Read-only resolution of daughter ids to tracks
pub trait TrackLookup {
    fn track(&self, id: TrackId) -> Option<&Track>;
}

/// Dense track table indexed by [`TrackId`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackTable {
    tracks: Vec<Track>,
}

impl TrackTable {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Append a track and return its id
    pub fn push(&mut self, track: Track) -> TrackId {
        self.tracks.push(track);
        TrackId(self.tracks.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl TrackLookup for TrackTable {
    fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(id.0)
    }
}

impl TrackLookup for HashMap<TrackId, Track> {
    fn track(&self, id: TrackId) -> Option<&Track> {
        self.get(&id)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CANDIDATE
// ═══════════════════════════════════════════════════════════════════════════════

/// A reconstructed two-prong candidate
///
/// Prong 0 sits in the positive-charge slot, prong 1 in the negative one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// 3-momenta of prong 0 and prong 1 at the secondary vertex
    pub prong_momenta: [[f64; 3]; 2],
    /// Product of the daughter impact parameters (cm²)
    pub impact_parameter_product: f64,
    /// Cosine of the pointing angle
    pub cpa: f64,
    /// Cosine of the pointing angle in the transverse plane
    pub cpa_xy: f64,
    pub decay_length: f64,
    pub decay_length_normalised: f64,
    pub decay_length_xy_normalised: f64,
    pub impact_parameter_normalised0: f64,
    pub impact_parameter_normalised1: f64,
    /// Decay-type bitmask, see [`DecayType`]
    pub hf_flag: u8,
    /// Positive daughter
    pub index0: TrackId,
    /// Negative daughter
    pub index1: TrackId,
}

impl Candidate {
    /// Transverse momentum of the candidate
    pub fn pt(&self) -> f64 {
        let p = sum_momentum(&self.prong_momenta);
        (p[0].powi(2) + p[1].powi(2)).sqrt()
    }

    /// Momentum magnitude of the candidate
    pub fn p(&self) -> f64 {
        let p = sum_momentum(&self.prong_momenta);
        (p[0].powi(2) + p[1].powi(2) + p[2].powi(2)).sqrt()
    }

    /// Whether the decay-type flag marks this candidate for `decay`
    pub fn is_flagged(&self, decay: DecayType) -> bool {
        self.hf_flag & decay.mask() != 0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SELECTION OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Selection status under both conjugate hypotheses (0 or 1 each)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionOutput {
    /// Positive daughter π, negative daughter K
    pub status_d0: i32,
    /// Positive daughter K, negative daughter π
    pub status_d0bar: i32,
}

impl SelectionOutput {
    pub fn rejected() -> Self {
        Self::default()
    }

    pub fn new(d0: bool, d0bar: bool) -> Self {
        Self {
            status_d0: d0 as i32,
            status_d0bar: d0bar as i32,
        }
    }

    pub fn is_selected(&self) -> bool {
        self.status_d0 == 1 || self.status_d0bar == 1
    }
}
