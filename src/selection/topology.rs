//! Topological Cuts
//!
//! Geometric and kinematic cuts on a candidate and its daughters. The
//! conjugate-independent stage runs once per candidate; the conjugate-dependent
//! stage runs once per sign-to-species assignment.

use crate::candidate::{Candidate, Track};
use crate::selection::bins::{BinCuts, ResolvedBins};
use crate::selection::kinematics::{
    cos_theta_star_d0, cos_theta_star_d0bar, inv_mass_d0, inv_mass_d0bar, MASS_D0,
};
use serde::{Deserialize, Serialize};

/// Floor on |normalised impact parameter| of each daughter
pub const IMPACT_PARAMETER_NORMALISED_MIN: f64 = 0.5;

/// Decay-length floor: min(p · slope + offset, ceiling)
const DECAY_LENGTH_SLOPE: f64 = 0.0066;
const DECAY_LENGTH_OFFSET: f64 = 0.01;
const DECAY_LENGTH_CEILING: f64 = 0.06;

/// Cut that rejected a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopologyCut {
    NoPtBin,
    PtRange,
    ImpactParameterProduct,
    CosPointingAngle,
    CosPointingAngleXy,
    DecayLengthXyNormalised,
    ImpactParameterNormalised,
    DecayLength,
    DecayLengthNormalised,
    InvariantMass,
    DaughterPt,
    DaughterImpactParameter,
    CosThetaStar,
}

/// Momentum-dependent minimum decay length
pub fn decay_length_floor(p: f64) -> f64 {
    (p * DECAY_LENGTH_SLOPE + DECAY_LENGTH_OFFSET).min(DECAY_LENGTH_CEILING)
}

/// Topological selection driven by a pT-binned cut table
#[derive(Debug, Clone)]
pub struct TopologySelector {
    bins: ResolvedBins,
    pt_cand_min: f64,
    pt_cand_max: f64,
    enforce_decay_length_normalised: bool,
}

impl TopologySelector {
    pub fn new(
        bins: ResolvedBins,
        pt_cand_min: f64,
        pt_cand_max: f64,
        enforce_decay_length_normalised: bool,
    ) -> Self {
        Self {
            bins,
            pt_cand_min,
            pt_cand_max,
            enforce_decay_length_normalised,
        }
    }

    pub fn bins(&self) -> &ResolvedBins {
        &self.bins
    }

    /// Conjugate-independent cuts, first failing cut on rejection
    pub fn check(&self, candidate: &Candidate) -> Result<(), TopologyCut> {
        let pt = candidate.pt();
        let (_, cuts) = self.bins.lookup(pt).ok_or(TopologyCut::NoPtBin)?;

        if pt < self.pt_cand_min || pt >= self.pt_cand_max {
            return Err(TopologyCut::PtRange);
        }
        if candidate.impact_parameter_product > cuts.impact_parameter_product {
            return Err(TopologyCut::ImpactParameterProduct);
        }
        if candidate.cpa < cuts.cos_pointing_angle {
            return Err(TopologyCut::CosPointingAngle);
        }
        if candidate.cpa_xy < cuts.cos_pointing_angle_xy {
            return Err(TopologyCut::CosPointingAngleXy);
        }
        if candidate.decay_length_xy_normalised < cuts.decay_length_xy_normalised {
            return Err(TopologyCut::DecayLengthXyNormalised);
        }
        if candidate.impact_parameter_normalised0.abs() < IMPACT_PARAMETER_NORMALISED_MIN
            || candidate.impact_parameter_normalised1.abs() < IMPACT_PARAMETER_NORMALISED_MIN
        {
            return Err(TopologyCut::ImpactParameterNormalised);
        }

        // decay length > cτ retains (1 - 1/e) of the decays
        let floor = decay_length_floor(candidate.p());
        if candidate.decay_length.powi(2) < floor.powi(2) {
            return Err(TopologyCut::DecayLength);
        }

        if candidate.decay_length_normalised.powi(2) < 1.0 {
            if self.enforce_decay_length_normalised {
                return Err(TopologyCut::DecayLengthNormalised);
            }
            log::trace!(
                "normalised decay length {:.3} below 1, cut disabled",
                candidate.decay_length_normalised
            );
        }
        Ok(())
    }

    pub fn select(&self, candidate: &Candidate) -> bool {
        self.check(candidate).is_ok()
    }

    /// Conjugate-dependent cuts for one species assignment
    ///
    /// The positive-slot/negative-slot formulas are picked from the pion's charge:
    /// a positive pion means the D0 assignment, a negative one the D0bar assignment.
    pub fn check_conjugate(
        &self,
        candidate: &Candidate,
        pion: &Track,
        kaon: &Track,
    ) -> Result<(), TopologyCut> {
        let (_, cuts) = self.bins.lookup(candidate.pt()).ok_or(TopologyCut::NoPtBin)?;
        let pion_positive = pion.sign > 0;

        let mass = if pion_positive {
            inv_mass_d0(&candidate.prong_momenta)
        } else {
            inv_mass_d0bar(&candidate.prong_momenta)
        };
        if (mass - MASS_D0).abs() > cuts.mass {
            return Err(TopologyCut::InvariantMass);
        }

        if pion.pt < cuts.pt_pion || kaon.pt < cuts.pt_kaon {
            return Err(TopologyCut::DaughterPt);
        }

        // TODO: constrain the daughter impact parameters to the secondary vertex
        if pion.dca_prim0.abs() > cuts.impact_parameter_pion
            || kaon.dca_prim0.abs() > cuts.impact_parameter_kaon
        {
            return Err(TopologyCut::DaughterImpactParameter);
        }

        if cos_theta_star(candidate, pion_positive).abs() > cuts.cos_theta_star {
            return Err(TopologyCut::CosThetaStar);
        }
        Ok(())
    }

    pub fn select_conjugate(&self, candidate: &Candidate, pion: &Track, kaon: &Track) -> bool {
        self.check_conjugate(candidate, pion, kaon).is_ok()
    }

    /// Cuts for the bin containing `pt`
    pub fn cuts_for(&self, pt: f64) -> Option<&BinCuts> {
        self.bins.lookup(pt).map(|(_, cuts)| cuts)
    }
}

fn cos_theta_star(candidate: &Candidate, pion_positive: bool) -> f64 {
    if pion_positive {
        cos_theta_star_d0(&candidate.prong_momenta)
    } else {
        cos_theta_star_d0bar(&candidate.prong_momenta)
    }
}
