//! # D0 → π± K∓ Selection Engine
//!
//! Per candidate, a short-circuiting pipeline decides the status under both
//! charge-conjugate hypotheses.
//!
//! ```text
//!     candidate ──► decay flag ──► pT bin ──► conjugate-independent topology
//!                                                     │
//!                        ┌────────────────────────────┴───────────────┐
//!                        ▼                                            ▼
//!              D0 topology (pos=π, neg=K)              D0bar topology (pos=K, neg=π)
//!                        └────────────────────────────┬───────────────┘
//!                                                     ▼
//!                                              electron veto
//!                                                     │
//!                                                     ▼
//!                              PID (TOF ∨ RICH) + exclusive π-not-K identification
//!                                                     │
//!                                                     ▼
//!                                       (status_d0, status_d0bar)
//! ```
//!
//! Any stage may end the candidate with both statuses at 0. Candidates are
//! independent, so batches map over candidates in parallel.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hf_selector::{D0Selector, SelectorConfig, TrackTable};
//!
//! let selector = D0Selector::new(SelectorConfig::default())?;
//! let statuses = selector.select_all(&candidates, &tracks);
//! ```

pub mod bins;
pub mod kinematics;
pub mod pid;
pub mod resolver;
pub mod topology;

pub use bins::{find_bin, BinCuts, BinTable, CutVariable, ResolvedBins};
pub use kinematics::{FourMomentum, MASS_D0, MASS_KAON, MASS_PION};
pub use pid::{Detector, DetectorWindow, PidStatus, TrackSelectorPid};
pub use resolver::{HypothesisResolver, PidVerdict, Resolution, Stage};
pub use topology::{TopologyCut, TopologySelector};

use crate::candidate::{Candidate, DecayType, SelectionOutput, TrackLookup};
use crate::config::SelectorConfig;
use crate::metrics::CutFlow;
use crate::SelectorResult;
use rayon::prelude::*;

/// Candidate selector for D0 → π K and its conjugate
#[derive(Debug, Clone)]
pub struct D0Selector {
    config: SelectorConfig,
    topology: TopologySelector,
    resolver: HypothesisResolver,
}

impl D0Selector {
    /// Validate the configuration and build the selector
    pub fn new(config: SelectorConfig) -> SelectorResult<Self> {
        config.validate()?;
        let bins = config.bins.resolve()?;
        let topology = TopologySelector::new(
            bins,
            config.pt_cand_min,
            config.pt_cand_max,
            config.enforce_decay_length_normalised,
        );
        let resolver = HypothesisResolver::new(&config);

        log::info!(
            "D0 selector ready: pT [{}, {}), {} bins, TPC {} / TOF {} / RICH {}",
            config.pt_cand_min,
            config.pt_cand_max,
            topology.bins().n_bins(),
            if config.tpc.enabled { "on" } else { "off" },
            if config.tof.enabled { "on" } else { "off" },
            if config.rich.enabled { "on" } else { "off" },
        );

        Ok(Self {
            config,
            topology,
            resolver,
        })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn topology(&self) -> &TopologySelector {
        &self.topology
    }

    /// Run the full pipeline on one candidate
    pub fn evaluate<L: TrackLookup + ?Sized>(&self, candidate: &Candidate, tracks: &L) -> Resolution {
        if !candidate.is_flagged(DecayType::D0ToPiK) {
            return Resolution::rejected(Stage::NotFlagged);
        }

        let (positive, negative) =
            match (tracks.track(candidate.index0), tracks.track(candidate.index1)) {
                (Some(pos), Some(neg)) => (pos, neg),
                _ => {
                    log::warn!(
                        "Daughter lookup failed for tracks {:?} / {:?}",
                        candidate.index0,
                        candidate.index1
                    );
                    return Resolution::rejected(Stage::MissingDaughter);
                }
            };

        if let Err(cut) = self.topology.check(candidate) {
            log::debug!("Candidate (pT {:.2}) failed {:?}", candidate.pt(), cut);
            return Resolution::rejected(Stage::Topology(cut));
        }

        let topology_d0 = self.topology.select_conjugate(candidate, positive, negative);
        let topology_d0bar = self.topology.select_conjugate(candidate, negative, positive);

        let resolution = self
            .resolver
            .resolve(topology_d0, topology_d0bar, positive, negative);
        log::debug!(
            "Candidate (pT {:.2}) ended at {} with ({}, {})",
            candidate.pt(),
            resolution.stage.name(),
            resolution.output.status_d0,
            resolution.output.status_d0bar
        );
        resolution
    }

    /// Statuses of one candidate
    pub fn select<L: TrackLookup + ?Sized>(&self, candidate: &Candidate, tracks: &L) -> SelectionOutput {
        self.evaluate(candidate, tracks).output
    }

    fn evaluate_all<L: TrackLookup + Sync + ?Sized>(
        &self,
        candidates: &[Candidate],
        tracks: &L,
    ) -> Vec<Resolution> {
        if self.config.parallel {
            candidates
                .par_iter()
                .map(|candidate| self.evaluate(candidate, tracks))
                .collect()
        } else {
            candidates
                .iter()
                .map(|candidate| self.evaluate(candidate, tracks))
                .collect()
        }
    }

    /// One output per candidate, in input order
    pub fn select_all<L: TrackLookup + Sync + ?Sized>(
        &self,
        candidates: &[Candidate],
        tracks: &L,
    ) -> Vec<SelectionOutput> {
        self.evaluate_all(candidates, tracks)
            .into_iter()
            .map(|resolution| resolution.output)
            .collect()
    }

    /// Like [`select_all`](Self::select_all), also returning the cut flow
    pub fn select_with_cut_flow<L: TrackLookup + Sync + ?Sized>(
        &self,
        candidates: &[Candidate],
        tracks: &L,
    ) -> (Vec<SelectionOutput>, CutFlow) {
        let resolutions = self.evaluate_all(candidates, tracks);
        let mut cut_flow = CutFlow::new(self.topology.bins().n_bins());

        let outputs = candidates
            .iter()
            .zip(resolutions)
            .map(|(candidate, resolution)| {
                cut_flow.record(&resolution, self.topology.bins().find_bin(candidate.pt()));
                resolution.output
            })
            .collect();

        log::info!(
            "Selected {} of {} candidates",
            cut_flow.n_selected,
            cut_flow.n_candidates
        );
        (outputs, cut_flow)
    }
}
