//! Hypothesis Resolution
//!
//! Turns the two conjugate topology verdicts and the daughters' PID into the two
//! final statuses.
//!
//! ```text
//!  Unclassified ──► RejectedBoth            (flag, topology, conjugate topology,
//!        │                                   electron veto, PID)
//!        ▼
//!  PidEvaluated ──► Final: status_h = topology_h ∧ pid_h   for h ∈ {D0, D0bar}
//! ```

use crate::candidate::{SelectionOutput, Species, Track};
use crate::config::SelectorConfig;
use crate::selection::pid::TrackSelectorPid;
use crate::selection::topology::TopologyCut;
use serde::{Deserialize, Serialize};

/// Where the evaluation of a candidate ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Decay flag does not mark a D0 → π K candidate
    NotFlagged,
    /// A daughter id was not found in the track lookup
    MissingDaughter,
    /// Conjugate-independent topology failed at this cut
    Topology(TopologyCut),
    /// Neither conjugate assignment passed its topology
    ConjugateTopology,
    /// A daughter looks like an electron rather than a pion
    ElectronVeto,
    /// Neither assignment passed PID
    Pid,
    /// PID evaluated for both assignments
    Resolved,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::NotFlagged => "not flagged",
            Stage::MissingDaughter => "missing daughter",
            Stage::Topology(_) => "topology",
            Stage::ConjugateTopology => "conjugate topology",
            Stage::ElectronVeto => "electron veto",
            Stage::Pid => "pid",
            Stage::Resolved => "resolved",
        }
    }
}

/// Final statuses plus the stage that produced them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub output: SelectionOutput,
    pub stage: Stage,
}

impl Resolution {
    /// Both hypotheses rejected at `stage`
    pub fn rejected(stage: Stage) -> Self {
        Self {
            output: SelectionOutput::rejected(),
            stage,
        }
    }
}

/// PID verdicts for the two species assignments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PidVerdict {
    pub d0: bool,
    pub d0bar: bool,
}

/// Combines topology and PID into the final statuses
#[derive(Debug, Clone)]
pub struct HypothesisResolver {
    pion: TrackSelectorPid,
    kaon: TrackSelectorPid,
    electron: TrackSelectorPid,
}

impl HypothesisResolver {
    pub fn new(config: &SelectorConfig) -> Self {
        Self {
            pion: TrackSelectorPid::new(Species::Pion, config),
            kaon: TrackSelectorPid::new(Species::Kaon, config),
            electron: TrackSelectorPid::new(Species::Electron, config),
        }
    }

    /// Either daughter identified as electron and not pion
    pub fn electron_veto(&self, positive: &Track, negative: &Track) -> bool {
        self.electron.is_and_not(positive, Species::Pion)
            || self.electron.is_and_not(negative, Species::Pion)
    }

    fn is_pion_not_kaon(&self, track: &Track) -> bool {
        self.pion.is_and_not(track, Species::Kaon)
    }

    /// PID for the assignment `pion_track` = π, `kaon_track` = K
    ///
    /// TOF or RICH must accept both species assignments, and the exclusive
    /// identification must single out the pion track only.
    fn accepts(&self, pion_track: &Track, kaon_track: &Track) -> bool {
        let tof = self.pion.status_tof(pion_track).is_accepted()
            && self.kaon.status_tof(kaon_track).is_accepted();
        let rich = self.pion.status_rich(pion_track).is_accepted()
            && self.kaon.status_rich(kaon_track).is_accepted();
        let exclusive = self.is_pion_not_kaon(pion_track) && !self.is_pion_not_kaon(kaon_track);
        (tof || rich) && exclusive
    }

    /// PID verdicts for D0 (positive = π) and D0bar (negative = π)
    pub fn pid(&self, positive: &Track, negative: &Track) -> PidVerdict {
        PidVerdict {
            d0: self.accepts(positive, negative),
            d0bar: self.accepts(negative, positive),
        }
    }

    /// Final statuses for a candidate whose conjugate-independent topology passed
    pub fn resolve(
        &self,
        topology_d0: bool,
        topology_d0bar: bool,
        positive: &Track,
        negative: &Track,
    ) -> Resolution {
        if !topology_d0 && !topology_d0bar {
            return Resolution::rejected(Stage::ConjugateTopology);
        }
        if self.electron_veto(positive, negative) {
            return Resolution::rejected(Stage::ElectronVeto);
        }

        let pid = self.pid(positive, negative);
        if !pid.d0 && !pid.d0bar {
            return Resolution::rejected(Stage::Pid);
        }

        Resolution {
            output: SelectionOutput::new(pid.d0 && topology_d0, pid.d0bar && topology_d0bar),
            stage: Stage::Resolved,
        }
    }
}
