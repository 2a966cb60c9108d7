//! # Heavy-Flavour Candidate Selector
//!
//! Decides, for each reconstructed two-prong candidate, whether it is accepted
//! as a D0 → π⁺ K⁻ decay, as its charge conjugate D0bar → π⁻ K⁺, as both, or as
//! neither. Selection combines pT-binned topological cuts with a
//! multi-detector (TPC, TOF, RICH) particle-identification discriminator.
//!
//! ## Features
//! - pT-binned cut table, loadable from JSON
//! - Per-detector PID status with standalone and combined nσ windows
//! - Conjugate-dependent kinematics (invariant mass, cos θ*) per hypothesis
//! - Electron veto and exclusive pion-not-kaon identification
//! - **Parallel batch selection via rayon**
//! - Cut-flow statistics per stage and per pT bin
//!
//! ## Architecture
//!
//! ```text
//!  Candidate + TrackLookup
//!          │
//!          ▼
//!  ┌───────────────┐   ┌──────────────────┐   ┌────────────────────┐
//!  │   BinTable    │──►│ TopologySelector │──►│ HypothesisResolver │──► SelectionOutput
//!  │ (pT → cuts)   │   │ indep. + conj.   │   │  e-veto, PID, AND  │    (d0, d0bar)
//!  └───────────────┘   └──────────────────┘   └─────────┬──────────┘
//!                                                       │
//!                                             TrackSelectorPid × {π, K, e}
//!                                               (TPC │ TOF │ RICH)
//! ```

pub mod candidate;
pub mod config;
pub mod error;
pub mod metrics;
pub mod selection;

// Integration tests
#[cfg(test)]
mod tests;

pub use candidate::{
    Candidate, DecayType, NSigma, SelectionOutput, Species, Track, TrackId, TrackLookup,
    TrackTable,
};
pub use config::{DetectorPidConfig, SelectorConfig};
pub use error::SelectorError;
pub use metrics::CutFlow;
pub use selection::{
    BinCuts, BinTable, CutVariable, D0Selector, Detector, HypothesisResolver, PidStatus,
    Resolution, ResolvedBins, Stage, TopologyCut, TopologySelector, TrackSelectorPid,
};

/// Result type for selector operations
pub type SelectorResult<T> = Result<T, SelectorError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        // Inputs
        Candidate,
        Track,
        TrackId,
        TrackTable,
        TrackLookup,
        NSigma,

        // Selection
        D0Selector,
        SelectorConfig,
        SelectionOutput,
        CutFlow,

        // Result type
        SelectorResult,
        SelectorError,
    };
}
