//! Cut-Flow Statistics
//!
//! Counts where candidates leave the selection and how many survive per pT bin.

use crate::selection::resolver::{Resolution, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-stage bookkeeping of a selection pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutFlow {
    /// Candidates seen
    pub n_candidates: u64,
    /// Candidates with at least one status set
    pub n_selected: u64,
    pub n_d0: u64,
    pub n_d0bar: u64,
    /// Candidates selected under both hypotheses
    pub n_ambiguous: u64,
    /// Rejections by stage name
    pub rejected_by_stage: BTreeMap<String, u64>,
    /// Rejections of the conjugate-independent stage by cut
    pub rejected_by_cut: BTreeMap<String, u64>,
    /// Selected candidates per pT bin
    pub selected_per_bin: Vec<u64>,
}

impl CutFlow {
    pub fn new(n_bins: usize) -> Self {
        Self {
            selected_per_bin: vec![0; n_bins],
            ..Self::default()
        }
    }

    /// Record one candidate's resolution; `bin` is its pT bin, if any
    pub fn record(&mut self, resolution: &Resolution, bin: Option<usize>) {
        self.n_candidates += 1;
        let output = resolution.output;

        if output.is_selected() {
            self.n_selected += 1;
            self.n_d0 += output.status_d0 as u64;
            self.n_d0bar += output.status_d0bar as u64;
            if output.status_d0 == 1 && output.status_d0bar == 1 {
                self.n_ambiguous += 1;
            }
            if let Some(count) = bin.and_then(|b| self.selected_per_bin.get_mut(b)) {
                *count += 1;
            }
            return;
        }

        *self
            .rejected_by_stage
            .entry(resolution.stage.name().to_string())
            .or_insert(0) += 1;
        if let Stage::Topology(cut) = resolution.stage {
            *self.rejected_by_cut.entry(format!("{:?}", cut)).or_insert(0) += 1;
        }
    }

    /// Fraction of candidates with at least one status set
    pub fn efficiency(&self) -> f64 {
        if self.n_candidates > 0 {
            self.n_selected as f64 / self.n_candidates as f64
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> String {
        let mut stages = String::new();
        for (stage, count) in &self.rejected_by_stage {
            stages.push_str(&format!("\n│  ├─ {}: {}", stage, count));
        }
        let mut cuts = String::new();
        for (cut, count) in &self.rejected_by_cut {
            cuts.push_str(&format!("\n│  ├─ {}: {}", cut, count));
        }

        format!(
            "Cut Flow:\n\
             ├─ Candidates: {} ({} selected, {:.1}%)\n\
             ├─ D0: {}  D0bar: {}  both: {}\n\
             ├─ Rejected by stage:{}\n\
             ├─ Topology rejections by cut:{}",
            self.n_candidates,
            self.n_selected,
            self.efficiency() * 100.0,
            self.n_d0,
            self.n_d0bar,
            self.n_ambiguous,
            if stages.is_empty() { " (none)".to_string() } else { stages },
            if cuts.is_empty() { " (none)".to_string() } else { cuts },
        )
    }
}
