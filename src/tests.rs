//! Integration Tests for the D0 Selector
//!
//! End-to-end scenarios through [`D0Selector`], from candidate and track records
//! to the final pair of statuses.

use crate::candidate::{Candidate, DecayType, NSigma, SelectionOutput, Track, TrackId, TrackTable};
use crate::config::{DetectorPidConfig, SelectorConfig};
use crate::selection::bins::{BinCuts, BinTable};
use crate::selection::kinematics::{MASS_D0, MASS_KAON, MASS_PION};
use crate::selection::{D0Selector, Stage, TopologyCut};

// ═══════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════

fn loose_cuts() -> BinCuts {
    BinCuts {
        mass: 0.005,
        pt_pion: 0.5,
        pt_kaon: 0.5,
        impact_parameter_pion: 0.1,
        impact_parameter_kaon: 0.1,
        cos_theta_star: 0.8,
        impact_parameter_product: -1e-5,
        cos_pointing_angle: 0.9,
        cos_pointing_angle_xy: 0.9,
        decay_length_xy_normalised: 2.0,
    }
}

fn test_config() -> SelectorConfig {
    SelectorConfig {
        pt_cand_min: 1.0,
        pt_cand_max: 10.0,
        parallel: false,
        bins: BinTable::uniform(vec![0.0, 1.0, 5.0, 10.0], &loose_cuts()),
        ..SelectorConfig::default()
    }
}

fn selector() -> D0Selector {
    D0Selector::new(test_config()).unwrap()
}

/// D0 along x with momentum `p`, daughters perpendicular in the rest frame.
/// Prong 0 carries the pion mass hypothesis exactly.
fn d0_candidate(p: f64, index0: usize, index1: usize) -> Candidate {
    let p_star = ((MASS_D0.powi(2) - (MASS_PION + MASS_KAON).powi(2))
        * (MASS_D0.powi(2) - (MASS_PION - MASS_KAON).powi(2)))
    .sqrt()
        / (2.0 * MASS_D0);
    let e_pi = (p_star.powi(2) + MASS_PION.powi(2)).sqrt();
    let e_k = (p_star.powi(2) + MASS_KAON.powi(2)).sqrt();
    let boost = p / MASS_D0;
    Candidate {
        prong_momenta: [[boost * e_pi, p_star, 0.0], [boost * e_k, -p_star, 0.0]],
        impact_parameter_product: -2e-4,
        cpa: 0.99,
        cpa_xy: 0.99,
        decay_length: 0.08,
        decay_length_normalised: 4.0,
        decay_length_xy_normalised: 4.0,
        impact_parameter_normalised0: 2.0,
        impact_parameter_normalised1: -2.0,
        hf_flag: DecayType::D0ToPiK.mask(),
        index0: TrackId(index0),
        index1: TrackId(index1),
    }
}

/// TOF says pion, not kaon
fn tof_pion(sign: i8) -> Track {
    Track::new(1.3, 0.01, sign).with_tof(NSigma::new(8.0, 0.2, -5.0))
}

/// TOF says kaon, not pion
fn tof_kaon(sign: i8) -> Track {
    Track::new(1.4, 0.01, sign).with_tof(NSigma::new(12.0, 6.0, 0.4))
}

/// π⁺ at index 0, K⁻ at index 1
fn d0_tracks() -> TrackTable {
    TrackTable::new(vec![tof_pion(1), tof_kaon(-1)])
}

// ═══════════════════════════════════════════════════════════════════════════
// SCENARIO TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_pt_below_analysis_range() {
        let sel = selector();
        let cand = d0_candidate(0.8, 0, 1);
        let res = sel.evaluate(&cand, &d0_tracks());
        assert_eq!(res.output, SelectionOutput::rejected());
        assert_eq!(res.stage, Stage::Topology(TopologyCut::PtRange));
    }

    #[test]
    fn test_d0_accepted_d0bar_rejected_by_mass() {
        // Swapped mass assignment is ~8 MeV off, outside the 5 MeV window
        let sel = selector();
        let cand = d0_candidate(2.0, 0, 1);
        let res = sel.evaluate(&cand, &d0_tracks());
        assert_eq!(res.stage, Stage::Resolved);
        assert_eq!(res.output, SelectionOutput::new(true, false));
    }

    #[test]
    fn test_impact_parameter_normalised_boundary() {
        let sel = selector();
        let tracks = d0_tracks();

        let mut cand = d0_candidate(2.0, 0, 1);
        cand.impact_parameter_normalised0 = 0.5;
        assert_eq!(sel.select(&cand, &tracks), SelectionOutput::new(true, false));

        cand.impact_parameter_normalised0 = 0.4999;
        let res = sel.evaluate(&cand, &tracks);
        assert_eq!(res.output, SelectionOutput::rejected());
        assert_eq!(
            res.stage,
            Stage::Topology(TopologyCut::ImpactParameterNormalised)
        );
    }

    #[test]
    fn test_rich_rescues_tracks_beyond_tof_range() {
        // Track pT above the TOF range (5 GeV/c) but inside the RICH range (10 GeV/c)
        let pion = Track::new(6.0, 0.01, 1)
            .with_tof(NSigma::new(8.0, 0.2, -5.0))
            .with_rich(NSigma::new(8.0, 0.1, 5.0));
        let kaon = Track::new(6.5, 0.01, -1)
            .with_tof(NSigma::new(12.0, 6.0, 0.4))
            .with_rich(NSigma::new(9.0, 6.0, -0.3));
        let tracks = TrackTable::new(vec![pion, kaon]);
        let cand = d0_candidate(2.0, 0, 1);

        assert_eq!(
            selector().select(&cand, &tracks),
            SelectionOutput::new(true, false)
        );

        let mut config = test_config();
        config.rich = DetectorPidConfig::disabled();
        let no_rich = D0Selector::new(config).unwrap();
        let res = no_rich.evaluate(&cand, &tracks);
        assert_eq!(res.output, SelectionOutput::rejected());
        assert_eq!(res.stage, Stage::Pid);
    }

    #[test]
    fn test_d0bar_assignment() {
        // K⁺ at index 0, π⁻ at index 1, and prong masses matching that assignment
        let mut cand = d0_candidate(2.0, 0, 1);
        cand.prong_momenta.swap(0, 1);
        let tracks = TrackTable::new(vec![tof_kaon(1), tof_pion(-1)]);
        assert_eq!(
            selector().select(&cand, &tracks),
            SelectionOutput::new(false, true)
        );
    }

    /// Selector with a wide mass window and the given pion pT threshold
    fn selector_with_pt_pion(pt_pion: f64) -> D0Selector {
        let cuts = BinCuts {
            mass: 0.4,
            pt_pion,
            ..loose_cuts()
        };
        D0Selector::new(SelectorConfig {
            bins: BinTable::uniform(vec![0.0, 1.0, 5.0, 10.0], &cuts),
            ..test_config()
        })
        .unwrap()
    }

    #[test]
    fn test_d0_cuts_do_not_affect_d0bar() {
        // K⁺ (pT 0.8) at index 0, π⁻ (pT 1.3) at index 1, D0bar kinematics
        let mut cand = d0_candidate(2.0, 0, 1);
        cand.prong_momenta.swap(0, 1);
        let kaon = Track { pt: 0.8, ..tof_kaon(1) };
        let tracks = TrackTable::new(vec![kaon.clone(), tof_pion(-1)]);
        let pion = tof_pion(-1);

        let loose = selector_with_pt_pion(0.5);
        let tight = selector_with_pt_pion(1.0);
        assert_eq!(tight.topology().cuts_for(2.0).map(|c| c.pt_pion), Some(1.0));

        // Only the D0 assignment (positive track as pion) flips
        assert!(loose.topology().select_conjugate(&cand, &kaon, &pion));
        assert!(!tight.topology().select_conjugate(&cand, &kaon, &pion));
        assert!(tight.topology().select_conjugate(&cand, &pion, &kaon));

        assert_eq!(loose.select(&cand, &tracks), SelectionOutput::new(false, true));
        assert_eq!(tight.select(&cand, &tracks), SelectionOutput::new(false, true));
    }

    #[test]
    fn test_d0bar_cuts_do_not_affect_d0() {
        // π⁺ (pT 1.3) at index 0, K⁻ (pT 0.8) at index 1, D0 kinematics
        let cand = d0_candidate(2.0, 0, 1);
        let kaon = Track { pt: 0.8, ..tof_kaon(-1) };
        let tracks = TrackTable::new(vec![tof_pion(1), kaon.clone()]);
        let pion = tof_pion(1);

        let loose = selector_with_pt_pion(0.5);
        let tight = selector_with_pt_pion(1.0);

        // Only the D0bar assignment (negative track as pion) flips
        assert!(loose.topology().select_conjugate(&cand, &kaon, &pion));
        assert!(!tight.topology().select_conjugate(&cand, &kaon, &pion));
        assert!(tight.topology().select_conjugate(&cand, &pion, &kaon));

        assert_eq!(loose.select(&cand, &tracks), SelectionOutput::new(true, false));
        assert_eq!(tight.select(&cand, &tracks), SelectionOutput::new(true, false));
    }

    #[test]
    fn test_electron_veto_precedes_pid() {
        let electron = Track::new(0.6, 0.01, -1).with_rich(NSigma::new(0.3, 4.5, 9.0));
        let tracks = TrackTable::new(vec![tof_pion(1), electron]);
        let res = selector().evaluate(&d0_candidate(2.0, 0, 1), &tracks);
        assert_eq!(res, crate::selection::Resolution::rejected(Stage::ElectronVeto));
    }

    #[test]
    fn test_not_flagged() {
        let mut cand = d0_candidate(2.0, 0, 1);
        cand.hf_flag = DecayType::JpsiToEE.mask();
        let res = selector().evaluate(&cand, &d0_tracks());
        assert_eq!(res.stage, Stage::NotFlagged);
        assert_eq!(res.output, SelectionOutput::rejected());

        cand.hf_flag |= DecayType::D0ToPiK.mask();
        assert!(selector().select(&cand, &d0_tracks()).is_selected());
    }

    #[test]
    fn test_missing_daughter() {
        let cand = d0_candidate(2.0, 0, 99);
        let res = selector().evaluate(&cand, &d0_tracks());
        assert_eq!(res.stage, Stage::MissingDaughter);
        assert_eq!(res.output, SelectionOutput::rejected());
    }

    #[test]
    fn test_hash_map_lookup() {
        use std::collections::HashMap;

        let mut tracks = HashMap::new();
        tracks.insert(TrackId(17), tof_pion(1));
        tracks.insert(TrackId(4), tof_kaon(-1));
        let cand = d0_candidate(2.0, 17, 4);
        assert_eq!(
            selector().select(&cand, &tracks),
            SelectionOutput::new(true, false)
        );
    }

    #[test]
    fn test_config_file_round_trip_gives_same_selection() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("selector.json");
        test_config().save(&path).unwrap();

        let loaded = D0Selector::new(SelectorConfig::load(&path).unwrap()).unwrap();
        assert_eq!(loaded.config(), &test_config());
        let cand = d0_candidate(2.0, 0, 1);
        assert_eq!(
            loaded.select(&cand, &d0_tracks()),
            selector().select(&cand, &d0_tracks())
        );
    }

    #[test]
    fn test_invalid_config_rejected_before_selection() {
        let mut config = test_config();
        config.bins.pt_bins = vec![0.0, 5.0, 5.0, 10.0];
        assert!(D0Selector::new(config).is_err());

        let mut config = test_config();
        config.pt_cand_max = config.pt_cand_min;
        assert!(D0Selector::new(config).is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BATCH TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod batch_tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Candidates with randomised topology over a mixed track table
    fn random_event(seed: u64, n: usize) -> (Vec<Candidate>, TrackTable) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tracks = TrackTable::default();
        let mut candidates = Vec::with_capacity(n);

        for _ in 0..n {
            let (pos, neg) = if rng.gen_bool(0.5) {
                (tof_pion(1), tof_kaon(-1))
            } else {
                (tof_kaon(1), tof_pion(-1))
            };
            let i0 = tracks.push(pos);
            let i1 = tracks.push(neg);

            let mut cand = d0_candidate(rng.gen_range(0.2..12.0), i0.0, i1.0);
            cand.cpa = rng.gen_range(0.85..1.0);
            cand.impact_parameter_normalised0 = rng.gen_range(-3.0..3.0);
            cand.decay_length = rng.gen_range(0.0..0.1);
            if rng.gen_bool(0.5) {
                cand.prong_momenta.swap(0, 1);
            }
            candidates.push(cand);
        }
        (candidates, tracks)
    }

    #[test]
    fn test_output_length_and_order() {
        let (candidates, tracks) = random_event(7, 200);
        let sel = selector();
        let outputs = sel.select_all(&candidates, &tracks);

        assert_eq!(outputs.len(), candidates.len());
        for (cand, out) in candidates.iter().zip(&outputs) {
            assert_eq!(sel.select(cand, &tracks), *out);
        }
    }

    #[test]
    fn test_deterministic() {
        let (candidates, tracks) = random_event(42, 300);
        let sel = selector();
        assert_eq!(
            sel.select_all(&candidates, &tracks),
            sel.select_all(&candidates, &tracks)
        );
    }

    #[test]
    fn test_candidates_independent() {
        let (candidates, tracks) = random_event(3, 150);
        let sel = selector();
        let forward = sel.select_all(&candidates, &tracks);

        let reversed: Vec<Candidate> = candidates.iter().rev().cloned().collect();
        let mut backward = sel.select_all(&reversed, &tracks);
        backward.reverse();
        assert_eq!(forward, backward);

        let half = sel.select_all(&candidates[..75], &tracks);
        assert_eq!(half.as_slice(), &forward[..75]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (candidates, tracks) = random_event(11, 500);
        let sequential = selector();
        let parallel = D0Selector::new(SelectorConfig {
            parallel: true,
            ..test_config()
        })
        .unwrap();

        assert_eq!(
            sequential.select_all(&candidates, &tracks),
            parallel.select_all(&candidates, &tracks)
        );
    }

    #[test]
    fn test_random_event_selects_something() {
        let (candidates, tracks) = random_event(5, 400);
        let outputs = selector().select_all(&candidates, &tracks);
        assert!(outputs.iter().any(|o| o.is_selected()));
        assert!(outputs.iter().any(|o| !o.is_selected()));
        // Each candidate's prong masses fit one assignment only
        assert!(outputs
            .iter()
            .all(|o| !(o.status_d0 == 1 && o.status_d0bar == 1)));
    }

    #[test]
    fn test_empty_batch() {
        let (outputs, flow) = selector().select_with_cut_flow(&[], &TrackTable::default());
        assert!(outputs.is_empty());
        assert_eq!(flow.n_candidates, 0);
        assert_eq!(flow.efficiency(), 0.0);
    }

    #[test]
    fn test_cut_flow_counts() {
        let sel = selector();
        let tracks = d0_tracks();

        let selected = d0_candidate(2.0, 0, 1);
        let low_pt = d0_candidate(0.8, 0, 1);
        let mut unflagged = d0_candidate(2.0, 0, 1);
        unflagged.hf_flag = 0;
        let orphan = d0_candidate(6.0, 0, 5);
        let in_last_bin = d0_candidate(7.0, 0, 1);

        let candidates = vec![selected, low_pt, unflagged, orphan, in_last_bin];
        let (outputs, flow) = sel.select_with_cut_flow(&candidates, &tracks);

        assert_eq!(outputs, sel.select_all(&candidates, &tracks));
        assert_eq!(flow.n_candidates, 5);
        assert_eq!(flow.n_selected, 2);
        assert_eq!(flow.n_d0, 2);
        assert_eq!(flow.n_d0bar, 0);
        assert_eq!(flow.selected_per_bin, vec![0, 1, 1]);
        assert_eq!(flow.rejected_by_stage.get("not flagged"), Some(&1));
        assert_eq!(flow.rejected_by_stage.get("missing daughter"), Some(&1));
        assert_eq!(flow.rejected_by_cut.get("PtRange"), Some(&1));
    }
}
