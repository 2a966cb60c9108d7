//! pT-Binned Cut Thresholds
//!
//! The configured table is a list of strictly increasing pT edges plus one labelled
//! row of thresholds per bin. [`BinTable::resolve`] validates it once and turns each
//! row into a typed [`BinCuts`], so a candidate that found its bin can never miss a
//! threshold.

use crate::error::SelectorError;
use crate::SelectorResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ═══════════════════════════════════════════════════════════════════════════════
// CUT VARIABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Named per-bin thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CutVariable {
    /// Half-width of the invariant-mass window around the D0 mass
    Mass,
    PtPion,
    PtKaon,
    ImpactParameterPion,
    ImpactParameterKaon,
    CosThetaStar,
    ImpactParameterProduct,
    CosPointingAngle,
    CosPointingAngleXy,
    DecayLengthXyNormalised,
}

impl CutVariable {
    /// All variables in table column order
    pub fn all() -> [Self; 10] {
        [
            Self::Mass,
            Self::CosThetaStar,
            Self::PtKaon,
            Self::PtPion,
            Self::ImpactParameterKaon,
            Self::ImpactParameterPion,
            Self::ImpactParameterProduct,
            Self::CosPointingAngle,
            Self::CosPointingAngleXy,
            Self::DecayLengthXyNormalised,
        ]
    }

    /// Label used in the configuration table
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mass => "m",
            Self::PtPion => "pT Pi",
            Self::PtKaon => "pT K",
            Self::ImpactParameterPion => "d0pi",
            Self::ImpactParameterKaon => "d0K",
            Self::CosThetaStar => "cos theta*",
            Self::ImpactParameterProduct => "d0d0",
            Self::CosPointingAngle => "cos pointing angle",
            Self::CosPointingAngleXy => "cos pointing angle xy",
            Self::DecayLengthXyNormalised => "normalized decay length XY",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().into_iter().find(|v| v.label() == label)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEFAULT TABLE
// ═══════════════════════════════════════════════════════════════════════════════

const DEFAULT_PT_BINS: [f64; 26] = [
    0., 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0, 5.5, 6.0, 6.5, 7.0, 7.5, 8.0, 9.0,
    10.0, 12.0, 16.0, 20.0, 24.0, 36.0, 50.0, 100.0,
];

// m, cos theta*, pT K, pT Pi, d0K, d0pi, d0d0, cos pointing angle, cos pointing angle xy,
// normalized decay length XY
#[rustfmt::skip]
const DEFAULT_CUTS: [[f64; 10]; 25] = [
    [0.400, 0.8, 0.5, 0.5, 1000. * 1E-4, 1000. * 1E-4, -5000. * 1E-8, 0.80, 0., 0.],   /* 0   < pT < 0.5 */
    [0.400, 0.8, 0.5, 0.5, 1000. * 1E-4, 1000. * 1E-4, -5000. * 1E-8, 0.80, 0., 0.],   /* 0.5 < pT < 1   */
    [0.400, 0.8, 0.4, 0.4, 1000. * 1E-4, 1000. * 1E-4, -25000. * 1E-8, 0.80, 0., 0.],  /* 1   < pT < 1.5 */
    [0.400, 0.8, 0.4, 0.4, 1000. * 1E-4, 1000. * 1E-4, -25000. * 1E-8, 0.80, 0., 0.],  /* 1.5 < pT < 2   */
    [0.400, 0.8, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -20000. * 1E-8, 0.90, 0., 0.],  /* 2   < pT < 2.5 */
    [0.400, 0.8, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -20000. * 1E-8, 0.90, 0., 0.],  /* 2.5 < pT < 3   */
    [0.400, 0.8, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -12000. * 1E-8, 0.85, 0., 0.],  /* 3   < pT < 3.5 */
    [0.400, 0.8, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -12000. * 1E-8, 0.85, 0., 0.],  /* 3.5 < pT < 4   */
    [0.400, 0.8, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -8000. * 1E-8, 0.85, 0., 0.],   /* 4   < pT < 4.5 */
    [0.400, 0.8, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -8000. * 1E-8, 0.85, 0., 0.],   /* 4.5 < pT < 5   */
    [0.400, 0.8, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -8000. * 1E-8, 0.85, 0., 0.],   /* 5   < pT < 5.5 */
    [0.400, 0.8, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -8000. * 1E-8, 0.85, 0., 0.],   /* 5.5 < pT < 6   */
    [0.400, 0.8, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -7000. * 1E-8, 0.85, 0., 0.],   /* 6   < pT < 6.5 */
    [0.400, 0.8, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -7000. * 1E-8, 0.85, 0., 0.],   /* 6.5 < pT < 7   */
    [0.400, 0.8, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -7000. * 1E-8, 0.85, 0., 0.],   /* 7   < pT < 7.5 */
    [0.400, 0.8, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -5000. * 1E-8, 0.85, 0., 0.],   /* 7.5 < pT < 8   */
    [0.400, 0.9, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -5000. * 1E-8, 0.85, 0., 0.],   /* 8   < pT < 9   */
    [0.400, 0.9, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -5000. * 1E-8, 0.85, 0., 0.],   /* 9   < pT < 10  */
    [0.400, 0.9, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, -5000. * 1E-8, 0.85, 0., 0.],   /* 10  < pT < 12  */
    [0.400, 1.0, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, 10000. * 1E-8, 0.85, 0., 0.],   /* 12  < pT < 16  */
    [0.400, 1.0, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, 999999. * 1E-8, 0.85, 0., 0.],  /* 16  < pT < 20  */
    [0.400, 1.0, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, 999999. * 1E-8, 0.85, 0., 0.],  /* 20  < pT < 24  */
    [0.400, 1.0, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, 999999. * 1E-8, 0.85, 0., 0.],  /* 24  < pT < 36  */
    [0.400, 1.0, 0.7, 0.7, 1000. * 1E-4, 1000. * 1E-4, 999999. * 1E-8, 0.85, 0., 0.],  /* 36  < pT < 50  */
    [0.400, 1.0, 0.6, 0.6, 1000. * 1E-4, 1000. * 1E-4, 999999. * 1E-8, 0.80, 0., 0.],  /* 50  < pT < 100 */
];

// ═══════════════════════════════════════════════════════════════════════════════
// BIN LOOKUP
// ═══════════════════════════════════════════════════════════════════════════════

/// Index `i` with `edges[i] <= value < edges[i + 1]`, `None` outside all bins
///
/// `edges` must be strictly increasing.
pub fn find_bin(edges: &[f64], value: f64) -> Option<usize> {
    let (first, last) = (edges.first()?, edges.last()?);
    if edges.len() < 2 || value.is_nan() || value < *first || value >= *last {
        return None;
    }
    Some(edges.partition_point(|&e| e <= value) - 1)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURED TABLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Bin table as configured: edges plus one labelled row per bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinTable {
    /// pT bin limits (GeV/c)
    pub pt_bins: Vec<f64>,
    /// Cut label → threshold, one map per bin
    pub cuts: Vec<BTreeMap<String, f64>>,
}

impl Default for BinTable {
    fn default() -> Self {
        let cuts = DEFAULT_CUTS
            .iter()
            .map(|row| {
                CutVariable::all()
                    .iter()
                    .zip(row.iter())
                    .map(|(var, &value)| (var.label().to_string(), value))
                    .collect()
            })
            .collect();
        Self {
            pt_bins: DEFAULT_PT_BINS.to_vec(),
            cuts,
        }
    }
}

impl BinTable {
    /// Build a table with the same row for every bin
    pub fn uniform(pt_bins: Vec<f64>, row: &BinCuts) -> Self {
        let n_bins = pt_bins.len().saturating_sub(1);
        let labelled: BTreeMap<String, f64> = CutVariable::all()
            .iter()
            .map(|var| (var.label().to_string(), row.get(*var)))
            .collect();
        Self {
            pt_bins,
            cuts: vec![labelled; n_bins],
        }
    }

    /// Number of bins implied by the edges
    pub fn n_bins(&self) -> usize {
        self.pt_bins.len().saturating_sub(1)
    }

    /// Check edge ordering, row count and label completeness
    pub fn validate(&self) -> SelectorResult<()> {
        if self.pt_bins.len() < 2 {
            return Err(SelectorError::InvalidParameter(format!(
                "at least two pT bin edges required, got {}",
                self.pt_bins.len()
            )));
        }
        for (i, pair) in self.pt_bins.windows(2).enumerate() {
            if !(pair[0] < pair[1]) {
                return Err(SelectorError::NonIncreasingEdges {
                    index: i + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        if self.cuts.len() != self.n_bins() {
            return Err(SelectorError::BinCountMismatch {
                edges: self.pt_bins.len(),
                expected: self.n_bins(),
                got: self.cuts.len(),
            });
        }
        for (bin, row) in self.cuts.iter().enumerate() {
            for var in CutVariable::all() {
                if !row.contains_key(var.label()) {
                    return Err(SelectorError::MissingCut {
                        bin,
                        label: var.label().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate and convert into typed per-bin cuts
    pub fn resolve(&self) -> SelectorResult<ResolvedBins> {
        self.validate()?;

        let mut rows = Vec::with_capacity(self.cuts.len());
        for (bin, row) in self.cuts.iter().enumerate() {
            for label in row.keys() {
                if CutVariable::from_label(label).is_none() {
                    log::warn!("Ignoring unknown cut \"{}\" in pT bin {}", label, bin);
                }
            }
            rows.push(BinCuts::from_labelled(bin, row)?);
        }

        Ok(ResolvedBins {
            edges: self.pt_bins.clone(),
            rows,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLVED TABLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Thresholds of one pT bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinCuts {
    pub mass: f64,
    pub pt_pion: f64,
    pub pt_kaon: f64,
    pub impact_parameter_pion: f64,
    pub impact_parameter_kaon: f64,
    pub cos_theta_star: f64,
    pub impact_parameter_product: f64,
    pub cos_pointing_angle: f64,
    pub cos_pointing_angle_xy: f64,
    pub decay_length_xy_normalised: f64,
}

impl BinCuts {
    fn from_labelled(bin: usize, row: &BTreeMap<String, f64>) -> SelectorResult<Self> {
        let get = |var: CutVariable| {
            row.get(var.label())
                .copied()
                .ok_or_else(|| SelectorError::MissingCut {
                    bin,
                    label: var.label().to_string(),
                })
        };
        Ok(Self {
            mass: get(CutVariable::Mass)?,
            pt_pion: get(CutVariable::PtPion)?,
            pt_kaon: get(CutVariable::PtKaon)?,
            impact_parameter_pion: get(CutVariable::ImpactParameterPion)?,
            impact_parameter_kaon: get(CutVariable::ImpactParameterKaon)?,
            cos_theta_star: get(CutVariable::CosThetaStar)?,
            impact_parameter_product: get(CutVariable::ImpactParameterProduct)?,
            cos_pointing_angle: get(CutVariable::CosPointingAngle)?,
            cos_pointing_angle_xy: get(CutVariable::CosPointingAngleXy)?,
            decay_length_xy_normalised: get(CutVariable::DecayLengthXyNormalised)?,
        })
    }

    /// Threshold by variable
    pub fn get(&self, var: CutVariable) -> f64 {
        match var {
            CutVariable::Mass => self.mass,
            CutVariable::PtPion => self.pt_pion,
            CutVariable::PtKaon => self.pt_kaon,
            CutVariable::ImpactParameterPion => self.impact_parameter_pion,
            CutVariable::ImpactParameterKaon => self.impact_parameter_kaon,
            CutVariable::CosThetaStar => self.cos_theta_star,
            CutVariable::ImpactParameterProduct => self.impact_parameter_product,
            CutVariable::CosPointingAngle => self.cos_pointing_angle,
            CutVariable::CosPointingAngleXy => self.cos_pointing_angle_xy,
            CutVariable::DecayLengthXyNormalised => self.decay_length_xy_normalised,
        }
    }
}

/// Validated table with typed rows
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBins {
    edges: Vec<f64>,
    rows: Vec<BinCuts>,
}

impl ResolvedBins {
    pub fn find_bin(&self, pt: f64) -> Option<usize> {
        find_bin(&self.edges, pt)
    }

    /// Cuts of the bin containing `pt`
    pub fn lookup(&self, pt: f64) -> Option<(usize, &BinCuts)> {
        let bin = self.find_bin(pt)?;
        self.rows.get(bin).map(|cuts| (bin, cuts))
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn n_bins(&self) -> usize {
        self.rows.len()
    }
}
