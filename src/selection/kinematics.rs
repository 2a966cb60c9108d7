//! Two-Prong Kinematics
//!
//! Four-momentum arithmetic for the D0 → π K decay in natural units (c = 1, GeV).
//!
//! Both quantities the conjugate-dependent cuts need depend on which prong is
//! given which mass:
//!
//! | Quantity | D0 (prong 0 = π⁺) | D0bar (prong 0 = K⁺) |
//! |----------|-------------------|----------------------|
//! | m_inv    | m(π, K)           | m(K, π)              |
//! | cos θ*   | kaon prong (1)    | kaon prong (0)       |

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// PDG MASSES
// ═══════════════════════════════════════════════════════════════════════════════

/// Charged pion mass (GeV/c²)
pub const MASS_PION: f64 = 0.13957039;
/// Charged kaon mass (GeV/c²)
pub const MASS_KAON: f64 = 0.493677;
/// D0 meson mass (GeV/c²)
pub const MASS_D0: f64 = 1.86484;

// ═══════════════════════════════════════════════════════════════════════════════
// FOUR-MOMENTUM
// ═══════════════════════════════════════════════════════════════════════════════

/// Four-momentum vector p^μ = (E, p_x, p_y, p_z)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourMomentum {
    /// Energy component
    pub e: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl FourMomentum {
    /// Create a new four-momentum
    pub fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self { e, px, py, pz }
    }

    /// Put a 3-momentum on the mass shell: E = √(|p|² + m²)
    pub fn from_momentum(p: [f64; 3], mass: f64) -> Self {
        let p2 = p[0].powi(2) + p[1].powi(2) + p[2].powi(2);
        Self::new((p2 + mass.powi(2)).sqrt(), p[0], p[1], p[2])
    }

    /// Compute invariant mass squared: m² = E² - |p|²
    pub fn mass_squared(&self) -> f64 {
        self.e.powi(2) - self.px.powi(2) - self.py.powi(2) - self.pz.powi(2)
    }

    /// Compute invariant mass, 0 for spacelike momenta
    pub fn mass(&self) -> f64 {
        let m2 = self.mass_squared();
        if m2 >= 0.0 {
            m2.sqrt()
        } else {
            0.0
        }
    }

    /// Compute 3-momentum magnitude: |p| = √(p_x² + p_y² + p_z²)
    pub fn three_momentum_magnitude(&self) -> f64 {
        (self.px.powi(2) + self.py.powi(2) + self.pz.powi(2)).sqrt()
    }

    /// Compute transverse momentum: p_T = √(p_x² + p_y²)
    pub fn transverse_momentum(&self) -> f64 {
        (self.px.powi(2) + self.py.powi(2)).sqrt()
    }

    /// Add two four-momenta
    pub fn add(&self, other: &Self) -> Self {
        Self {
            e: self.e + other.e,
            px: self.px + other.px,
            py: self.py + other.py,
            pz: self.pz + other.pz,
        }
    }
}

impl std::ops::Add for FourMomentum {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        FourMomentum::add(&self, &other)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TWO-PRONG QUANTITIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Sum of the prong 3-momenta
pub fn sum_momentum(prongs: &[[f64; 3]; 2]) -> [f64; 3] {
    [
        prongs[0][0] + prongs[1][0],
        prongs[0][1] + prongs[1][1],
        prongs[0][2] + prongs[1][2],
    ]
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Invariant mass of the pair with `masses[i]` assigned to `prongs[i]`
pub fn invariant_mass(prongs: &[[f64; 3]; 2], masses: [f64; 2]) -> f64 {
    let total = FourMomentum::from_momentum(prongs[0], masses[0])
        + FourMomentum::from_momentum(prongs[1], masses[1]);
    total.mass()
}

/// Cosine of the angle between prong `i_prong` in the mother rest frame and the
/// mother flight direction.
///
/// The mother is put on shell with `mother_mass`; p* and E* are the two-body breakup
/// momentum and energy for `masses`, so cos θ* = (p_L / γ − β E*) / p*. For a pair off
/// the mother mass shell this is not bounded by 1. Returns 0 for a mother at rest,
/// where the flight direction is undefined.
pub fn cos_theta_star(
    prongs: &[[f64; 3]; 2],
    masses: [f64; 2],
    mother_mass: f64,
    i_prong: usize,
) -> f64 {
    let p_tot = sum_momentum(prongs);
    let p_mag = dot(&p_tot, &p_tot).sqrt();
    if p_mag <= 0.0 {
        return 0.0;
    }
    let e_tot = (p_mag.powi(2) + mother_mass.powi(2)).sqrt();
    let gamma = e_tot / mother_mass;
    let beta = p_mag / e_tot;

    // p* = √[(M² - m₁² - m₂²)² - 4 m₁² m₂²] / 2M
    let p_star = ((mother_mass.powi(2) - masses[0].powi(2) - masses[1].powi(2)).powi(2)
        - 4.0 * (masses[0] * masses[1]).powi(2))
    .max(0.0)
    .sqrt()
        / (2.0 * mother_mass);
    if p_star <= 0.0 {
        return 0.0;
    }

    // Rest-frame energy from the breakup, not the lab energy under the mass hypothesis
    let e_star = (p_star.powi(2) + masses[i_prong].powi(2)).sqrt();
    let p_long = dot(&prongs[i_prong], &p_tot) / p_mag;
    (p_long / gamma - beta * e_star) / p_star
}

/// Invariant mass with prong 0 as π and prong 1 as K
pub fn inv_mass_d0(prongs: &[[f64; 3]; 2]) -> f64 {
    invariant_mass(prongs, [MASS_PION, MASS_KAON])
}

/// Invariant mass with prong 0 as K and prong 1 as π
pub fn inv_mass_d0bar(prongs: &[[f64; 3]; 2]) -> f64 {
    invariant_mass(prongs, [MASS_KAON, MASS_PION])
}

/// cos θ* of the kaon under the D0 assignment
pub fn cos_theta_star_d0(prongs: &[[f64; 3]; 2]) -> f64 {
    cos_theta_star(prongs, [MASS_PION, MASS_KAON], MASS_D0, 1)
}

/// cos θ* of the kaon under the D0bar assignment
pub fn cos_theta_star_d0bar(prongs: &[[f64; 3]; 2]) -> f64 {
    cos_theta_star(prongs, [MASS_KAON, MASS_PION], MASS_D0, 0)
}
