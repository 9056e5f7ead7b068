//! # Beam Formulas
//!
//! Closed-form results used by both analysis engines: fixed-end moments,
//! moment-area end terms, simple-beam reactions and the approximate
//! deflection formulas.
//!
//! ## Notation
//!
//! - `L` = Span length
//! - `x` = Position along beam from left end
//! - `a` = Load position from left end, `b = L - a`
//! - `P` = Point load magnitude
//! - `w` = Uniform load intensity (force per unit length)
//! - `EI` = Flexural rigidity
//!
//! ## Sign Conventions
//!
//! - Loads: Positive downward
//! - Fixed-end moments: clockwise-positive member-end moments, so a
//!   downward load gives a negative left FEM and a positive right FEM
//! - Bending moment: Positive causes tension on bottom (sagging)
//! - Deflection: Positive downward
//! - Reactions: Positive upward
//!
//! ## References
//!
//! - Roark's Formulas for Stress and Strain, 8th Edition, Table 8.1
//! - Structural Analysis by R.C. Hibbeler, Chapters 10-12

// =============================================================================
// FIXED-END MOMENTS
// =============================================================================

/// Fixed-end moments for a point load P at position a on span L
///
/// ```text
///        P
///        ↓
///   ▣────┬────────────▣
///        a      b
/// ```
///
/// # Formulas
/// - FEM_left  = -P·a·b²/L²
/// - FEM_right = +P·a²·b/L²
#[inline]
pub fn fem_point_load(p: f64, a: f64, l: f64) -> (f64, f64) {
    let b = l - a;
    let left = -p * a * b * b / (l * l);
    let right = p * a * a * b / (l * l);
    (left, right)
}

/// Fixed-end moments for a uniform load w over the full span
///
/// # Formulas
/// - FEM_left  = -wL²/12
/// - FEM_right = +wL²/12
#[inline]
pub fn fem_uniform_full(w: f64, l: f64) -> (f64, f64) {
    let m = w * l * l / 12.0;
    (-m, m)
}

/// Fixed-end moment kernels for a unit load at `s`, used to integrate
/// distributed loads exactly.
#[inline]
pub fn fem_kernel(s: f64, l: f64) -> (f64, f64) {
    fem_point_load(1.0, s, l)
}

// =============================================================================
// MOMENT-AREA END TERMS (THREE-MOMENT EQUATION)
// =============================================================================

/// Moment-area end terms for a point load P at position a on span L
///
/// With `A` the area of the simple-beam moment diagram and `ā`, `b̄` the
/// distances of its centroid from the left and right ends:
///
/// - left  = 6·A·b̄/L = P·a·b·(L + b)/L
/// - right = 6·A·ā/L = P·a·b·(L + a)/L
///
/// Divided by EI these equal six times the simple-beam end rotations.
#[inline]
pub fn area_terms_point_load(p: f64, a: f64, l: f64) -> (f64, f64) {
    let b = l - a;
    let left = p * a * b * (l + b) / l;
    let right = p * a * b * (l + a) / l;
    (left, right)
}

/// Moment-area end terms for a uniform load w over the full span
///
/// # Formula
/// left = right = wL³/4
#[inline]
pub fn area_terms_uniform_full(w: f64, l: f64) -> (f64, f64) {
    let t = w * l.powi(3) / 4.0;
    (t, t)
}

/// Moment-area kernels for a unit load at `s`
#[inline]
pub fn area_kernel(s: f64, l: f64) -> (f64, f64) {
    area_terms_point_load(1.0, s, l)
}

// =============================================================================
// SIMPLE-BEAM REACTIONS
// =============================================================================

/// Simple-beam reactions from the resultant `w` and its first moment
/// `m0 = ∫ q(s)·s ds` about the left support
///
/// # Formulas
/// - R2 = m0/L
/// - R1 = W - R2
///
/// A point load P at a has m0 = Pa (Roark's Table 8.1, Case 1a). A
/// self-equilibrating load (W = 0) still yields the balancing couple.
#[inline]
pub fn simple_reactions(w: f64, m0: f64, l: f64) -> (f64, f64) {
    let r2 = m0 / l;
    (w - r2, r2)
}

// =============================================================================
// DEFLECTION (APPROXIMATE SUPERPOSITION)
// =============================================================================

/// Simple-beam deflection at x for a point load P at a
///
/// For x ≤ a:
/// ```text
/// δ(x) = Pbx(L² - b² - x²) / (6EIL)
/// ```
///
/// For x > a:
/// ```text
/// δ(x) = Pa(L-x)(2Lx - x² - a²) / (6EIL)
/// ```
#[inline]
pub fn point_load_deflection(p: f64, a: f64, l: f64, x: f64, ei: f64) -> f64 {
    let b = l - a;
    if x <= a {
        p * b * x * (l * l - b * b - x * x) / (6.0 * ei * l)
    } else {
        p * a * (l - x) * (2.0 * l * x - x * x - a * a) / (6.0 * ei * l)
    }
}

/// Simple-beam deflection at x for a uniform load w over the full span
///
/// # Formula (Roark's Table 8.1, Case 2a)
/// δ(x) = wx(L³ - 2Lx² + x³) / (24EI)
#[inline]
pub fn uniform_load_deflection(w: f64, l: f64, x: f64, ei: f64) -> f64 {
    w * x * (l.powi(3) - 2.0 * l * x * x + x.powi(3)) / (24.0 * ei)
}

/// Deflection at x caused by end bending moments on a simply supported span
///
/// ```text
/// δ(x) = x(L-x)[M_a(2L-x) + M_b(L+x)] / (6EIL)
/// ```
///
/// Sagging end moments deflect the span downward (positive).
#[inline]
pub fn end_moment_deflection(m_a: f64, m_b: f64, l: f64, x: f64, ei: f64) -> f64 {
    x * (l - x) * (m_a * (2.0 * l - x) + m_b * (l + x)) / (6.0 * ei * l)
}

/// Cantilever deflection at distance u from the root for a point load P
/// at distance d from the root
///
/// - u ≤ d: δ = Pu²(3d - u) / (6EI)
/// - u > d: δ = Pd²(3u - d) / (6EI)
#[inline]
pub fn cantilever_point_deflection(p: f64, d: f64, u: f64, ei: f64) -> f64 {
    if u <= d {
        p * u * u * (3.0 * d - u) / (6.0 * ei)
    } else {
        p * d * d * (3.0 * u - d) / (6.0 * ei)
    }
}

// =============================================================================
// QUADRATURE
// =============================================================================

const GAUSS_NODES: [f64; 3] = [-0.774_596_669_241_483_4, 0.0, 0.774_596_669_241_483_4];
const GAUSS_WEIGHTS: [f64; 3] = [5.0 / 9.0, 8.0 / 9.0, 5.0 / 9.0];

/// Integrate `q(s)·kernel(s)` over `[start, start + length]` for a linearly
/// varying intensity `q` running from `q_start` to `q_end`.
///
/// Three-point Gauss-Legendre is exact for polynomials up to degree 5; the
/// beam kernels are cubic, so the result is exact for linear loads.
pub fn integrate_linear_load<F>(start: f64, length: f64, q_start: f64, q_end: f64, kernel: F) -> (f64, f64)
where
    F: Fn(f64) -> (f64, f64),
{
    let half = length / 2.0;
    let mid = start + half;
    let mut acc = (0.0, 0.0);
    for (xi, w) in GAUSS_NODES.iter().zip(GAUSS_WEIGHTS.iter()) {
        let s = mid + half * xi;
        let q = q_start + (q_end - q_start) * (s - start) / length;
        let (k1, k2) = kernel(s);
        acc.0 += w * q * k1;
        acc.1 += w * q * k2;
    }
    (acc.0 * half, acc.1 * half)
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fem_point_midspan() {
        // PL/8 at each end
        let (l, r) = fem_point_load(80.0, 5.0, 10.0);
        assert_relative_eq!(l, -100.0, epsilon = 1e-9);
        assert_relative_eq!(r, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fem_uniform() {
        let (l, r) = fem_uniform_full(12.0, 6.0);
        assert_relative_eq!(l, -36.0, epsilon = 1e-12);
        assert_relative_eq!(r, 36.0, epsilon = 1e-12);
    }

    #[test]
    fn test_integrated_uniform_matches_closed_form() {
        let l = 7.5;
        let w = 18.0;
        let fem = integrate_linear_load(0.0, l, w, w, |s| fem_kernel(s, l));
        let exact = fem_uniform_full(w, l);
        assert_relative_eq!(fem.0, exact.0, max_relative = 1e-12);
        assert_relative_eq!(fem.1, exact.1, max_relative = 1e-12);

        let area = integrate_linear_load(0.0, l, w, w, |s| area_kernel(s, l));
        let exact = area_terms_uniform_full(w, l);
        assert_relative_eq!(area.0, exact.0, max_relative = 1e-12);
        assert_relative_eq!(area.1, exact.1, max_relative = 1e-12);
    }

    #[test]
    fn test_triangular_fem_textbook() {
        // Triangle rising to w at the right end over the full span:
        // FEM_left = -wL²/30, FEM_right = +wL²/20
        let l = 6.0;
        let w = 10.0;
        let (left, right) = integrate_linear_load(0.0, l, 0.0, w, |s| fem_kernel(s, l));
        assert_relative_eq!(left, -w * l * l / 30.0, max_relative = 1e-12);
        assert_relative_eq!(right, w * l * l / 20.0, max_relative = 1e-12);
    }

    #[test]
    fn test_area_terms_point_relation_to_rotation() {
        // Simple-beam end rotation for a central point load is PL²/(16EI),
        // so the end term (six times EI·θ) is 3PL²/8.
        let (left, right) = area_terms_point_load(10.0, 2.0, 4.0);
        assert_relative_eq!(left, 3.0 * 10.0 * 16.0 / 8.0, epsilon = 1e-9);
        assert_relative_eq!(right, left, epsilon = 1e-9);
    }

    #[test]
    fn test_point_load_deflection_midspan() {
        // PL³/48EI
        let d = point_load_deflection(48.0, 5.0, 10.0, 5.0, 1000.0);
        assert_relative_eq!(d, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_deflection_midspan() {
        let d = uniform_load_deflection(384.0, 1.0, 0.5, 5.0);
        assert_relative_eq!(d, 1.0 * 5.0 / 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_end_moment_deflection_uniform_moment() {
        // Constant sagging moment M gives δ(L/2) = ML²/(8EI)
        let d = end_moment_deflection(8.0, 8.0, 2.0, 1.0, 1.0);
        assert_relative_eq!(d, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cantilever_tip_deflection() {
        // PL³/3EI at the tip for a tip load
        let d = cantilever_point_deflection(3.0, 2.0, 2.0, 1.0);
        assert_relative_eq!(d, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reactions_sum() {
        let (r1, r2) = simple_reactions(1000.0, 1000.0 * 3.0, 10.0);
        assert_relative_eq!(r1, 700.0);
        assert_relative_eq!(r2, 300.0);

        // Pure couple of 30 kN·m over 6 m
        let (r1, r2) = simple_reactions(0.0, 30.0, 6.0);
        assert_relative_eq!(r1, -5.0);
        assert_relative_eq!(r2, 5.0);
    }
}
