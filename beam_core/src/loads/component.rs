//! Load components
//!
//! Every [`Load`](super::Load) reduces to one or two primitive components:
//! a concentrated force or a linearly varying line load. All statics and
//! formula work happens on components, so the per-kind code in `load.rs`
//! only has to describe the decomposition.

use serde::{Deserialize, Serialize};

use crate::equations::beam;
use crate::settings::DistributedLoadModel;

/// A primitive load on a span, positions measured from the span start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoadComponent {
    /// Force `magnitude` at `position`
    Concentrated { magnitude: f64, position: f64 },

    /// Line load varying linearly from `q_start` at `start` to `q_end` at
    /// `start + length`
    Linear {
        start: f64,
        length: f64,
        q_start: f64,
        q_end: f64,
    },
}

impl LoadComponent {
    /// Total force
    pub fn resultant(&self) -> f64 {
        match *self {
            LoadComponent::Concentrated { magnitude, .. } => magnitude,
            LoadComponent::Linear {
                length,
                q_start,
                q_end,
                ..
            } => 0.5 * (q_start + q_end) * length,
        }
    }

    /// Position of the resultant from the span start
    pub fn centroid(&self) -> f64 {
        match *self {
            LoadComponent::Concentrated { position, .. } => position,
            LoadComponent::Linear {
                start,
                length,
                q_start,
                q_end,
            } => {
                let sum = q_start + q_end;
                if sum.abs() < f64::EPSILON {
                    start + length / 2.0
                } else {
                    start + length * (q_start + 2.0 * q_end) / (3.0 * sum)
                }
            }
        }
    }

    /// First moment of the load about the span start, `∫ q(s)·s ds`.
    ///
    /// Defined even when the resultant is zero, so a load that is only a
    /// couple still contributes.
    pub fn first_moment(&self) -> f64 {
        match *self {
            LoadComponent::Concentrated { magnitude, position } => magnitude * position,
            LoadComponent::Linear {
                start,
                length,
                q_start,
                q_end,
            } => {
                let k = (q_end - q_start) / length;
                start * self.resultant() + q_start * length * length / 2.0 + k * length.powi(3) / 3.0
            }
        }
    }

    /// Force applied strictly left of `x`.
    ///
    /// A concentrated load counts only once `x` has passed it, so the
    /// shear just right of a point load includes its step.
    pub fn force_up_to(&self, x: f64) -> f64 {
        match *self {
            LoadComponent::Concentrated { magnitude, position } => {
                if x > position {
                    magnitude
                } else {
                    0.0
                }
            }
            LoadComponent::Linear {
                start,
                length,
                q_start,
                q_end,
            } => {
                let t = (x - start).clamp(0.0, length);
                let k = (q_end - q_start) / length;
                q_start * t + k * t * t / 2.0
            }
        }
    }

    /// Moment about `x` of the load lying left of `x` (clockwise positive
    /// for downward loads).
    pub fn moment_up_to(&self, x: f64) -> f64 {
        match *self {
            LoadComponent::Concentrated { magnitude, position } => {
                if x > position {
                    magnitude * (x - position)
                } else {
                    0.0
                }
            }
            LoadComponent::Linear {
                start,
                length,
                q_start,
                q_end,
            } => {
                if x <= start {
                    return 0.0;
                }
                let t = (x - start).min(length);
                let k = (q_end - q_start) / length;
                let force = q_start * t + k * t * t / 2.0;
                let first_moment = q_start * t * t / 2.0 + k * t.powi(3) / 3.0;
                (x - start) * force - first_moment
            }
        }
    }

    /// Clockwise-positive fixed-end moments on a span of length `l`
    pub fn fixed_end_moments(&self, l: f64, model: DistributedLoadModel) -> (f64, f64) {
        match (*self, model) {
            (LoadComponent::Concentrated { magnitude, position }, _) => {
                beam::fem_point_load(magnitude, position, l)
            }
            (
                LoadComponent::Linear {
                    start,
                    length,
                    q_start,
                    q_end,
                },
                DistributedLoadModel::Exact,
            ) => beam::integrate_linear_load(start, length, q_start, q_end, |s| {
                beam::fem_kernel(s, l)
            }),
            (linear, DistributedLoadModel::EquivalentPoint) => {
                sum_pairs(linear.equivalent_points().into_iter().map(|(p, a)| beam::fem_point_load(p, a, l)))
            }
        }
    }

    /// Moment-area end terms `(6·A·b̄/L, 6·A·ā/L)`, not yet divided by EI
    pub fn area_terms(&self, l: f64, model: DistributedLoadModel) -> (f64, f64) {
        match (*self, model) {
            (LoadComponent::Concentrated { magnitude, position }, _) => {
                beam::area_terms_point_load(magnitude, position, l)
            }
            (
                LoadComponent::Linear {
                    start,
                    length,
                    q_start,
                    q_end,
                },
                DistributedLoadModel::Exact,
            ) => beam::integrate_linear_load(start, length, q_start, q_end, |s| {
                beam::area_kernel(s, l)
            }),
            (linear, DistributedLoadModel::EquivalentPoint) => sum_pairs(
                linear
                    .equivalent_points()
                    .into_iter()
                    .map(|(p, a)| beam::area_terms_point_load(p, a, l)),
            ),
        }
    }

    /// Split into `(force, position)` point loads for deflection
    /// superposition. Concentrated loads pass through unchanged; linear
    /// loads are cut into `segments` strips, each lumped at its centroid.
    pub fn lumped(&self, segments: usize) -> Vec<(f64, f64)> {
        match *self {
            LoadComponent::Concentrated { magnitude, position } => vec![(magnitude, position)],
            LoadComponent::Linear {
                start,
                length,
                q_start,
                q_end,
            } => {
                let n = segments.max(1);
                let dx = length / n as f64;
                let slope = (q_end - q_start) / length;
                (0..n)
                    .flat_map(|i| {
                        let s0 = i as f64 * dx;
                        let strip = LoadComponent::Linear {
                            start: start + s0,
                            length: dx,
                            q_start: q_start + slope * s0,
                            q_end: q_start + slope * (s0 + dx),
                        };
                        strip.equivalent_points()
                    })
                    .collect()
            }
        }
    }

    /// Resultant of each same-sign part as a `(force, position)` pair.
    ///
    /// A line load that changes sign is cut at its zero crossing, so every
    /// part lumps inside its own extent and a load that is only a couple
    /// keeps its lever arm.
    pub fn equivalent_points(&self) -> Vec<(f64, f64)> {
        match *self {
            LoadComponent::Linear {
                start,
                length,
                q_start,
                q_end,
            } if q_start * q_end < 0.0 => {
                let cut = length * q_start / (q_start - q_end);
                let parts = [
                    LoadComponent::Linear {
                        start,
                        length: cut,
                        q_start,
                        q_end: 0.0,
                    },
                    LoadComponent::Linear {
                        start: start + cut,
                        length: length - cut,
                        q_start: 0.0,
                        q_end,
                    },
                ];
                parts.iter().map(|p| (p.resultant(), p.centroid())).collect()
            }
            _ => vec![(self.resultant(), self.centroid())],
        }
    }
}

fn sum_pairs(pairs: impl Iterator<Item = (f64, f64)>) -> (f64, f64) {
    pairs.fold((0.0, 0.0), |(a, b), (x, y)| (a + x, b + y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> LoadComponent {
        LoadComponent::Linear {
            start: 1.0,
            length: 3.0,
            q_start: 0.0,
            q_end: 6.0,
        }
    }

    #[test]
    fn test_linear_resultant_and_centroid() {
        let c = triangle();
        assert_relative_eq!(c.resultant(), 9.0);
        assert_relative_eq!(c.centroid(), 3.0);
    }

    #[test]
    fn test_force_up_to_clips_to_extent() {
        let c = triangle();
        assert_eq!(c.force_up_to(0.5), 0.0);
        // intensity 2 at x = 2, area of the small triangle = 1
        assert_relative_eq!(c.force_up_to(2.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.force_up_to(10.0), 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_moment_up_to_past_extent_uses_resultant() {
        let c = triangle();
        let x = 7.0;
        assert_relative_eq!(c.moment_up_to(x), 9.0 * (x - 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_point_load_step() {
        let c = LoadComponent::Concentrated {
            magnitude: 5.0,
            position: 2.0,
        };
        assert_eq!(c.force_up_to(2.0), 0.0);
        assert_eq!(c.force_up_to(2.0 + 1e-9), 5.0);
        assert_relative_eq!(c.moment_up_to(4.0), 10.0);
    }

    #[test]
    fn test_lumped_preserves_resultant_and_moment() {
        let c = triangle();
        let lumps = c.lumped(7);
        assert_eq!(lumps.len(), 7);
        let total: f64 = lumps.iter().map(|(p, _)| p).sum();
        let moment: f64 = lumps.iter().map(|(p, a)| p * a).sum();
        assert_relative_eq!(total, c.resultant(), epsilon = 1e-12);
        assert_relative_eq!(moment, c.resultant() * c.centroid(), epsilon = 1e-9);
    }

    #[test]
    fn test_equivalent_point_model() {
        let c = LoadComponent::Linear {
            start: 0.0,
            length: 4.0,
            q_start: 5.0,
            q_end: 5.0,
        };
        let (l, r) = c.fixed_end_moments(4.0, DistributedLoadModel::EquivalentPoint);
        // 20 kN at midspan: PL/8
        assert_relative_eq!(l, -10.0, epsilon = 1e-12);
        assert_relative_eq!(r, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sign_change_splits_at_zero_crossing() {
        let c = LoadComponent::Linear {
            start: 0.0,
            length: 6.0,
            q_start: -5.0,
            q_end: 5.0,
        };
        let points = c.equivalent_points();
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].0, -7.5, epsilon = 1e-12);
        assert_relative_eq!(points[0].1, 1.0, epsilon = 1e-12);
        assert_relative_eq!(points[1].0, 7.5, epsilon = 1e-12);
        assert_relative_eq!(points[1].1, 5.0, epsilon = 1e-12);

        // -7.5 kN at 1 m and 7.5 kN at 5 m on a 6 m span
        let (l, r) = c.fixed_end_moments(6.0, DistributedLoadModel::EquivalentPoint);
        let expected_l = -(-7.5 * 1.0 * 25.0 + 7.5 * 5.0 * 1.0) / 36.0;
        let expected_r = (-7.5 * 1.0 * 5.0 + 7.5 * 25.0 * 1.0) / 36.0;
        assert_relative_eq!(l, expected_l, epsilon = 1e-12);
        assert_relative_eq!(r, expected_r, epsilon = 1e-12);
        assert!(l.abs() > 1.0);

        let moment: f64 = c.lumped(5).iter().map(|(p, a)| p * a).sum();
        assert_relative_eq!(moment, c.first_moment(), epsilon = 1e-9);
    }
}
