//! Applied loads
//!
//! [`Load`] is the user-facing sum type. Each variant decomposes into
//! [`LoadComponent`]s; fixed-end moments, moment-area terms and statics
//! are sums over those components, except the full-span UDL which always
//! uses its closed forms.

use serde::{Deserialize, Serialize};

use super::component::LoadComponent;
use crate::equations::beam;
use crate::errors::{CalcError, CalcResult};
use crate::settings::DistributedLoadModel;

/// Relative slack when checking a load's extent against its span
const EXTENT_TOLERANCE: f64 = 1e-9;

/// A single load applied to one span.
///
/// Positions are measured from the span start. Magnitudes are signed,
/// positive acting downward. Point loads are forces (kN), distributed
/// loads intensities (kN/m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Load {
    /// Concentrated force at `position`
    Point { magnitude: f64, position: f64 },

    /// Uniform load over the full span
    #[serde(rename = "UDL")]
    Udl { magnitude: f64 },

    /// Uniform load over `[position, position + length]`
    #[serde(rename = "PartialUDL")]
    PartialUdl {
        magnitude: f64,
        position: f64,
        length: f64,
    },

    /// Zero at `position`, rising linearly to `magnitude` at `position + length`
    Triangular {
        magnitude: f64,
        position: f64,
        length: f64,
    },

    /// `magnitude` at `position`, varying linearly to `magnitude2` at
    /// `position + length`
    Trapezoidal {
        magnitude: f64,
        magnitude2: f64,
        position: f64,
        length: f64,
    },
}

impl Load {
    /// Create a point load
    pub fn point(magnitude: f64, position: f64) -> Self {
        Load::Point { magnitude, position }
    }

    /// Create a full-span uniform load
    pub fn udl(magnitude: f64) -> Self {
        Load::Udl { magnitude }
    }

    /// Create a partial uniform load
    pub fn partial_udl(magnitude: f64, position: f64, length: f64) -> Self {
        Load::PartialUdl {
            magnitude,
            position,
            length,
        }
    }

    /// Create a triangular load peaking at its far end
    pub fn triangular(magnitude: f64, position: f64, length: f64) -> Self {
        Load::Triangular {
            magnitude,
            position,
            length,
        }
    }

    /// Create a trapezoidal load
    pub fn trapezoidal(magnitude: f64, magnitude2: f64, position: f64, length: f64) -> Self {
        Load::Trapezoidal {
            magnitude,
            magnitude2,
            position,
            length,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Load::Point { .. } => "Point",
            Load::Udl { .. } => "UDL",
            Load::PartialUdl { .. } => "Partial UDL",
            Load::Triangular { .. } => "Triangular",
            Load::Trapezoidal { .. } => "Trapezoidal",
        }
    }

    /// Check the load against the span it sits on
    pub fn validate(&self, span_length: f64) -> CalcResult<()> {
        let slack = EXTENT_TOLERANCE * span_length;
        let check_magnitude = |field: &str, value: f64| -> CalcResult<()> {
            if !value.is_finite() || value == 0.0 {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Load magnitude must be finite and non-zero",
                ));
            }
            Ok(())
        };
        let check_position = |position: f64| -> CalcResult<()> {
            if !position.is_finite() || position < 0.0 {
                return Err(CalcError::invalid_input(
                    "position",
                    position.to_string(),
                    "Load position must be non-negative",
                ));
            }
            Ok(())
        };
        let check_extent = |position: f64, length: f64| -> CalcResult<()> {
            check_position(position)?;
            if !length.is_finite() || length <= 0.0 {
                return Err(CalcError::invalid_input(
                    "length",
                    length.to_string(),
                    "Distributed load length must be positive",
                ));
            }
            if position + length > span_length + slack {
                return Err(CalcError::invalid_input(
                    "length",
                    format!("{} + {}", position, length),
                    format!("Load extends past the end of the {} m span", span_length),
                ));
            }
            Ok(())
        };

        match *self {
            Load::Point { magnitude, position } => {
                check_magnitude("magnitude", magnitude)?;
                check_position(position)?;
                if position > span_length + slack {
                    return Err(CalcError::invalid_input(
                        "position",
                        position.to_string(),
                        format!("Point load lies beyond the {} m span", span_length),
                    ));
                }
                Ok(())
            }
            Load::Udl { magnitude } => check_magnitude("magnitude", magnitude),
            Load::PartialUdl {
                magnitude,
                position,
                length,
            }
            | Load::Triangular {
                magnitude,
                position,
                length,
            } => {
                check_magnitude("magnitude", magnitude)?;
                check_extent(position, length)
            }
            Load::Trapezoidal {
                magnitude,
                magnitude2,
                position,
                length,
            } => {
                if !magnitude2.is_finite() || (magnitude == 0.0 && magnitude2 == 0.0) {
                    return Err(CalcError::invalid_input(
                        "magnitude2",
                        magnitude2.to_string(),
                        "Trapezoidal load must have a finite, non-zero intensity",
                    ));
                }
                if !magnitude.is_finite() {
                    return Err(CalcError::invalid_input(
                        "magnitude",
                        magnitude.to_string(),
                        "Load magnitude must be finite",
                    ));
                }
                check_extent(position, length)
            }
        }
    }

    /// Decompose into primitive components.
    ///
    /// Trapezoids split into a rectangle of `min(w1, w2)` and a triangle of
    /// `|w2 - w1|` peaking at the larger end. Zero-intensity parts are
    /// dropped.
    pub fn components(&self, span_length: f64) -> Vec<LoadComponent> {
        match *self {
            Load::Point { magnitude, position } => {
                vec![LoadComponent::Concentrated { magnitude, position }]
            }
            Load::Udl { magnitude } => vec![LoadComponent::Linear {
                start: 0.0,
                length: span_length,
                q_start: magnitude,
                q_end: magnitude,
            }],
            Load::PartialUdl {
                magnitude,
                position,
                length,
            } => vec![LoadComponent::Linear {
                start: position,
                length,
                q_start: magnitude,
                q_end: magnitude,
            }],
            Load::Triangular {
                magnitude,
                position,
                length,
            } => vec![LoadComponent::Linear {
                start: position,
                length,
                q_start: 0.0,
                q_end: magnitude,
            }],
            Load::Trapezoidal {
                magnitude,
                magnitude2,
                position,
                length,
            } => {
                let rect = magnitude.min(magnitude2);
                let tri = (magnitude2 - magnitude).abs();
                let mut parts = Vec::with_capacity(2);
                if rect != 0.0 {
                    parts.push(LoadComponent::Linear {
                        start: position,
                        length,
                        q_start: rect,
                        q_end: rect,
                    });
                }
                if tri != 0.0 {
                    let (q_start, q_end) = if magnitude2 > magnitude {
                        (0.0, tri)
                    } else {
                        (tri, 0.0)
                    };
                    parts.push(LoadComponent::Linear {
                        start: position,
                        length,
                        q_start,
                        q_end,
                    });
                }
                parts
            }
        }
    }

    /// Total force
    pub fn total(&self, span_length: f64) -> f64 {
        self.components(span_length)
            .iter()
            .map(LoadComponent::resultant)
            .sum()
    }

    /// First moment about the span start. Statics use this rather than
    /// `total · centroid`, which loses a self-equilibrating load.
    pub fn first_moment(&self, span_length: f64) -> f64 {
        self.components(span_length)
            .iter()
            .map(LoadComponent::first_moment)
            .sum()
    }

    /// Position of the resultant from the span start, `None` when the
    /// resultant vanishes
    pub fn centroid(&self, span_length: f64) -> Option<f64> {
        let total = self.total(span_length);
        if total.abs() < f64::EPSILON {
            return None;
        }
        Some(self.first_moment(span_length) / total)
    }

    /// Force applied left of `x`
    pub fn force_up_to(&self, x: f64, span_length: f64) -> f64 {
        self.components(span_length)
            .iter()
            .map(|c| c.force_up_to(x))
            .sum()
    }

    /// Moment about `x` of the load lying left of `x`
    pub fn moment_up_to(&self, x: f64, span_length: f64) -> f64 {
        self.components(span_length)
            .iter()
            .map(|c| c.moment_up_to(x))
            .sum()
    }

    /// Clockwise-positive fixed-end moments `(left, right)`
    pub fn fixed_end_moments(&self, span_length: f64, model: DistributedLoadModel) -> (f64, f64) {
        if let Load::Udl { magnitude } = *self {
            return beam::fem_uniform_full(magnitude, span_length);
        }
        self.components(span_length)
            .iter()
            .map(|c| c.fixed_end_moments(span_length, model))
            .fold((0.0, 0.0), |acc, m| (acc.0 + m.0, acc.1 + m.1))
    }

    /// Moment-area end terms `(6·A·b̄/L, 6·A·ā/L)`, not yet divided by EI
    pub fn area_terms(&self, span_length: f64, model: DistributedLoadModel) -> (f64, f64) {
        if let Load::Udl { magnitude } = *self {
            return beam::area_terms_uniform_full(magnitude, span_length);
        }
        self.components(span_length)
            .iter()
            .map(|c| c.area_terms(span_length, model))
            .fold((0.0, 0.0), |acc, t| (acc.0 + t.0, acc.1 + t.1))
    }

    /// Simple-beam deflection at `x` (positive downward).
    ///
    /// Full-span UDLs use the closed form; everything else superposes
    /// lumped point loads.
    pub fn simple_deflection(&self, span_length: f64, x: f64, ei: f64, segments: usize) -> f64 {
        if let Load::Udl { magnitude } = *self {
            return beam::uniform_load_deflection(magnitude, span_length, x, ei);
        }
        self.components(span_length)
            .iter()
            .flat_map(|c| c.lumped(segments))
            .map(|(p, a)| beam::point_load_deflection(p, a, span_length, x, ei))
            .sum()
    }

    /// Deflection at `u` from the root of a cantilever of length
    /// `span_length`. `root_at_start` selects which span end is built in.
    pub fn cantilever_deflection(
        &self,
        span_length: f64,
        u: f64,
        ei: f64,
        segments: usize,
        root_at_start: bool,
    ) -> f64 {
        self.components(span_length)
            .iter()
            .flat_map(|c| c.lumped(segments))
            .map(|(p, a)| {
                let d = if root_at_start { a } else { span_length - a };
                beam::cantilever_point_deflection(p, d, u, ei)
            })
            .sum()
    }
}
