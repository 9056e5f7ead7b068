//! # Section Design
//!
//! Downstream consumer of the analysis: takes a moment/shear envelope and
//! sizes the reinforcement of a rectangular reinforced-concrete section.
//!
//! - [`bs8110`] - flexure and shear to BS 8110-1:1997
//! - [`rebar`] - bar table and bar selection
//!
//! Units: section dimensions in mm, strengths in N/mm², envelope moments
//! in kN·m and shears in kN.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::design::{design_section, DesignEnvelope, SectionInput};
//! use beam_core::settings::DesignDefaults;
//!
//! let section = SectionInput::new(300.0, 540.0, 600.0);
//! let envelope = DesignEnvelope {
//!     positions: vec![0.0, 3.0, 6.0],
//!     moment: vec![0.0, 150.0, 0.0],
//!     shear: vec![100.0, 0.0, -100.0],
//! };
//! let result = design_section(&section, &envelope, &DesignDefaults::default())?;
//! assert!(result.passes);
//! assert!(result.hogging.is_none());
//! # Ok::<(), beam_core::errors::CalcError>(())
//! ```

pub mod bs8110;
pub mod rebar;

use serde::{Deserialize, Serialize};

use crate::calculations::diagrams::{Diagram, Extremum};
use crate::errors::{CalcError, CalcResult};
use crate::settings::DesignDefaults;

pub use bs8110::{design_section, FlexureDesign, LinkRegime, SectionDesignResult, ShearDesign};
pub use rebar::{select_bars, BarArrangement, BarSize};

fn default_compression_depth() -> f64 {
    50.0
}

/// Rectangular section geometry with optional material overrides.
///
/// ## JSON Example
///
/// ```json
/// {
///   "width": 300.0,
///   "effective_depth": 540.0,
///   "overall_depth": 600.0,
///   "fcu": 35.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionInput {
    /// b (mm)
    pub width: f64,
    /// d (mm)
    pub effective_depth: f64,
    /// h (mm)
    pub overall_depth: f64,
    /// d', depth to the compression steel centroid (mm)
    #[serde(default = "default_compression_depth")]
    pub compression_depth: f64,
    /// Overrides the project default when set (N/mm²)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fyv: Option<f64>,
}

/// Material strengths resolved against the defaults (N/mm²)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Materials {
    pub fcu: f64,
    pub fy: f64,
    pub fyv: f64,
}

impl SectionInput {
    pub fn new(width: f64, effective_depth: f64, overall_depth: f64) -> Self {
        Self {
            width,
            effective_depth,
            overall_depth,
            compression_depth: default_compression_depth(),
            fcu: None,
            fy: None,
            fyv: None,
        }
    }

    /// Override all material strengths
    pub fn with_materials(mut self, fcu: f64, fy: f64, fyv: f64) -> Self {
        self.fcu = Some(fcu);
        self.fy = Some(fy);
        self.fyv = Some(fyv);
        self
    }

    pub fn materials(&self, defaults: &DesignDefaults) -> Materials {
        Materials {
            fcu: self.fcu.unwrap_or(defaults.fcu),
            fy: self.fy.unwrap_or(defaults.fy),
            fyv: self.fyv.unwrap_or(defaults.fyv),
        }
    }

    /// Gross area b·h (mm²)
    pub fn gross_area(&self) -> f64 {
        self.width * self.overall_depth
    }

    pub fn validate(&self) -> CalcResult<()> {
        let dims = [
            ("section.width", self.width),
            ("section.effective_depth", self.effective_depth),
            ("section.overall_depth", self.overall_depth),
            ("section.compression_depth", self.compression_depth),
        ];
        for (field, value) in dims {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Section dimensions must be positive",
                ));
            }
        }
        if self.effective_depth >= self.overall_depth {
            return Err(CalcError::invalid_input(
                "section.effective_depth",
                self.effective_depth.to_string(),
                "Effective depth must be less than the overall depth",
            ));
        }
        if self.compression_depth >= self.effective_depth / 2.0 {
            return Err(CalcError::invalid_input(
                "section.compression_depth",
                self.compression_depth.to_string(),
                "Compression steel must sit within the top half of the effective depth",
            ));
        }
        let overrides = [("section.fcu", self.fcu), ("section.fy", self.fy), ("section.fyv", self.fyv)];
        for (field, value) in overrides {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(CalcError::invalid_input(
                        field,
                        v.to_string(),
                        "Material strength must be positive",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Design actions along a member: sagging-positive moments (kN·m) and
/// shears (kN) at each position (m).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignEnvelope {
    pub positions: Vec<f64>,
    pub moment: Vec<f64>,
    pub shear: Vec<f64>,
}

impl From<&Diagram> for DesignEnvelope {
    fn from(diagram: &Diagram) -> Self {
        Self {
            positions: diagram.positions.clone(),
            moment: diagram.moment.clone(),
            shear: diagram.shear.clone(),
        }
    }
}

impl DesignEnvelope {
    pub fn validate(&self) -> CalcResult<()> {
        if self.positions.is_empty() {
            return Err(CalcError::invalid_input("envelope", "empty", "Envelope has no stations"));
        }
        if self.moment.len() != self.positions.len() || self.shear.len() != self.positions.len() {
            return Err(CalcError::invalid_input(
                "envelope",
                format!(
                    "{}/{}/{}",
                    self.positions.len(),
                    self.moment.len(),
                    self.shear.len()
                ),
                "positions, moment and shear must have the same length",
            ));
        }
        if self
            .moment
            .iter()
            .chain(&self.shear)
            .chain(&self.positions)
            .any(|v| !v.is_finite())
        {
            return Err(CalcError::invalid_input(
                "envelope",
                "non-finite",
                "Envelope values must be finite",
            ));
        }
        Ok(())
    }

    fn peak(&self, values: &[f64], better: impl Fn(f64, f64) -> bool) -> Extremum {
        let mut out = Extremum::default();
        for (&x, &v) in self.positions.iter().zip(values) {
            if better(v, out.value) {
                out = Extremum { position: x, value: v };
            }
        }
        out
    }

    /// Largest positive moment, `value` 0 when there is none
    pub fn max_sagging(&self) -> Extremum {
        self.peak(&self.moment, |v, best| v > best)
    }

    /// Most negative moment, `value` 0 when there is none
    pub fn max_hogging(&self) -> Extremum {
        self.peak(&self.moment, |v, best| v < best)
    }

    /// Largest shear magnitude, sign kept
    pub fn max_shear(&self) -> Extremum {
        self.peak(&self.shear, |v, best| v.abs() > best.abs())
    }

    /// Moment at the station nearest `position`
    pub fn moment_near(&self, position: f64) -> f64 {
        self.positions
            .iter()
            .zip(&self.moment)
            .min_by(|a, b| (a.0 - position).abs().total_cmp(&(b.0 - position).abs()))
            .map(|(_, m)| *m)
            .unwrap_or(0.0)
    }
}
