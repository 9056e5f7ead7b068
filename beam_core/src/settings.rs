//! # Analysis Settings
//!
//! Tunables shared by both analysis engines and the section designer.
//! Every field has a serde default, so a settings file only needs to list
//! the values it overrides:
//!
//! ```rust
//! use beam_core::settings::AnalysisSettings;
//!
//! let settings: AnalysisSettings =
//!     serde_json::from_str(r#"{ "max_iterations": 500 }"#).unwrap();
//! assert_eq!(settings.max_iterations, 500);
//! assert_eq!(settings.diagram_points_per_span, 101);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// How distributed load components enter the fixed-end moment and
/// moment-area formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistributedLoadModel {
    /// Replace each component by its resultant at its centroid and use
    /// the point-load formulas
    #[default]
    EquivalentPoint,
    /// Integrate each linearly varying component exactly
    Exact,
}

/// Global analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Sample points per span/member for diagrams (ends included)
    pub diagram_points_per_span: usize,

    /// Hardy Cross stops once the largest unbalanced joint moment is below this
    pub convergence_tolerance: f64,

    /// Hard cap on Hardy Cross balancing rounds
    pub max_iterations: usize,

    /// Condition number above which the three-moment system is solved by
    /// least squares (with a warning) instead of LU
    pub condition_limit: f64,

    /// Relative tolerance for the Σ reactions = Σ loads self-check
    pub equilibrium_tolerance: f64,

    /// Treatment of distributed loads in FEM / area terms
    pub distributed_load_model: DistributedLoadModel,

    /// Number of point loads a distributed component is lumped into for
    /// the approximate deflection
    pub deflection_segments: usize,

    /// Material defaults for section design
    pub design: DesignDefaults,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            diagram_points_per_span: 101,
            convergence_tolerance: 1e-6,
            max_iterations: 200,
            condition_limit: 1e12,
            equilibrium_tolerance: 1e-6,
            distributed_load_model: DistributedLoadModel::EquivalentPoint,
            deflection_segments: 20,
            design: DesignDefaults::default(),
        }
    }
}

impl AnalysisSettings {
    /// Reject settings the solvers cannot work with
    pub fn validate(&self) -> CalcResult<()> {
        if self.diagram_points_per_span < 2 {
            return Err(CalcError::invalid_input(
                "diagram_points_per_span",
                self.diagram_points_per_span.to_string(),
                "At least 2 points per span are required",
            ));
        }
        if !(self.convergence_tolerance > 0.0) {
            return Err(CalcError::invalid_input(
                "convergence_tolerance",
                self.convergence_tolerance.to_string(),
                "Tolerance must be positive",
            ));
        }
        if self.max_iterations == 0 {
            return Err(CalcError::invalid_input(
                "max_iterations",
                "0",
                "At least one iteration is required",
            ));
        }
        if !(self.condition_limit >= 1.0) {
            return Err(CalcError::invalid_input(
                "condition_limit",
                self.condition_limit.to_string(),
                "Condition limit must be at least 1",
            ));
        }
        if !(self.equilibrium_tolerance > 0.0) {
            return Err(CalcError::invalid_input(
                "equilibrium_tolerance",
                self.equilibrium_tolerance.to_string(),
                "Tolerance must be positive",
            ));
        }
        if self.deflection_segments == 0 {
            return Err(CalcError::invalid_input(
                "deflection_segments",
                "0",
                "At least one segment is required",
            ));
        }
        self.design.validate()
    }
}

/// Default material strengths for section design (N/mm²).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignDefaults {
    /// Design code label printed in reports
    pub code: String,

    /// Concrete characteristic cube strength
    pub fcu: f64,

    /// Main reinforcement characteristic strength
    pub fy: f64,

    /// Link reinforcement characteristic strength
    pub fyv: f64,
}

impl Default for DesignDefaults {
    fn default() -> Self {
        DesignDefaults {
            code: "BS 8110-1:1997".to_string(),
            fcu: 30.0,
            fy: 460.0,
            fyv: 250.0,
        }
    }
}

impl DesignDefaults {
    fn validate(&self) -> CalcResult<()> {
        for (field, value) in [("design.fcu", self.fcu), ("design.fy", self.fy), ("design.fyv", self.fyv)] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Material strength must be positive",
                ));
            }
        }
        Ok(())
    }
}
