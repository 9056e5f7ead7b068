//! # Structural Analysis
//!
//! Two engines share the load model and the single-member statics:
//!
//! - [`continuous_beam`] - three-moment theorem for continuous beams
//! - [`moment_distribution`] - Hardy Cross iteration for beams and frames
//! - [`segment`] - shear / moment / deflection of one member with known end
//!   moments
//! - [`diagrams`] - sampled diagrams and their extrema
//!
//! Each analysis follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - a solver that validates on construction and returns a `*Result`
//! - [`SolverWarning`]s attached to the result for recoverable numerical
//!   conditions
//!
//! [`AnalysisItem`] wraps the inputs so a project can store both kinds side
//! by side; [`run_item`] solves one into an [`AnalysisReport`].

pub mod continuous_beam;
pub mod diagrams;
pub mod moment_distribution;
pub mod segment;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::design::{design_section, DesignEnvelope, SectionDesignResult};
use crate::errors::CalcResult;
use crate::settings::AnalysisSettings;

// Re-export commonly used types
pub use continuous_beam::{
    AnalysisResult, ContinuousBeam, ContinuousBeamInput, Span, Support, SupportType,
};
pub use diagrams::{Diagram, DiagramExtrema, Extremum};
pub use moment_distribution::{
    analyze_moment_distribution, DistributionResult, Frame, FrameAnalysis, FrameInput,
    MemberDiagram,
};

/// A recoverable numerical condition. The solve still produced a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SolverWarning {
    /// The three-moment system was ill-conditioned or singular and was
    /// solved by least squares. Usually an unstable support layout.
    LeastSquaresFallback {
        /// Estimated 2-norm condition number; `None` when singular
        condition_number: Option<f64>,
        reason: String,
    },

    /// Hardy Cross stopped at the iteration cap
    NonConvergence {
        iterations: usize,
        max_unbalance: f64,
        tolerance: f64,
    },

    /// Σ reactions and Σ loads disagree beyond the equilibrium tolerance
    EquilibriumResidual {
        applied: f64,
        reactions: f64,
        residual: f64,
    },

    /// Unsupported frame joints are out of balance once member shears
    /// and axial forces are resolved: the frame would sway, and the
    /// results hold only with an external restraint supplying this net
    /// force (global axes, kN)
    SwayRestraint { horizontal: f64, vertical: f64 },
}

impl SolverWarning {
    /// Stable code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            SolverWarning::LeastSquaresFallback { .. } => "LEAST_SQUARES_FALLBACK",
            SolverWarning::NonConvergence { .. } => "NON_CONVERGENCE",
            SolverWarning::EquilibriumResidual { .. } => "EQUILIBRIUM_RESIDUAL",
            SolverWarning::SwayRestraint { .. } => "SWAY_RESTRAINT",
        }
    }
}

impl fmt::Display for SolverWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverWarning::LeastSquaresFallback {
                condition_number: Some(c),
                reason,
            } => write!(f, "least-squares fallback (condition number {:.3e}): {}", c, reason),
            SolverWarning::LeastSquaresFallback {
                condition_number: None,
                reason,
            } => write!(f, "least-squares fallback (singular system): {}", reason),
            SolverWarning::NonConvergence {
                iterations,
                max_unbalance,
                tolerance,
            } => write!(
                f,
                "moment distribution did not converge after {} iterations (max unbalance {:.3e} > {:.1e})",
                iterations, max_unbalance, tolerance
            ),
            SolverWarning::EquilibriumResidual {
                applied,
                reactions,
                residual,
            } => write!(
                f,
                "equilibrium residual {:.3e} (applied {:.4}, reactions {:.4})",
                residual, applied, reactions
            ),
            SolverWarning::SwayRestraint { horizontal, vertical } => write!(
                f,
                "frame needs a sway restraint of ({:.4}, {:.4}) kN to stay braced",
                horizontal, vertical
            ),
        }
    }
}

/// Enum wrapper for all analysis types.
///
/// This allows storing heterogeneous analyses in a single collection
/// while maintaining type safety and clean serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisItem {
    /// Continuous beam solved by the three-moment theorem
    ContinuousBeam(ContinuousBeamInput),
    /// Beam or frame solved by moment distribution
    Frame(FrameInput),
}

impl AnalysisItem {
    /// Get the user-provided label for this analysis
    pub fn label(&self) -> &str {
        match self {
            AnalysisItem::ContinuousBeam(b) => &b.label,
            AnalysisItem::Frame(f) => &f.label,
        }
    }

    /// Get the analysis type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            AnalysisItem::ContinuousBeam(_) => "ContinuousBeam",
            AnalysisItem::Frame(_) => "Frame",
        }
    }
}

/// Everything produced by solving one [`AnalysisItem`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisReport {
    ContinuousBeam {
        label: String,
        result: AnalysisResult,
        diagram: Diagram,
        extrema: DiagramExtrema,
        /// Present when the input carries a section
        design: Option<SectionDesignResult>,
    },
    Frame {
        label: String,
        result: DistributionResult,
        diagrams: Vec<MemberDiagram>,
    },
}

impl AnalysisReport {
    pub fn label(&self) -> &str {
        match self {
            AnalysisReport::ContinuousBeam { label, .. } | AnalysisReport::Frame { label, .. } => {
                label
            }
        }
    }

    pub fn warnings(&self) -> &[SolverWarning] {
        match self {
            AnalysisReport::ContinuousBeam { result, .. } => &result.warnings,
            AnalysisReport::Frame { result, .. } => &result.warnings,
        }
    }
}

/// Solve one item with the given settings
pub fn run_item(item: &AnalysisItem, settings: &AnalysisSettings) -> CalcResult<AnalysisReport> {
    debug!(item = item.label(), kind = item.calc_type(), "running analysis item");
    match item {
        AnalysisItem::ContinuousBeam(input) => {
            let mut beam = ContinuousBeam::new(input.clone(), settings.clone())?;
            let result = beam.solve()?.clone();
            let diagram = beam.diagram(settings.diagram_points_per_span)?;
            let extrema = diagram.extrema();
            let design = input
                .section
                .as_ref()
                .map(|section| design_section(section, &DesignEnvelope::from(&diagram), &settings.design))
                .transpose()?;
            Ok(AnalysisReport::ContinuousBeam {
                label: input.label.clone(),
                result,
                diagram,
                extrema,
                design,
            })
        }
        AnalysisItem::Frame(input) => {
            let analysis = analyze_moment_distribution(Frame::new(input)?, settings)?;
            let diagrams = analysis.diagrams(settings.diagram_points_per_span);
            Ok(AnalysisReport::Frame {
                label: input.label.clone(),
                result: analysis.into_result(),
                diagrams,
            })
        }
    }
}
