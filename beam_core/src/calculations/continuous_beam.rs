//! # Continuous Beam Analysis
//!
//! Multi-span beam analysis by the Three-Moment Theorem, with configurable
//! support conditions: fixed, pinned, roller and free (cantilever
//! overhang) ends, and fixed or continuous interior supports.
//!
//! ## Analysis Methods
//!
//! - **Single span**: closed-form fixed-end moments (fixed-fixed,
//!   propped cantilever, cantilever, simply supported)
//! - **Multi-span**: one compatibility equation per unknown support moment,
//!   assembled into a dense system and solved by LU, falling back to a
//!   least-squares solve when the system is ill-conditioned
//!
//! ## Notation
//!
//! - N spans creates N+1 supports
//! - Supports are numbered 0 to N (left to right)
//! - Spans are numbered 0 to N-1 (left to right)
//! - Positions inside a span are measured from its left support
//! - Bending moments are sagging-positive, so support moments over
//!   continuous supports come out negative (hogging)
//!
//! ## Example
//!
//! ```rust
//! use beam_core::calculations::continuous_beam::{ContinuousBeam, Span, SupportType};
//! use beam_core::loads::Load;
//! use beam_core::settings::AnalysisSettings;
//!
//! // Two-span continuous beam: 6 m + 8 m, pinned at all supports
//! let spans = vec![
//!     Span::new(6.0, 200e6, 1e-4).with_load(Load::point(50.0, 3.0)),
//!     Span::new(8.0, 200e6, 1e-4).with_load(Load::point(30.0, 4.0)),
//! ];
//! let kinds = [SupportType::Pinned; 3];
//! let mut beam = ContinuousBeam::from_spans("CB-1", spans, &kinds, AnalysisSettings::default())?;
//!
//! let result = beam.solve()?;
//! assert!(result.support_moments[1] < 0.0);
//! assert!((result.reactions.iter().sum::<f64>() - 80.0).abs() < 1e-9);
//!
//! let m = beam.moment(0, 3.0)?;
//! assert!(m > 0.0);
//! # Ok::<(), beam_core::errors::CalcError>(())
//! ```

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::diagrams::{Diagram, DiagramExtrema};
use super::segment::{cantilever_root_moment, Restraint, Segment};
use super::SolverWarning;
use crate::design::SectionInput;
use crate::errors::{CalcError, CalcResult};
use crate::loads::Load;
use crate::settings::{AnalysisSettings, DistributedLoadModel};

/// Relative tolerance on support positions against cumulative span lengths
const POSITION_TOLERANCE: f64 = 1e-6;

// =============================================================================
// SUPPORT TYPE
// =============================================================================

/// Support condition at a node (support location)
///
/// Each node in a continuous beam can have one of these support types,
/// which determines its boundary conditions for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SupportType {
    /// Free end - no restraint (cantilever end)
    ///
    /// - Vertical displacement: free
    /// - Rotation: free
    /// - Only allowed at the ends of a beam
    Free,

    /// Pinned/hinged support - restrains vertical displacement, allows rotation
    #[default]
    Pinned,

    /// Roller support - same as pinned for vertical beam analysis
    Roller,

    /// Fixed support - restrains both displacement and rotation
    ///
    /// Contributes an unknown moment on each adjoining span.
    Fixed,
}

impl SupportType {
    /// Returns true if this support restrains vertical displacement
    pub fn restrains_vertical(&self) -> bool {
        matches!(
            self,
            SupportType::Pinned | SupportType::Roller | SupportType::Fixed
        )
    }

    /// Returns true if this support restrains horizontal displacement.
    /// Rollers move freely along the beam axis.
    pub fn restrains_horizontal(&self) -> bool {
        matches!(self, SupportType::Pinned | SupportType::Fixed)
    }

    /// Returns true if this support restrains rotation
    pub fn restrains_rotation(&self) -> bool {
        matches!(self, SupportType::Fixed)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SupportType::Free => "Free",
            SupportType::Pinned => "Pinned",
            SupportType::Roller => "Roller",
            SupportType::Fixed => "Fixed",
        }
    }
}

impl std::fmt::Display for SupportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A support: its restraint and its position along the beam (m)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub kind: SupportType,
    pub position: f64,
}

impl Support {
    pub fn new(kind: SupportType, position: f64) -> Self {
        Self { kind, position }
    }
}

// =============================================================================
// SPAN
// =============================================================================

/// Moment-area end terms of a span, already divided by EI:
/// `left = 6·A·b̄/(L·EI)`, `right = 6·A·ā/(L·EI)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaTerms {
    pub left: f64,
    pub right: f64,
}

/// A single span between two supports
///
/// Units: length in m, E in kN/m², I in m⁴, loads in kN and kN/m.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Optional user label (e.g., "Span 1", "Over kitchen")
    #[serde(default)]
    pub label: String,

    pub length: f64,

    /// Modulus of elasticity
    #[serde(rename = "E")]
    pub e: f64,

    /// Second moment of area
    #[serde(rename = "I")]
    pub i: f64,

    /// Loads, positions measured from the span's left support
    #[serde(default)]
    pub loads: Vec<Load>,
}

impl Span {
    /// Create an unloaded span
    pub fn new(length: f64, e: f64, i: f64) -> Self {
        Self {
            label: String::new(),
            length,
            e,
            i,
            loads: Vec::new(),
        }
    }

    /// Add a load and return self (builder pattern)
    pub fn with_load(mut self, load: Load) -> Self {
        self.loads.push(load);
        self
    }

    /// Create with a label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Flexural rigidity EI
    pub fn ei(&self) -> f64 {
        self.e * self.i
    }

    /// Bending stiffness EI/L
    pub fn stiffness(&self) -> f64 {
        self.ei() / self.length
    }

    /// Sum of all applied load
    pub fn total_load(&self) -> f64 {
        self.loads.iter().map(|l| l.total(self.length)).sum()
    }

    /// Clockwise-positive fixed-end moments summed over all loads
    pub fn fixed_end_moments(&self, model: DistributedLoadModel) -> (f64, f64) {
        self.loads
            .iter()
            .map(|l| l.fixed_end_moments(self.length, model))
            .fold((0.0, 0.0), |acc, m| (acc.0 + m.0, acc.1 + m.1))
    }

    /// Moment-area end terms summed over all loads, divided by EI
    pub fn area_terms(&self, model: DistributedLoadModel) -> AreaTerms {
        let ei = self.ei();
        let (left, right) = self
            .loads
            .iter()
            .map(|l| l.area_terms(self.length, model))
            .fold((0.0, 0.0), |acc, t| (acc.0 + t.0, acc.1 + t.1));
        AreaTerms {
            left: left / ei,
            right: right / ei,
        }
    }

    /// Single reporting figure: mean of the two end terms.
    ///
    /// Carries the three-moment factor of 6. For a full-span UDL it is
    /// `wL³/(4EI)`, i.e. `6/(EI·L)` times the area term `wL⁴/24` of the
    /// textbook form; divide by 6 and multiply by `EI·L` to compare.
    pub fn area_term(&self, model: DistributedLoadModel) -> f64 {
        let t = self.area_terms(model);
        0.5 * (t.left + t.right)
    }

    /// Validate geometry, properties and loads
    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [("length", self.length), ("E", self.e), ("I", self.i)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    format!("Span {} must be positive and finite", field),
                ));
            }
        }
        for (idx, load) in self.loads.iter().enumerate() {
            load.validate(self.length).map_err(|e| {
                CalcError::invalid_input(format!("loads[{}]", idx), load.display_name(), e.to_string())
            })?;
        }
        Ok(())
    }
}

// =============================================================================
// CONTINUOUS BEAM INPUT
// =============================================================================

/// Input for continuous beam analysis
///
/// ## Common Configurations
///
/// **Simple span:** 1 span, supports `[Pinned, Roller]`
///
/// **Two-span continuous:** 2 spans, supports `[Pinned, Pinned, Roller]`
///
/// **Cantilever:** 1 span, supports `[Fixed, Free]`
///
/// **Propped cantilever:** 1 span, supports `[Fixed, Roller]`
///
/// **Overhang:** end support `Free`, e.g. `[Pinned, Pinned, Free]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousBeamInput {
    /// User label for this beam
    #[serde(default)]
    pub label: String,

    /// Spans, ordered left to right
    pub spans: Vec<Span>,

    /// Supports, ordered left to right; `spans.len() + 1` entries
    pub supports: Vec<Support>,

    /// Optional concrete section to design from the envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionInput>,
}

impl ContinuousBeamInput {
    /// Build an input with support positions derived from the span lengths
    pub fn from_spans(label: impl Into<String>, spans: Vec<Span>, kinds: &[SupportType]) -> Self {
        let mut position = 0.0;
        let mut supports = Vec::with_capacity(kinds.len());
        for (k, kind) in kinds.iter().enumerate() {
            supports.push(Support::new(*kind, position));
            if let Some(span) = spans.get(k) {
                position += span.length;
            }
        }
        Self {
            label: label.into(),
            spans,
            supports,
            section: None,
        }
    }

    /// Check if beam has any fixed supports
    pub fn has_fixed_support(&self) -> bool {
        self.supports.iter().any(|s| s.kind == SupportType::Fixed)
    }

    /// Validate input parameters
    pub fn validate(&self) -> CalcResult<()> {
        if self.spans.is_empty() {
            return Err(CalcError::invalid_input(
                "spans",
                "empty",
                "At least one span is required",
            ));
        }

        let expected_supports = self.spans.len() + 1;
        if self.supports.len() != expected_supports {
            return Err(CalcError::invalid_input(
                "supports",
                self.supports.len().to_string(),
                format!(
                    "Expected {} supports for {} spans",
                    expected_supports,
                    self.spans.len()
                ),
            ));
        }

        for (i, span) in self.spans.iter().enumerate() {
            span.validate().map_err(|e| {
                CalcError::invalid_input(format!("spans[{}]", i), "invalid", e.to_string())
            })?;
        }

        let first = self.supports[0].position;
        if !first.is_finite() || first < 0.0 {
            return Err(CalcError::invalid_input(
                "supports[0].position",
                first.to_string(),
                "Support position must be non-negative",
            ));
        }
        for (i, span) in self.spans.iter().enumerate() {
            let gap = self.supports[i + 1].position - self.supports[i].position;
            if (gap - span.length).abs() > POSITION_TOLERANCE * span.length.max(1.0) {
                return Err(CalcError::invalid_input(
                    format!("supports[{}].position", i + 1),
                    self.supports[i + 1].position.to_string(),
                    format!(
                        "Support spacing {} does not match span length {}",
                        gap, span.length
                    ),
                ));
            }
        }

        let last = self.supports.len() - 1;
        for (k, support) in self.supports.iter().enumerate() {
            if k != 0 && k != last && support.kind == SupportType::Free {
                return Err(CalcError::invalid_input(
                    format!("supports[{}]", k),
                    "Free",
                    "Free supports are only allowed at the beam ends",
                ));
            }
        }

        let vertical_supports = self
            .supports
            .iter()
            .filter(|s| s.kind.restrains_vertical())
            .count();
        if vertical_supports == 0 {
            return Err(CalcError::invalid_input(
                "supports",
                "none restrained",
                "Structure is unstable - at least one vertical support is required",
            ));
        }
        if vertical_supports < 2 && !self.has_fixed_support() {
            return Err(CalcError::invalid_input(
                "supports",
                "unstable",
                "Requires a fixed support or two vertical supports",
            ));
        }

        Ok(())
    }
}

// =============================================================================
// RESULT
// =============================================================================

/// Lifecycle of a [`ContinuousBeam`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverState {
    Unsolved,
    Solving,
    Solved,
    Failed,
}

impl std::fmt::Display for SolverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SolverState::Unsolved => "Unsolved",
            SolverState::Solving => "Solving",
            SolverState::Solved => "Solved",
            SolverState::Failed => "Failed",
        };
        write!(f, "{}", s)
    }
}

/// Output of a three-moment solve.
///
/// Moments are bending moments (sagging positive, kN·m); reactions act
/// upward (kN).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Moment at each support. Where the two sides differ (interior fixed
    /// support) the larger magnitude is reported.
    pub support_moments: Vec<f64>,

    /// `(start, end)` bending moment of each span
    pub span_end_moments: Vec<(f64, f64)>,

    /// Vertical reaction at each support
    pub reactions: Vec<f64>,

    /// Sum of all applied loads
    pub total_applied_load: f64,

    /// Size of the solved compatibility system
    pub unknown_count: usize,

    pub warnings: Vec<SolverWarning>,

    pub state: SolverState,
}

impl AnalysisResult {
    /// Check if any warning was attached
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// =============================================================================
// SOLVER
// =============================================================================

/// End-moment slot of a span: fixed by a boundary condition or an index
/// into the unknown vector.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Known(f64),
    Unknown(usize),
}

/// A span-end rotation entering a compatibility equation
#[derive(Debug, Clone, Copy)]
enum Rotation {
    Start(usize),
    End(usize),
}

/// A continuous beam and its solver state.
///
/// Construction validates the input; [`solve`](Self::solve) moves the beam
/// through `Unsolved → Solving → Solved | Failed`. Queries are only valid
/// once solved. Re-solving discards the previous result.
#[derive(Debug, Clone)]
pub struct ContinuousBeam {
    input: ContinuousBeamInput,
    settings: AnalysisSettings,
    state: SolverState,
    result: Option<AnalysisResult>,
}

impl ContinuousBeam {
    /// Validate and wrap an input
    pub fn new(input: ContinuousBeamInput, settings: AnalysisSettings) -> CalcResult<Self> {
        settings.validate()?;
        input.validate()?;
        Ok(Self {
            input,
            settings,
            state: SolverState::Unsolved,
            result: None,
        })
    }

    /// Build from spans and support kinds, deriving support positions
    pub fn from_spans(
        label: impl Into<String>,
        spans: Vec<Span>,
        kinds: &[SupportType],
        settings: AnalysisSettings,
    ) -> CalcResult<Self> {
        Self::new(ContinuousBeamInput::from_spans(label, spans, kinds), settings)
    }

    pub fn label(&self) -> &str {
        &self.input.label
    }

    pub fn input(&self) -> &ContinuousBeamInput {
        &self.input
    }

    pub fn spans(&self) -> &[Span] {
        &self.input.spans
    }

    pub fn supports(&self) -> &[Support] {
        &self.input.supports
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    /// Solve for support moments and reactions
    pub fn solve(&mut self) -> CalcResult<&AnalysisResult> {
        self.state = SolverState::Solving;
        self.result = None;
        debug!(
            beam = %self.input.label,
            spans = self.input.spans.len(),
            "three-moment solve started"
        );

        match self.compute() {
            Ok(result) => {
                info!(
                    beam = %self.input.label,
                    unknowns = result.unknown_count,
                    warnings = result.warnings.len(),
                    "three-moment solve complete"
                );
                self.state = SolverState::Solved;
                let stored: &AnalysisResult = self.result.insert(result);
                Ok(stored)
            }
            Err(e) => {
                warn!(beam = %self.input.label, error = %e, "three-moment solve failed");
                self.state = SolverState::Failed;
                Err(e)
            }
        }
    }

    /// Solved result, or `NotSolved` in any other state
    pub fn result(&self) -> CalcResult<&AnalysisResult> {
        match (&self.result, self.state) {
            (Some(result), SolverState::Solved) => Ok(result),
            _ => Err(CalcError::NotSolved {
                state: self.state.to_string(),
            }),
        }
    }

    fn compute(&self) -> CalcResult<AnalysisResult> {
        let model = self.settings.distributed_load_model;
        let spans = &self.input.spans;
        let mut warnings = Vec::new();

        let (span_end_moments, unknown_count) = if spans.len() == 1 {
            (vec![self.single_span_moments(model)], 0)
        } else {
            self.three_moment(model, &mut warnings)?
        };

        let n = spans.len();
        let mut reactions = vec![0.0; n + 1];
        for (i, &(m_start, m_end)) in span_end_moments.iter().enumerate() {
            let segment = self.segment_with(i, m_start, m_end);
            let v_start = segment.shear_at_start();
            reactions[i] += v_start;
            reactions[i + 1] -= segment.shear_at_end();
        }

        let support_moments = (0..=n)
            .map(|k| {
                if k == 0 {
                    span_end_moments[0].0
                } else if k == n {
                    span_end_moments[n - 1].1
                } else {
                    let left = span_end_moments[k - 1].1;
                    let right = span_end_moments[k].0;
                    if left.abs() >= right.abs() {
                        left
                    } else {
                        right
                    }
                }
            })
            .collect::<Vec<_>>();

        let all_finite = support_moments.iter().chain(reactions.iter()).all(|v| v.is_finite());
        if !all_finite {
            return Err(CalcError::calculation_failed(
                "three-moment",
                "Solution contains non-finite values",
            ));
        }

        let total_applied_load: f64 = spans.iter().map(Span::total_load).sum();
        let absolute_load: f64 = spans
            .iter()
            .flat_map(|s| s.loads.iter().map(move |l| l.total(s.length).abs()))
            .sum();
        let reaction_sum: f64 = reactions.iter().sum();
        let residual = (reaction_sum - total_applied_load).abs();
        if residual > self.settings.equilibrium_tolerance * absolute_load.max(1.0) {
            warn!(residual, "reactions do not balance applied load");
            warnings.push(SolverWarning::EquilibriumResidual {
                applied: total_applied_load,
                reactions: reaction_sum,
                residual,
            });
        }

        Ok(AnalysisResult {
            support_moments,
            span_end_moments,
            reactions,
            total_applied_load,
            unknown_count,
            warnings,
            state: SolverState::Solved,
        })
    }

    /// End moments of a lone span from its fixed-end moments
    fn single_span_moments(&self, model: DistributedLoadModel) -> (f64, f64) {
        let span = &self.input.spans[0];
        let (fa, fb) = span.fixed_end_moments(model);
        let (left, right) = (self.input.supports[0].kind, self.input.supports[1].kind);
        match (left, right) {
            (SupportType::Fixed, SupportType::Fixed) => (fa, -fb),
            (SupportType::Fixed, SupportType::Free) => {
                (cantilever_root_moment(&span.loads, span.length, true), 0.0)
            }
            (SupportType::Free, SupportType::Fixed) => {
                (0.0, cantilever_root_moment(&span.loads, span.length, false))
            }
            (SupportType::Fixed, _) => (fa - fb / 2.0, 0.0),
            (_, SupportType::Fixed) => (0.0, -(fb - fa / 2.0)),
            _ => (0.0, 0.0),
        }
    }

    /// Assemble and solve the compatibility system for two or more spans
    fn three_moment(
        &self,
        model: DistributedLoadModel,
        warnings: &mut Vec<SolverWarning>,
    ) -> CalcResult<(Vec<(f64, f64)>, usize)> {
        let spans = &self.input.spans;
        let supports = &self.input.supports;
        let n = spans.len();
        let overhang_left = supports[0].kind == SupportType::Free;
        let overhang_right = supports[n].kind == SupportType::Free;

        let mut start = vec![Slot::Known(0.0); n];
        let mut end = vec![Slot::Known(0.0); n];
        let mut unknowns = 0usize;
        let mut fresh = || {
            unknowns += 1;
            Slot::Unknown(unknowns - 1)
        };

        if overhang_left {
            end[0] = Slot::Known(cantilever_root_moment(&spans[0].loads, spans[0].length, false));
        }
        if overhang_right {
            let last = &spans[n - 1];
            start[n - 1] = Slot::Known(cantilever_root_moment(&last.loads, last.length, true));
        }

        let mut equations: Vec<Vec<Rotation>> = Vec::new();
        if supports[0].kind == SupportType::Fixed {
            start[0] = fresh();
            equations.push(vec![Rotation::Start(0)]);
        }
        for k in 1..n {
            let left_known = overhang_left && k == 1;
            let right_known = overhang_right && k == n - 1;
            if supports[k].kind == SupportType::Fixed {
                if !left_known {
                    end[k - 1] = fresh();
                    equations.push(vec![Rotation::End(k - 1)]);
                }
                if !right_known {
                    start[k] = fresh();
                    equations.push(vec![Rotation::Start(k)]);
                }
                continue;
            }
            match (left_known, right_known) {
                (true, true) => {
                    return Err(CalcError::invalid_input(
                        format!("supports[{}]", k),
                        supports[k].kind.display_name(),
                        "Two overhangs cannot meet at a rotation-free support",
                    ));
                }
                (true, false) => start[k] = end[k - 1],
                (false, true) => end[k - 1] = start[k],
                (false, false) => {
                    let shared = fresh();
                    end[k - 1] = shared;
                    start[k] = shared;
                    equations.push(vec![Rotation::End(k - 1), Rotation::Start(k)]);
                }
            }
        }
        if supports[n].kind == SupportType::Fixed {
            end[n - 1] = fresh();
            equations.push(vec![Rotation::End(n - 1)]);
        }

        let m = unknowns;
        if equations.len() != m {
            return Err(CalcError::calculation_failed(
                "three-moment",
                format!("{} equations for {} unknowns", equations.len(), m),
            ));
        }
        debug!(unknowns = m, "three-moment system assembled");

        let solution = if m == 0 {
            DVector::zeros(0)
        } else {
            let flexibility: Vec<f64> = spans.iter().map(|s| s.length / s.ei()).collect();
            let terms: Vec<AreaTerms> = spans.iter().map(|s| s.area_terms(model)).collect();

            let mut a = DMatrix::<f64>::zeros(m, m);
            let mut b = DVector::<f64>::zeros(m);
            for (row, rotations) in equations.iter().enumerate() {
                let mut apply = |slot: Slot, coefficient: f64| match slot {
                    Slot::Unknown(u) => a[(row, u)] += coefficient,
                    Slot::Known(value) => b[row] -= coefficient * value,
                };
                for rotation in rotations {
                    match *rotation {
                        Rotation::Start(i) => {
                            apply(start[i], 2.0 * flexibility[i]);
                            apply(end[i], flexibility[i]);
                            apply(Slot::Known(1.0), terms[i].left);
                        }
                        Rotation::End(i) => {
                            apply(start[i], flexibility[i]);
                            apply(end[i], 2.0 * flexibility[i]);
                            apply(Slot::Known(1.0), terms[i].right);
                        }
                    }
                }
            }
            solve_system(a, b, self.settings.condition_limit, warnings)?
        };

        let value = |slot: Slot| match slot {
            Slot::Known(v) => v,
            Slot::Unknown(u) => solution[u],
        };
        let moments: Vec<(f64, f64)> = (0..n).map(|i| (value(start[i]), value(end[i]))).collect();
        Ok((moments, m))
    }

    fn restraint(&self, span: usize) -> Restraint {
        let supports = &self.input.supports;
        let last = self.input.spans.len() - 1;
        if span == 0 && supports[0].kind == SupportType::Free {
            Restraint::Cantilever { root_at_start: false }
        } else if span == last && supports[last + 1].kind == SupportType::Free {
            Restraint::Cantilever { root_at_start: true }
        } else {
            Restraint::Spanning
        }
    }

    fn segment_with(&self, span: usize, m_start: f64, m_end: f64) -> Segment<'_> {
        let s = &self.input.spans[span];
        Segment {
            length: s.length,
            ei: s.ei(),
            loads: &s.loads,
            m_start,
            m_end,
            restraint: self.restraint(span),
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Statics evaluator for one solved span
    pub fn segment(&self, span: usize) -> CalcResult<Segment<'_>> {
        let result = self.result()?;
        let count = self.input.spans.len();
        if span >= count {
            return Err(CalcError::index_out_of_range("span", span, count));
        }
        let (m_start, m_end) = result.span_end_moments[span];
        Ok(self.segment_with(span, m_start, m_end))
    }

    fn at(&self, span: usize, x: f64) -> CalcResult<Segment<'_>> {
        let segment = self.segment(span)?;
        segment.check_position(x)?;
        Ok(segment)
    }

    /// Shear at `x` from the left support of `span`
    pub fn shear(&self, span: usize, x: f64) -> CalcResult<f64> {
        Ok(self.at(span, x)?.shear(x))
    }

    /// Total bending moment at `x`
    pub fn moment(&self, span: usize, x: f64) -> CalcResult<f64> {
        Ok(self.at(span, x)?.moment(x))
    }

    /// Simple-beam moment from the span loads alone
    pub fn moment_due_to_loads(&self, span: usize, x: f64) -> CalcResult<f64> {
        Ok(self.at(span, x)?.moment_due_to_loads(x))
    }

    /// Moment from the support moments alone (linear between the ends)
    pub fn moment_due_to_supports(&self, span: usize, x: f64) -> CalcResult<f64> {
        Ok(self.at(span, x)?.moment_due_to_supports(x))
    }

    /// Approximate deflection at `x` (positive downward).
    ///
    /// Superposes simple-beam deflections with the end-moment term;
    /// overhangs are measured from their root chord.
    pub fn deflection(&self, span: usize, x: f64) -> CalcResult<f64> {
        Ok(self.at(span, x)?.deflection(x, self.settings.deflection_segments))
    }

    /// Sample every span, positions in beam coordinates
    pub fn diagram(&self, points_per_span: usize) -> CalcResult<Diagram> {
        let count = self.input.spans.len();
        let mut diagram = Diagram::with_capacity(count * points_per_span.max(2));
        for span in 0..count {
            let segment = self.segment(span)?;
            let offset = self.input.supports[span].position;
            diagram.extend(Diagram::sample(
                &segment,
                offset,
                points_per_span,
                self.settings.deflection_segments,
            ));
        }
        Ok(diagram)
    }

    /// Peak values within one span, positions local to the span
    pub fn span_extrema(&self, span: usize) -> CalcResult<DiagramExtrema> {
        let segment = self.segment(span)?;
        let diagram = Diagram::sample(
            &segment,
            0.0,
            self.settings.diagram_points_per_span,
            self.settings.deflection_segments,
        );
        Ok(diagram.extrema())
    }
}

/// Solve `a·x = b` by LU, or by SVD least squares when `a` is singular or
/// its condition number exceeds `condition_limit`.
fn solve_system(
    a: DMatrix<f64>,
    b: DVector<f64>,
    condition_limit: f64,
    warnings: &mut Vec<SolverWarning>,
) -> CalcResult<DVector<f64>> {
    let m = a.nrows();
    let svd = a.clone().svd(true, true);
    let largest = svd.singular_values.max();
    let smallest = svd.singular_values.min();
    let condition = if smallest > 0.0 {
        largest / smallest
    } else {
        f64::INFINITY
    };
    debug!(condition, "three-moment condition estimate");

    let reason = if condition > condition_limit {
        format!("condition number {:.3e} exceeds limit {:.3e}", condition, condition_limit)
    } else {
        match a.lu().solve(&b) {
            Some(x) if x.iter().all(|v| v.is_finite()) => return Ok(x),
            _ => "LU factorization is singular".to_string(),
        }
    };

    let eps = f64::EPSILON * largest * m as f64;
    let x = svd
        .solve(&b, eps)
        .map_err(|e| CalcError::calculation_failed("three-moment", e))?;
    if !x.iter().all(|v| v.is_finite()) {
        return Err(CalcError::calculation_failed(
            "three-moment",
            "Least-squares fallback produced non-finite moments",
        ));
    }

    warn!(%reason, "three-moment system solved by least squares");
    warnings.push(SolverWarning::LeastSquaresFallback {
        condition_number: condition.is_finite().then_some(condition),
        reason,
    });
    Ok(x)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;
    use approx::assert_relative_eq;

    const E: f64 = 200e6;
    const I: f64 = 1e-4;

    fn span(length: f64) -> Span {
        Span::new(length, E, I)
    }

    fn beam(spans: Vec<Span>, kinds: &[SupportType]) -> ContinuousBeam {
        ContinuousBeam::from_spans("test", spans, kinds, AnalysisSettings::default()).unwrap()
    }

    fn solved(spans: Vec<Span>, kinds: &[SupportType]) -> ContinuousBeam {
        let mut b = beam(spans, kinds);
        b.solve().unwrap();
        b
    }

    use SupportType::{Fixed, Free, Pinned, Roller};

    #[test]
    fn test_support_type_restraints() {
        assert!(Pinned.restrains_vertical());
        assert!(!Pinned.restrains_rotation());
        assert!(Fixed.restrains_vertical());
        assert!(Fixed.restrains_rotation());
        assert!(!Free.restrains_vertical());
        assert!(Pinned.restrains_horizontal());
        assert!(!Roller.restrains_horizontal());
        assert_eq!(Roller.to_string(), "Roller");
    }

    #[test]
    fn test_two_span_point_loads() {
        let b = solved(
            vec![
                span(6.0).with_load(Load::point(50.0, 3.0)),
                span(8.0).with_load(Load::point(30.0, 4.0)),
            ],
            &[Pinned, Pinned, Pinned],
        );
        let r = b.result().unwrap();

        // 2·M1·(6 + 8) = -(675 + 720)
        assert_relative_eq!(r.support_moments[1], -1395.0 / 28.0, max_relative = 1e-10);
        assert_eq!(r.support_moments[0], 0.0);
        assert_eq!(r.support_moments[2], 0.0);
        assert_relative_eq!(r.reactions.iter().sum::<f64>(), 80.0, epsilon = 1e-9);
        assert_relative_eq!(r.reactions[0], 25.0 + r.support_moments[1] / 6.0, epsilon = 1e-9);
        assert!(r.warnings.is_empty());
        println!("Two-span reactions: {:?}", r.reactions);
    }

    #[test]
    fn test_three_span_udl_symmetry() {
        let b = solved(
            vec![
                span(4.0).with_load(Load::udl(20.0)),
                span(6.0).with_load(Load::udl(20.0)),
                span(4.0).with_load(Load::udl(20.0)),
            ],
            &[Pinned, Pinned, Pinned, Pinned],
        );
        let r = b.result().unwrap();
        assert_relative_eq!(r.support_moments[1], -1400.0 / 26.0, max_relative = 1e-10);
        assert_relative_eq!(r.support_moments[1], r.support_moments[2], max_relative = 1e-10);
        assert_relative_eq!(r.reactions[0], r.reactions[3], max_relative = 1e-10);
        assert_relative_eq!(r.reactions[1], r.reactions[2], max_relative = 1e-10);
        assert_relative_eq!(r.reactions.iter().sum::<f64>(), 280.0, epsilon = 1e-9);

        // Mirrored moment diagram in the middle span
        let left = b.moment(1, 1.5).unwrap();
        let right = b.moment(1, 4.5).unwrap();
        assert_relative_eq!(left, right, max_relative = 1e-10);
    }

    #[test]
    fn test_fixed_fixed_udl() {
        let b = solved(vec![span(6.0).with_load(Load::udl(10.0))], &[Fixed, Fixed]);
        let r = b.result().unwrap();
        assert_eq!(r.support_moments[0], -30.0);
        assert_eq!(r.support_moments[1], -30.0);
        assert_relative_eq!(r.reactions[0], 30.0, epsilon = 1e-12);
        assert_relative_eq!(b.moment(0, 3.0).unwrap(), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_propped_cantilever() {
        // R_prop = 3wL/8, M_fixed = -wL²/8
        let b = solved(vec![span(8.0).with_load(Load::udl(10.0))], &[Fixed, Roller]);
        let r = b.result().unwrap();
        assert_relative_eq!(r.support_moments[0], -80.0, epsilon = 1e-9);
        assert_eq!(r.support_moments[1], 0.0);
        assert_relative_eq!(r.reactions[1], 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_multi_span_fixed_ends_match_single_span() {
        // Two equal fixed-ended spans under UDL behave as fixed-fixed spans
        let b = solved(
            vec![
                span(5.0).with_load(Load::udl(12.0)),
                span(5.0).with_load(Load::udl(12.0)),
            ],
            &[Fixed, Pinned, Fixed],
        );
        let r = b.result().unwrap();
        for m in &r.support_moments {
            assert_relative_eq!(*m, -25.0, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_interior_fixed_support() {
        // A fixed interior support decouples the spans
        let b = solved(
            vec![
                span(4.0).with_load(Load::udl(10.0)),
                span(6.0),
            ],
            &[Pinned, Fixed, Pinned],
        );
        let r = b.result().unwrap();
        assert_relative_eq!(r.span_end_moments[0].1, -20.0, max_relative = 1e-10);
        assert_relative_eq!(r.span_end_moments[1].0, 0.0, epsilon = 1e-9);
        assert_relative_eq!(r.support_moments[1], -20.0, max_relative = 1e-10);
        assert_relative_eq!(r.reactions.iter().sum::<f64>(), 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_right_overhang() {
        // 6 m back span, 2 m overhang with 10 kN at the tip
        let b = solved(
            vec![span(6.0), span(2.0).with_load(Load::point(10.0, 2.0))],
            &[Pinned, Pinned, Free],
        );
        let r = b.result().unwrap();
        assert_relative_eq!(r.support_moments[1], -20.0, epsilon = 1e-12);
        assert_eq!(r.support_moments[2], 0.0);
        assert_relative_eq!(r.reactions[0], -20.0 / 6.0, epsilon = 1e-9);
        assert_relative_eq!(r.reactions[1], 10.0 + 20.0 / 6.0, epsilon = 1e-9);
        assert_relative_eq!(r.reactions[2], 0.0, epsilon = 1e-12);
        assert!(b.deflection(1, 2.0).unwrap() > 0.0);
    }

    #[test]
    fn test_cantilever_single_span() {
        let b = solved(vec![span(3.0).with_load(Load::udl(4.0))], &[Fixed, Free]);
        let r = b.result().unwrap();
        assert_relative_eq!(r.support_moments[0], -18.0, epsilon = 1e-12);
        assert_relative_eq!(r.reactions[0], 12.0, epsilon = 1e-12);
        assert_relative_eq!(b.shear(0, 3.0).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_decomposition_identity() {
        let b = solved(
            vec![
                span(5.0).with_load(Load::trapezoidal(4.0, 9.0, 1.0, 3.0)),
                span(7.0).with_load(Load::triangular(6.0, 0.0, 7.0)),
            ],
            &[Fixed, Pinned, Roller],
        );
        for span_idx in 0..2 {
            let length = b.spans()[span_idx].length;
            for j in 0..=10 {
                let x = length * j as f64 / 10.0;
                let total = b.moment(span_idx, x).unwrap();
                let loads = b.moment_due_to_loads(span_idx, x).unwrap();
                let supports = b.moment_due_to_supports(span_idx, x).unwrap();
                assert_relative_eq!(total, loads + supports, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_query_before_solve() {
        let b = beam(vec![span(4.0)], &[Pinned, Roller]);
        assert_eq!(b.state(), SolverState::Unsolved);
        let err = b.moment(0, 1.0).unwrap_err();
        assert_eq!(err.error_code(), "NOT_SOLVED");
        assert_eq!(err.category(), ErrorCategory::QueryMisuse);
    }

    #[test]
    fn test_query_out_of_range() {
        let b = solved(vec![span(4.0).with_load(Load::udl(1.0))], &[Pinned, Roller]);
        assert_eq!(b.state(), SolverState::Solved);
        assert!(matches!(
            b.shear(0, 4.5),
            Err(CalcError::PositionOutOfRange { .. })
        ));
        assert!(matches!(b.shear(0, -0.1), Err(CalcError::PositionOutOfRange { .. })));
        assert!(matches!(b.moment(3, 1.0), Err(CalcError::IndexOutOfRange { .. })));
        assert!(b.moment(0, 4.0).is_ok());
    }

    #[test]
    fn test_least_squares_fallback_warning() {
        let settings = AnalysisSettings {
            condition_limit: 1.0,
            ..Default::default()
        };
        let spans = vec![
            span(4.0).with_load(Load::udl(20.0)),
            span(6.0).with_load(Load::udl(20.0)),
            span(4.0).with_load(Load::udl(20.0)),
        ];
        let mut b = ContinuousBeam::from_spans("ls", spans, &[Pinned; 4], settings).unwrap();
        let r = b.solve().unwrap();
        assert!(matches!(
            r.warnings.as_slice(),
            [SolverWarning::LeastSquaresFallback { .. }]
        ));
        // Well-posed system: least squares reproduces the direct solution
        assert_relative_eq!(r.support_moments[1], -1400.0 / 26.0, max_relative = 1e-9);
        assert_relative_eq!(r.support_moments[2], -1400.0 / 26.0, max_relative = 1e-9);
    }

    #[test]
    fn test_ill_conditioned_stiffness_falls_back() {
        let spans = vec![
            Span::new(4.0, 1e20, 1.0).with_load(Load::udl(5.0)),
            Span::new(6.0, 1e20, 1.0).with_load(Load::udl(5.0)),
            Span::new(4.0, 1.0, 1.0).with_load(Load::udl(5.0)),
        ];
        let mut b =
            ContinuousBeam::from_spans("ill", spans, &[Pinned; 4], AnalysisSettings::default())
                .unwrap();
        let r = b.solve().unwrap();
        assert!(r
            .warnings
            .iter()
            .any(|w| matches!(w, SolverWarning::LeastSquaresFallback { .. })));
        assert_relative_eq!(r.reactions.iter().sum::<f64>(), 70.0, epsilon = 1e-6);
        assert_eq!(b.state(), SolverState::Solved);
    }

    #[test]
    fn test_validation() {
        let settings = AnalysisSettings::default;

        // Wrong support count
        let input = ContinuousBeamInput::from_spans("x", vec![span(4.0)], &[Pinned]);
        assert!(ContinuousBeam::new(input, settings()).is_err());

        // Interior free support
        let input =
            ContinuousBeamInput::from_spans("x", vec![span(4.0), span(4.0)], &[Pinned, Free, Pinned]);
        assert!(ContinuousBeam::new(input, settings()).is_err());

        // Load beyond span
        let input = ContinuousBeamInput::from_spans(
            "x",
            vec![span(4.0).with_load(Load::partial_udl(5.0, 3.0, 2.0))],
            &[Pinned, Pinned],
        );
        let err = ContinuousBeam::new(input, settings()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);

        // Non-positive stiffness
        let input = ContinuousBeamInput::from_spans("x", vec![Span::new(4.0, 0.0, I)], &[Pinned, Pinned]);
        assert!(ContinuousBeam::new(input, settings()).is_err());

        // Unstable
        let input = ContinuousBeamInput::from_spans("x", vec![span(4.0)], &[Pinned, Free]);
        assert!(ContinuousBeam::new(input, settings()).is_err());

        // Support positions out of step with span lengths
        let mut input = ContinuousBeamInput::from_spans("x", vec![span(4.0)], &[Pinned, Pinned]);
        input.supports[1].position = 5.0;
        assert!(ContinuousBeam::new(input, settings()).is_err());
    }

    #[test]
    fn test_resolve_discards_previous_result() {
        let mut b = beam(vec![span(4.0).with_load(Load::udl(2.0))], &[Pinned, Pinned]);
        let first = b.solve().unwrap().clone();
        let second = b.solve().unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(b.state(), SolverState::Solved);
    }

    #[test]
    fn test_area_terms_and_fem() {
        let s = span(6.0).with_load(Load::udl(10.0));
        let (fa, fb) = s.fixed_end_moments(DistributedLoadModel::Exact);
        assert_relative_eq!(fa, -30.0);
        assert_relative_eq!(fb, 30.0);
        let t = s.area_terms(DistributedLoadModel::Exact);
        assert_relative_eq!(t.left, 10.0 * 216.0 / 4.0 / (E * I), max_relative = 1e-12);
        assert_relative_eq!(s.area_term(DistributedLoadModel::Exact), t.left, max_relative = 1e-12);
    }

    #[test]
    fn test_area_term_scaling() {
        // 6/(EI·L) · wL⁴/24 = wL³/(4EI)
        let (w, l) = (10.0, 6.0);
        let s = span(l).with_load(Load::udl(w));
        let textbook = w * l.powi(4) / 24.0;
        assert_relative_eq!(
            s.area_term(DistributedLoadModel::EquivalentPoint),
            6.0 * textbook / (E * I * l),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_default_model_lumps_partial_load() {
        // 40 kN resultant at 2 m on an 8 m span: -Pab²/L², +Pa²b/L²
        let s = span(8.0).with_load(Load::partial_udl(10.0, 0.0, 4.0));
        let (fa, fb) = s.fixed_end_moments(AnalysisSettings::default().distributed_load_model);
        assert_relative_eq!(fa, -45.0, epsilon = 1e-12);
        assert_relative_eq!(fb, 15.0, epsilon = 1e-12);

        let (ea, eb) = s.fixed_end_moments(DistributedLoadModel::Exact);
        assert_relative_eq!(ea, -110.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(eb, 50.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_self_equilibrating_load_on_simple_span() {
        let mut b = beam(
            vec![span(6.0).with_load(Load::trapezoidal(-5.0, 5.0, 0.0, 6.0))],
            &[Pinned, Roller],
        );
        let r = b.solve().unwrap().clone();
        assert_relative_eq!(r.reactions[0], -5.0, epsilon = 1e-12);
        assert_relative_eq!(r.reactions[1], 5.0, epsilon = 1e-12);
        assert_relative_eq!(b.moment(0, 0.0).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(b.moment(0, 6.0).unwrap(), 0.0, epsilon = 1e-12);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_diagram_and_extrema() {
        let b = solved(
            vec![
                span(6.0).with_load(Load::udl(10.0)),
                span(6.0).with_load(Load::udl(10.0)),
            ],
            &[Pinned, Pinned, Pinned],
        );
        let d = b.diagram(11).unwrap();
        assert_eq!(d.len(), 22);
        assert_eq!(d.positions[11], 6.0);
        assert_eq!(*d.positions.last().unwrap(), 12.0);

        let ext = b.span_extrema(0).unwrap();
        // Max sagging 9wL²/128 at 3L/8
        assert_relative_eq!(ext.max_sagging.value, 9.0 * 360.0 / 128.0, max_relative = 1e-3);
        assert_relative_eq!(ext.max_hogging.value, -45.0, max_relative = 1e-10);
    }

    #[test]
    fn test_serialization() {
        let input = ContinuousBeamInput::from_spans(
            "Test Beam",
            vec![span(6.0).with_load(Load::udl(10.0))],
            &[Pinned, Roller],
        );
        let json = serde_json::to_string_pretty(&input).unwrap();
        assert!(json.contains("\"E\""));
        let parsed: ContinuousBeamInput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, input);
    }
}
