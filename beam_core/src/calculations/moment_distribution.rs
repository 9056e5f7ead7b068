//! # Moment Distribution Method (Hardy Cross)
//!
//! Iterative analysis of beams and rigid-jointed frames without sway.
//!
//! ## Algorithm Overview
//!
//! 1. Resolve end conditions of every member (continuous, pinned, free tip)
//! 2. Calculate fixed-end moments (FEM), modified for pinned ends and
//!    replaced by statics for cantilever members
//! 3. Calculate stiffness `K = EI/L` (×0.75 for a pinned far end) and
//!    distribution factors at every rotation-free joint
//! 4. Each round, balance every joint simultaneously and carry over 50% of
//!    each distributed moment to the far end (0% to a pinned or free end)
//! 5. Stop once the largest unbalanced moment drops below the tolerance,
//!    or report non-convergence when the iteration cap is reached
//! 6. Resolve member end shears into global axes using the joint
//!    coordinates, find member axial forces from equilibrium of the
//!    unsupported joints, and sum the support reactions
//!
//! ## Sign Convention
//!
//! Member-end moments are clockwise-positive while distributing.
//! [`FrameAnalysis`] converts to sagging-positive bending moments for the
//! shear/moment/deflection queries.
//!
//! Global axes: x to the right, y up. Member loads act across the member,
//! positive towards the right-hand side of the start→end direction, which
//! is downward on a member running left to right.
//!
//! ## Storage
//!
//! Joints and members live in flat arrays addressed by [`JointId`] /
//! [`MemberId`]; names are resolved once when the [`Frame`] is built. Each
//! balancing round stores a snapshot of all end moments.
//!
//! ## References
//!
//! - "Structural Analysis" by R.C. Hibbeler, Chapter 12
//! - "Analysis of Continuous Frames by Distributing Fixed-End Moments" by
//!   Hardy Cross (1930)
//!
//! ## Example
//!
//! ```rust
//! use beam_core::calculations::moment_distribution::{
//!     analyze_moment_distribution, Frame, FrameInput, JointInput, MemberInput,
//! };
//! use beam_core::calculations::continuous_beam::SupportType;
//! use beam_core::loads::Load;
//! use beam_core::settings::AnalysisSettings;
//!
//! let input = FrameInput {
//!     label: "Two-span".into(),
//!     joints: vec![
//!         JointInput::new("A", SupportType::Pinned),
//!         JointInput::new("B", SupportType::Pinned),
//!         JointInput::new("C", SupportType::Pinned),
//!     ],
//!     members: vec![
//!         MemberInput::new("AB", "A", "B", 6.0, 200e6, 1e-4).with_load(Load::udl(10.0)),
//!         MemberInput::new("BC", "B", "C", 6.0, 200e6, 1e-4).with_load(Load::udl(10.0)),
//!     ],
//! };
//! let analysis = analyze_moment_distribution(Frame::new(&input)?, &AnalysisSettings::default())?;
//! let result = analysis.result();
//! assert!(result.convergence_achieved);
//! // wL²/8 hogging over B
//! assert!((result.final_moments["AB"].end - 45.0).abs() < 1e-4);
//! # Ok::<(), beam_core::errors::CalcError>(())
//! ```

use std::collections::{BTreeMap, HashMap};

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::continuous_beam::{ContinuousBeam, SupportType};
use super::diagrams::Diagram;
use super::segment::{cantilever_root_moment, Restraint, Segment};
use super::SolverWarning;
use crate::errors::{CalcError, CalcResult};
use crate::loads::Load;
use crate::settings::AnalysisSettings;

/// Carry-over factor for a prismatic member with a restrained far end
const CARRY_OVER: f64 = 0.5;

/// Stiffness reduction for a member whose far end is pinned
const PINNED_FAR_END_FACTOR: f64 = 0.75;

/// Relative slack between a member length and the chord of its joints
const GEOMETRY_TOLERANCE: f64 = 1e-6;

// =============================================================================
// INPUT
// =============================================================================

/// A joint as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointInput {
    pub name: String,

    /// Restraint at the joint; `Free` for an unsupported joint
    pub support: SupportType,

    /// Plane coordinates (m, y up). They orient the members when resolving
    /// reactions; leave every joint at the origin for a straight
    /// horizontal beam.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl JointInput {
    pub fn new(name: impl Into<String>, support: SupportType) -> Self {
        Self {
            name: name.into(),
            support,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// A member as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberInput {
    pub name: String,
    /// Joint name at the member start
    pub start: String,
    /// Joint name at the member end
    pub end: String,
    pub length: f64,
    #[serde(rename = "E")]
    pub e: f64,
    #[serde(rename = "I")]
    pub i: f64,
    /// Moment release (hinge) at the start
    #[serde(default)]
    pub start_release: bool,
    /// Moment release (hinge) at the end
    #[serde(default)]
    pub end_release: bool,
    /// Transverse loads, positions from the member start
    #[serde(default)]
    pub loads: Vec<Load>,
}

impl MemberInput {
    pub fn new(
        name: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        length: f64,
        e: f64,
        i: f64,
    ) -> Self {
        Self {
            name: name.into(),
            start: start.into(),
            end: end.into(),
            length,
            e,
            i,
            start_release: false,
            end_release: false,
            loads: Vec::new(),
        }
    }

    /// Add a load and return self (builder pattern)
    pub fn with_load(mut self, load: Load) -> Self {
        self.loads.push(load);
        self
    }

    /// Set end releases and return self
    pub fn with_releases(mut self, start: bool, end: bool) -> Self {
        self.start_release = start;
        self.end_release = end;
        self
    }
}

/// Frame description: joints and the members connecting them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    #[serde(default)]
    pub label: String,
    pub joints: Vec<JointInput>,
    pub members: Vec<MemberInput>,
}

// =============================================================================
// FRAME (ARENA)
// =============================================================================

/// Index of a joint in [`Frame::joints`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JointId(pub usize);

/// Index of a member in [`Frame::members`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub usize);

/// One end of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberEnd {
    Start,
    End,
}

impl MemberEnd {
    fn index(self) -> usize {
        match self {
            MemberEnd::Start => 0,
            MemberEnd::End => 1,
        }
    }

    fn far(self) -> MemberEnd {
        match self {
            MemberEnd::Start => MemberEnd::End,
            MemberEnd::End => MemberEnd::Start,
        }
    }
}

/// How a member end is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCondition {
    /// Rigidly connected to a joint that balances or absorbs moment
    Continuous,
    /// Zero moment: explicit release, or the only member at a pin/roller
    Pinned,
    /// Cantilever tip at an unsupported joint
    Free,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub support: SupportType,
    pub x: f64,
    pub y: f64,
    /// Member ends meeting here
    pub members: Vec<(MemberId, MemberEnd)>,
}

impl Joint {
    /// Rotation-free joints are balanced; fixed joints absorb moment
    pub fn rotation_free(&self) -> bool {
        !self.support.restrains_rotation()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub start: JointId,
    pub end: JointId,
    pub length: f64,
    pub e: f64,
    pub i: f64,
    pub loads: Vec<Load>,
    /// `[start, end]`
    pub conditions: [EndCondition; 2],
    /// Unit vector from start to end joint, global axes
    pub direction: [f64; 2],
}

impl Member {
    pub fn ei(&self) -> f64 {
        self.e * self.i
    }

    pub fn condition(&self, end: MemberEnd) -> EndCondition {
        self.conditions[end.index()]
    }

    pub fn joint(&self, end: MemberEnd) -> JointId {
        match end {
            MemberEnd::Start => self.start,
            MemberEnd::End => self.end,
        }
    }

    /// Unit vector across the member, the positive load direction
    pub fn normal(&self) -> [f64; 2] {
        [self.direction[1], -self.direction[0]]
    }

    /// Cantilever members are solved by statics
    pub fn is_cantilever(&self) -> bool {
        self.conditions.contains(&EndCondition::Free)
    }

    fn restraint(&self) -> Restraint {
        match self.conditions {
            [_, EndCondition::Free] => Restraint::Cantilever { root_at_start: true },
            [EndCondition::Free, _] => Restraint::Cantilever { root_at_start: false },
            _ => Restraint::Spanning,
        }
    }
}

/// A validated frame with connectivity resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub label: String,
    pub joints: Vec<Joint>,
    pub members: Vec<Member>,
}

impl Frame {
    /// Validate an input and resolve joint names to indices
    pub fn new(input: &FrameInput) -> CalcResult<Self> {
        if input.joints.is_empty() || input.members.is_empty() {
            return Err(CalcError::invalid_input(
                "frame",
                "empty",
                "A frame needs at least one member and its joints",
            ));
        }

        let mut index: HashMap<&str, JointId> = HashMap::with_capacity(input.joints.len());
        let mut joints = Vec::with_capacity(input.joints.len());
        for (i, j) in input.joints.iter().enumerate() {
            if !j.x.is_finite() || !j.y.is_finite() {
                return Err(CalcError::invalid_input(
                    format!("joints[{}]", j.name),
                    format!("({}, {})", j.x, j.y),
                    "Joint coordinates must be finite",
                ));
            }
            if index.insert(j.name.as_str(), JointId(i)).is_some() {
                return Err(CalcError::invalid_input(
                    "joints",
                    j.name.clone(),
                    "Duplicate joint name",
                ));
            }
            joints.push(Joint {
                name: j.name.clone(),
                support: j.support,
                x: j.x,
                y: j.y,
                members: Vec::new(),
            });
        }

        let mut seen = HashMap::with_capacity(input.members.len());
        let mut members = Vec::with_capacity(input.members.len());
        for (m, mi) in input.members.iter().enumerate() {
            if seen.insert(mi.name.as_str(), m).is_some() {
                return Err(CalcError::invalid_input(
                    "members",
                    mi.name.clone(),
                    "Duplicate member name",
                ));
            }
            let lookup = |name: &str| {
                index
                    .get(name)
                    .copied()
                    .ok_or_else(|| CalcError::unknown_reference("joint", name))
            };
            let start = lookup(&mi.start)?;
            let end = lookup(&mi.end)?;
            if start == end {
                return Err(CalcError::invalid_input(
                    format!("members[{}]", mi.name),
                    mi.start.clone(),
                    "Member must connect two different joints",
                ));
            }
            for (field, value) in [("length", mi.length), ("E", mi.e), ("I", mi.i)] {
                if !value.is_finite() || value <= 0.0 {
                    return Err(CalcError::invalid_input(
                        format!("members[{}].{}", mi.name, field),
                        value.to_string(),
                        "Member properties must be positive and finite",
                    ));
                }
            }
            for (idx, load) in mi.loads.iter().enumerate() {
                load.validate(mi.length).map_err(|e| {
                    CalcError::invalid_input(
                        format!("members[{}].loads[{}]", mi.name, idx),
                        load.display_name(),
                        e.to_string(),
                    )
                })?;
            }

            joints[start.0].members.push((MemberId(m), MemberEnd::Start));
            joints[end.0].members.push((MemberId(m), MemberEnd::End));
            members.push(Member {
                name: mi.name.clone(),
                start,
                end,
                length: mi.length,
                e: mi.e,
                i: mi.i,
                loads: mi.loads.clone(),
                conditions: [EndCondition::Continuous; 2],
                direction: [1.0, 0.0],
            });
        }

        let chords: Vec<(f64, f64)> = members
            .iter()
            .map(|m| {
                let (a, b) = (&joints[m.start.0], &joints[m.end.0]);
                (b.x - a.x, b.y - a.y)
            })
            .collect();
        let located = chords.iter().filter(|(dx, dy)| dx.hypot(*dy) > 0.0).count();
        if located > 0 {
            for (member, &(dx, dy)) in members.iter_mut().zip(&chords) {
                let chord = dx.hypot(dy);
                if located < chords.len() || (chord - member.length).abs() > GEOMETRY_TOLERANCE * member.length {
                    return Err(CalcError::invalid_input(
                        format!("members[{}].length", member.name),
                        member.length.to_string(),
                        format!(
                            "Joint coordinates put the member ends {:.6} m apart; give coordinates for every joint or none",
                            chord
                        ),
                    ));
                }
                member.direction = [dx / chord, dy / chord];
            }
        }

        for joint in &joints {
            if joint.members.is_empty() {
                return Err(CalcError::invalid_input(
                    format!("joints[{}]", joint.name),
                    "unconnected",
                    "Joint is not connected to any member",
                ));
            }
        }

        for (m, mi) in input.members.iter().enumerate() {
            let member = &members[m];
            let resolve = |joint: JointId, released: bool| {
                let j = &joints[joint.0];
                let lone = j.members.len() == 1;
                if lone && j.support == SupportType::Free {
                    EndCondition::Free
                } else if released || (lone && j.rotation_free()) {
                    EndCondition::Pinned
                } else {
                    EndCondition::Continuous
                }
            };
            let conditions = [
                resolve(member.start, mi.start_release),
                resolve(member.end, mi.end_release),
            ];
            match conditions {
                [EndCondition::Free, EndCondition::Continuous]
                | [EndCondition::Continuous, EndCondition::Free] => {}
                [EndCondition::Free, _] | [_, EndCondition::Free] => {
                    return Err(CalcError::invalid_input(
                        format!("members[{}]", mi.name),
                        "cantilever",
                        "A cantilever member needs a rigid connection at its root",
                    ));
                }
                _ => {}
            }
            members[m].conditions = conditions;
        }

        let vertical = joints.iter().filter(|j| j.support.restrains_vertical()).count();
        let fixed = joints.iter().any(|j| j.support.restrains_rotation());
        if vertical < 2 && !fixed {
            return Err(CalcError::invalid_input(
                "joints",
                "unstable",
                "Frame requires a fixed support or two vertical supports",
            ));
        }

        Ok(Self {
            label: input.label.clone(),
            joints,
            members,
        })
    }

    /// Equivalent frame of a continuous beam: joints `S0..SN` at the
    /// supports, members `span1..spanN`.
    pub fn from_beam(beam: &ContinuousBeam) -> CalcResult<Self> {
        let mut x = 0.0;
        let joints = beam
            .supports()
            .iter()
            .enumerate()
            .map(|(k, s)| {
                let joint = JointInput::new(format!("S{}", k), s.kind).at(x, 0.0);
                if let Some(span) = beam.spans().get(k) {
                    x += span.length;
                }
                joint
            })
            .collect();
        let members = beam
            .spans()
            .iter()
            .enumerate()
            .map(|(i, s)| MemberInput {
                loads: s.loads.clone(),
                ..MemberInput::new(
                    format!("span{}", i + 1),
                    format!("S{}", i),
                    format!("S{}", i + 1),
                    s.length,
                    s.e,
                    s.i,
                )
            })
            .collect();
        Self::new(&FrameInput {
            label: beam.label().to_string(),
            joints,
            members,
        })
    }

    pub fn joint_id(&self, name: &str) -> CalcResult<JointId> {
        self.joints
            .iter()
            .position(|j| j.name == name)
            .map(JointId)
            .ok_or_else(|| CalcError::unknown_reference("joint", name))
    }

    pub fn member_id(&self, name: &str) -> CalcResult<MemberId> {
        self.members
            .iter()
            .position(|m| m.name == name)
            .map(MemberId)
            .ok_or_else(|| CalcError::unknown_reference("member", name))
    }

    pub fn member(&self, id: MemberId) -> CalcResult<&Member> {
        self.members
            .get(id.0)
            .ok_or_else(|| CalcError::index_out_of_range("member", id.0, self.members.len()))
    }
}

// =============================================================================
// SOLVER
// =============================================================================

/// Snapshot of one balancing round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based round number
    pub iteration: usize,
    /// Unbalanced moment per joint before this round (0 at unbalanced joints)
    pub unbalanced: Vec<f64>,
    pub max_unbalance: f64,
    /// Distributed plus carried-over moment per member `[start, end]`
    pub changes: Vec<[f64; 2]>,
    /// End moments after this round
    pub moments: Vec<[f64; 2]>,
}

/// Clockwise-positive end moments of one member
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberEndMoments {
    pub start: f64,
    pub end: f64,
}

impl From<[f64; 2]> for MemberEndMoments {
    fn from(m: [f64; 2]) -> Self {
        Self {
            start: m[0],
            end: m[1],
        }
    }
}

/// Reaction a support applies to the frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointReaction {
    /// Global x force (kN, right positive)
    pub horizontal: f64,
    /// Global y force (kN, up positive)
    pub vertical: f64,
    /// Clockwise-positive moment (kN·m); zero unless rotation is restrained
    pub moment: f64,
}

/// Output of a Hardy Cross solve, keyed by joint / member name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionResult {
    /// Final clockwise-positive end moments
    pub final_moments: BTreeMap<String, MemberEndMoments>,

    /// Fixed-end moments after pinned-end and cantilever adjustment
    pub fixed_end_moments: BTreeMap<String, MemberEndMoments>,

    /// Reaction at each supported joint
    pub support_reactions: BTreeMap<String, JointReaction>,

    /// Member axial force (kN, tension positive)
    pub axial_forces: BTreeMap<String, f64>,

    /// Joint → member → distribution factor; empty at joints that are not
    /// balanced (fixed supports, pinned or free tips)
    pub distribution_factors: BTreeMap<String, BTreeMap<String, f64>>,

    pub convergence_achieved: bool,
    pub iterations_performed: usize,
    pub final_max_unbalance: f64,
    pub iterations: Vec<IterationRecord>,
    pub warnings: Vec<SolverWarning>,
}

/// Hardy Cross solver; owns all working arrays for one solve.
#[derive(Debug)]
pub struct MomentDistribution<'a> {
    frame: &'a Frame,
    settings: &'a AnalysisSettings,
    /// Adjusted fixed-end moments `[start, end]`
    fem: Vec<[f64; 2]>,
    /// Near-end stiffness `[start, end]`
    stiffness: Vec<[f64; 2]>,
    /// Carry-over factor from `[start, end]` to the opposite end
    carry_over: Vec<[f64; 2]>,
    /// Per joint, aligned with `Joint::members`; empty when not balanced
    factors: Vec<Vec<f64>>,
}

impl<'a> MomentDistribution<'a> {
    /// Compute FEMs, stiffnesses and distribution factors
    pub fn new(frame: &'a Frame, settings: &'a AnalysisSettings) -> Self {
        let model = settings.distributed_load_model;

        let fem = frame
            .members
            .iter()
            .map(|m| {
                let l = m.length;
                match m.conditions {
                    [_, EndCondition::Free] => [cantilever_root_moment(&m.loads, l, true), 0.0],
                    [EndCondition::Free, _] => [0.0, -cantilever_root_moment(&m.loads, l, false)],
                    [EndCondition::Pinned, EndCondition::Pinned] => [0.0, 0.0],
                    [near, far] => {
                        let (fs, fe) = m
                            .loads
                            .iter()
                            .map(|load| load.fixed_end_moments(l, model))
                            .fold((0.0, 0.0), |acc, f| (acc.0 + f.0, acc.1 + f.1));
                        match (near, far) {
                            (_, EndCondition::Pinned) => [fs - fe / 2.0, 0.0],
                            (EndCondition::Pinned, _) => [0.0, fe - fs / 2.0],
                            _ => [fs, fe],
                        }
                    }
                }
            })
            .collect();

        let (stiffness, carry_over): (Vec<[f64; 2]>, Vec<[f64; 2]>) = frame
            .members
            .iter()
            .map(|m| {
                let k = m.ei() / m.length;
                let mut stiffness = [0.0; 2];
                let mut carry = [0.0; 2];
                if !m.is_cantilever() {
                    for end in [MemberEnd::Start, MemberEnd::End] {
                        let near = m.condition(end);
                        let far = m.condition(end.far());
                        if near == EndCondition::Pinned {
                            continue;
                        }
                        if far == EndCondition::Pinned {
                            stiffness[end.index()] = PINNED_FAR_END_FACTOR * k;
                        } else {
                            stiffness[end.index()] = k;
                            carry[end.index()] = CARRY_OVER;
                        }
                    }
                }
                (stiffness, carry)
            })
            .unzip();

        let factors = frame
            .joints
            .iter()
            .map(|joint| {
                let ks: Vec<f64> = joint
                    .members
                    .iter()
                    .map(|&(m, end)| stiffness[m.0][end.index()])
                    .collect();
                let total: f64 = ks.iter().sum();
                if joint.rotation_free() && total > 0.0 {
                    ks.iter().map(|k| k / total).collect()
                } else {
                    Vec::new()
                }
            })
            .collect();

        Self {
            frame,
            settings,
            fem,
            stiffness,
            carry_over,
            factors,
        }
    }

    /// Whether a joint takes part in balancing
    pub fn is_balanced(&self, joint: JointId) -> bool {
        !self.factors[joint.0].is_empty()
    }

    /// Near-end stiffness of a member end
    pub fn stiffness(&self, member: MemberId, end: MemberEnd) -> f64 {
        self.stiffness[member.0][end.index()]
    }

    fn unbalanced(&self, moments: &[[f64; 2]]) -> (Vec<f64>, f64) {
        let mut max = 0.0f64;
        let values = self
            .frame
            .joints
            .iter()
            .enumerate()
            .map(|(j, joint)| {
                if self.factors[j].is_empty() {
                    return 0.0;
                }
                let sum: f64 = joint
                    .members
                    .iter()
                    .map(|&(m, end)| moments[m.0][end.index()])
                    .sum();
                max = max.max(sum.abs());
                sum
            })
            .collect();
        (values, max)
    }

    /// Run balancing rounds until converged or the iteration cap is hit
    pub fn solve(self) -> DistributionResult {
        let tolerance = self.settings.convergence_tolerance;
        let max_iterations = self.settings.max_iterations;
        let mut moments = self.fem.clone();
        let mut iterations: Vec<IterationRecord> = Vec::new();

        let (converged, final_max) = loop {
            let (unbalanced, max_unbalance) = self.unbalanced(&moments);
            if max_unbalance < tolerance {
                break (true, max_unbalance);
            }
            if iterations.len() >= max_iterations {
                break (false, max_unbalance);
            }

            let mut changes = vec![[0.0; 2]; moments.len()];
            for (j, joint) in self.frame.joints.iter().enumerate() {
                if self.factors[j].is_empty() {
                    continue;
                }
                for (&(m, end), df) in joint.members.iter().zip(&self.factors[j]) {
                    let distributed = -unbalanced[j] * df;
                    changes[m.0][end.index()] += distributed;
                    changes[m.0][end.far().index()] += distributed * self.carry_over[m.0][end.index()];
                }
            }
            for (moment, change) in moments.iter_mut().zip(&changes) {
                moment[0] += change[0];
                moment[1] += change[1];
            }

            debug!(
                iteration = iterations.len() + 1,
                max_unbalance, "moment distribution round"
            );
            iterations.push(IterationRecord {
                iteration: iterations.len() + 1,
                unbalanced,
                max_unbalance,
                changes,
                moments: moments.clone(),
            });
        };

        let mut warnings = Vec::new();
        if !converged {
            warn!(
                iterations = iterations.len(),
                max_unbalance = final_max,
                "moment distribution did not converge"
            );
            warnings.push(SolverWarning::NonConvergence {
                iterations: iterations.len(),
                max_unbalance: final_max,
                tolerance,
            });
        }

        let frame = self.frame;
        let by_member = |values: &[[f64; 2]]| {
            frame
                .members
                .iter()
                .zip(values)
                .map(|(m, v)| (m.name.clone(), MemberEndMoments::from(*v)))
                .collect::<BTreeMap<_, _>>()
        };

        let distribution_factors = frame
            .joints
            .iter()
            .zip(&self.factors)
            .map(|(joint, dfs)| {
                let table: BTreeMap<String, f64> = joint
                    .members
                    .iter()
                    .zip(dfs)
                    .map(|(&(m, _), df)| (frame.members[m.0].name.clone(), *df))
                    .collect();
                (joint.name.clone(), table)
            })
            .collect();

        DistributionResult {
            final_moments: by_member(&moments),
            fixed_end_moments: by_member(&self.fem),
            support_reactions: BTreeMap::new(),
            axial_forces: BTreeMap::new(),
            distribution_factors,
            convergence_achieved: converged,
            iterations_performed: iterations.len(),
            final_max_unbalance: final_max,
            iterations,
            warnings,
        }
    }
}

// =============================================================================
// ANALYSIS
// =============================================================================

/// Per-member diagram, positions local to the member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDiagram {
    pub member: String,
    pub diagram: Diagram,
}

/// A solved frame: the distribution result plus statics queries
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    frame: Frame,
    settings: AnalysisSettings,
    result: DistributionResult,
    /// Clockwise-positive end moments by member index
    end_moments: Vec<[f64; 2]>,
}

/// Joint equilibrium of a solved frame
struct JointForces {
    /// Per member, tension positive
    axial: Vec<f64>,
    reactions: BTreeMap<String, JointReaction>,
    sway: Option<SolverWarning>,
}

/// Analyze a frame by moment distribution
pub fn analyze_moment_distribution(
    frame: Frame,
    settings: &AnalysisSettings,
) -> CalcResult<FrameAnalysis> {
    settings.validate()?;
    debug!(
        frame = %frame.label,
        joints = frame.joints.len(),
        members = frame.members.len(),
        "moment distribution started"
    );
    let result = MomentDistribution::new(&frame, settings).solve();
    let end_moments = frame
        .members
        .iter()
        .map(|m| {
            let v = result.final_moments.get(&m.name).copied().unwrap_or_default();
            [v.start, v.end]
        })
        .collect();

    let mut analysis = FrameAnalysis {
        frame,
        settings: settings.clone(),
        result,
        end_moments,
    };

    let forces = analysis.resolve_joint_forces()?;
    analysis.result.axial_forces = analysis
        .frame
        .members
        .iter()
        .zip(forces.axial)
        .map(|(m, n)| (m.name.clone(), n))
        .collect();
    analysis.result.support_reactions = forces.reactions;
    if let Some(warning) = forces.sway {
        warn!(frame = %analysis.frame.label, %warning, "frame is not braced against sway");
        analysis.result.warnings.push(warning);
    }

    info!(
        frame = %analysis.frame.label,
        converged = analysis.result.convergence_achieved,
        iterations = analysis.result.iterations_performed,
        "moment distribution complete"
    );
    Ok(analysis)
}

impl FrameAnalysis {
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn result(&self) -> &DistributionResult {
        &self.result
    }

    pub fn into_result(self) -> DistributionResult {
        self.result
    }

    fn segment_unchecked(&self, member: MemberId) -> Segment<'_> {
        let m = &self.frame.members[member.0];
        let [cw_start, cw_end] = self.end_moments[member.0];
        Segment {
            length: m.length,
            ei: m.ei(),
            loads: &m.loads,
            m_start: cw_start,
            m_end: -cw_end,
            restraint: m.restraint(),
        }
    }

    /// Force each joint exerts on a member end, global axes, given the
    /// member axial force `n` (tension positive)
    fn end_force(&self, member: MemberId, end: MemberEnd, n: f64) -> [f64; 2] {
        let m = &self.frame.members[member.0];
        let segment = self.segment_unchecked(member);
        let (e, t) = (m.direction, m.normal());
        match end {
            MemberEnd::Start => {
                let v = segment.shear_at_start();
                [-v * t[0] - n * e[0], -v * t[1] - n * e[1]]
            }
            MemberEnd::End => {
                let v = segment.shear_at_end();
                [v * t[0] + n * e[0], v * t[1] + n * e[1]]
            }
        }
    }

    /// Member axial forces, support reactions and, when the unsupported
    /// joints cannot be balanced, the restraint force the no-sway solution
    /// relies on.
    ///
    /// Each free direction of each joint gives one equilibrium equation in
    /// the unknown axial forces. The system is solved by SVD least squares:
    /// minimum norm where axial forces are indeterminate (a beam pinned at
    /// both ends), best fit where the frame would sway.
    fn resolve_joint_forces(&self) -> CalcResult<JointForces> {
        let members = &self.frame.members;

        let mut rows: Vec<(JointId, usize)> = Vec::new();
        for (j, joint) in self.frame.joints.iter().enumerate() {
            if !joint.support.restrains_horizontal() {
                rows.push((JointId(j), 0));
            }
            if !joint.support.restrains_vertical() {
                rows.push((JointId(j), 1));
            }
        }

        let mut a = DMatrix::<f64>::zeros(rows.len(), members.len());
        let mut b = DVector::<f64>::zeros(rows.len());
        for (r, &(joint, axis)) in rows.iter().enumerate() {
            for &(m, end) in &self.frame.joints[joint.0].members {
                let e = members[m.0].direction[axis];
                a[(r, m.0)] += match end {
                    MemberEnd::Start => -e,
                    MemberEnd::End => e,
                };
                b[r] -= self.end_force(m, end, 0.0)[axis];
            }
        }

        let axial = if rows.is_empty() {
            DVector::zeros(members.len())
        } else {
            let svd = a.clone().svd(true, true);
            let eps = f64::EPSILON * svd.singular_values.max() * rows.len().max(members.len()) as f64;
            svd.solve(&b, eps)
                .map_err(|e| CalcError::calculation_failed("frame equilibrium", e))?
        };
        if !axial.iter().all(|v| v.is_finite()) {
            return Err(CalcError::calculation_failed(
                "frame equilibrium",
                "Axial forces are not finite",
            ));
        }

        let residual = &a * &axial - &b;
        let scale = members
            .iter()
            .flat_map(|m| m.loads.iter().map(move |l| l.total(m.length).abs()))
            .sum::<f64>()
            .max(1.0);
        let sway = (residual.norm() > self.settings.equilibrium_tolerance * scale).then(|| {
            let mut net = [0.0; 2];
            for (&(_, axis), value) in rows.iter().zip(residual.iter()) {
                net[axis] += value;
            }
            SolverWarning::SwayRestraint {
                horizontal: net[0],
                vertical: net[1],
            }
        });

        let reactions = self
            .frame
            .joints
            .iter()
            .filter(|joint| joint.support.restrains_vertical() || joint.support.restrains_horizontal())
            .map(|joint| {
                let mut force = [0.0; 2];
                let mut moment = 0.0;
                for &(m, end) in &joint.members {
                    let f = self.end_force(m, end, axial[m.0]);
                    force[0] += f[0];
                    force[1] += f[1];
                    moment += self.end_moments[m.0][end.index()];
                }
                let support = joint.support;
                let reaction = JointReaction {
                    horizontal: if support.restrains_horizontal() { force[0] } else { 0.0 },
                    vertical: if support.restrains_vertical() { force[1] } else { 0.0 },
                    moment: if support.restrains_rotation() { moment } else { 0.0 },
                };
                (joint.name.clone(), reaction)
            })
            .collect();

        Ok(JointForces {
            axial: axial.iter().copied().collect(),
            reactions,
            sway,
        })
    }

    /// Statics evaluator for one member
    pub fn segment(&self, member: MemberId) -> CalcResult<Segment<'_>> {
        self.frame.member(member)?;
        Ok(self.segment_unchecked(member))
    }

    /// Sagging-positive bending moments `(start, end)`
    pub fn bending_end_moments(&self, member: MemberId) -> CalcResult<(f64, f64)> {
        let s = self.segment(member)?;
        Ok((s.m_start, s.m_end))
    }

    fn at(&self, member: MemberId, x: f64) -> CalcResult<Segment<'_>> {
        let segment = self.segment(member)?;
        segment.check_position(x)?;
        Ok(segment)
    }

    /// Shear at `x` from the member start
    pub fn shear(&self, member: MemberId, x: f64) -> CalcResult<f64> {
        Ok(self.at(member, x)?.shear(x))
    }

    /// Bending moment at `x` (sagging positive)
    pub fn moment(&self, member: MemberId, x: f64) -> CalcResult<f64> {
        Ok(self.at(member, x)?.moment(x))
    }

    /// Approximate transverse deflection at `x`, ignoring joint
    /// translation
    pub fn deflection(&self, member: MemberId, x: f64) -> CalcResult<f64> {
        Ok(self.at(member, x)?.deflection(x, self.settings.deflection_segments))
    }

    /// Sample every member
    pub fn diagrams(&self, points_per_member: usize) -> Vec<MemberDiagram> {
        self.frame
            .members
            .iter()
            .enumerate()
            .map(|(i, m)| MemberDiagram {
                member: m.name.clone(),
                diagram: Diagram::sample(
                    &self.segment_unchecked(MemberId(i)),
                    0.0,
                    points_per_member,
                    self.settings.deflection_segments,
                ),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::continuous_beam::Span;
    use approx::assert_relative_eq;
    use SupportType::{Fixed, Free, Pinned, Roller};

    const E: f64 = 200e6;
    const I: f64 = 1e-4;

    fn member(name: &str, a: &str, b: &str, l: f64) -> MemberInput {
        MemberInput::new(name, a, b, l, E, I)
    }

    fn analyze(input: &FrameInput, settings: &AnalysisSettings) -> FrameAnalysis {
        analyze_moment_distribution(Frame::new(input).unwrap(), settings).unwrap()
    }

    fn beam_frame(kinds: &[SupportType], spans: Vec<(f64, Vec<Load>)>) -> FrameInput {
        FrameInput {
            label: "beam".into(),
            joints: kinds
                .iter()
                .enumerate()
                .map(|(k, s)| JointInput::new(format!("J{}", k), *s))
                .collect(),
            members: spans
                .into_iter()
                .enumerate()
                .map(|(i, (l, loads))| MemberInput {
                    loads,
                    ..member(&format!("M{}", i), &format!("J{}", i), &format!("J{}", i + 1), l)
                })
                .collect(),
        }
    }

    #[test]
    fn test_two_span_equal_uniform() {
        let input = beam_frame(
            &[Pinned, Pinned, Pinned],
            vec![(10.0, vec![Load::udl(10.0)]), (10.0, vec![Load::udl(10.0)])],
        );
        let analysis = analyze(&input, &AnalysisSettings::default());
        let r = analysis.result();
        assert!(r.convergence_achieved);
        assert_relative_eq!(r.final_moments["M0"].end, 125.0, epsilon = 1e-5);
        assert_relative_eq!(r.final_moments["M1"].start, -125.0, epsilon = 1e-5);
        assert_eq!(r.final_moments["M0"].start, 0.0);

        let (_, m_b) = analysis.bending_end_moments(MemberId(0)).unwrap();
        assert_relative_eq!(m_b, -125.0, epsilon = 1e-5);

        let total: f64 = r.support_reactions.values().map(|r| r.vertical).sum();
        assert_relative_eq!(total, 200.0, epsilon = 1e-9);
        assert_relative_eq!(r.support_reactions["J1"].vertical, 125.0, epsilon = 1e-5);
        assert!(r.support_reactions.values().all(|r| r.horizontal == 0.0));
        assert!(r.axial_forces.values().all(|n| n.abs() < 1e-12));
    }

    #[test]
    fn test_single_span_fixed_fixed() {
        let input = beam_frame(&[Fixed, Fixed], vec![(6.0, vec![Load::udl(10.0)])]);
        let r = analyze(&input, &AnalysisSettings::default()).into_result();
        assert!(r.convergence_achieved);
        assert_eq!(r.iterations_performed, 0);
        assert_relative_eq!(r.final_moments["M0"].start, -30.0, epsilon = 1e-12);
        assert_relative_eq!(r.final_moments["M0"].end, 30.0, epsilon = 1e-12);
        assert!(r.distribution_factors["J0"].is_empty());
    }

    #[test]
    fn test_propped_cantilever_fem_adjustment() {
        let input = beam_frame(&[Fixed, Roller], vec![(8.0, vec![Load::udl(10.0)])]);
        let r = analyze(&input, &AnalysisSettings::default()).into_result();
        assert_relative_eq!(r.fixed_end_moments["M0"].start, -80.0, epsilon = 1e-9);
        assert_eq!(r.fixed_end_moments["M0"].end, 0.0);
        assert_relative_eq!(r.support_reactions["J1"].vertical, 30.0, epsilon = 1e-9);
        assert_relative_eq!(r.support_reactions["J0"].vertical, 50.0, epsilon = 1e-9);
        assert_relative_eq!(r.support_reactions["J0"].moment, -80.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cantilever_member() {
        let input = beam_frame(&[Fixed, Free], vec![(3.0, vec![Load::udl(4.0)])]);
        let analysis = analyze(&input, &AnalysisSettings::default());
        let r = analysis.result();
        assert_relative_eq!(r.final_moments["M0"].start, -18.0, epsilon = 1e-12);
        assert_eq!(r.final_moments["M0"].end, 0.0);
        assert_relative_eq!(r.support_reactions["J0"].vertical, 12.0, epsilon = 1e-12);
        assert!(!r.support_reactions.contains_key("J1"));
        assert!(analysis.deflection(MemberId(0), 3.0).unwrap() > 0.0);
    }

    #[test]
    fn test_overhang_balances_against_back_span() {
        let input = beam_frame(
            &[Pinned, Pinned, Free],
            vec![(6.0, vec![]), (2.0, vec![Load::point(10.0, 2.0)])],
        );
        let r = analyze(&input, &AnalysisSettings::default()).into_result();
        assert!(r.convergence_achieved);
        // Overhang keeps its static root moment, back span picks up the rest
        assert_relative_eq!(r.final_moments["M1"].start, -20.0, epsilon = 1e-12);
        assert_relative_eq!(r.final_moments["M0"].end, 20.0, epsilon = 1e-9);
        assert_eq!(r.distribution_factors["J1"]["M1"], 0.0);
        assert_relative_eq!(r.distribution_factors["J1"]["M0"], 1.0);
    }

    #[test]
    fn test_matches_three_moment() {
        let spans = vec![
            Span::new(5.0, E, I)
                .with_load(Load::point(40.0, 2.0))
                .with_load(Load::triangular(6.0, 1.0, 3.0)),
            Span::new(7.0, E, 2.0 * I).with_load(Load::udl(12.0)),
            Span::new(4.0, E, I).with_load(Load::trapezoidal(3.0, 9.0, 0.5, 3.0)),
            Span::new(1.5, E, I).with_load(Load::point(8.0, 1.5)),
        ];
        let kinds = [Fixed, Pinned, Roller, Pinned, Free];
        let mut beam =
            ContinuousBeam::from_spans("x", spans, &kinds, AnalysisSettings::default()).unwrap();
        let expected = beam.solve().unwrap().clone();

        let analysis =
            analyze_moment_distribution(Frame::from_beam(&beam).unwrap(), &AnalysisSettings::default())
                .unwrap();
        assert!(analysis.result().convergence_achieved);
        for (i, &(m_start, m_end)) in expected.span_end_moments.iter().enumerate() {
            let (a, b) = analysis.bending_end_moments(MemberId(i)).unwrap();
            assert_relative_eq!(a, m_start, epsilon = 1e-4);
            assert_relative_eq!(b, m_end, epsilon = 1e-4);
        }
        for (k, r) in expected.reactions.iter().enumerate() {
            if kinds[k].restrains_vertical() {
                assert_relative_eq!(
                    analysis.result().support_reactions[&format!("S{}", k)].vertical,
                    *r,
                    epsilon = 1e-4
                );
            }
        }
    }

    #[test]
    fn test_max_unbalance_non_increasing() {
        let input = beam_frame(
            &[Fixed, Pinned, Pinned, Pinned, Fixed],
            vec![
                (4.0, vec![Load::udl(20.0)]),
                (6.0, vec![Load::point(50.0, 2.0)]),
                (5.0, vec![Load::udl(8.0)]),
                (3.0, vec![]),
            ],
        );
        let r = analyze(&input, &AnalysisSettings::default()).into_result();
        assert!(r.convergence_achieved);
        assert!(r.iterations_performed > 1);
        for pair in r.iterations.windows(2) {
            assert!(pair[1].max_unbalance <= pair[0].max_unbalance + 1e-12);
        }
        assert!(r.final_max_unbalance < 1e-6);
    }

    #[test]
    fn test_non_convergence_reported() {
        let input = beam_frame(
            &[Pinned, Pinned, Pinned, Pinned],
            vec![
                (4.0, vec![Load::udl(20.0)]),
                (6.0, vec![Load::udl(20.0)]),
                (4.0, vec![Load::udl(20.0)]),
            ],
        );
        let settings = AnalysisSettings {
            max_iterations: 1,
            ..Default::default()
        };
        let r = analyze(&input, &settings).into_result();
        assert!(!r.convergence_achieved);
        assert_eq!(r.iterations_performed, 1);
        assert!(matches!(
            r.warnings.as_slice(),
            [SolverWarning::NonConvergence { iterations: 1, .. }]
        ));
        assert!(r.final_max_unbalance > 0.0);
    }

    #[test]
    fn test_distribution_factors_sum_to_one() {
        let input = beam_frame(
            &[Fixed, Pinned, Pinned],
            vec![(4.0, vec![Load::udl(1.0)]), (8.0, vec![Load::udl(1.0)])],
        );
        let r = analyze(&input, &AnalysisSettings::default()).into_result();
        let table = &r.distribution_factors["J1"];
        let sum: f64 = table.values().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        // K1 = EI/4, K2 = 0.75·EI/8
        assert_relative_eq!(table["M0"], 0.25 / (0.25 + 0.75 / 8.0), epsilon = 1e-12);
        assert!(r.distribution_factors["J0"].is_empty());
        assert!(r.distribution_factors["J2"].is_empty());
    }

    fn portal(beam_load: Load) -> FrameInput {
        FrameInput {
            label: "portal".into(),
            joints: vec![
                JointInput::new("A", Fixed).at(0.0, 0.0),
                JointInput::new("B", Free).at(0.0, 4.0),
                JointInput::new("C", Free).at(6.0, 4.0),
                JointInput::new("D", Fixed).at(6.0, 0.0),
            ],
            members: vec![
                member("AB", "A", "B", 4.0),
                member("BC", "B", "C", 6.0).with_load(beam_load),
                member("CD", "C", "D", 4.0),
            ],
        }
    }

    #[test]
    fn test_portal_frame_symmetry() {
        // Fixed-base portal, 4 m columns, 6 m beam with UDL
        let input = portal(Load::udl(10.0));
        let r = analyze(&input, &AnalysisSettings::default()).into_result();
        assert!(r.convergence_achieved);
        assert!(r.warnings.is_empty());
        let ab = r.final_moments["AB"];
        let bc = r.final_moments["BC"];
        let cd = r.final_moments["CD"];
        // Joint equilibrium at the knees
        assert_relative_eq!(ab.end + bc.start, 0.0, epsilon = 1e-6);
        assert_relative_eq!(bc.end + cd.start, 0.0, epsilon = 1e-6);
        // Symmetry
        assert_relative_eq!(bc.start, -bc.end, epsilon = 1e-6);
        assert_relative_eq!(ab.start, -cd.end, epsilon = 1e-6);
        // Base moment is half the knee moment (carry-over)
        assert_relative_eq!(ab.start, ab.end / 2.0, epsilon = 1e-6);
        // EIθ = 22.5 at B: knee 22.5, base 11.25
        assert_relative_eq!(ab.end, 22.5, epsilon = 1e-5);

        // Beam load reaches the bases through the columns
        let (a, d) = (r.support_reactions["A"], r.support_reactions["D"]);
        assert_relative_eq!(a.vertical + d.vertical, 60.0, epsilon = 1e-9);
        assert_relative_eq!(a.vertical, 30.0, epsilon = 1e-6);
        assert_relative_eq!(r.axial_forces["AB"], -30.0, epsilon = 1e-6);
        assert_relative_eq!(r.axial_forces["CD"], -30.0, epsilon = 1e-6);
        // Inward base thrust (M_AB + M_BA)/h, carried by the beam in compression
        assert_relative_eq!(a.horizontal, 33.75 / 4.0, epsilon = 1e-5);
        assert_relative_eq!(a.horizontal + d.horizontal, 0.0, epsilon = 1e-6);
        assert_relative_eq!(r.axial_forces["BC"], -33.75 / 4.0, epsilon = 1e-5);
        assert_relative_eq!(a.moment, ab.start, epsilon = 1e-12);
        assert_relative_eq!(d.moment, cd.end, epsilon = 1e-12);
    }

    #[test]
    fn test_unsymmetric_portal_reports_sway_restraint() {
        let input = portal(Load::point(40.0, 1.5));
        let r = analyze(&input, &AnalysisSettings::default()).into_result();
        assert!(r.convergence_achieved);

        let (a, d) = (r.support_reactions["A"], r.support_reactions["D"]);
        assert_relative_eq!(a.vertical + d.vertical, 40.0, epsilon = 1e-6);
        assert!(a.vertical > d.vertical);
        match r.warnings.as_slice() {
            [SolverWarning::SwayRestraint { horizontal, vertical }] => {
                assert!(horizontal.abs() > 1e-3);
                assert_relative_eq!(*vertical, 0.0, epsilon = 1e-9);
                // Restraint closes horizontal equilibrium
                assert_relative_eq!(a.horizontal + d.horizontal + horizontal, 0.0, epsilon = 1e-6);
            }
            other => panic!("expected a sway restraint warning, got {:?}", other),
        }
    }

    #[test]
    fn test_joint_coordinates_must_match_members() {
        // Only some joints placed
        let mut input = portal(Load::udl(10.0));
        input.joints[3] = JointInput::new("D", Fixed);
        input.joints[2] = JointInput::new("C", Free);
        assert!(Frame::new(&input).is_err());

        // Chord disagrees with the member length
        let mut input = portal(Load::udl(10.0));
        input.members[1].length = 5.0;
        assert!(matches!(Frame::new(&input), Err(CalcError::InvalidInput { .. })));

        let frame = Frame::new(&portal(Load::udl(10.0))).unwrap();
        assert_eq!(frame.members[0].direction, [0.0, 1.0]);
        assert_eq!(frame.members[2].direction, [0.0, -1.0]);
        assert_eq!(frame.members[1].normal(), [0.0, -1.0]);
    }

    #[test]
    fn test_explicit_release() {
        let input = FrameInput {
            label: "hinge".into(),
            joints: vec![
                JointInput::new("A", Fixed),
                JointInput::new("B", Pinned),
                JointInput::new("C", Fixed),
            ],
            members: vec![
                member("AB", "A", "B", 5.0).with_load(Load::udl(6.0)).with_releases(false, true),
                member("BC", "B", "C", 5.0).with_load(Load::udl(6.0)),
            ],
        };
        let r = analyze(&input, &AnalysisSettings::default()).into_result();
        assert_eq!(r.final_moments["AB"].end, 0.0);
        // BC behaves as a propped cantilever pinned at B
        assert_relative_eq!(r.final_moments["BC"].start, 0.0, epsilon = 1e-9);
        assert_relative_eq!(r.final_moments["BC"].end, 6.0 * 25.0 / 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_validation_errors() {
        let mut input = beam_frame(&[Pinned, Pinned], vec![(4.0, vec![])]);
        input.members[0].end = "X".into();
        assert!(matches!(
            Frame::new(&input),
            Err(CalcError::UnknownReference { .. })
        ));

        let mut input = beam_frame(&[Pinned, Pinned], vec![(4.0, vec![])]);
        input.joints[1].name = "J0".into();
        assert!(Frame::new(&input).is_err());

        let mut input = beam_frame(&[Pinned, Pinned], vec![(4.0, vec![])]);
        input.members[0].length = 0.0;
        assert!(Frame::new(&input).is_err());

        let input = beam_frame(&[Pinned, Free], vec![(4.0, vec![])]);
        assert!(Frame::new(&input).is_err());

        let input = beam_frame(&[Pinned, Pinned], vec![(4.0, vec![Load::point(1.0, 5.0)])]);
        assert!(Frame::new(&input).is_err());
    }

    #[test]
    fn test_member_queries() {
        let input = beam_frame(&[Pinned, Pinned], vec![(4.0, vec![Load::udl(2.0)])]);
        let analysis = analyze(&input, &AnalysisSettings::default());
        let id = analysis.frame().member_id("M0").unwrap();
        assert_relative_eq!(analysis.moment(id, 2.0).unwrap(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(analysis.shear(id, 0.0).unwrap(), 4.0, epsilon = 1e-12);
        assert!(analysis.moment(id, 4.5).is_err());
        assert!(matches!(
            analysis.moment(MemberId(3), 1.0),
            Err(CalcError::IndexOutOfRange { .. })
        ));
        let diagrams = analysis.diagrams(5);
        assert_eq!(diagrams.len(), 1);
        assert_eq!(diagrams[0].diagram.len(), 5);
    }
}
