//! Single-member statics
//!
//! Once the end moments of a span (or frame member) are known the member is
//! statically determinate. [`Segment`] evaluates shear, bending moment and
//! the approximate deflection anywhere along it by superposing the simple
//! beam under its loads with the linear diagram of its end moments.
//!
//! Conventions: sagging bending moment positive, shear positive when the
//! left part is pushed up, deflection positive downward.

use crate::equations::beam;
use crate::errors::{CalcError, CalcResult};
use crate::loads::Load;

/// How the member is held for the deflection estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restraint {
    /// Supported at both ends
    Spanning,
    /// Built in at one end, free at the other
    Cantilever { root_at_start: bool },
}

/// A loaded member with known end bending moments.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    pub length: f64,
    pub ei: f64,
    pub loads: &'a [Load],
    /// Bending moment at the start (sagging positive)
    pub m_start: f64,
    /// Bending moment at the end (sagging positive)
    pub m_end: f64,
    pub restraint: Restraint,
}

impl<'a> Segment<'a> {
    pub fn check_position(&self, x: f64) -> CalcResult<()> {
        if !(0.0..=self.length).contains(&x) {
            return Err(CalcError::PositionOutOfRange {
                position: x,
                length: self.length,
            });
        }
        Ok(())
    }

    /// Total downward load on the member
    pub fn total_load(&self) -> f64 {
        self.loads.iter().map(|l| l.total(self.length)).sum()
    }

    /// Left reaction of the simply supported member under its loads
    pub fn simple_left_reaction(&self) -> f64 {
        let l = self.length;
        self.loads
            .iter()
            .map(|load| beam::simple_reactions(load.total(l), load.first_moment(l), l).0)
            .sum()
    }

    /// Shear just right of the start
    pub fn shear_at_start(&self) -> f64 {
        self.simple_left_reaction() + (self.m_end - self.m_start) / self.length
    }

    /// Shear just left of the end, counting every load on the member
    pub fn shear_at_end(&self) -> f64 {
        self.shear_at_start() - self.total_load()
    }

    /// Shear at `x`; a point load exactly at `x` is not yet included
    pub fn shear(&self, x: f64) -> f64 {
        let l = self.length;
        let applied: f64 = self.loads.iter().map(|load| load.force_up_to(x, l)).sum();
        self.shear_at_start() - applied
    }

    /// Simple-beam bending moment from the member loads alone
    pub fn moment_due_to_loads(&self, x: f64) -> f64 {
        let l = self.length;
        let carried: f64 = self.loads.iter().map(|load| load.moment_up_to(x, l)).sum();
        self.simple_left_reaction() * x - carried
    }

    /// Linear interpolation between the end moments
    pub fn moment_due_to_supports(&self, x: f64) -> f64 {
        self.m_start + (self.m_end - self.m_start) * x / self.length
    }

    /// Total bending moment
    pub fn moment(&self, x: f64) -> f64 {
        self.moment_due_to_loads(x) + self.moment_due_to_supports(x)
    }

    /// Approximate deflection at `x`.
    ///
    /// Spanning members superpose the simple-beam deflection of each load
    /// with the end-moment term; cantilevers are measured from the chord
    /// at the root, ignoring rotation of the supporting joint.
    pub fn deflection(&self, x: f64, segments: usize) -> f64 {
        let l = self.length;
        match self.restraint {
            Restraint::Spanning => {
                let loads: f64 = self
                    .loads
                    .iter()
                    .map(|load| load.simple_deflection(l, x, self.ei, segments))
                    .sum();
                loads + beam::end_moment_deflection(self.m_start, self.m_end, l, x, self.ei)
            }
            Restraint::Cantilever { root_at_start } => {
                let u = if root_at_start { x } else { l - x };
                self.loads
                    .iter()
                    .map(|load| load.cantilever_deflection(l, u, self.ei, segments, root_at_start))
                    .sum()
            }
        }
    }
}

/// Root bending moment of a cantilever carrying `loads` (hogging for
/// downward loads).
pub fn cantilever_root_moment(loads: &[Load], length: f64, root_at_start: bool) -> f64 {
    loads
        .iter()
        .map(|load| {
            let about_start = load.first_moment(length);
            if root_at_start {
                -about_start
            } else {
                -(load.total(length) * length - about_start)
            }
        })
        .sum()
}
