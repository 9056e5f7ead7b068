//! Diagram sampling
//!
//! Plain numeric arrays for plotting and for the section designer. Every
//! array in a [`Diagram`] has the same length; `positions[i]` is where the
//! other values were evaluated.

use serde::{Deserialize, Serialize};

use super::segment::Segment;

/// Sampled shear, moment and deflection along a beam or member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub positions: Vec<f64>,
    pub shear: Vec<f64>,
    pub moment: Vec<f64>,
    /// Approximate, see [`Segment::deflection`]
    pub deflection: Vec<f64>,
}

/// A value and where it occurs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    pub position: f64,
    pub value: f64,
}

/// Peak values read off a diagram
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramExtrema {
    /// Largest (most positive) bending moment
    pub max_sagging: Extremum,
    /// Smallest (most negative) bending moment
    pub max_hogging: Extremum,
    /// Largest shear magnitude, sign kept
    pub max_shear: Extremum,
    /// Largest deflection magnitude, sign kept
    pub max_deflection: Extremum,
}

impl Diagram {
    /// Sample `points` evenly spaced stations over a segment, ends included.
    /// `offset` shifts the reported positions (beam coordinates).
    pub fn sample(segment: &Segment<'_>, offset: f64, points: usize, deflection_segments: usize) -> Self {
        let n = points.max(2);
        let mut diagram = Diagram::with_capacity(n);
        for j in 0..n {
            let x = segment.length * j as f64 / (n - 1) as f64;
            diagram.positions.push(offset + x);
            diagram.shear.push(segment.shear(x));
            diagram.moment.push(segment.moment(x));
            diagram.deflection.push(segment.deflection(x, deflection_segments));
        }
        diagram
    }

    pub fn with_capacity(n: usize) -> Self {
        Diagram {
            positions: Vec::with_capacity(n),
            shear: Vec::with_capacity(n),
            moment: Vec::with_capacity(n),
            deflection: Vec::with_capacity(n),
        }
    }

    /// Append another diagram's stations
    pub fn extend(&mut self, other: Diagram) {
        self.positions.extend(other.positions);
        self.shear.extend(other.shear);
        self.moment.extend(other.moment);
        self.deflection.extend(other.deflection);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Peak values over all stations
    pub fn extrema(&self) -> DiagramExtrema {
        let mut out = DiagramExtrema::default();
        let Some(&first) = self.positions.first() else {
            return out;
        };
        out.max_sagging = Extremum { position: first, value: f64::NEG_INFINITY };
        out.max_hogging = Extremum { position: first, value: f64::INFINITY };

        for (i, &x) in self.positions.iter().enumerate() {
            let m = self.moment[i];
            if m > out.max_sagging.value {
                out.max_sagging = Extremum { position: x, value: m };
            }
            if m < out.max_hogging.value {
                out.max_hogging = Extremum { position: x, value: m };
            }
            if self.shear[i].abs() > out.max_shear.value.abs() {
                out.max_shear = Extremum { position: x, value: self.shear[i] };
            }
            if self.deflection[i].abs() > out.max_deflection.value.abs() {
                out.max_deflection = Extremum { position: x, value: self.deflection[i] };
            }
        }
        out
    }
}
