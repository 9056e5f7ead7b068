//! Reinforcing bar sizes and single-layer bar selection
//!
//! Standard high-yield bar diameters (mm) with their nominal areas
//! `πφ²/4` (mm²). [`select_bars`] picks the arrangement with the smallest
//! provided area that fits in one layer.

use std::f64::consts::PI;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Standard bar diameters (mm)
const DIAMETERS: [f64; 8] = [8.0, 10.0, 12.0, 16.0, 20.0, 25.0, 32.0, 40.0];

/// Smallest diameter used for main bars; 8 mm is for links only
const MIN_MAIN_BAR: f64 = 10.0;

/// Cover plus link, each side of the section (mm)
pub const SIDE_ALLOWANCE: f64 = 40.0;

/// Aggregate size + 5 mm
const MIN_CLEAR_SPACING: f64 = 25.0;

/// Largest bar count considered in one layer
const MAX_BARS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarSize {
    /// mm
    pub diameter: f64,
    /// mm²
    pub area: f64,
}

/// Bar table, ascending by diameter
pub static BAR_SIZES: Lazy<Vec<BarSize>> = Lazy::new(|| {
    DIAMETERS
        .iter()
        .map(|&d| BarSize {
            diameter: d,
            area: PI * d * d / 4.0,
        })
        .collect()
});

/// Look up a standard bar by diameter
pub fn bar(diameter: f64) -> Option<BarSize> {
    BAR_SIZES
        .iter()
        .find(|b| (b.diameter - diameter).abs() < 1e-9)
        .copied()
}

/// `count` bars of one diameter in a single layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarArrangement {
    pub count: u32,
    pub diameter: f64,
    /// Total area (mm²)
    pub area: f64,
    /// Clear gap between adjacent bars (mm)
    pub clear_spacing: f64,
}

impl fmt::Display for BarArrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}H{} ({:.0} mm²)", self.count, self.diameter, self.area)
    }
}

/// Clear spacing of `count` bars across `width`, `None` if they don't fit
fn clear_spacing(width: f64, count: u32, diameter: f64) -> Option<f64> {
    let available = width - 2.0 * SIDE_ALLOWANCE - count as f64 * diameter;
    let spacing = if count > 1 {
        available / (count - 1) as f64
    } else {
        available
    };
    (spacing >= diameter.max(MIN_CLEAR_SPACING)).then_some(spacing)
}

/// Cheapest single-layer arrangement providing at least `required_area`
/// in a section `width` wide. At least two bars are always provided.
pub fn select_bars(required_area: f64, width: f64) -> Option<BarArrangement> {
    let mut best: Option<BarArrangement> = None;
    for size in BAR_SIZES.iter().filter(|b| b.diameter >= MIN_MAIN_BAR) {
        let count = ((required_area / size.area).ceil() as u32).max(2);
        if count > MAX_BARS {
            continue;
        }
        let Some(spacing) = clear_spacing(width, count, size.diameter) else {
            continue;
        };
        let candidate = BarArrangement {
            count,
            diameter: size.diameter,
            area: count as f64 * size.area,
            clear_spacing: spacing,
        };
        best = match best {
            Some(b) if b.area < candidate.area || (b.area == candidate.area && b.count <= count) => Some(b),
            _ => Some(candidate),
        };
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bar_table() {
        assert_eq!(BAR_SIZES.len(), 8);
        let h16 = bar(16.0).unwrap();
        assert_relative_eq!(h16.area, 201.06, epsilon = 0.01);
        assert!(bar(14.0).is_none());
        assert!(BAR_SIZES.windows(2).all(|w| w[0].diameter < w[1].diameter));
    }

    #[test]
    fn test_select_smallest_area() {
        let arrangement = select_bars(682.1, 300.0).unwrap();
        assert_eq!(arrangement.count, 4);
        assert_eq!(arrangement.diameter, 16.0);
        assert_relative_eq!(arrangement.area, 804.25, epsilon = 0.01);
        assert!(arrangement.clear_spacing >= 25.0);
        assert_eq!(arrangement.to_string(), "4H16 (804 mm²)");
    }

    #[test]
    fn test_minimum_two_bars() {
        let arrangement = select_bars(50.0, 300.0).unwrap();
        assert_eq!(arrangement.count, 2);
        assert_eq!(arrangement.diameter, 10.0);
    }

    #[test]
    fn test_nothing_fits() {
        assert!(select_bars(20_000.0, 200.0).is_none());
    }
}
