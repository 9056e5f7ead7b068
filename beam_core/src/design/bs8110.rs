//! # BS 8110-1:1997 Rectangular Beam Design
//!
//! Designs a rectangular section for the peak sagging moment, the peak
//! hogging moment and the peak shear of an envelope.
//!
//! ## Flexure (cl. 3.4.4.4)
//!
//! - `K = M / (b d² fcu)`, with `K' = 0.156` (redistribution ≤ 10%)
//! - `z = d (0.5 + √(0.25 − K/0.9)) ≤ 0.95 d`
//! - `As = M / (0.95 fy z)`
//! - `K > K'`: compression steel `As' = (K − K') fcu b d² / (0.95 fy (d − d'))`
//! - `0.13% bh ≤ As ≤ 4% bh`
//!
//! ## Shear (cl. 3.4.5)
//!
//! - `v = V / (b d) ≤ min(0.8 √fcu, 5)`
//! - `vc` from Table 3.8 (`100As/bd ≤ 3`, `400/d ≥ 1`, `fcu ≤ 40`)
//! - links per Table 3.7: minimum `0.4 b / (0.95 fyv)` while
//!   `v < vc + 0.4`, otherwise `b (v − vc) / (0.95 fyv)`
//!
//! A failed check is reported through `passes` / unity ratios, never as
//! an error.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::rebar::{select_bars, BarArrangement};
use super::{DesignEnvelope, Materials, SectionInput};
use crate::calculations::diagrams::Extremum;
use crate::errors::CalcResult;
use crate::settings::DesignDefaults;

/// Limiting K for singly reinforced sections
pub const K_PRIME: f64 = 0.156;

const MIN_TENSION_RATIO: f64 = 0.0013;
const MAX_STEEL_RATIO: f64 = 0.04;
const MAX_LEVER_ARM_RATIO: f64 = 0.95;
const GAMMA_M_SHEAR: f64 = 1.25;
const MAX_SHEAR_STRESS: f64 = 5.0;

/// Flexural design for one sign of moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexureDesign {
    /// Design moment magnitude (kN·m) and where it occurs
    pub design_moment: Extremum,
    pub k: f64,
    /// Lever arm (mm)
    pub lever_arm: f64,
    /// Tension steel required, after the minimum (mm²)
    pub as_required: f64,
    /// Compression steel required (mm²)
    pub as_compression: f64,
    pub tension_bars: Option<BarArrangement>,
    pub compression_bars: Option<BarArrangement>,
    /// Ultimate moment capacity with the provided bars (kN·m)
    pub moment_capacity: f64,
    /// design moment / capacity
    pub unity: f64,
    /// Required steel exceeds 4% bh
    pub exceeds_max_steel: bool,
}

impl FlexureDesign {
    pub fn passes(&self) -> bool {
        self.tension_bars.is_some()
            && (self.as_compression == 0.0 || self.compression_bars.is_some())
            && !self.exceeds_max_steel
            && self.unity <= 1.0
    }

    /// Provided tension area, or the required area when nothing fits
    pub fn as_provided(&self) -> f64 {
        self.tension_bars.map(|b| b.area).unwrap_or(self.as_required)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkRegime {
    /// `v < vc + 0.4`: minimum links
    Minimum,
    /// Links designed for `v − vc`
    Designed,
    /// `v` exceeds the maximum shear stress; section must be enlarged
    SectionInadequate,
}

/// Shear design at the peak shear
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShearDesign {
    /// Design shear (kN) and where it occurs
    pub design_shear: Extremum,
    /// Shear stress v (N/mm²)
    pub v: f64,
    pub v_max: f64,
    /// Concrete shear capacity (N/mm²)
    pub vc: f64,
    /// Required link area per unit spacing Asv/sv (mm²/mm)
    pub asv_over_sv: f64,
    pub regime: LinkRegime,
    /// v / v_max
    pub unity: f64,
}

impl ShearDesign {
    pub fn passes(&self) -> bool {
        self.regime != LinkRegime::SectionInadequate
    }
}

/// Full section design.
///
/// ## JSON Example
///
/// ```json
/// {
///   "code": "BS 8110-1:1997",
///   "materials": { "fcu": 30.0, "fy": 460.0, "fyv": 250.0 },
///   "sagging": { "k": 0.057, "as_required": 682.1, "unity": 0.86, ... },
///   "hogging": null,
///   "shear": { "v": 0.62, "vc": 0.53, "regime": "Minimum", ... },
///   "governing_unity": 0.86,
///   "governing_condition": "Sagging",
///   "passes": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDesignResult {
    pub code: String,
    pub materials: Materials,
    /// `None` when the envelope has no sagging moment
    pub sagging: Option<FlexureDesign>,
    /// `None` when the envelope has no hogging moment
    pub hogging: Option<FlexureDesign>,
    pub shear: ShearDesign,
    pub governing_unity: f64,
    pub governing_condition: String,
    pub passes: bool,
}

/// Design a section for an envelope
pub fn design_section(
    section: &SectionInput,
    envelope: &DesignEnvelope,
    defaults: &DesignDefaults,
) -> CalcResult<SectionDesignResult> {
    section.validate()?;
    envelope.validate()?;
    let materials = section.materials(defaults);

    let sagging_peak = envelope.max_sagging();
    let hogging_peak = envelope.max_hogging();
    let sagging = (sagging_peak.value > 0.0).then(|| design_flexure(section, &materials, sagging_peak));
    let hogging = (hogging_peak.value < 0.0).then(|| {
        design_flexure(
            section,
            &materials,
            Extremum {
                position: hogging_peak.position,
                value: -hogging_peak.value,
            },
        )
    });

    // Tension steel at the peak shear: hogging steel where the moment there
    // is negative, sagging steel otherwise
    let shear_peak = envelope.max_shear();
    let tension_side = if envelope.moment_near(shear_peak.position) < 0.0 {
        hogging.as_ref().or(sagging.as_ref())
    } else {
        sagging.as_ref().or(hogging.as_ref())
    };
    let as_tension = tension_side
        .map(FlexureDesign::as_provided)
        .unwrap_or(MIN_TENSION_RATIO * section.gross_area());
    let shear = design_shear(section, &materials, shear_peak, as_tension);

    let mut checks: Vec<(&str, f64, bool)> = Vec::with_capacity(3);
    if let Some(f) = &sagging {
        checks.push(("Sagging", f.unity, f.passes()));
    }
    if let Some(f) = &hogging {
        checks.push(("Hogging", f.unity, f.passes()));
    }
    checks.push(("Shear", shear.unity, shear.passes()));

    let (governing_condition, governing_unity) = checks
        .iter()
        .map(|&(name, unity, _)| (name, unity))
        .fold(("Shear", f64::NEG_INFINITY), |acc, c| if c.1 > acc.1 { c } else { acc });
    let passes = checks.iter().all(|&(_, _, ok)| ok);

    info!(
        governing = governing_condition,
        unity = governing_unity,
        passes,
        "section design complete"
    );

    Ok(SectionDesignResult {
        code: defaults.code.clone(),
        materials,
        sagging,
        hogging,
        shear,
        governing_unity,
        governing_condition: governing_condition.to_string(),
        passes,
    })
}

/// Lever arm for a given K, capped at 0.95d
fn lever_arm(d: f64, k: f64) -> f64 {
    (d * (0.5 + (0.25 - k / 0.9).sqrt())).min(MAX_LEVER_ARM_RATIO * d)
}

/// Flexural design for a positive moment magnitude (kN·m)
pub fn design_flexure(section: &SectionInput, materials: &Materials, moment: Extremum) -> FlexureDesign {
    let b = section.width;
    let d = section.effective_depth;
    let d2 = section.compression_depth;
    let Materials { fcu, fy, .. } = *materials;

    let m = moment.value * 1e6;
    let k = m / (b * d * d * fcu);

    let (z, as_tension, as_compression) = if k <= K_PRIME {
        let z = lever_arm(d, k);
        (z, m / (0.95 * fy * z), 0.0)
    } else {
        let z = lever_arm(d, K_PRIME);
        let asc = (k - K_PRIME) * fcu * b * d * d / (0.95 * fy * (d - d2));
        (z, K_PRIME * fcu * b * d * d / (0.95 * fy * z) + asc, asc)
    };

    let as_min = MIN_TENSION_RATIO * section.gross_area();
    let as_max = MAX_STEEL_RATIO * section.gross_area();
    let as_required = as_tension.max(as_min);
    let exceeds_max_steel = as_required + as_compression > as_max;

    let tension_bars = select_bars(as_required, b);
    let compression_bars = if as_compression > 0.0 {
        select_bars(as_compression, b)
    } else {
        None
    };

    let moment_capacity = match (tension_bars, compression_bars) {
        (None, _) => 0.0,
        (Some(t), None) if as_compression == 0.0 => singly_capacity(section, materials, t.area),
        (Some(t), Some(c)) => {
            let balanced = K_PRIME * fcu * b * d * d + 0.95 * fy * c.area * (d - d2);
            let tension = 0.95 * fy * t.area * z;
            balanced.min(tension) / 1e6
        }
        (Some(_), None) => 0.0,
    };
    let unity = if moment_capacity > 0.0 {
        moment.value / moment_capacity
    } else {
        f64::MAX
    };

    debug!(
        moment = moment.value,
        k,
        as_required,
        as_compression,
        capacity = moment_capacity,
        "flexure design"
    );

    FlexureDesign {
        design_moment: moment,
        k,
        lever_arm: z,
        as_required,
        as_compression,
        tension_bars,
        compression_bars,
        moment_capacity,
        unity,
        exceeds_max_steel,
    }
}

/// Ultimate moment of a singly reinforced section with `area` of tension
/// steel (kN·m), limited to the balanced capacity `K' fcu b d²`.
pub fn singly_capacity(section: &SectionInput, materials: &Materials, area: f64) -> f64 {
    let b = section.width;
    let d = section.effective_depth;
    let Materials { fcu, fy, .. } = *materials;
    let force = 0.95 * fy * area;
    let x = force / (0.45 * fcu * b * 0.9);
    let z = (d - 0.45 * x).min(MAX_LEVER_ARM_RATIO * d);
    (force * z).min(K_PRIME * fcu * b * d * d) / 1e6
}

/// Design concrete shear stress vc (N/mm²), Table 3.8
pub fn concrete_shear_stress(section: &SectionInput, fcu: f64, as_tension: f64) -> f64 {
    let b = section.width;
    let d = section.effective_depth;
    let rho = (100.0 * as_tension / (b * d)).min(3.0);
    let depth_factor = (400.0 / d).max(1.0);
    0.79 / GAMMA_M_SHEAR * rho.cbrt() * depth_factor.powf(0.25) * (fcu.min(40.0) / 25.0).cbrt()
}

/// Shear design for the peak shear (kN)
pub fn design_shear(section: &SectionInput, materials: &Materials, shear: Extremum, as_tension: f64) -> ShearDesign {
    let b = section.width;
    let d = section.effective_depth;
    let v = shear.value.abs() * 1e3 / (b * d);
    let v_max = (0.8 * materials.fcu.sqrt()).min(MAX_SHEAR_STRESS);
    let vc = concrete_shear_stress(section, materials.fcu, as_tension);

    let (regime, asv_over_sv) = if v > v_max {
        (LinkRegime::SectionInadequate, b * (v - vc) / (0.95 * materials.fyv))
    } else if v < vc + 0.4 {
        (LinkRegime::Minimum, 0.4 * b / (0.95 * materials.fyv))
    } else {
        (LinkRegime::Designed, b * (v - vc) / (0.95 * materials.fyv))
    };

    ShearDesign {
        design_shear: shear,
        v,
        v_max,
        vc,
        asv_over_sv,
        regime,
        unity: v / v_max,
    }
}
