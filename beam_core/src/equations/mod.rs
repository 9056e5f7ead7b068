//! # Structural Engineering Equations
//!
//! Fundamental beam mechanics formulas shared by both analysis engines.
//! Keeping them in one place makes them easy to check against the
//! textbook references.
//!
//! ## Modules
//!
//! - [`beam`] - fixed-end moments, moment-area terms, simple-beam
//!   reactions and deflections
//!
//! ## Sign Conventions
//!
//! - **Loads**: Positive downward (gravity direction)
//! - **Fixed-end moments**: Clockwise-positive member-end moments
//! - **Moment**: Positive causes tension on bottom fiber (sagging)
//! - **Shear**: Positive when left side moves up relative to right
//! - **Deflection**: Positive downward
//! - **Reactions**: Positive upward (resisting gravity)
//!
//! ## References
//!
//! - Roark's Formulas for Stress and Strain, 8th Edition
//! - Structural Analysis by R.C. Hibbeler

pub mod beam;

// Re-export commonly used items
pub use beam::{
    area_terms_point_load, area_terms_uniform_full, fem_point_load, fem_uniform_full,
    integrate_linear_load, simple_reactions,
};
