//! # beam_core - Continuous Beam and Frame Analysis Engine
//!
//! `beam_core` analyses statically indeterminate beams and frames and
//! designs their sections. All inputs and outputs are JSON-serializable,
//! so a transport layer only has to move JSON in and out.
//!
//! ## Design Philosophy
//!
//! - **Validate early**: inputs are checked when a model is built, so
//!   solver code can assume well-formed data
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//! - **Warnings, not panics**: ill-conditioned systems and non-convergence
//!   come back as results carrying a [`SolverWarning`]
//!
//! ## Quick Start
//!
//! ```rust
//! use beam_core::calculations::{ContinuousBeam, Span, SupportType};
//! use beam_core::loads::Load;
//! use beam_core::settings::AnalysisSettings;
//!
//! let spans = vec![
//!     Span::new(6.0, 200e6, 1e-4).with_load(Load::point(50.0, 3.0)),
//!     Span::new(8.0, 200e6, 1e-4).with_load(Load::point(30.0, 4.0)),
//! ];
//! let kinds = [SupportType::Pinned; 3];
//! let mut beam = ContinuousBeam::from_spans("B-1", spans, &kinds, AnalysisSettings::default())?;
//!
//! let result = beam.solve()?;
//! assert!(result.support_moments[1] < 0.0);
//! assert!((result.reactions.iter().sum::<f64>() - 80.0).abs() < 1e-9);
//!
//! let midspan = beam.moment(0, 3.0)?;
//! assert!(midspan > 0.0);
//! # Ok::<(), beam_core::errors::CalcError>(())
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - three-moment and Hardy Cross engines, diagrams
//! - [`loads`] - load types and their FEM / area-term contributions
//! - [`equations`] - closed-form beam formulas
//! - [`design`] - BS 8110 section design
//! - [`settings`] - analysis settings
//! - [`project`] - project container, metadata and settings
//! - [`errors`] - structured error types
//! - [`file_io`] - atomic JSON saves and loads

pub mod calculations;
pub mod design;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod loads;
pub mod project;
pub mod settings;

// Re-export commonly used types at crate root for convenience
pub use calculations::{run_item, AnalysisItem, AnalysisReport, SolverWarning};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_json, load_project, save_json, save_project};
pub use project::{Project, ProjectMetadata};
pub use settings::AnalysisSettings;
