//! Span loads
//!
//! - [`Load`] - point, full UDL, partial UDL, triangular and trapezoidal
//!   loads applied to a single span
//! - [`LoadComponent`] - the concentrated / linearly varying primitives
//!   every load decomposes into
//!
//! # Example
//!
//! ```
//! use beam_core::loads::Load;
//! use beam_core::settings::DistributedLoadModel;
//!
//! let load = Load::trapezoidal(10.0, 20.0, 1.0, 3.0);
//! assert_eq!(load.total(6.0), 45.0);
//!
//! let (left, right) = load.fixed_end_moments(6.0, DistributedLoadModel::Exact);
//! assert!(left < 0.0 && right > 0.0);
//! ```

pub mod component;
pub mod load;

pub use component::LoadComponent;
pub use load::Load;
