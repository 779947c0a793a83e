//! Inset animation
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing curves
//! - `timing` - Progress and interpolation
//!
//! ## L3 Molecular Layer
//! - `inset` - One-sided inset animation combining both

pub mod easing;
pub mod timing;

pub mod inset;

pub use easing::EasingTypeExt;
pub use inset::{InsetAnimation, InsetPhase};
