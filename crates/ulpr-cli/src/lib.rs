//! Command-line front ends for ULPR.
//!
//! - `ulpr` scores one lesson plan with a model backend ([`evaluate`])
//! - `ulpr-analyze` runs the offline band-matrix tools ([`analyze`])

pub mod analyze;
pub mod evaluate;
pub mod logging;
