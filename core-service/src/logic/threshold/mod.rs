//! Threshold Module
//!
//! Derives the ground-truth safety label from raw measurements.
//!
//! ## Structure
//! - `types`: SafetyLabel, Violation
//! - `rules`: Limits and the ThresholdTable
//! - `engine`: evaluate / classify / violations
//!
//! ## Usage
//! ```ignore
//! use crate::logic::threshold::{evaluate, ThresholdTable};
//!
//! let table = ThresholdTable::groundwater();
//! if evaluate(&record, &table) {
//!     println!("Safe");
//! }
//! ```

pub mod types;
pub mod rules;
pub mod engine;

pub use types::{SafetyLabel, Violation, ViolationKind};
pub use rules::{ThresholdRange, ThresholdTable};
pub use engine::{classify, evaluate, violations};
