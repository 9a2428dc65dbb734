//! Logic Module - labeling, cleaning & model engines
//!
//! ## Architecture
//! - `features/` - Feature layout (order, version, hash) and records
//! - `threshold/` - Domain threshold rules, ground-truth label
//! - `dataset/` - CSV tables, labeler, cleaning, summary report
//! - `model/` - Candidate training, selection, artifact, inference

pub mod error;
pub mod features;
pub mod threshold;
pub mod dataset;
pub mod model;
