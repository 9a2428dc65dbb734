//! Features Module - Measurement schema
//!
//! The fixed, versioned feature layout and the per-sample record type.

pub mod layout;
pub mod record;

// Re-export common types
pub use layout::{
    layout_hash, validate_layout, LayoutInfo, LayoutMismatchError,
    FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use record::{FeatureVector, MeasurementRecord, MissingFeature};
