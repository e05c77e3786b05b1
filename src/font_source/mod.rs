//! Font source data structures
//!
//! This module contains everything the engine needs to know about the font
//! being adjusted: the collaborator traits, the adjustment records, face
//! metrics, and the JSON asset used by the command line tool.

pub mod asset;
pub mod document;
pub mod metrics;

// Collaborator seams and records
pub use asset::{
    FontAsset, FontHandle, GlyphAdjustment, GlyphIndex, GlyphPairAdjustment, LayoutHost,
    NullLayoutHost, TextUserId,
};
// Concrete asset
pub use document::{CharacterRecord, FontAssetData, FontAssetDocument};
// Metrics
pub use metrics::{DerivedOffsets, MetricSnapshot};
