//! thaikern
//!
//! Generates glyph pair adjustments that keep Thai vowels and tone marks
//! clear of their base consonants, and merges them into a font asset's
//! adjustment table with single-level undo.
pub mod adjust;
pub mod core;
pub mod data;
pub mod font_source;
pub mod logging;
pub mod rules;
pub mod script;
