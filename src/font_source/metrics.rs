//! Font metrics and the offsets derived from them
//!
//! Mark collisions scale with the rendered size of the font, so every
//! built-in offset is a fixed fraction of the asset's point size.

use serde::{Deserialize, Serialize};

/// Point size the fallback offsets were calibrated against
pub const REFERENCE_POINT_SIZE: f64 = 100.0;

const BASE_RATIO: f64 = 0.02;
const UPPER_TONE_RATIO: f64 = 0.194;
const ASCENDER_RATIO: f64 = 0.035;

/// Face metrics read from a font asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub point_size: f64,
    pub scale: f64,
}

impl Default for MetricSnapshot {
    fn default() -> Self {
        Self {
            point_size: REFERENCE_POINT_SIZE,
            scale: 1.0,
        }
    }
}

/// The three offsets presets are seeded with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedOffsets {
    /// Consonant followed by an upper mark
    pub base: f64,
    /// Upper vowel followed by a tone mark; lifts the tone above the vowel
    pub upper_tone: f64,
    /// Ascender consonant followed by an upper mark
    pub ascender: f64,
}

impl DerivedOffsets {
    /// Values used when no font metrics are available
    pub const FALLBACK: DerivedOffsets = DerivedOffsets {
        base: -2.0,
        upper_tone: 19.4,
        ascender: -3.5,
    };

    /// Derive offsets from `metrics`, or fall back to the calibration defaults
    pub fn derive(metrics: Option<&MetricSnapshot>) -> Self {
        let Some(metrics) = metrics else {
            return Self::FALLBACK;
        };

        let MetricSnapshot { point_size, scale } = *metrics;
        Self {
            base: round2(-(point_size * BASE_RATIO * scale)),
            upper_tone: round2(point_size * UPPER_TONE_RATIO * scale),
            ascender: round2(-(point_size * ASCENDER_RATIO * scale)),
        }
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_size_matches_fallback() {
        let offsets = DerivedOffsets::derive(Some(&MetricSnapshot::default()));
        assert_eq!(offsets, DerivedOffsets::FALLBACK);
        assert_eq!(offsets.base, -2.0);
        assert_eq!(offsets.upper_tone, 19.4);
        assert_eq!(offsets.ascender, -3.5);
    }

    #[test]
    fn test_missing_metrics_fall_back() {
        assert_eq!(DerivedOffsets::derive(None), DerivedOffsets::FALLBACK);
    }

    #[test]
    fn test_offsets_scale_with_point_size() {
        let metrics = MetricSnapshot {
            point_size: 247.0,
            scale: 1.0,
        };
        let offsets = DerivedOffsets::derive(Some(&metrics));
        assert_eq!(offsets.base, -4.94);
        assert_eq!(offsets.upper_tone, 47.92);
        assert_eq!(offsets.ascender, -8.65);

        let metrics = MetricSnapshot {
            point_size: 200.0,
            scale: 1.0,
        };
        let offsets = DerivedOffsets::derive(Some(&metrics));
        assert_eq!(offsets.base, -4.0);
        assert_eq!(offsets.upper_tone, 38.8);
        assert_eq!(offsets.ascender, -7.0);

        // Same inputs, same outputs
        assert_eq!(DerivedOffsets::derive(Some(&metrics)), offsets);
    }

    #[test]
    fn test_scale_multiplies_point_size() {
        let metrics = MetricSnapshot {
            point_size: 50.0,
            scale: 2.0,
        };
        assert_eq!(
            DerivedOffsets::derive(Some(&metrics)),
            DerivedOffsets::FALLBACK
        );
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(-3.456), -3.46);
        assert_eq!(round2(2.0), 2.0);
    }
}
