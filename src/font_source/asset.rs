//! The font asset and layout host seams
//!
//! The engine never owns a font. It reads metrics and the character table
//! through [`FontAsset`], rewrites the glyph-pair adjustment table through
//! the same trait, and tells dependents about the change through
//! [`LayoutHost`].

use std::fmt;

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

use super::metrics::MetricSnapshot;

/// Index of a glyph inside one font asset
pub type GlyphIndex = u32;

/// Identity of a font asset, used to tag backups
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontHandle(String);

impl FontHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Placement of one glyph within a pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphAdjustment {
    pub glyph_index: GlyphIndex,
    pub placement: Vec2,
}

impl GlyphAdjustment {
    /// A glyph that stays where the layout put it
    pub fn unmoved(glyph_index: GlyphIndex) -> Self {
        Self {
            glyph_index,
            placement: Vec2::ZERO,
        }
    }
}

/// One record of a font's glyph-pair adjustment table.
///
/// Records are values: changing a placement builds a new record with
/// [`GlyphPairAdjustment::with_placement`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphPairAdjustment {
    pub first: GlyphAdjustment,
    pub second: GlyphAdjustment,
}

impl GlyphPairAdjustment {
    /// Shift only the second glyph; the first keeps a zero placement
    pub fn new(first: GlyphIndex, second: GlyphIndex, placement: Vec2) -> Self {
        Self {
            first: GlyphAdjustment::unmoved(first),
            second: GlyphAdjustment {
                glyph_index: second,
                placement,
            },
        }
    }

    /// Same pair with a new second-glyph placement and the first glyph reset
    pub fn with_placement(&self, placement: Vec2) -> Self {
        Self::new(self.first.glyph_index, self.second.glyph_index, placement)
    }

    /// Ordered glyph pair identifying this record
    pub fn key(&self) -> (GlyphIndex, GlyphIndex) {
        (self.first.glyph_index, self.second.glyph_index)
    }
}

/// A font resource owned by the host application
pub trait FontAsset {
    fn handle(&self) -> FontHandle;

    /// Face metrics, if the asset has them
    fn metrics(&self) -> Option<MetricSnapshot>;

    fn lookup(&self, character: char) -> Option<GlyphIndex>;

    fn read_adjustment_table(&self) -> Vec<GlyphPairAdjustment>;

    /// Replace the whole adjustment table
    fn write_adjustment_table(&mut self, records: Vec<GlyphPairAdjustment>) -> anyhow::Result<()>;

    /// Rebuild any caches derived from the tables
    fn refresh_definition(&mut self) -> anyhow::Result<()>;

    fn persist(&mut self) -> anyhow::Result<()>;
}

/// Identifies one piece of laid-out text in the host
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextUserId(pub String);

/// The rendering side of the host: whoever lays out text with a font
pub trait LayoutHost {
    /// Broadcast that `font` changed
    fn notify_property_changed(&mut self, font: &FontHandle);

    fn active_text_users(&self, font: &FontHandle) -> Vec<TextUserId>;

    fn force_relayout(&mut self, user: &TextUserId);
}

/// Host with no dependents, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLayoutHost;

impl LayoutHost for NullLayoutHost {
    fn notify_property_changed(&mut self, _font: &FontHandle) {}

    fn active_text_users(&self, _font: &FontHandle) -> Vec<TextUserId> {
        Vec::new()
    }

    fn force_relayout(&mut self, _user: &TextUserId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_zeroes_first_placement() {
        let record = GlyphPairAdjustment::new(4, 9, Vec2::new(0.0, -2.0));
        assert_eq!(record.first.placement, Vec2::ZERO);
        assert_eq!(record.second.placement, Vec2::new(0.0, -2.0));
        assert_eq!(record.key(), (4, 9));
    }

    #[test]
    fn test_with_placement_resets_first_glyph() {
        let record = GlyphPairAdjustment {
            first: GlyphAdjustment {
                glyph_index: 1,
                placement: Vec2::new(3.0, 3.0),
            },
            second: GlyphAdjustment::unmoved(2),
        };

        let moved = record.with_placement(Vec2::new(0.0, 5.0));
        assert_eq!(moved.key(), (1, 2));
        assert_eq!(moved.first.placement, Vec2::ZERO);
        assert_eq!(moved.second.placement.y, 5.0);
        // Original is untouched
        assert_eq!(record.first.placement, Vec2::new(3.0, 3.0));
    }
}
