//! Built-in rule templates
//!
//! Each preset pairs one group of characters with another and carries the
//! vertical shift for the second glyph. The shift starts from a value
//! derived from font metrics and can be nudged per session.

use std::fmt;
use std::str::FromStr;

use kurbo::Vec2;
use tracing::debug;

use crate::font_source::metrics::{DerivedOffsets, MetricSnapshot};
use crate::script::{CharClass, CharacterClassifier};

/// Where a preset's default Y offset comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OffsetSource {
    Base,
    UpperTone,
    Ascender,
    Literal(f64),
}

impl OffsetSource {
    pub fn resolve(&self, offsets: &DerivedOffsets) -> f64 {
        match self {
            OffsetSource::Base => offsets.base,
            OffsetSource::UpperTone => offsets.upper_tone,
            OffsetSource::Ascender => offsets.ascender,
            OffsetSource::Literal(value) => *value,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OffsetSource::Base => "base",
            OffsetSource::UpperTone => "upper+tone",
            OffsetSource::Ascender => "ascender",
            OffsetSource::Literal(_) => "fixed",
        }
    }
}

/// The eight built-in templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PresetKind {
    ConsonantUpper,
    ConsonantTone,
    ConsonantMark,
    UpperTone,
    UpperMark,
    VowelTone,
    AscenderUpper,
    DescenderLower,
}

impl PresetKind {
    pub const ALL: [PresetKind; 8] = [
        PresetKind::ConsonantUpper,
        PresetKind::ConsonantTone,
        PresetKind::ConsonantMark,
        PresetKind::UpperTone,
        PresetKind::UpperMark,
        PresetKind::VowelTone,
        PresetKind::AscenderUpper,
        PresetKind::DescenderLower,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            PresetKind::ConsonantUpper => "consonant_upper",
            PresetKind::ConsonantTone => "consonant_tone",
            PresetKind::ConsonantMark => "consonant_mark",
            PresetKind::UpperTone => "upper_tone",
            PresetKind::UpperMark => "upper_mark",
            PresetKind::VowelTone => "vowel_tone",
            PresetKind::AscenderUpper => "ascender_upper",
            PresetKind::DescenderLower => "descender_lower",
        }
    }

    /// Human-readable name, also used as the category of generated rules
    pub fn display_name(&self) -> &'static str {
        match self {
            PresetKind::ConsonantUpper => "Consonant + Upper Vowel",
            PresetKind::ConsonantTone => "Consonant + Tone Mark",
            PresetKind::ConsonantMark => "Consonant + Thanthakhat",
            PresetKind::UpperTone => "Upper Vowel + Tone Mark",
            PresetKind::UpperMark => "Upper Vowel + Thanthakhat",
            PresetKind::VowelTone => "Sara Am + Tone Mark",
            PresetKind::AscenderUpper => "Ascender Consonant + Upper Glyph",
            PresetKind::DescenderLower => "Descender Consonant + Lower Vowel",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PresetKind::ConsonantUpper => "Every consonant (ก-ฮ) + upper vowel (ิ ี ึ ื ั ็)",
            PresetKind::ConsonantTone => "Every consonant (ก-ฮ) + tone mark (่ ้ ๊ ๋)",
            PresetKind::ConsonantMark => "Every consonant (ก-ฮ) + ์",
            PresetKind::UpperTone => "Upper vowel (ิ ี ึ ื ั ็) + tone mark (่ ้ ๊ ๋)",
            PresetKind::UpperMark => "Upper vowel (ิ ี ึ ื ั ็) + ์",
            PresetKind::VowelTone => "Sara am (ำ) + tone mark (่ ้ ๊ ๋)",
            PresetKind::AscenderUpper => "Ascender consonant (ป ฝ ฟ ฬ) + upper vowel, tone mark or ์",
            PresetKind::DescenderLower => "Descender consonant (ฎ ฏ) + lower vowel (ุ ู)",
        }
    }

    /// Classes supplying the first character of each pair
    pub fn first_classes(&self) -> &'static [CharClass] {
        match self {
            PresetKind::ConsonantUpper | PresetKind::ConsonantTone | PresetKind::ConsonantMark => {
                &[CharClass::Consonants]
            }
            PresetKind::UpperTone | PresetKind::UpperMark => &[CharClass::UpperVowels],
            PresetKind::VowelTone => &[CharClass::SaraAm],
            PresetKind::AscenderUpper => &[CharClass::AscenderConsonants],
            PresetKind::DescenderLower => &[CharClass::DescenderConsonants],
        }
    }

    /// Classes supplying the second character, flattened in this order
    pub fn second_classes(&self) -> &'static [CharClass] {
        match self {
            PresetKind::ConsonantUpper => &[CharClass::UpperVowels],
            PresetKind::ConsonantTone | PresetKind::UpperTone | PresetKind::VowelTone => {
                &[CharClass::ToneMarks]
            }
            PresetKind::ConsonantMark | PresetKind::UpperMark => &[CharClass::Thanthakhat],
            PresetKind::AscenderUpper => &[
                CharClass::UpperVowels,
                CharClass::ToneMarks,
                CharClass::Thanthakhat,
            ],
            PresetKind::DescenderLower => &[CharClass::LowerVowels],
        }
    }

    pub fn offset_source(&self) -> OffsetSource {
        match self {
            PresetKind::ConsonantUpper | PresetKind::ConsonantTone | PresetKind::ConsonantMark => {
                OffsetSource::Base
            }
            PresetKind::UpperTone | PresetKind::UpperMark | PresetKind::VowelTone => {
                OffsetSource::UpperTone
            }
            PresetKind::AscenderUpper => OffsetSource::Ascender,
            PresetKind::DescenderLower => OffsetSource::Literal(2.0),
        }
    }

    /// Number of pairs this preset expands to with `classifier`
    pub fn pair_count(&self, classifier: &CharacterClassifier) -> usize {
        let count = |classes: &[CharClass]| -> usize {
            classes.iter().map(|class| classifier.members(*class).len()).sum()
        };
        count(self.first_classes()) * count(self.second_classes())
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PresetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| {
                let available: Vec<&str> = PresetKind::ALL.iter().map(|kind| kind.id()).collect();
                format!(
                    "Unknown preset: '{s}'\nAvailable presets: {}",
                    available.join(", ")
                )
            })
    }
}

/// A preset with its current offsets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetConfig {
    pub kind: PresetKind,
    pub default_x: f64,
    pub default_y: f64,
    /// Session tweak added on top of the default
    pub offset_x: f64,
    pub offset_y: f64,
}

impl PresetConfig {
    fn derived(kind: PresetKind, offsets: &DerivedOffsets) -> Self {
        Self {
            kind,
            // Only vertical collisions are corrected
            default_x: 0.0,
            default_y: kind.offset_source().resolve(offsets),
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn final_x(&self) -> f64 {
        self.default_x + self.offset_x
    }

    pub fn final_y(&self) -> f64 {
        self.default_y + self.offset_y
    }

    pub fn final_placement(&self) -> Vec2 {
        Vec2::new(self.final_x(), self.final_y())
    }

    pub fn display_name(&self) -> &'static str {
        self.kind.display_name()
    }
}

/// All eight presets, in [`PresetKind::ALL`] order
#[derive(Debug, Clone, PartialEq)]
pub struct PresetCatalog {
    presets: Vec<PresetConfig>,
    offsets: DerivedOffsets,
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PresetCatalog {
    pub fn new(metrics: Option<&MetricSnapshot>) -> Self {
        let offsets = DerivedOffsets::derive(metrics);
        let presets = PresetKind::ALL
            .iter()
            .map(|kind| PresetConfig::derived(*kind, &offsets))
            .collect();
        Self { presets, offsets }
    }

    /// Re-derive default offsets from `metrics`. Session offsets are kept.
    pub fn recalculate(&mut self, metrics: Option<&MetricSnapshot>) {
        self.offsets = DerivedOffsets::derive(metrics);
        for preset in &mut self.presets {
            let derived = PresetConfig::derived(preset.kind, &self.offsets);
            preset.default_x = derived.default_x;
            preset.default_y = derived.default_y;
        }
        debug!(
            "Recalculated presets - base: {}, upper+tone: {}, ascender: {}",
            self.offsets.base, self.offsets.upper_tone, self.offsets.ascender
        );
    }

    /// Offsets the defaults were last derived from
    pub fn offsets(&self) -> DerivedOffsets {
        self.offsets
    }

    pub fn get(&self, kind: PresetKind) -> &PresetConfig {
        &self.presets[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PresetConfig> {
        self.presets.iter()
    }

    pub fn set_offset(&mut self, kind: PresetKind, offset_x: f64, offset_y: f64) {
        let preset = &mut self.presets[kind.index()];
        preset.offset_x = offset_x;
        preset.offset_y = offset_y;
    }

    pub fn set_default(&mut self, kind: PresetKind, default_x: f64, default_y: f64) {
        let preset = &mut self.presets[kind.index()];
        preset.default_x = default_x;
        preset.default_y = default_y;
    }

    /// Pairs produced by expanding every preset, before deduplication
    pub fn expected_pair_count(&self, classifier: &CharacterClassifier) -> usize {
        self.presets
            .iter()
            .map(|preset| preset.kind.pair_count(classifier))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_defaults() {
        let catalog = PresetCatalog::new(None);

        assert_eq!(catalog.get(PresetKind::ConsonantUpper).final_y(), -2.0);
        assert_eq!(catalog.get(PresetKind::UpperTone).final_y(), 19.4);
        assert_eq!(catalog.get(PresetKind::VowelTone).final_y(), 19.4);
        assert_eq!(catalog.get(PresetKind::AscenderUpper).final_y(), -3.5);
        assert_eq!(catalog.get(PresetKind::DescenderLower).final_y(), 2.0);
        assert!(catalog.iter().all(|preset| preset.final_x() == 0.0));
    }

    #[test]
    fn test_catalog_order_matches_kinds() {
        let catalog = PresetCatalog::default();
        let kinds: Vec<PresetKind> = catalog.iter().map(|preset| preset.kind).collect();
        assert_eq!(kinds, PresetKind::ALL.to_vec());
    }

    #[test]
    fn test_recalculate_keeps_session_offsets() {
        let mut catalog = PresetCatalog::new(None);
        catalog.set_offset(PresetKind::ConsonantTone, 0.5, -1.0);

        let metrics = MetricSnapshot {
            point_size: 200.0,
            scale: 1.0,
        };
        catalog.recalculate(Some(&metrics));
        catalog.recalculate(Some(&metrics));

        let preset = catalog.get(PresetKind::ConsonantTone);
        assert_eq!(preset.default_y, -4.0);
        assert_eq!(preset.offset_x, 0.5);
        assert_eq!(preset.final_y(), -5.0);
        assert_eq!(preset.final_placement(), Vec2::new(0.5, -5.0));
        assert_eq!(catalog.offsets().upper_tone, 38.8);
    }

    #[test]
    fn test_literal_offset_ignores_metrics() {
        let metrics = MetricSnapshot {
            point_size: 500.0,
            scale: 1.0,
        };
        let catalog = PresetCatalog::new(Some(&metrics));
        assert_eq!(catalog.get(PresetKind::DescenderLower).default_y, 2.0);
    }

    #[test]
    fn test_expected_pair_count_for_thai() {
        let classifier = CharacterClassifier::thai();
        let catalog = PresetCatalog::default();

        assert_eq!(PresetKind::ConsonantUpper.pair_count(&classifier), 264);
        assert_eq!(PresetKind::AscenderUpper.pair_count(&classifier), 44);
        assert_eq!(catalog.expected_pair_count(&classifier), 566);
    }

    #[test]
    fn test_parse_preset_ids() {
        for kind in PresetKind::ALL {
            assert_eq!(kind.id().parse::<PresetKind>(), Ok(kind));
        }
        let error = "consonant_lower".parse::<PresetKind>().unwrap_err();
        assert!(error.contains("descender_lower"));
    }
}
