//! Character classes for the Thai script
//!
//! Marks that sit above or below a base consonant are grouped into
//! named classes. Presets and the text scanner only ever ask
//! "is this character in that class?", so membership is plain set lookup.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Thai consonants ก through ฮ (ฤ and ฦ are vowels and are left out)
pub const CONSONANTS: &[char] = &[
    'ก', 'ข', 'ฃ', 'ค', 'ฅ', 'ฆ', 'ง', 'จ', 'ฉ', 'ช',
    'ซ', 'ฌ', 'ญ', 'ฎ', 'ฏ', 'ฐ', 'ฑ', 'ฒ', 'ณ', 'ด',
    'ต', 'ถ', 'ท', 'ธ', 'น', 'บ', 'ป', 'ผ', 'ฝ', 'พ',
    'ฟ', 'ภ', 'ม', 'ย', 'ร', 'ล', 'ว', 'ศ', 'ษ', 'ส',
    'ห', 'ฬ', 'อ', 'ฮ',
];

/// Consonants whose stem rises above the x-height
pub const ASCENDER_CONSONANTS: &[char] = &['ป', 'ฝ', 'ฟ', 'ฬ'];

/// Consonants with a tail below the baseline
pub const DESCENDER_CONSONANTS: &[char] = &['ฎ', 'ฏ'];

pub const UPPER_VOWELS: &[char] = &['\u{0E34}', '\u{0E35}', '\u{0E36}', '\u{0E37}', '\u{0E47}', '\u{0E31}'];

pub const LOWER_VOWELS: &[char] = &['\u{0E38}', '\u{0E39}'];

pub const TONE_MARKS: &[char] = &['\u{0E48}', '\u{0E49}', '\u{0E4A}', '\u{0E4B}'];

/// Sara am (ำ)
pub const SARA_AM: char = '\u{0E33}';

/// Thanthakhat, the cancellation mark (์)
pub const THANTHAKHAT: char = '\u{0E4C}';

/// A named group of characters that share typographic behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CharClass {
    Consonants,
    AscenderConsonants,
    DescenderConsonants,
    UpperVowels,
    LowerVowels,
    ToneMarks,
    SaraAm,
    Thanthakhat,
}

impl CharClass {
    pub const ALL: [CharClass; 8] = [
        CharClass::Consonants,
        CharClass::AscenderConsonants,
        CharClass::DescenderConsonants,
        CharClass::UpperVowels,
        CharClass::LowerVowels,
        CharClass::ToneMarks,
        CharClass::SaraAm,
        CharClass::Thanthakhat,
    ];

    /// Stable kebab-case name
    pub fn name(&self) -> &'static str {
        match self {
            CharClass::Consonants => "consonants",
            CharClass::AscenderConsonants => "ascender-consonants",
            CharClass::DescenderConsonants => "descender-consonants",
            CharClass::UpperVowels => "upper-vowels",
            CharClass::LowerVowels => "lower-vowels",
            CharClass::ToneMarks => "tone-marks",
            CharClass::SaraAm => "sara-am",
            CharClass::Thanthakhat => "thanthakhat",
        }
    }

    /// Built-in Thai members of this class
    pub fn thai_members(&self) -> &'static [char] {
        match self {
            CharClass::Consonants => CONSONANTS,
            CharClass::AscenderConsonants => ASCENDER_CONSONANTS,
            CharClass::DescenderConsonants => DESCENDER_CONSONANTS,
            CharClass::UpperVowels => UPPER_VOWELS,
            CharClass::LowerVowels => LOWER_VOWELS,
            CharClass::ToneMarks => TONE_MARKS,
            CharClass::SaraAm => std::slice::from_ref(&SARA_AM),
            CharClass::Thanthakhat => std::slice::from_ref(&THANTHAKHAT),
        }
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CharClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CharClass::ALL
            .iter()
            .copied()
            .find(|class| class.name() == s)
            .ok_or_else(|| format!("Unknown character class: '{s}'"))
    }
}

/// Partitions characters into [`CharClass`]es.
///
/// The table is fixed once built. [`CharacterClassifier::thai`] is the
/// built-in table; [`CharacterClassifier::with_class`] swaps the members
/// of one class, which is how tests and other scripts supply their own sets.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterClassifier {
    classes: BTreeMap<CharClass, Vec<char>>,
}

impl Default for CharacterClassifier {
    fn default() -> Self {
        Self::thai()
    }
}

impl CharacterClassifier {
    pub fn thai() -> Self {
        let classes = CharClass::ALL
            .iter()
            .map(|class| (*class, class.thai_members().to_vec()))
            .collect();
        Self { classes }
    }

    /// A classifier where every class is empty
    pub fn empty() -> Self {
        let classes = CharClass::ALL.iter().map(|class| (*class, Vec::new())).collect();
        Self { classes }
    }

    /// Replace the members of `class`, keeping their order
    pub fn with_class(mut self, class: CharClass, members: impl IntoIterator<Item = char>) -> Self {
        self.classes.insert(class, members.into_iter().collect());
        self
    }

    /// Members of `class` in their defined order
    pub fn members(&self, class: CharClass) -> &[char] {
        self.classes.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_member(&self, c: char, class: CharClass) -> bool {
        self.members(class).contains(&c)
    }

    /// Every class containing `c`, in [`CharClass::ALL`] order
    pub fn class_of(&self, c: char) -> Vec<CharClass> {
        CharClass::ALL
            .iter()
            .copied()
            .filter(|class| self.is_member(c, *class))
            .collect()
    }

    /// Any glyph that stacks above a consonant: upper vowel, tone mark or thanthakhat
    pub fn is_upper_glyph(&self, c: char) -> bool {
        self.is_member(c, CharClass::UpperVowels)
            || self.is_member(c, CharClass::ToneMarks)
            || self.is_member(c, CharClass::Thanthakhat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thai_table_sizes() {
        let classifier = CharacterClassifier::thai();
        assert_eq!(classifier.members(CharClass::Consonants).len(), 44);
        assert_eq!(classifier.members(CharClass::UpperVowels).len(), 6);
        assert_eq!(classifier.members(CharClass::ToneMarks).len(), 4);
        assert_eq!(classifier.members(CharClass::SaraAm), &['ำ']);
        assert_eq!(classifier.members(CharClass::Thanthakhat), &['์']);
    }

    #[test]
    fn test_class_of_is_stable() {
        let classifier = CharacterClassifier::thai();

        // ป is both a consonant and an ascender consonant
        let first = classifier.class_of('ป');
        assert_eq!(
            first,
            vec![CharClass::Consonants, CharClass::AscenderConsonants]
        );
        assert_eq!(classifier.class_of('ป'), first);

        assert_eq!(classifier.class_of('่'), vec![CharClass::ToneMarks]);
        assert!(classifier.class_of('a').is_empty());
        assert!(classifier.class_of('ฤ').is_empty());
    }

    #[test]
    fn test_upper_glyphs() {
        let classifier = CharacterClassifier::thai();
        assert!(classifier.is_upper_glyph('ิ'));
        assert!(classifier.is_upper_glyph('๋'));
        assert!(classifier.is_upper_glyph('์'));
        assert!(!classifier.is_upper_glyph('ุ'));
        assert!(!classifier.is_upper_glyph('ก'));
    }

    #[test]
    fn test_custom_classes() {
        let classifier = CharacterClassifier::empty()
            .with_class(CharClass::Consonants, ['A', 'B'])
            .with_class(CharClass::UpperVowels, ['X', 'Y']);

        assert!(classifier.is_member('A', CharClass::Consonants));
        assert!(!classifier.is_member('ก', CharClass::Consonants));
        assert_eq!(classifier.members(CharClass::UpperVowels), &['X', 'Y']);
        assert!(classifier.members(CharClass::ToneMarks).is_empty());
    }

    #[test]
    fn test_class_names_round_trip() {
        for class in CharClass::ALL {
            assert_eq!(class.name().parse::<CharClass>(), Ok(class));
        }
        assert!("vowels".parse::<CharClass>().is_err());
    }
}
