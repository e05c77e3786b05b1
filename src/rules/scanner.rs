//! Discovers adjustable pairs in free-form sample text
//!
//! A heuristic pass: it misses pairs whose marks are not adjacent to their
//! base, but it never proposes a pair outside the three shapes that
//! actually collide.

use kurbo::Vec2;
use tracing::debug;

use super::rule::AdjustmentRule;
use crate::script::{CharClass, CharacterClassifier};

/// Category given to rules found in text
pub const SCANNED_CATEGORY: &str = "from text";

/// Placement given to rules found in text
pub const SCANNED_PLACEMENT: Vec2 = Vec2::new(0.0, -2.0);

/// Whether `second` following `first` is a pair worth adjusting
pub fn is_adjustable_pair(first: char, second: char, classifier: &CharacterClassifier) -> bool {
    let consonant = classifier.is_member(first, CharClass::Consonants);

    // Consonant + anything stacked above it
    if consonant && classifier.is_upper_glyph(second) {
        return true;
    }

    // Upper vowel + tone mark or thanthakhat
    if classifier.is_member(first, CharClass::UpperVowels)
        && (classifier.is_member(second, CharClass::ToneMarks)
            || classifier.is_member(second, CharClass::Thanthakhat))
    {
        return true;
    }

    // Consonant + lower vowel
    consonant && classifier.is_member(second, CharClass::LowerVowels)
}

/// Adjacent adjustable pairs inside each whitespace-separated word.
///
/// Rules are named after the word they came from. The same pair may be
/// returned more than once; inserting into a
/// [`RuleSet`](super::rule_set::RuleSet) drops the repeats.
pub fn scan(text: &str, classifier: &CharacterClassifier) -> Vec<AdjustmentRule> {
    let mut rules = Vec::new();

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for window in chars.windows(2) {
            let (first, second) = (window[0], window[1]);
            if is_adjustable_pair(first, second, classifier) {
                rules.push(
                    AdjustmentRule::new(first, second, SCANNED_PLACEMENT, SCANNED_CATEGORY)
                        .named(word),
                );
            }
        }
    }

    debug!("Scanned sample text, found {} candidate pairs", rules.len());
    rules
}
