//! Expands presets into concrete character-pair rules

use tracing::debug;

use super::presets::{PresetCatalog, PresetConfig};
use super::rule::AdjustmentRule;
use crate::script::{CharClass, CharacterClassifier};

fn flatten<'a>(
    classifier: &'a CharacterClassifier,
    classes: &'a [CharClass],
) -> impl Iterator<Item = char> + 'a {
    classes
        .iter()
        .flat_map(move |class| classifier.members(*class).iter().copied())
}

/// Every pair of `preset`, first-class major, stamped with the preset's
/// final placement and display name
pub fn expand(preset: &PresetConfig, classifier: &CharacterClassifier) -> Vec<AdjustmentRule> {
    let placement = preset.final_placement();
    let category = preset.display_name();
    let seconds: Vec<char> = flatten(classifier, preset.kind.second_classes()).collect();

    let rules: Vec<AdjustmentRule> = flatten(classifier, preset.kind.first_classes())
        .flat_map(|first| {
            seconds
                .iter()
                .map(move |second| AdjustmentRule::new(first, *second, placement, category))
        })
        .collect();

    debug!(
        "Expanded preset {} into {} rules at ({}, {})",
        preset.kind,
        rules.len(),
        placement.x,
        placement.y
    );
    rules
}

/// Expand every preset in catalog order
pub fn expand_all(catalog: &PresetCatalog, classifier: &CharacterClassifier) -> Vec<AdjustmentRule> {
    catalog
        .iter()
        .flat_map(|preset| expand(preset, classifier))
        .collect()
}
