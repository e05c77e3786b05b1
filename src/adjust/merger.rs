//! Merges rules into a font's glyph-pair adjustment table
//!
//! Merging is split in two so a failed batch never leaves a half-written
//! table behind: [`merge_rules`] builds the new table in memory, and
//! [`commit_table`] writes it in one call. [`publish_changes`] then runs the
//! collaborator refresh hooks once for the whole batch.

use std::collections::HashMap;

use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::errors::{AdjustError, AdjustResult};
use crate::font_source::{FontAsset, GlyphIndex, GlyphPairAdjustment, LayoutHost};
use crate::rules::AdjustmentRule;

/// Number of table records logged after a merge
pub const VERIFY_SAMPLE: usize = 5;

/// Tally of a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub added: usize,
    pub updated: usize,
    /// Rules with a character missing from the font
    pub skipped: usize,
}

impl MergeReport {
    /// Rules that reached the table
    pub fn applied(&self) -> usize {
        self.added + self.updated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Added,
    Updated,
}

/// An adjustment table indexed by ordered glyph pair
#[derive(Debug, Clone, Default)]
pub struct AdjustmentTable {
    records: Vec<GlyphPairAdjustment>,
    index: HashMap<(GlyphIndex, GlyphIndex), usize>,
}

impl AdjustmentTable {
    /// Index existing records. Later duplicates of a pair are dropped so
    /// the table holds one record per ordered pair.
    pub fn new(records: Vec<GlyphPairAdjustment>) -> Self {
        let mut table = Self::default();
        for record in records {
            if table.index.contains_key(&record.key()) {
                warn!(
                    "Dropping duplicate adjustment record for glyphs #{} + #{}",
                    record.first.glyph_index, record.second.glyph_index
                );
                continue;
            }
            table.index.insert(record.key(), table.records.len());
            table.records.push(record);
        }
        table
    }

    /// Replace the placement of an existing pair or append a new record
    pub fn upsert(&mut self, first: GlyphIndex, second: GlyphIndex, placement: Vec2) -> Upsert {
        match self.index.get(&(first, second)) {
            Some(&position) => {
                self.records[position] = self.records[position].with_placement(placement);
                Upsert::Updated
            }
            None => {
                self.index.insert((first, second), self.records.len());
                self.records
                    .push(GlyphPairAdjustment::new(first, second, placement));
                Upsert::Added
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<GlyphPairAdjustment> {
        self.records
    }
}

/// Glyphs for both characters of `rule`
pub fn resolve(font: &dyn FontAsset, rule: &AdjustmentRule) -> AdjustResult<(GlyphIndex, GlyphIndex)> {
    let first = font
        .lookup(rule.first)
        .ok_or(AdjustError::GlyphNotFound(rule.first))?;
    let second = font
        .lookup(rule.second)
        .ok_or(AdjustError::GlyphNotFound(rule.second))?;
    Ok((first, second))
}

/// Build the table that results from applying `rules` to the font's
/// current table. The font is not modified.
pub fn merge_rules<'a>(
    font: &dyn FontAsset,
    rules: impl IntoIterator<Item = &'a AdjustmentRule>,
) -> (AdjustmentTable, MergeReport) {
    let mut table = AdjustmentTable::new(font.read_adjustment_table());
    let mut report = MergeReport::default();

    for rule in rules {
        let (first, second) = match resolve(font, rule) {
            Ok(glyphs) => glyphs,
            Err(e) => {
                warn!("Skipped: {rule} ({e})");
                report.skipped += 1;
                continue;
            }
        };

        let outcome = table.upsert(first, second, rule.placement());
        match outcome {
            Upsert::Added => report.added += 1,
            Upsert::Updated => report.updated += 1,
        }
        debug!(
            "{:?} pair: {} (#{first}) + {} (#{second}) -> X:{}, Y:{}",
            outcome, rule.first, rule.second, rule.x_placement, rule.y_placement
        );
    }

    (table, report)
}

/// Write a merged table back to the font
pub fn commit_table(font: &mut dyn FontAsset, table: AdjustmentTable) -> AdjustResult<()> {
    font.write_adjustment_table(table.into_records())
        .map_err(|e| AdjustError::collaborator("Writing adjustment table", e))
}

/// Refresh the font definition, notify dependents, save the font and
/// relayout any text using it. Returns the number of text users refreshed.
pub fn publish_changes(font: &mut dyn FontAsset, host: &mut dyn LayoutHost) -> AdjustResult<usize> {
    font.refresh_definition()
        .map_err(|e| AdjustError::collaborator("Refreshing font definition", e))?;

    let handle = font.handle();
    host.notify_property_changed(&handle);

    font.persist()
        .map_err(|e| AdjustError::collaborator("Saving font asset", e))?;

    let users = host.active_text_users(&handle);
    for user in &users {
        host.force_relayout(user);
    }
    if !users.is_empty() {
        info!("Refreshed {} text components using {}", users.len(), handle);
    }
    Ok(users.len())
}

/// Log the first few records so a human can sanity-check a merge
pub fn verify_table(font: &dyn FontAsset) {
    let records = font.read_adjustment_table();
    info!("Verifying {} pairs in font asset...", records.len());
    for (i, record) in records.iter().take(VERIFY_SAMPLE).enumerate() {
        info!(
            "  Pair #{i}: Glyph {} + Glyph {} -> Second placement: X={}, Y={}",
            record.first.glyph_index,
            record.second.glyph_index,
            record.second.placement.x,
            record.second.placement.y
        );
    }
}

/// Merge `rules` into the font and publish the change once
pub fn apply_rules<'a>(
    font: &mut dyn FontAsset,
    host: &mut dyn LayoutHost,
    rules: impl IntoIterator<Item = &'a AdjustmentRule>,
) -> AdjustResult<MergeReport> {
    let (table, report) = merge_rules(&*font, rules);
    let total = table.len();
    commit_table(font, table)?;
    publish_changes(font, host)?;
    verify_table(&*font);

    info!(
        "Applied adjustments to {}: {} new, {} updated, {} skipped ({} pairs in table)",
        font.handle(),
        report.added,
        report.updated,
        report.skipped,
        total
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_source::FontAssetDocument;
    use crate::tests::RecordingHost;

    fn font() -> FontAssetDocument {
        FontAssetDocument::new("Test").with_characters([('A', 1), ('X', 2), ('Y', 3)])
    }

    fn rule(first: char, second: char, y: f64) -> AdjustmentRule {
        AdjustmentRule::new(first, second, Vec2::new(0.0, y), "test")
    }

    #[test]
    fn test_new_pair_is_added() {
        let mut font = font();
        let mut host = RecordingHost::default();

        let report = apply_rules(&mut font, &mut host, &[rule('A', 'X', -2.0)]).unwrap();
        assert_eq!(report, MergeReport { added: 1, updated: 0, skipped: 0 });

        let table = font.read_adjustment_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].key(), (1, 2));
        assert_eq!(table[0].first.placement, Vec2::ZERO);
        assert_eq!(table[0].second.placement, Vec2::new(0.0, -2.0));
    }

    #[test]
    fn test_existing_pair_is_updated_in_place() {
        let mut font = font();
        let mut host = RecordingHost::default();
        apply_rules(&mut font, &mut host, &[rule('A', 'X', -2.0), rule('A', 'Y', -2.0)]).unwrap();

        let report = apply_rules(&mut font, &mut host, &[rule('A', 'X', 7.5)]).unwrap();
        assert_eq!(report, MergeReport { added: 0, updated: 1, skipped: 0 });

        let table = font.read_adjustment_table();
        assert_eq!(table.len(), 2);
        // Position in the table is kept
        assert_eq!(table[0].key(), (1, 2));
        assert_eq!(table[0].second.placement.y, 7.5);
    }

    #[test]
    fn test_update_zeroes_first_placement() {
        let existing = GlyphPairAdjustment {
            first: crate::font_source::GlyphAdjustment {
                glyph_index: 1,
                placement: Vec2::new(4.0, 4.0),
            },
            second: crate::font_source::GlyphAdjustment::unmoved(2),
        };
        let mut font = font().with_adjustments(vec![existing]);
        let mut host = RecordingHost::default();

        apply_rules(&mut font, &mut host, &[rule('A', 'X', 1.0)]).unwrap();
        let table = font.read_adjustment_table();
        assert_eq!(table[0].first.placement, Vec2::ZERO);
    }

    #[test]
    fn test_missing_glyph_is_skipped() {
        let mut font = font();
        let mut host = RecordingHost::default();

        let report = apply_rules(
            &mut font,
            &mut host,
            &[rule('A', 'Q', 1.0), rule('Q', 'X', 1.0), rule('A', 'Y', 1.0)],
        )
        .unwrap();
        assert_eq!(report, MergeReport { added: 1, updated: 0, skipped: 2 });
        assert_eq!(report.applied(), 1);
        assert_eq!(font.read_adjustment_table().len(), 1);
    }

    #[test]
    fn test_hooks_run_once_per_merge() {
        let mut font = font();
        let mut host = RecordingHost::with_users(&["label", "title"]);

        apply_rules(
            &mut font,
            &mut host,
            &[rule('A', 'X', 1.0), rule('A', 'Y', 1.0), rule('X', 'Y', 1.0)],
        )
        .unwrap();

        assert_eq!(font.revision(), 1);
        assert_eq!(host.notifications.len(), 1);
        assert_eq!(host.notifications[0], font.handle());
        assert_eq!(host.relayouts.len(), 2);
    }

    #[test]
    fn test_merge_rules_leaves_font_untouched() {
        let font = font();
        let (table, report) = merge_rules(&font, &[rule('A', 'X', 1.0)]);
        assert_eq!(report.added, 1);
        assert_eq!(table.len(), 1);
        assert!(font.read_adjustment_table().is_empty());
    }

    #[test]
    fn test_table_drops_duplicate_pairs() {
        let table = AdjustmentTable::new(vec![
            GlyphPairAdjustment::new(1, 2, Vec2::new(0.0, 1.0)),
            GlyphPairAdjustment::new(1, 2, Vec2::new(0.0, 9.0)),
            GlyphPairAdjustment::new(2, 1, Vec2::ZERO),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.into_records()[0].second.placement.y, 1.0);
    }

    #[test]
    fn test_resolve_reports_missing_character() {
        let font = font();
        let error = resolve(&font, &rule('A', 'Z', 0.0)).unwrap_err();
        assert!(matches!(error, AdjustError::GlyphNotFound('Z')));
    }
}
