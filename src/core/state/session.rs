//! The editing session
//!
//! A [`Session`] holds everything one adjustment workflow needs: the
//! selected font, the presets, the working rule set, the undo backup and
//! the batch guard. Front ends own a session and pass it to each step.

use tracing::{error, info, warn};

use crate::adjust::batch::{BatchGuard, BatchProgress, BatchReport, BatchStage};
use crate::adjust::merger::{self, MergeReport};
use crate::adjust::{Backup, BackupLedger};
use crate::core::errors::{AdjustError, AdjustResult};
use crate::font_source::{FontAsset, FontHandle, LayoutHost};
use crate::rules::{self, GenerationReport, PresetCatalog, PresetKind, RuleSet};
use crate::script::CharacterClassifier;

#[derive(Default)]
pub struct Session {
    font: Option<Box<dyn FontAsset>>,
    classifier: CharacterClassifier,
    catalog: PresetCatalog,
    rules: RuleSet,
    backups: BackupLedger,
    guard: BatchGuard,
    stage: Option<BatchStage>,
}

fn stage_failed(stage: BatchStage, counts: MergeReport, source: AdjustError) -> AdjustError {
    AdjustError::BatchFailed {
        stage,
        counts,
        source: Box::new(source),
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that classifies characters with `classifier`
    pub fn with_classifier(classifier: CharacterClassifier) -> Self {
        Self {
            classifier,
            ..Self::default()
        }
    }

    /// Switch to `font`. The rule set is cleared and preset defaults are
    /// re-derived from the new metrics; session offsets survive.
    pub fn select_font(&mut self, font: Box<dyn FontAsset>) {
        info!("Selected font asset {}", font.handle());
        self.catalog.recalculate(font.metrics().as_ref());
        self.rules.clear();
        self.font = Some(font);
    }

    pub fn clear_font(&mut self) {
        self.font = None;
        self.rules.clear();
        self.catalog.recalculate(None);
    }

    pub fn font(&self) -> Option<&dyn FontAsset> {
        self.font.as_deref()
    }

    pub fn font_handle(&self) -> Option<FontHandle> {
        self.font.as_ref().map(|font| font.handle())
    }

    /// Display name for the current font
    pub fn get_font_display_name(&self) -> String {
        self.font_handle()
            .map(|handle| handle.to_string())
            .unwrap_or_else(|| "No font selected".to_string())
    }

    pub fn classifier(&self) -> &CharacterClassifier {
        &self.classifier
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut PresetCatalog {
        &mut self.catalog
    }

    /// Re-derive preset defaults from the current font
    pub fn recalculate_presets(&mut self) {
        let metrics = self.font.as_ref().and_then(|font| font.metrics());
        self.catalog.recalculate(metrics.as_ref());
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    pub fn backups(&self) -> &BackupLedger {
        &self.backups
    }

    pub fn backups_mut(&mut self) -> &mut BackupLedger {
        &mut self.backups
    }

    /// Stage of the running batch, `Idle` when none is running
    pub fn stage(&self) -> BatchStage {
        self.stage.unwrap_or(BatchStage::Idle)
    }

    /// Whether undo would restore onto the current font
    pub fn can_undo(&self) -> bool {
        self.font_handle()
            .is_some_and(|handle| self.backups.can_restore(&handle))
    }

    /// Add the rules of one preset
    pub fn generate(&mut self, kind: PresetKind) -> GenerationReport {
        if self.font.is_none() {
            return GenerationReport::default();
        }
        let report = self
            .rules
            .extend(rules::expand(self.catalog.get(kind), &self.classifier));
        info!(
            "{}: added {} rules, {} already present",
            kind.display_name(),
            report.added,
            report.skipped
        );
        report
    }

    /// Add the rules of every preset
    pub fn generate_all(&mut self) -> GenerationReport {
        if self.font.is_none() {
            return GenerationReport::default();
        }
        let report = self
            .rules
            .extend(rules::expand_all(&self.catalog, &self.classifier));
        info!(
            "Generated all presets: {} new rules, {} total",
            report.added,
            self.rules.len()
        );
        report
    }

    /// Add the pairs found in `text`
    pub fn scan_text(&mut self, text: &str) -> GenerationReport {
        if self.font.is_none() {
            return GenerationReport::default();
        }
        let report = self.rules.extend(rules::scan(text, &self.classifier));
        if report.added == 0 {
            warn!("No adjustable character pairs found in sample text");
        }
        report
    }

    /// Snapshot the current font's table for undo
    pub fn backup(&mut self) -> AdjustResult<&Backup> {
        let font = self.font.as_deref().ok_or(AdjustError::ResourceAbsent)?;
        Ok(self.backups.snapshot(font))
    }

    /// Back up, then merge the selected rules into the font
    pub fn apply_selected(&mut self, host: &mut dyn LayoutHost) -> AdjustResult<MergeReport> {
        let Some(font) = self.font.as_deref_mut() else {
            return Ok(MergeReport::default());
        };
        self.backups.snapshot(&*font);
        merger::apply_rules(font, host, self.rules.selected())
    }

    /// Restore the table captured before the last merge
    pub fn undo(&mut self, host: &mut dyn LayoutHost) -> AdjustResult<usize> {
        let font = self.font.as_deref_mut().ok_or(AdjustError::ResourceAbsent)?;
        self.backups.restore(font, host)
    }

    /// One-click fix: back up, regenerate every preset, merge all rules and
    /// refresh dependents. `progress` is called as each stage starts.
    ///
    /// On failure the backup taken in the first stage stays available.
    pub fn run_auto_fix(
        &mut self,
        host: &mut dyn LayoutHost,
        progress: &mut dyn FnMut(&BatchProgress),
    ) -> AdjustResult<BatchReport> {
        if self.font.is_none() {
            info!("No font asset selected, nothing to fix");
            return Ok(BatchReport::default());
        }
        self.guard.begin()?;

        let result = self.run_stages(host, progress);
        match &result {
            Ok(report) => {
                progress(&BatchProgress::finished());
                info!(
                    "Font adjustment complete: {} pairs in table ({} added, {} updated, {} skipped)",
                    report.total_records,
                    report.merged.added,
                    report.merged.updated,
                    report.merged.skipped
                );
            }
            Err(e) => {
                self.enter(BatchStage::Failed, progress);
                error!("Font adjustment failed: {e}");
            }
        }

        self.stage = None;
        self.guard.end();
        result
    }

    fn enter(&mut self, stage: BatchStage, progress: &mut dyn FnMut(&BatchProgress)) {
        self.stage = Some(stage);
        progress(&BatchProgress::starting(stage));
    }

    fn run_stages(
        &mut self,
        host: &mut dyn LayoutHost,
        progress: &mut dyn FnMut(&BatchProgress),
    ) -> AdjustResult<BatchReport> {
        let mut report = BatchReport::default();

        self.enter(BatchStage::BackingUp, progress);
        let font = self.font.as_deref().ok_or(AdjustError::ResourceAbsent)?;
        self.backups.snapshot(font);

        self.enter(BatchStage::Generating, progress);
        self.rules.clear();
        report.generated = self
            .rules
            .extend(rules::expand_all(&self.catalog, &self.classifier));

        self.enter(BatchStage::Merging, progress);
        let font = self
            .font
            .as_deref_mut()
            .ok_or_else(|| stage_failed(BatchStage::Merging, report.merged, AdjustError::ResourceAbsent))?;
        let (table, merged) = merger::merge_rules(&*font, self.rules.selected());
        report.merged = merged;
        merger::commit_table(font, table)
            .map_err(|e| stage_failed(BatchStage::Merging, merged, e))?;

        self.enter(BatchStage::Notifying, progress);
        let font = self
            .font
            .as_deref_mut()
            .ok_or_else(|| stage_failed(BatchStage::Notifying, merged, AdjustError::ResourceAbsent))?;
        report.relayouts = merger::publish_changes(font, host)
            .map_err(|e| stage_failed(BatchStage::Notifying, merged, e))?;
        merger::verify_table(&*font);
        report.total_records = font.read_adjustment_table().len();

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_source::FontAssetDocument;
    use crate::tests::{thai_font, FailingFont, RecordingHost};

    #[test]
    fn test_no_font_means_no_work() {
        let mut session = Session::new();
        let mut host = RecordingHost::default();

        assert_eq!(session.generate_all(), GenerationReport::default());
        assert_eq!(session.scan_text("ปิ่น"), GenerationReport::default());
        assert_eq!(
            session.apply_selected(&mut host).unwrap(),
            MergeReport::default()
        );
        assert_eq!(
            session.run_auto_fix(&mut host, &mut |_| {}).unwrap(),
            BatchReport::default()
        );
        assert!(matches!(
            session.undo(&mut host),
            Err(AdjustError::ResourceAbsent)
        ));
        assert!(host.notifications.is_empty());
    }

    #[test]
    fn test_select_font_recalculates_and_clears() {
        let mut session = Session::new();
        session.select_font(Box::new(FontAssetDocument::new("Small")));
        session.catalog_mut().set_offset(PresetKind::ConsonantUpper, 0.0, 1.0);
        session.generate(PresetKind::ConsonantUpper);
        assert_eq!(session.rules().len(), 264);

        session.select_font(Box::new(thai_font(200.0)));
        assert!(session.rules().is_empty());
        let preset = session.catalog().get(PresetKind::ConsonantUpper);
        assert_eq!(preset.default_y, -4.0);
        assert_eq!(preset.final_y(), -3.0);
    }

    #[test]
    fn test_auto_fix_runs_stages_in_order() {
        let mut session = Session::new();
        let mut host = RecordingHost::with_users(&["title"]);
        session.select_font(Box::new(thai_font(100.0)));

        let mut events = Vec::new();
        let report = session
            .run_auto_fix(&mut host, &mut |event| events.push(*event))
            .unwrap();

        let stages: Vec<BatchStage> = events.iter().map(|event| event.stage).collect();
        assert_eq!(
            stages,
            vec![
                BatchStage::BackingUp,
                BatchStage::Generating,
                BatchStage::Merging,
                BatchStage::Notifying,
                BatchStage::Idle,
            ]
        );
        assert_eq!(events.last().map(|event| event.fraction), Some(1.0));

        assert_eq!(report.generated.added, 522);
        assert_eq!(report.merged.added, 522);
        assert_eq!(report.merged.skipped, 0);
        assert_eq!(report.total_records, 522);
        assert_eq!(report.relayouts, 1);
        assert_eq!(host.notifications.len(), 1);
        assert_eq!(session.stage(), BatchStage::Idle);
        assert!(session.can_undo());
    }

    #[test]
    fn test_auto_fix_twice_updates_instead_of_adding() {
        let mut session = Session::new();
        let mut host = RecordingHost::default();
        session.select_font(Box::new(thai_font(100.0)));

        session.run_auto_fix(&mut host, &mut |_| {}).unwrap();
        let second = session.run_auto_fix(&mut host, &mut |_| {}).unwrap();
        assert_eq!(second.merged.added, 0);
        assert_eq!(second.merged.updated, 522);
        assert_eq!(second.total_records, 522);
    }

    #[test]
    fn test_undo_after_auto_fix_restores_table() {
        let mut session = Session::new();
        let mut host = RecordingHost::default();
        session.select_font(Box::new(thai_font(100.0)));
        let before = session.font().unwrap().read_adjustment_table();

        session.run_auto_fix(&mut host, &mut |_| {}).unwrap();
        assert_ne!(session.font().unwrap().read_adjustment_table(), before);

        assert_eq!(session.undo(&mut host).unwrap(), before.len());
        assert_eq!(session.font().unwrap().read_adjustment_table(), before);
        assert!(!session.can_undo());
        assert!(matches!(
            session.undo(&mut host),
            Err(AdjustError::Precondition(_))
        ));
    }

    #[test]
    fn test_failed_merge_keeps_backup_and_table() {
        let mut session = Session::new();
        let mut host = RecordingHost::default();
        let font = FailingFont::new(thai_font(100.0)).failing_writes();
        session.select_font(Box::new(font));
        let before = session.font().unwrap().read_adjustment_table();

        let mut stages = Vec::new();
        let error = session
            .run_auto_fix(&mut host, &mut |event| stages.push(event.stage))
            .unwrap_err();

        match error {
            AdjustError::BatchFailed { stage, counts, .. } => {
                assert_eq!(stage, BatchStage::Merging);
                assert_eq!(counts.added, 522);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stages.last(), Some(&BatchStage::Failed));
        assert_eq!(session.font().unwrap().read_adjustment_table(), before);
        assert!(session.can_undo());
        assert!(host.notifications.is_empty());

        // The guard was released, so a retry fails on the font again
        assert_eq!(session.stage(), BatchStage::Idle);
        assert!(matches!(
            session.run_auto_fix(&mut host, &mut |_| {}),
            Err(AdjustError::BatchFailed { .. })
        ));
    }

    #[test]
    fn test_failed_save_reports_notifying_stage() {
        let mut session = Session::new();
        let mut host = RecordingHost::default();
        session.select_font(Box::new(FailingFont::new(thai_font(100.0)).failing_saves()));

        let error = session.run_auto_fix(&mut host, &mut |_| {}).unwrap_err();
        assert!(matches!(
            error,
            AdjustError::BatchFailed {
                stage: BatchStage::Notifying,
                ..
            }
        ));
    }

    #[test]
    fn test_apply_selected_only_merges_selected_rules() {
        let mut session = Session::new();
        let mut host = RecordingHost::default();
        session.select_font(Box::new(thai_font(100.0)));

        session.scan_text("ปิ่น ป้า");
        assert_eq!(session.rules().len(), 3);
        session.rules_mut().set_selected(('ป', '้'), false);

        let report = session.apply_selected(&mut host).unwrap();
        assert_eq!(report.added, 2);
        assert_eq!(session.font().unwrap().read_adjustment_table().len(), 2);
        assert!(session.can_undo());
    }
}
