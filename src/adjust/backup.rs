//! Single-level undo for adjustment merges
//!
//! A [`Backup`] is a full copy of a font's adjustment table, tagged with the
//! font it came from. The ledger keeps at most one and refuses to restore it
//! onto any other font.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::merger::publish_changes;
use crate::core::errors::{AdjustError, AdjustResult, ThaikernContext};
use crate::font_source::{FontAsset, FontHandle, GlyphPairAdjustment, LayoutHost};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    font: FontHandle,
    records: Vec<GlyphPairAdjustment>,
    taken_at: DateTime<Utc>,
}

impl Backup {
    pub fn capture(font: &dyn FontAsset) -> Self {
        Self {
            font: font.handle(),
            records: font.read_adjustment_table(),
            taken_at: Utc::now(),
        }
    }

    pub fn font(&self) -> &FontHandle {
        &self.font
    }

    pub fn records(&self) -> &[GlyphPairAdjustment] {
        &self.records
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_file_context("read", path)?;
        let backup = serde_json::from_str(&contents).with_file_context("parse", path)?;
        Ok(backup)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).with_file_context("write", path)?;
        debug!("Saved backup of {} to {:?}", self.font, path);
        Ok(())
    }
}

/// Sidecar file that keeps the undo backup of `asset_path` between runs
pub fn backup_path_for(asset_path: &Path) -> PathBuf {
    let mut name = asset_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".backup.json");
    asset_path.with_file_name(name)
}

/// Holds the one backup that undo can restore
#[derive(Debug, Clone, Default)]
pub struct BackupLedger {
    current: Option<Backup>,
}

impl BackupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `font`'s table, replacing any earlier backup
    pub fn snapshot(&mut self, font: &dyn FontAsset) -> &Backup {
        let backup = Backup::capture(font);
        info!("Backup created: {} records", backup.records.len());
        self.current.insert(backup)
    }

    pub fn current(&self) -> Option<&Backup> {
        self.current.as_ref()
    }

    /// Whether an undo for `font` is available
    pub fn can_restore(&self, font: &FontHandle) -> bool {
        self.current
            .as_ref()
            .is_some_and(|backup| &backup.font == font)
    }

    /// Install a backup loaded from elsewhere
    pub fn replace(&mut self, backup: Option<Backup>) {
        self.current = backup;
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Put the backed-up table back into `font` and run the same refresh
    /// hooks as a merge. The backup is consumed; a mismatched font leaves
    /// it in place. Returns the number of records restored.
    pub fn restore(&mut self, font: &mut dyn FontAsset, host: &mut dyn LayoutHost) -> AdjustResult<usize> {
        let Some(backup) = &self.current else {
            return Err(AdjustError::Precondition(
                "no backup has been taken".to_string(),
            ));
        };

        let active = font.handle();
        if backup.font != active {
            return Err(AdjustError::Precondition(format!(
                "backup belongs to '{}' but the active font is '{}'",
                backup.font, active
            )));
        }

        let records = backup.records.clone();
        let count = records.len();
        font.write_adjustment_table(records)
            .map_err(|e| AdjustError::collaborator("Restoring adjustment table", e))?;
        publish_changes(font, host)?;
        self.current = None;

        info!("Undo completed: restored {count} records to {active}");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_source::FontAssetDocument;
    use crate::tests::RecordingHost;
    use kurbo::Vec2;

    fn font(name: &str) -> FontAssetDocument {
        FontAssetDocument::new(name).with_adjustments(vec![
            GlyphPairAdjustment::new(1, 2, Vec2::new(0.0, -2.0)),
            GlyphPairAdjustment::new(3, 4, Vec2::new(0.0, 19.4)),
        ])
    }

    #[test]
    fn test_restore_round_trip() {
        let mut font = font("A");
        let mut host = RecordingHost::default();
        let mut ledger = BackupLedger::new();
        let original = font.read_adjustment_table();

        ledger.snapshot(&font);
        font.write_adjustment_table(vec![GlyphPairAdjustment::new(9, 9, Vec2::ZERO)])
            .unwrap();

        let restored = ledger.restore(&mut font, &mut host).unwrap();
        assert_eq!(restored, 2);
        assert_eq!(font.read_adjustment_table(), original);
        assert_eq!(font.revision(), 1);
        assert_eq!(host.notifications.len(), 1);
    }

    #[test]
    fn test_restore_is_single_use() {
        let mut font = font("A");
        let mut host = RecordingHost::default();
        let mut ledger = BackupLedger::new();

        ledger.snapshot(&font);
        ledger.restore(&mut font, &mut host).unwrap();
        assert!(ledger.current().is_none());

        let error = ledger.restore(&mut font, &mut host).unwrap_err();
        assert!(matches!(error, AdjustError::Precondition(_)));
    }

    #[test]
    fn test_restore_refuses_other_font() {
        let mut host = RecordingHost::default();
        let mut ledger = BackupLedger::new();
        ledger.snapshot(&font("A"));

        let mut other = font("B").with_adjustments(Vec::new());
        let error = ledger.restore(&mut other, &mut host).unwrap_err();
        assert!(matches!(error, AdjustError::Precondition(_)));

        // Nothing written, backup kept for the right font
        assert!(other.read_adjustment_table().is_empty());
        assert!(host.notifications.is_empty());
        assert!(ledger.can_restore(&FontHandle::new("A")));
        assert!(!ledger.can_restore(&FontHandle::new("B")));
    }

    #[test]
    fn test_new_snapshot_replaces_old() {
        let mut ledger = BackupLedger::new();
        let mut font = font("A");
        ledger.snapshot(&font);

        font.write_adjustment_table(Vec::new()).unwrap();
        ledger.snapshot(&font);
        assert_eq!(ledger.current().map(|b| b.records().len()), Some(0));
    }

    #[test]
    fn test_backup_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let asset_path = dir.path().join("sarabun.json");
        let backup_path = backup_path_for(&asset_path);
        assert_eq!(backup_path.file_name().unwrap(), "sarabun.json.backup.json");

        let before = Utc::now();
        let backup = Backup::capture(&font("A"));
        assert!(backup.taken_at() >= before && backup.taken_at() <= Utc::now());

        backup.save(&backup_path).unwrap();
        let loaded = Backup::load(&backup_path).unwrap();
        assert_eq!(loaded.taken_at(), backup.taken_at());
        assert_eq!(loaded, backup);
    }
}
