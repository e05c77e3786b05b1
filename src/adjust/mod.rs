//! Applying rules to a font
//!
//! - `merger`: upserts rules into the glyph-pair adjustment table
//! - `backup`: single-level undo of a merge
//! - `batch`: stage and progress types for the one-click fix

pub mod backup;
pub mod batch;
pub mod merger;

pub use backup::{backup_path_for, Backup, BackupLedger};
pub use batch::{BatchGuard, BatchProgress, BatchReport, BatchStage};
pub use merger::{apply_rules, merge_rules, publish_changes, AdjustmentTable, MergeReport};
