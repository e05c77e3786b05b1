//! Stages of the one-click fix batch
//!
//! A batch runs Backing-Up, Generating, Merging and Notifying in order.
//! The stages themselves live on [`Session`](crate::core::state::Session);
//! this module holds the stage enum, progress events, the report and the
//! guard that keeps two batches from overlapping.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::merger::MergeReport;
use crate::core::errors::{AdjustError, AdjustResult};
use crate::rules::GenerationReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStage {
    Idle,
    BackingUp,
    Generating,
    Merging,
    Notifying,
    Failed,
}

impl BatchStage {
    /// Progress shown when the stage starts
    pub fn fraction(&self) -> f32 {
        match self {
            BatchStage::Idle | BatchStage::BackingUp | BatchStage::Generating => 0.0,
            BatchStage::Merging => 0.33,
            BatchStage::Notifying => 0.66,
            BatchStage::Failed => 0.0,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            BatchStage::Idle => "Done",
            BatchStage::BackingUp => "Backing up adjustment table...",
            BatchStage::Generating => "Generating rules...",
            BatchStage::Merging => "Applying rules to font asset...",
            BatchStage::Notifying => "Refreshing text layout...",
            BatchStage::Failed => "Failed",
        }
    }
}

impl fmt::Display for BatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchStage::Idle => "idle",
            BatchStage::BackingUp => "backing up",
            BatchStage::Generating => "generating",
            BatchStage::Merging => "merging",
            BatchStage::Notifying => "notifying",
            BatchStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Sent to the progress callback between stages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchProgress {
    pub stage: BatchStage,
    pub fraction: f32,
    pub message: &'static str,
}

impl BatchProgress {
    pub fn starting(stage: BatchStage) -> Self {
        Self {
            stage,
            fraction: stage.fraction(),
            message: stage.message(),
        }
    }

    pub fn finished() -> Self {
        Self {
            stage: BatchStage::Idle,
            fraction: 1.0,
            message: BatchStage::Idle.message(),
        }
    }
}

/// Result of a completed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub generated: GenerationReport,
    pub merged: MergeReport,
    /// Records in the font's table after the merge
    pub total_records: usize,
    /// Text components relaid out
    pub relayouts: usize,
}

/// Re-entrancy guard: at most one batch at a time
#[derive(Debug, Default)]
pub struct BatchGuard {
    running: bool,
}

impl BatchGuard {
    pub fn begin(&mut self) -> AdjustResult<()> {
        if self.running {
            return Err(AdjustError::BatchInProgress);
        }
        self.running = true;
        Ok(())
    }

    pub fn end(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
