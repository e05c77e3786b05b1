//! JSON-backed font asset
//!
//! A [`FontAssetDocument`] holds face metrics, the character table and the
//! glyph-pair adjustment table of one font, and saves them as a single
//! JSON file. It is the asset the command line tool edits.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::asset::{FontAsset, FontHandle, GlyphIndex, GlyphPairAdjustment};
use super::metrics::MetricSnapshot;
use crate::core::errors::ThaikernContext;

/// Maps one character to the glyph that renders it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub unicode: char,
    pub glyph_index: GlyphIndex,
}

/// On-disk layout of a font asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontAssetData {
    pub name: String,
    #[serde(default)]
    pub face_info: Option<MetricSnapshot>,
    #[serde(default)]
    pub character_table: Vec<CharacterRecord>,
    #[serde(default)]
    pub glyph_pair_adjustment_records: Vec<GlyphPairAdjustment>,
}

#[derive(Debug, Clone)]
pub struct FontAssetDocument {
    data: FontAssetData,
    path: Option<PathBuf>,
    glyph_lookup: HashMap<char, GlyphIndex>,
    revision: u64,
    dirty: bool,
}

impl FontAssetDocument {
    /// An empty, unsaved asset
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_data(
            FontAssetData {
                name: name.into(),
                ..Default::default()
            },
            None,
        )
    }

    pub fn from_data(data: FontAssetData, path: Option<PathBuf>) -> Self {
        let mut document = Self {
            data,
            path,
            glyph_lookup: HashMap::new(),
            revision: 0,
            dirty: false,
        };
        document.rebuild_lookup();
        document
    }

    pub fn with_metrics(mut self, metrics: MetricSnapshot) -> Self {
        self.data.face_info = Some(metrics);
        self
    }

    /// Add characters to the character table. A character already present
    /// keeps its first glyph.
    pub fn with_characters(mut self, characters: impl IntoIterator<Item = (char, GlyphIndex)>) -> Self {
        self.data.character_table.extend(
            characters
                .into_iter()
                .map(|(unicode, glyph_index)| CharacterRecord { unicode, glyph_index }),
        );
        self.rebuild_lookup();
        self
    }

    pub fn with_adjustments(mut self, records: Vec<GlyphPairAdjustment>) -> Self {
        self.data.glyph_pair_adjustment_records = records;
        self
    }

    /// Load an asset from a JSON file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).with_file_context("read", path)?;
        let data: FontAssetData = serde_json::from_str(&contents).with_file_context("parse", path)?;

        debug!(
            "Loaded font asset '{}' with {} characters and {} adjustment records",
            data.name,
            data.character_table.len(),
            data.glyph_pair_adjustment_records.len()
        );
        Ok(Self::from_data(data, Some(resolve_path(path))))
    }

    /// Save to `path` and remember it for later [`FontAsset::persist`] calls
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> anyhow::Result<()> {
        let path = path.into();
        self.path = Some(path.clone());
        self.persist()?;
        self.path = Some(resolve_path(&path));
        Ok(())
    }

    pub fn data(&self) -> &FontAssetData {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Bumped every time the definition is refreshed
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when the adjustment table changed since the last save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn rebuild_lookup(&mut self) {
        self.glyph_lookup.clear();
        for record in &self.data.character_table {
            self.glyph_lookup
                .entry(record.unicode)
                .or_insert(record.glyph_index);
        }
    }
}

/// The canonical form of `path`, so equivalent spellings give the same
/// font handle. Falls back to `path` as given when it cannot be resolved.
fn resolve_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

impl FontAsset for FontAssetDocument {
    fn handle(&self) -> FontHandle {
        match &self.path {
            Some(path) => FontHandle::new(format!("{}@{}", self.data.name, path.display())),
            None => FontHandle::new(self.data.name.clone()),
        }
    }

    fn metrics(&self) -> Option<MetricSnapshot> {
        self.data.face_info
    }

    fn lookup(&self, character: char) -> Option<GlyphIndex> {
        self.glyph_lookup.get(&character).copied()
    }

    fn read_adjustment_table(&self) -> Vec<GlyphPairAdjustment> {
        self.data.glyph_pair_adjustment_records.clone()
    }

    fn write_adjustment_table(&mut self, records: Vec<GlyphPairAdjustment>) -> anyhow::Result<()> {
        self.data.glyph_pair_adjustment_records = records;
        self.dirty = true;
        Ok(())
    }

    fn refresh_definition(&mut self) -> anyhow::Result<()> {
        self.rebuild_lookup();
        self.revision += 1;
        debug!(
            "Refreshed definition of '{}' (revision {})",
            self.data.name, self.revision
        );
        Ok(())
    }

    fn persist(&mut self) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            debug!("Font asset '{}' has no file path, nothing to save", self.data.name);
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_file_context("create", parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(&self.data)?;
        fs::write(path, contents).with_file_context("write", path)?;
        self.dirty = false;

        debug!("Saved font asset to {:?}", path);
        Ok(())
    }
}
