//! UFO file I/O operations
//!
//! Builds a [`FontAssetDocument`] from a UFO source so its character table
//! and metrics can be adjusted like any other asset.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use norad::Font;
use tracing::{debug, info};

use crate::core::errors::validate_ufo_path;
use crate::font_source::{FontAssetDocument, GlyphIndex, MetricSnapshot};

/// Lib key holding the preferred glyph order
pub const GLYPH_ORDER_KEY: &str = "public.glyphOrder";

/// Units per em assumed when fontinfo.plist has none
const DEFAULT_UNITS_PER_EM: f64 = 1024.0;

/// Load a UFO font file from disk
pub fn load_ufo_from_path(path: impl AsRef<Path>) -> Result<Font> {
    let path = path.as_ref();
    let font = Font::load(path).with_context(|| format!("Failed to load UFO {}", path.display()))?;
    Ok(font)
}

/// Glyph names of the default layer in glyph index order: the lib's glyph
/// order first, then every other glyph sorted by name
pub fn glyph_order(font: &Font) -> Vec<String> {
    let layer = font.default_layer();
    let mut seen = HashSet::new();
    let mut order = Vec::new();

    if let Some(names) = font.lib.get(GLYPH_ORDER_KEY).and_then(|value| value.as_array()) {
        for name in names.iter().filter_map(|value| value.as_string()) {
            if layer.get_glyph(name).is_some() && seen.insert(name.to_string()) {
                order.push(name.to_string());
            }
        }
    }

    let mut remaining: Vec<String> = layer
        .iter()
        .map(|glyph| glyph.name().to_string())
        .filter(|name| !seen.contains(name))
        .collect();
    remaining.sort();
    order.extend(remaining);
    order
}

/// "Family Style" name of a UFO
pub fn font_display_name(font: &Font) -> String {
    let family = font.font_info.family_name.as_deref().unwrap_or("Untitled");
    let style = font.font_info.style_name.as_deref().unwrap_or("Regular");
    format!("{family} {style}")
}

/// Convert a loaded UFO into an asset. The point size is the font's
/// units per em at scale 1.
pub fn font_asset_from_ufo(font: &Font) -> Result<FontAssetDocument> {
    let layer = font.default_layer();
    let mut characters = Vec::new();

    for (index, name) in glyph_order(font).iter().enumerate() {
        let glyph_index = GlyphIndex::try_from(index).context("Too many glyphs in UFO")?;
        if let Some(glyph) = layer.get_glyph(name) {
            characters.extend(glyph.codepoints.iter().map(|codepoint| (codepoint, glyph_index)));
        }
    }

    let units_per_em = font
        .font_info
        .units_per_em
        .map(|v| v.to_string().parse().unwrap_or(DEFAULT_UNITS_PER_EM))
        .unwrap_or(DEFAULT_UNITS_PER_EM);

    debug!(
        "Mapped {} characters to glyphs, units per em {}",
        characters.len(),
        units_per_em
    );

    Ok(FontAssetDocument::new(font_display_name(font))
        .with_metrics(MetricSnapshot {
            point_size: units_per_em,
            scale: 1.0,
        })
        .with_characters(characters))
}

/// Validate, load and convert the UFO at `path`
pub fn import_ufo(path: &Path) -> Result<FontAssetDocument> {
    let path = validate_ufo_path(path)?;
    let font = load_ufo_from_path(&path)?;
    let document = font_asset_from_ufo(&font)?;
    info!(
        "Successfully imported UFO font with {} glyphs",
        font.default_layer().len()
    );
    Ok(document)
}
