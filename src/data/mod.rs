//! Font source import

pub mod ufo;

pub use ufo::{font_asset_from_ufo, import_ufo};
