//! Script knowledge: which characters are base glyphs and which are marks

pub mod classes;

pub use classes::{CharClass, CharacterClassifier, SARA_AM, THANTHAKHAT};
