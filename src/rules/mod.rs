//! Rule generation
//!
//! - `presets`: the eight built-in templates and their offsets
//! - `generator`: expands a template into character-pair rules
//! - `scanner`: finds pairs in sample text
//! - `rule_set`: the deduplicated working set the user curates

pub mod generator;
pub mod presets;
pub mod rule;
pub mod rule_set;
pub mod scanner;

pub use generator::{expand, expand_all};
pub use presets::{OffsetSource, PresetCatalog, PresetConfig, PresetKind};
pub use rule::{AdjustmentRule, RuleKey};
pub use rule_set::{GenerationReport, RuleSet};
pub use scanner::{is_adjustable_pair, scan};
