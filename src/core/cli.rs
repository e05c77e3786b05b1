//! Command line interface for thaikern
//!
//! Handles parsing command line arguments and provides
//! validation for user inputs. Options are documented with
//! examples to help users understand the expected format.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::core::errors::validate_ufo_path;
use crate::rules::PresetKind;

/// thaikern CLI arguments
///
/// Examples:
///   thaikern presets                                   # List presets and offsets
///   thaikern generate --asset font.json --apply        # Apply every preset
///   thaikern generate --asset font.json --preset upper_tone --apply
///   thaikern scan --text "ปิ่น ป้า"                      # Show pairs found in text
///   thaikern auto-fix --asset font.json                # One-click fix with backup
///   thaikern undo --asset font.json                    # Restore the backup
///   thaikern import-ufo MyFont.ufo --output font.json  # Create an asset from a UFO
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "thaikern",
    version,
    about = "Thai mark positioning adjustments for font assets",
    long_about = "thaikern generates glyph pair adjustments that keep Thai vowels and tone marks from colliding, merges them into a font asset's adjustment table and can undo the last merge."
)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Option<Command>,

    /// Initialize user configuration directory with default settings
    ///
    /// This creates the ~/.config/thaikern directory with:
    /// - settings.json: sample text, log filter and preset offsets
    /// - logs/: daily log files when file logging is enabled
    #[clap(
        long = "new-config",
        help = "Initialize user config directory with default settings",
        long_help = "Initialize the ~/.config/thaikern directory with a settings.json file holding the sample text, log filter and per-preset offsets."
    )]
    pub new_config: bool,

    /// Tracing filter, overrides the config file
    #[clap(
        long = "log",
        global = true,
        help = "Log filter (e.g. thaikern=debug)",
        long_help = "Tracing filter directives. Overrides log_filter in settings.json; RUST_LOG overrides both."
    )]
    pub log_filter: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the presets with their offsets
    Presets {
        /// Derive offsets from this asset's metrics
        #[clap(long, short = 'a')]
        asset: Option<PathBuf>,
    },

    /// Generate rules from presets and sample text
    Generate {
        /// Font asset (JSON)
        #[clap(long, short = 'a')]
        asset: PathBuf,

        /// Preset to expand; repeat for several. Defaults to all presets
        /// unless --text is given.
        #[clap(long = "preset", short = 'p')]
        presets: Vec<String>,

        /// Also scan this text for pairs
        #[clap(long, short = 't')]
        text: Option<String>,

        /// Merge the generated rules into the asset
        #[clap(long)]
        apply: bool,
    },

    /// Show the adjustable pairs found in text
    Scan {
        /// Text to scan. Defaults to the configured sample text.
        #[clap(long, short = 't')]
        text: Option<String>,
    },

    /// Back up, regenerate every preset and merge in one step
    AutoFix {
        #[clap(long, short = 'a')]
        asset: PathBuf,
    },

    /// Restore the adjustment table saved before the last merge
    Undo {
        #[clap(long, short = 'a')]
        asset: PathBuf,
    },

    /// Create a font asset from a UFO source
    ImportUfo {
        /// UFO directory
        source: PathBuf,

        /// Asset file to write
        #[clap(long, short = 'o')]
        output: PathBuf,
    },
}

impl CliArgs {
    /// Validate the CLI arguments after parsing
    ///
    /// This ensures that paths exist and preset ids are known before any
    /// work starts, providing clear error messages for common mistakes.
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Some(Command::Generate { asset, presets, .. }) => {
                check_asset(asset)?;
                for id in presets {
                    id.parse::<PresetKind>()?;
                }
                Ok(())
            }
            Some(Command::AutoFix { asset }) | Some(Command::Undo { asset }) => check_asset(asset),
            Some(Command::Presets { asset: Some(asset) }) => check_asset(asset),
            Some(Command::ImportUfo { source, .. }) => validate_ufo_path(source)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Some(Command::Presets { asset: None }) | Some(Command::Scan { .. }) | None => Ok(()),
        }
    }

    /// Parsed `--preset` values
    pub fn preset_kinds(presets: &[String]) -> Result<Vec<PresetKind>, String> {
        presets.iter().map(|id| id.parse()).collect()
    }
}

fn check_asset(path: &Path) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!(
            "Font asset does not exist: {}\nMake sure the path is correct, or create one with import-ufo.",
            path.display()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let args = CliArgs::try_parse_from([
            "thaikern",
            "generate",
            "--asset",
            "font.json",
            "--preset",
            "upper_tone",
            "-p",
            "vowel_tone",
            "--apply",
        ])
        .unwrap();

        match args.command {
            Some(Command::Generate {
                asset,
                presets,
                text,
                apply,
            }) => {
                assert_eq!(asset, PathBuf::from("font.json"));
                assert_eq!(
                    CliArgs::preset_kinds(&presets).unwrap(),
                    vec![PresetKind::UpperTone, PresetKind::VowelTone]
                );
                assert!(text.is_none());
                assert!(apply);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_missing_asset_and_unknown_preset() {
        let dir = tempfile::tempdir().unwrap();
        let asset = dir.path().join("font.json");

        let missing = CliArgs::try_parse_from(["thaikern", "undo", "-a", asset.to_str().unwrap()]).unwrap();
        assert!(missing.validate().unwrap_err().contains("does not exist"));

        std::fs::write(&asset, "{}").unwrap();
        let unknown = CliArgs::try_parse_from([
            "thaikern",
            "generate",
            "-a",
            asset.to_str().unwrap(),
            "-p",
            "nope",
        ])
        .unwrap();
        assert!(unknown.validate().unwrap_err().contains("Unknown preset"));
    }
}
