//! Application runner logic
//!
//! Handles each thaikern subcommand

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::CommandFactory;
use tracing::{info, warn};

use crate::adjust::{backup_path_for, Backup, BatchProgress, MergeReport};
use crate::core::cli::{CliArgs, Command};
use crate::core::config::ConfigFile;
use crate::core::errors::ThaikernContext;
use crate::core::state::Session;
use crate::data::ufo;
use crate::font_source::{FontAsset, FontAssetDocument, NullLayoutHost};
use crate::logging;
use crate::rules::{self, PresetConfig, RuleSet};
use crate::script::CharacterClassifier;

/// Create and run the application with the given CLI arguments.
/// Handles special CLI flags and delegates to the subcommands.
pub fn run_app(cli_args: CliArgs) -> Result<()> {
    // Handle --new-config flag specially
    if cli_args.new_config {
        return ConfigFile::initialize_config_directory()
            .context("Failed to initialize config directory");
    }

    cli_args.validate().map_err(anyhow::Error::msg)?;

    let (config, config_problem) = load_config(&ConfigFile::config_path());
    let filter = cli_args
        .log_filter
        .as_deref()
        .unwrap_or_else(|| config.log_filter());
    let _log_guard = logging::init(filter, config.log_to_file())?;
    if let Some(problem) = config_problem {
        warn!("{problem}");
    }

    let Some(command) = cli_args.command else {
        CliArgs::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Presets { asset } => list_presets(asset.as_deref(), &config),
        Command::Generate {
            asset,
            presets,
            text,
            apply,
        } => generate(&asset, &presets, text.as_deref(), apply, &config),
        Command::Scan { text } => scan(text.as_deref().unwrap_or(config.sample_text())),
        Command::AutoFix { asset } => auto_fix(&asset, &config),
        Command::Undo { asset } => undo(&asset, &config),
        Command::ImportUfo { source, output } => import_ufo(&source, &output),
    }
}

/// Settings from `path`, or the defaults plus the reason the file was
/// ignored. The reason is logged once logging is up.
fn load_config(path: &Path) -> (ConfigFile, Option<String>) {
    match ConfigFile::load_from(path) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (
            ConfigFile::default(),
            Some(format!("Ignoring settings file, using defaults: {e:#}")),
        ),
    }
}

/// Load `asset` into a new session, with configured offsets applied and
/// any backup left by an earlier run
fn open_session(asset: &Path, config: &ConfigFile) -> Result<Session> {
    let document = FontAssetDocument::load(asset)?;
    let mut session = Session::new();
    session.select_font(Box::new(document));
    config.apply_offsets(session.catalog_mut());

    let backup_path = backup_path_for(asset);
    if backup_path.exists() {
        match Backup::load(&backup_path) {
            Ok(backup) => session.backups_mut().replace(Some(backup)),
            Err(e) => warn!("Ignoring unreadable backup: {e:#}"),
        }
    }
    Ok(session)
}

/// Write the session's backup next to `asset` so undo works in a later run
fn save_backup(session: &Session, asset: &Path) -> Result<()> {
    if let Some(backup) = session.backups().current() {
        backup.save(&backup_path_for(asset))?;
    }
    Ok(())
}

fn list_presets(asset: Option<&Path>, config: &ConfigFile) -> Result<()> {
    let session = match asset {
        Some(asset) => open_session(asset, config)?,
        None => {
            let mut session = Session::new();
            config.apply_offsets(session.catalog_mut());
            session
        }
    };

    println!("Presets for {}:", session.get_font_display_name());
    for preset in session.catalog().iter() {
        println!("{}", preset_line(preset, session.classifier()));
    }
    println!(
        "Total pairs: {}",
        session.catalog().expected_pair_count(session.classifier())
    );
    Ok(())
}

fn preset_line(preset: &PresetConfig, classifier: &CharacterClassifier) -> String {
    format!(
        "  {:<16} {:<36} X: {:>7.2}  Y: {:>7.2}  ({} pairs, Y from {})\n      {}",
        preset.kind.id(),
        preset.display_name(),
        preset.final_x(),
        preset.final_y(),
        preset.kind.pair_count(classifier),
        preset.kind.offset_source().label(),
        preset.kind.description()
    )
}

fn print_rules(rules: &RuleSet) {
    for (category, members) in rules.by_category() {
        println!("{category} ({}):", members.len());
        for rule in members {
            println!(
                "  {:<12} X: {:>7.2}  Y: {:>7.2}",
                rule.name, rule.x_placement, rule.y_placement
            );
        }
    }
}

fn print_merge(report: &MergeReport, total: usize) {
    println!(
        "Applied {} rules: {} new, {} updated, {} skipped ({} pairs in table)",
        report.applied(),
        report.added,
        report.updated,
        report.skipped,
        total
    );
}

fn generate(
    asset: &Path,
    presets: &[String],
    text: Option<&str>,
    apply: bool,
    config: &ConfigFile,
) -> Result<()> {
    let kinds = CliArgs::preset_kinds(presets).map_err(anyhow::Error::msg)?;
    let mut session = open_session(asset, config)?;

    if kinds.is_empty() && text.is_none() {
        session.generate_all();
    }
    for kind in kinds {
        session.generate(kind);
    }
    if let Some(text) = text {
        session.scan_text(text);
    }

    print_rules(session.rules());
    println!("{} rules generated", session.rules().len());

    if apply {
        let report = session.apply_selected(&mut NullLayoutHost)?;
        save_backup(&session, asset)?;
        let total = session
            .font()
            .map(|font| font.read_adjustment_table().len())
            .unwrap_or_default();
        print_merge(&report, total);
    }
    Ok(())
}

fn scan(text: &str) -> Result<()> {
    let classifier = CharacterClassifier::thai();
    let mut found = RuleSet::new();
    let report = found.extend(rules::scan(text, &classifier));

    if found.is_empty() {
        println!("No adjustable character pairs found");
        return Ok(());
    }

    for rule in found.iter() {
        println!("  {rule} in {}", rule.name);
    }
    println!(
        "Found {} pairs ({} repeats ignored)",
        report.added, report.skipped
    );
    Ok(())
}

fn auto_fix(asset: &Path, config: &ConfigFile) -> Result<()> {
    let mut session = open_session(asset, config)?;
    let mut progress = |event: &BatchProgress| {
        println!("[{:>3.0}%] {}", event.fraction * 100.0, event.message);
    };

    let result = session.run_auto_fix(&mut NullLayoutHost, &mut progress);
    // The backup is kept on failure so the merge can still be undone
    save_backup(&session, asset)?;
    let report = result?;

    print_merge(&report.merged, report.total_records);
    println!("Run `thaikern undo --asset {}` to revert", asset.display());
    Ok(())
}

fn undo(asset: &Path, config: &ConfigFile) -> Result<()> {
    let mut session = open_session(asset, config)?;
    if !session.can_undo() {
        bail!("No backup available for {}", asset.display());
    }

    let taken_at = session
        .backups()
        .current()
        .map(|backup| backup.taken_at().format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default();
    let restored = session.undo(&mut NullLayoutHost)?;
    let backup_path = backup_path_for(asset);
    fs::remove_file(&backup_path).with_file_context("remove", &backup_path)?;

    println!("Restored {restored} adjustment records from the backup taken {taken_at}");
    Ok(())
}

fn import_ufo(source: &Path, output: &Path) -> Result<()> {
    let mut document = ufo::import_ufo(source)?;
    if output.exists() {
        warn!("Overwriting existing font asset {:?}", output);
    }
    document.save_as(output)?;

    info!("Imported {} to {:?}", document.name(), output);
    println!(
        "Created font asset '{}' with {} characters",
        document.name(),
        document.data().character_table.len()
    );
    Ok(())
}
