use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use strum::IntoEnumIterator;

use shellflow_keys::cli::{CliArgs, CliCommand, ContextArgs};
use shellflow_keys::fs_watcher::MappingsWatcher;
use shellflow_keys::keymap::{
    build_table, default_groups, load_mapping_table, load_table_file, parse_chord, ContextFlag,
    MappingTable, SharedKeymap,
};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    shellflow_keys::tracing::init();

    let path = args.mappings_path();
    match args.command {
        CliCommand::Check => check(path.as_deref(), args.file.is_some()),
        CliCommand::Resolve { chord, context } => resolve(path.as_deref(), &chord, &context),
        CliCommand::List { context } => list(path.as_deref(), &context),
        CliCommand::Flags => {
            for flag in ContextFlag::iter() {
                println!("{}", flag);
            }
            Ok(())
        }
        CliCommand::Watch => watch(path.as_deref()),
    }
}

// ============================================================================
// Subcommands
// ============================================================================

/// Build defaults plus the file at `path`, failing on any error
fn check(path: Option<&Path>, explicit: bool) -> Result<()> {
    let defaults = default_groups().context("embedded default keymap is invalid")?;

    let user = match path {
        Some(path) if path.exists() => load_table_file(path)?,
        Some(path) if explicit => bail!("{} does not exist", path.display()),
        Some(path) => {
            println!("{}: not found, defaults only", path.display());
            Vec::new()
        }
        None => Vec::new(),
    };

    let table = build_table(&defaults, &user)?;
    match path.filter(|path| path.exists()) {
        Some(path) => println!(
            "{}: OK ({} user groups, {} groups total)",
            path.display(),
            table.user_group_count(),
            table.groups().len()
        ),
        None => println!("defaults: OK ({} groups)", table.groups().len()),
    }
    Ok(())
}

fn resolve(path: Option<&Path>, chord: &str, context: &ContextArgs) -> Result<()> {
    let chord = parse_chord(chord).with_context(|| format!("invalid chord `{}`", chord))?;
    let active = context.active_set().map_err(anyhow::Error::msg)?;
    let table = load_reporting(path);

    match table.resolve_traced(&chord, &active) {
        Some(resolution) => match resolution.action() {
            Some(action) => println!("{}\t({})", action, resolution.group),
            None => println!("none\t(unbound in {})", resolution.group),
        },
        None => println!("none"),
    }
    Ok(())
}

fn list(path: Option<&Path>, context: &ContextArgs) -> Result<()> {
    let active = context.active_set().map_err(anyhow::Error::msg)?;
    let table = load_reporting(path);

    println!("# active: {}", active);
    for effective in table.effective_bindings(&active) {
        let action = effective
            .resolution
            .action()
            .map_or("(unbound)", |action| action.as_str());
        println!(
            "{:<24} {:<32} {}",
            effective.chord.to_string(),
            action,
            effective.resolution.group
        );
    }
    Ok(())
}

fn watch(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        bail!("no mappings file to watch");
    };

    // The file may not exist yet, but its directory has to
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let (keymap, error) = SharedKeymap::load(Some(path.to_path_buf()));
    report(path, error.as_ref().map(ToString::to_string));

    let watcher = MappingsWatcher::new(path.to_path_buf())
        .with_context(|| format!("failed to watch {}", path.display()))?;
    println!("watching {} (ctrl-c to stop)", path.display());

    loop {
        if watcher.wait_changed(Duration::from_secs(1)) {
            let error = keymap.reload();
            println!("reloaded (version {})", keymap.version().0);
            report(path, error.as_ref().map(ToString::to_string));
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Load the merged table, printing why the user file was ignored
fn load_reporting(path: Option<&Path>) -> MappingTable {
    let loaded = load_mapping_table(path);
    if let (Some(path), Some(error)) = (path, &loaded.user_error) {
        eprintln!(
            "warning: ignoring {}: {}; using defaults",
            path.display(),
            error
        );
    }
    loaded.table
}

fn report(path: &Path, error: Option<String>) {
    match error {
        Some(error) => eprintln!("{}: {}; using defaults", path.display(), error),
        None => println!("{}: OK", path.display()),
    }
}
