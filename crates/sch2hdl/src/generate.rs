use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use sch2hdl_gen::{Expansion, LIBRARY_PATH_ENV, SearchPath, generate};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Circuit to generate, by name or as a path to its .sch file
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Directory receiving the .hdl files (created if missing)
    #[arg(value_name = "OUT_DIR", value_hint = clap::ValueHint::DirPath)]
    pub out_dir: PathBuf,

    /// `single` writes only the target circuit; anything else expands the hierarchy
    #[arg(value_name = "MODE")]
    pub mode: Option<String>,
}

/// Schematics are looked up in the working directory, then in every
/// `XSCHEM_LIBRARY_PATH` entry.
fn search_path() -> Result<SearchPath> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let library_path = std::env::var(LIBRARY_PATH_ENV).ok();
    Ok(SearchPath::from_env_value(cwd, library_path.as_deref()))
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let search = search_path()?;
    log::debug!("Search path: {:?}", search.dirs());

    let expansion = Expansion::from_mode(args.mode.as_deref());
    let report = generate(&search, &args.target, &args.out_dir, expansion)
        .with_context(|| format!("HDL generation failed for {}", args.target))?;

    if report.written.is_empty() {
        eprintln!(
            "  {}",
            format!("{}: No schematic found", args.target).dimmed()
        );
        return Ok(());
    }

    for path in &report.written {
        eprintln!("{} {}", "✓".green(), path.display());
    }
    eprintln!(
        "{} {} file(s), models {}",
        "Generated".green().bold(),
        report.written.len(),
        report.models
    );
    Ok(())
}
