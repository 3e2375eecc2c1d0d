//! Two-pass HDL generation from hierarchical schematics.
//!
//! Pass 1 ([`collect_models`]) walks the whole hierarchy below a target and
//! gathers every device model in use. Pass 2 ([`emit_hierarchy`]) walks it
//! again with a fresh visited set and writes one `.hdl` file per circuit; the
//! root circuit's global section depends on the finished pass-1 model set, so
//! pass 2 never starts before pass 1 is complete.

pub mod emit;
pub mod hierarchy;
pub mod source;

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

pub use emit::{Expansion, emit_hierarchy, render_hdl, write_hdl};
pub use hierarchy::{ModelSet, collect_models, scan_hierarchy};
pub use sch2hdl_sch::SchError;
pub use source::{
    InMemorySource, LIBRARY_PATH_ENV, SchematicSource, SearchPath, circuit_name, expand_tilde,
};

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error(transparent)]
    Schematic(#[from] SchError),

    #[error("Failed to create output directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to render HDL")]
    Render(#[from] std::fmt::Error),

    #[error("Failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a full generation run.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    /// Models used anywhere below the target
    pub models: ModelSet,
    /// Files written, in emission order
    pub written: Vec<PathBuf>,
}

/// Scan the hierarchy below `target`, then write its HDL files into `out_dir`
/// (created if absent). An unresolved target writes nothing.
pub fn generate<S: SchematicSource + ?Sized>(
    source: &S,
    target: &str,
    out_dir: &Path,
    expansion: Expansion,
) -> Result<GenerateReport, GenError> {
    let models = collect_models(source, target)?;

    std::fs::create_dir_all(out_dir).map_err(|source| GenError::CreateDir {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut visited = BTreeSet::new();
    let written = emit_hierarchy(source, target, out_dir, &models, &mut visited, expansion)?;

    Ok(GenerateReport { models, written })
}
