//! Where schematics come from.
//!
//! [`SchematicSource`] maps a circuit base name to its parsed schematic. The
//! filesystem implementation, [`SearchPath`], probes an ordered list of
//! directories for `<name>.sch`; [`InMemorySource`] serves fixed text and is
//! used by tests and embedders.

use sch2hdl_sch::{SCHEMATIC_EXT, SchError, Schematic};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable holding extra, colon-separated schematic directories.
pub const LIBRARY_PATH_ENV: &str = "XSCHEM_LIBRARY_PATH";

pub trait SchematicSource {
    /// Load the schematic for circuit `name`; `Ok(None)` when no location has it.
    fn load(&self, name: &str) -> Result<Option<Schematic>, SchError>;
}

impl<T: SchematicSource + ?Sized> SchematicSource for &T {
    fn load(&self, name: &str) -> Result<Option<Schematic>, SchError> {
        (**self).load(name)
    }
}

/// Ordered list of directories searched for `<name>.sch`. First match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            dirs: dirs.into_iter().collect(),
        }
    }

    /// `cwd` followed by every non-empty entry of a colon-separated list, each
    /// with a leading `~` expanded.
    pub fn from_env_value(cwd: PathBuf, value: Option<&str>) -> Self {
        let mut dirs = vec![cwd];
        dirs.extend(
            value
                .unwrap_or_default()
                .split(':')
                .filter(|entry| !entry.is_empty())
                .map(expand_tilde),
        );
        Self::new(dirs)
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Path of the first existing `<name>.sch`.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let file_name = format!("{name}.{SCHEMATIC_EXT}");
        self.dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
    }
}

impl SchematicSource for SearchPath {
    fn load(&self, name: &str) -> Result<Option<Schematic>, SchError> {
        let Some(path) = self.resolve(name) else {
            return Ok(None);
        };
        log::info!("Using {}", path.display());
        Schematic::load(&path)
    }
}

/// Expand a leading `~` or `~/` to the home directory. Other paths are kept.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Schematic text keyed by circuit name.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    files: BTreeMap<String, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(name, content);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.files.insert(name.into(), content.into());
    }
}

impl SchematicSource for InMemorySource {
    fn load(&self, name: &str) -> Result<Option<Schematic>, SchError> {
        Ok(self
            .files
            .get(name)
            .map(|content| Schematic::parse(name, content)))
    }
}

/// Circuit base name of a target given as a name or a path (`dir/amp.sch` → `amp`).
pub fn circuit_name(target: &str) -> String {
    Path::new(target)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
