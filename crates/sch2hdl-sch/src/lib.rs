//! Reader for xschem-style schematic files (`.sch`).
//!
//! A [`Schematic`] is the per-circuit view needed for HDL generation:
//!
//! * `instances` – every placed `C {symbol} ... {attributes}` record, in file
//!   order, with its parsed [`Attributes`].
//! * `blocks` – the `parameter`, `internal`, `rules` and `design_info` text
//!   blocks ([`TextBlocks`]).
//! * `is_root` – whether `design_info` flags this circuit as the hierarchy root.
//!
//! Parsing is tolerant: malformed records and missing blocks degrade to empty
//! values. The only error is an unreadable file; a missing file is `Ok(None)`.

pub mod attrs;
pub mod block;
pub mod model;
pub mod record;
pub mod symbol;

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

pub use attrs::Attributes;
pub use block::{BlockKind, TextBlocks, ROOT_MARKER};
pub use model::sanitize_model;
pub use symbol::{Primitive, SymbolKind};

/// File extension of schematic files.
pub const SCHEMATIC_EXT: &str = "sch";

/// Record tag of a placed component instance.
const INSTANCE_TAG: &str = "C";

#[derive(Debug, thiserror::Error)]
pub enum SchError {
    #[error("Failed to read schematic {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A placed component: symbol reference plus attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub symbol: String,
    pub attributes: Attributes,
}

impl Instance {
    pub fn new(symbol: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            symbol: symbol.into(),
            attributes,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name")
    }

    pub fn value(&self) -> Option<&str> {
        self.attributes.get("value")
    }

    /// Raw `model` attribute, empty when absent.
    pub fn model(&self) -> &str {
        self.attributes.get("model").unwrap_or_default()
    }

    pub fn sanitized_model(&self) -> &str {
        sanitize_model(self.model())
    }

    pub fn kind(&self) -> SymbolKind<'_> {
        SymbolKind::classify(&self.symbol)
    }

    /// The `(name, value, model)` triple, if both name and value are present.
    pub fn param(&self) -> Option<Param<'_>> {
        Some(Param {
            name: self.name()?,
            value: self.value()?,
            model: self.sanitized_model(),
        })
    }
}

/// A named, valued instance; `model` is already sanitized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub model: &'a str,
}

impl Param<'_> {
    /// Upper-cased first letter of the instance name.
    pub fn prefix(&self) -> Option<char> {
        self.name.chars().next().map(|c| c.to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schematic {
    /// Circuit base name (file stem)
    pub name: String,
    pub instances: Vec<Instance>,
    pub blocks: TextBlocks,
    pub is_root: bool,
}

impl Schematic {
    pub fn parse(name: impl Into<String>, content: &str) -> Self {
        let instances: Vec<Instance> = record::scan(content)
            .into_iter()
            .filter(|rec| rec.tag == INSTANCE_TAG)
            .map(|rec| Instance::new(rec.braced(0).trim(), Attributes::parse(rec.braced(5))))
            .collect();
        let blocks = TextBlocks::extract(content);
        let is_root = blocks.is_root();

        Self {
            name: name.into(),
            instances,
            blocks,
            is_root,
        }
    }

    /// Read and parse the schematic at `path`. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>, SchError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SchError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let schematic = Self::parse(name, &content);
        log::debug!(
            "Parsed {}: {} instances, root={}",
            path.display(),
            schematic.instances.len(),
            schematic.is_root
        );
        Ok(Some(schematic))
    }

    /// Instances carrying both a name and a value, in file order.
    pub fn params(&self) -> impl Iterator<Item = Param<'_>> {
        self.instances.iter().filter_map(Instance::param)
    }

    /// Sanitized, non-empty models of every instance.
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.instances
            .iter()
            .map(Instance::sanitized_model)
            .filter(|m| !m.is_empty())
    }

    /// Distinct subcircuit names referenced by this circuit.
    pub fn subcircuits(&self) -> BTreeSet<&str> {
        self.instances
            .iter()
            .filter_map(|inst| inst.kind().subcircuit())
            .collect()
    }
}
