//! Classification of instance symbol references.

use std::path::Path;

/// Built-in device symbols. Anything else names a subcircuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Resistor,
    Inductor,
    Ground,
    IoPin,
    Junction,
    VoltageSource,
    CurrentSource,
}

impl Primitive {
    pub const ALL: [Primitive; 7] = [
        Primitive::Resistor,
        Primitive::Inductor,
        Primitive::Ground,
        Primitive::IoPin,
        Primitive::Junction,
        Primitive::VoltageSource,
        Primitive::CurrentSource,
    ];

    /// Symbol file name of this primitive.
    pub fn file_name(self) -> &'static str {
        match self {
            Primitive::Resistor => "res.sym",
            Primitive::Inductor => "ind.sym",
            Primitive::Ground => "gnd.sym",
            Primitive::IoPin => "iopin.sym",
            Primitive::Junction => "jj.sym",
            Primitive::VoltageSource => "psrc.sym",
            Primitive::CurrentSource => "isrc.sym",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.file_name() == name)
    }
}

/// What an instance's symbol reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind<'a> {
    Primitive(Primitive),
    /// A subcircuit, identified by the symbol's file stem
    Subcircuit(&'a str),
    /// Empty or unusable reference
    Unknown,
}

impl<'a> SymbolKind<'a> {
    pub fn classify(symbol: &'a str) -> Self {
        let path = Path::new(symbol.trim());
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return SymbolKind::Unknown;
        };
        if let Some(primitive) = Primitive::from_file_name(file_name) {
            return SymbolKind::Primitive(primitive);
        }
        match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) if !stem.is_empty() => SymbolKind::Subcircuit(stem),
            _ => SymbolKind::Unknown,
        }
    }

    pub fn subcircuit(self) -> Option<&'a str> {
        match self {
            SymbolKind::Subcircuit(name) => Some(name),
            _ => None,
        }
    }
}
