//! Tagged free-text blocks embedded in a schematic.
//!
//! Blocks are text objects carrying a `pscan_type=<tag>` attribute and a
//! `body={...}` payload (braces optionally backslash-escaped). The payload keeps
//! its line structure through literal `\n` sequences.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker inside the `design_info` block that flags the root circuit.
pub const ROOT_MARKER: &str = "is_root=True";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockKind {
    Parameter,
    Internal,
    Rules,
    DesignInfo,
}

impl BlockKind {
    pub const ALL: [BlockKind; 4] = [
        BlockKind::Parameter,
        BlockKind::Internal,
        BlockKind::Rules,
        BlockKind::DesignInfo,
    ];

    /// Value of `pscan_type` selecting this block.
    pub fn tag(self) -> &'static str {
        match self {
            BlockKind::Parameter => "parameter",
            BlockKind::Internal => "internal",
            BlockKind::Rules => "rules",
            BlockKind::DesignInfo => "design_info",
        }
    }
}

static BLOCK_PATTERNS: Lazy<[Regex; 4]> = Lazy::new(|| {
    BlockKind::ALL.map(|kind| {
        Regex::new(&format!(
            r"(?s)pscan_type={}\b.*?body=\\?\{{(.*?)\\?\}}",
            kind.tag()
        ))
        .unwrap()
    })
});

/// Extract the body of the first block tagged `kind`.
///
/// The body is trimmed, then every escaped newline becomes a real newline
/// followed by a tab. A missing block yields an empty string.
pub fn extract_block(content: &str, kind: BlockKind) -> String {
    BLOCK_PATTERNS[kind as usize]
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str().trim().replace("\\n", "\n\t"))
        .unwrap_or_default()
}

/// The four text blocks a circuit may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBlocks {
    pub parameter: String,
    pub internal: String,
    pub rules: String,
    pub design_info: String,
}

impl TextBlocks {
    pub fn extract(content: &str) -> Self {
        Self {
            parameter: extract_block(content, BlockKind::Parameter),
            internal: extract_block(content, BlockKind::Internal),
            rules: extract_block(content, BlockKind::Rules),
            design_info: extract_block(content, BlockKind::DesignInfo),
        }
    }

    pub fn is_root(&self) -> bool {
        self.design_info.contains(ROOT_MARKER)
    }
}
