//! HDL rendering and the emission pass (pass 2).
//!
//! One `.hdl` file is produced per distinct circuit. Section order is fixed:
//! root globals, header, local parameters, internal, external, rules, close.

use crate::GenError;
use crate::hierarchy::{ModelSet, walk};
use crate::source::SchematicSource;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use sch2hdl_sch::{Param, Schematic};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Extension of generated files.
pub const HDL_EXT: &str = "hdl";

/// Global scaling multipliers (critical current, junction, inductance, resistance).
pub const SCALE_PARAMS: &str = "XI=1, XJ=1, XL=1, XR=1";

/// Root-level defaults emitted when any model of a junction family is used
/// somewhere in the hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct BiasClause {
    pub models: [&'static str; 2],
    pub params: &'static str,
}

pub const BIAS_CLAUSES: [BiasClause; 2] = [
    BiasClause {
        models: ["JN", "JJN"],
        params: "RSJN_VG=1, RSJN_N=1",
    },
    BiasClause {
        models: ["JT", "JJT"],
        params: "WBC=1, WVG=4.13, WVRAT=0.6, WRRAT=0.1",
    },
];

/// Junction model whose instances get a companion `V<name>=1` parameter.
pub const VOLTAGE_JUNCTION_MODEL: &str = "JJJ";

/// Name prefixes that become external variables when the model matches.
const EXTERNAL_PREFIXES: [char; 3] = ['L', 'I', 'R'];

/// How far pass 2 descends from the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expansion {
    #[default]
    Recursive,
    Single,
}

impl Expansion {
    /// `"single"` selects [`Expansion::Single`]; anything else is recursive.
    pub fn from_mode(mode: Option<&str>) -> Self {
        match mode {
            Some("single") => Expansion::Single,
            _ => Expansion::Recursive,
        }
    }
}

fn is_external(param: &Param<'_>) -> bool {
    match param.prefix() {
        Some('J') => true,
        Some(letter) if EXTERNAL_PREFIXES.contains(&letter) => {
            let tag = letter.to_string();
            param.model == tag || param.model.strip_suffix('?') == Some(tag.as_str())
        }
        _ => false,
    }
}

fn write_section(out: &mut impl fmt::Write, title: &str, lines: &[String]) -> fmt::Result {
    if lines.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{};", lines.join(",\n"))
}

/// Render the HDL text of one circuit into `out`. `models` must be the
/// finished set of the whole hierarchy, not only this circuit's.
pub fn render_hdl(
    schematic: &Schematic,
    models: &ModelSet,
    out: &mut impl fmt::Write,
) -> fmt::Result {
    let blocks = &schematic.blocks;

    if schematic.is_root {
        let mut globals = vec![SCALE_PARAMS];
        if !blocks.parameter.is_empty() {
            globals.push(blocks.parameter.as_str());
        }
        globals.extend(
            BIAS_CLAUSES
                .iter()
                .filter(|clause| models.contains_any(&clause.models))
                .map(|clause| clause.params),
        );
        writeln!(out, "PARAMETER")?;
        writeln!(out, "\t{};", globals.join(",\n\t"))?;
        writeln!(out)?;
    }

    writeln!(out, "circuit {}()", schematic.name)?;
    writeln!(out, "{{")?;

    let mut locals = Vec::new();
    for param in schematic.params() {
        locals.push(format!("\t{}={}", param.name, param.value));
        if param.prefix() == Some('J') && param.model == VOLTAGE_JUNCTION_MODEL {
            locals.push(format!("\tV{}=1", param.name));
        }
    }
    write_section(out, "PARAMETER", &locals)?;

    if !blocks.internal.is_empty() {
        writeln!(out)?;
        writeln!(out, "INTERNAL")?;
        writeln!(out, "\t{};", blocks.internal)?;
    }

    let externals: Vec<String> = schematic
        .params()
        .filter(is_external)
        .map(|param| format!("\tX{}=1", param.name))
        .collect();
    write_section(out, "EXTERNAL", &externals)?;

    if !blocks.rules.is_empty() {
        writeln!(out)?;
        writeln!(out, "\t{}", blocks.rules)?;
    }

    writeln!(out)?;
    writeln!(out, "}}")
}

/// Write `contents` to `<out_dir>/<name>.hdl` in one atomic replace.
pub fn write_hdl(out_dir: &Path, name: &str, contents: &str) -> Result<PathBuf, GenError> {
    use std::io::Write;

    let path = out_dir.join(format!("{name}.{HDL_EXT}"));
    AtomicFile::new(&path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(contents.as_bytes())?;
            f.flush()
        })
        .map_err(|err| GenError::Write {
            path: path.clone(),
            source: match err {
                atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => e,
            },
        })?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}

/// Pass 2: write one file per circuit reachable from `target` (or only the
/// target under [`Expansion::Single`]). Returns the written paths in order.
pub fn emit_hierarchy<S: SchematicSource + ?Sized>(
    source: &S,
    target: &str,
    out_dir: &Path,
    models: &ModelSet,
    visited: &mut BTreeSet<String>,
    expansion: Expansion,
) -> Result<Vec<PathBuf>, GenError> {
    let mut written = Vec::new();
    walk::<_, GenError, _>(
        source,
        target,
        visited,
        expansion == Expansion::Recursive,
        |schematic| {
            let mut hdl = String::new();
            render_hdl(schematic, models, &mut hdl)?;
            written.push(write_hdl(out_dir, &schematic.name, &hdl)?);
            Ok(())
        },
    )?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySource;

    fn parse(name: &str, content: &str) -> Schematic {
        Schematic::parse(name, content)
    }

    fn render(schematic: &Schematic, models: &ModelSet) -> String {
        let mut out = String::new();
        render_hdl(schematic, models, &mut out).unwrap();
        out
    }

    #[test]
    fn renders_non_root_circuit() {
        let sch = parse(
            "cell",
            "C {res.sym} 0 0 0 0 {name=R1 value=2 model=R}
C {jj.sym} 0 0 0 0 {name=J1 value=250u model=JJJ(JA,JB)}
C {ind.sym} 0 0 0 0 {name=L1 value=2p model=L?}
C {ind.sym} 0 0 0 0 {name=L2 value=3p model=LX}
C {jj.sym} 0 0 0 0 {name=j2 value=1 model=JN}
C {isrc.sym} 0 0 0 0 {name=I1 value=1m}
T {x} 0 0 0 0 1 1 {pscan_type=internal body=\\{ib = 0.7\\}}
T {x} 0 0 0 0 1 1 {pscan_type=rules body=\\{a;\\nb;\\}}
",
        );
        let expected = "circuit cell()
{

PARAMETER
\tR1=2,
\tJ1=250u,
\tVJ1=1,
\tL1=2p,
\tL2=3p,
\tj2=1,
\tI1=1m;

INTERNAL
\tib = 0.7;

EXTERNAL
\tXR1=1,
\tXJ1=1,
\tXL1=1,
\tXj2=1;

\ta;
\tb;

}
";
        assert_eq!(render(&sch, &ModelSet::default()), expected);
    }

    #[test]
    fn renders_root_globals_from_hierarchy_models() {
        let sch = parse(
            "top",
            "T {x} 0 0 0 0 1 1 {pscan_type=design_info body=\\{is_root=True\\}}
T {x} 0 0 0 0 1 1 {pscan_type=parameter body=\\{IC=1.2\\}}
",
        );
        let models: ModelSet = ["JJN", "JT"].into_iter().collect();
        let expected = "PARAMETER
\tXI=1, XJ=1, XL=1, XR=1,
\tIC=1.2,
\tRSJN_VG=1, RSJN_N=1,
\tWBC=1, WVG=4.13, WVRAT=0.6, WRRAT=0.1;

circuit top()
{

}
";
        assert_eq!(render(&sch, &models), expected);
    }

    #[test]
    fn root_without_junction_models_has_only_scales() {
        let sch = parse(
            "top",
            "T {x} 0 0 0 0 1 1 {pscan_type=design_info body=\\{is_root=True\\}}",
        );
        let out = render(&sch, &["JJJ", "R"].into_iter().collect());
        assert!(out.starts_with("PARAMETER\n\tXI=1, XJ=1, XL=1, XR=1;\n\ncircuit top()\n"));
    }

    #[test]
    fn empty_circuit_has_header_and_close_only() {
        let sch = parse("empty", "C {gnd.sym} 0 0 0 0 {name=G1}");
        assert_eq!(
            render(&sch, &ModelSet::default()),
            "circuit empty()\n{\n\n}\n"
        );
    }

    #[test]
    fn external_rule_for_l_i_r_needs_matching_model() {
        let sch = parse(
            "cell",
            "C {res.sym} 0 0 0 0 {name=R1 value=1 model=R?}
C {res.sym} 0 0 0 0 {name=R2 value=1 model=L}
C {res.sym} 0 0 0 0 {name=R3 value=1}
C {isrc.sym} 0 0 0 0 {name=i4 value=1 model=I}
C {jj.sym} 0 0 0 0 {name=J5 value=1}
C {res.sym} 0 0 0 0 {name=B6 value=1 model=B}",
        );
        let names: Vec<&str> = sch
            .params()
            .filter(is_external)
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["R1", "i4", "J5"]);
    }

    #[test]
    fn expansion_mode() {
        assert_eq!(Expansion::from_mode(Some("single")), Expansion::Single);
        assert_eq!(Expansion::from_mode(Some("Single")), Expansion::Recursive);
        assert_eq!(Expansion::from_mode(None), Expansion::Recursive);
    }

    #[test]
    fn emits_each_circuit_once() {
        let out = tempfile::tempdir().unwrap();
        let source = InMemorySource::new()
            .with("top", "C {a.sym} 0 0 0 0 {name=XA}\nC {b.sym} 0 0 0 0 {name=XB}")
            .with("a", "C {c.sym} 0 0 0 0 {name=XC}")
            .with("b", "C {c.sym} 0 0 0 0 {name=XC}\nC {ghost.sym} 0 0 0 0 {name=XG}")
            .with("c", "");
        let mut visited = BTreeSet::new();
        let written = emit_hierarchy(
            &source,
            "top",
            out.path(),
            &ModelSet::default(),
            &mut visited,
            Expansion::Recursive,
        )
        .unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["top.hdl", "a.hdl", "c.hdl", "b.hdl"]);
        assert_eq!(
            std::fs::read_to_string(out.path().join("c.hdl")).unwrap(),
            "circuit c()\n{\n\n}\n"
        );
    }

    #[test]
    fn cyclic_hierarchy_emits_each_circuit_once() {
        let out = tempfile::tempdir().unwrap();
        let source = InMemorySource::new()
            .with("a", "C {b.sym} 0 0 0 0 {name=XB}")
            .with("b", "C {a.sym} 0 0 0 0 {name=XA}");
        let mut visited = BTreeSet::new();
        let written = emit_hierarchy(
            &source,
            "a",
            out.path(),
            &ModelSet::default(),
            &mut visited,
            Expansion::Recursive,
        )
        .unwrap();
        assert_eq!(written, [out.path().join("a.hdl"), out.path().join("b.hdl")]);
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 2);
    }

    #[test]
    fn single_expansion_writes_only_target() {
        let out = tempfile::tempdir().unwrap();
        let source = InMemorySource::new()
            .with("top", "C {a.sym} 0 0 0 0 {name=XA}")
            .with("a", "");
        let written = emit_hierarchy(
            &source,
            "top",
            out.path(),
            &ModelSet::default(),
            &mut BTreeSet::new(),
            Expansion::Single,
        )
        .unwrap();
        assert_eq!(written, [out.path().join("top.hdl")]);
        assert!(!out.path().join("a.hdl").exists());
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let out = tempfile::tempdir().unwrap();
        let err = write_hdl(&out.path().join("no/such/dir"), "x", "").unwrap_err();
        assert!(matches!(err, GenError::Write { .. }));
    }
}
