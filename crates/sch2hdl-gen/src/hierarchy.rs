//! Hierarchy traversal and the model scan (pass 1).
//!
//! Both passes walk the circuit graph depth-first from a target circuit with
//! an explicit stack. The visited set is owned by the caller, so one set spans
//! the whole descent: shared subcircuits and cycles are processed once.

use crate::source::{SchematicSource, circuit_name};
use sch2hdl_sch::{SchError, Schematic};
use std::collections::BTreeSet;
use std::fmt;

/// Every sanitized model used anywhere in a hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSet(BTreeSet<String>);

impl ModelSet {
    pub fn contains(&self, model: &str) -> bool {
        self.0.contains(model)
    }

    pub fn contains_any(&self, models: &[&str]) -> bool {
        models.iter().any(|m| self.contains(m))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn extend<'a>(&mut self, models: impl IntoIterator<Item = &'a str>) {
        self.0.extend(models.into_iter().map(str::to_owned));
    }
}

impl<'a> FromIterator<&'a str> for ModelSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = ModelSet::default();
        set.extend(iter);
        set
    }
}

impl fmt::Display for ModelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let models: Vec<&str> = self.iter().collect();
        write!(f, "{{{}}}", models.join(", "))
    }
}

/// Walk the hierarchy below `target`, calling `visit` once per resolved,
/// not-yet-visited circuit. Without `recursive` only the target is visited.
///
/// Unresolved names end their branch silently.
pub(crate) fn walk<S, E, F>(
    source: &S,
    target: &str,
    visited: &mut BTreeSet<String>,
    recursive: bool,
    mut visit: F,
) -> Result<(), E>
where
    S: SchematicSource + ?Sized,
    E: From<SchError>,
    F: FnMut(&Schematic) -> Result<(), E>,
{
    let target = circuit_name(target);
    let mut stack = vec![target.clone()];

    while let Some(name) = stack.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        let Some(schematic) = source.load(&name)? else {
            if name == target {
                log::warn!("No schematic found for {name}");
            } else {
                log::debug!("No schematic found for {name}, skipping branch");
            }
            continue;
        };

        log::debug!("Visiting {name}");
        visit(&schematic)?;

        if recursive {
            // Reversed so the lowest name is popped first.
            stack.extend(schematic.subcircuits().into_iter().rev().map(str::to_owned));
        }
    }
    Ok(())
}

/// Pass 1: add the models of every circuit reachable from `target` to `models`.
pub fn scan_hierarchy<S: SchematicSource + ?Sized>(
    source: &S,
    target: &str,
    visited: &mut BTreeSet<String>,
    models: &mut ModelSet,
) -> Result<(), SchError> {
    walk(source, target, visited, true, |schematic| {
        models.extend(schematic.models());
        Ok(())
    })
}

/// Run pass 1 with fresh state and return the finished model set.
pub fn collect_models<S: SchematicSource + ?Sized>(
    source: &S,
    target: &str,
) -> Result<ModelSet, SchError> {
    let mut visited = BTreeSet::new();
    let mut models = ModelSet::default();
    scan_hierarchy(source, target, &mut visited, &mut models)?;
    log::debug!(
        "Scanned {} circuits below {target}, {} models {models}",
        visited.len(),
        models.len()
    );
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySource;

    fn diamond() -> InMemorySource {
        InMemorySource::new()
            .with(
                "top",
                "C {a.sym} 0 0 0 0 {name=XA}\nC {b.sym} 0 0 0 0 {name=XB}\nC {res.sym} 0 0 0 0 {name=R1 value=1 model=R}",
            )
            .with("a", "C {c.sym} 0 0 0 0 {name=XC}\nC {jj.sym} 0 0 0 0 {name=J1 value=1 model=JT}")
            .with("b", "C {c.sym} 0 0 0 0 {name=XC}")
            .with("c", "C {jj.sym} 0 0 0 0 {name=J1 value=1 model=JJJ(JA,JB)}")
    }

    #[test]
    fn collects_models_from_every_level() {
        let models = collect_models(&diamond(), "top").unwrap();
        assert_eq!(models.iter().collect::<Vec<_>>(), ["JJJ", "JT", "R"]);
        assert_eq!(models.to_string(), "{JJJ, JT, R}");
    }

    #[test]
    fn shared_subcircuit_is_visited_once() {
        let source = diamond();
        let mut order = Vec::new();
        let mut visited = BTreeSet::new();
        walk::<_, SchError, _>(&source, "top", &mut visited, true, |sch| {
            order.push(sch.name.clone());
            Ok(())
        })
        .unwrap();
        assert_eq!(order, ["top", "a", "c", "b"]);
    }

    #[test]
    fn cycles_terminate() {
        let source = InMemorySource::new()
            .with("a", "C {b.sym} 0 0 0 0 {name=XB model=JN}")
            .with("b", "C {a.sym} 0 0 0 0 {name=XA model=JT}");
        let mut visited = BTreeSet::new();
        let mut models = ModelSet::default();
        scan_hierarchy(&source, "a", &mut visited, &mut models).unwrap();
        assert_eq!(visited.len(), 2);
        assert!(models.contains("JN") && models.contains("JT"));
    }

    #[test]
    fn unresolved_names_contribute_nothing() {
        let source = InMemorySource::new().with("top", "C {ghost.sym} 0 0 0 0 {name=X1 model=JN}");
        let models = collect_models(&source, "top").unwrap();
        assert_eq!(models.iter().collect::<Vec<_>>(), ["JN"]);

        let models = collect_models(&source, "nowhere").unwrap();
        assert!(models.is_empty());
    }

    #[test]
    fn target_may_be_a_path() {
        let models = collect_models(&diamond(), "lib/top.sch").unwrap();
        assert_eq!(models.len(), 3);
    }

    #[test]
    fn contains_any_checks_each_tag() {
        let models: ModelSet = ["JJN"].into_iter().collect();
        assert!(models.contains_any(&["JN", "JJN"]));
        assert!(!models.contains_any(&["JT", "JJT"]));
    }
}
