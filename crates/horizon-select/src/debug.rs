//! Diagnostics: a textual dump of a registry's containers and selections.

use std::fmt;

use crate::graph::{ContainerKind, Graph};
use crate::registry::SelectionRegistry;

/// Renders every container of a registry with its members and selection.
///
/// ```text
/// [ContainerId(1v1)] single default=selected (2 members)
///   selected: [ItemId(2v1)]
/// [ContainerId(2v1)] multi default=selected ignores=[starred] (3 members)
///   selected: [ItemId(1v1), ItemId(2v1)]
/// ```
pub struct SelectionDump<'a> {
    registry: &'a SelectionRegistry,
}

impl<'a> SelectionDump<'a> {
    /// Creates a dump of `registry`.
    pub fn new(registry: &'a SelectionRegistry) -> Self {
        Self { registry }
    }

    fn write_graph(graph: &Graph, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, record) in &graph.containers {
            let kind = match record.kind {
                ContainerKind::Single => "single",
                ContainerKind::Multi => "multi",
            };
            write!(f, "[{:?}] {} default={}", id, kind, record.default_label)?;
            if !record.ignored.is_empty() {
                let mut ignored: Vec<_> = record.ignored.iter().map(|label| label.as_str()).collect();
                ignored.sort_unstable();
                write!(f, " ignores=[{}]", ignored.join(", "))?;
            }
            if !record.model_sharing {
                write!(f, " exclusive-membership")?;
            }
            writeln!(f, " ({} members)", record.members.len())?;
            for label in record.index.labels() {
                let selection = record.selection(&label);
                if selection.is_empty() {
                    continue;
                }
                if label == record.default_label {
                    writeln!(f, "  selected: {:?}", selection)?;
                } else {
                    writeln!(f, "  {}: {:?}", label, selection)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for SelectionDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.registry.shared().graph.read();
        Self::write_graph(&graph, f)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ContainerConfig, SelectContainer, SelectOptions, SelectionRegistry};

    #[test]
    fn test_dump_lists_containers_and_selection() {
        let registry = SelectionRegistry::new();
        let single = registry.create_single(ContainerConfig::default()).unwrap();
        let multi = registry
            .create_multi(ContainerConfig::new().ignore_label("hidden"))
            .unwrap();
        let item = registry.create_item();
        single.add([&item]).unwrap();
        multi.add([&item]).unwrap();
        item.select().unwrap();
        item.select_with(SelectOptions::from("starred")).unwrap();

        let dump = registry.dump();
        assert!(dump.contains("single default=selected (1 members)"));
        assert!(dump.contains("multi default=selected ignores=[hidden] (1 members)"));
        assert!(dump.contains(&format!("  selected: [{:?}]", item.id())));
        assert!(dump.contains(&format!("  starred: [{:?}]", item.id())));
    }

    #[test]
    fn test_empty_registry_dump() {
        assert!(SelectionRegistry::new().dump().is_empty());
    }
}
