use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::schema::ForeignKeyEdge;

/// Order tables so that every foreign-key parent precedes its children.
///
/// Kahn's algorithm over the edges restricted to the selected set. Ties are
/// broken by input order, so the result is deterministic for a fixed input.
/// Edges whose parent or child is not in `tables` do not participate.
pub fn generation_order(tables: &[String], edges: &[ForeignKeyEdge]) -> Result<Vec<String>> {
    let selected: BTreeSet<&str> = tables.iter().map(String::as_str).collect();

    let mut indegree: BTreeMap<&str, usize> =
        tables.iter().map(|table| (table.as_str(), 0)).collect();
    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();

    for edge in edges {
        let child = edge.child_table.as_str();
        let parent = edge.parent_table.as_str();
        if !selected.contains(child) || !selected.contains(parent) {
            continue;
        }
        // Multiple FK columns between the same pair count as one dependency.
        if !seen.insert((child, parent)) {
            continue;
        }
        *indegree.entry(child).or_insert(0) += 1;
        children.entry(parent).or_default().push(child);
    }

    let mut done: BTreeSet<&str> = BTreeSet::new();
    let mut order: Vec<String> = Vec::with_capacity(tables.len());

    while order.len() < tables.len() {
        let ready: Vec<&str> = tables
            .iter()
            .map(String::as_str)
            .filter(|table| !done.contains(table) && indegree[table] == 0)
            .collect();

        if ready.is_empty() {
            let stuck: Vec<String> = tables
                .iter()
                .filter(|table| !done.contains(table.as_str()))
                .cloned()
                .collect();
            return Err(Error::CyclicDependency { tables: stuck });
        }

        for table in ready {
            done.insert(table);
            order.push(table.to_string());
            if let Some(dependents) = children.get(table) {
                for child in dependents {
                    if let Some(count) = indegree.get_mut(child) {
                        *count = count.saturating_sub(1);
                    }
                }
            }
        }
    }

    Ok(order)
}
