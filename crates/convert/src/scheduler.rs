//! Dependency ordering of collected items.
//!
//! Items and their adjacency are arena-indexed over the collected
//! slice; no node objects or back-references. The sort is a Kahn
//! sweep seeded in collection order, with newly-ready items sorted by
//! index so ties always break toward the original order.

use crate::labels;
use gpad_types::Item;
use log::warn;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

fn label_index(items: &[Item]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (index, item) in items.iter().enumerate() {
        for output in &item.outputs {
            if !output.label.is_empty() {
                map.entry(output.label.clone()).or_insert(index);
            }
        }
    }
    map
}

/// Builds per-item dependency sets: item `i` depends on item `j` when
/// one of `i`'s scanned values references a label that `j` outputs.
/// Self-references are excluded; unknown labels are ignored.
pub fn dependencies(items: &[Item]) -> Vec<BTreeSet<usize>> {
    let label_to_index = label_index(items);
    let label_set: HashSet<String> = label_to_index.keys().cloned().collect();

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut deps = BTreeSet::new();
            let mut add = |label: &str| {
                if let Some(&target) = label_to_index.get(label) {
                    if target != index {
                        deps.insert(target);
                    }
                }
            };
            for value in &item.regular_values {
                for label in labels::extract_references(value, &label_set) {
                    add(&label);
                }
            }
            for value in &item.script_values {
                for label in labels::extract_references_from_script(value, &label_set) {
                    add(&label);
                }
            }
            deps
        })
        .collect()
}

/// Returns the emission order as indices into `items`, dependencies
/// first. A cycle degrades to the original collection order for the
/// unresolved remainder, with a warning.
pub fn schedule(items: &[Item]) -> Vec<usize> {
    let deps = dependencies(items);
    let mut in_degree: Vec<usize> = deps.iter().map(BTreeSet::len).collect();

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    for (index, item_deps) in deps.iter().enumerate() {
        for &dep in item_deps {
            dependents[dep].push(index);
        }
    }

    let mut ready: VecDeque<usize> = (0..items.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(items.len());
    let mut emitted = vec![false; items.len()];

    while let Some(index) = ready.pop_front() {
        order.push(index);
        emitted[index] = true;
        let mut newly_ready: Vec<usize> = Vec::new();
        for &dependent in &dependents[index] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                newly_ready.push(dependent);
            }
        }
        newly_ready.sort_unstable();
        ready.extend(newly_ready);
    }

    if order.len() < items.len() {
        warn!(
            "dependency cycle among {} statement(s); falling back to collection order",
            items.len() - order.len()
        );
        for index in 0..items.len() {
            if !emitted[index] {
                order.push(index);
            }
        }
    }
    order
}
