//! Single ordered walk over a construction, classifying each entry as
//! a command, an expression, or an independent element, and producing
//! one [`Item`] per emitted statement.

use crate::generator::{extract_dependency_values, Generator, LabelAllocator};
use crate::source::{Algorithm, Construction, ConstructionNode};
use gpad_types::{Item, OutputElement, Visibility};
use log::error;
use std::collections::HashSet;

/// Definition name marking a wrapped expression.
const EXPRESSION_NAME: &str = "Expression";

fn visibility(node: &dyn ConstructionNode) -> Option<Visibility> {
    match node.shown_in_view() {
        None => None,
        Some(false) => Some(Visibility::Hidden),
        Some(true) if !node.label_visible() => Some(Visibility::LabelHidden),
        Some(true) => Some(Visibility::Visible),
    }
}

fn make_output(
    node: &dyn ConstructionNode,
    label: String,
    generator: &mut Generator,
    item: &mut Item,
) -> OutputElement {
    let style = node.style();
    extract_dependency_values(&style, &mut item.regular_values, &mut item.script_values);
    let mut output = OutputElement::new(label);
    output.visibility = visibility(node);
    output.style = generator.generate_style_record(&output.label, node.type_name(), &style);
    output
}

fn collect_expression(
    source: &dyn Construction,
    node: &dyn ConstructionNode,
    algorithm: &dyn Algorithm,
    generator: &mut Generator,
    allocator: &mut LabelAllocator,
) -> Option<Item> {
    let outputs = algorithm.output_indices();
    if outputs.len() != 1 {
        error!(
            "expression '{}' has {} outputs, expected one",
            node.label(),
            outputs.len()
        );
    }
    let output_node = outputs.first().and_then(|&i| source.node(i))?;
    let body = output_node
        .definition()
        .filter(|d| !d.is_empty())
        .or_else(|| algorithm.definition().filter(|d| !d.is_empty()));
    let Some(body) = body else {
        error!("dropping expression '{}': no definition text", output_node.label());
        return None;
    };

    let mut item = Item::new(body.clone());
    item.regular_values.push(body);
    let label = allocator.resolve(output_node.label());
    let output = make_output(output_node, label, generator, &mut item);
    item.outputs.push(output);
    Some(item)
}

fn collect_command(
    source: &dyn Construction,
    algorithm: &dyn Algorithm,
    generator: &mut Generator,
    allocator: &mut LabelAllocator,
) -> Option<Item> {
    let Some(body) = algorithm.definition().filter(|d| !d.is_empty()) else {
        error!(
            "dropping command '{}': no definition text",
            algorithm.definition_name()
        );
        return None;
    };

    let mut item = Item::new(body.clone());
    item.regular_values.push(body);
    for index in algorithm.output_indices() {
        let Some(output_node) = source.node(index) else {
            continue;
        };
        if output_node.label().is_empty() {
            error!(
                "skipping unlabelled output of command '{}'",
                algorithm.definition_name()
            );
            continue;
        }
        let label = allocator.resolve(output_node.label());
        let output = make_output(output_node, label, generator, &mut item);
        item.outputs.push(output);
    }
    if item.outputs.is_empty() {
        error!(
            "dropping command '{}': no labelled outputs",
            algorithm.definition_name()
        );
        return None;
    }
    Some(item)
}

fn collect_independent(
    node: &dyn ConstructionNode,
    generator: &mut Generator,
    allocator: &mut LabelAllocator,
) -> Option<Item> {
    let Some(body) = node.definition().filter(|d| !d.is_empty()) else {
        error!("skipping independent element '{}': no definition text", node.label());
        return None;
    };
    let mut item = Item::new(body.clone());
    item.regular_values.push(body);
    let label = allocator.resolve(node.label());
    let output = make_output(node, label, generator, &mut item);
    item.outputs.push(output);
    Some(item)
}

/// Walks the construction once in element order and returns the
/// collected items. Elements already consumed as outputs of an
/// earlier statement are skipped.
pub fn collect(source: &dyn Construction, generator: &mut Generator) -> Vec<Item> {
    let mut items = Vec::new();
    let mut processed: HashSet<usize> = HashSet::new();
    let mut allocator = LabelAllocator::new();

    for index in 0..source.len() {
        if processed.contains(&index) {
            continue;
        }
        let Some(node) = source.node(index) else {
            continue;
        };
        let item = match node.algorithm() {
            Some(algorithm) => {
                processed.extend(algorithm.output_indices());
                processed.insert(index);
                if algorithm.definition_name() == EXPRESSION_NAME {
                    collect_expression(source, node, algorithm, generator, &mut allocator)
                } else {
                    collect_command(source, algorithm, generator, &mut allocator)
                }
            }
            None => {
                processed.insert(index);
                collect_independent(node, generator, &mut allocator)
            }
        };
        if let Some(item) = item {
            items.push(item);
        }
    }
    items
}
