#![allow(dead_code)]

use gpad::types::{AttrMap, StyleMap};
use gpad::{Algorithm, Construction, ConstructionNode, MacroSource};

pub fn attrs(pairs: &[(&str, &str)]) -> AttrMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub struct MockAlgorithm {
    pub name: String,
    pub definition: Option<String>,
    pub outputs: Vec<usize>,
}

impl Algorithm for MockAlgorithm {
    fn definition_name(&self) -> &str {
        &self.name
    }
    fn definition(&self) -> Option<String> {
        self.definition.clone()
    }
    fn output_indices(&self) -> Vec<usize> {
        self.outputs.clone()
    }
}

pub struct MockNode {
    pub label: String,
    pub type_name: String,
    pub definition: Option<String>,
    pub algorithm: Option<MockAlgorithm>,
    pub shown: Option<bool>,
    pub label_visible: bool,
    pub style: StyleMap,
}

impl MockNode {
    pub fn free(label: &str, definition: &str) -> Self {
        MockNode {
            label: label.to_string(),
            type_name: "point".to_string(),
            definition: Some(definition.to_string()),
            algorithm: None,
            shown: Some(true),
            label_visible: true,
            style: StyleMap::new(),
        }
    }

    pub fn output(label: &str) -> Self {
        let mut node = MockNode::free(label, "");
        node.definition = None;
        node
    }

    pub fn command(label: &str, name: &str, definition: &str, outputs: Vec<usize>) -> Self {
        let mut node = MockNode::output(label);
        node.algorithm = Some(MockAlgorithm {
            name: name.to_string(),
            definition: Some(definition.to_string()),
            outputs,
        });
        node
    }

    pub fn typed(mut self, type_name: &str) -> Self {
        self.type_name = type_name.to_string();
        self
    }

    pub fn styled(mut self, tag: &str, tag_attrs: AttrMap) -> Self {
        self.style.insert(tag.to_string(), tag_attrs);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.shown = Some(false);
        self
    }

    pub fn label_hidden(mut self) -> Self {
        self.label_visible = false;
        self
    }
}

impl ConstructionNode for MockNode {
    fn label(&self) -> &str {
        &self.label
    }
    fn type_name(&self) -> &str {
        &self.type_name
    }
    fn definition(&self) -> Option<String> {
        self.definition.clone()
    }
    fn algorithm(&self) -> Option<&dyn Algorithm> {
        self.algorithm.as_ref().map(|a| a as &dyn Algorithm)
    }
    fn shown_in_view(&self) -> Option<bool> {
        self.shown
    }
    fn label_visible(&self) -> bool {
        self.label_visible
    }
    fn style(&self) -> StyleMap {
        self.style.clone()
    }
}

pub struct MockConstruction {
    pub nodes: Vec<MockNode>,
}

impl MockConstruction {
    pub fn new(nodes: Vec<MockNode>) -> Self {
        MockConstruction { nodes }
    }

    pub fn empty() -> Self {
        MockConstruction { nodes: Vec::new() }
    }
}

impl Construction for MockConstruction {
    fn len(&self) -> usize {
        self.nodes.len()
    }
    fn node(&self, index: usize) -> Option<&dyn ConstructionNode> {
        self.nodes.get(index).map(|n| n as &dyn ConstructionNode)
    }
}

pub struct MockMacro {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub body: MockConstruction,
}

impl MacroSource for MockMacro {
    fn name(&self) -> &str {
        &self.name
    }
    fn inputs(&self) -> Vec<String> {
        self.inputs.clone()
    }
    fn outputs(&self) -> Vec<String> {
        self.outputs.clone()
    }
    fn body(&self) -> &dyn Construction {
        &self.body
    }
}
