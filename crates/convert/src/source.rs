//! Capability traits over the construction engine. The engine itself
//! (object graph, evaluation, rendering) stays outside this crate;
//! callers implement these seams over whatever model they hold,
//! including the style-extraction routine behind
//! [`ConstructionNode::style`].

use gpad_types::StyleMap;

/// An algorithm backing one or more construction elements.
pub trait Algorithm {
    /// The algorithm's definition name; the reserved name
    /// `Expression` marks a wrapped expression rather than a command.
    fn definition_name(&self) -> &str;

    /// Rendered definition text (command with arguments, or the
    /// expression source).
    fn definition(&self) -> Option<String>;

    /// Indices of this algorithm's output elements within the
    /// construction's element order.
    fn output_indices(&self) -> Vec<usize>;
}

/// One element of a construction, in traversal order.
pub trait ConstructionNode {
    /// The element's label; empty when unlabelled.
    fn label(&self) -> &str;

    /// The element's object type name (`point`, `numeric`, ...).
    fn type_name(&self) -> &str;

    /// The element's own definition text, when it has one.
    fn definition(&self) -> Option<String>;

    /// The backing algorithm, or `None` for independent elements.
    fn algorithm(&self) -> Option<&dyn Algorithm>;

    /// Whether the element is shown in the geometry view; `None` when
    /// no display information exists.
    fn shown_in_view(&self) -> Option<bool>;

    fn label_visible(&self) -> bool;

    /// The element's style state as an attribute map, produced by the
    /// injected style-extraction routine.
    fn style(&self) -> StyleMap;
}

/// Ordered traversal over a construction's elements.
pub trait Construction {
    fn len(&self) -> usize;

    fn node(&self, index: usize) -> Option<&dyn ConstructionNode>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A macro: a named sub-construction with declared inputs/outputs.
pub trait MacroSource {
    fn name(&self) -> &str;
    fn inputs(&self) -> Vec<String>;
    fn outputs(&self) -> Vec<String>;
    fn body(&self) -> &dyn Construction;
}
