//! Per-conversion mutable state: style record naming, style-map
//! filtering, dependency value extraction and final text emission.
//!
//! One generator serves exactly one construction (main or macro
//! body). Macro bodies get a fresh generator, so their style records
//! never mix with the enclosing construction's.

use crate::scheduler;
use gpad_style::codec;
use gpad_types::{Item, StyleMap};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Properties that only make sense for elements actually shown in the
/// geometry view; stripped from everything else.
static DISPLAY_ONLY_TAGS: [&str; 8] = [
    "angleStyle",
    "animation",
    "arcSize",
    "bgColor",
    "labelMode",
    "layer",
    "lineStyle",
    "objColor",
];

/// Per-tag attributes whose values may embed label references and
/// must be dependency-scanned. Script-bearing tags are scanned inside
/// string literals only.
static EXPRESSION_ATTRS: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| {
        HashMap::from([
            ("animation", &["speed", "step"][..]),
            ("condition", &["showObject"][..]),
            ("dynamicCaption", &["val"][..]),
            ("ggbscript", &["val", "onUpdate", "onDragEnd", "onChange"][..]),
            ("incrementY", &["val"][..]),
            ("linkedGeo", &["exp"][..]),
            ("objColor", &["dynamicr", "dynamicg", "dynamicb", "dynamica"][..]),
            ("parentLabel", &["val"][..]),
            ("slider", &["min", "max"][..]),
        ])
    });

static SCRIPT_ATTRS: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| {
        HashMap::from([("javascript", &["val", "onUpdate", "onDragEnd", "onChange"][..])])
    });

pub struct Generator {
    merge_stylesheets: bool,
    in_macro: bool,
    /// name -> rendered record body, in generation order.
    styles: IndexMap<String, String>,
    content_to_name: HashMap<String, String>,
    counter: usize,
}

impl Generator {
    pub fn new(merge_stylesheets: bool) -> Self {
        Generator {
            merge_stylesheets,
            in_macro: false,
            styles: IndexMap::new(),
            content_to_name: HashMap::new(),
            counter: 0,
        }
    }

    pub fn for_macro_body(merge_stylesheets: bool) -> Self {
        let mut generator = Generator::new(merge_stylesheets);
        generator.in_macro = true;
        generator
    }

    /// Renders and registers a style record for one output element.
    /// Returns the record name, or `None` when every property is at
    /// its default. Under merge mode, byte-identical content reuses
    /// the earlier record.
    pub fn generate_style_record(
        &mut self,
        label: &str,
        type_name: &str,
        style: &StyleMap,
    ) -> Option<String> {
        let filtered = filter_style_map(style, type_name);
        let content = codec::render_record(&filtered)?;
        if self.merge_stylesheets {
            if let Some(name) = self.content_to_name.get(&content) {
                return Some(name.clone());
            }
        }
        let mut name = if label.is_empty() {
            self.counter += 1;
            format!("style{}", self.counter)
        } else {
            format!("{label}Style")
        };
        while self.styles.contains_key(&name) {
            self.counter += 1;
            name = format!("style{}", self.counter);
        }
        self.styles.insert(name.clone(), content.clone());
        self.content_to_name.insert(content, name.clone());
        Some(name)
    }

    fn indent(&self) -> &'static str {
        if self.in_macro {
            "    "
        } else {
            ""
        }
    }

    /// Emits the full GPAD text for the collected items: style record
    /// definitions first, in generation order, then the statements in
    /// dependency order.
    pub fn render(&self, items: &[Item]) -> String {
        let mut out = String::new();
        for (name, content) in &self.styles {
            out.push_str(self.indent());
            out.push('@');
            out.push_str(name);
            out.push_str(" = ");
            out.push_str(content);
            out.push('\n');
        }
        for index in scheduler::schedule(items) {
            let item = &items[index];
            let specs: Vec<String> = item
                .outputs
                .iter()
                .map(|output| {
                    let mut spec = String::new();
                    spec.push_str(&output.label);
                    spec.push_str(output.flag());
                    if let Some(style) = &output.style {
                        spec.push_str(" @");
                        spec.push_str(style);
                    }
                    spec
                })
                .collect();
            out.push_str(self.indent());
            out.push_str(&specs.join(", "));
            out.push_str(" = ");
            out.push_str(&item.body);
            out.push_str(";\n");
        }
        out
    }
}

/// Strips properties that have no business in the compact form: the
/// raw `show` bookkeeping attributes, display-only styling on
/// elements that are not actually showable in the geometry view, and
/// the image file reference.
pub fn filter_style_map(style: &StyleMap, type_name: &str) -> StyleMap {
    let mut filtered = style.clone();
    let mut showable = false;
    if let Some(show) = filtered.get_mut("show") {
        showable = true;
        show.shift_remove("object");
        show.shift_remove("label");
        if show.is_empty() {
            filtered.shift_remove("show");
        }
    }
    if showable {
        showable = match type_name {
            // Plain values only appear in the view through a widget.
            "numeric" | "angle" => filtered.contains_key("slider"),
            "boolean" => filtered.contains_key("checkbox"),
            "list" => filtered.contains_key("comboBox"),
            _ => true,
        };
    }
    if !showable {
        for tag in DISPLAY_ONLY_TAGS {
            filtered.shift_remove(tag);
        }
    }
    filtered.shift_remove("file");
    filtered
}

/// Collects the attribute values of `style` that may reference other
/// labels, splitting them into regular and script scan lists.
pub fn extract_dependency_values(
    style: &StyleMap,
    regular: &mut Vec<String>,
    script: &mut Vec<String>,
) {
    for (tag, attrs) in style {
        if let Some(keys) = EXPRESSION_ATTRS.get(tag.as_str()) {
            for key in *keys {
                if let Some(value) = attrs.get(*key) {
                    regular.push(value.clone());
                }
            }
        }
        if let Some(keys) = SCRIPT_ATTRS.get(tag.as_str()) {
            for key in *keys {
                if let Some(value) = attrs.get(*key) {
                    script.push(value.clone());
                }
            }
        }
        if tag == "startPoint" {
            if let Some(payload) = attrs.get(gpad_types::CORNERS_ATTR) {
                if gpad_style::corners::has_expression(payload) {
                    regular.push(payload.clone());
                }
            }
        }
    }
}

/// Tracks every output label of a conversion so empty labels can be
/// replaced with stable placeholders.
#[derive(Default)]
pub struct LabelAllocator {
    used: HashSet<String>,
    empty_counter: usize,
}

impl LabelAllocator {
    pub fn new() -> Self {
        LabelAllocator::default()
    }

    /// Returns `label` itself when non-empty, otherwise a fresh
    /// `OriginalEmpty<N>` placeholder.
    pub fn resolve(&mut self, label: &str) -> String {
        if !label.is_empty() {
            self.used.insert(label.to_string());
            return label.to_string();
        }
        loop {
            self.empty_counter += 1;
            let candidate = format!("OriginalEmpty{}", self.empty_counter);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
