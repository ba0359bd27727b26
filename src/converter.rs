//! End-to-end conversion facade: macros first, each collected through
//! its own generator, then the main construction.

use gpad_convert::{collect, Construction, Generator, MacroSource};

pub struct GpadConverter {
    merge_stylesheets: bool,
}

impl Default for GpadConverter {
    fn default() -> Self {
        GpadConverter::new()
    }
}

impl GpadConverter {
    pub fn new() -> Self {
        GpadConverter { merge_stylesheets: true }
    }

    /// Disables content-based style record sharing; every output gets
    /// its own record even when the rendered content is identical.
    pub fn without_stylesheet_merging(mut self) -> Self {
        self.merge_stylesheets = false;
        self
    }

    /// Converts a construction and its macros to GPAD text. An empty
    /// construction converts to empty output.
    pub fn convert(
        &self,
        construction: &dyn Construction,
        macros: &[&dyn MacroSource],
    ) -> String {
        let mut out = String::new();
        for definition in macros {
            out.push_str(&self.convert_macro(*definition));
        }
        let mut generator = Generator::new(self.merge_stylesheets);
        let items = collect(construction, &mut generator);
        out.push_str(&generator.render(&items));
        out
    }

    /// Wraps one macro body. The body runs on a fresh generator, so
    /// its labels and style records are invisible outside the macro.
    fn convert_macro(&self, definition: &dyn MacroSource) -> String {
        let mut generator = Generator::for_macro_body(self.merge_stylesheets);
        let items = collect(definition.body(), &mut generator);
        let body = generator.render(&items);

        let mut out = format!(
            "@@macro {}({}) {{\n",
            definition.name(),
            definition.inputs().join(", ")
        );
        for line in body.lines() {
            if line.trim().is_empty() {
                continue;
            }
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("    @@return ");
        out.push_str(&definition.outputs().join(", "));
        out.push_str("\n}\n\n");
        out
    }
}
