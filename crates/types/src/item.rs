use serde::{Deserialize, Serialize};

/// How one output element shows up in the views.
///
/// The flag trails the label in a GPAD statement: nothing for a fully
/// visible element, `~` when only the label is hidden, `*` when the
/// object itself is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Visible,
    LabelHidden,
    Hidden,
}

impl Visibility {
    pub fn flag(self) -> &'static str {
        match self {
            Visibility::Visible => "",
            Visibility::LabelHidden => "~",
            Visibility::Hidden => "*",
        }
    }
}

/// One labelled output of a collected item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputElement {
    pub label: String,
    /// `None` when the source carried no display information; such
    /// outputs render as hidden.
    pub visibility: Option<Visibility>,
    /// Name of the style record attached to this output, if any.
    pub style: Option<String>,
}

impl OutputElement {
    pub fn new(label: impl Into<String>) -> Self {
        OutputElement { label: label.into(), visibility: None, style: None }
    }

    pub fn flag(&self) -> &'static str {
        match self.visibility {
            Some(v) => v.flag(),
            None => Visibility::Hidden.flag(),
        }
    }
}

/// One collected statement: the outputs on the left of `=` and the
/// defining text on the right, plus the raw values scanned for label
/// dependencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub outputs: Vec<OutputElement>,
    pub body: String,
    /// Attribute values whose whole text may reference other labels.
    pub regular_values: Vec<String>,
    /// Script bodies; only their quoted string literals may reference
    /// other labels.
    pub script_values: Vec<String>,
}

impl Item {
    pub fn new(body: impl Into<String>) -> Self {
        Item {
            outputs: Vec::new(),
            body: body.into(),
            regular_values: Vec::new(),
            script_values: Vec::new(),
        }
    }
}
