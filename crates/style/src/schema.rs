//! Static registry describing how style tags translate between the
//! XML form and GPAD text: name maps, value-carrying attribute names,
//! value kinds, enum value tables and per-property default values.
//!
//! All tables are process-wide read-only statics; nothing here is ever
//! mutated after first use.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// How a simple property's value is typed, which picks both the
/// rendering path and the default-value comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
}

/// Default for a property, compared against the raw XML-side value
/// before any enum translation.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Int(i64),
    Float(f64),
    Str(&'static str),
}

/// GPAD property name -> XML tag name, for the handful of tags whose
/// names differ between the two forms.
static GPAD_TO_XML_NAME: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("@screen", "absoluteScreenLocation"),
        ("hideLabelInAlgebra", "algebra"),
        ("showIf", "condition"),
        ("showGeneralAngle", "emphasizeRightAngle"),
        ("filename", "file"),
    ])
});

static XML_TO_GPAD_NAME: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| GPAD_TO_XML_NAME.iter().map(|(k, v)| (*v, *k)).collect());

/// GPAD property name -> the XML attribute carrying its value.
/// Everything absent here uses `val`.
static VALUE_ATTR: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("hideLabelInAlgebra", "labelVisible"),
        ("showIf", "showObject"),
        ("filename", "name"),
        ("audio", "src"),
        ("linkedGeo", "exp"),
        ("curveParam", "t"),
    ])
});

static KINDS: LazyLock<HashMap<&'static str, ValueKind>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    for name in [
        "autocolor",
        "auxiliary",
        "breakpoint",
        "centered",
        "comboBox",
        "contentSerif",
        "fixed",
        "hideLabelInAlgebra",
        "inBackground",
        "interpolate",
        "isLaTeX",
        "isMask",
        "keepTypeOnTransform",
        "levelOfDetailQuality",
        "outlyingIntersections",
        "selectionAllowed",
        "showGeneralAngle",
        "showOnAxis",
        "showTrimmed",
        "symbolic",
        "trace",
    ] {
        m.insert(name, ValueKind::Bool);
    }
    for name in [
        "arcSize",
        "decimals",
        "layer",
        "length",
        "selectedIndex",
        "significantfigures",
        "slopeTriangleSize",
    ] {
        m.insert(name, ValueKind::Int);
    }
    for name in ["fading", "ordering", "pointSize"] {
        m.insert(name, ValueKind::Float);
    }
    for name in [
        "angleStyle",
        "caption",
        "content",
        "coordStyle",
        "decoration",
        "dynamicCaption",
        "endStyle",
        "filename",
        "headStyle",
        "incrementY",
        "labelMode",
        "linkedGeo",
        "parentLabel",
        "pointStyle",
        "showIf",
        "startStyle",
        "textAlign",
        "tooltipMode",
        "verticalAlign",
    ] {
        m.insert(name, ValueKind::Str);
    }
    m
});

static DEFAULTS: LazyLock<HashMap<&'static str, DefaultValue>> = LazyLock::new(|| {
    HashMap::from([
        ("arcSize", DefaultValue::Int(30)),
        ("decimals", DefaultValue::Int(-1)),
        ("layer", DefaultValue::Int(0)),
        ("length", DefaultValue::Int(20)),
        ("selectedIndex", DefaultValue::Int(0)),
        ("significantfigures", DefaultValue::Int(-1)),
        ("slopeTriangleSize", DefaultValue::Int(1)),
        ("fading", DefaultValue::Float(0.0)),
        ("ordering", DefaultValue::Float(f64::NAN)),
        ("pointSize", DefaultValue::Float(5.0)),
        ("angleStyle", DefaultValue::Str("0")),
        ("caption", DefaultValue::Str("")),
        ("coordStyle", DefaultValue::Str("cartesian")),
        ("decoration", DefaultValue::Str("0")),
        ("endStyle", DefaultValue::Str("default")),
        ("headStyle", DefaultValue::Str("0")),
        ("labelMode", DefaultValue::Str("0")),
        ("pointStyle", DefaultValue::Str("0")),
        ("startStyle", DefaultValue::Str("default")),
        ("textAlign", DefaultValue::Str("left")),
        ("tooltipMode", DefaultValue::Str("0")),
        ("verticalAlign", DefaultValue::Str("top")),
    ])
});

/// Line style type keyword -> the numeric `type` attribute.
static LINE_STYLE_TYPE: LazyLock<HashMap<&'static str, i32>> = LazyLock::new(|| {
    HashMap::from([
        ("pointwise", -1),
        ("full", 0),
        ("dashedshort", 10),
        ("dashedlong", 15),
        ("dotted", 20),
        ("dasheddotted", 30),
    ])
});

static LINE_STYLE_TYPE_REVERSE: LazyLock<HashMap<i32, &'static str>> =
    LazyLock::new(|| LINE_STYLE_TYPE.iter().map(|(k, v)| (*v, *k)).collect());

/// `typeHidden` keyword -> numeric value. The default (0) renders as
/// no keyword at all.
static LINE_STYLE_TYPE_HIDDEN: LazyLock<HashMap<&'static str, i32>> =
    LazyLock::new(|| HashMap::from([("", 0), ("dashed", 1), ("show", 2)]));

static LINE_STYLE_TYPE_HIDDEN_REVERSE: LazyLock<HashMap<i32, &'static str>> =
    LazyLock::new(|| LINE_STYLE_TYPE_HIDDEN.iter().map(|(k, v)| (*v, *k)).collect());

/// Per-tag enum tables: GPAD keyword -> XML value, keyed by XML tag
/// name. `emphasizeRightAngle` is in here as a boolean inversion, so
/// translation happens uniformly through these tables.
static VALUE_MAPS: LazyLock<HashMap<&'static str, HashMap<&'static str, &'static str>>> =
    LazyLock::new(|| {
        let identity = |values: &[&'static str]| -> HashMap<&'static str, &'static str> {
            values.iter().map(|v| (*v, *v)).collect()
        };
        let arrow_styles = [
            "default",
            "line",
            "arrow",
            "crows_foot",
            "arrow_outline",
            "arrow_filled",
            "circle_outline",
            "circle",
            "square_outline",
            "square",
            "diamond_outline",
            "diamond",
        ];
        HashMap::from([
            (
                "angleStyle",
                HashMap::from([("0-360", "0"), ("0-180", "1"), ("180-360", "2"), ("any", "3")]),
            ),
            (
                "coordStyle",
                identity(&["cartesian", "polar", "complex", "cartesian3d", "spherical"]),
            ),
            (
                "decoration",
                HashMap::from([
                    ("none", "0"),
                    ("single_tick", "1"),
                    ("double_tick", "2"),
                    ("triple_tick", "3"),
                    ("simple_arrow", "4"),
                    ("double_arrow", "5"),
                    ("triple_arrow", "6"),
                ]),
            ),
            (
                "emphasizeRightAngle",
                HashMap::from([("true", "false"), ("false", "true")]),
            ),
            ("endStyle", identity(&arrow_styles)),
            ("startStyle", identity(&arrow_styles)),
            ("headStyle", HashMap::from([("default", "0"), ("arrow", "1")])),
            (
                "labelMode",
                HashMap::from([("name", "0"), ("namevalue", "1"), ("value", "2"), ("caption", "3")]),
            ),
            (
                "pointStyle",
                HashMap::from([
                    ("default", "-1"),
                    ("dot", "0"),
                    ("cross", "1"),
                    ("circle", "2"),
                    ("plus", "3"),
                    ("diamond", "4"),
                    ("empty_diamond", "5"),
                    ("triangle_north", "6"),
                    ("triangle_south", "7"),
                    ("triangle_east", "8"),
                    ("triangle_west", "9"),
                    ("no_outline", "10"),
                ]),
            ),
            ("textAlign", identity(&["left", "center", "right"])),
            (
                "tooltipMode",
                HashMap::from([
                    ("algebraview", "0"),
                    ("on", "1"),
                    ("off", "2"),
                    ("caption", "3"),
                    ("nextcell", "4"),
                ]),
            ),
            ("verticalAlign", identity(&["top", "middle", "bottom"])),
        ])
    });

static VALUE_MAPS_REVERSE: LazyLock<HashMap<&'static str, HashMap<&'static str, &'static str>>> =
    LazyLock::new(|| {
        VALUE_MAPS
            .iter()
            .map(|(tag, map)| (*tag, map.iter().map(|(k, v)| (*v, *k)).collect()))
            .collect()
    });

/// Accepted `eqnStyle` keywords; the keyword is the value both ways.
static EQN_STYLE_VALUES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "implicit",
        "explicit",
        "parametric",
        "specific",
        "general",
        "vertex",
        "conic",
        "user",
    ])
});

/// Fill kind keywords for bar tags, indexed by the XML fill type 0-9.
pub const FILL_TYPE_NAMES: [&str; 10] = [
    "standard",
    "hatch",
    "crosshatch",
    "chessboard",
    "dotted",
    "honeycomb",
    "brick",
    "weaving",
    "symbols",
    "image",
];

pub fn gpad_name(xml_tag: &str) -> &str {
    XML_TO_GPAD_NAME.get(xml_tag).copied().unwrap_or(xml_tag)
}

pub fn xml_tag(gpad_name: &str) -> &str {
    GPAD_TO_XML_NAME.get(gpad_name).copied().unwrap_or(gpad_name)
}

/// The attribute carrying a simple property's value, `val` by default.
pub fn value_attr(gpad_name: &str) -> &str {
    VALUE_ATTR.get(gpad_name).copied().unwrap_or("val")
}

pub fn kind(gpad_name: &str) -> Option<ValueKind> {
    KINDS.get(gpad_name).copied()
}

/// Translates an XML-side enum value into its GPAD keyword, keyed by
/// the XML tag name.
pub fn keyword_for_value(xml_tag: &str, xml_value: &str) -> Option<&'static str> {
    VALUE_MAPS_REVERSE.get(xml_tag)?.get(xml_value).copied()
}

/// Translates a GPAD keyword back into the XML-side value.
pub fn value_for_keyword(xml_tag: &str, keyword: &str) -> Option<&'static str> {
    VALUE_MAPS.get(xml_tag)?.get(keyword).copied()
}

pub fn has_value_map(xml_tag: &str) -> bool {
    VALUE_MAPS.contains_key(xml_tag)
}

pub fn line_style_type_keyword(value: i32) -> Option<&'static str> {
    LINE_STYLE_TYPE_REVERSE.get(&value).copied()
}

pub fn line_style_type_value(keyword: &str) -> Option<i32> {
    LINE_STYLE_TYPE.get(keyword).copied()
}

pub fn line_style_hidden_keyword(value: i32) -> Option<&'static str> {
    LINE_STYLE_TYPE_HIDDEN_REVERSE.get(&value).copied()
}

pub fn line_style_hidden_value(keyword: &str) -> Option<i32> {
    LINE_STYLE_TYPE_HIDDEN.get(keyword).copied()
}

pub fn is_eqn_style(keyword: &str) -> bool {
    EQN_STYLE_VALUES.contains(keyword)
}

pub fn fill_type_name(value: u32) -> Option<&'static str> {
    FILL_TYPE_NAMES.get(value as usize).copied()
}

pub fn fill_type_value(name: &str) -> Option<u32> {
    FILL_TYPE_NAMES.iter().position(|n| *n == name).map(|i| i as u32)
}

/// Whether `raw` (the XML-side value, before enum translation) equals
/// the property's default. Properties at their default are elided.
pub fn is_default(gpad_name: &str, raw: &str) -> bool {
    let Some(default) = DEFAULTS.get(gpad_name) else {
        return false;
    };
    match default {
        DefaultValue::Int(d) => raw.trim().parse::<i64>().map(|v| v == *d).unwrap_or(false),
        DefaultValue::Float(d) => {
            if d.is_nan() {
                return raw.trim().eq_ignore_ascii_case("nan");
            }
            raw.trim()
                .parse::<f64>()
                .map(|v| (v - d).abs() < 1e-9)
                .unwrap_or(false)
        }
        DefaultValue::Str(d) => raw == *d,
    }
}

/// The XML-side default for a property, used when a GPAD record omits
/// it and the full attribute form is needed again.
pub fn default_text(gpad_name: &str) -> Option<String> {
    DEFAULTS.get(gpad_name).map(|d| match d {
        DefaultValue::Int(v) => v.to_string(),
        DefaultValue::Float(v) => {
            if v.is_nan() {
                "NaN".to_string()
            } else {
                format!("{v}")
            }
        }
        DefaultValue::Str(v) => (*v).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_maps_are_inverses() {
        assert_eq!(gpad_name("algebra"), "hideLabelInAlgebra");
        assert_eq!(xml_tag("hideLabelInAlgebra"), "algebra");
        assert_eq!(gpad_name("absoluteScreenLocation"), "@screen");
        assert_eq!(gpad_name("lineStyle"), "lineStyle");
    }

    #[test]
    fn value_attr_falls_back_to_val() {
        assert_eq!(value_attr("showIf"), "showObject");
        assert_eq!(value_attr("linkedGeo"), "exp");
        assert_eq!(value_attr("arcSize"), "val");
    }

    #[test]
    fn enum_tables_translate_both_ways() {
        assert_eq!(keyword_for_value("pointStyle", "4"), Some("diamond"));
        assert_eq!(value_for_keyword("pointStyle", "diamond"), Some("4"));
        assert_eq!(keyword_for_value("emphasizeRightAngle", "true"), Some("false"));
        assert_eq!(keyword_for_value("textAlign", "center"), Some("center"));
        assert_eq!(keyword_for_value("pointStyle", "99"), None);
    }

    #[test]
    fn integer_defaults_compare_numerically() {
        assert!(is_default("arcSize", "30"));
        assert!(is_default("arcSize", " 30 "));
        assert!(!is_default("arcSize", "31"));
        assert!(!is_default("arcSize", "abc"));
    }

    #[test]
    fn float_defaults_use_tolerance_and_nan() {
        assert!(is_default("pointSize", "5.0000000001"));
        assert!(!is_default("pointSize", "5.1"));
        assert!(is_default("ordering", "NaN"));
        assert!(!is_default("ordering", "1.5"));
    }

    #[test]
    fn string_defaults_compare_raw_values() {
        assert!(is_default("decoration", "0"));
        assert!(!is_default("decoration", "3"));
        assert!(is_default("coordStyle", "cartesian"));
    }

    #[test]
    fn fill_types_round_trip() {
        assert_eq!(fill_type_name(1), Some("hatch"));
        assert_eq!(fill_type_value("image"), Some(9));
        assert_eq!(fill_type_name(10), None);
    }
}
