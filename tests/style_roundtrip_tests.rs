//! Round-trip coverage for the style codec: renderable attribute maps
//! must survive render + parse unchanged, and text lacking elided
//! defaults must re-expand through the schema.

use gpad::style::{codec, parse, schema};
use gpad::types::{single_attr, AttrMap, StyleMap};

fn attrs(pairs: &[(&str, &str)]) -> AttrMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn non_default_record_round_trips() {
    let mut style = StyleMap::new();
    style.insert("pointSize".into(), single_attr("val", "7".into()));
    style.insert("pointStyle".into(), single_attr("val", "4".into()));
    style.insert(
        "lineStyle".into(),
        attrs(&[("type", "20"), ("thickness", "8"), ("drawArrow", "true")]),
    );
    style.insert("objColor".into(), attrs(&[("r", "18"), ("g", "52"), ("b", "86")]));
    style.insert("trace".into(), single_attr("val", "true".into()));

    let rendered = codec::render_record(&style).unwrap();
    let parsed = parse::parse_record("s", &rendered).unwrap();
    assert_eq!(parsed.properties(), &style);
}

#[test]
fn escaped_string_value_round_trips() {
    let original = "label; with \"quotes\"\nand a newline";
    let mut style = StyleMap::new();
    style.insert("caption".into(), single_attr("val", original.into()));

    let rendered = codec::render_record(&style).unwrap();
    assert!(rendered.contains('"'));
    let parsed = parse::parse_record("s", &rendered).unwrap();
    assert_eq!(
        parsed.get("caption").and_then(|a| a.get("val")).map(String::as_str),
        Some(original)
    );
}

#[test]
fn elided_defaults_reconstruct_through_schema() {
    let mut style = StyleMap::new();
    style.insert("arcSize".into(), single_attr("val", "30".into()));
    style.insert("pointSize".into(), single_attr("val", "5".into()));
    style.insert("trace".into(), single_attr("val", "false".into()));
    assert_eq!(codec::render_record(&style), None);

    assert_eq!(schema::default_text("arcSize").as_deref(), Some("30"));
    assert_eq!(schema::default_text("pointSize").as_deref(), Some("5"));
    assert_eq!(schema::default_text("ordering").as_deref(), Some("NaN"));
}

#[test]
fn animation_record_round_trips() {
    let mut style = StyleMap::new();
    style.insert(
        "animation".into(),
        attrs(&[("playing", "true"), ("type", "3"), ("step", "0.25"), ("speed", "2")]),
    );
    let rendered = codec::render_record(&style).unwrap();
    assert_eq!(rendered, "{ animation: play =0.25 speed=2 }");
    let parsed = parse::parse_record("s", &rendered).unwrap();
    assert_eq!(parsed.properties(), &style);
}

#[test]
fn corner_list_text_round_trips() {
    use gpad::style::corners::{decode, encode, Corner};

    let payload = encode(&[
        Corner::expression(false, "A + 1"),
        Corner::coords(true, "150", "250"),
    ]);
    let mut style = StyleMap::new();
    style.insert(
        "startPoint".into(),
        single_attr(gpad::types::CORNERS_ATTR, payload.clone()),
    );

    let rendered = codec::render_record(&style).unwrap();
    assert_eq!(rendered, "{ startPoint: \"A + 1\" | absolute 150 250 }");

    let parsed = parse::parse_record("s", &rendered).unwrap();
    let reparsed = parsed
        .get("startPoint")
        .and_then(|a| a.get(gpad::types::CORNERS_ATTR))
        .unwrap();
    assert_eq!(decode(reparsed), decode(&payload));
}

#[test]
fn bar_list_text_round_trips() {
    use gpad::style::bars;
    use std::collections::BTreeMap;

    let mut source: BTreeMap<u32, AttrMap> = BTreeMap::new();
    source.insert(
        1,
        attrs(&[
            (bars::ATTR_RED, "255"),
            (bars::ATTR_GREEN, "0"),
            (bars::ATTR_BLUE, "0"),
            (bars::ATTR_ALPHA, "170"),
            (bars::ATTR_FILL_TYPE, "1"),
            (bars::ATTR_HATCH_ANGLE, "30"),
            (bars::ATTR_HATCH_DISTANCE, "10"),
        ]),
    );
    source.insert(2, attrs(&[(bars::ATTR_FILL_TYPE, "8"), (bars::ATTR_SYMBOL, "$")]));
    let payload = bars::encode(&source);

    let mut style = StyleMap::new();
    style.insert("barTag".into(), single_attr(gpad::types::BAR_TAGS_ATTR, payload.clone()));

    let rendered = codec::render_record(&style).unwrap();
    assert_eq!(
        rendered,
        "{ barTag: bar=1 #FF0000AA fill=hatch angle=30 dist=10 | bar=2 fill=symbols symbol=$ }"
    );

    let parsed = parse::parse_record("s", &rendered).unwrap();
    let reparsed = parsed
        .get("barTag")
        .and_then(|a| a.get(gpad::types::BAR_TAGS_ATTR))
        .unwrap();
    assert_eq!(bars::decode(reparsed), bars::decode(&payload));
}

#[test]
fn name_mapped_properties_round_trip() {
    let mut style = StyleMap::new();
    style.insert("algebra".into(), single_attr("labelVisible", "true".into()));
    style.insert("condition".into(), single_attr("showObject", "a > 1".into()));
    style.insert("file".into(), single_attr("name", "img.png".into()));

    let rendered = codec::render_record(&style).unwrap();
    assert_eq!(
        rendered,
        "{ hideLabelInAlgebra; showIf: \"a > 1\"; filename: img.png }"
    );
    let parsed = parse::parse_record("s", &rendered).unwrap();
    assert_eq!(parsed.properties(), &style);
}

#[test]
fn checkbox_with_fixed_round_trips() {
    let mut style = StyleMap::new();
    style.insert("checkbox".into(), single_attr("fixed", "true".into()));
    let rendered = codec::render_record(&style).unwrap();
    assert_eq!(rendered, "{ checkbox; fixed }");
    let parsed = parse::parse_record("s", &rendered).unwrap();
    assert_eq!(
        parsed.get("checkbox").and_then(|a| a.get("fixed")).map(String::as_str),
        Some("true")
    );
}
