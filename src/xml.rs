//! XML front end: turns one `<element>` fragment into the normalized
//! attribute map consumed by the style codec.
//!
//! Child tags map straight through, with two exceptions folded into
//! their transport payloads: `startPoint` children accumulate into a
//! corner list keyed by their `number` attribute, and `tag` children
//! group into per-bar attribute sets keyed by `barNumber`.

use crate::error::{GpadError, Location};
use gpad_style::{bars, corners};
use gpad_types::{single_attr, AttrMap, StyleMap, BAR_TAGS_ATTR, CORNERS_ATTR};
use log::error;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

fn read_attributes(e: &BytesStart) -> Result<AttrMap, GpadError> {
    let mut attrs = AttrMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn corner_from_attrs(attrs: &AttrMap) -> Option<corners::Corner> {
    let absolute = attrs.get("absolute").map(String::as_str) == Some("true");
    if let Some(exp) = attrs.get("exp") {
        return Some(corners::Corner::expression(absolute, exp.clone()));
    }
    let x = attrs.get("x")?;
    let y = attrs.get("y")?;
    Some(corners::Corner {
        absolute,
        data: corners::CornerData::Coords {
            x: x.clone(),
            y: y.clone(),
            z: attrs.get("z").cloned(),
        },
    })
}

fn corner_index(attrs: &AttrMap) -> Option<usize> {
    match attrs.get("number") {
        None => Some(0),
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(n) if n >= 0 => Some(n as usize),
            Ok(n) => {
                error!("ignoring corner with negative index {n}");
                None
            }
            Err(_) => Some(0),
        },
    }
}

/// Parses an `rgb(r,g,b)` / `rgba(r,g,b,a)` colour expression into the
/// bar attribute keys.
fn apply_bar_color(value: &str, bar: &mut AttrMap) {
    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix("rgba")
        .or_else(|| trimmed.strip_prefix("rgb"))
        .and_then(|rest| rest.trim().strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'));
    let Some(inner) = inner else {
        error!("ignoring unparseable bar colour '{value}'");
        return;
    };
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        error!("ignoring unparseable bar colour '{value}'");
        return;
    }
    for (key, raw) in [bars::ATTR_RED, bars::ATTR_GREEN, bars::ATTR_BLUE].iter().zip(&parts) {
        bar.insert((*key).to_string(), (*raw).to_string());
    }
    if let Some(raw) = parts.get(3) {
        if let Ok(alpha) = raw.parse::<f64>() {
            let quantized = ((alpha * 255.0).round() as i64).clamp(0, 255);
            bar.insert(bars::ATTR_ALPHA.to_string(), quantized.to_string());
        }
    }
}

fn apply_bar_entry(attrs: &AttrMap, collected: &mut BTreeMap<u32, AttrMap>) {
    let (Some(number), Some(key), Some(value)) =
        (attrs.get("barNumber"), attrs.get("key"), attrs.get("value"))
    else {
        error!("ignoring bar tag without barNumber/key/value");
        return;
    };
    let Ok(number) = number.trim().parse::<u32>() else {
        error!("ignoring bar tag with bad barNumber '{number}'");
        return;
    };
    let bar = collected.entry(number).or_default();
    match key.as_str() {
        "barColor" => apply_bar_color(value, bar),
        "barAlpha" => {
            if let Ok(alpha) = value.trim().parse::<f64>() {
                let quantized = ((alpha * 255.0).round() as i64).clamp(0, 255);
                bar.insert(bars::ATTR_ALPHA.to_string(), quantized.to_string());
            }
        }
        other => {
            bar.insert(other.to_string(), value.clone());
        }
    }
}

/// Parses one `<element>` fragment into its style map. The fragment
/// may carry leading/trailing whitespace but must contain exactly one
/// top-level `<element>`.
pub fn parse_element_style(xml: &str) -> Result<StyleMap, GpadError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut style = StyleMap::new();
    let mut corner_builder = corners::CornerListBuilder::new();
    let mut collected_bars: BTreeMap<u32, AttrMap> = BTreeMap::new();
    let mut in_element = false;
    let mut depth = 0usize;

    let mut handle_child = |name: &str,
                            attrs: AttrMap,
                            style: &mut StyleMap,
                            corner_builder: &mut corners::CornerListBuilder,
                            collected_bars: &mut BTreeMap<u32, AttrMap>| {
        match name {
            "startPoint" => {
                if let (Some(index), Some(corner)) =
                    (corner_index(&attrs), corner_from_attrs(&attrs))
                {
                    corner_builder.insert(index, corner);
                }
            }
            "tag" => apply_bar_entry(&attrs, collected_bars),
            _ => {
                style.insert(name.to_string(), attrs);
            }
        }
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if !in_element {
                    if name == "element" {
                        in_element = true;
                    }
                    continue;
                }
                if depth == 0 {
                    let attrs = read_attributes(&e)?;
                    handle_child(
                        &name,
                        attrs,
                        &mut style,
                        &mut corner_builder,
                        &mut collected_bars,
                    );
                }
                depth += 1;
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if !in_element {
                    if name == "element" {
                        // Self-closing element: no style children at all.
                        break;
                    }
                    continue;
                }
                if depth == 0 {
                    let attrs = read_attributes(&e)?;
                    handle_child(
                        &name,
                        attrs,
                        &mut style,
                        &mut corner_builder,
                        &mut collected_bars,
                    );
                }
            }
            Event::End(e) => {
                if in_element {
                    if depth == 0 {
                        if e.name().as_ref() == b"element" {
                            break;
                        }
                    } else {
                        depth -= 1;
                    }
                }
            }
            Event::Eof => {
                if in_element {
                    let location = Location::of_offset(xml, reader.buffer_position() as usize);
                    return Err(GpadError::parse("unterminated <element>", location));
                }
                break;
            }
            _ => {}
        }
    }

    if let Some(payload) = corner_builder.finish() {
        style.insert("startPoint".to_string(), single_attr(CORNERS_ATTR, payload));
    }
    if !collected_bars.is_empty() {
        style.insert(
            "barTag".to_string(),
            single_attr(BAR_TAGS_ATTR, bars::encode(&collected_bars)),
        );
    }
    Ok(style)
}

/// Slices the `<element>…</element>` span for `label` (or the first
/// element when `label` is `None`) out of a larger document.
pub fn extract_element_fragment<'a>(
    doc: &'a str,
    label: Option<&str>,
) -> Result<Option<&'a str>, GpadError> {
    let mut reader = Reader::from_str(doc);
    let mut start: Option<usize> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                if start.is_none() && name.as_ref() == b"element" {
                    let matches = match label {
                        None => true,
                        Some(wanted) => read_attributes(&e)?
                            .get("label")
                            .map(|l| l == wanted)
                            .unwrap_or(false),
                    };
                    if matches {
                        // Rewind over `<` + content + `>`.
                        start = Some(reader.buffer_position() as usize - e.len() - 2);
                        depth = 0;
                        continue;
                    }
                }
                if start.is_some() {
                    depth += 1;
                }
            }
            Event::Empty(e) => {
                if start.is_none() && e.name().as_ref() == b"element" {
                    let matches = match label {
                        None => true,
                        Some(wanted) => read_attributes(&e)?
                            .get("label")
                            .map(|l| l == wanted)
                            .unwrap_or(false),
                    };
                    if matches {
                        let end = reader.buffer_position() as usize;
                        return Ok(Some(&doc[end - e.len() - 3..end]));
                    }
                }
            }
            Event::End(e) => {
                if let Some(from) = start {
                    if depth == 0 && e.name().as_ref() == b"element" {
                        let end = reader.buffer_position() as usize;
                        return Ok(Some(&doc[from..end]));
                    }
                    depth = depth.saturating_sub(1);
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_children_map_through() {
        let style = parse_element_style(
            r#"<element type="point" label="A">
                <objColor r="255" g="0" b="0" alpha="0.0"/>
                <pointSize val="7"/>
            </element>"#,
        )
        .unwrap();
        assert_eq!(style.len(), 2);
        assert_eq!(
            style.get("objColor").and_then(|a| a.get("r")).map(String::as_str),
            Some("255")
        );
        assert_eq!(
            style.get("pointSize").and_then(|a| a.get("val")).map(String::as_str),
            Some("7")
        );
    }

    #[test]
    fn start_points_fold_into_corner_payload() {
        let style = parse_element_style(
            r#"<element type="image" label="pic">
                <startPoint number="1" x="3" y="4"/>
                <startPoint exp="A"/>
            </element>"#,
        )
        .unwrap();
        let payload = style.get("startPoint").and_then(|a| a.get(CORNERS_ATTR)).unwrap();
        let decoded = corners::decode(payload);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].expression.as_deref(), Some("A"));
        assert_eq!(decoded[1].x.as_deref(), Some("3"));
    }

    #[test]
    fn negative_corner_index_is_ignored() {
        let style = parse_element_style(
            r#"<element type="image" label="pic">
                <startPoint number="-1" x="3" y="4"/>
                <startPoint number="0" x="1" y="2"/>
            </element>"#,
        )
        .unwrap();
        let payload = style.get("startPoint").and_then(|a| a.get(CORNERS_ATTR)).unwrap();
        assert_eq!(corners::decode(payload).len(), 1);
    }

    #[test]
    fn bar_tags_group_by_number() {
        let style = parse_element_style(
            r#"<element type="barchart" label="chart">
                <tag barNumber="1" key="barColor" value="rgb(255,0,0)"/>
                <tag barNumber="1" key="fillType" value="1"/>
                <tag barNumber="2" key="barAlpha" value="0.5"/>
                <tag barNumber="2" key="fillType" value="0"/>
            </element>"#,
        )
        .unwrap();
        let payload = style.get("barTag").and_then(|a| a.get(BAR_TAGS_ATTR)).unwrap();
        let decoded = bars::decode(payload);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].rgba[..3], [255, 0, 0]);
        assert_eq!(decoded[0].fill_type, Some(1));
        assert_eq!(decoded[1].rgba[3], 128);
    }

    #[test]
    fn nested_markup_below_children_is_skipped() {
        let style = parse_element_style(
            r#"<element type="text" label="t">
                <caption val="hello">
                    <ignored deep="true"/>
                </caption>
            </element>"#,
        )
        .unwrap();
        assert!(style.contains_key("caption"));
        assert!(!style.contains_key("ignored"));
    }

    #[test]
    fn unterminated_element_reports_location() {
        let err = parse_element_style("<element type=\"point\"><pointSize val=\"7\"/>")
            .err()
            .unwrap();
        assert!(matches!(err, GpadError::Parse { .. }));
    }

    #[test]
    fn fragment_extraction_by_label() {
        let doc = r#"<construction>
            <element type="point" label="A"><pointSize val="3"/></element>
            <element type="point" label="B"><pointSize val="9"/></element>
        </construction>"#;
        let fragment = extract_element_fragment(doc, Some("B")).unwrap().unwrap();
        assert!(fragment.starts_with("<element"));
        assert!(fragment.contains("val=\"9\""));
        assert!(fragment.ends_with("</element>"));

        assert_eq!(extract_element_fragment(doc, Some("missing")).unwrap(), None);
    }

    #[test]
    fn fragment_extraction_handles_self_closing() {
        let doc = r#"<construction><element type="point" label="A"/></construction>"#;
        let fragment = extract_element_fragment(doc, Some("A")).unwrap().unwrap();
        assert_eq!(fragment, r#"<element type="point" label="A"/>"#);
    }
}
