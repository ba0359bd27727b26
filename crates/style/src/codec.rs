//! Renders attribute maps into compact GPAD property text.
//!
//! Most properties take the generic single-value path driven by the
//! schema tables. A handful of tags carry multiple attributes and get
//! bespoke renderers; the corner and bar lists arrive pre-encoded in
//! their transport payloads and are expanded to their textual form
//! here.

use crate::schema;
use crate::{bars, corners};
use gpad_types::{AttrMap, StyleMap, BAR_TAGS_ATTR, CORNERS_ATTR, RESET_MARKER};

/// Characters that force a string value into quoted form.
fn needs_quoting(value: &str) -> bool {
    value
        .chars()
        .any(|c| matches!(c, ';' | '"' | '}' | '\t' | ' ' | '\r' | '\n'))
}

fn escape_into(value: &str, out: &mut String) {
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
}

/// Quotes and escapes `value` when it contains separator or control
/// characters, otherwise returns it verbatim.
pub fn quote_if_needed(value: &str) -> String {
    if needs_quoting(value) {
        let mut out = String::with_capacity(value.len() + 2);
        escape_into(value, &mut out);
        out
    } else {
        value.to_string()
    }
}

/// Always-quoted form, used for corner expressions.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    escape_into(value, &mut out);
    out
}

/// Whether a raw value is a literal number rather than an expression.
/// Expression-valued animation fields render quoted.
fn is_plain_number(value: &str) -> bool {
    let mut chars = value.chars().peekable();
    let mut digits = false;
    while let Some(c) = chars.peek() {
        if c.is_ascii_digit() {
            digits = true;
            chars.next();
        } else {
            break;
        }
    }
    if !digits {
        return false;
    }
    if chars.peek() == Some(&'.') {
        chars.next();
        let mut frac = false;
        while let Some(c) = chars.peek() {
            if c.is_ascii_digit() {
                frac = true;
                chars.next();
            } else {
                break;
            }
        }
        if !frac {
            return false;
        }
    }
    chars.next().is_none()
}

/// Renders one property, or `None` when it is elided (default value,
/// false boolean, unknown tag, nothing to say).
pub fn render_property(xml_tag: &str, attrs: &AttrMap) -> Option<String> {
    match xml_tag {
        "lineStyle" => render_line_style(attrs),
        "objColor" | "bgColor" | "borderColor" => render_color(xml_tag, attrs),
        "absoluteScreenLocation" | "labelOffset" => render_pair(xml_tag, attrs),
        "animation" => render_animation(attrs),
        "eqnStyle" => render_eqn_style(attrs),
        "boundingBox" | "contentSize" => render_size_box(xml_tag, attrs),
        "cropBox" => render_crop_box(attrs),
        "dimensions" => render_dimensions(attrs),
        "checkbox" => render_checkbox(attrs),
        "startPoint" => render_corners(attrs),
        "barTag" => render_bars(attrs),
        _ => render_simple(xml_tag, attrs),
    }
}

fn effective_value<'a>(gpad_name: &str, attrs: &'a AttrMap) -> Option<&'a str> {
    let attr = schema::value_attr(gpad_name);
    if let Some(value) = attrs.get(attr) {
        return Some(value.as_str());
    }
    // Single-attribute tags fall back to that sole value, which covers
    // tags whose value attribute is nonstandard (e.g. decoration's
    // `type`).
    if attrs.len() == 1 {
        return attrs.values().next().map(String::as_str);
    }
    None
}

fn render_simple(xml_tag: &str, attrs: &AttrMap) -> Option<String> {
    let name = schema::gpad_name(xml_tag);
    let raw = effective_value(name, attrs)?;
    match schema::kind(name)? {
        schema::ValueKind::Bool => {
            let effective = schema::keyword_for_value(xml_tag, raw).unwrap_or(raw);
            (effective == "true").then(|| name.to_string())
        }
        schema::ValueKind::Int | schema::ValueKind::Float => {
            if schema::is_default(name, raw) {
                None
            } else {
                Some(format!("{name}: {raw}"))
            }
        }
        schema::ValueKind::Str => {
            if schema::is_default(name, raw) {
                return None;
            }
            let translated = schema::keyword_for_value(xml_tag, raw).unwrap_or(raw);
            Some(format!("{name}: {}", quote_if_needed(translated)))
        }
    }
}

fn render_line_style(attrs: &AttrMap) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(type_raw) = attrs.get("type") {
        if let Some(keyword) = type_raw
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(schema::line_style_type_keyword)
        {
            parts.push(keyword.to_string());
        }
    }
    if let Some(thickness) = attrs.get("thickness") {
        parts.push(format!("thickness={thickness}"));
    }
    if let Some(hidden_raw) = attrs.get("typeHidden") {
        match hidden_raw
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(schema::line_style_hidden_keyword)
        {
            Some("") => {}
            Some(keyword) => parts.push(format!("hidden={keyword}")),
            None => parts.push("hidden".to_string()),
        }
    }
    if let Some(opacity) = attrs.get("opacity") {
        parts.push(format!("opacity={opacity}"));
    }
    if attrs.get("drawArrow").map(String::as_str) == Some("true") {
        parts.push("arrow".to_string());
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("lineStyle: {}", parts.join(" ")))
    }
}

fn channel(attrs: &AttrMap, key: &str) -> Result<i64, ()> {
    match attrs.get(key) {
        None => Ok(0),
        Some(raw) => raw.trim().parse::<i64>().map(|v| v.clamp(0, 255)).map_err(|_| ()),
    }
}

fn render_color(xml_tag: &str, attrs: &AttrMap) -> Option<String> {
    let hex = match (channel(attrs, "r"), channel(attrs, "g"), channel(attrs, "b")) {
        (Ok(r), Ok(g), Ok(b)) => {
            let mut hex = format!("#{r:02X}{g:02X}{b:02X}");
            let alpha = attrs
                .get("alpha")
                .map(|raw| raw.trim().parse::<f64>().unwrap_or(1.0))
                .unwrap_or(1.0);
            if (alpha - 1.0).abs() > 1e-6 {
                let quantized = ((alpha * 255.0).round() as i64).clamp(0, 255);
                hex.push_str(&format!("{quantized:02X}"));
            }
            hex
        }
        // A channel that fails to parse blanks the whole colour.
        _ => "#000000".to_string(),
    };
    Some(format!("{}: {hex}", schema::gpad_name(xml_tag)))
}

fn render_pair(xml_tag: &str, attrs: &AttrMap) -> Option<String> {
    let x = attrs.get("x")?;
    let y = attrs.get("y")?;
    Some(format!("{}: {x} {y}", schema::gpad_name(xml_tag)))
}

fn quote_if_expression(value: &str) -> String {
    if is_plain_number(value) {
        value.to_string()
    } else {
        quote(value)
    }
}

fn render_animation(attrs: &AttrMap) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if attrs.get("playing").map(String::as_str) == Some("true") {
        parts.push("play".to_string());
    }
    let prefix = match attrs.get("type").map(|t| t.trim()) {
        Some("1") => "+",
        Some("2") => "-",
        Some("3") => "=",
        _ => "",
    };
    let step = attrs.get("step").map(String::as_str).filter(|raw| {
        !raw.trim()
            .parse::<f64>()
            .map(|v| (v - 0.1).abs() < 1e-9)
            .unwrap_or(false)
    });
    match (prefix, step) {
        ("", None) => {}
        (prefix, None) => parts.push(prefix.to_string()),
        (prefix, Some(step)) => parts.push(format!("{prefix}{}", quote_if_expression(step))),
    }
    if let Some(speed) = attrs.get("speed") {
        let is_one = speed.trim().parse::<f64>().map(|v| (v - 1.0).abs() < 1e-9).unwrap_or(false);
        if !is_one {
            parts.push(format!("speed={}", quote_if_expression(speed)));
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("animation: {}", parts.join(" ")))
    }
}

fn render_eqn_style(attrs: &AttrMap) -> Option<String> {
    let style = attrs.get("style")?;
    let value = match attrs.get("parameter") {
        Some(parameter) if style == "parametric" => format!("{style}={parameter}"),
        _ => style.clone(),
    };
    Some(format!("eqnStyle: {value}"))
}

fn push_field(parts: &mut Vec<String>, attrs: &AttrMap, key: &str) {
    if let Some(value) = attrs.get(key) {
        parts.push(format!("{key}={value}"));
    }
}

fn render_size_box(xml_tag: &str, attrs: &AttrMap) -> Option<String> {
    let mut parts = Vec::new();
    push_field(&mut parts, attrs, "width");
    push_field(&mut parts, attrs, "height");
    if parts.is_empty() {
        None
    } else {
        Some(format!("{xml_tag}: {}", parts.join(" ")))
    }
}

fn render_crop_box(attrs: &AttrMap) -> Option<String> {
    let mut parts = Vec::new();
    push_field(&mut parts, attrs, "x");
    push_field(&mut parts, attrs, "y");
    push_field(&mut parts, attrs, "width");
    push_field(&mut parts, attrs, "height");
    if attrs.get("cropped").map(String::as_str) == Some("true") {
        parts.push("cropped".to_string());
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("cropBox: {}", parts.join(" ")))
    }
}

fn render_dimensions(attrs: &AttrMap) -> Option<String> {
    let mut parts = Vec::new();
    push_field(&mut parts, attrs, "width");
    push_field(&mut parts, attrs, "height");
    if let Some(angle) = attrs.get("angle") {
        let is_zero = angle.trim().parse::<f64>().map(|v| v.abs() < 1e-9).unwrap_or(false);
        if !is_zero {
            parts.push(format!("angle={angle}"));
        }
    }
    // The stored flag is `unscaled`; the textual form speaks in terms
    // of the positive sense.
    if attrs.get("unscaled").map(String::as_str) == Some("false") {
        parts.push("scaled".to_string());
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("dimensions: {}", parts.join(" ")))
    }
}

fn render_checkbox(attrs: &AttrMap) -> Option<String> {
    if attrs.get("fixed").map(String::as_str) == Some("true") {
        Some("checkbox; fixed".to_string())
    } else {
        Some("checkbox".to_string())
    }
}

fn render_corners(attrs: &AttrMap) -> Option<String> {
    let payload = attrs.get(CORNERS_ATTR)?;
    let mut parts: Vec<String> = Vec::new();
    corners::decode_with(payload, |_, corner| {
        let mut text = String::new();
        if corner.absolute {
            text.push_str("absolute ");
        }
        match (&corner.expression, &corner.x, &corner.y) {
            (Some(exp), _, _) => text.push_str(&quote(exp)),
            (None, Some(x), Some(y)) => {
                text.push_str(x);
                text.push(' ');
                text.push_str(y);
                if let Some(z) = &corner.z {
                    text.push(' ');
                    text.push_str(z);
                }
            }
            _ => return,
        }
        parts.push(text);
    });
    if parts.is_empty() {
        None
    } else {
        Some(format!("startPoint: {}", parts.join(" | ")))
    }
}

fn render_bars(attrs: &AttrMap) -> Option<String> {
    let payload = attrs.get(BAR_TAGS_ATTR)?;
    let mut parts: Vec<String> = Vec::new();
    bars::decode_with(payload, |bar| {
        let mut tokens = vec![format!("bar={}", bar.number)];
        let [r, g, b, a] = bar.rgba;
        if r >= 0 && g >= 0 && b >= 0 {
            let mut hex = format!("#{r:02X}{g:02X}{b:02X}");
            if a >= 0 {
                hex.push_str(&format!("{a:02X}"));
            }
            tokens.push(hex);
        }
        if let Some(name) = bar.fill_type.and_then(schema::fill_type_name) {
            tokens.push(format!("fill={name}"));
        }
        if let Some(angle) = bar.hatch_angle {
            tokens.push(format!("angle={angle}"));
        }
        if let Some(distance) = bar.hatch_distance {
            tokens.push(format!("dist={distance}"));
        }
        if let Some(image) = &bar.image {
            tokens.push(format!("image={}", quote_if_needed(image)));
        }
        if let Some(symbol) = bar.symbol {
            tokens.push(format!("symbol={}", quote_if_needed(&symbol.to_string())));
        }
        parts.push(tokens.join(" "));
    });
    if parts.is_empty() {
        None
    } else {
        Some(format!("barTag: {}", parts.join(" | ")))
    }
}

/// Renders a full style record body. Tags render in map order; empty
/// renders are dropped; `None` when no property renders at all.
pub fn render_record(style: &StyleMap) -> Option<String> {
    let mut rendered: Vec<String> = Vec::new();
    for (tag, attrs) in style {
        if attrs.len() == 1 && attrs.contains_key(RESET_MARKER) {
            // A bare reset carries no renderable value.
            continue;
        }
        if let Some(text) = render_property(tag, attrs) {
            rendered.push(text);
        }
    }
    if rendered.is_empty() {
        None
    } else {
        Some(format!("{{ {} }}", rendered.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpad_types::single_attr;

    fn attrs(pairs: &[(&str, &str)]) -> AttrMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn boolean_true_renders_bare_name() {
        assert_eq!(
            render_property("trace", &single_attr("val", "true".into())),
            Some("trace".to_string())
        );
        assert_eq!(render_property("trace", &single_attr("val", "false".into())), None);
    }

    #[test]
    fn label_visibility_uses_raw_sense() {
        // labelVisible="false" is the stored default; nothing renders.
        assert_eq!(
            render_property("algebra", &single_attr("labelVisible", "false".into())),
            None
        );
        assert_eq!(
            render_property("algebra", &single_attr("labelVisible", "true".into())),
            Some("hideLabelInAlgebra".to_string())
        );
    }

    #[test]
    fn right_angle_emphasis_is_inverted() {
        assert_eq!(
            render_property("emphasizeRightAngle", &single_attr("val", "false".into())),
            Some("showGeneralAngle".to_string())
        );
        assert_eq!(
            render_property("emphasizeRightAngle", &single_attr("val", "true".into())),
            None
        );
    }

    #[test]
    fn defaults_are_elided() {
        assert_eq!(render_property("arcSize", &single_attr("val", "30".into())), None);
        assert_eq!(
            render_property("arcSize", &single_attr("val", "45".into())),
            Some("arcSize: 45".to_string())
        );
        assert_eq!(render_property("pointSize", &single_attr("val", "5.0".into())), None);
        assert_eq!(render_property("ordering", &single_attr("val", "NaN".into())), None);
    }

    #[test]
    fn enum_values_translate() {
        assert_eq!(
            render_property("pointStyle", &single_attr("val", "4".into())),
            Some("pointStyle: diamond".to_string())
        );
        assert_eq!(
            render_property("labelMode", &single_attr("val", "3".into())),
            Some("labelMode: caption".to_string())
        );
    }

    #[test]
    fn decoration_uses_sole_attribute() {
        assert_eq!(
            render_property("decoration", &single_attr("type", "3".into())),
            Some("decoration: triple_tick".to_string())
        );
        assert_eq!(render_property("decoration", &single_attr("type", "0".into())), None);
    }

    #[test]
    fn string_values_quote_when_needed() {
        assert_eq!(
            render_property("caption", &single_attr("val", "plain".into())),
            Some("caption: plain".to_string())
        );
        assert_eq!(
            render_property("caption", &single_attr("val", "two words; more".into())),
            Some("caption: \"two words; more\"".to_string())
        );
    }

    #[test]
    fn unknown_tags_are_silently_omitted() {
        assert_eq!(render_property("noSuchTag", &single_attr("val", "x".into())), None);
    }

    #[test]
    fn line_style_renders_present_fields() {
        let a = attrs(&[
            ("type", "15"),
            ("thickness", "5"),
            ("typeHidden", "1"),
            ("opacity", "178"),
            ("drawArrow", "true"),
        ]);
        assert_eq!(
            render_property("lineStyle", &a),
            Some("lineStyle: dashedlong thickness=5 hidden=dashed opacity=178 arrow".to_string())
        );
    }

    #[test]
    fn line_style_hidden_zero_is_omitted() {
        let a = attrs(&[("type", "0"), ("typeHidden", "0")]);
        assert_eq!(render_property("lineStyle", &a), Some("lineStyle: full".to_string()));
    }

    #[test]
    fn colour_renders_hex_with_optional_alpha() {
        let a = attrs(&[("r", "255"), ("g", "0"), ("b", "0")]);
        assert_eq!(render_property("objColor", &a), Some("objColor: #FF0000".to_string()));

        let a = attrs(&[("r", "0"), ("g", "128"), ("b", "255"), ("alpha", "0.5")]);
        assert_eq!(render_property("bgColor", &a), Some("bgColor: #0080FF80".to_string()));
    }

    #[test]
    fn colour_parse_failure_blanks_to_black() {
        let a = attrs(&[("r", "red"), ("g", "0"), ("b", "0")]);
        assert_eq!(render_property("objColor", &a), Some("objColor: #000000".to_string()));
    }

    #[test]
    fn missing_channels_default_to_zero() {
        let a = attrs(&[("b", "255")]);
        assert_eq!(render_property("objColor", &a), Some("objColor: #0000FF".to_string()));
    }

    #[test]
    fn screen_location_renders_pair() {
        let a = attrs(&[("x", "300"), ("y", "400")]);
        assert_eq!(
            render_property("absoluteScreenLocation", &a),
            Some("@screen: 300 400".to_string())
        );
        assert_eq!(render_property("absoluteScreenLocation", &attrs(&[("x", "1")])), None);
    }

    #[test]
    fn animation_renders_play_step_speed() {
        let a = attrs(&[("playing", "true"), ("type", "1"), ("step", "0.5"), ("speed", "2")]);
        assert_eq!(
            render_property("animation", &a),
            Some("animation: play +0.5 speed=2".to_string())
        );
    }

    #[test]
    fn animation_elides_defaults() {
        let a = attrs(&[("step", "0.1"), ("speed", "1")]);
        assert_eq!(render_property("animation", &a), None);

        // A non-oscillating type keeps its prefix even at default step.
        let a = attrs(&[("type", "2"), ("step", "0.1")]);
        assert_eq!(render_property("animation", &a), Some("animation: -".to_string()));
    }

    #[test]
    fn animation_quotes_expression_fields() {
        let a = attrs(&[("step", "a+1")]);
        assert_eq!(render_property("animation", &a), Some("animation: \"a+1\"".to_string()));
    }

    #[test]
    fn eqn_style_parameter_only_when_parametric() {
        let a = attrs(&[("style", "parametric"), ("parameter", "t")]);
        assert_eq!(render_property("eqnStyle", &a), Some("eqnStyle: parametric=t".to_string()));

        let a = attrs(&[("style", "explicit"), ("parameter", "t")]);
        assert_eq!(render_property("eqnStyle", &a), Some("eqnStyle: explicit".to_string()));
    }

    #[test]
    fn crop_box_renders_fields_and_flag() {
        let a = attrs(&[("x", "0"), ("y", "5"), ("width", "80"), ("height", "60"), ("cropped", "true")]);
        assert_eq!(
            render_property("cropBox", &a),
            Some("cropBox: x=0 y=5 width=80 height=60 cropped".to_string())
        );
    }

    #[test]
    fn dimensions_invert_unscaled_and_drop_zero_angle() {
        let a = attrs(&[("width", "100"), ("height", "50"), ("angle", "0"), ("unscaled", "false")]);
        assert_eq!(
            render_property("dimensions", &a),
            Some("dimensions: width=100 height=50 scaled".to_string())
        );
        let a = attrs(&[("width", "100"), ("height", "50"), ("angle", "45"), ("unscaled", "true")]);
        assert_eq!(
            render_property("dimensions", &a),
            Some("dimensions: width=100 height=50 angle=45".to_string())
        );
    }

    #[test]
    fn checkbox_emits_fixed_token_when_fixed() {
        assert_eq!(
            render_property("checkbox", &attrs(&[("fixed", "true")])),
            Some("checkbox; fixed".to_string())
        );
        assert_eq!(render_property("checkbox", &AttrMap::new()), Some("checkbox".to_string()));
    }

    #[test]
    fn corners_render_pipe_joined() {
        let payload = corners::encode(&[
            corners::Corner::expression(false, "A"),
            corners::Corner::coords(false, "100", "200"),
            corners::Corner::coords(true, "150", "250"),
        ]);
        let a = single_attr(CORNERS_ATTR, payload);
        assert_eq!(
            render_property("startPoint", &a),
            Some("startPoint: \"A\" | 100 200 | absolute 150 250".to_string())
        );
    }

    #[test]
    fn bars_render_pipe_joined() {
        let mut source = std::collections::BTreeMap::new();
        source.insert(
            1,
            attrs(&[("r", "255"), ("g", "0"), ("b", "0"), ("fillType", "1"), ("hatchAngle", "30")]),
        );
        source.insert(2, attrs(&[("fillType", "9"), ("image", "img/p.png")]));
        let a = single_attr(BAR_TAGS_ATTR, bars::encode(&source));
        assert_eq!(
            render_property("barTag", &a),
            Some("barTag: bar=1 #FF0000 fill=hatch angle=30 | bar=2 fill=image image=img/p.png".to_string())
        );
    }

    #[test]
    fn record_joins_properties_in_map_order() {
        let mut style = StyleMap::new();
        style.insert("pointSize".into(), single_attr("val", "7".into()));
        style.insert("objColor".into(), attrs(&[("r", "255"), ("g", "0"), ("b", "0")]));
        style.insert("arcSize".into(), single_attr("val", "30".into()));
        assert_eq!(
            render_record(&style),
            Some("{ pointSize: 7; objColor: #FF0000 }".to_string())
        );
    }

    #[test]
    fn record_with_only_defaults_renders_nothing() {
        let mut style = StyleMap::new();
        style.insert("arcSize".into(), single_attr("val", "30".into()));
        assert_eq!(render_record(&style), None);
    }
}
