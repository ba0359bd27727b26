//! Parses compact GPAD property text back into attribute maps, the
//! inverse of [`crate::codec`]. The external grammar parser hands us
//! one property at a time (name plus optional value text); defaults
//! suppressed by the renderer are re-expanded by the applier through
//! [`crate::schema::default_text`].

use crate::error::StyleError;
use crate::{bars, corners, schema};
use gpad_types::{single_attr, AttrMap, StyleSheet, BAR_TAGS_ATTR, CORNERS_ATTR};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while_m_n};
use nom::character::complete::{char, none_of};
use nom::combinator::{map, map_res, opt, value};
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};
use std::collections::BTreeMap;

fn run_parser<'a, O>(
    input: &'a str,
    mut parser: impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
    property: &str,
) -> Result<O, StyleError> {
    match parser.parse(input) {
        Ok((rest, parsed)) if rest.trim().is_empty() => Ok(parsed),
        Ok((rest, _)) => Err(StyleError::invalid_value(
            property,
            format!("trailing input '{rest}'"),
        )),
        Err(e) => Err(StyleError::invalid_value(property, e.to_string())),
    }
}

fn quoted_string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        alt((
            nom::bytes::complete::escaped_transform(
                none_of("\\\""),
                '\\',
                alt((
                    value('\\', char('\\')),
                    value('"', char('"')),
                    value('\n', char('n')),
                    value('\r', char('r')),
                )),
            ),
            map(tag(""), |_| String::new()),
        )),
        char('"'),
    )
    .parse(input)
}

fn hex_byte(input: &str) -> IResult<&str, u8> {
    map_res(
        take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()),
        |s: &str| u8::from_str_radix(s, 16),
    )
    .parse(input)
}

fn hex_color(input: &str) -> IResult<&str, (u8, u8, u8, Option<u8>)> {
    preceded(char('#'), (hex_byte, hex_byte, hex_byte, opt(hex_byte))).parse(input)
}

/// Strips quoting from a value token, or returns it verbatim when it
/// is not quoted.
fn unquote(text: &str, property: &str) -> Result<String, StyleError> {
    let trimmed = text.trim();
    if trimmed.starts_with('"') {
        run_parser(trimmed, quoted_string, property)
            .map_err(|_| StyleError::UnterminatedString(trimmed.to_string()))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Splits on `sep`, ignoring separators inside quoted segments.
fn split_outside_quotes(text: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quote = false;
            }
            continue;
        }
        if c == '"' {
            in_quote = true;
            current.push(c);
        } else if c == sep {
            parts.push(current.clone());
            current.clear();
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

/// Whitespace tokenizer keeping quoted segments intact.
fn tokens(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quote = false;
            }
            continue;
        }
        if c == '"' {
            in_quote = true;
            current.push(c);
        } else if c.is_whitespace() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Splits a `key=value` token; keys are never quoted.
fn key_value(token: &str) -> Option<(&str, &str)> {
    let eq = token.find('=')?;
    if token[..eq].contains('"') {
        return None;
    }
    Some((&token[..eq], &token[eq + 1..]))
}

/// Parses one property back into its XML tag name and attribute map.
/// `value` is `None` for a bare (boolean-style) property.
pub fn parse_property(name: &str, value: Option<&str>) -> Result<(String, AttrMap), StyleError> {
    let xml_tag = schema::xml_tag(name).to_string();
    let attrs = match name {
        "lineStyle" => parse_line_style(value_text(name, value)?)?,
        "objColor" | "bgColor" | "borderColor" => parse_color(name, value_text(name, value)?)?,
        "@screen" | "labelOffset" => parse_pair(name, value_text(name, value)?)?,
        "animation" => parse_animation(value_text(name, value)?)?,
        "eqnStyle" => parse_eqn_style(value_text(name, value)?)?,
        "boundingBox" | "contentSize" => {
            parse_fields(name, value_text(name, value)?, &["width", "height"], &[])?
        }
        "cropBox" => parse_fields(
            name,
            value_text(name, value)?,
            &["x", "y", "width", "height"],
            &[("cropped", "cropped", "true", "false")],
        )?,
        "dimensions" => parse_fields(
            name,
            value_text(name, value)?,
            &["width", "height", "angle"],
            &[("scaled", "unscaled", "false", "true")],
        )?,
        "checkbox" => AttrMap::new(),
        "startPoint" => parse_corners(value_text(name, value)?)?,
        "barTag" => parse_bars(value_text(name, value)?)?,
        _ => parse_simple(name, &xml_tag, value)?,
    };
    Ok((xml_tag, attrs))
}

fn value_text<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, StyleError> {
    value.ok_or_else(|| StyleError::invalid_value(name, "missing value"))
}

fn parse_simple(name: &str, xml_tag: &str, value: Option<&str>) -> Result<AttrMap, StyleError> {
    let attr = schema::value_attr(name);
    let stored = match schema::kind(name) {
        Some(schema::ValueKind::Bool) => {
            let effective = match value {
                None => "true".to_string(),
                Some(raw) => unquote(raw, name)?,
            };
            schema::value_for_keyword(xml_tag, &effective)
                .map(str::to_string)
                .unwrap_or(effective)
        }
        Some(schema::ValueKind::Int) | Some(schema::ValueKind::Float) => {
            value_text(name, value)?.trim().to_string()
        }
        Some(schema::ValueKind::Str) => {
            let keyword = unquote(value_text(name, value)?, name)?;
            schema::value_for_keyword(xml_tag, &keyword)
                .map(str::to_string)
                .unwrap_or(keyword)
        }
        // Unknown properties keep their raw text; the applier decides
        // what to do with them.
        None => match value {
            None => "true".to_string(),
            Some(raw) => unquote(raw, name)?,
        },
    };
    Ok(single_attr(attr, stored))
}

fn parse_line_style(text: &str) -> Result<AttrMap, StyleError> {
    let mut attrs = AttrMap::new();
    for token in tokens(text) {
        if let Some(code) = schema::line_style_type_value(&token) {
            attrs.insert("type".into(), code.to_string());
        } else if token == "hidden" {
            attrs.insert("typeHidden".into(), "1".into());
        } else if token == "arrow" {
            attrs.insert("drawArrow".into(), "true".into());
        } else if let Some((key, raw)) = key_value(&token) {
            match key {
                "thickness" => {
                    attrs.insert("thickness".into(), raw.to_string());
                }
                "opacity" => {
                    attrs.insert("opacity".into(), raw.to_string());
                }
                "hidden" => {
                    let code = schema::line_style_hidden_value(raw).ok_or_else(|| {
                        StyleError::invalid_value("lineStyle", format!("unknown hidden mode '{raw}'"))
                    })?;
                    attrs.insert("typeHidden".into(), code.to_string());
                }
                other => {
                    return Err(StyleError::invalid_value(
                        "lineStyle",
                        format!("unknown field '{other}'"),
                    ))
                }
            }
        } else {
            return Err(StyleError::invalid_value(
                "lineStyle",
                format!("unknown token '{token}'"),
            ));
        }
    }
    Ok(attrs)
}

fn parse_color(name: &str, text: &str) -> Result<AttrMap, StyleError> {
    let (r, g, b, a) = run_parser(text.trim(), hex_color, name)?;
    let mut attrs = AttrMap::new();
    attrs.insert("r".into(), r.to_string());
    attrs.insert("g".into(), g.to_string());
    attrs.insert("b".into(), b.to_string());
    if let Some(a) = a {
        attrs.insert("alpha".into(), (f64::from(a) / 255.0).to_string());
    }
    Ok(attrs)
}

fn parse_pair(name: &str, text: &str) -> Result<AttrMap, StyleError> {
    let parts = tokens(text);
    let [x, y] = parts.as_slice() else {
        return Err(StyleError::invalid_value(name, "expected two coordinates"));
    };
    let mut attrs = AttrMap::new();
    attrs.insert("x".into(), x.clone());
    attrs.insert("y".into(), y.clone());
    Ok(attrs)
}

fn parse_animation(text: &str) -> Result<AttrMap, StyleError> {
    let mut attrs = AttrMap::new();
    for token in tokens(text) {
        if token.eq_ignore_ascii_case("play") {
            attrs.insert("playing".into(), "true".into());
        } else if let Some(raw) = token.strip_prefix("speed=") {
            attrs.insert("speed".into(), unquote(raw, "animation")?);
        } else if let Some(step_type) = match token.chars().next() {
            Some('+') => Some("1"),
            Some('-') => Some("2"),
            Some('=') => Some("3"),
            _ => None,
        } {
            attrs.insert("type".into(), step_type.into());
            let rest = &token[1..];
            if !rest.is_empty() {
                attrs.insert("step".into(), unquote(rest, "animation")?);
            }
        } else {
            attrs.insert("step".into(), unquote(&token, "animation")?);
        }
    }
    Ok(attrs)
}

fn parse_eqn_style(text: &str) -> Result<AttrMap, StyleError> {
    let token = text.trim();
    let (style, parameter) = match token.split_once('=') {
        Some((style, parameter)) => (style, Some(parameter)),
        None => (token, None),
    };
    if !schema::is_eqn_style(style) {
        return Err(StyleError::invalid_value(
            "eqnStyle",
            format!("unknown style '{style}'"),
        ));
    }
    let mut attrs = AttrMap::new();
    attrs.insert("style".into(), style.to_string());
    if let Some(parameter) = parameter {
        attrs.insert("parameter".into(), parameter.to_string());
    }
    Ok(attrs)
}

/// Box-family field parser: known `key=value` fields plus boolean flag
/// tokens with an optional `~` negation, stored under a possibly
/// inverted attribute.
fn parse_fields(
    name: &str,
    text: &str,
    keys: &[&str],
    flags: &[(&str, &str, &str, &str)],
) -> Result<AttrMap, StyleError> {
    let mut attrs = AttrMap::new();
    'token: for token in tokens(text) {
        for (flag, attr, set, cleared) in flags {
            if token == *flag {
                attrs.insert((*attr).to_string(), (*set).to_string());
                continue 'token;
            }
            if token.strip_prefix('~') == Some(*flag) {
                attrs.insert((*attr).to_string(), (*cleared).to_string());
                continue 'token;
            }
        }
        let Some((key, raw)) = key_value(&token) else {
            return Err(StyleError::invalid_value(name, format!("unknown token '{token}'")));
        };
        if !keys.contains(&key) {
            return Err(StyleError::invalid_value(name, format!("unknown field '{key}'")));
        }
        attrs.insert(key.to_string(), raw.to_string());
    }
    Ok(attrs)
}

fn parse_corners(text: &str) -> Result<AttrMap, StyleError> {
    let mut list = Vec::new();
    for part in split_outside_quotes(text, '|') {
        let mut toks = tokens(&part);
        if toks.is_empty() {
            continue;
        }
        let absolute = match toks[0].as_str() {
            "absolute" => {
                toks.remove(0);
                true
            }
            "~absolute" => {
                toks.remove(0);
                false
            }
            _ => false,
        };
        if toks.len() == 1 && toks[0].starts_with('"') {
            let exp = unquote(&toks[0], "startPoint")?;
            list.push(corners::Corner::expression(absolute, exp));
        } else if toks.len() == 2 || toks.len() == 3 {
            list.push(corners::Corner {
                absolute,
                data: corners::CornerData::Coords {
                    x: toks[0].clone(),
                    y: toks[1].clone(),
                    z: toks.get(2).cloned(),
                },
            });
        } else {
            return Err(StyleError::invalid_value(
                "startPoint",
                format!("malformed corner '{}'", part.trim()),
            ));
        }
    }
    if list.is_empty() {
        return Err(StyleError::invalid_value("startPoint", "no corners"));
    }
    Ok(single_attr(CORNERS_ATTR, corners::encode(&list)))
}

fn parse_bars(text: &str) -> Result<AttrMap, StyleError> {
    let mut collected: BTreeMap<u32, AttrMap> = BTreeMap::new();
    for part in split_outside_quotes(text, '|') {
        let mut number: Option<u32> = None;
        let mut attrs = AttrMap::new();
        for token in tokens(&part) {
            if let Some(raw) = token.strip_prefix("bar=") {
                number = Some(raw.parse::<u32>().map_err(|_| {
                    StyleError::invalid_value("barTag", format!("bad bar number '{raw}'"))
                })?);
            } else if token.starts_with('#') {
                let (r, g, b, a) = run_parser(&token, hex_color, "barTag")?;
                attrs.insert(bars::ATTR_RED.into(), r.to_string());
                attrs.insert(bars::ATTR_GREEN.into(), g.to_string());
                attrs.insert(bars::ATTR_BLUE.into(), b.to_string());
                if let Some(a) = a {
                    attrs.insert(bars::ATTR_ALPHA.into(), a.to_string());
                }
            } else if let Some(raw) = token.strip_prefix("fill=") {
                let code = schema::fill_type_value(raw).ok_or_else(|| {
                    StyleError::invalid_value("barTag", format!("unknown fill '{raw}'"))
                })?;
                attrs.insert(bars::ATTR_FILL_TYPE.into(), code.to_string());
            } else if let Some(raw) = token.strip_prefix("angle=") {
                attrs.insert(bars::ATTR_HATCH_ANGLE.into(), raw.to_string());
            } else if let Some(raw) = token.strip_prefix("dist=") {
                attrs.insert(bars::ATTR_HATCH_DISTANCE.into(), raw.to_string());
            } else if let Some(raw) = token.strip_prefix("image=") {
                attrs.insert(bars::ATTR_IMAGE.into(), unquote(raw, "barTag")?);
            } else if let Some(raw) = token.strip_prefix("symbol=") {
                attrs.insert(bars::ATTR_SYMBOL.into(), unquote(raw, "barTag")?);
            } else {
                return Err(StyleError::invalid_value(
                    "barTag",
                    format!("unknown token '{token}'"),
                ));
            }
        }
        let Some(number) = number else {
            return Err(StyleError::invalid_value("barTag", "bar without bar= number"));
        };
        collected.insert(number, attrs);
    }
    if collected.is_empty() {
        return Err(StyleError::invalid_value("barTag", "no bars"));
    }
    Ok(single_attr(BAR_TAGS_ATTR, bars::encode(&collected)))
}

/// Parses a full style record body (the text between the braces) into
/// a [`StyleSheet`]. A leading `~` marks a property reset; a bare
/// `fixed` token folds into a preceding `checkbox` property, matching
/// the renderer.
pub fn parse_record(name: &str, body: &str) -> Result<StyleSheet, StyleError> {
    let body = body.trim();
    let body = body
        .strip_prefix('{')
        .and_then(|b| b.strip_suffix('}'))
        .unwrap_or(body);

    let mut sheet = StyleSheet::new(name);
    for segment in split_outside_quotes(body, ';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if let Some(reset_name) = segment.strip_prefix('~') {
            sheet.reset_property(schema::xml_tag(reset_name.trim()));
            continue;
        }
        let (prop_name, prop_value) = match segment.split_once(':') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (segment, None),
        };
        if prop_name == "fixed" && prop_value.is_none() && sheet.get("checkbox").is_some() {
            sheet.set_property("checkbox", single_attr("fixed", "true".into()));
            continue;
        }
        let (xml_tag, attrs) = parse_property(prop_name, prop_value)?;
        sheet.set_property(&xml_tag, attrs);
    }
    Ok(sheet)
}
