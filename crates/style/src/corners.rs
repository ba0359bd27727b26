//! Fixed-field sub-encoding for ordered corner lists.
//!
//! A corner list travels as one opaque string inside the `_corners`
//! attribute. Each corner is two single-character flags followed by a
//! payload: the first flag says absolute or relative, the second says
//! whether the payload is a raw expression or comma-joined
//! coordinates. Corners are joined by a single separator character.

use log::error;

/// Separator between encoded corners.
pub const CORNER_SEP: char = '\u{1}';
/// Flag character meaning "yes" (absolute, or expression payload).
pub const FLAG_SET: char = '\u{2}';
/// Flag character meaning "no" (relative, or coordinate payload).
pub const FLAG_CLEAR: char = '\u{3}';

#[derive(Debug, Clone, PartialEq)]
pub enum CornerData {
    Expression(String),
    Coords { x: String, y: String, z: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Corner {
    pub absolute: bool,
    pub data: CornerData,
}

impl Corner {
    pub fn expression(absolute: bool, exp: impl Into<String>) -> Self {
        Corner { absolute, data: CornerData::Expression(exp.into()) }
    }

    pub fn coords(absolute: bool, x: impl Into<String>, y: impl Into<String>) -> Self {
        Corner { absolute, data: CornerData::Coords { x: x.into(), y: y.into(), z: None } }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self.data, CornerData::Expression(_))
    }
}

/// Encodes a corner list into its transport string. An empty list
/// encodes to an empty string.
pub fn encode(corners: &[Corner]) -> String {
    let mut out = String::new();
    for (i, corner) in corners.iter().enumerate() {
        if i > 0 {
            out.push(CORNER_SEP);
        }
        out.push(if corner.absolute { FLAG_SET } else { FLAG_CLEAR });
        match &corner.data {
            CornerData::Expression(exp) => {
                out.push(FLAG_SET);
                out.push_str(exp);
            }
            CornerData::Coords { x, y, z } => {
                out.push(FLAG_CLEAR);
                out.push_str(x);
                out.push(',');
                out.push_str(y);
                if let Some(z) = z {
                    out.push(',');
                    out.push_str(z);
                }
            }
        }
    }
    out
}

/// Decoded view of one corner; unset coordinate fields are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCorner {
    pub absolute: bool,
    pub expression: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
}

/// Decodes a transport string, invoking `handler` once per corner with
/// `(is_first, corner)`. Corners shorter than the two flag characters
/// are silently skipped.
pub fn decode_with<F>(payload: &str, mut handler: F)
where
    F: FnMut(bool, &DecodedCorner),
{
    let mut first = true;
    for raw in payload.split(CORNER_SEP) {
        let mut chars = raw.chars();
        let (Some(abs_flag), Some(type_flag)) = (chars.next(), chars.next()) else {
            continue;
        };
        let body: &str = chars.as_str();
        let absolute = abs_flag == FLAG_SET;
        let corner = if type_flag == FLAG_SET {
            DecodedCorner {
                absolute,
                expression: Some(body.to_string()),
                x: None,
                y: None,
                z: None,
            }
        } else {
            let mut parts = body.split(',');
            DecodedCorner {
                absolute,
                expression: None,
                x: parts.next().map(str::to_string),
                y: parts.next().map(str::to_string),
                z: parts.next().map(str::to_string),
            }
        };
        handler(first, &corner);
        first = false;
    }
}

/// Decodes a transport string into a corner list.
pub fn decode(payload: &str) -> Vec<DecodedCorner> {
    let mut corners = Vec::new();
    decode_with(payload, |_, corner| corners.push(corner.clone()));
    corners
}

/// Whether any encoded corner carries an expression payload. Such
/// payloads may reference other labels and must be dependency-scanned.
pub fn has_expression(payload: &str) -> bool {
    payload.split(CORNER_SEP).any(|raw| {
        let mut chars = raw.chars();
        chars.next().is_some() && chars.next() == Some(FLAG_SET)
    })
}

/// Accumulates corners keyed by an explicit index, tolerating
/// out-of-order insertion. Serialization stops at the first gap.
#[derive(Debug, Default)]
pub struct CornerListBuilder {
    slots: Vec<Option<Corner>>,
}

impl CornerListBuilder {
    pub fn new() -> Self {
        CornerListBuilder::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn insert(&mut self, index: usize, corner: Corner) {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(corner);
    }

    /// Serializes the accumulated corners, or `None` when nothing was
    /// added. A gap in the index sequence truncates the list there and
    /// is logged, since indices past the gap lose their meaning.
    pub fn finish(&self) -> Option<String> {
        if self.slots.is_empty() {
            return None;
        }
        let contiguous: Vec<Corner> = self
            .slots
            .iter()
            .take_while(|slot| slot.is_some())
            .filter_map(|slot| slot.clone())
            .collect();
        if contiguous.len() < self.slots.len()
            && self.slots[contiguous.len()..].iter().any(Option::is_some)
        {
            error!(
                "corner list has a gap at index {}; dropping later corners",
                contiguous.len()
            );
        }
        if contiguous.is_empty() {
            return None;
        }
        Some(encode(&contiguous))
    }
}
