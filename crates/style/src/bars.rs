//! Fixed-field sub-encoding for per-bar chart styling.
//!
//! A bar list travels as one opaque string inside the `_barTags`
//! attribute. Each bar is a length-prefixed record (one character
//! holding the character count of bar number + flags + fields, max
//! 65535) so later bars can be skipped without parsing the payload.
//! A flags character selects which optional fields follow, in fixed
//! bit order: RGB triple, alpha, fill type, hatch angle, hatch
//! distance, image path (open-ended, terminated by a sentinel since
//! it cannot be fixed width), fill symbol.

use gpad_types::AttrMap;
use log::warn;

/// Terminator for the variable-width image field.
pub const IMAGE_END: char = '\u{3}';

const FLAG_RGB: u32 = 0x01;
const FLAG_ALPHA: u32 = 0x02;
const FLAG_FILL_TYPE: u32 = 0x04;
const FLAG_HATCH_ANGLE: u32 = 0x08;
const FLAG_HATCH_DISTANCE: u32 = 0x10;
const FLAG_IMAGE: u32 = 0x20;
const FLAG_SYMBOL: u32 = 0x40;

const MAX_RECORD_LEN: usize = 65535;

/// Attribute keys understood by the encoder. The XML front end fills
/// these from `tag` children; the GPAD parser fills them from bar
/// tokens.
pub const ATTR_RED: &str = "r";
pub const ATTR_GREEN: &str = "g";
pub const ATTR_BLUE: &str = "b";
pub const ATTR_ALPHA: &str = "alpha";
pub const ATTR_FILL_TYPE: &str = "fillType";
pub const ATTR_HATCH_ANGLE: &str = "hatchAngle";
pub const ATTR_HATCH_DISTANCE: &str = "hatchDistance";
pub const ATTR_IMAGE: &str = "image";
pub const ATTR_SYMBOL: &str = "fillSymbol";

/// Decoded view of one bar; colour channels are -1 when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBar {
    pub number: u32,
    pub rgba: [i32; 4],
    pub fill_type: Option<u32>,
    pub hatch_angle: Option<u32>,
    pub hatch_distance: Option<u32>,
    pub image: Option<String>,
    pub symbol: Option<char>,
}

fn get_num(attrs: &AttrMap, key: &str) -> Result<Option<i64>, ()> {
    match attrs.get(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<i64>().map(Some).map_err(|_| ()),
    }
}

fn push_char(out: &mut String, value: i64) -> bool {
    u32::try_from(value)
        .ok()
        .and_then(char::from_u32)
        .map(|c| out.push(c))
        .is_some()
}

/// Encodes one bar, appending its record to `out`. Returns false
/// without touching `out` when a field fails to parse or cannot be
/// represented; the caller skips that bar.
pub fn encode_bar(number: u32, attrs: &AttrMap, out: &mut String) -> bool {
    let Ok(red) = get_num(attrs, ATTR_RED) else { return false };
    let Ok(green) = get_num(attrs, ATTR_GREEN) else { return false };
    let Ok(blue) = get_num(attrs, ATTR_BLUE) else { return false };
    let Ok(alpha) = get_num(attrs, ATTR_ALPHA) else { return false };
    let Ok(fill_type) = get_num(attrs, ATTR_FILL_TYPE) else { return false };
    let Ok(hatch_angle) = get_num(attrs, ATTR_HATCH_ANGLE) else { return false };
    let Ok(hatch_distance) = get_num(attrs, ATTR_HATCH_DISTANCE) else { return false };

    let mut flags = 0u32;
    let mut fields = String::new();

    let red = red.unwrap_or(-1);
    let green = green.unwrap_or(-1);
    let blue = blue.unwrap_or(-1);
    if red >= 0 && green >= 0 && blue >= 0 {
        flags |= FLAG_RGB;
        for channel in [red, green, blue] {
            if !push_char(&mut fields, channel.clamp(0, 255)) {
                return false;
            }
        }
    }
    if let Some(alpha) = alpha {
        if alpha >= 0 {
            flags |= FLAG_ALPHA;
            if !push_char(&mut fields, alpha.clamp(0, 255)) {
                return false;
            }
        }
    }
    if let Some(fill_type) = fill_type {
        if !(0..=9).contains(&fill_type) {
            return false;
        }
        flags |= FLAG_FILL_TYPE;
        if !push_char(&mut fields, fill_type) {
            return false;
        }
    }
    if let Some(angle) = hatch_angle {
        flags |= FLAG_HATCH_ANGLE;
        if !push_char(&mut fields, ((angle % 360) + 360) % 360) {
            return false;
        }
    }
    if let Some(distance) = hatch_distance {
        flags |= FLAG_HATCH_DISTANCE;
        if !push_char(&mut fields, distance.clamp(0, MAX_RECORD_LEN as i64)) {
            return false;
        }
    }
    if let Some(image) = attrs.get(ATTR_IMAGE) {
        flags |= FLAG_IMAGE;
        fields.push_str(image);
        fields.push(IMAGE_END);
    }
    if let Some(symbol) = attrs.get(ATTR_SYMBOL).and_then(|s| s.chars().next()) {
        flags |= FLAG_SYMBOL;
        fields.push(symbol);
    }

    let mut body = String::new();
    if !push_char(&mut body, i64::from(number)) {
        return false;
    }
    if !push_char(&mut body, i64::from(flags)) {
        return false;
    }
    body.push_str(&fields);

    let len = body.chars().count();
    if len > MAX_RECORD_LEN {
        return false;
    }
    if !push_char(out, len as i64) {
        return false;
    }
    out.push_str(&body);
    true
}

/// Encodes all bars in ascending bar-number order. Bars that fail to
/// encode are skipped with a warning.
pub fn encode(bars: &std::collections::BTreeMap<u32, AttrMap>) -> String {
    let mut out = String::new();
    for (number, attrs) in bars {
        if !encode_bar(*number, attrs, &mut out) {
            warn!("skipping bar {number}: unencodable field");
        }
    }
    out
}

struct Cursor<'a> {
    chars: std::str::Chars<'a>,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Option<char> {
        self.chars.next()
    }
}

/// Decodes a transport string, invoking `handler` once per bar. A
/// truncated or inconsistent record stops decoding of the remainder
/// without raising an error.
pub fn decode_with<F>(payload: &str, mut handler: F)
where
    F: FnMut(&DecodedBar),
{
    let mut cursor = Cursor { chars: payload.chars() };
    while let Some(len_char) = cursor.next() {
        let len = len_char as usize;
        let record: Vec<char> = cursor.chars.by_ref().take(len).collect();
        if record.len() < len || len < 2 {
            return;
        }
        let Some(bar) = decode_record(&record) else {
            return;
        };
        handler(&bar);
    }
}

fn decode_record(record: &[char]) -> Option<DecodedBar> {
    let mut it = record.iter().copied();
    let number = it.next()? as u32;
    let flags = it.next()? as u32;

    let mut bar = DecodedBar {
        number,
        rgba: [-1, -1, -1, -1],
        fill_type: None,
        hatch_angle: None,
        hatch_distance: None,
        image: None,
        symbol: None,
    };
    if flags & FLAG_RGB != 0 {
        bar.rgba[0] = it.next()? as i32;
        bar.rgba[1] = it.next()? as i32;
        bar.rgba[2] = it.next()? as i32;
    }
    if flags & FLAG_ALPHA != 0 {
        bar.rgba[3] = it.next()? as i32;
    }
    if flags & FLAG_FILL_TYPE != 0 {
        bar.fill_type = Some(it.next()? as u32);
    }
    if flags & FLAG_HATCH_ANGLE != 0 {
        bar.hatch_angle = Some(it.next()? as u32);
    }
    if flags & FLAG_HATCH_DISTANCE != 0 {
        bar.hatch_distance = Some(it.next()? as u32);
    }
    if flags & FLAG_IMAGE != 0 {
        let mut image = String::new();
        loop {
            let c = it.next()?;
            if c == IMAGE_END {
                break;
            }
            image.push(c);
        }
        bar.image = Some(image);
    }
    if flags & FLAG_SYMBOL != 0 {
        bar.symbol = Some(it.next()?);
    }
    Some(bar)
}

/// Decodes a transport string into a bar list.
pub fn decode(payload: &str) -> Vec<DecodedBar> {
    let mut bars = Vec::new();
    decode_with(payload, |bar| bars.push(bar.clone()));
    bars
}
