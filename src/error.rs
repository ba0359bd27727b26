use std::fmt;
use thiserror::Error;

/// Line/column position of a parse failure, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col)
    }
}

impl Location {
    /// Location of a byte offset within `text`.
    pub fn of_offset(text: &str, offset: usize) -> Self {
        let clamped = offset.min(text.len());
        let mut line = 1;
        let mut col = 1;
        for c in text[..clamped].chars() {
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        Location { line, col }
    }
}

#[derive(Debug, Error)]
pub enum GpadError {
    #[error("parse error at {location}: {message}")]
    Parse { message: String, location: Location },

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error(transparent)]
    Style(#[from] gpad_style::StyleError),
}

impl GpadError {
    pub fn parse(message: impl Into<String>, location: Location) -> Self {
        GpadError::Parse { message: message.into(), location }
    }
}
