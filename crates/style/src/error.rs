use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StyleError {
    #[error("invalid value for property '{property}': {message}")]
    InvalidValue { property: String, message: String },

    #[error("unterminated quoted string in '{0}'")]
    UnterminatedString(String),
}

impl StyleError {
    pub fn invalid_value(property: &str, message: impl Into<String>) -> Self {
        StyleError::InvalidValue { property: property.to_string(), message: message.into() }
    }
}
