pub mod bars;
pub mod codec;
pub mod corners;
pub mod error;
pub mod parse;
pub mod schema;

pub use codec::{quote, quote_if_needed, render_property, render_record};
pub use error::StyleError;
pub use parse::{parse_property, parse_record};
pub use schema::ValueKind;
