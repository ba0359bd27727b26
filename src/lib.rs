//! Bidirectional converter between construction XML and the compact
//! GPAD text format.
//!
//! The crates divide along the data flow: `gpad-types` holds the
//! shared attribute-map and item types, `gpad-style` the schema,
//! codec and composite sub-encodings, `gpad-convert` the collector
//! and dependency scheduler. This facade adds the XML front end and
//! the end-to-end converter.

pub mod converter;
pub mod error;
pub mod xml;

pub use converter::GpadConverter;
pub use error::{GpadError, Location};
pub use gpad_convert::{collect, schedule, Algorithm, Construction, ConstructionNode, Generator, MacroSource};
pub use gpad_style as style;
pub use gpad_types as types;
pub use xml::{extract_element_fragment, parse_element_style};
