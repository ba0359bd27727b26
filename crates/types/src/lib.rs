//! Shared data types for the GPAD converter crates.
//!
//! Attribute maps preserve insertion order throughout: the order in
//! which style tags appear in the source XML is the order in which
//! their GPAD renditions are emitted, so plain hash maps are not an
//! option here.

pub mod attr;
pub mod item;
pub mod stylesheet;

pub use attr::{single_attr, AttrMap, StyleMap, BAR_TAGS_ATTR, CORNERS_ATTR};
pub use item::{Item, OutputElement, Visibility};
pub use stylesheet::{StyleSheet, RESET_MARKER};
