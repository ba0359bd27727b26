use indexmap::IndexMap;

/// Attribute name -> attribute value, in document order.
pub type AttrMap = IndexMap<String, String>;

/// Style tag name -> that tag's attributes, in document order.
///
/// This is the normalized form of one `<element>`'s style children.
/// Synthetic single-attribute entries fold multi-child data into one
/// opaque payload: `startPoint` carries `_corners` and `barTag`
/// carries `_barTags`.
pub type StyleMap = IndexMap<String, AttrMap>;

/// Attribute key for the folded corner-list payload.
pub const CORNERS_ATTR: &str = "_corners";

/// Attribute key for the folded bar-list payload.
pub const BAR_TAGS_ATTR: &str = "_barTags";

/// Builds a single-attribute map, the shape used for folded payloads.
pub fn single_attr(key: &str, value: String) -> AttrMap {
    let mut attrs = AttrMap::new();
    attrs.insert(key.to_string(), value);
    attrs
}
