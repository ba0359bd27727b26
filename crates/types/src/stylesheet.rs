use crate::attr::{AttrMap, StyleMap};
use serde::{Deserialize, Serialize};

/// Attribute key marking a property as reset.
///
/// A reset wipes whatever an earlier sheet contributed for that tag:
/// when a merged-in property carries the marker, it replaces the
/// accumulated attributes wholesale instead of layering on top.
pub const RESET_MARKER: &str = "~";

/// A named bundle of style properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    name: String,
    properties: StyleMap,
}

impl StyleSheet {
    pub fn new(name: impl Into<String>) -> Self {
        StyleSheet { name: name.into(), properties: StyleMap::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &StyleMap {
        &self.properties
    }

    pub fn get(&self, tag: &str) -> Option<&AttrMap> {
        self.properties.get(tag)
    }

    /// Sets attributes for `tag`, layering over what is already there.
    /// An existing reset marker survives the merge.
    pub fn set_property(&mut self, tag: &str, attrs: AttrMap) {
        match self.properties.get_mut(tag) {
            Some(existing) => {
                for (key, value) in attrs {
                    existing.insert(key, value);
                }
            }
            None => {
                self.properties.insert(tag.to_string(), attrs);
            }
        }
    }

    /// Marks `tag` as reset, keeping any attributes already set.
    pub fn reset_property(&mut self, tag: &str) {
        let attrs = self.properties.entry(tag.to_string()).or_default();
        attrs.insert(RESET_MARKER.to_string(), String::new());
    }

    /// Folds `other` into this sheet. Properties carrying the reset
    /// marker replace ours outright; everything else merges with the
    /// other sheet's attributes winning on conflict.
    pub fn merge_from(&mut self, other: &StyleSheet) {
        for (tag, attrs) in other.properties.iter() {
            if attrs.contains_key(RESET_MARKER) {
                self.properties.insert(tag.clone(), attrs.clone());
            } else {
                self.set_property(tag, attrs.clone());
            }
        }
    }
}
