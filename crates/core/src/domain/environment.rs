// Merged environment mapping

use std::collections::btree_map::{self, BTreeMap};

/// Flat name -> value mapping produced by one resolution pass
///
/// Backed by a `BTreeMap` so iteration order is sorted and the env-file
/// output is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedEnvironment(BTreeMap<String, String>);

impl MergedEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; later passes win
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, String> {
        self.0.keys()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a MergedEnvironment {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MergedEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
