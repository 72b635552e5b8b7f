// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Multi-valued form and query parameters

use std::collections::BTreeMap;

use url::form_urlencoded;

/// Ordered multi-map of string parameters.
///
/// Keys are kept sorted so that [`Values::encode`] produces the canonical
/// `application/x-www-form-urlencoded` form; values under one key keep the
/// order they were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values(BTreeMap<String, Vec<String>>);

impl Values {
    /// Create an empty set of values
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `key`
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Replace all values under `key`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), vec![value.into()]);
    }

    /// First value under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// All values under `key`
    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove every value under `key`
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Encode as `k1=v1&k1=v2&k2=v3`, keys in sorted order
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.0 {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }

    /// Parse an urlencoded string
    pub fn parse(input: &[u8]) -> Self {
        form_urlencoded::parse(input)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Values {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Values::new();
        for (k, v) in iter {
            values.add(k, v);
        }
        values
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Values {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_sorted() {
        let mut values = Values::new();
        values.add("userName", "nxu");
        values.add("pwd", "111");
        assert_eq!(values.encode(), "pwd=111&userName=nxu");
    }

    #[test]
    fn test_multi_values_keep_order() {
        let mut values = Values::new();
        values.add("tag", "b");
        values.add("tag", "a");
        values.add("q", "hello world&more");
        assert_eq!(values.encode(), "q=hello+world%26more&tag=b&tag=a");
        assert_eq!(values.get_all("tag"), ["b", "a"]);
        assert_eq!(values.get("tag"), Some("b"));
    }

    #[test]
    fn test_set_replaces() {
        let mut values = Values::from([("a", "1"), ("a", "2")]);
        values.set("a", "3");
        assert_eq!(values.get_all("a"), ["3"]);
        assert!(values.get("missing").is_none());
    }
}
