use std::collections::HashMap;

/// Ordered key/value store backing a [`PropertyLoader`](crate::PropertyLoader).
///
/// Lookups are exact and case-sensitive. Iteration follows first insertion;
/// overwriting a key keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct PropertyCollection {
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl PropertyCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let previous = self.values.insert(key.clone(), value.into());
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let previous = self.values.remove(key)?;
        self.order.retain(|k| k != key);
        Some(previous)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// First value, in iteration order, whose key equals `key` ignoring case.
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| eq_ignore_case(k, key))
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|k| self.values.get(k).map(|v| (k.as_str(), v.as_str())))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyCollection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut collection = Self::new();
        for (k, v) in iter {
            collection.insert(k, v);
        }
        collection
    }
}

/// Case-insensitive comparison covering non-ASCII names.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}
