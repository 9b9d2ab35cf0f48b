// SPDX-License-Identifier: GPL-3.0-or-later

/// Ordered, multi-valued request parameters.
///
/// The API takes repeated keys (several `bucket` values on one call, for
/// instance), so this keeps every value in insertion order.
///
/// ```
/// # use echonest_client::Args;
/// let mut args = Args::new();
/// args.set("name", "Radiohead");
/// args.add("bucket", "hotttnesss");
/// args.add("bucket", "terms");
/// assert_eq!(args.get_all("bucket").collect::<Vec<_>>(), ["hotttnesss", "terms"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pairs: Vec<(String, String)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, keeping any existing values for `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Replace every value of `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        self.pairs.retain(|(k, _)| *k != key);
        self.pairs.push((key, value.into()));
        self
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Args {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Args {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.pairs
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_all_values() {
        let mut args = Args::from([("bucket", "terms"), ("bucket", "news"), ("name", "Bjork")]);
        args.set("bucket", "urls");
        assert_eq!(args.get_all("bucket").collect::<Vec<_>>(), ["urls"]);
        assert_eq!(args.get("name"), Some("Bjork"));
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_remove_and_contains() {
        let mut args: Args = vec![("api_key", "x"), ("format", "xml")].into_iter().collect();
        assert!(args.contains("format"));
        args.remove("format");
        assert!(!args.contains("format"));
        assert_eq!(args.get("format"), None);
        assert!(!args.is_empty());
    }

    #[test]
    fn test_get_with_temporary_key() {
        let args = Args::from([("bucket", "terms"), ("bucket", "news")]);
        let value = {
            let key = String::from("bucket");
            args.get(&key)
        };
        assert_eq!(value, Some("terms"));
    }

    #[test]
    fn test_iteration_order_is_insertion_order() {
        let mut args = Args::new();
        args.add("b", "1").add("a", "2").add("b", "3");
        let pairs: Vec<_> = args.iter().collect();
        assert_eq!(pairs, [("b", "1"), ("a", "2"), ("b", "3")]);
    }
}
