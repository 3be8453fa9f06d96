use std::collections::BTreeMap;

use serde::Serialize;

/// Query string parameters for one outbound API call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl ToString) {
        self.0.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encoded query string with the API key masked, for logs.
    pub fn redacted(&self) -> String {
        self.iter()
            .map(|(k, v)| {
                if k == "apikey" {
                    format!("{}=***", k)
                } else {
                    format!("{}={}", k, urlencoding::encode(v))
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_masks_api_key() {
        let params: QueryParams = [("t", "caps"), ("apikey", "secret"), ("q", "a b")]
            .into_iter()
            .collect();
        let redacted = params.redacted();
        assert_eq!(redacted, "apikey=***&q=a%20b&t=caps");
        assert!(!redacted.contains("secret"));
        assert!(!redacted.contains("%2A"));
    }

    #[test]
    fn test_insert_replaces_value() {
        let mut params = QueryParams::new();
        params.insert("q", "one");
        params.insert("q", "two");
        assert_eq!(params.get("q"), Some("two"));
        assert_eq!(params.len(), 1);
        assert_eq!(params.remove("q").as_deref(), Some("two"));
        assert!(params.is_empty());
    }
}
