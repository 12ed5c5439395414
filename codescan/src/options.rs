use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form decoder options. Nothing here is interpreted by the scanner;
/// the whole map is forwarded to whichever decoder is installed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodeOptions(BTreeMap<String, Value>);

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn merge(&mut self, other: &DecodeOptions) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    /// Parse a `name=value` pair. The value is read as JSON when it parses,
    /// and kept as a plain string otherwise.
    pub fn parse_pair(pair: &str) -> Option<(String, Value)> {
        let (name, raw) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Some((name.to_string(), value))
    }
}

impl FromIterator<(String, Value)> for DecodeOptions {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_accessors() {
        let opts = DecodeOptions::new()
            .with("inversionAttempts", "dontInvert")
            .with("tryHarder", true);

        assert_eq!(opts.get_str("inversionAttempts"), Some("dontInvert"));
        assert_eq!(opts.get_bool("tryHarder"), Some(true));
        assert_eq!(opts.get_str("tryHarder"), None);
        assert_eq!(opts.len(), 2);
    }

    #[test]
    fn merge_prefers_overlay() {
        let mut base = DecodeOptions::new().with("a", 1).with("b", 2);
        base.merge(&DecodeOptions::new().with("b", 3));
        assert_eq!(base.get("a"), Some(&json!(1)));
        assert_eq!(base.get("b"), Some(&json!(3)));
    }

    #[test]
    fn parse_pair_reads_json_or_string() {
        assert_eq!(
            DecodeOptions::parse_pair("retries=3"),
            Some(("retries".into(), json!(3)))
        );
        assert_eq!(
            DecodeOptions::parse_pair("mode=attemptBoth"),
            Some(("mode".into(), json!("attemptBoth")))
        );
        assert_eq!(DecodeOptions::parse_pair("=1"), None);
        assert_eq!(DecodeOptions::parse_pair("novalue"), None);
    }

    #[test]
    fn serializes_as_plain_map() {
        let opts = DecodeOptions::new().with("x", false);
        assert_eq!(serde_json::to_string(&opts).unwrap(), r#"{"x":false}"#);
    }
}
