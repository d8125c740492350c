use std::collections::BTreeMap;

/// A minimal execution context: a bag of string key/value pairs.
///
/// Contexts are accepted as method parameters so local and remote signatures
/// line up, but their contents are not propagated. The receiving side always
/// sees a fresh [`Context::background`] unless a caller-supplied
/// deserialization filter decides otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    /// The empty root context.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a derived context carrying one more key/value pair.
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = self.values.clone();
        values.insert(key.into(), value.into());
        Self { values }
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn is_background(&self) -> bool {
        self.values.is_empty()
    }
}
