//! Key-value scan configuration carrier.
use std::collections::HashMap;

/// Key-value configuration object consulted by the scan layer.
///
/// Functionally equivalent to passing a plain properties map
/// (`HashMap<String, String>`); both carriers are queried under the same
/// keys and resolve identically. Engines that hold configuration as a typed
/// object use this carrier, engines that hand over raw table properties use
/// the map directly.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    entries: HashMap<String, String>,
}

impl ScanConfig {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration entry, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style [`ScanConfig::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Look up a configuration entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}
