//! Namespaced resource identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Namespace used when a location has no `namespace:` prefix.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A namespaced identifier such as `minecraft:block/stone`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
    namespace: String,
    path: String,
}

impl ResourceLocation {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    /// Location in the default namespace.
    pub fn minecraft(path: impl Into<String>) -> Self {
        Self::new(DEFAULT_NAMESPACE, path)
    }

    /// Parse `namespace:path` or a bare `path`.
    /// "block/stone" -> ("minecraft", "block/stone")
    pub fn parse(s: &str) -> Option<Self> {
        let (namespace, path) = match s.split_once(':') {
            Some((namespace, path)) => (namespace, path),
            None => (DEFAULT_NAMESPACE, s),
        };
        if path.is_empty() || namespace.is_empty() {
            return None;
        }
        Some(Self::new(namespace, path))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl Serialize for ResourceLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ResourceLocation::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid resource location '{}'", s)))
    }
}
