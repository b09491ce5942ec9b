use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an environment, or of one specific version of it.
///
/// An empty `uid` means "no particular version": the latest one for reads,
/// every version for deletes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
}

impl Metadata {
    pub fn new(name: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: uid.into(),
        }
    }

    /// Metadata addressing the latest (or every) version of `name`
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, String::new())
    }

    /// Build metadata from a path name and an optional `uid` query value.
    /// An empty query value counts as absent.
    pub fn with_optional_uid(name: impl Into<String>, uid: Option<String>) -> Self {
        Self::new(name, uid.unwrap_or_default())
    }

    pub fn has_uid(&self) -> bool {
        !self.uid.is_empty()
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uid.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}@{}", self.name, self.uid)
        }
    }
}

/// An environment resource.
///
/// Only `metadata` has meaning here; every other top-level field is kept
/// as-is in `spec` and written back out unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Environment {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(flatten)]
    pub spec: serde_json::Map<String, serde_json::Value>,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: Metadata::named(name),
            spec: serde_json::Map::new(),
        }
    }

    /// Attach an opaque field, builder style
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.spec.insert(key.into(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}
