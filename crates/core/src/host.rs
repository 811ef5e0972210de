//! Host attribute records held by the attribute store

use crate::types::MaintenanceMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named, multi-valued host attribute (e.g. `rack = {r12}`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Attribute values
    pub values: BTreeSet<String>,
}

impl Attribute {
    /// Create an attribute from a name and its values
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Attributes and maintenance state of one host
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostAttributes {
    /// Host name (store key)
    pub host: String,
    /// Agent id reported by the host, if known
    pub slave_id: Option<String>,
    /// Attributes reported by the host
    pub attributes: BTreeSet<Attribute>,
    /// Maintenance state
    #[serde(default)]
    pub mode: MaintenanceMode,
}

impl HostAttributes {
    /// Host with no attributes, in normal service
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            slave_id: None,
            attributes: BTreeSet::new(),
            mode: MaintenanceMode::None,
        }
    }

    /// Builder-style attribute insert
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.insert(attribute);
        self
    }

    /// Builder-style maintenance mode
    pub fn with_mode(mut self, mode: MaintenanceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Values of the attribute called `name`, if present
    pub fn values_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_of() {
        let host = HostAttributes::new("host-a")
            .with_attribute(Attribute::new("rack", ["r1"]))
            .with_attribute(Attribute::new("zone", ["us-east-1a", "us-east-1b"]));

        assert_eq!(host.values_of("zone").map(|v| v.len()), Some(2));
        assert!(host.values_of("missing").is_none());
        assert_eq!(host.mode, MaintenanceMode::None);
    }
}
