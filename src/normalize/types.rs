//! Selector tree types
//!
//! A selector tree declares which attributes of a raw record to keep, with
//! what type, and which nested collections become child records.

use serde::{Deserialize, Serialize};

/// Expected type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    #[default]
    String,
    Bool,
    Int64,
    Double,
    DateTime,
}

/// One attribute to extract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSelector {
    /// Dot path into the raw record; also the output key
    pub name: String,
    /// Expected type
    #[serde(rename = "type", default)]
    pub kind: AttributeType,
    /// Attribute holds a list of `kind` values
    #[serde(default)]
    pub list: bool,
}

impl AttributeSelector {
    /// Create a scalar attribute selector
    pub fn new(name: impl Into<String>, kind: AttributeType) -> Self {
        Self {
            name: name.into(),
            kind,
            list: false,
        }
    }

    /// Create a list attribute selector
    pub fn list(name: impl Into<String>, kind: AttributeType) -> Self {
        Self {
            name: name.into(),
            kind,
            list: true,
        }
    }
}

/// A nested collection turned into child records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSelector {
    /// Path expression, e.g. `$.accounts[?(@.__typename == 'X')]`; also the collection key
    pub path: String,
    /// Attributes of each child record
    #[serde(default)]
    pub attributes: Vec<AttributeSelector>,
    /// Nested child selectors
    #[serde(default)]
    pub children: Vec<ChildSelector>,
    /// Absent source arrays normalize to an empty collection
    #[serde(default)]
    pub expect_list: bool,
}

impl ChildSelector {
    /// Create a child selector
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            expect_list: false,
        }
    }

    /// Set the child attributes
    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<AttributeSelector>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Add a nested child selector
    #[must_use]
    pub fn with_child(mut self, child: ChildSelector) -> Self {
        self.children.push(child);
        self
    }

    /// Mark the collection as always present
    #[must_use]
    pub fn expecting_list(mut self) -> Self {
        self.expect_list = true;
        self
    }
}

/// Root of a selector tree for one entity kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySelector {
    /// Top-level attributes
    #[serde(default)]
    pub attributes: Vec<AttributeSelector>,
    /// Child selectors
    #[serde(default)]
    pub children: Vec<ChildSelector>,
}

impl EntitySelector {
    /// Create a selector from its top-level attributes
    pub fn new(attributes: Vec<AttributeSelector>) -> Self {
        Self {
            attributes,
            children: Vec::new(),
        }
    }

    /// Add a child selector
    #[must_use]
    pub fn with_child(mut self, child: ChildSelector) -> Self {
        self.children.push(child);
        self
    }
}
