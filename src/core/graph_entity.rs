use crate::core::value::PropertyMap;

/// Represents a node returned by the database
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    /// Element id as reported by the server (numeric ids are kept as text)
    pub element_id: String,
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

impl Node {
    pub fn new(element_id: impl Into<String>, labels: Vec<String>, properties: PropertyMap) -> Self {
        Self {
            element_id: element_id.into(),
            labels,
            properties,
        }
    }

    /// Check if node has a specific label
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Represents a relationship returned by the database
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relationship {
    pub element_id: String,
    pub start_id: String,
    pub end_id: String,
    pub rel_type: String,
    pub properties: PropertyMap,
}

impl Relationship {
    pub fn new(
        element_id: impl Into<String>,
        start_id: impl Into<String>,
        rel_type: impl Into<String>,
        end_id: impl Into<String>,
        properties: PropertyMap,
    ) -> Self {
        Self {
            element_id: element_id.into(),
            start_id: start_id.into(),
            end_id: end_id.into(),
            rel_type: rel_type.into(),
            properties,
        }
    }
}
