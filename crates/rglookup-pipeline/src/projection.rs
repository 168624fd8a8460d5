//! Row-wise view of one matched entity

use rglookup_core::{Error, Result};
use rglookup_graph::Node;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Exactly the fields written for one entity. Never collected; serialized and dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityProjection {
    pub key: String,
    pub title: String,
    pub identifier_field: &'static str,
    pub identifier: String,
}

impl EntityProjection {
    /// Project `node`, coercing each property to its string form.
    /// A missing property is a data integrity fault, not a skipped row.
    pub fn from_node(node: &Node, identifier_field: &'static str) -> Result<Self> {
        let entity = || {
            node.property("key")
                .map(|k| k.to_string())
                .unwrap_or_else(|| node.id.to_string())
        };
        let required = |name: &str| {
            node.property(name)
                .map(|v| v.to_string())
                .ok_or_else(|| Error::data_integrity(entity(), name))
        };

        Ok(Self {
            key: required("key")?,
            title: required("title")?,
            identifier_field,
            identifier: required(identifier_field)?,
        })
    }
}

impl Serialize for EntityProjection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("key", &self.key)?;
        map.serialize_entry("title", &self.title)?;
        map.serialize_entry(self.identifier_field, &self.identifier)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rglookup_graph::NodeId;

    #[test]
    fn serializes_three_fields_in_order() {
        let node = Node::new(NodeId(7))
            .with_label("grant")
            .with_property("key", "g1")
            .with_property("title", "Grant One")
            .with_property("purl", "http://example.org/g1")
            .with_property("funder", "ARC");
        let p = EntityProjection::from_node(&node, "purl").unwrap();
        assert_eq!(
            serde_json::to_string(&p).unwrap(),
            r#"{"key":"g1","title":"Grant One","purl":"http://example.org/g1"}"#
        );
    }

    #[test]
    fn coerces_non_string_properties() {
        let node = Node::new(NodeId(1))
            .with_property("key", 42i64)
            .with_property("title", "T")
            .with_property("doi", "10.1/x");
        assert_eq!(EntityProjection::from_node(&node, "doi").unwrap().key, "42");
    }

    #[test]
    fn missing_title_is_data_integrity() {
        let node = Node::new(NodeId(3)).with_property("key", "k").with_property("doi", "10.1/x");
        let err = EntityProjection::from_node(&node, "doi").unwrap_err();
        assert!(matches!(err, Error::DataIntegrity { ref entity, ref property } if entity == "k" && property == "title"));
    }
}
