use serde::{Deserialize, Serialize};

use super::{FeatureSet, FieldDeclaration};
use crate::errors::LayoutError;
use crate::layout::StorageLayout;

/// A contract schema as handed over by the config loader: the ordered field
/// declarations plus the enabled features.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    /// Contract name (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Field declarations in declared order
    pub fields: Vec<FieldDeclaration>,
    #[serde(default)]
    pub features: FeatureSet,
}

impl SchemaDocument {
    /// Unnamed document over `fields` with `features` enabled.
    pub fn new(fields: Vec<FieldDeclaration>, features: FeatureSet) -> Self {
        Self {
            name: None,
            fields,
            features,
        }
    }

    /// Parse a schema document from JSON.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compute the storage layout for this schema.
    pub fn layout(&self) -> Result<StorageLayout, LayoutError> {
        StorageLayout::compute(&self.fields, &self.features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Feature;

    #[test]
    fn test_document_from_json() {
        let doc = SchemaDocument::from_json(
            r#"{
                "name": "Ticket",
                "fields": [
                    {"id": 1, "key": "price", "type": "uint128"},
                    {"id": 2, "key": "seats", "type": "uint16", "arrayLength": 4}
                ],
                "features": ["mintable", "fragment-single"]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.name.as_deref(), Some("Ticket"));
        assert_eq!(doc.fields.len(), 2);
        assert_eq!(doc.fields[1].array_length, 4);
        assert!(doc.features.contains(&Feature::Mintable));
        assert!(doc.features.contains(&Feature::FragmentSingle));

        let layout = doc.layout().unwrap();
        assert_eq!(layout.slots(), 2);
    }

    #[test]
    fn test_document_features_optional() {
        let doc = SchemaDocument::from_json(r#"{"fields": []}"#).unwrap();
        assert!(doc.features.is_empty());
        assert!(doc.name.is_none());
    }

    #[test]
    fn test_document_rejects_unknown_feature() {
        let err = SchemaDocument::from_json(r#"{"fields": [], "features": ["minty"]}"#)
            .unwrap_err();
        assert!(matches!(err, LayoutError::Json(_)), "got {err:?}");
    }
}
