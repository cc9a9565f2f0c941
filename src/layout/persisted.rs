//! Persisted layout form.
//!
//! A computed layout is stored next to the schema as a JSON array of
//! `{id, key, type, arrayLength, description, permissionId?, visibility, slot, offset}`
//! in placement order. Restoring reads slots and offsets back verbatim; it
//! never repacks, so a restored layout is identical to the one serialized.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::assigner::SlotRegistry;
use super::{reserved_field, StorageField, StorageLayout};
use crate::constants::RESERVED_FIELD_KEY;
use crate::errors::LayoutError;
use crate::registry::FieldType;
use crate::schema::{self, FeatureSet, FieldDeclaration, FunctionConfig};

/// One field of a persisted layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedField {
    pub id: u32,
    pub key: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub array_length: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub permission_id: u32,
    pub visibility: FunctionConfig,
    pub slot: u64,
    pub offset: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

fn reserved_mismatch(detail: &str) -> LayoutError {
    LayoutError::PersistedLayoutMismatch {
        key: RESERVED_FIELD_KEY.to_string(),
        detail: detail.to_string(),
    }
}

impl PersistedField {
    fn declaration(&self) -> FieldDeclaration {
        FieldDeclaration::new(self.id, self.key.clone(), self.type_name.clone())
            .with_array_length(self.array_length)
            .with_permission_id(self.permission_id)
            .with_description(self.description.clone())
            .with_function_config(self.visibility)
    }
}

impl From<&StorageField> for PersistedField {
    fn from(field: &StorageField) -> Self {
        let decl = &field.declaration;
        Self {
            id: decl.id,
            key: decl.key.clone(),
            type_name: decl.type_name.clone(),
            array_length: decl.array_length,
            description: decl.description.clone(),
            permission_id: decl.permission_id,
            visibility: decl.function_config,
            slot: field.slot,
            offset: field.offset,
        }
    }
}

/// A layout in its persisted, order-preserving form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedLayout {
    pub fields: Vec<PersistedField>,
}

impl PersistedLayout {
    /// Persisted form of `layout`, fields in placement order.
    pub fn from_layout(layout: &StorageLayout) -> Self {
        Self {
            fields: layout.fields().iter().map(PersistedField::from).collect(),
        }
    }

    /// Pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a persisted layout. Positions are not checked until [`Self::restore`].
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Declarations recovered from the persisted fields, in stored order.
    pub fn declarations(&self) -> Vec<FieldDeclaration> {
        self.fields.iter().map(PersistedField::declaration).collect()
    }

    /// Rebuild the layout from stored positions after revalidating the schema.
    ///
    /// The injected reserved word is not a declaration: it is accepted only
    /// when every declared field is out of band, and only in the exact form
    /// [`StorageLayout::compute`] would have injected it.
    pub fn restore(&self, features: &FeatureSet) -> Result<StorageLayout, LayoutError> {
        let (reserved, declared): (Vec<&PersistedField>, Vec<&PersistedField>) = self
            .fields
            .iter()
            .partition(|f| f.key == RESERVED_FIELD_KEY);
        let declarations: Vec<FieldDeclaration> =
            declared.iter().map(|f| f.declaration()).collect();
        let resolved = schema::validate(&declarations, features)?;

        let mut types: HashMap<u32, FieldType> = resolved
            .iter()
            .map(|r| (r.declaration.id, r.field_type))
            .collect();
        let needs_reserved = resolved
            .iter()
            .map(StorageField::from_resolved)
            .all(|f| f.is_out_of_band());

        match (needs_reserved, reserved.as_slice()) {
            (false, []) => {}
            (true, [stored]) => {
                let expected = reserved_field(&declarations)?;
                if stored.declaration() != expected.declaration {
                    return Err(reserved_mismatch("does not match the injected reserved word"));
                }
                types.insert(expected.id(), expected.field_type);
            }
            (true, []) => return Err(reserved_mismatch("missing from persisted layout")),
            (_, _) => return Err(reserved_mismatch("not expected in this layout")),
        }

        let mut registry = SlotRegistry::default();
        let mut fields = Vec::with_capacity(self.fields.len());
        for stored in &self.fields {
            let field_type = types
                .get(&stored.id)
                .copied()
                .ok_or(LayoutError::FieldNotFound { id: stored.id })?;
            let mut field = StorageField::new(stored.declaration(), field_type);
            field.slot = stored.slot;
            field.offset = stored.offset;
            registry.register(field.id(), field.slot, field.slots_consumed());
            fields.push(field);
        }

        Ok(StorageLayout::from_parts(
            registry.into_slots(),
            fields,
            features.clone(),
        ))
    }

    /// Check that this persisted form matches `layout` field by field.
    pub fn verify(&self, layout: &StorageLayout) -> Result<(), LayoutError> {
        let expected = Self::from_layout(layout);

        for (i, (stored, computed)) in self.fields.iter().zip(&expected.fields).enumerate() {
            if stored == computed {
                continue;
            }
            let detail = if stored.id != computed.id || stored.key != computed.key {
                format!(
                    "position {i} holds `{}` (id {}), expected `{}` (id {})",
                    stored.key, stored.id, computed.key, computed.id
                )
            } else if (stored.slot, stored.offset) != (computed.slot, computed.offset) {
                format!(
                    "stored at slot {} offset {}, computed slot {} offset {}",
                    stored.slot, stored.offset, computed.slot, computed.offset
                )
            } else {
                "declaration metadata differs".to_string()
            };
            return Err(LayoutError::PersistedLayoutMismatch {
                key: stored.key.clone(),
                detail,
            });
        }

        if let Some(extra) = self.fields.get(expected.fields.len()) {
            return Err(LayoutError::PersistedLayoutMismatch {
                key: extra.key.clone(),
                detail: "not present in computed layout".to_string(),
            });
        }
        if let Some(missing) = expected.fields.get(self.fields.len()) {
            return Err(LayoutError::PersistedLayoutMismatch {
                key: missing.key.clone(),
                detail: "missing from persisted layout".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Feature;

    fn sample_layout() -> StorageLayout {
        let decls = [
            FieldDeclaration::new(1, "owner", "address").with_description("contract owner"),
            FieldDeclaration::new(2, "balance", "uint128").with_permission_id(3),
            FieldDeclaration::new(3, "tags", "bytes8")
                .with_array_length(5)
                .with_function_config(FunctionConfig::Load),
            FieldDeclaration::new(4, "links", "reference").with_array_length(0),
            FieldDeclaration::new(5, "active", "bool").with_function_config(FunctionConfig::None),
        ];
        let features: FeatureSet = [Feature::DynamicReferenceLibrary].into_iter().collect();
        StorageLayout::compute(&decls, &features).unwrap()
    }

    #[test]
    fn test_persisted_json_shape() {
        let layout = sample_layout();
        let json = layout.to_persisted().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 5);

        let balance = entries.iter().find(|e| e["key"] == "balance").unwrap();
        assert_eq!(balance["type"], "uint128");
        assert_eq!(balance["arrayLength"], 1);
        assert_eq!(balance["permissionId"], 3);
        assert_eq!(balance["visibility"], "ALL");

        let owner = entries.iter().find(|e| e["key"] == "owner").unwrap();
        assert!(owner.get("permissionId").is_none(), "zero permission is omitted");
        assert_eq!(owner["description"], "contract owner");
        assert_eq!(owner["slot"], 0);
        assert_eq!(owner["offset"], 0);

        let tags = entries.iter().find(|e| e["key"] == "tags").unwrap();
        assert_eq!(tags["visibility"], "LOAD");
    }

    #[test]
    fn test_persisted_order_matches_layout() {
        let layout = sample_layout();
        let persisted = PersistedLayout::from_layout(&layout);
        let ids: Vec<u32> = persisted.fields.iter().map(|f| f.id).collect();
        let expected: Vec<u32> = layout.fields().iter().map(StorageField::id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_roundtrip_restores_identical_layout() {
        let layout = sample_layout();
        let json = layout.to_persisted().to_json().unwrap();
        let restored = PersistedLayout::from_json(&json)
            .unwrap()
            .restore(layout.features())
            .unwrap();
        assert_eq!(restored, layout);
    }

    #[test]
    fn test_restore_revalidates_features() {
        let layout = sample_layout();
        let persisted = layout.to_persisted();
        let err = persisted
            .restore(&[Feature::WeakReference].into_iter().collect())
            .unwrap_err();
        assert!(matches!(err, LayoutError::FeatureDependencyMissing { .. }));
    }

    #[test]
    fn test_verify_accepts_matching_layout() {
        let layout = sample_layout();
        assert!(layout.to_persisted().verify(&layout).is_ok());
    }

    #[test]
    fn test_verify_reports_moved_field() {
        let layout = sample_layout();
        let mut persisted = layout.to_persisted();
        let moved = persisted.fields.iter_mut().find(|f| f.key == "active").unwrap();
        moved.offset += 1;

        let err = persisted.verify(&layout).unwrap_err();
        match err {
            LayoutError::PersistedLayoutMismatch { key, detail } => {
                assert_eq!(key, "active");
                assert!(detail.contains("offset"), "{detail}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_verify_reports_missing_field() {
        let layout = sample_layout();
        let mut persisted = layout.to_persisted();
        let dropped = persisted.fields.pop().unwrap();

        let err = persisted.verify(&layout).unwrap_err();
        assert!(
            matches!(&err, LayoutError::PersistedLayoutMismatch { key, .. } if *key == dropped.key),
            "got {err:?}"
        );
    }

    #[test]
    fn test_verify_reports_reordered_fields() {
        let layout = sample_layout();
        let mut persisted = layout.to_persisted();
        persisted.fields.swap(0, 1);
        assert!(matches!(
            persisted.verify(&layout),
            Err(LayoutError::PersistedLayoutMismatch { .. })
        ));
    }

    fn reserved_only_layout() -> StorageLayout {
        let decls = [FieldDeclaration::new(4, "links", "reference").with_array_length(0)];
        StorageLayout::compute(&decls, &FeatureSet::new()).unwrap()
    }

    fn assert_reserved_mismatch(result: Result<StorageLayout, LayoutError>) {
        match result {
            Err(LayoutError::PersistedLayoutMismatch { key, .. }) => {
                assert_eq!(key, RESERVED_FIELD_KEY)
            }
            other => panic!("expected reserved mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_roundtrip_with_reserved_word() {
        let layout = reserved_only_layout();
        assert!(layout.fields().iter().any(StorageField::is_reserved));

        let json = layout.to_persisted().to_json().unwrap();
        let restored = PersistedLayout::from_json(&json)
            .unwrap()
            .restore(layout.features())
            .unwrap();
        assert_eq!(restored, layout);
    }

    #[test]
    fn test_restore_rejects_altered_reserved_word() {
        let layout = reserved_only_layout();
        let mut persisted = layout.to_persisted();
        let reserved = persisted
            .fields
            .iter_mut()
            .find(|f| f.key == RESERVED_FIELD_KEY)
            .unwrap();
        reserved.type_name = "uint128".to_string();
        assert_reserved_mismatch(persisted.restore(layout.features()));
    }

    #[test]
    fn test_restore_rejects_missing_reserved_word() {
        let layout = reserved_only_layout();
        let mut persisted = layout.to_persisted();
        persisted.fields.retain(|f| f.key != RESERVED_FIELD_KEY);
        assert_reserved_mismatch(persisted.restore(layout.features()));
    }

    #[test]
    fn test_restore_rejects_unexpected_reserved_word() {
        let layout = sample_layout();
        let mut persisted = layout.to_persisted();
        persisted.fields[0].key = RESERVED_FIELD_KEY.to_string();
        assert_reserved_mismatch(persisted.restore(layout.features()));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            PersistedLayout::from_json("{\"not\": \"an array\"}"),
            Err(LayoutError::Json(_))
        ));
    }
}
