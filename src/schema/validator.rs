//! Schema Validator
//!
//! Structural rules a schema must satisfy before it can be laid out. Every
//! check fails fast on the first violation it finds.

use std::collections::HashMap;

use super::{Feature, FeatureSet, FieldDeclaration, ResolvedField};
use crate::constants::RESERVED_FIELD_KEY;
use crate::errors::{describe_features, LayoutError};
use crate::registry::FieldCategory;

/// Check ids are unique and keys are present, unique and not reserved.
pub fn validate_identity(declarations: &[FieldDeclaration]) -> Result<(), LayoutError> {
    let mut ids: HashMap<u32, &str> = HashMap::with_capacity(declarations.len());
    let mut keys: HashMap<&str, u32> = HashMap::with_capacity(declarations.len());

    for decl in declarations {
        if decl.key.trim().is_empty() {
            return Err(LayoutError::EmptyFieldKey { id: decl.id });
        }
        if decl.key == RESERVED_FIELD_KEY {
            return Err(LayoutError::ReservedFieldKey {
                id: decl.id,
                key: decl.key.clone(),
            });
        }
        if let Some(first) = ids.insert(decl.id, decl.key.as_str()) {
            return Err(LayoutError::DuplicateFieldId {
                id: decl.id,
                first: first.to_string(),
                second: decl.key.clone(),
            });
        }
        if let Some(first) = keys.insert(decl.key.as_str(), decl.id) {
            return Err(LayoutError::DuplicateFieldKey {
                key: decl.key.clone(),
                first,
                second: decl.id,
            });
        }
    }
    Ok(())
}

/// Check feature exclusivity and feature prerequisites.
pub fn validate_features(
    features: &FeatureSet,
    fields: &[ResolvedField<'_>],
) -> Result<(), LayoutError> {
    check_exclusive(features, &Feature::PATCH_GROUP)?;
    check_exclusive(features, &Feature::FRAGMENT_GROUP)?;

    if features.contains(&Feature::Reversible)
        && !Feature::PATCH_GROUP.iter().any(|f| features.contains(f))
    {
        return Err(LayoutError::FeatureDependencyMissing {
            feature: Feature::Reversible,
            requirement: format!(
                "one of {}",
                describe_features(&Feature::PATCH_GROUP)
            ),
        });
    }

    if features.contains(&Feature::WeakReference) && !features.contains(&Feature::FragmentSingle) {
        return Err(LayoutError::FeatureDependencyMissing {
            feature: Feature::WeakReference,
            requirement: format!("`{}`", Feature::FragmentSingle),
        });
    }

    if features.contains(&Feature::DynamicReferenceLibrary) {
        let has_unbounded_reference = fields.iter().any(|f| {
            f.field_type.category() == FieldCategory::OpaqueReference
                && f.declaration.is_unbounded()
        });
        if !has_unbounded_reference {
            return Err(LayoutError::FeatureDependencyMissing {
                feature: Feature::DynamicReferenceLibrary,
                requirement: "an opaque reference field with arrayLength 0".to_string(),
            });
        }
    }

    Ok(())
}

/// Check that at most one unbounded text field and at most one opaque
/// reference field are declared.
pub fn validate_field_uniqueness(fields: &[ResolvedField<'_>]) -> Result<(), LayoutError> {
    let mut text: Option<&str> = None;
    let mut reference: Option<&str> = None;

    for field in fields {
        let key = field.declaration.key.as_str();
        match field.field_type.category() {
            FieldCategory::UnboundedText => {
                if let Some(first) = text.replace(key) {
                    return Err(LayoutError::DuplicateUnboundedTextField {
                        first: first.to_string(),
                        second: key.to_string(),
                    });
                }
            }
            FieldCategory::OpaqueReference => {
                if let Some(first) = reference.replace(key) {
                    return Err(LayoutError::DuplicateOpaqueReferenceField {
                        first: first.to_string(),
                        second: key.to_string(),
                    });
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_exclusive(features: &FeatureSet, group: &[Feature]) -> Result<(), LayoutError> {
    let enabled: Vec<&Feature> = features.iter().filter(|f| group.contains(f)).collect();
    if enabled.len() > 1 {
        return Err(LayoutError::FeatureConflict {
            features: describe_features(enabled),
            group: describe_features(group),
        });
    }
    Ok(())
}
