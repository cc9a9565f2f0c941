//! Contract schema input: field declarations, feature flags and the rules
//! that tie them together.

pub mod declaration;
pub mod document;
pub mod features;
pub mod validator;

pub use declaration::{FieldDeclaration, FunctionConfig};
pub use document::SchemaDocument;
pub use features::{Feature, FeatureSet, UnknownFeature};
pub use validator::{validate_features, validate_field_uniqueness, validate_identity};

use crate::errors::LayoutError;
use crate::registry::{self, FieldType};

/// A declaration paired with its resolved type.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedField<'a> {
    pub declaration: &'a FieldDeclaration,
    pub field_type: FieldType,
}

/// Resolve the type of every declaration, failing on the first unknown or
/// unsupported type name.
pub fn resolve_declarations(
    declarations: &[FieldDeclaration],
) -> Result<Vec<ResolvedField<'_>>, LayoutError> {
    declarations
        .iter()
        .map(|declaration| {
            let field_type = registry::resolve(&declaration.key, &declaration.type_name)?;
            Ok(ResolvedField {
                declaration,
                field_type,
            })
        })
        .collect()
}

/// Run every schema rule in order: identity, types, features, uniqueness.
pub fn validate<'a>(
    declarations: &'a [FieldDeclaration],
    features: &FeatureSet,
) -> Result<Vec<ResolvedField<'a>>, LayoutError> {
    validate_identity(declarations)?;
    let resolved = resolve_declarations(declarations)?;
    validate_features(features, &resolved)?;
    validate_field_uniqueness(&resolved)?;
    Ok(resolved)
}
