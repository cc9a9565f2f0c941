use thiserror::Error;

use crate::schema::Feature;

/// Errors raised while resolving, validating or laying out a contract schema.
///
/// All of them are deterministic configuration errors: the same input always
/// fails the same way, so callers should surface the message and stop.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum LayoutError {
    /// Type name is not in the registry
    #[error("Unknown field type `{name}` for field `{key}`")]
    UnknownFieldType {
        /// Key of the offending field
        key: String,
        /// Type name as declared
        name: String,
    },

    /// Type name is recognized but its width is disabled
    #[error("Field type `{name}` for field `{key}` is not supported ({bits}-bit fixed text is disabled)")]
    UnsupportedFieldType {
        /// Key of the offending field
        key: String,
        /// Type name as declared
        name: String,
        /// Width the name asks for
        bits: u32,
    },

    /// More than one unbounded text field was declared
    #[error("Only one unbounded text field is allowed, found `{first}` and `{second}`")]
    DuplicateUnboundedTextField {
        /// Key of the first unbounded text field
        first: String,
        /// Key of the field that repeats it
        second: String,
    },

    /// More than one opaque reference field was declared
    #[error("Only one opaque reference field is allowed, found `{first}` and `{second}`")]
    DuplicateOpaqueReferenceField {
        /// Key of the first opaque reference field
        first: String,
        /// Key of the field that repeats it
        second: String,
    },

    /// Two declarations share an id
    #[error("Field id {id} is declared more than once (`{first}` and `{second}`)")]
    DuplicateFieldId {
        /// The shared id
        id: u32,
        /// Key of the first declaration
        first: String,
        /// Key of the second declaration
        second: String,
    },

    /// Two declarations share a key
    #[error("Field key `{key}` is declared more than once (ids {first} and {second})")]
    DuplicateFieldKey {
        /// The shared key
        key: String,
        /// Id of the first declaration
        first: u32,
        /// Id of the second declaration
        second: u32,
    },

    /// A declaration has an empty key
    #[error("Field {id} has an empty key")]
    EmptyFieldKey {
        /// Id of the offending field
        id: u32,
    },

    /// A declaration uses the key set aside for the injected reserved word
    #[error("Field {id} uses the reserved key `{key}`")]
    ReservedFieldKey {
        /// Id of the offending field
        id: u32,
        /// The reserved key
        key: String,
    },

    /// Mutually exclusive features were enabled together
    #[error("Features {features} cannot be combined: at most one of {group} may be enabled")]
    FeatureConflict {
        /// Enabled members of the group
        features: String,
        /// Every member of the group
        group: String,
    },

    /// A feature was enabled without its prerequisite
    #[error("Feature `{feature}` requires {requirement}")]
    FeatureDependencyMissing {
        /// The feature that was enabled
        feature: Feature,
        /// What it needs
        requirement: String,
    },

    /// Lookup by id failed
    #[error("Field {id} not found in storage layout")]
    FieldNotFound {
        /// Requested id
        id: u32,
    },

    /// Opaque reference lookup by position failed
    #[error("Opaque reference field #{which} not found (layout has {count})")]
    OpaqueReferenceNotFound {
        /// Requested position
        which: usize,
        /// Opaque reference fields in the layout
        count: usize,
    },

    /// A persisted layout disagrees with the recomputed one
    #[error("Persisted layout mismatch at field `{key}`: {detail}")]
    PersistedLayoutMismatch {
        /// Key of the first field that differs
        key: String,
        /// How it differs
        detail: String,
    },

    /// Persisted layout could not be (de)serialized
    #[error("Persisted layout JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Join features into the `` `a`, `b` `` form used in error messages.
pub(crate) fn describe_features<'a>(features: impl IntoIterator<Item = &'a Feature>) -> String {
    features
        .into_iter()
        .map(|f| format!("`{f}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
