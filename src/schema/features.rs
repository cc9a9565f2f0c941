use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Optional capability flag on a contract schema.
///
/// Declaration order doubles as the canonical order used in messages and
/// persisted output (`BTreeSet<Feature>` iterates in this order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    FragmentMulti,
    FragmentSingle,
    RecordPatch,
    AccountPatch,
    MultiTokenPatch,
    Mintable,
    Reversible,
    OpaqueReferenceEnabled,
    WeakReference,
    DynamicReferenceLibrary,
}

/// Set of enabled features, ordered canonically.
pub type FeatureSet = BTreeSet<Feature>;

impl Feature {
    /// Every feature in canonical order.
    pub const ALL: [Feature; 10] = [
        Feature::FragmentMulti,
        Feature::FragmentSingle,
        Feature::RecordPatch,
        Feature::AccountPatch,
        Feature::MultiTokenPatch,
        Feature::Mintable,
        Feature::Reversible,
        Feature::OpaqueReferenceEnabled,
        Feature::WeakReference,
        Feature::DynamicReferenceLibrary,
    ];

    /// Patch features; at most one may be enabled.
    pub const PATCH_GROUP: [Feature; 3] = [
        Feature::RecordPatch,
        Feature::MultiTokenPatch,
        Feature::AccountPatch,
    ];

    /// Fragment features; at most one may be enabled.
    pub const FRAGMENT_GROUP: [Feature; 2] = [Feature::FragmentMulti, Feature::FragmentSingle];

    /// Kebab-case name, as used in schema documents and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FragmentMulti => "fragment-multi",
            Self::FragmentSingle => "fragment-single",
            Self::RecordPatch => "record-patch",
            Self::AccountPatch => "account-patch",
            Self::MultiTokenPatch => "multi-token-patch",
            Self::Mintable => "mintable",
            Self::Reversible => "reversible",
            Self::OpaqueReferenceEnabled => "opaque-reference-enabled",
            Self::WeakReference => "weak-reference",
            Self::DynamicReferenceLibrary => "dynamic-reference-library",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized feature name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown feature `{0}`")]
pub struct UnknownFeature(pub String);

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}
