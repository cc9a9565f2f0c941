//! # slotpack - Deterministic storage layout compiler
//!
//! Turns a contract schema (ordered field declarations plus feature flags)
//! into a packed assignment of fields to 256-bit storage words. The same
//! schema always yields the same layout, so a persisted layout can be
//! checked against a recompute at any time.
//!
//! Pipeline: [`schema`] validation, then [`layout::packer`] ordering, then
//! [`layout::assigner`] slot and offset assignment. [`accessor`] reads and
//! writes values in a word array laid out this way.

pub mod accessor;
pub mod cli;
pub mod constants;
pub mod errors;
pub mod layout;
pub mod output;
pub mod registry;
pub mod schema;

pub use errors::LayoutError;
pub use layout::{PersistedLayout, StorageField, StorageLayout, StorageSlot};
pub use registry::{FieldCategory, FieldType};
pub use schema::{Feature, FeatureSet, FieldDeclaration, FunctionConfig, SchemaDocument};
