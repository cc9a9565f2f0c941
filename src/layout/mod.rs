//! Storage Layout
//!
//! Turns a validated schema into a bit-exact assignment of fields to 256-bit
//! storage words.
//!
//! ```text
//!   FieldDeclaration[] + FeatureSet
//!     → schema::validate        (identity, types, features, uniqueness)
//!     → reserved word injection (when no field has a fixed width)
//!     → packer::pack            (greedy multi-fit ordering)
//!     → assigner::assign        (slot + offset per field)
//!     → StorageLayout
//! ```
//!
//! The computation is pure: the same declarations and features always yield
//! the same layout, which generated accessors and the persisted schema rely on.

pub mod assigner;
pub mod packer;
pub mod persisted;

pub use assigner::SlotCursor;
pub use packer::PackItem;
pub use persisted::{PersistedField, PersistedLayout};

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::constants::{
    RESERVED_FIELD_DESCRIPTION, RESERVED_FIELD_KEY, RESERVED_FIELD_TYPE, WORD_BITS,
};
use crate::errors::LayoutError;
use crate::registry::{self, FieldCategory, FieldType};
use crate::schema::{self, FeatureSet, FieldDeclaration, ResolvedField};

/// Word width as the 64-bit quantity used for bit totals.
pub(crate) const WORD: u64 = WORD_BITS as u64;

// ── Fields & slots ───────────────────────────────────────────────────────────

/// A declared field with its resolved widths and assigned position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageField {
    pub declaration: FieldDeclaration,
    pub field_type: FieldType,
    /// Bits per element as stored (addresses widen to 256 inside arrays)
    pub element_bits: u32,
    /// `element_bits × array_length`; 0 for out-of-band fields
    pub total_bits: u64,
    /// Home slot (0 for out-of-band fields)
    pub slot: u64,
    /// Bit offset within the home slot (0 for arrays and out-of-band fields)
    pub offset: u32,
}

impl StorageField {
    /// Build an unplaced field from a declaration and its resolved type.
    pub fn new(declaration: FieldDeclaration, field_type: FieldType) -> Self {
        let element_bits = field_type.element_bits(declaration.array_length);
        let total_bits = u64::from(element_bits) * u64::from(declaration.array_length);
        Self {
            declaration,
            field_type,
            element_bits,
            total_bits,
            slot: 0,
            offset: 0,
        }
    }

    fn from_resolved(resolved: &ResolvedField<'_>) -> Self {
        Self::new(resolved.declaration.clone(), resolved.field_type)
    }

    /// Declared field id.
    pub fn id(&self) -> u32 {
        self.declaration.id
    }

    /// Declared field key.
    pub fn key(&self) -> &str {
        &self.declaration.key
    }

    /// Declared element count; 1 for scalars, 0 for unbounded.
    pub fn array_length(&self) -> u32 {
        self.declaration.array_length
    }

    /// Category of the resolved type.
    pub fn category(&self) -> FieldCategory {
        self.field_type.category()
    }

    /// Holds more than one element, so it is word-aligned and accessed by index.
    pub fn is_array(&self) -> bool {
        self.declaration.array_length > 1
    }

    /// Stored outside the word layout (unbounded length or unbounded text).
    pub fn is_out_of_band(&self) -> bool {
        self.total_bits == 0
    }

    /// The synthetic word injected into otherwise empty layouts.
    pub fn is_reserved(&self) -> bool {
        self.declaration.key == RESERVED_FIELD_KEY
    }

    /// Number of consecutive slots the field touches.
    pub fn slots_consumed(&self) -> u64 {
        self.total_bits.div_ceil(WORD)
    }
}

/// One 256-bit storage word and the fields occupying it, in placement order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSlot {
    pub index: u64,
    pub field_ids: Vec<u32>,
}

// ── Layout ───────────────────────────────────────────────────────────────────

/// Final assignment of every field to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    slots: Vec<StorageSlot>,
    fields: Vec<StorageField>,
    features: FeatureSet,
}

impl StorageLayout {
    /// Validate the schema and compute its layout.
    pub fn compute(
        declarations: &[FieldDeclaration],
        features: &FeatureSet,
    ) -> Result<Self, LayoutError> {
        let resolved = schema::validate(declarations, features)?;
        let mut fields: Vec<StorageField> =
            resolved.iter().map(StorageField::from_resolved).collect();

        if fields.iter().all(StorageField::is_out_of_band) {
            let reserved = reserved_field(declarations)?;
            warn!(
                id = reserved.id(),
                "no field occupies a storage word, injecting reserved field"
            );
            fields.push(reserved);
        }

        let packed = packer::pack(fields);
        let (fields, slots) = assigner::assign(packed);

        debug!(
            fields = fields.len(),
            slots = slots.len(),
            features = features.len(),
            "computed storage layout"
        );

        Ok(Self {
            slots,
            fields,
            features: features.clone(),
        })
    }

    /// Assemble a layout from already placed fields, without repacking.
    pub(crate) fn from_parts(
        slots: Vec<StorageSlot>,
        fields: Vec<StorageField>,
        features: FeatureSet,
    ) -> Self {
        Self {
            slots,
            fields,
            features,
        }
    }

    /// Number of distinct storage words the layout touches.
    pub fn slots(&self) -> usize {
        self.slots.len()
    }

    /// Occupied words in ascending index order.
    pub fn storage_slots(&self) -> &[StorageSlot] {
        &self.slots
    }

    /// Fields in placement order.
    pub fn fields(&self) -> &[StorageField] {
        &self.fields
    }

    /// Features the layout was computed with.
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Field with the given id, or [`LayoutError::FieldNotFound`].
    pub fn field_by_id(&self, id: u32) -> Result<&StorageField, LayoutError> {
        self.fields
            .iter()
            .find(|f| f.id() == id)
            .ok_or(LayoutError::FieldNotFound { id })
    }

    /// Field with the given key, if any.
    pub fn field_by_key(&self, key: &str) -> Option<&StorageField> {
        self.fields.iter().find(|f| f.key() == key)
    }

    fn opaque_references(&self) -> impl Iterator<Item = &StorageField> {
        self.fields
            .iter()
            .filter(|f| f.category() == FieldCategory::OpaqueReference)
    }

    /// Whether any field is an opaque reference.
    pub fn has_opaque_reference(&self) -> bool {
        self.opaque_references().next().is_some()
    }

    /// Number of opaque reference fields (at most one in a valid schema).
    pub fn opaque_reference_field_count(&self) -> usize {
        self.opaque_references().count()
    }

    fn opaque_reference(&self, which: usize) -> Result<&StorageField, LayoutError> {
        self.opaque_references()
            .nth(which)
            .ok_or_else(|| LayoutError::OpaqueReferenceNotFound {
                which,
                count: self.opaque_reference_field_count(),
            })
    }

    /// Declared array length of the `which`-th opaque reference field.
    pub fn opaque_reference_array_length(&self, which: usize) -> Result<u32, LayoutError> {
        Ok(self.opaque_reference(which)?.array_length())
    }

    /// Home slot of the `which`-th opaque reference field.
    pub fn opaque_reference_slot_number(&self, which: usize) -> Result<u64, LayoutError> {
        Ok(self.opaque_reference(which)?.slot)
    }

    /// Serializable form of this layout.
    pub fn to_persisted(&self) -> PersistedLayout {
        PersistedLayout::from_layout(self)
    }
}

/// Full-word numeric field with the first id not used by any declaration.
pub(crate) fn reserved_field(declarations: &[FieldDeclaration]) -> Result<StorageField, LayoutError> {
    let used: HashSet<u32> = declarations.iter().map(|d| d.id).collect();
    let mut id = declarations
        .iter()
        .map(|d| d.id)
        .max()
        .map_or(0, |max| max.wrapping_add(1));
    while used.contains(&id) {
        id = id.wrapping_add(1);
    }

    let declaration = FieldDeclaration::new(id, RESERVED_FIELD_KEY, RESERVED_FIELD_TYPE)
        .with_description(RESERVED_FIELD_DESCRIPTION);
    let field_type = registry::resolve(RESERVED_FIELD_KEY, RESERVED_FIELD_TYPE)?;
    Ok(StorageField::new(declaration, field_type))
}
