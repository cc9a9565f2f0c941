use thiserror::Error;

/// Errors raised when reading or writing packed storage words.
#[derive(Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum AccessError {
    /// Field lives outside the word layout
    #[error("Field `{key}` is stored out of band and has no word position")]
    OutOfBand {
        /// Key of the out-of-band field
        key: String,
    },

    /// Element accessor used on a scalar field
    #[error("Field `{key}` is not an array")]
    NotAnArray {
        /// Key of the scalar field
        key: String,
    },

    /// Scalar accessor used on an array field
    #[error("Field `{key}` is an array; use the element accessors")]
    ArrayField {
        /// Key of the array field
        key: String,
    },

    /// Element index past the declared length
    #[error("Index {index} out of range for `{key}` (length {length})")]
    ElementOutOfRange {
        /// Key of the array field
        key: String,
        /// Requested element
        index: u32,
        /// Declared array length
        length: u32,
    },

    /// Word array shorter than the layout requires
    #[error("Slot {slot} out of range ({available} words available)")]
    SlotOutOfRange {
        /// Slot the access needed
        slot: u64,
        /// Length of the word array
        available: usize,
    },

    /// Value does not fit the field width
    #[error("Value does not fit in {bits} bits")]
    ValueTooWide {
        /// Width of the field or element
        bits: u32,
    },
}
