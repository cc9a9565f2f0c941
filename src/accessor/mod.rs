//! Packed word accessors.
//!
//! Reads and writes field values in a contract's word array according to a
//! computed [`StorageLayout`](crate::layout::StorageLayout):
//!
//! - scalar below 256 bits at offset `o`: `(word >> o) & mask(bits)`; a write
//!   clears that range and ORs in the masked, shifted value
//! - 256-bit scalar: the whole word
//! - array element `i`: bit `i × element_bits` counted from offset 0 of the
//!   home slot, never split across words
//! - out-of-band fields: no word position; use [`out_of_band_key`]

pub mod codec;
mod errors;

pub use codec::{
    decode_address, decode_bool, decode_fixed_text, decode_signed, encode_address, encode_bool,
    encode_fixed_text, encode_signed, out_of_band_element_key, out_of_band_key,
};
pub use errors::AccessError;

use alloy_primitives::U256;

use crate::constants::WORD_BITS;
use crate::layout::{StorageField, StorageLayout};

/// All-ones value of `bits` width (saturating at a full word).
pub fn mask(bits: u32) -> U256 {
    if bits >= WORD_BITS {
        U256::MAX
    } else {
        (U256::from(1u8) << bits as usize) - U256::from(1u8)
    }
}

/// Zeroed word array sized for `layout`.
pub fn zeroed_words(layout: &StorageLayout) -> Vec<U256> {
    vec![U256::ZERO; layout.slots()]
}

/// Slot and bit offset of element `index` of an array field.
pub fn element_position(field: &StorageField, index: u32) -> Result<(u64, u32), AccessError> {
    if field.is_out_of_band() {
        return Err(AccessError::OutOfBand {
            key: field.key().to_string(),
        });
    }
    if !field.is_array() {
        return Err(AccessError::NotAnArray {
            key: field.key().to_string(),
        });
    }
    if index >= field.array_length() {
        return Err(AccessError::ElementOutOfRange {
            key: field.key().to_string(),
            index,
            length: field.array_length(),
        });
    }

    let bit = u64::from(index) * u64::from(field.element_bits);
    let word = u64::from(WORD_BITS);
    Ok((field.slot + bit / word, (bit % word) as u32))
}

/// Read a scalar field from its home slot.
pub fn read_field(words: &[U256], field: &StorageField) -> Result<U256, AccessError> {
    scalar_position(field)?;
    read_bits(words, field.slot, field.offset, field.element_bits)
}

/// Write a scalar field, leaving every other bit of the word untouched.
pub fn write_field(
    words: &mut [U256],
    field: &StorageField,
    value: U256,
) -> Result<(), AccessError> {
    scalar_position(field)?;
    write_bits(words, field.slot, field.offset, field.element_bits, value)
}

/// Read element `index` of an array field.
pub fn read_element(
    words: &[U256],
    field: &StorageField,
    index: u32,
) -> Result<U256, AccessError> {
    let (slot, offset) = element_position(field, index)?;
    read_bits(words, slot, offset, field.element_bits)
}

/// Write element `index` of an array field, leaving neighbours untouched.
pub fn write_element(
    words: &mut [U256],
    field: &StorageField,
    index: u32,
    value: U256,
) -> Result<(), AccessError> {
    let (slot, offset) = element_position(field, index)?;
    write_bits(words, slot, offset, field.element_bits, value)
}

fn scalar_position(field: &StorageField) -> Result<(), AccessError> {
    if field.is_out_of_band() {
        return Err(AccessError::OutOfBand {
            key: field.key().to_string(),
        });
    }
    if field.is_array() {
        return Err(AccessError::ArrayField {
            key: field.key().to_string(),
        });
    }
    Ok(())
}

fn word_index(words: &[U256], slot: u64) -> Result<usize, AccessError> {
    usize::try_from(slot)
        .ok()
        .filter(|i| *i < words.len())
        .ok_or(AccessError::SlotOutOfRange {
            slot,
            available: words.len(),
        })
}

fn read_bits(words: &[U256], slot: u64, offset: u32, bits: u32) -> Result<U256, AccessError> {
    let word = words[word_index(words, slot)?];
    if bits >= WORD_BITS {
        return Ok(word);
    }
    Ok((word >> offset as usize) & mask(bits))
}

fn write_bits(
    words: &mut [U256],
    slot: u64,
    offset: u32,
    bits: u32,
    value: U256,
) -> Result<(), AccessError> {
    if value > mask(bits) {
        return Err(AccessError::ValueTooWide { bits });
    }
    let index = word_index(words, slot)?;
    if bits >= WORD_BITS {
        words[index] = value;
        return Ok(());
    }
    let shift = offset as usize;
    let cleared = words[index] & !(mask(bits) << shift);
    words[index] = cleared | (value << shift);
    Ok(())
}
