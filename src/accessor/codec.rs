use alloy_primitives::{Address, Keccak256, B256, I256, U256};

use super::{mask, AccessError};
use crate::constants::{ADDRESS_BITS, WORD_BITS, WORD_BYTES};

/// Base key for an out-of-band field: `keccak256(abi.encode(uint256(id)))`.
///
/// Element `i` of an unbounded field lives at `base + i`, the same scheme
/// Solidity uses for dynamic array data.
pub fn out_of_band_key(field_id: u32) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(B256::from(U256::from(field_id).to_be_bytes::<32>()).as_slice());
    hasher.finalize()
}

/// Key of element `index` of an out-of-band field.
pub fn out_of_band_element_key(field_id: u32, index: u64) -> B256 {
    let base = U256::from_be_bytes(out_of_band_key(field_id).0);
    B256::from(base.wrapping_add(U256::from(index)).to_be_bytes::<32>())
}

/// Address in the low 160 bits of a value.
pub fn encode_address(addr: Address) -> U256 {
    let mut bytes = [0u8; WORD_BYTES];
    bytes[12..32].copy_from_slice(addr.as_slice());
    U256::from_be_bytes(bytes)
}

/// Address from the low 160 bits of a value (upper bits ignored).
pub fn decode_address(value: U256) -> Address {
    let bytes = (value & mask(ADDRESS_BITS)).to_be_bytes::<32>();
    Address::from_slice(&bytes[12..32])
}

/// `1` for true, `0` for false.
pub fn encode_bool(value: bool) -> U256 {
    U256::from(value as u8)
}

/// Any non-zero value reads as true.
pub fn decode_bool(value: U256) -> bool {
    !value.is_zero()
}

/// Left-justified fixed text of `bits / 8` bytes.
///
/// Text longer than the field is cut at the last char boundary that fits;
/// shorter text is padded with zero bytes.
pub fn encode_fixed_text(text: &str, bits: u32) -> U256 {
    let width = (bits.min(WORD_BITS) / 8) as usize;
    let mut end = text.len().min(width);
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    let mut bytes = [0u8; WORD_BYTES];
    let start = WORD_BYTES - width;
    bytes[start..start + end].copy_from_slice(&text.as_bytes()[..end]);
    U256::from_be_bytes(bytes)
}

/// Inverse of [`encode_fixed_text`]; trailing zero bytes are dropped.
pub fn decode_fixed_text(value: U256, bits: u32) -> String {
    let width = (bits.min(WORD_BITS) / 8) as usize;
    let bytes = value.to_be_bytes::<32>();
    let field = &bytes[WORD_BYTES - width..];
    let len = field.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&field[..len]).into_owned()
}

/// Sign-extend a raw `bits`-wide two's complement value.
///
/// A zero width holds no value and decodes to zero.
pub fn decode_signed(raw: U256, bits: u32) -> I256 {
    if bits == 0 {
        return I256::ZERO;
    }
    if bits >= WORD_BITS {
        return I256::from_raw(raw);
    }
    let raw = raw & mask(bits);
    let negative = raw.bit(bits as usize - 1);
    I256::from_raw(if negative { raw | !mask(bits) } else { raw })
}

/// Two's complement encoding of `value` in `bits` bits.
pub fn encode_signed(value: I256, bits: u32) -> Result<U256, AccessError> {
    let raw = value.into_raw() & mask(bits);
    if decode_signed(raw, bits) != value {
        return Err(AccessError::ValueTooWide { bits });
    }
    Ok(raw)
}
