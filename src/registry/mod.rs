//! Field Type Registry
//!
//! Maps the logical type names used in schema documents to their binary
//! representation. Resolution is a pure table lookup; the resolved
//! [`FieldType`] is a closed enum so the rest of the compiler never branches
//! on type-name strings.
//!
//! | name                         | representation        | bits |
//! |------------------------------|-----------------------|------|
//! | `bool`                       | boolean               | 1    |
//! | `int{8..256}`, `uint{8..256}`| integer               | n    |
//! | `bytes8/16/32`               | fixed byte block      | 64/128/256 |
//! | `address`                    | address               | 160  |
//! | `reference`                  | opaque reference      | 64   |
//! | `string8/16/32`              | fixed text (chars)    | 64/128/256 |
//! | `string`                     | unbounded text        | -    |

use std::fmt;

use crate::constants::{ADDRESS_BITS, OPAQUE_REFERENCE_BITS, WORD_BITS};
use crate::errors::LayoutError;

/// Integer widths accepted for `intN` / `uintN`.
const INTEGER_WIDTHS: [u32; 6] = [8, 16, 32, 64, 128, 256];
/// Byte block widths accepted for `bytesN` (N in bytes).
const BYTES_WIDTHS: [u32; 3] = [8, 16, 32];
/// Character counts accepted for `stringN`.
const TEXT_WIDTHS: [u32; 3] = [8, 16, 32];
/// Character count that is recognized but deliberately disabled.
const DISABLED_TEXT_WIDTH: u32 = 64;

/// Coarse classification of a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    ScalarNumeric,
    Boolean,
    Address,
    OpaqueReference,
    FixedText,
    UnboundedText,
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ScalarNumeric => "scalar-numeric",
            Self::Boolean => "boolean",
            Self::Address => "address",
            Self::OpaqueReference => "opaque-reference",
            Self::FixedText => "fixed-text",
            Self::UnboundedText => "unbounded-text",
        };
        f.write_str(name)
    }
}

/// Resolved binary representation of a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Boolean,
    Integer { signed: bool, bits: u32 },
    FixedBytes { bits: u32 },
    Address,
    OpaqueReference,
    FixedText { bits: u32 },
    UnboundedText,
}

impl FieldType {
    /// Bits per element, or `None` for types with no fixed width.
    pub fn bit_width(&self) -> Option<u32> {
        match *self {
            Self::Boolean => Some(1),
            Self::Integer { bits, .. } | Self::FixedBytes { bits } | Self::FixedText { bits } => {
                Some(bits)
            }
            Self::Address => Some(ADDRESS_BITS),
            Self::OpaqueReference => Some(OPAQUE_REFERENCE_BITS),
            Self::UnboundedText => None,
        }
    }

    /// Broad category used by validation and the opaque reference queries.
    pub fn category(&self) -> FieldCategory {
        match self {
            Self::Boolean => FieldCategory::Boolean,
            Self::Integer { .. } | Self::FixedBytes { .. } => FieldCategory::ScalarNumeric,
            Self::Address => FieldCategory::Address,
            Self::OpaqueReference => FieldCategory::OpaqueReference,
            Self::FixedText { .. } => FieldCategory::FixedText,
            Self::UnboundedText => FieldCategory::UnboundedText,
        }
    }

    /// Fixed or unbounded text.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::FixedText { .. } | Self::UnboundedText)
    }

    /// Signed integer, decoded with sign extension.
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Integer { signed: true, .. })
    }

    /// Bits each element occupies in storage for the given array length.
    ///
    /// Addresses inside arrays are widened to a full word so that no element
    /// straddles a word boundary.
    pub fn element_bits(&self, array_length: u32) -> u32 {
        match self {
            Self::Address if array_length > 1 => WORD_BITS,
            _ => self.bit_width().unwrap_or(0),
        }
    }
}

/// Resolve a type name for the field `key`.
///
/// `key` is only used to make error messages point at the offending field.
pub fn resolve(key: &str, name: &str) -> Result<FieldType, LayoutError> {
    let unknown = || LayoutError::UnknownFieldType {
        key: key.to_string(),
        name: name.to_string(),
    };

    match name {
        "bool" => return Ok(FieldType::Boolean),
        "address" => return Ok(FieldType::Address),
        "reference" => return Ok(FieldType::OpaqueReference),
        "string" => return Ok(FieldType::UnboundedText),
        _ => {}
    }

    if let Some(width) = name.strip_prefix("uint") {
        let bits = parse_width(width, &INTEGER_WIDTHS).ok_or_else(unknown)?;
        return Ok(FieldType::Integer {
            signed: false,
            bits,
        });
    }
    if let Some(width) = name.strip_prefix("int") {
        let bits = parse_width(width, &INTEGER_WIDTHS).ok_or_else(unknown)?;
        return Ok(FieldType::Integer { signed: true, bits });
    }
    if let Some(width) = name.strip_prefix("bytes") {
        let bytes = parse_width(width, &BYTES_WIDTHS).ok_or_else(unknown)?;
        return Ok(FieldType::FixedBytes { bits: bytes * 8 });
    }
    if let Some(width) = name.strip_prefix("string") {
        if width == DISABLED_TEXT_WIDTH.to_string() {
            return Err(LayoutError::UnsupportedFieldType {
                key: key.to_string(),
                name: name.to_string(),
                bits: DISABLED_TEXT_WIDTH * 8,
            });
        }
        let chars = parse_width(width, &TEXT_WIDTHS).ok_or_else(unknown)?;
        return Ok(FieldType::FixedText { bits: chars * 8 });
    }

    Err(unknown())
}

/// Every type name [`resolve`] accepts, in table order.
pub fn known_type_names() -> Vec<String> {
    let mut names = vec!["bool".to_string()];
    names.extend(INTEGER_WIDTHS.iter().map(|w| format!("int{w}")));
    names.extend(INTEGER_WIDTHS.iter().map(|w| format!("uint{w}")));
    names.extend(BYTES_WIDTHS.iter().map(|w| format!("bytes{w}")));
    names.push("address".to_string());
    names.push("reference".to_string());
    names.extend(TEXT_WIDTHS.iter().map(|w| format!("string{w}")));
    names.push("string".to_string());
    names
}

fn parse_width(digits: &str, allowed: &[u32]) -> Option<u32> {
    // Reject forms like "uint08" or "uint+8" that `parse` would accept.
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let width: u32 = digits.parse().ok()?;
    allowed.contains(&width).then_some(width)
}
