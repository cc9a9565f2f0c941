/// Width of one storage word in bits. Every slot holds exactly this many bits.
pub const WORD_BITS: u32 = 256;
/// Width of one storage word in bytes.
pub const WORD_BYTES: usize = 32;
/// Logical width of an address (20 bytes).
pub const ADDRESS_BITS: u32 = 160;
/// Width of an opaque reference identifier.
pub const OPAQUE_REFERENCE_BITS: u32 = 64;
/// Key given to the synthetic field injected when nothing else occupies a word.
pub const RESERVED_FIELD_KEY: &str = "__reserved";
/// Type of the synthetic reserved field (one full word).
pub const RESERVED_FIELD_TYPE: &str = "uint256";
/// Description attached to the synthetic reserved field.
pub const RESERVED_FIELD_DESCRIPTION: &str = "reserved storage word";
