//! Low-level APIs for (de)serializing Rust primitives from/to TTLV bytes.
//!
//! Using the types in this module you can deserialize TTLV bytes to Rust equivalents of the TTLV
//! header fields and primitive TTLV value types, and vice versa. This module covers exactly the
//! nine primitive variants defined by KMIP 1.1 §9.1: [`TtlvInteger`], [`TtlvLongInteger`],
//! [`TtlvBigInteger`], [`TtlvEnum`], [`TtlvBoolean`], [`TtlvTextString`], [`TtlvByteString`],
//! [`TtlvDateTime`] and [`TtlvInterval`], plus the shared header used by the `Structure`
//! container (whose value bytes are a schema-layer concern, out of scope here).
//!
//! For example:
//!
//! ```
//! use kmip_ttlv_primitives::types::{TtlvTag, TtlvType, TtlvInteger};
//! use kmip_ttlv_primitives::types::SerializableTtlvType;
//! # fn main() -> kmip_ttlv_primitives::types::Result<()> {
//!
//! // Hand craft some TTLV bytes to deserialize
//! let mut ttlv_wire = Vec::new();
//! ttlv_wire.extend(b"\x66\x00\x01");     // 3-byte tag
//! ttlv_wire.extend(b"\x02");             // 1-byte type with value 2 (for Integer)
//! ttlv_wire.extend(b"\x00\x00\x00\x04"); // 4-byte length with value 4 (for a 4-byte value length)
//! ttlv_wire.extend(b"\x00\x00\x00\x03"); // 4-byte big-endian integer value 3
//! ttlv_wire.extend(b"\x00\x00\x00\x00"); // 4-byte padding
//!
//! // Create a cursor for "Read"ing from the buffer
//! let mut cursor = std::io::Cursor::new(&ttlv_wire);
//!
//! // Deserialize the TTLV bytes
//! let tag = TtlvTag::read(&mut cursor)?;
//! let typ = TtlvType::read(&mut cursor)?;
//! let val = TtlvInteger::read(&mut cursor)?; // reads the length and padding bytes as well
//!
//! // Verify the result
//! assert_eq!(*tag, 0x660001);
//! assert_eq!(typ, TtlvType::Integer);
//! assert_eq!(*val, 3);
//!
//! // Serialize the value back to TTLV bytes
//! let mut buf = Vec::new();
//! tag.write(&mut buf)?;
//! val.write(&mut buf)?; // writes the type, length, value and padding bytes
//!
//! // Verify that the serialized bytes match our handcrafted bytes
//! assert_eq!(&ttlv_wire, &buf);
//! # Ok(())
//! # }
//! ```
use std::{
    convert::TryFrom,
    io::{Read, Seek, Write},
    ops::Deref,
    str::FromStr,
};

use crate::stream::TtlvReader;

// --- ByteOffset -----------------------------------------------------------------------------------------------------

/// An offset into a collection of TTLV bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ByteOffset(pub u64);

impl std::ops::Deref for ByteOffset {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&u64> for ByteOffset {
    fn from(v: &u64) -> Self {
        ByteOffset(*v)
    }
}

impl From<u64> for ByteOffset {
    fn from(v: u64) -> Self {
        ByteOffset(v)
    }
}

impl TryFrom<usize> for ByteOffset {
    type Error = ();

    fn try_from(value: usize) -> std::result::Result<Self, Self::Error> {
        if value < (u64::MAX as usize) {
            Ok(ByteOffset(value as u64))
        } else {
            Err(())
        }
    }
}

impl<T> From<&std::io::Cursor<T>> for ByteOffset {
    fn from(cursor: &std::io::Cursor<T>) -> Self {
        ByteOffset(cursor.position())
    }
}

impl<T> From<std::io::Cursor<T>> for ByteOffset {
    fn from(cursor: std::io::Cursor<T>) -> Self {
        ByteOffset(cursor.position())
    }
}

/// Errors reported by the low-level (de)serialization API.
///
/// Grounded one-to-one on the error kinds the original PyKMIP
/// `kmip.core.errors`/`kmip.core.exceptions` module raises from `kmip.core.primitives`:
/// `ReadValueError`, `WriteOverflowError`, `InvalidPrimitiveLength`, `StreamNotEmptyError`, plus
/// Python's built-in `TypeError`/`ValueError` for construction-time validation (folded here into
/// [`Error::InvalidTtlvValue`] and [`Error::RangeError`]).
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    IoError(std::io::Error),

    /// A `#[...]`-rename-style tag string could not be parsed as hexadecimal.
    InvalidTtlvTag(String),

    /// [`read_header`] decoded a tag that does not match the tag the caller expected.
    UnexpectedTtlvTag { expected: TtlvTag, actual: TtlvTag },

    /// [`read_header`] decoded a type byte that does not match the type the caller expected.
    UnexpectedTtlvType { expected: TtlvType, actual: TtlvType },

    /// The raw type byte read from the wire is a structurally valid KMIP type code but this
    /// build doesn't support it.
    UnsupportedTtlvType(u8),

    /// The raw type byte read from the wire is not one of the ten KMIP type codes at all.
    InvalidTtlvType(u8),

    /// A fixed-length primitive (LongInteger, Boolean, ...) was read with the wrong length.
    InvalidTtlvValueLength {
        expected: u32,
        actual: u32,
        r#type: TtlvType,
    },

    /// A variable-length-but-constrained primitive (BigInteger) was read with a length that
    /// violates its constraint (a strictly positive multiple of 8).
    InvalidPrimitiveLength { actual: u32, r#type: TtlvType },

    /// The value bytes of a primitive don't form a legal value of that primitive's domain:
    /// non-zero padding, a Boolean encoding other than 0 or 1, non-UTF-8 TextString bytes, or an
    /// Enumeration code outside its declared domain.
    InvalidTtlvValue(TtlvType),

    /// A numeric value supplied at construction time falls outside the primitive's declared
    /// signed/unsigned range.
    RangeError { min: i128, max: i128, actual: i128 },

    /// A length computed for encoding (typically from a `usize`, e.g. a buffer length) does not
    /// fit the wire's 32-bit length field.
    WriteOverflowError {
        field: &'static str,
        max: u64,
        actual: u64,
    },

    /// [`is_oversized`] found unconsumed bytes after decoding a top-level primitive.
    StreamNotEmptyError(usize),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// --- TtlvTag --------------------------------------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Tag.
///
/// According to the [KMIP specification 1.0 section 9.1.1.1 Item Tag](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_toc8560):
/// > _An Item Tag is a three-byte binary unsigned integer, transmitted big endian, which contains a number that
/// > designates the specific Protocol Field or Object that the TTLV object represents._
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TtlvTag(u32);

impl TtlvTag {
    pub fn read<T: Read>(src: &mut T) -> Result<Self> {
        let mut raw_item_tag = [0u8; 3];
        src.read_exact(&mut raw_item_tag)?;
        Ok(TtlvTag::from(raw_item_tag))
    }

    pub fn write<T: Write>(&self, dst: &mut T) -> Result<()> {
        dst.write_all(&<[u8; 3]>::from(self))
            .map_err(Error::IoError)
    }
}

impl std::fmt::Debug for TtlvTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("0x{:0X}", &self.0))
    }
}

impl Deref for TtlvTag {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for TtlvTag {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let v = u32::from_str_radix(s.trim_start_matches("0x"), 16)
            .map_err(|_| Error::InvalidTtlvTag(s.to_string()))?;
        Ok(TtlvTag(v))
    }
}

impl std::fmt::Display for TtlvTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:06X}", self)
    }
}

impl std::fmt::UpperHex for TtlvTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

impl From<TtlvTag> for [u8; 3] {
    fn from(tag: TtlvTag) -> Self {
        <[u8; 3]>::from(&tag)
    }
}

impl From<&TtlvTag> for [u8; 3] {
    fn from(tag: &TtlvTag) -> Self {
        let b: [u8; 4] = tag.0.to_be_bytes();
        [b[1], b[2], b[3]]
    }
}

impl From<[u8; 3]> for TtlvTag {
    fn from(b: [u8; 3]) -> Self {
        TtlvTag(u32::from_be_bytes([0x00u8, b[0], b[1], b[2]]))
    }
}

impl From<&[u8; 3]> for TtlvTag {
    fn from(b: &[u8; 3]) -> Self {
        TtlvTag(u32::from_be_bytes([0x00u8, b[0], b[1], b[2]]))
    }
}

impl From<u32> for TtlvTag {
    fn from(v: u32) -> Self {
        TtlvTag(v & 0x00FF_FFFF)
    }
}

// --- TtlvType -------------------------------------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Type.
///
/// According to the [KMIP specification 1.0 section 9.1.1.2 Item Type](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_toc8562):
/// > _An Item Type is a byte containing a coded value that indicates the data type of the data object._
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TtlvType {
    Structure = 0x01,
    Integer = 0x02,
    LongInteger = 0x03,
    BigInteger = 0x04,
    Enumeration = 0x05,
    Boolean = 0x06,
    TextString = 0x07,
    ByteString = 0x08,
    DateTime = 0x09,
    Interval = 0x0A,
}

impl TtlvType {
    pub fn read<T: Read>(src: &mut T) -> Result<Self> {
        let mut raw_item_type = [0u8; 1];
        src.read_exact(&mut raw_item_type)?;
        TtlvType::try_from(raw_item_type[0])
    }

    pub fn write<T: Write>(&self, dst: &mut T) -> Result<()> {
        dst.write_all(&[*self as u8]).map_err(Error::IoError)
    }
}

impl std::fmt::Display for TtlvType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TtlvType::Structure => f.write_str("Structure (0x01)"),
            TtlvType::Integer => f.write_str("Integer (0x02)"),
            TtlvType::LongInteger => f.write_str("LongInteger (0x03)"),
            TtlvType::BigInteger => f.write_str("BigInteger (0x04)"),
            TtlvType::Enumeration => f.write_str("Enumeration (0x05)"),
            TtlvType::Boolean => f.write_str("Boolean (0x06)"),
            TtlvType::TextString => f.write_str("TextString (0x07)"),
            TtlvType::ByteString => f.write_str("ByteString (0x08)"),
            TtlvType::DateTime => f.write_str("DateTime (0x09)"),
            TtlvType::Interval => f.write_str("Interval (0x0A)"),
        }
    }
}

impl TryFrom<u8> for TtlvType {
    type Error = Error;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0x01 => Ok(TtlvType::Structure),
            0x02 => Ok(TtlvType::Integer),
            0x03 => Ok(TtlvType::LongInteger),
            0x04 => Ok(TtlvType::BigInteger),
            0x05 => Ok(TtlvType::Enumeration),
            0x06 => Ok(TtlvType::Boolean),
            0x07 => Ok(TtlvType::TextString),
            0x08 => Ok(TtlvType::ByteString),
            0x09 => Ok(TtlvType::DateTime),
            0x0A => Ok(TtlvType::Interval),
            _ => Err(Error::InvalidTtlvType(value)),
        }
    }
}

impl From<TtlvType> for [u8; 1] {
    fn from(item_type: TtlvType) -> Self {
        [item_type as u8]
    }
}

// --- TtlvLength -----------------------------------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Length.
///
/// According to the [KMIP specification 1.0 section 9.1.1.3 Item Length](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_Toc236497868):
/// > _An Item Length is a 32-bit binary integer, transmitted big-endian, containing the number of bytes in the Item
/// > Value._
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TtlvLength(u32);

impl TtlvLength {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn read<T: Read>(src: &mut T) -> Result<Self> {
        let mut value_length = [0u8; 4];
        src.read_exact(&mut value_length)?;
        Ok(Self(u32::from_be_bytes(value_length)))
    }

    pub fn write<T: Write>(&self, dst: &mut T) -> Result<()> {
        dst.write_all(&self.0.to_be_bytes()).map_err(Error::IoError)
    }
}

impl std::fmt::Debug for TtlvLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("0x{:0X}", &self.0))
    }
}

impl Deref for TtlvLength {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for TtlvLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X}", self)
    }
}

impl std::fmt::UpperHex for TtlvLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

// --- Header codec ----------------------------------------------------------------------------------------------------

/// Reads the (tag, type, length) header shared by every TTLV item, asserting that the tag and
/// type match what the caller expects.
///
/// Factored out of the per-type `read_value` implementations below so tag/type validation lives
/// in one place instead of being re-derived by every
/// `define_fixed_value_length_serializable_ttlv_type!` expansion; grounded in the original
/// `Base`-class header handling that every PyKMIP primitive subclasses.
pub fn read_header<T: Read>(
    src: &mut T,
    expected_tag: TtlvTag,
    expected_type: TtlvType,
) -> Result<TtlvLength> {
    let tag = TtlvTag::read(src)?;
    if tag != expected_tag {
        tracing::debug!(?expected_tag, ?tag, "tag mismatch while reading TTLV header");
        return Err(Error::UnexpectedTtlvTag {
            expected: expected_tag,
            actual: tag,
        });
    }

    let typ = TtlvType::read(src)?;
    if typ != expected_type {
        tracing::debug!(?expected_type, ?typ, "type mismatch while reading TTLV header");
        return Err(Error::UnexpectedTtlvType {
            expected: expected_type,
            actual: typ,
        });
    }

    let length = TtlvLength::read(src)?;
    tracing::trace!(?tag, ?typ, length = *length, "read TTLV header");
    Ok(length)
}

/// Writes a (tag, type, length) header. `length` is taken as a `usize` (e.g. straight off a
/// `Vec<u8>::len()`) so a length that doesn't fit the wire's 32-bit field is reported as
/// [`Error::WriteOverflowError`] rather than silently truncated.
pub fn write_header<T: Write>(
    dst: &mut T,
    tag: TtlvTag,
    r#type: TtlvType,
    length: usize,
) -> Result<()> {
    let length = u32::try_from(length).map_err(|_| Error::WriteOverflowError {
        field: "length",
        max: u32::MAX as u64,
        actual: length as u64,
    })?;
    tag.write(dst)?;
    r#type.write(dst)?;
    TtlvLength::new(length).write(dst)?;
    tracing::trace!(?tag, ?r#type, length, "wrote TTLV header");
    Ok(())
}

/// Peeks at the next 3 bytes of `stream` and reports whether they decode to `tag`, without
/// consuming them. Used by streaming parsers to choose a decoder for an optional or polymorphic
/// field before committing to reading it.
pub fn is_tag_next<R: Read + Seek>(tag: TtlvTag, stream: &mut TtlvReader<R>) -> bool {
    match stream.peek(3) {
        Ok(bytes) if bytes.len() == 3 => TtlvTag::from([bytes[0], bytes[1], bytes[2]]) == tag,
        _ => false,
    }
}

/// Peeks at the next 4 bytes of `stream` (tag + type) and reports whether the type byte equals
/// `r#type`, without consuming them.
pub fn is_type_next<R: Read + Seek>(r#type: TtlvType, stream: &mut TtlvReader<R>) -> bool {
    match stream.peek(4) {
        Ok(bytes) if bytes.len() == 4 => bytes[3] == r#type as u8,
        _ => false,
    }
}

/// Asserts that `stream` is fully drained. Callers use this after decoding a top-level primitive
/// to catch trailing garbage in a message.
pub fn is_oversized<R: Read + Seek>(stream: &mut TtlvReader<R>) -> Result<()> {
    let remaining = stream.remaining()?;
    if remaining > 0 {
        tracing::warn!(remaining, "stream not empty after decoding top-level TTLV item");
        return Err(Error::StreamNotEmptyError(remaining as usize));
    }
    Ok(())
}

// --- SerializableTtlvType ------------------------------------------------------------------------------------------------

/// A type that knows how to (de)serialize itself from/to TTLV byte format.
///
/// This type provides a common interface for (de)serializing Rust companion types to their TTLV byte form equivalents.
///
/// It is also provides default implementations that handle the TTLV padding byte rules.
///
/// According to the [KMIP specification 1.0 section 9.1.1.3 Item Length](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_Toc236497868):
/// > An Item Length is a 32-bit binary integer, transmitted big-endian, containing the number of bytes in the
/// > Item Value. The allowed values are:
/// >
/// >   Data Type    | Length
/// >   -------------|----------------------
/// >   Structure    | Varies, multiple of 8
/// >   Integer      | 4
/// >   Long Integer | 8
/// >   Big Integer  | Varies, multiple of 8
/// >   Enumeration  | 4
/// >   Boolean      | 8
/// >   Text String  | Varies
/// >   Byte String  | Varies
/// >   Date-Time    | 8
/// >   Interval     | 4
/// >
/// >   Table 192: Allowed Item Length Values
/// >
/// > If the Item Type is Structure, then the Item Length is the total length of all of the sub-items contained in
/// > the structure, including any padding. If the Item Type is Integer, Enumeration, Text String, Byte String, or
/// > Interval, then the Item Length is the number of bytes excluding the padding bytes. Text Strings and Byte
/// > Strings SHALL be padded with the minimal number of bytes following the Item Value to obtain a multiple
/// > of eight bytes. Integers, Enumerations, and Intervals SHALL be padded with four bytes following the Item
/// > Value.
pub trait SerializableTtlvType: Sized + Deref {
    const TTLV_TYPE: TtlvType;

    fn ttlv_type(&self) -> TtlvType {
        Self::TTLV_TYPE
    }

    fn calc_pad_bytes(value_len: u32) -> u32 {
        // pad to the next higher multiple of eight
        let remainder = value_len % 8;

        if remainder == 0 {
            // already on the alignment boundary, no need to add pad bytes to reach the boundary
            0
        } else {
            // for a shorter value, say 6 bytes, this calculates 8-(6%8) = 8-6 = 2, i.e. after having read 6 bytes the
            // next pad boundary is 2 bytes away.
            // for a longer value, say 10 bytes, this calcualtes 8-(10%8) = 8-2 = 6, i.e. after having read 10 bytes the
            // next pad boundary is 6 bytes away.
            8 - remainder
        }
    }

    fn read_pad_bytes<T: Read>(src: &mut T, value_len: u32) -> Result<()> {
        let num_pad_bytes = Self::calc_pad_bytes(value_len) as usize;
        if num_pad_bytes > 0 {
            let mut dst = [0u8; 8];
            src.read_exact(&mut dst[..num_pad_bytes])?;
            if dst[..num_pad_bytes].iter().any(|b| *b != 0) {
                tracing::warn!(r#type = %Self::TTLV_TYPE, "non-zero padding bytes");
                return Err(Error::InvalidTtlvValue(Self::TTLV_TYPE));
            }
        }
        Ok(())
    }

    fn write_pad_bytes<T: Write>(dst: &mut T, value_len: u32) -> Result<()> {
        let num_pad_bytes = Self::calc_pad_bytes(value_len) as usize;
        if num_pad_bytes > 0 {
            const PADDING_BYTES: [u8; 8] = [0; 8];
            dst.write_all(&PADDING_BYTES[..num_pad_bytes])?;
        }
        Ok(())
    }

    fn read<T: Read>(src: &mut T) -> Result<Self> {
        // The TTLV T_ype has already been read by the caller in order to determine which Primitive struct to use so
        // we only have to read the L_ength and and the V_alue.
        let mut value_len = [0u8; 4];
        src.read_exact(&mut value_len)?; // read L_ength
        let value_len = u32::from_be_bytes(value_len);
        let v = Self::read_value(src, value_len)?; // read V_alue
        Self::read_pad_bytes(src, value_len)?; // read 8-byte alignment padding bytes, verifying it's zero
        Ok(v)
    }

    // Writes the TLV part of TTLV, i.e. the type, length and value. It doesn't write the preceeding tag as that is
    // not part of the primitive value but is part of the callers context and only they can know which tag value to
    // write.
    fn write<T: Write>(&self, dst: &mut T) -> Result<()> {
        dst.write_all(&[Self::TTLV_TYPE as u8])?; // write T_ype
        let value_len = self.write_length_and_value(dst)?; // write L_ength and V_alue
        Self::write_pad_bytes(dst, value_len) // Write 8-byte alignment padding bytes
    }

    fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self>;

    fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32>;
}

// E.g. define_fixed_value_length_serializable_ttlv_type!(MyType, TtlvType::Integer, i32, 4) defines a new Rust struct
// called MyType which wraps an i32 value and implements the SerializableTtlvType trait to define how to read/write
// from/to a sequence of 4 big-endian encoded bytes prefixed by a TTLV item type byte of value TtlvType::Integer.
macro_rules! define_fixed_value_length_serializable_ttlv_type {
    ($(#[$meta:meta])* $NEW_TYPE_NAME:ident, $TTLV_ITEM_TYPE:expr, $RUST_TYPE:ty, $TTLV_VALUE_LEN:literal) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        $(#[$meta])*
        pub struct $NEW_TYPE_NAME(pub $RUST_TYPE);
        impl $NEW_TYPE_NAME {
            const TTLV_FIXED_VALUE_LENGTH: u32 = $TTLV_VALUE_LEN;
        }
        impl Deref for $NEW_TYPE_NAME {
            type Target = $RUST_TYPE;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
        impl SerializableTtlvType for $NEW_TYPE_NAME {
            const TTLV_TYPE: TtlvType = $TTLV_ITEM_TYPE;

            fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self> {
                if value_len != Self::TTLV_FIXED_VALUE_LENGTH {
                    Err(Error::InvalidTtlvValueLength {
                        expected: Self::TTLV_FIXED_VALUE_LENGTH,
                        actual: value_len,
                        r#type: Self::TTLV_TYPE,
                    })
                } else {
                    let mut dst = [0u8; Self::TTLV_FIXED_VALUE_LENGTH as usize];
                    src.read_exact(&mut dst)?;
                    let v: $RUST_TYPE = <$RUST_TYPE>::from_be_bytes(dst);
                    Ok($NEW_TYPE_NAME(v))
                }
            }

            fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32> {
                dst.write_all(&Self::TTLV_FIXED_VALUE_LENGTH.to_be_bytes())?; // Write L_ength
                dst.write_all(&self.0.to_be_bytes())?; // Write V_alue
                Ok(Self::TTLV_FIXED_VALUE_LENGTH)
            }
        }
    };
}

// --- TtlvInteger ----------------------------------------------------------------------------------------------------

define_fixed_value_length_serializable_ttlv_type!(
    /// A type for (de)serializing a TTLV Integer.
    ///
    /// According to the [KMIP specification 1.0 section 9.1.1.4 Item Value](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_Ref262577330):
    /// > _Integers are encoded as four-byte long (32 bit) binary signed numbers in 2's complement notation,
    /// > transmitted big-endian._
    TtlvInteger,
    TtlvType::Integer,
    i32,
    4
);

impl TtlvInteger {
    /// Constructs a signed Integer, validating `value` against the signed 32-bit domain
    /// `[i32::MIN, i32::MAX]`. `value` is taken wider than `i32` precisely so an out-of-range
    /// input (e.g. `i32::MAX as i64 + 1`) is representable in the first place and can be
    /// rejected with [`Error::RangeError`] rather than silently truncated by the caller before
    /// it ever reaches this constructor.
    pub fn new(value: i64) -> Result<Self> {
        if value < i32::MIN as i64 || value > i32::MAX as i64 {
            return Err(Error::RangeError {
                min: i32::MIN as i128,
                max: i32::MAX as i128,
                actual: value as i128,
            });
        }
        Ok(TtlvInteger(value as i32))
    }

    /// Constructs an Integer from an unsigned interpretation of `value`, validating it against
    /// `[0, u32::MAX]`. Integer has no dedicated unsigned type code on the wire (that's what
    /// Enumeration and Interval are for); this lets callers build and read back an Integer item
    /// whose 32 value bits are meant to be interpreted as unsigned while sharing the same 4-byte
    /// framing and padding as the signed case.
    pub fn new_unsigned(value: i64) -> Result<Self> {
        if value < 0 || value > u32::MAX as i64 {
            return Err(Error::RangeError {
                min: 0,
                max: u32::MAX as i128,
                actual: value as i128,
            });
        }
        Ok(TtlvInteger((value as u32) as i32))
    }

    /// Reinterprets the stored 32 bits as unsigned.
    pub fn as_unsigned(&self) -> u32 {
        self.0 as u32
    }
}

// --- TtlvLongInteger ------------------------------------------------------------------------------------------------

define_fixed_value_length_serializable_ttlv_type!(
    /// A type for (de)serializing a TTLV Long Integer.
    ///
    /// According to the [KMIP specification 1.0 section 9.1.1.4 Item Value](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_Ref262577330):
    /// > _Long Integers are encoded as eight-byte long (64 bit) binary signed numbers in 2's complement
    /// > notation, transmitted big-endian._
    TtlvLongInteger,
    TtlvType::LongInteger,
    i64,
    8
);

impl TtlvLongInteger {
    /// Constructs a LongInteger, validating `value` against `[i64::MIN, i64::MAX]`. Taken as
    /// `i128` so the out-of-range boundary (`i64::MAX as i128 + 1`) is representable.
    pub fn new(value: i128) -> Result<Self> {
        if value < i64::MIN as i128 || value > i64::MAX as i128 {
            return Err(Error::RangeError {
                min: i64::MIN as i128,
                max: i64::MAX as i128,
                actual: value,
            });
        }
        Ok(TtlvLongInteger(value as i64))
    }
}

// --- TtlvBigInteger -------------------------------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Big Integer.
///
/// According to the [KMIP specification 1.0 section 9.1.1.4 Item Value](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_Ref262577330):
/// > _Big Integers are encoded as a sequence of eight-bit bytes, in two's complement notation,
/// > transmitted big-endian. If the length of the sequence is not a multiple of eight bytes, then Big
/// > Integers SHALL be padded with the minimal number of leading sign-extended bytes to make the
/// > length a multiple of eight bytes. These padding bytes are part of the Item Value and SHALL be
/// > counted in the Item Length._
///
/// Stored as a sign flag plus a minimal (no leading zero bytes) big-endian magnitude, so the
/// representable range is not bounded by any fixed-width Rust integer. [`TtlvBigInteger::from_i128`]
/// and [`TtlvBigInteger::to_i128`] are convenience conversions for values that happen to fit in
/// 128 bits; values that don't still round-trip correctly through [`SerializableTtlvType`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TtlvBigInteger {
    negative: bool,
    // Big-endian magnitude, minimal: no leading 0x00 bytes. Empty means zero.
    magnitude: Vec<u8>,
}

impl TtlvBigInteger {
    pub fn zero() -> Self {
        TtlvBigInteger {
            negative: false,
            magnitude: Vec::new(),
        }
    }

    /// Builds a value from an explicit sign and big-endian magnitude, trimming any leading zero
    /// bytes from `magnitude`. A zero magnitude is always treated as non-negative regardless of
    /// `negative`.
    pub fn from_sign_and_magnitude(negative: bool, magnitude: &[u8]) -> Self {
        let first_nonzero = magnitude.iter().position(|b| *b != 0);
        let magnitude = match first_nonzero {
            Some(i) => magnitude[i..].to_vec(),
            None => Vec::new(),
        };
        let negative = negative && !magnitude.is_empty();
        TtlvBigInteger { negative, magnitude }
    }

    pub fn from_i128(value: i128) -> Self {
        let negative = value < 0;
        let magnitude_u128 = value.unsigned_abs();
        Self::from_sign_and_magnitude(negative, &magnitude_u128.to_be_bytes())
    }

    /// Converts back to an `i128`, or `None` if the magnitude doesn't fit.
    pub fn to_i128(&self) -> Option<i128> {
        if self.magnitude.len() > 16 {
            return None;
        }
        let mut buf = [0u8; 16];
        buf[16 - self.magnitude.len()..].copy_from_slice(&self.magnitude);
        let magnitude = u128::from_be_bytes(buf);
        if self.negative {
            if magnitude > (i128::MAX as u128) + 1 {
                None
            } else {
                Some((magnitude as i128).wrapping_neg())
            }
        } else if magnitude > i128::MAX as u128 {
            None
        } else {
            Some(magnitude as i128)
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// The minimal big-endian magnitude, without sign or wire padding.
    pub fn magnitude_be(&self) -> &[u8] {
        &self.magnitude
    }

    /// Computes the minimal two's-complement byte sequence for this value, without the 8-byte
    /// wire alignment padding.
    fn minimal_twos_complement(&self) -> Vec<u8> {
        if !self.negative {
            let mut bytes = if self.magnitude.is_empty() {
                vec![0u8]
            } else {
                self.magnitude.clone()
            };
            // A positive value's leading byte must have its sign bit clear or it would be read
            // back as negative.
            if bytes[0] & 0b1000_0000 != 0 {
                bytes.insert(0, 0x00);
            }
            bytes
        } else {
            let mut bytes = self.magnitude.clone();
            // Leave room for the sign bit to land as 1 after inversion+increment without
            // clobbering magnitude bits.
            if bytes.is_empty() || bytes[0] & 0b1000_0000 != 0 {
                bytes.insert(0, 0x00);
            }
            invert_and_increment(&mut bytes);
            bytes
        }
    }

    /// Pads `bytes` on the left with sign-extension bytes (`0x00` / `0xFF`) to the next multiple
    /// of 8, with a minimum of 8 bytes.
    ///
    /// This is the fix for the REDESIGN FLAG: the padding target is computed from the *actual*
    /// minimal length of `bytes` — which can already exceed 8 bytes for a magnitude of 64 bits or
    /// more — rather than assumed to always be exactly one 8-byte word.
    fn sign_extend_pad(mut bytes: Vec<u8>, negative: bool) -> Vec<u8> {
        let target = ((bytes.len() + 7) / 8).max(1) * 8;
        if bytes.len() < target {
            let pad_byte = if negative { 0xFF } else { 0x00 };
            let mut padded = vec![pad_byte; target - bytes.len()];
            padded.extend_from_slice(&bytes);
            bytes = padded;
        }
        bytes
    }
}

/// In-place two's complement: invert every bit, then add one.
fn invert_and_increment(bytes: &mut [u8]) {
    for b in bytes.iter_mut() {
        *b = !*b;
    }
    let mut carry: u16 = 1;
    for b in bytes.iter_mut().rev() {
        let sum = *b as u16 + carry;
        *b = (sum & 0xFF) as u8;
        carry = sum >> 8;
        if carry == 0 {
            break;
        }
    }
}

impl Deref for TtlvBigInteger {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.magnitude
    }
}

impl SerializableTtlvType for TtlvBigInteger {
    const TTLV_TYPE: TtlvType = TtlvType::BigInteger;

    fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self> {
        if value_len == 0 || value_len % 8 != 0 {
            return Err(Error::InvalidPrimitiveLength {
                actual: value_len,
                r#type: Self::TTLV_TYPE,
            });
        }
        let mut bytes = vec![0u8; value_len as usize];
        src.read_exact(&mut bytes)?;

        let negative = bytes[0] & 0b1000_0000 != 0;
        if negative {
            invert_and_increment(&mut bytes);
        }
        Ok(TtlvBigInteger::from_sign_and_magnitude(negative, &bytes))
    }

    fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32> {
        let minimal = self.minimal_twos_complement();
        let padded = Self::sign_extend_pad(minimal, self.negative);
        let len = padded.len() as u32;
        dst.write_all(&len.to_be_bytes())?;
        dst.write_all(&padded)?;
        Ok(len)
    }
}

// --- Enumeration domain & TtlvEnum -----------------------------------------------------------------------------------

/// Binds a Rust enum to the numeric domain of a KMIP Enumeration for some tag-class. Implemented
/// per concrete KMIP enumeration (e.g. `CryptographicAlgorithm`, `ObjectType`, `ResultStatus`),
/// analogous to the `ENUM_TYPE` class attribute on the Python original's `Enumeration`
/// subclasses.
pub trait KmipEnum: Copy + Eq {
    fn to_code(self) -> u32;
    fn from_code(code: u32) -> Option<Self>;
}

/// A type for (de)serializing a TTLV Enumeration, carrying both the numeric code and its
/// resolved symbolic value.
///
/// According to the [KMIP specification 1.0 section 9.1.1.4 Item Value](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_Ref262577330):
/// > _Enumerations are encoded as four-byte long (32 bit) binary unsigned numbers transmitted big-
///   endian. Extensions, which are permitted, but are not defined in this specification, contain the
///   value 8 hex in the first nibble of the first byte._
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtlvEnum<E: KmipEnum> {
    code: u32,
    symbol: E,
}

impl<E: KmipEnum> TtlvEnum<E> {
    pub fn new(symbol: E) -> Self {
        TtlvEnum {
            code: symbol.to_code(),
            symbol,
        }
    }

    pub fn symbol(&self) -> E {
        self.symbol
    }

    pub fn code(&self) -> u32 {
        self.code
    }
}

impl<E: KmipEnum> Deref for TtlvEnum<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.symbol
    }
}

impl<E: KmipEnum> SerializableTtlvType for TtlvEnum<E> {
    const TTLV_TYPE: TtlvType = TtlvType::Enumeration;

    fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self> {
        if value_len != 4 {
            return Err(Error::InvalidTtlvValueLength {
                expected: 4,
                actual: value_len,
                r#type: Self::TTLV_TYPE,
            });
        }
        let mut buf = [0u8; 4];
        src.read_exact(&mut buf)?;
        let code = u32::from_be_bytes(buf);
        let symbol = E::from_code(code).ok_or_else(|| {
            tracing::debug!(code, "enumeration code outside declared domain");
            Error::InvalidTtlvValue(Self::TTLV_TYPE)
        })?;
        Ok(TtlvEnum { code, symbol })
    }

    fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32> {
        dst.write_all(&4u32.to_be_bytes())?;
        dst.write_all(&self.code.to_be_bytes())?;
        Ok(4)
    }
}

// --- TtlvBoolean ----------------------------------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Boolean.
///
/// According to the [KMIP specification 1.0 section 9.1.1.4 Item Value](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_Ref262577330):
/// > _Booleans are encoded as an eight-byte value that SHALL either contain the hex value
/// > 0000000000000000, indicating the Boolean value False, or the hex value 0000000000000001,
/// > transmitted big-endian, indicating the Boolean value True._
/// > Boolean cannot be implemented using the define_fixed_value_length_serializable_ttlv_type! macro because it has
/// > special value verification rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtlvBoolean(pub bool);
impl TtlvBoolean {
    const TTLV_FIXED_VALUE_LENGTH: u32 = 8;
}
impl Deref for TtlvBoolean {
    type Target = bool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl SerializableTtlvType for TtlvBoolean {
    const TTLV_TYPE: TtlvType = TtlvType::Boolean;

    fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self> {
        if value_len != Self::TTLV_FIXED_VALUE_LENGTH {
            Err(Error::InvalidTtlvValueLength {
                expected: Self::TTLV_FIXED_VALUE_LENGTH,
                actual: value_len,
                r#type: Self::TTLV_TYPE,
            })
        } else {
            let mut dst = [0u8; Self::TTLV_FIXED_VALUE_LENGTH as usize];
            src.read_exact(&mut dst)?;
            match u64::from_be_bytes(dst) {
                0 => Ok(TtlvBoolean(false)),
                1 => Ok(TtlvBoolean(true)),
                _ => Err(Error::InvalidTtlvValue(Self::TTLV_TYPE)),
            }
        }
    }

    fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32> {
        let v = match self.0 {
            true => 1u64,
            false => 0u64,
        };
        dst.write_all(&Self::TTLV_FIXED_VALUE_LENGTH.to_be_bytes())?; // Write L_ength
        dst.write_all(&v.to_be_bytes())?; // Write V_alue
        Ok(Self::TTLV_FIXED_VALUE_LENGTH)
    }
}

// --- TtlvTextString -------------------------------------------------------------------------------------------------

// TextString cannot be implemented using the define_fixed_value_length_serializable_ttlv_type! macro because it has a
// dynamic length.

/// A type for (de)serializing a TTLV Text String.
///
/// According to the [KMIP specification 1.0 section 9.1.1.4 Item Value](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_Ref262577330):
/// > _Text Strings are sequences of bytes that encode character values according to the UTF-8
/// > encoding standard. There SHALL NOT be null-termination at the end of such strings._
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TtlvTextString(pub String);
impl Deref for TtlvTextString {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl SerializableTtlvType for TtlvTextString {
    const TTLV_TYPE: TtlvType = TtlvType::TextString;

    fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self> {
        // Read the raw bytes first, without knowing yet if they are valid UTF-8.
        let mut dst = vec![0; value_len as usize];
        src.read_exact(&mut dst)?;

        // Use the bytes as-is as the internal buffer for a String, verifying that the bytes are indeed valid
        // UTF-8
        let new_str =
            String::from_utf8(dst).map_err(|_| Error::InvalidTtlvValue(Self::TTLV_TYPE))?;

        Ok(TtlvTextString(new_str))
    }

    fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32> {
        let v = self.0.as_bytes();
        let v_len = v.len() as u32;
        dst.write_all(&v_len.to_be_bytes())?; // Write L_ength
        dst.write_all(v)?; // Write V_alue
        Ok(v_len)
    }
}

// --- TtlvByteString -------------------------------------------------------------------------------------------------

// ByteString cannot be implemented using the define_fixed_value_length_serializable_ttlv_type! macro because it has a
// dynamic length.

/// A type for (de)serializing a TTLV Byte String.
///
/// According to the [KMIP specification 1.0 section 9.1.1.4 Item Value](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_Ref262577330):
/// > _Byte Strings are sequences of bytes containing individual unspecified eight-bit binary values, and are interpreted
/// > in the same sequence order._
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TtlvByteString(pub Vec<u8>);
impl Deref for TtlvByteString {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl SerializableTtlvType for TtlvByteString {
    const TTLV_TYPE: TtlvType = TtlvType::ByteString;

    fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self> {
        let mut dst = vec![0; value_len as usize];
        src.read_exact(&mut dst)?;
        Ok(TtlvByteString(dst))
    }

    fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32> {
        let v = self.0.as_slice();
        let v_len = v.len() as u32;
        dst.write_all(&v_len.to_be_bytes())?; // Write L_ength
        dst.write_all(v)?; // Write V_alue
        Ok(v_len)
    }
}

// --- TtlvDateTime ---------------------------------------------------------------------------------------------------

define_fixed_value_length_serializable_ttlv_type!(
    /// A type for (de)serializing a TTLV Date-Time.
    ///
    /// According to the [KMIP specification 1.0 section 9.1.1.4 Item Value](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_Ref262577330):
    /// > _Date-Time values are POSIX Time values encoded as Long Integers. POSIX Time, as described
    ///   in IEEE Standard 1003.1 [IEEE1003-1], is the number of seconds since the Epoch (1970 Jan 1,
    ///   00:00:00 UTC), not counting leap seconds._
    TtlvDateTime,
    TtlvType::DateTime,
    i64,
    8
);

// --- TtlvInterval ---------------------------------------------------------------------------------------------------

define_fixed_value_length_serializable_ttlv_type!(
    /// A type for (de)serializing a TTLV Interval.
    ///
    /// According to the [KMIP specification 1.0 section 9.1.1.4 Item Value](http://docs.oasis-open.org/kmip/spec/v1.0/os/kmip-spec-1.0-os.html#_Ref262577330):
    /// > _Intervals are encoded as four-byte long (32 bit) binary unsigned numbers, transmitted big-endian.
    /// > They have a resolution of one second._
    TtlvInterval,
    TtlvType::Interval,
    u32,
    4
);

#[cfg(test)]
mod tests;
