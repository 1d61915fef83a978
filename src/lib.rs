//! A crate for (de)serializing the nine primitive TTLV types from/to bytes in the KMIP wire
//! format, plus a peek-capable byte-stream wrapper for streaming, tag-keyed dispatch.
//!
//! This is the detailed API documentation. For a higher level introduction see the [README].
//!
//! [README]: https://crates.io/crates/kmip-ttlv-primitives/
//!
//! Note that this crate only supports (de)serialization of primitive TTLV values, it does
//! **NOT** send or receive data, and it does **NOT** compose primitives into a `Structure` tree
//! on your behalf — schema composition, transport and higher-level KMIP operations are left to a
//! consumer crate built on top of this one (the role that `kmip-protocol` plays for the full
//! `kmip-ttlv` crate this one descends from).
//!
//! # Usage
//!
//! Add the following to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! kmip-ttlv-primitives = "0.1.0"
//! ```
//!
//! ```
//! use kmip_ttlv_primitives::types::{SerializableTtlvType, TtlvInteger, TtlvTag, TtlvType};
//!
//! # fn main() -> kmip_ttlv_primitives::types::Result<()> {
//! let tag = TtlvTag::from(0x420020u32);
//! let value = TtlvInteger::new(8)?;
//!
//! let mut bytes = Vec::new();
//! tag.write(&mut bytes)?;
//! value.write(&mut bytes)?;
//!
//! let mut cursor = std::io::Cursor::new(&bytes);
//! let read_tag = TtlvTag::read(&mut cursor)?;
//! let read_type = TtlvType::read(&mut cursor)?;
//! let read_value = TtlvInteger::read(&mut cursor)?;
//! assert_eq!(read_tag, tag);
//! assert_eq!(read_type, TtlvType::Integer);
//! assert_eq!(read_value, value);
//! # Ok(())
//! # }
//! ```
//!
//! To learn more about the low-level primitive API see the [types] module. To learn about
//! non-consuming lookahead over a seekable byte source see the [stream] module.
//!
//! # TTLV format
//!
//! TTLV stands for Tag-Type-Length-Value which represents the format of each node in a tree when serialized to bytes:
//!
//!   - The TTLV format is defined as part of the [Oasis Key Management Interoperability Protocol Specification Version
//!     1.1] (aka KMIP) in [Section 9.1 TTLV Encoding].
//!   - The byte representation of a TTLV item consists of a 3 byte tag, a 1 byte type, a 4 byte length followed by zero
//!     or more "Value" bytes.
//!   - Leaf nodes in the tree are TTLV items whose "Type" denotes them to be a primitive value of some kind (e.g.
//!     Integer, Boolean, etc) and whose "Value" is a single primitive value in serialized form, followed by any
//!     required padding bytes.
//!   - All other tree nodes are "Structure" TTLV items whose value consists of zero or more TTLV items; this crate
//!     reads and writes a Structure's own (tag, type, length) header but leaves decoding its nested items to the
//!     caller, since that requires knowledge of the schema being parsed.
//!
//! [Oasis Key Management Interoperability Protocol Specification Version 1.1]: https://docs.oasis-open.org/kmip/spec/v1.1/os/kmip-spec-v1.1-os.html
//! [Section 9.1 TTLV Encoding]: https://docs.oasis-open.org/kmip/spec/v1.1/os/kmip-spec-v1.1-os.html#_Toc332820710
//!
//! # Choosing tag values
//!
//! When implementing one of the KMIP specifications the tag value to use for each KMIP object is defined by the spec.
//! The KMIP specifications reserve tag value range 0x420000 - 0x42FFFF for official KMIP tags and reserve tag value
//! range 0x540000 - 0x54FFFF for custom extensions. If using TTLV as a serialization format for your own data you are
//! free to choose your own tag values anywhere in the range 0x000000 - 0xFFFFFF.
//!
//! # Supported data types
//!
//! | TTLV data type      | Rust type                    |
//! |---------------------|-------------------------------|
//! | Structure (0x01)    | header only — [`types::read_header`]/[`types::write_header`] |
//! | Integer (0x02)      | [`types::TtlvInteger`] (`i32`) |
//! | Long Integer (0x03) | [`types::TtlvLongInteger`] (`i64`) |
//! | Big Integer (0x04)  | [`types::TtlvBigInteger`] (arbitrary precision) |
//! | Enumeration (0x05)  | [`types::TtlvEnum`] (numeric code + [`types::KmipEnum`] symbol) |
//! | Boolean (0x06)      | [`types::TtlvBoolean`] (`bool`) |
//! | Text String (0x07)  | [`types::TtlvTextString`] (`String`) |
//! | Byte String (0x08)  | [`types::TtlvByteString`] (`Vec<u8>`) |
//! | Date Time (0x09)    | [`types::TtlvDateTime`] (`i64`, POSIX time) |
//! | Interval (0x0A)     | [`types::TtlvInterval`] (`u32`, seconds) |
//!
//! # Error handling
//!
//! If serialization or deserialization fails this crate returns a [`types::Error`] describing
//! what went wrong: an I/O failure, a tag/type/length mismatch, an out-of-domain value, or a
//! range violation at construction time. [`error::Error`] wraps [`types::Error`] with an
//! [`error::ErrorLocation`] for callers that want to pinpoint a failure within a larger byte
//! stream or tag tree, mirroring the error layering of the crate this one descends from.
pub mod error;
pub mod stream;
pub mod types;
