//! Provides the error types reported by the codec, the assembler and the query layer.
//!
//! All failures which are detected while packing, unpacking or querying blocks are reported as
//! [SuccinctError]. Decode failures carry the byte offset of the entry which couldn't be read
//! along with a [DecodeFailure] describing what went wrong. Note that a malformed buffer is a
//! permanent condition: decoding is deterministic, therefore retrying would only yield the same
//! error once again.
//!
//! # Example
//!
//! ```
//! # use lectio::error::{DecodeFailure, SuccinctError};
//! let error = SuccinctError::Decode {
//!     offset: 12,
//!     failure: DecodeFailure::UnknownTag(0xFF),
//! };
//!
//! assert_eq!(format!("{}", error), "Cannot decode entry at offset 12: unknown tag byte 0xff");
//! ```
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::succinct::item::ItemType;

/// Enumerates the reasons why a single entry of a channel buffer couldn't be decoded.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DecodeFailure {
    /// The item kind encoded in the upper bits of the tag byte is unknown.
    UnknownTag(u8),

    /// The item kind is known but the sub type / direction code isn't.
    UnknownSubType(ItemType, u8),

    /// The buffer ended in the middle of a varint.
    TruncatedVarint,

    /// A varint had more continuation bytes than its target type can hold.
    VarintOverflow,

    /// A length prefix points beyond the end of the buffer.
    PayloadOverrun {
        /// The number of bytes announced by the length prefix.
        needed: usize,
        /// The number of bytes left in the buffer.
        available: usize,
    },

    /// The bytes of a token are not valid UTF-8.
    InvalidUtf8,

    /// A scope label references a symbol which is unknown to the symbol table.
    UnknownSymbol(u32),
}

/// Represents an error reported by the succinct codec or by one of its users.
#[derive(Debug)]
pub enum SuccinctError {
    /// A channel buffer couldn't be decoded.
    Decode {
        /// The offset of the entry which couldn't be read.
        offset: usize,
        /// The actual problem.
        failure: DecodeFailure,
    },

    /// A field was requested on an item which doesn't carry it (e.g. `chars` on a scope).
    TypeMismatch {
        /// The requested field.
        field: String,
        /// The kind of the item on which the field was requested.
        item_type: ItemType,
    },

    /// The header of an encoded channel doesn't match its buffer. This indicates a bug.
    EncodingInvariant(String),

    /// A field selection couldn't be parsed or references unknown fields.
    InvalidSelection(String),

    /// A scope was closed which isn't open.
    UnbalancedScope(String),

    /// A block marker was closed without a block being open or a stream ended within a block.
    UnbalancedBlock(String),

    /// A scope label contains an empty component (e.g. `"chapter//1"`).
    EmptyLabelComponent(String),

    /// No document with the given id is known.
    UnknownDocument(String),

    /// A document has no sequence with the given id.
    UnknownSequence(u32),

    /// The symbol table ran out of symbols.
    SymbolOverflow,
}

/// Represents the result type used throughout the codec.
pub type SuccinctResult<T> = std::result::Result<T, SuccinctError>;

impl SuccinctError {
    /// Creates a decode error for the entry at the given offset.
    pub fn decode(offset: usize, failure: DecodeFailure) -> Self {
        SuccinctError::Decode { offset, failure }
    }

    /// Creates a type mismatch error for the given field and item kind.
    pub fn type_mismatch(field: impl Into<String>, item_type: ItemType) -> Self {
        SuccinctError::TypeMismatch {
            field: field.into(),
            item_type,
        }
    }
}

impl Display for DecodeFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeFailure::UnknownTag(tag) => write!(f, "unknown tag byte {:#04x}", tag),
            DecodeFailure::UnknownSubType(item_type, code) => {
                write!(f, "unknown sub type {} for {}", code, item_type.name())
            }
            DecodeFailure::TruncatedVarint => write!(f, "truncated varint"),
            DecodeFailure::VarintOverflow => write!(f, "varint overflow"),
            DecodeFailure::PayloadOverrun { needed, available } => write!(
                f,
                "payload of {} bytes exceeds the {} remaining bytes",
                needed, available
            ),
            DecodeFailure::InvalidUtf8 => write!(f, "token is not valid UTF-8"),
            DecodeFailure::UnknownSymbol(symbol) => write!(f, "unknown symbol {}", symbol),
        }
    }
}

impl Display for SuccinctError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SuccinctError::Decode { offset, failure } => {
                write!(f, "Cannot decode entry at offset {}: {}", offset, failure)
            }
            SuccinctError::TypeMismatch { field, item_type } => write!(
                f,
                "The field '{}' is not available for items of type {}",
                field,
                item_type.name()
            ),
            SuccinctError::EncodingInvariant(message) => {
                write!(f, "Encoding invariant violated: {}", message)
            }
            SuccinctError::InvalidSelection(message) => {
                write!(f, "Invalid field selection: {}", message)
            }
            SuccinctError::UnbalancedScope(label) => {
                write!(f, "Cannot close scope '{}' as it isn't open", label)
            }
            SuccinctError::UnbalancedBlock(message) => write!(f, "Unbalanced block: {}", message),
            SuccinctError::EmptyLabelComponent(label) => {
                write!(f, "The scope label '{}' contains an empty component", label)
            }
            SuccinctError::UnknownDocument(id) => write!(f, "Unknown document: {}", id),
            SuccinctError::UnknownSequence(id) => write!(f, "Unknown sequence: {}", id),
            SuccinctError::SymbolOverflow => write!(f, "Symbol table overflow!"),
        }
    }
}

impl Error for SuccinctError {}

#[cfg(test)]
mod tests {
    use crate::error::{DecodeFailure, SuccinctError};
    use crate::succinct::item::ItemType;

    #[test]
    fn errors_render_their_details() {
        assert_eq!(
            SuccinctError::type_mismatch("chars", ItemType::Scope).to_string(),
            "The field 'chars' is not available for items of type scope"
        );
        assert_eq!(
            SuccinctError::decode(
                3,
                DecodeFailure::PayloadOverrun {
                    needed: 10,
                    available: 2
                }
            )
            .to_string(),
            "Cannot decode entry at offset 3: payload of 10 bytes exceeds the 2 remaining bytes"
        );
    }

    #[test]
    fn succinct_errors_convert_into_anyhow() {
        let error: anyhow::Error = SuccinctError::UnknownSequence(42).into();
        assert_eq!(error.to_string(), "Unknown sequence: 42");
    }
}
