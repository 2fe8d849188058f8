//! Packs the items of a single channel into a byte buffer.
//!
//! Entries are simply concatenated without any padding or alignment:
//!
//! ```text
//! Token:  [tag][len: varint][utf8 bytes...]
//! Scope:  [tag][symbol: varint]...[0]
//! Graft:  [tag][sequence id: varint]
//! ```
//!
//! While entries are appended, the encoder keeps track of the number of entries and the number of
//! bytes written, so that both values end up in the [ChannelHeader] of the block without ever
//! re-scanning the buffer.
//!
//! # Example
//!
//! ```
//! # use lectio::succinct::encoder::ChannelEncoder;
//! # use lectio::succinct::item::Item;
//! # use lectio::succinct::symbols::SymbolTable;
//! let mut symbols = SymbolTable::new();
//! let mut encoder = ChannelEncoder::new();
//!
//! encoder.push(&Item::open("chapter/1"), &mut symbols).unwrap();
//! encoder.push(&Item::word("In"), &mut symbols).unwrap();
//!
//! let channel = encoder.finish(true).unwrap();
//! assert_eq!(channel.header().len(), 2);
//! assert_eq!(channel.header().byte_len(), 4 + 4);
//! ```
use bytes::{BufMut, BytesMut};

use crate::error::{SuccinctError, SuccinctResult};
use crate::succinct::block::{Channel, ChannelHeader};
use crate::succinct::decoder::Cursor;
use crate::succinct::item::Item;
use crate::succinct::symbols::{Symbol, SymbolTable};
use crate::succinct::varint::{varint_len, write_varint};

/// Marks the end of the components of a scope label.
pub const LABEL_TERMINATOR: u8 = 0;

/// Contains the separator of the components of a scope label.
pub const LABEL_SEPARATOR: char = '/';

/// Collects the entries of a single channel.
#[derive(Default)]
pub struct ChannelEncoder {
    buffer: BytesMut,
    byte_len: usize,
    len: usize,
}

impl ChannelEncoder {
    /// Creates a new encoder for an empty channel.
    pub fn new() -> Self {
        ChannelEncoder {
            buffer: BytesMut::new(),
            byte_len: 0,
            len: 0,
        }
    }

    /// Appends the given item.
    ///
    /// Scope labels are split into their components, which are interned in the given table.
    ///
    /// # Errors
    /// Fails if a scope label contains an empty component or if the symbol table overflows. In
    /// this case, nothing is appended.
    pub fn push(&mut self, item: &Item, symbols: &mut SymbolTable) -> SuccinctResult<()> {
        match item {
            Item::Token { chars, .. } => {
                self.buffer.put_u8(item.tag());
                write_varint(chars.len() as u64, &mut self.buffer);
                self.buffer.extend_from_slice(chars.as_bytes());
                self.byte_len += 1 + varint_len(chars.len() as u64) + chars.len();
            }
            Item::Scope { label, .. } => {
                let path = intern_label(label, symbols)?;
                self.push_scope(item.tag(), &path);
            }
            Item::Graft { sequence_id, .. } => {
                self.buffer.put_u8(item.tag());
                write_varint(*sequence_id as u64, &mut self.buffer);
                self.byte_len += 1 + varint_len(*sequence_id as u64);
            }
        }

        self.len += 1;
        Ok(())
    }

    /// Appends all given items.
    pub fn push_all<'a>(
        &mut self,
        items: impl IntoIterator<Item = &'a Item>,
        symbols: &mut SymbolTable,
    ) -> SuccinctResult<()> {
        for item in items {
            self.push(item, symbols)?;
        }

        Ok(())
    }

    fn push_scope(&mut self, tag: u8, path: &[Symbol]) {
        self.buffer.put_u8(tag);
        for symbol in path {
            write_varint(*symbol as u64, &mut self.buffer);
        }
        self.buffer.put_u8(LABEL_TERMINATOR);

        self.byte_len += 2 + path
            .iter()
            .map(|symbol| varint_len(*symbol as u64))
            .sum::<usize>();
    }

    /// Returns the number of entries appended so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Determines if no entry has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Seals the channel and returns its buffer along with its header.
    ///
    /// If `verify` is set, the buffer is re-scanned to ensure that it contains exactly the number
    /// of entries recorded in the header.
    ///
    /// # Errors
    /// Fails with [SuccinctError::EncodingInvariant] if the recorded header doesn't match the
    /// buffer. This indicates a bug in the encoder.
    pub fn finish(self, verify: bool) -> SuccinctResult<Channel> {
        debug_assert_eq!(self.byte_len, self.buffer.len());
        if self.byte_len != self.buffer.len() {
            return Err(SuccinctError::EncodingInvariant(format!(
                "recorded {} bytes but the buffer contains {}",
                self.byte_len,
                self.buffer.len()
            )));
        }

        let data = self.buffer.freeze();
        if verify {
            let scanned = Cursor::new(&data).count_entries()?;
            if scanned != self.len {
                return Err(SuccinctError::EncodingInvariant(format!(
                    "recorded {} entries but the buffer contains {}",
                    self.len, scanned
                )));
            }
        }

        Ok(Channel::new(
            ChannelHeader::new(data.len(), self.len)?,
            data,
        ))
    }
}

/// Splits a slash-delimited label into its components and interns each of them.
///
/// # Example
/// ```
/// # use lectio::succinct::encoder::intern_label;
/// # use lectio::succinct::symbols::SymbolTable;
/// let mut symbols = SymbolTable::new();
///
/// assert_eq!(intern_label("blockTag/p", &mut symbols).unwrap(), vec![1, 2]);
/// assert_eq!(intern_label("chapter/1", &mut symbols).unwrap(), vec![3, 4]);
/// assert!(intern_label("chapter//1", &mut symbols).is_err());
/// ```
pub fn intern_label(label: &str, symbols: &mut SymbolTable) -> SuccinctResult<Vec<Symbol>> {
    if label.split(LABEL_SEPARATOR).any(|component| component.is_empty()) {
        return Err(SuccinctError::EmptyLabelComponent(label.to_owned()));
    }

    label
        .split(LABEL_SEPARATOR)
        .map(|component| symbols.intern(component))
        .collect()
}

/// Packs the given items into a new channel.
///
/// This is a shortcut for creating a [ChannelEncoder], pushing all items and invoking
/// [finish](ChannelEncoder::finish).
pub fn encode_channel(
    items: &[Item],
    symbols: &mut SymbolTable,
    verify: bool,
) -> SuccinctResult<Channel> {
    let mut encoder = ChannelEncoder::new();
    encoder.push_all(items, symbols)?;
    encoder.finish(verify)
}

#[cfg(test)]
mod tests {
    use crate::error::SuccinctError;
    use crate::succinct::encoder::{encode_channel, ChannelEncoder};
    use crate::succinct::item::{GraftType, Item, TokenType};
    use crate::succinct::symbols::SymbolTable;

    #[test]
    fn entries_are_packed_without_padding() {
        let mut symbols = SymbolTable::new();
        let channel = encode_channel(
            &[
                Item::word("In"),
                Item::open("chapter/1"),
                Item::graft(GraftType::Footnote, 300),
            ],
            &mut symbols,
            true,
        )
        .unwrap();

        assert_eq!(
            channel.data().as_ref(),
            &[
                0x00, 0x02, b'I', b'n', // Token (wordLike), length 2, "In"
                0x40, 0x01, 0x02, 0x00, // Scope (open), chapter, 1, terminator
                0x86, 0xAC, 0x02, // Graft (footnote), 300
            ]
        );
        assert_eq!(channel.header().byte_len(), 11);
        assert_eq!(channel.header().len(), 3);
    }

    #[test]
    fn encoding_is_deterministic() {
        let items = vec![
            Item::open("blockTag/p"),
            Item::token(TokenType::Punctuation, ","),
            Item::point("milestone/ts"),
            Item::close("blockTag/p"),
        ];

        let mut symbols = SymbolTable::new();
        let first = encode_channel(&items, &mut symbols, true).unwrap();
        let second = encode_channel(&items, &mut symbols, true).unwrap();

        assert_eq!(first.data(), second.data());
        assert_eq!(first.header(), second.header());
    }

    #[test]
    fn empty_channels_have_an_empty_header() {
        let channel = ChannelEncoder::new().finish(true).unwrap();
        assert_eq!(channel.header().len(), 0);
        assert_eq!(channel.header().byte_len(), 0);
        assert_eq!(channel.data().is_empty(), true);
    }

    #[test]
    fn empty_label_components_are_rejected() {
        let mut symbols = SymbolTable::new();
        let mut encoder = ChannelEncoder::new();

        assert!(matches!(
            encoder.push(&Item::open("chapter/"), &mut symbols),
            Err(SuccinctError::EmptyLabelComponent(_))
        ));
        assert!(matches!(
            encoder.push(&Item::open(""), &mut symbols),
            Err(SuccinctError::EmptyLabelComponent(_))
        ));
        assert_eq!(encoder.is_empty(), true);
        assert_eq!(symbols.len(), 0);

        let _ = symbols.intern("verses").unwrap();
        assert!(encoder.push(&Item::open("chapter//1"), &mut symbols).is_err());
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols.find("chapter"), None);
    }

    #[test]
    fn multi_byte_tokens_record_their_byte_length() {
        let mut symbols = SymbolTable::new();
        let channel = encode_channel(&[Item::word("λόγος")], &mut symbols, true).unwrap();

        assert_eq!(channel.header().byte_len(), 1 + 1 + "λόγος".len());
        assert_eq!(channel.header().len(), 1);
    }
}
