//! Contains the `Block`, the unit of storage of a sequence.
//!
//! A block carries the label of its own structural scope (`bs`, e.g. `blockTag/p`) and four packed
//! channels:
//!
//! * **c**: the content of the block (tokens, scopes being opened / closed and inline grafts),
//! * **bg**: grafts attached to the block as a whole (headings, titles...),
//! * **os**: scopes which are already open when the block starts,
//! * **is**: scopes which are opened (or placed as point) within the block.
//!
//! For each channel, the [BlockHeader] records the byte length and the number of entries. These
//! are computed once by the encoder so that they can be read without touching the buffers.
//! The `bs` label is stored unpacked (as interned symbols) in the header, as every block has
//! exactly one.
use bytes::Bytes;

use crate::error::{DecodeFailure, SuccinctError, SuccinctResult};
use crate::succinct::decoder::{Cursor, Entries, Items, Labels};
use crate::succinct::encoder::LABEL_SEPARATOR;
use crate::succinct::symbols::{Symbol, SymbolTable};

/// Enumerates the four channels of a block.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ChannelKind {
    /// The content of the block.
    Content = 0,
    /// The grafts attached to the block.
    BlockGrafts = 1,
    /// The scopes open at block start.
    OpenScopes = 2,
    /// The scopes opened within the block.
    IncludedScopes = 3,
}

impl ChannelKind {
    /// Lists all channels in their canonical order.
    pub const ALL: [ChannelKind; 4] = [
        ChannelKind::Content,
        ChannelKind::BlockGrafts,
        ChannelKind::OpenScopes,
        ChannelKind::IncludedScopes,
    ];

    /// Returns the short name of the channel (`c`, `bg`, `os`, `is`).
    pub fn name(&self) -> &'static str {
        match self {
            ChannelKind::Content => "c",
            ChannelKind::BlockGrafts => "bg",
            ChannelKind::OpenScopes => "os",
            ChannelKind::IncludedScopes => "is",
        }
    }

    /// Resolves a short channel name.
    ///
    /// # Example
    /// ```
    /// # use lectio::succinct::block::ChannelKind;
    /// assert_eq!(ChannelKind::from_name("bg"), Some(ChannelKind::BlockGrafts));
    /// assert_eq!(ChannelKind::from_name("xx"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<ChannelKind> {
        ChannelKind::ALL
            .iter()
            .find(|kind| kind.name() == name)
            .copied()
    }
}

/// Records the byte length and the number of entries of a packed channel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct ChannelHeader {
    byte_len: u32,
    len: u32,
}

impl ChannelHeader {
    /// Creates a new header.
    ///
    /// # Errors
    /// Fails if either value doesn't fit into 32 bits.
    pub fn new(byte_len: usize, len: usize) -> SuccinctResult<Self> {
        let as_u32 = |value: usize, what: &str| {
            u32::try_from(value).map_err(|_| {
                SuccinctError::EncodingInvariant(format!("{} {} exceeds 32 bits", what, value))
            })
        };

        Ok(ChannelHeader {
            byte_len: as_u32(byte_len, "byte length")?,
            len: as_u32(len, "entry count")?,
        })
    }

    /// Returns the number of bytes in the packed buffer.
    pub fn byte_len(&self) -> usize {
        self.byte_len as usize
    }

    /// Returns the number of top-level entries in the packed buffer.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Determines if the channel is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Represents a sealed channel as produced by the [encoder](crate::succinct::encoder).
#[derive(Debug, Clone)]
pub struct Channel {
    header: ChannelHeader,
    data: Bytes,
}

impl Channel {
    /// Combines the given header and buffer.
    ///
    /// Note that this is an internal API, channels are created by the encoder which guarantees
    /// that the header matches the buffer.
    pub(crate) fn new(header: ChannelHeader, data: Bytes) -> Self {
        Channel { header, data }
    }

    /// Creates an empty channel.
    pub fn empty() -> Self {
        Channel {
            header: ChannelHeader::default(),
            data: Bytes::new(),
        }
    }

    /// Returns the header of this channel.
    pub fn header(&self) -> &ChannelHeader {
        &self.header
    }

    /// Returns the packed buffer.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Contains the fixed metadata of a block.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BlockHeader {
    bs: Box<[Symbol]>,
    channels: [ChannelHeader; 4],
}

impl BlockHeader {
    /// Returns the symbols which make up the label of the block scope.
    pub fn bs(&self) -> &[Symbol] {
        &self.bs
    }

    /// Returns the header of the given channel.
    pub fn channel(&self, kind: ChannelKind) -> &ChannelHeader {
        &self.channels[kind as usize]
    }
}

/// Represents a block of a sequence.
///
/// # Example
/// ```
/// # use lectio::succinct::block::{Block, ChannelKind};
/// # use lectio::succinct::encoder::{encode_channel, intern_label};
/// # use lectio::succinct::item::Item;
/// # use lectio::succinct::symbols::SymbolTable;
/// let mut symbols = SymbolTable::new();
/// let bs = intern_label("blockTag/p", &mut symbols).unwrap();
/// let content = encode_channel(&[Item::word("Amen")], &mut symbols, true).unwrap();
///
/// let block = Block::new(bs, [
///     content,
///     encode_channel(&[], &mut symbols, true).unwrap(),
///     encode_channel(&[], &mut symbols, true).unwrap(),
///     encode_channel(&[], &mut symbols, true).unwrap(),
/// ]);
///
/// assert_eq!(block.bs_label(&symbols).unwrap(), "blockTag/p");
/// assert_eq!(block.header().channel(ChannelKind::Content).byte_len(), 6);
/// assert_eq!(block.items(ChannelKind::Content, &symbols).next().unwrap().unwrap(), Item::word("Amen"));
/// ```
#[derive(Debug, Clone)]
pub struct Block {
    header: BlockHeader,
    buffers: [Bytes; 4],
}

impl Block {
    /// Creates a new block from the given block scope and channels.
    ///
    /// The channels have to be given in the order of [ChannelKind::ALL].
    pub fn new(bs: Vec<Symbol>, channels: [Channel; 4]) -> Self {
        let [c, bg, os, is] = channels;
        Block {
            header: BlockHeader {
                bs: bs.into_boxed_slice(),
                channels: [c.header, bg.header, os.header, is.header],
            },
            buffers: [c.data, bg.data, os.data, is.data],
        }
    }

    /// Returns the header of this block.
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Returns the header of the given channel.
    pub fn channel(&self, kind: ChannelKind) -> &ChannelHeader {
        self.header.channel(kind)
    }

    /// Returns the packed buffer of the given channel.
    pub fn data(&self, kind: ChannelKind) -> &Bytes {
        &self.buffers[kind as usize]
    }

    /// Resolves the label of the block scope.
    ///
    /// This only uses the header and the symbol table, no channel is decoded.
    pub fn bs_label(&self, symbols: &SymbolTable) -> SuccinctResult<String> {
        let mut label = String::new();
        for (index, symbol) in self.header.bs.iter().enumerate() {
            let part = symbols.resolve(*symbol).ok_or_else(|| {
                SuccinctError::decode(0, DecodeFailure::UnknownSymbol(*symbol))
            })?;
            if index > 0 {
                label.push(LABEL_SEPARATOR);
            }
            label.push_str(part);
        }

        Ok(label)
    }

    /// Provides a cursor on the given channel.
    pub fn cursor(&self, kind: ChannelKind) -> Cursor {
        Cursor::new(self.data(kind))
    }

    /// Lazily iterates over the raw entries of the given channel.
    pub fn entries(&self, kind: ChannelKind) -> Entries {
        self.cursor(kind).entries()
    }

    /// Lazily decodes all items of the given channel.
    pub fn items<'a>(&'a self, kind: ChannelKind, symbols: &'a SymbolTable) -> Items<'a> {
        self.cursor(kind).items(symbols)
    }

    /// Lazily decodes the labels of all scopes of the given channel while skipping all other
    /// entries.
    pub fn labels<'a>(&'a self, kind: ChannelKind, symbols: &'a SymbolTable) -> Labels<'a> {
        self.cursor(kind).labels(symbols)
    }

    /// Estimates the memory occupied by this block.
    pub fn allocated_size(&self) -> usize {
        std::mem::size_of::<Block>()
            + self.header.bs.len() * std::mem::size_of::<Symbol>()
            + self.buffers.iter().map(|buffer| buffer.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use crate::succinct::block::{Block, ChannelHeader, ChannelKind};
    use crate::succinct::encoder::{encode_channel, intern_label};
    use crate::succinct::item::{GraftType, Item};
    use crate::succinct::symbols::SymbolTable;

    #[test]
    fn headers_are_available_without_decoding() {
        let mut symbols = SymbolTable::new();
        let bs = intern_label("blockTag/q1", &mut symbols).unwrap();
        let block = Block::new(
            bs,
            [
                encode_channel(
                    &[Item::word("I"), Item::word("am")],
                    &mut symbols,
                    true,
                )
                .unwrap(),
                encode_channel(&[Item::graft(GraftType::Heading, 2)], &mut symbols, true).unwrap(),
                encode_channel(&[Item::open("chapter/3")], &mut symbols, true).unwrap(),
                encode_channel(&[], &mut symbols, true).unwrap(),
            ],
        );

        let header = block.header();
        assert_eq!(header.channel(ChannelKind::Content).len(), 2);
        assert_eq!(header.channel(ChannelKind::Content).byte_len(), 3 + 4);
        assert_eq!(header.channel(ChannelKind::BlockGrafts).byte_len(), 2);
        assert_eq!(header.channel(ChannelKind::OpenScopes).byte_len(), 4);
        assert_eq!(header.channel(ChannelKind::IncludedScopes).is_empty(), true);
        for kind in ChannelKind::ALL {
            assert_eq!(block.channel(kind), header.channel(kind));
            assert_eq!(header.channel(kind).byte_len(), block.data(kind).len());
            assert_eq!(header.channel(kind).len(), block.entries(kind).count());
        }
        assert_eq!(block.bs_label(&symbols).unwrap(), "blockTag/q1");
    }

    #[test]
    fn unknown_block_scope_symbols_are_reported() {
        let symbols = SymbolTable::new();
        let block = Block::new(
            vec![42],
            [
                super::Channel::empty(),
                super::Channel::empty(),
                super::Channel::empty(),
                super::Channel::empty(),
            ],
        );

        assert!(block.bs_label(&symbols).is_err());
    }

    #[test]
    fn oversized_headers_are_rejected() {
        assert!(ChannelHeader::new(u32::MAX as usize + 1, 1).is_err());
        assert_eq!(ChannelHeader::new(10, 3).unwrap().len(), 3);
    }
}
