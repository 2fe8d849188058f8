//! Decodes packed channels back into items, lazily.
//!
//! The central type is the [Cursor] which reads a single entry at a given byte offset and returns
//! it along with the offset of the next entry. An [Entry] is only a view into the buffer: the bytes
//! of a token and the symbols of a scope label are borrowed and neither validated nor resolved
//! until the respective field is requested. This way, a caller which is only interested in scope
//! labels never pays for the text of the tokens it skips over.
//!
//! On top of the cursor, three iterators are provided:
//! * [Entries] yields the raw entry views,
//! * [Items] materializes each entry into an [Item],
//! * [Labels] only yields the labels of scopes and skips all other entries using their length
//!   prefix.
//!
//! All of them are finite and restartable: a fresh iterator starts again at offset 0 and yields
//! the same sequence. Once an error has been reported, an iterator ends.
//!
//! # Example
//!
//! ```
//! # use lectio::succinct::decoder::Cursor;
//! # use lectio::succinct::encoder::encode_channel;
//! # use lectio::succinct::item::Item;
//! # use lectio::succinct::symbols::SymbolTable;
//! let mut symbols = SymbolTable::new();
//! let items = vec![Item::open("verses/1"), Item::word("In"), Item::close("verses/1")];
//! let channel = encode_channel(&items, &mut symbols, true).unwrap();
//!
//! let cursor = Cursor::new(channel.data());
//! let (first, next_offset) = cursor.item_at(0, &symbols).unwrap().unwrap();
//! assert_eq!(first, Item::open("verses/1"));
//! assert_eq!(next_offset, 4);
//!
//! let labels = cursor.labels(&symbols).collect::<Result<Vec<_>, _>>().unwrap();
//! assert_eq!(labels, vec!["verses/1", "verses/1"]);
//! ```
use num_traits::FromPrimitive;

use crate::error::{DecodeFailure, SuccinctError, SuccinctResult};
use crate::succinct::encoder::{LABEL_SEPARATOR, LABEL_TERMINATOR};
use crate::succinct::item::{split_tag, GraftType, Item, ItemType, ScopeDirection, TokenType};
use crate::succinct::symbols::{Symbol, SymbolTable};
use crate::succinct::varint::{read_varint, read_varint_u32, skip_varint};

/// Reads entries of a single packed channel.
#[derive(Copy, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
}

/// Represents a single entry of a channel which hasn't been materialized yet.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Entry<'a> {
    offset: usize,
    body: EntryBody<'a>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum EntryBody<'a> {
    Token {
        sub_type: TokenType,
        chars: &'a [u8],
    },
    Scope {
        direction: ScopeDirection,
        // The varint encoded symbols without the terminator...
        path: &'a [u8],
    },
    Graft {
        sub_type: GraftType,
        sequence_id: u32,
    },
}

impl<'a> Cursor<'a> {
    /// Creates a cursor for the given buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Cursor { data }
    }

    /// Returns the number of bytes in the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Determines if the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reads the entry starting at the given offset.
    ///
    /// Returns the entry and the offset of the next one or `None` if the offset points to the end
    /// of the buffer.
    ///
    /// # Errors
    /// Fails if the tag byte is unknown, if a varint is truncated or if a payload exceeds the
    /// buffer.
    pub fn read_at(&self, offset: usize) -> SuccinctResult<Option<(Entry<'a>, usize)>> {
        if offset >= self.data.len() {
            return Ok(None);
        }

        let fail = |failure| SuccinctError::decode(offset, failure);
        let (item_type, code) = split_tag(self.data[offset]).map_err(fail)?;
        let mut pos = offset + 1;

        let body = match item_type {
            ItemType::Token => {
                let sub_type = TokenType::from_u8(code)
                    .ok_or(DecodeFailure::UnknownSubType(item_type, code))
                    .map_err(fail)?;
                let end = self.payload_end(&mut pos).map_err(fail)?;
                let chars = &self.data[pos..end];
                pos = end;

                EntryBody::Token { sub_type, chars }
            }
            ItemType::Scope => {
                let direction = ScopeDirection::from_u8(code)
                    .ok_or(DecodeFailure::UnknownSubType(item_type, code))
                    .map_err(fail)?;
                let start = pos;
                let end = self.path_end(&mut pos).map_err(fail)?;

                EntryBody::Scope {
                    direction,
                    path: &self.data[start..end],
                }
            }
            ItemType::Graft => {
                let sub_type = GraftType::from_u8(code)
                    .ok_or(DecodeFailure::UnknownSubType(item_type, code))
                    .map_err(fail)?;
                let sequence_id = read_varint_u32(self.data, &mut pos).map_err(fail)?;

                EntryBody::Graft {
                    sub_type,
                    sequence_id,
                }
            }
        };

        Ok(Some((Entry { offset, body }, pos)))
    }

    /// Skips over the entry starting at the given offset.
    ///
    /// Only the tag byte and the length information of the entry are inspected. Therefore, this
    /// is cheaper than [read_at](Cursor::read_at) as sub types aren't checked. Returns the kind
    /// of the skipped entry and the offset of the next one.
    pub fn skip_at(&self, offset: usize) -> SuccinctResult<Option<(ItemType, usize)>> {
        if offset >= self.data.len() {
            return Ok(None);
        }

        let fail = |failure| SuccinctError::decode(offset, failure);
        let (item_type, _) = split_tag(self.data[offset]).map_err(fail)?;
        let mut pos = offset + 1;
        match item_type {
            ItemType::Token => pos = self.payload_end(&mut pos).map_err(fail)?,
            ItemType::Scope => {
                let _ = self.path_end(&mut pos).map_err(fail)?;
            }
            ItemType::Graft => skip_varint(self.data, &mut pos).map_err(fail)?,
        }

        Ok(Some((item_type, pos)))
    }

    /// Reads the length prefix at `pos` and returns the end offset of the payload which follows.
    ///
    /// `pos` is moved to the start of the payload.
    fn payload_end(&self, pos: &mut usize) -> Result<usize, DecodeFailure> {
        let len = read_varint(self.data, pos)?;
        let available = self.data.len() - *pos;
        if len > available as u64 {
            return Err(DecodeFailure::PayloadOverrun {
                needed: usize::try_from(len).unwrap_or(usize::MAX),
                available,
            });
        }

        Ok(*pos + len as usize)
    }

    /// Skips over the symbols of a scope label starting at `pos`.
    ///
    /// Returns the end of the symbols (the offset of the terminator) and moves `pos` behind the
    /// terminator.
    fn path_end(&self, pos: &mut usize) -> Result<usize, DecodeFailure> {
        loop {
            match self.data.get(*pos) {
                None => return Err(DecodeFailure::TruncatedVarint),
                Some(&LABEL_TERMINATOR) => {
                    let end = *pos;
                    *pos += 1;
                    return Ok(end);
                }
                Some(_) => skip_varint(self.data, pos)?,
            }
        }
    }

    /// Reads and materializes the item at the given offset.
    pub fn item_at(
        &self,
        offset: usize,
        symbols: &SymbolTable,
    ) -> SuccinctResult<Option<(Item, usize)>> {
        match self.read_at(offset)? {
            Some((entry, next)) => Ok(Some((entry.to_item(symbols)?, next))),
            None => Ok(None),
        }
    }

    /// Counts the entries in the buffer by skipping over each of them.
    pub fn count_entries(&self) -> SuccinctResult<usize> {
        let mut offset = 0;
        let mut count = 0;
        while let Some((_, next)) = self.skip_at(offset)? {
            offset = next;
            count += 1;
        }

        Ok(count)
    }

    /// Returns an iterator over all entries, starting at offset 0.
    pub fn entries(&self) -> Entries<'a> {
        Entries {
            cursor: *self,
            offset: 0,
            done: false,
        }
    }

    /// Returns an iterator which materializes all items, starting at offset 0.
    pub fn items(&self, symbols: &'a SymbolTable) -> Items<'a> {
        Items {
            entries: self.entries(),
            symbols,
        }
    }

    /// Returns an iterator which yields the labels of all scopes, starting at offset 0.
    pub fn labels(&self, symbols: &'a SymbolTable) -> Labels<'a> {
        Labels {
            cursor: *self,
            symbols,
            offset: 0,
            done: false,
        }
    }
}

impl<'a> Entry<'a> {
    /// Returns the offset of this entry within its buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the kind of this entry.
    pub fn item_type(&self) -> ItemType {
        match self.body {
            EntryBody::Token { .. } => ItemType::Token,
            EntryBody::Scope { .. } => ItemType::Scope,
            EntryBody::Graft { .. } => ItemType::Graft,
        }
    }

    /// Returns the name of the sub type (or the direction for scopes).
    pub fn sub_type_name(&self) -> &'static str {
        match self.body {
            EntryBody::Token { sub_type, .. } => sub_type.name(),
            EntryBody::Scope { direction, .. } => direction.name(),
            EntryBody::Graft { sub_type, .. } => sub_type.name(),
        }
    }

    /// Returns the text of a token.
    ///
    /// # Errors
    /// Fails with a type mismatch for scopes and grafts or with a decode error if the bytes are
    /// not valid UTF-8.
    pub fn chars(&self) -> SuccinctResult<&'a str> {
        match self.body {
            EntryBody::Token { chars, .. } => std::str::from_utf8(chars)
                .map_err(|_| SuccinctError::decode(self.offset, DecodeFailure::InvalidUtf8)),
            _ => Err(SuccinctError::type_mismatch("chars", self.item_type())),
        }
    }

    /// Resolves the label of a scope.
    ///
    /// # Errors
    /// Fails with a type mismatch for tokens and grafts or with a decode error if a symbol is
    /// unknown.
    pub fn label(&self, symbols: &SymbolTable) -> SuccinctResult<String> {
        match self.body {
            EntryBody::Scope { path, .. } => self.resolve_path(path, symbols),
            _ => Err(SuccinctError::type_mismatch("label", self.item_type())),
        }
    }

    /// Returns the direction of a scope.
    pub fn direction(&self) -> SuccinctResult<ScopeDirection> {
        match self.body {
            EntryBody::Scope { direction, .. } => Ok(direction),
            _ => Err(SuccinctError::type_mismatch("direction", self.item_type())),
        }
    }

    /// Returns the id of the sequence referenced by a graft.
    ///
    /// # Errors
    /// Fails with a type mismatch for tokens and scopes.
    pub fn sequence_id(&self) -> SuccinctResult<u32> {
        match self.body {
            EntryBody::Graft { sequence_id, .. } => Ok(sequence_id),
            _ => Err(SuccinctError::type_mismatch("sequenceId", self.item_type())),
        }
    }

    fn resolve_path(&self, path: &[u8], symbols: &SymbolTable) -> SuccinctResult<String> {
        let fail = |failure| SuccinctError::decode(self.offset, failure);
        let mut label = String::new();
        let mut pos = 0;
        while pos < path.len() {
            let symbol: Symbol = read_varint_u32(path, &mut pos).map_err(fail)?;
            let part = symbols
                .resolve(symbol)
                .ok_or(DecodeFailure::UnknownSymbol(symbol))
                .map_err(fail)?;
            if !label.is_empty() {
                label.push(LABEL_SEPARATOR);
            }
            label.push_str(part);
        }

        Ok(label)
    }

    /// Materializes this entry into an [Item].
    pub fn to_item(&self, symbols: &SymbolTable) -> SuccinctResult<Item> {
        match self.body {
            EntryBody::Token { sub_type, .. } => Ok(Item::Token {
                sub_type,
                chars: self.chars()?.to_owned(),
            }),
            EntryBody::Scope { direction, path } => Ok(Item::Scope {
                direction,
                label: self.resolve_path(path, symbols)?,
            }),
            EntryBody::Graft {
                sub_type,
                sequence_id,
            } => Ok(Item::Graft {
                sub_type,
                sequence_id,
            }),
        }
    }
}

/// Iterates over the raw entries of a channel.
pub struct Entries<'a> {
    cursor: Cursor<'a>,
    offset: usize,
    done: bool,
}

impl<'a> Iterator for Entries<'a> {
    type Item = SuccinctResult<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.cursor.read_at(self.offset) {
            Ok(Some((entry, next))) => {
                self.offset = next;
                Some(Ok(entry))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

/// Iterates over the materialized items of a channel.
pub struct Items<'a> {
    entries: Entries<'a>,
    symbols: &'a SymbolTable,
}

impl Iterator for Items<'_> {
    type Item = SuccinctResult<Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let symbols = self.symbols;
        self.entries
            .next()
            .map(|entry| entry.and_then(|entry| entry.to_item(symbols)))
    }
}

/// Iterates over the labels of all scopes of a channel.
///
/// Tokens and grafts are skipped without interpreting their payload.
pub struct Labels<'a> {
    cursor: Cursor<'a>,
    symbols: &'a SymbolTable,
    offset: usize,
    done: bool,
}

impl Labels<'_> {
    fn next_label(&mut self) -> SuccinctResult<Option<String>> {
        while let Some((item_type, next)) = self.cursor.skip_at(self.offset)? {
            if item_type == ItemType::Scope {
                if let Some((entry, _)) = self.cursor.read_at(self.offset)? {
                    self.offset = next;
                    return entry.label(self.symbols).map(Some);
                }
            }
            self.offset = next;
        }

        Ok(None)
    }
}

impl Iterator for Labels<'_> {
    type Item = SuccinctResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_label() {
            Ok(Some(label)) => Some(Ok(label)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use num_traits::FromPrimitive;
    use proptest::prelude::*;

    use crate::error::{DecodeFailure, SuccinctError};
    use crate::succinct::decoder::Cursor;
    use crate::succinct::encoder::encode_channel;
    use crate::succinct::item::{GraftType, Item, ItemType, ScopeDirection, TokenType};
    use crate::succinct::symbols::SymbolTable;

    fn sample_items() -> Vec<Item> {
        vec![
            Item::open("chapter/1"),
            Item::point("verses/1"),
            Item::word("Paul"),
            Item::token(TokenType::LineSpace, " "),
            Item::graft(GraftType::Footnote, 4),
            Item::word("ἀπόστολος"),
            Item::token(TokenType::Punctuation, ","),
            Item::close("chapter/1"),
            Item::graft(GraftType::Xref, 70_000),
        ]
    }

    fn assert_decode_failure(result: Result<Vec<Item>, SuccinctError>, expected: DecodeFailure) {
        match result {
            Err(SuccinctError::Decode { failure, .. }) => assert_eq!(failure, expected),
            other => panic!("Expected a decode error but got {:?}", other),
        }
    }

    #[test]
    fn items_survive_a_round_trip() {
        let mut symbols = SymbolTable::new();
        let items = sample_items();
        let channel = encode_channel(&items, &mut symbols, true).unwrap();

        let decoded = Cursor::new(channel.data())
            .items(&symbols)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(decoded, items);
        assert_eq!(decoded.len(), channel.header().len());
    }

    #[test]
    fn decoding_is_restartable() {
        let mut symbols = SymbolTable::new();
        let channel = encode_channel(&sample_items(), &mut symbols, true).unwrap();
        let cursor = Cursor::new(channel.data());

        let first = cursor.items(&symbols).collect::<Vec<_>>();
        let second = cursor.items(&symbols).collect::<Vec<_>>();
        assert_eq!(
            first.into_iter().map(|item| item.unwrap()).collect::<Vec<_>>(),
            second.into_iter().map(|item| item.unwrap()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn single_items_can_be_read_at_offsets() {
        let mut symbols = SymbolTable::new();
        let items = sample_items();
        let channel = encode_channel(&items, &mut symbols, true).unwrap();
        let cursor = Cursor::new(channel.data());

        let mut offset = 0;
        for expected in &items {
            let (item, next) = cursor.item_at(offset, &symbols).unwrap().unwrap();
            assert_eq!(&item, expected);
            let (item_type, skipped) = cursor.skip_at(offset).unwrap().unwrap();
            assert_eq!(item_type, expected.item_type());
            assert_eq!(skipped, next);
            offset = next;
        }
        assert_eq!(offset, channel.data().len());
        assert_eq!(cursor.item_at(offset, &symbols).unwrap().is_none(), true);
    }

    #[test]
    fn label_decoding_matches_full_decoding() {
        let mut symbols = SymbolTable::new();
        let channel = encode_channel(&sample_items(), &mut symbols, true).unwrap();
        let cursor = Cursor::new(channel.data());

        let labels = cursor
            .labels(&symbols)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let expected = cursor
            .items(&symbols)
            .filter_map(|item| item.unwrap().label().map(|label| label.to_owned()))
            .collect::<Vec<_>>();

        assert_eq!(labels, expected);
        assert_eq!(labels, vec!["chapter/1", "verses/1", "chapter/1"]);
    }

    #[test]
    fn label_decoding_skips_broken_token_payloads() {
        let mut symbols = SymbolTable::new();
        let channel = encode_channel(
            &[Item::word("ab"), Item::open("chapter/2")],
            &mut symbols,
            true,
        )
        .unwrap();

        // Corrupt the token text so that it is no longer valid UTF-8...
        let mut data = channel.data().to_vec();
        data[2] = 0xFF;
        let cursor = Cursor::new(&data);

        assert_eq!(
            cursor.labels(&symbols).next().unwrap().unwrap(),
            "chapter/2"
        );
        assert_decode_failure(
            cursor.items(&symbols).collect(),
            DecodeFailure::InvalidUtf8,
        );
    }

    #[test]
    fn entries_defer_field_access() {
        let mut symbols = SymbolTable::new();
        let channel = encode_channel(&sample_items(), &mut symbols, true).unwrap();
        let entries = Cursor::new(channel.data())
            .entries()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(entries[0].item_type(), ItemType::Scope);
        assert_eq!(entries[0].offset(), 0);
        assert_eq!(entries[0].sub_type_name(), "start");
        assert_eq!(entries[2].chars().unwrap(), "Paul");
        assert_eq!(entries[4].sequence_id().unwrap(), 4);
        assert_eq!(entries[8].sequence_id().unwrap(), 70_000);

        assert!(matches!(
            entries[0].chars(),
            Err(SuccinctError::TypeMismatch {
                item_type: ItemType::Scope,
                ..
            })
        ));
        assert!(matches!(
            entries[2].label(&symbols),
            Err(SuccinctError::TypeMismatch {
                item_type: ItemType::Token,
                ..
            })
        ));
        assert!(entries[4].direction().is_err());
    }

    #[test]
    fn malformed_buffers_are_reported() {
        let symbols = SymbolTable::new();

        // Unknown item kind...
        assert_decode_failure(
            Cursor::new(&[0xC0]).items(&symbols).collect(),
            DecodeFailure::UnknownTag(0xC0),
        );

        // Unknown token type...
        assert_decode_failure(
            Cursor::new(&[0x3F, 0x00]).items(&symbols).collect(),
            DecodeFailure::UnknownSubType(ItemType::Token, 0x3F),
        );

        // Token length exceeds the buffer...
        assert_decode_failure(
            Cursor::new(&[0x00, 0x05, b'a']).items(&symbols).collect(),
            DecodeFailure::PayloadOverrun {
                needed: 5,
                available: 1,
            },
        );

        // Truncated graft id...
        assert_decode_failure(
            Cursor::new(&[0x86, 0x80]).items(&symbols).collect(),
            DecodeFailure::TruncatedVarint,
        );

        // Scope label without terminator...
        assert_decode_failure(
            Cursor::new(&[0x40, 0x01]).items(&symbols).collect(),
            DecodeFailure::TruncatedVarint,
        );

        // Scope label referencing an unknown symbol...
        assert_decode_failure(
            Cursor::new(&[0x40, 0x07, 0x00]).items(&symbols).collect(),
            DecodeFailure::UnknownSymbol(7),
        );
    }

    #[test]
    fn iterators_stop_after_an_error() {
        let symbols = SymbolTable::new();
        let data = [0xC0, 0x00, 0x01, b'a'];
        let mut items = Cursor::new(&data).items(&symbols);

        assert!(items.next().unwrap().is_err());
        assert!(items.next().is_none());
    }

    #[test]
    fn decode_errors_report_the_entry_offset() {
        let mut symbols = SymbolTable::new();
        let channel = encode_channel(&[Item::word("a")], &mut symbols, true).unwrap();
        let mut data = channel.data().to_vec();
        data.push(0xFF);

        match Cursor::new(&data).count_entries() {
            Err(SuccinctError::Decode { offset, .. }) => assert_eq!(offset, 3),
            other => panic!("Expected a decode error but got {:?}", other),
        }
    }

    /// Creates a table where most label components have symbols which need two byte varints.
    fn populated_symbols() -> SymbolTable {
        let mut symbols = SymbolTable::new();
        for index in 0..400 {
            let _ = symbols.intern(format!("s{}", index)).unwrap();
        }

        symbols
    }

    fn arbitrary_item() -> impl Strategy<Value = Item> {
        prop_oneof![
            (0u8..8, "\\PC{0,160}").prop_map(|(code, chars)| {
                Item::token(TokenType::from_u8(code).unwrap(), chars)
            }),
            (0u8..3, prop::collection::vec(0u32..400, 1..4)).prop_map(|(code, parts)| {
                Item::Scope {
                    direction: ScopeDirection::from_u8(code).unwrap(),
                    label: parts.iter().map(|part| format!("s{}", part)).join("/"),
                }
            }),
            (0u8..12, any::<u32>()).prop_map(|(code, sequence_id)| {
                Item::graft(GraftType::from_u8(code).unwrap(), sequence_id)
            }),
        ]
    }

    #[test]
    fn boundary_values_survive_a_round_trip() {
        let mut symbols = populated_symbols();
        let items = vec![
            Item::word("a".repeat(200)),
            Item::word(""),
            Item::open("s250/s1/s299"),
            Item::graft(GraftType::Footnote, u32::MAX),
            Item::close("s250/s1/s299"),
        ];
        let channel = encode_channel(&items, &mut symbols, true).unwrap();

        // 203 + 2 + 7 + 6 + 7 bytes: a two byte length prefix, an empty payload, two byte
        // symbols and a five byte sequence id...
        assert_eq!(channel.header().byte_len(), 225);
        assert_eq!(channel.header().len(), 5);

        let cursor = Cursor::new(channel.data());
        assert_eq!(
            cursor.items(&symbols).collect::<Result<Vec<_>, _>>().unwrap(),
            items
        );
        assert_eq!(cursor.count_entries().unwrap(), 5);
        assert_eq!(
            cursor.labels(&symbols).collect::<Result<Vec<_>, _>>().unwrap(),
            vec!["s250/s1/s299", "s250/s1/s299"]
        );
        assert_eq!(symbols.len(), 400);
    }

    proptest! {
        #[test]
        fn arbitrary_items_survive_a_round_trip(
            items in prop::collection::vec(arbitrary_item(), 0..40)
        ) {
            let mut symbols = populated_symbols();
            let channel = encode_channel(&items, &mut symbols, true).unwrap();
            prop_assert_eq!(channel.header().byte_len(), channel.data().len());
            prop_assert_eq!(channel.header().len(), items.len());

            let cursor = Cursor::new(channel.data());
            let decoded = cursor.items(&symbols).collect::<Result<Vec<_>, _>>().unwrap();
            prop_assert_eq!(&decoded, &items);
            prop_assert_eq!(cursor.count_entries().unwrap(), items.len());

            let labels = cursor.labels(&symbols).collect::<Result<Vec<_>, _>>().unwrap();
            let expected = items
                .iter()
                .filter_map(|item| item.label().map(|label| label.to_owned()))
                .collect::<Vec<_>>();
            prop_assert_eq!(labels, expected);

            let again = encode_channel(&decoded, &mut symbols, true).unwrap();
            prop_assert_eq!(again.data(), channel.data());
            prop_assert_eq!(again.header(), channel.header());
        }
    }
}
