//! Provides the succinct block codec.
//!
//! A structured document (think of a bible with its paragraphs, verses, footnotes and cross
//! references) is a long stream of items. Representing each of them as an object quickly
//! consumes gigabytes of memory for a whole collection of translations. Therefore the stream is
//! split into [blocks](block::Block) (usually paragraphs) and each block stores its items in
//! packed byte buffers called channels.
//!
//! An [Item](item::Item) is either a **token**, a **scope** or a **graft**. Within a channel each
//! item is stored as a single tag byte followed by a small payload (see [encoder]). Scope labels
//! like `chapter/1` are split into their components which are put into the
//! [SymbolTable](symbols::SymbolTable) of the document, so that only small integers end up in the
//! buffers.
//!
//! For each channel, the byte length and the number of items are recorded in the
//! [BlockHeader](block::BlockHeader) when the block is built. Questions like "how many scopes are
//! opened in this block" can therefore be answered without decoding anything.
//!
//! The [decoder] on the other hand works lazily. A caller which only wants the labels of the
//! scopes of a channel will skip over all tokens and grafts without ever looking at their payload.
//!
//! # Building blocks
//! Blocks are not built by hand. The [BlockAssembler](assembler::BlockAssembler) receives the
//! flat item stream of a parser and decides which item goes into which channel of which block.
//!
//! # Immutability
//! A block is built once and never modified afterwards. All
//! buffers are `bytes::Bytes` and the symbol table is shared as `Arc<SymbolTable>` by all blocks of
//! a document. Therefore decoding needs neither locks nor copies and can happen on any number of
//! threads at the same time.
pub mod assembler;
pub mod block;
pub mod decoder;
pub mod encoder;
pub mod item;
pub mod symbols;
pub mod varint;
