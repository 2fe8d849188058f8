//! Splits a flat stream of items into blocks.
//!
//! A parser emits a document (or a single footnote, heading...) as one flat list of items. Blocks
//! are delimited by scopes whose first label component is one of the configured block tags
//! (`blockTag` by default). For each block the assembler builds its four channels:
//!
//! * everything between the opening and closing block marker goes into **c**,
//! * scopes opened (or placed as point) within the block also go into **is**,
//! * grafts found between two blocks are attached to the next block as **bg**,
//! * scopes which are still open when a block starts make up its **os**.
//!
//! Tokens found between two blocks have no block to live in. These are dropped and counted in
//! the [AssemblyStats].
//!
//! # Example
//!
//! ```
//! # use lectio::succinct::assembler::BlockAssembler;
//! # use lectio::succinct::block::ChannelKind;
//! # use lectio::succinct::item::{GraftType, Item};
//! # use lectio::succinct::symbols::SymbolTable;
//! let mut symbols = SymbolTable::new();
//! let mut assembler = BlockAssembler::default();
//!
//! let blocks = assembler.assemble(&[
//!     Item::open("chapter/1"),
//!     Item::graft(GraftType::Heading, 2),
//!     Item::open("blockTag/p"),
//!     Item::open("verses/1"),
//!     Item::word("In"),
//!     Item::close("blockTag/p"),
//! ], &mut symbols).unwrap();
//!
//! assert_eq!(blocks.len(), 1);
//! let header = blocks[0].header();
//! assert_eq!(header.channel(ChannelKind::Content).len(), 2);
//! assert_eq!(header.channel(ChannelKind::BlockGrafts).len(), 1);
//! assert_eq!(header.channel(ChannelKind::OpenScopes).len(), 1);
//! assert_eq!(header.channel(ChannelKind::IncludedScopes).len(), 1);
//! ```
use crate::config::AssemblerSettings;
use crate::error::{SuccinctError, SuccinctResult};
use crate::succinct::block::{Block, Channel};
use crate::succinct::encoder::{encode_channel, intern_label, ChannelEncoder, LABEL_SEPARATOR};
use crate::succinct::item::{Item, ScopeDirection};
use crate::succinct::symbols::{Symbol, SymbolTable};

/// Counts what the assembler did so far.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct AssemblyStats {
    /// The number of blocks built.
    pub blocks: usize,

    /// The number of items consumed.
    pub items: usize,

    /// The number of tokens (and point scopes) found outside of a block which were dropped.
    pub dropped_items: usize,

    /// The number of trailing grafts which were dropped as no block followed.
    pub dropped_grafts: usize,
}

/// Splits item streams into blocks.
pub struct BlockAssembler {
    block_tags: Vec<String>,
    verify: bool,
    stats: AssemblyStats,
}

/// Represents the block currently being filled.
struct OpenBlock {
    label: String,
    bs: Vec<Symbol>,
    bg: Channel,
    os: Channel,
    content: ChannelEncoder,
    included: ChannelEncoder,
}

impl OpenBlock {
    fn seal(self, verify: bool) -> SuccinctResult<Block> {
        Ok(Block::new(
            self.bs,
            [
                self.content.finish(verify)?,
                self.bg,
                self.os,
                self.included.finish(verify)?,
            ],
        ))
    }
}

impl Default for BlockAssembler {
    fn default() -> Self {
        BlockAssembler::new(&AssemblerSettings::default())
    }
}

impl BlockAssembler {
    /// Creates a new assembler using the given settings.
    pub fn new(settings: &AssemblerSettings) -> Self {
        BlockAssembler {
            block_tags: settings.block_tags.clone(),
            verify: settings.verify_channels,
            stats: AssemblyStats::default(),
        }
    }

    /// Returns the statistics collected across all invocations of [assemble](Self::assemble).
    pub fn stats(&self) -> AssemblyStats {
        self.stats
    }

    /// Determines if the given scope label marks a block boundary.
    ///
    /// # Example
    /// ```
    /// # use lectio::succinct::assembler::BlockAssembler;
    /// let assembler = BlockAssembler::default();
    ///
    /// assert_eq!(assembler.is_block_marker("blockTag/p"), true);
    /// assert_eq!(assembler.is_block_marker("blockTag"), true);
    /// assert_eq!(assembler.is_block_marker("chapter/1"), false);
    /// assert_eq!(assembler.is_block_marker("blockTagged/p"), false);
    /// ```
    pub fn is_block_marker(&self, label: &str) -> bool {
        let first = label.split(LABEL_SEPARATOR).next().unwrap_or_default();
        self.block_tags.iter().any(|tag| tag == first)
    }

    /// Splits the given items into blocks and encodes their channels.
    ///
    /// Scope labels are interned into the given symbol table.
    ///
    /// # Errors
    /// Fails if a scope is closed which isn't open, if a block marker is closed while no block
    /// (or another block) is open, or if the stream ends within a block.
    pub fn assemble<'a>(
        &mut self,
        items: impl IntoIterator<Item = &'a Item>,
        symbols: &mut SymbolTable,
    ) -> SuccinctResult<Vec<Block>> {
        let mut blocks = Vec::new();
        let mut open_scopes: Vec<String> = Vec::new();
        let mut pending_grafts: Vec<Item> = Vec::new();
        let mut current: Option<OpenBlock> = None;
        let mut dropped_items = 0;

        for item in items {
            self.stats.items += 1;
            match item {
                Item::Scope { direction, label } if self.is_block_marker(label) => {
                    match direction {
                        ScopeDirection::Open => {
                            if let Some(block) = current.take() {
                                log::debug!(
                                    "Block '{}' is implicitly closed by '{}'.",
                                    block.label,
                                    label
                                );
                                blocks.push(block.seal(self.verify)?);
                            }

                            current = Some(self.start_block(
                                label,
                                &open_scopes,
                                std::mem::take(&mut pending_grafts),
                                symbols,
                            )?);
                        }
                        ScopeDirection::Close => match current.take() {
                            Some(block) if &block.label == label => {
                                blocks.push(block.seal(self.verify)?)
                            }
                            Some(block) => {
                                return Err(SuccinctError::UnbalancedBlock(format!(
                                    "'{}' is closed while '{}' is open",
                                    label, block.label
                                )))
                            }
                            None => {
                                return Err(SuccinctError::UnbalancedBlock(format!(
                                    "'{}' is closed but no block is open",
                                    label
                                )))
                            }
                        },
                        ScopeDirection::Point => {
                            return Err(SuccinctError::UnbalancedBlock(format!(
                                "the block marker '{}' cannot be used as point",
                                label
                            )))
                        }
                    }
                }
                Item::Scope { direction, label } => {
                    match direction {
                        ScopeDirection::Open => open_scopes.push(label.clone()),
                        ScopeDirection::Close => close_scope(&mut open_scopes, label)?,
                        ScopeDirection::Point => (),
                    }

                    match current.as_mut() {
                        Some(block) => {
                            block.content.push(item, symbols)?;
                            if *direction != ScopeDirection::Close {
                                block.included.push(item, symbols)?;
                            }
                        }
                        None if *direction == ScopeDirection::Point => {
                            log::warn!("Dropping point scope '{}' outside of a block.", label);
                            dropped_items += 1;
                        }
                        None => (),
                    }
                }
                Item::Graft { .. } => match current.as_mut() {
                    Some(block) => block.content.push(item, symbols)?,
                    None => pending_grafts.push(item.clone()),
                },
                Item::Token { chars, .. } => match current.as_mut() {
                    Some(block) => block.content.push(item, symbols)?,
                    None => {
                        log::warn!("Dropping token '{}' outside of a block.", chars);
                        dropped_items += 1;
                    }
                },
            }
        }

        if let Some(block) = current {
            return Err(SuccinctError::UnbalancedBlock(format!(
                "the stream ended within '{}'",
                block.label
            )));
        }

        if !pending_grafts.is_empty() {
            log::warn!(
                "Dropping {} graft(s) after the last block.",
                pending_grafts.len()
            );
            self.stats.dropped_grafts += pending_grafts.len();
        }

        self.stats.blocks += blocks.len();
        self.stats.dropped_items += dropped_items;
        log::debug!(
            "Assembled {} blocks ({} items dropped, {} scopes left open).",
            blocks.len(),
            dropped_items,
            open_scopes.len()
        );

        Ok(blocks)
    }

    fn start_block(
        &self,
        label: &str,
        open_scopes: &[String],
        grafts: Vec<Item>,
        symbols: &mut SymbolTable,
    ) -> SuccinctResult<OpenBlock> {
        let os = open_scopes
            .iter()
            .map(|label| Item::open(label.as_str()))
            .collect::<Vec<_>>();

        Ok(OpenBlock {
            label: label.to_owned(),
            bs: intern_label(label, symbols)?,
            bg: encode_channel(&grafts, symbols, self.verify)?,
            os: encode_channel(&os, symbols, self.verify)?,
            content: ChannelEncoder::new(),
            included: ChannelEncoder::new(),
        })
    }
}

/// Removes the innermost open scope with the given label.
///
/// Scopes aren't required to be closed in the reverse order in which they were opened (a chapter
/// may well end while a verse is still open).
fn close_scope(open_scopes: &mut Vec<String>, label: &str) -> SuccinctResult<()> {
    match open_scopes.iter().rposition(|open| open == label) {
        Some(index) => {
            let _ = open_scopes.remove(index);
            Ok(())
        }
        None => Err(SuccinctError::UnbalancedScope(label.to_owned())),
    }
}
