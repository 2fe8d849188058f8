//! Contains documents and their sequences.
//!
//! A [Document] is a parsed book (or any other structured text). It consists of several
//! [sequences](Sequence): the **main** sequence carries the body of the text, all others carry
//! the content referenced via grafts (footnotes, headings, titles...). Each sequence is a list
//! of [blocks](crate::succinct::block::Block).
//!
//! All blocks of a document share a single [SymbolTable]. A document is created once using a
//! [DocumentBuilder] and then never modified. It can therefore be shared between threads
//! without any locking.
//!
//! # Example
//!
//! ```
//! # use lectio::config::AssemblerSettings;
//! # use lectio::docs::{DocumentBuilder, ProcessorId};
//! # use lectio::succinct::item::{GraftType, Item};
//! let mut builder = DocumentBuilder::new("GEN", ProcessorId::generate(), &AssemblerSettings::default());
//! builder.header("bookCode", "GEN");
//!
//! let heading = builder.add_sequence("heading", &[
//!     Item::open("blockTag/s"),
//!     Item::word("Creation"),
//!     Item::close("blockTag/s"),
//! ]).unwrap();
//!
//! builder.add_main_sequence(&[
//!     Item::graft(GraftType::Heading, heading),
//!     Item::open("blockTag/p"),
//!     Item::word("In"),
//!     Item::close("blockTag/p"),
//! ]).unwrap();
//!
//! let document = builder.build().unwrap();
//! assert_eq!(document.header("bookCode"), Some("GEN"));
//! assert_eq!(document.main_sequence().len(), 1);
//! assert_eq!(document.sequence(heading).unwrap().kind(), "heading");
//! ```
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use anyhow::Context;
use fnv::FnvHashMap;
use itertools::Itertools;

use crate::config::AssemblerSettings;
use crate::error::{SuccinctError, SuccinctResult};
use crate::succinct::assembler::{AssemblyStats, BlockAssembler};
use crate::succinct::block::Block;
use crate::succinct::item::Item;
use crate::succinct::symbols::SymbolTable;

/// Contains the kind of the main sequence of a document.
pub const MAIN_SEQUENCE: &str = "main";

/// Identifies the processor (the [DocumentStore](crate::store::DocumentStore)) which built a
/// document.
///
/// Ids of documents and sequences are only meaningful within a single processor.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProcessorId(uuid::Uuid);

impl ProcessorId {
    /// Generates a new random processor id.
    pub fn generate() -> Self {
        ProcessorId(uuid::Uuid::new_v4())
    }
}

impl Display for ProcessorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents an ordered list of blocks.
pub struct Sequence {
    id: u32,
    kind: String,
    blocks: Vec<Block>,
}

impl Sequence {
    /// Returns the id of this sequence which is used by grafts to reference it.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the kind of this sequence, like `main`, `footnote` or `heading`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns all blocks in document order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the block at the given index.
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Returns the number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Determines if there are no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Represents a complete and immutable document.
pub struct Document {
    id: String,
    processor: ProcessorId,
    headers: FnvHashMap<String, String>,
    symbols: Arc<SymbolTable>,
    sequences: FnvHashMap<u32, Sequence>,
    main_id: u32,
}

impl Document {
    /// Returns the id of this document.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the id of the processor which built this document.
    pub fn processor(&self) -> ProcessorId {
        self.processor
    }

    /// Returns the value of the given header (e.g. `bookCode`).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|value| value.as_str())
    }

    /// Returns all headers sorted by their name.
    pub fn headers(&self) -> Vec<(&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .sorted()
            .collect()
    }

    /// Returns the symbol table shared by all blocks of this document.
    pub fn symbols(&self) -> &Arc<SymbolTable> {
        &self.symbols
    }

    /// Returns the main sequence.
    pub fn main_sequence(&self) -> &Sequence {
        // The builder guarantees that the main sequence is present...
        &self.sequences[&self.main_id]
    }

    /// Returns the sequence with the given id.
    pub fn sequence(&self, id: u32) -> SuccinctResult<&Sequence> {
        self.sequences
            .get(&id)
            .ok_or(SuccinctError::UnknownSequence(id))
    }

    /// Returns the ids of all sequences in ascending order.
    pub fn sequence_ids(&self) -> Vec<u32> {
        self.sequences.keys().copied().sorted().collect()
    }

    /// Returns the total number of blocks in all sequences.
    pub fn num_blocks(&self) -> usize {
        self.sequences.values().map(|sequence| sequence.len()).sum()
    }

    /// Estimates the memory occupied by this document.
    pub fn allocated_size(&self) -> usize {
        self.symbols.allocated_size()
            + self
                .sequences
                .values()
                .flat_map(|sequence| sequence.blocks.iter())
                .map(|block| block.allocated_size())
                .sum::<usize>()
    }
}

/// Builds a [Document] out of the flat item streams of its sequences.
pub struct DocumentBuilder {
    id: String,
    processor: ProcessorId,
    headers: FnvHashMap<String, String>,
    symbols: SymbolTable,
    assembler: BlockAssembler,
    sequences: FnvHashMap<u32, Sequence>,
    main_id: Option<u32>,
}

impl DocumentBuilder {
    /// Creates a new builder for the document with the given id.
    pub fn new(id: impl Into<String>, processor: ProcessorId, settings: &AssemblerSettings) -> Self {
        DocumentBuilder {
            id: id.into(),
            processor,
            headers: FnvHashMap::default(),
            symbols: SymbolTable::new(),
            assembler: BlockAssembler::new(settings),
            sequences: FnvHashMap::default(),
            main_id: None,
        }
    }

    /// Stores a header value like the `bookCode`.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let _ = self.headers.insert(name.into(), value.into());
    }

    /// Returns the id which will be assigned to the next sequence added via
    /// [add_sequence](Self::add_sequence).
    ///
    /// Returns `None` once a sequence uses the largest possible id.
    pub fn next_sequence_id(&self) -> Option<u32> {
        match self.sequences.keys().max() {
            Some(id) => id.checked_add(1),
            None => Some(1),
        }
    }

    /// Assembles the given items into the main sequence of the document.
    ///
    /// Returns the id of the new sequence.
    pub fn add_main_sequence(&mut self, items: &[Item]) -> anyhow::Result<u32> {
        if let Some(id) = self.main_id {
            return Err(anyhow::anyhow!(
                "The document '{}' already has a main sequence ({}).",
                self.id,
                id
            ));
        }

        let id = self.add_sequence(MAIN_SEQUENCE, items)?;
        self.main_id = Some(id);

        Ok(id)
    }

    /// Assembles the given items into a new sequence and returns its id.
    pub fn add_sequence(&mut self, kind: &str, items: &[Item]) -> anyhow::Result<u32> {
        let id = self.next_sequence_id().ok_or_else(|| {
            anyhow::anyhow!(
                "The document '{}' has no sequence id left for a {} sequence.",
                self.id,
                kind
            )
        })?;
        self.insert_sequence(id, kind, items)?;

        Ok(id)
    }

    /// Assembles the given items into a sequence with the given id.
    ///
    /// This can be used if grafts in an already parsed stream carry fixed sequence ids.
    pub fn insert_sequence(&mut self, id: u32, kind: &str, items: &[Item]) -> anyhow::Result<()> {
        if self.sequences.contains_key(&id) {
            return Err(anyhow::anyhow!(
                "The document '{}' already contains a sequence with id {}.",
                self.id,
                id
            ));
        }

        let blocks = self
            .assembler
            .assemble(items, &mut self.symbols)
            .with_context(|| {
                format!(
                    "Failed to assemble the {} sequence {} of '{}'",
                    kind, id, self.id
                )
            })?;

        log::debug!(
            "Assembled the {} sequence {} of '{}' into {} blocks.",
            kind,
            id,
            self.id,
            blocks.len()
        );

        let _ = self.sequences.insert(
            id,
            Sequence {
                id,
                kind: kind.to_owned(),
                blocks,
            },
        );

        Ok(())
    }

    /// Returns the statistics of the underlying assembler.
    pub fn stats(&self) -> AssemblyStats {
        self.assembler.stats()
    }

    /// Turns the builder into an immutable document.
    ///
    /// # Errors
    /// Fails if no main sequence has been added.
    pub fn build(self) -> anyhow::Result<Document> {
        let main_id = self.main_id.ok_or_else(|| {
            anyhow::anyhow!("The document '{}' has no main sequence.", self.id)
        })?;

        let stats = self.assembler.stats();
        if stats.dropped_items > 0 || stats.dropped_grafts > 0 {
            log::warn!(
                "Dropped {} items and {} grafts outside of blocks while building '{}'.",
                stats.dropped_items,
                stats.dropped_grafts,
                self.id
            );
        }

        Ok(Document {
            id: self.id,
            processor: self.processor,
            headers: self.headers,
            symbols: Arc::new(self.symbols),
            sequences: self.sequences,
            main_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AssemblerSettings;
    use crate::docs::{DocumentBuilder, ProcessorId, MAIN_SEQUENCE};
    use crate::error::SuccinctError;
    use crate::succinct::block::ChannelKind;
    use crate::succinct::item::{GraftType, Item};

    fn paragraph(text: &str) -> Vec<Item> {
        vec![
            Item::open("blockTag/p"),
            Item::word(text),
            Item::close("blockTag/p"),
        ]
    }

    #[test]
    fn sequences_get_ascending_ids() {
        let mut builder =
            DocumentBuilder::new("MRK", ProcessorId::generate(), &AssemblerSettings::default());

        assert_eq!(builder.next_sequence_id(), Some(1));
        let footnote = builder.add_sequence("footnote", &paragraph("note")).unwrap();
        let mut main = paragraph("text");
        main.insert(2, Item::graft(GraftType::Footnote, footnote));
        let main_id = builder.add_main_sequence(&main).unwrap();

        assert_eq!(footnote, 1);
        assert_eq!(main_id, 2);
        assert!(builder.add_main_sequence(&main).is_err());

        let document = builder.build().unwrap();
        assert_eq!(document.sequence_ids(), vec![1, 2]);
        assert_eq!(document.main_sequence().id(), 2);
        assert_eq!(document.main_sequence().kind(), MAIN_SEQUENCE);
        assert_eq!(document.num_blocks(), 2);
        assert_eq!(
            document
                .main_sequence()
                .block(0)
                .unwrap()
                .header()
                .channel(ChannelKind::Content)
                .len(),
            2
        );
        assert!(matches!(
            document.sequence(99),
            Err(SuccinctError::UnknownSequence(99))
        ));
    }

    #[test]
    fn fixed_sequence_ids_must_be_unique() {
        let mut builder =
            DocumentBuilder::new("MRK", ProcessorId::generate(), &AssemblerSettings::default());

        builder
            .insert_sequence(300, "xref", &paragraph("see"))
            .unwrap();
        assert!(builder
            .insert_sequence(300, "xref", &paragraph("again"))
            .is_err());
        assert_eq!(builder.next_sequence_id(), Some(301));
    }

    #[test]
    fn exhausted_sequence_ids_are_reported() {
        let mut builder =
            DocumentBuilder::new("MRK", ProcessorId::generate(), &AssemblerSettings::default());

        builder
            .insert_sequence(u32::MAX, "footnote", &paragraph("last"))
            .unwrap();
        assert_eq!(builder.next_sequence_id(), None);
        assert!(builder.add_sequence("xref", &paragraph("see")).is_err());
        assert!(builder.add_main_sequence(&paragraph("text")).is_err());
    }

    #[test]
    fn documents_require_a_main_sequence() {
        let mut builder =
            DocumentBuilder::new("MRK", ProcessorId::generate(), &AssemblerSettings::default());
        builder.add_sequence("footnote", &paragraph("x")).unwrap();

        assert!(builder.build().is_err());
    }

    #[test]
    fn assembly_errors_carry_context() {
        let mut builder =
            DocumentBuilder::new("MRK", ProcessorId::generate(), &AssemblerSettings::default());
        let error = builder
            .add_main_sequence(&[Item::close("chapter/1")])
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Failed to assemble the main sequence 1 of 'MRK'"
        );
        assert!(matches!(
            error.downcast_ref::<SuccinctError>(),
            Some(SuccinctError::UnbalancedScope(_))
        ));
    }

    #[test]
    fn headers_and_sizes_are_reported() {
        let processor = ProcessorId::generate();
        let mut builder = DocumentBuilder::new("JHN", processor, &AssemblerSettings::default());
        builder.header("bookCode", "JHN");
        builder.header("id", "JHN eng_web");
        builder.add_main_sequence(&paragraph("Word")).unwrap();

        let document = builder.build().unwrap();
        assert_eq!(document.id(), "JHN");
        assert_eq!(document.processor(), processor);
        assert_eq!(
            document.headers(),
            vec![("bookCode", "JHN"), ("id", "JHN eng_web")]
        );
        assert_eq!(document.header("language"), None);
        assert_eq!(document.allocated_size() > 0, true);
        assert_eq!(document.symbols().len(), 2);
    }
}
