//! Provides the `DocumentStore` which makes documents available for queries.
//!
//! Documents are built off to the side using a [DocumentBuilder] obtained via
//! [DocumentStore::builder] and then [published](DocumentStore::publish). Publishing swaps the
//! whole map of documents atomically, therefore a reader either sees the previous state or the
//! new one, but never a partially built document. Readers never block, not even while a
//! publication is in progress.
//!
//! Each store generates a [ProcessorId] when it is created. This id is handed to every document
//! built via the store and is checked once the document is published.
//!
//! # Example
//!
//! ```
//! # use std::sync::Arc;
//! # use lectio::config::Config;
//! # use lectio::store::DocumentStore;
//! # use lectio::succinct::item::Item;
//! let store = DocumentStore::new(Arc::new(Config::default()));
//!
//! let mut builder = store.builder("PHM");
//! builder.add_main_sequence(&[
//!     Item::open("blockTag/p"),
//!     Item::word("Paul"),
//!     Item::close("blockTag/p"),
//! ]).unwrap();
//! store.publish(builder.build().unwrap()).unwrap();
//!
//! let result = store.query_blocks("PHM", "cL items { ... on Token { chars } }").unwrap();
//! assert_eq!(result.to_string(), r#"[{"cL":1,"items":[{"chars":"Paul"}]}]"#);
//! assert_eq!(store.num_queries(), 1);
//! ```
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use fnv::FnvHashMap;
use itertools::Itertools;
use serde_json::Value;

use crate::config::Config;
use crate::docs::{Document, DocumentBuilder, ProcessorId};
use crate::error::{SuccinctError, SuccinctResult};
use crate::query::plan::DecodePlan;
use crate::query::unpack::unpack_blocks;

/// Keeps all published documents.
pub struct DocumentStore {
    config: Arc<Config>,
    processor: ProcessorId,
    documents: ArcSwap<FnvHashMap<String, Arc<Document>>>,
    queries: AtomicUsize,
    unpacked_blocks: AtomicUsize,
}

impl DocumentStore {
    /// Creates a new and empty store which uses the given config.
    pub fn new(config: Arc<Config>) -> Self {
        let processor = ProcessorId::generate();
        log::info!(
            "Creating document store '{}' (processor {})...",
            config.current().store.name,
            processor
        );

        DocumentStore {
            config,
            processor,
            documents: ArcSwap::new(Arc::new(FnvHashMap::default())),
            queries: AtomicUsize::new(0),
            unpacked_blocks: AtomicUsize::new(0),
        }
    }

    /// Returns the id of this processor.
    pub fn processor(&self) -> ProcessorId {
        self.processor
    }

    /// Creates a builder for a new document using the current assembler settings.
    pub fn builder(&self, id: impl Into<String>) -> DocumentBuilder {
        DocumentBuilder::new(id, self.processor, &self.config.current().assembler)
    }

    /// Publishes the given document.
    ///
    /// A document with the same id is replaced and returned.
    ///
    /// # Errors
    /// Fails if the document has been built by another processor.
    pub fn publish(&self, document: Document) -> anyhow::Result<Option<Arc<Document>>> {
        if document.processor() != self.processor {
            return Err(anyhow::anyhow!(
                "Cannot publish '{}' as it has been built by processor {} instead of {}.",
                document.id(),
                document.processor(),
                self.processor
            ));
        }

        let id = document.id().to_owned();
        let size = document.allocated_size();
        let document = Arc::new(document);
        let previous = self.documents.rcu(|documents| {
            let mut documents = FnvHashMap::clone(documents);
            let _ = documents.insert(id.clone(), document.clone());
            documents
        });

        log::info!(
            "Published '{}' in '{}' ({} blocks, {} bytes).",
            id,
            self.config.current().store.name,
            document.num_blocks(),
            size
        );

        Ok(previous.get(&id).cloned())
    }

    /// Removes the document with the given id.
    pub fn remove(&self, id: &str) -> Option<Arc<Document>> {
        let previous = self.documents.rcu(|documents| {
            let mut documents = FnvHashMap::clone(documents);
            let _ = documents.remove(id);
            documents
        });

        let removed = previous.get(id).cloned();
        if removed.is_some() {
            log::info!(
                "Removed '{}' from '{}'.",
                id,
                self.config.current().store.name
            );
        }

        removed
    }

    /// Returns the document with the given id.
    pub fn document(&self, id: &str) -> SuccinctResult<Arc<Document>> {
        self.documents
            .load()
            .get(id)
            .cloned()
            .ok_or_else(|| SuccinctError::UnknownDocument(id.to_owned()))
    }

    /// Returns the ids of all documents in ascending order.
    pub fn document_ids(&self) -> Vec<String> {
        self.documents.load().keys().cloned().sorted().collect()
    }

    /// Returns the number of documents.
    pub fn len(&self) -> usize {
        self.documents.load().len()
    }

    /// Determines if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.load().is_empty()
    }

    /// Unpacks the blocks of the main sequence of the given document.
    pub fn query_blocks(&self, id: &str, selection: &str) -> SuccinctResult<Value> {
        let document = self.document(id)?;
        self.execute(&document, document.main_sequence().id(), selection)
    }

    /// Unpacks the blocks of the given sequence of the given document.
    pub fn query_sequence(
        &self,
        id: &str,
        sequence_id: u32,
        selection: &str,
    ) -> SuccinctResult<Value> {
        let document = self.document(id)?;
        self.execute(&document, sequence_id, selection)
    }

    fn execute(
        &self,
        document: &Document,
        sequence_id: u32,
        selection: &str,
    ) -> SuccinctResult<Value> {
        let _ = self.queries.fetch_add(1, Ordering::Relaxed);

        let plan = DecodePlan::parse(selection)?;
        let sequence = document.sequence(sequence_id)?;
        let result = unpack_blocks(sequence.blocks(), document.symbols(), &plan)?;
        let _ = self
            .unpacked_blocks
            .fetch_add(sequence.len(), Ordering::Relaxed);

        Ok(result)
    }

    /// Returns the number of queries which have been executed.
    pub fn num_queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    /// Returns the number of blocks which have been unpacked by successful queries.
    pub fn num_unpacked_blocks(&self) -> usize {
        self.unpacked_blocks.load(Ordering::Relaxed)
    }

    /// Estimates the memory occupied by all documents.
    pub fn allocated_size(&self) -> usize {
        self.documents
            .load()
            .values()
            .map(|document| document.allocated_size())
            .sum()
    }
}
