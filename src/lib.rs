//! Lectio stores structured scripture documents as blocks of succinctly packed items.
//!
//! # Introduction
//! A bible is a surprisingly dense document. Next to the actual text there are chapters, verses,
//! paragraphs, poetry indentation, words of Jesus, footnotes, cross references, headings and much
//! more. Keeping a whole collection of translations in memory as a tree of objects therefore
//! quickly consumes more memory than the text itself by an order of magnitude.
//!
//! **Lectio** instead splits each document into blocks (usually paragraphs) and stores the
//! content of each block in a few packed byte buffers. Aggregate numbers (how many bytes, how
//! many items) are recorded in a header when a block is built, so that they can be answered
//! without decoding anything. Everything else is decoded on demand, driven by the fields a caller
//! actually asks for.
//!
//! # Modules
//! * **succinct**: The codec itself. Contains the item model, the [symbol table](succinct::symbols),
//!   the [encoder](succinct::encoder), the lazy [decoder](succinct::decoder) and the
//!   [assembler](succinct::assembler) which splits a flat item stream into blocks.
//! * **docs**: Documents and their sequences (the main text, footnotes, headings...).
//! * **store**: A [DocumentStore](store::DocumentStore) which publishes documents atomically and
//!   answers queries against them.
//! * **query**: Parses GraphQL-like field selections, compiles them into a
//!   [DecodePlan](query::plan::DecodePlan) and renders the unpacked blocks as JSON.
//! * **config**: The settings of the assembler and the store, loaded from YAML.
//!
//! # Example
//! ```
//! # use std::sync::Arc;
//! # use lectio::config::Config;
//! # use lectio::store::DocumentStore;
//! # use lectio::succinct::item::{Item, TokenType};
//! lectio::init_logging();
//!
//! let store = DocumentStore::new(Arc::new(Config::default()));
//! let mut builder = store.builder("JHN");
//! builder.header("bookCode", "JHN");
//! builder.add_main_sequence(&[
//!     Item::open("chapter/1"),
//!     Item::open("blockTag/p"),
//!     Item::open("verses/1"),
//!     Item::word("In"),
//!     Item::token(TokenType::LineSpace, " "),
//!     Item::word("the"),
//!     Item::close("blockTag/p"),
//! ]).unwrap();
//! store.publish(builder.build().unwrap()).unwrap();
//!
//! let result = store.query_blocks("JHN", "cBL cL osL isL bs { label }").unwrap();
//! assert_eq!(
//!     result.to_string(),
//!     r#"[{"cBL":16,"cL":4,"osL":1,"isL":1,"bs":{"label":"blockTag/p"}}]"#
//! );
//! ```
#![deny(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces
)]
use simplelog::{format_description, ConfigBuilder, LevelFilter, SimpleLogger};
use std::sync::Once;

pub mod config;
pub mod docs;
pub mod error;
pub mod query;
pub mod store;
pub mod succinct;

/// Contains the version of the Lectio library.
pub const LECTIO_VERSION: &str = "DEVELOPMENT-SNAPSHOT";

/// Initializes the logging system.
///
/// This can safely be called several times, only the first invocation installs the logger.
pub fn init_logging() {
    static INIT_LOGGING: Once = Once::new();

    // We need to do this as otherwise tests might crash as the logging system is initialized
    // several times...
    INIT_LOGGING.call_once(|| {
        if let Err(error) = SimpleLogger::init(
            LevelFilter::Debug,
            ConfigBuilder::new()
                .set_time_format_custom(format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]"
                ))
                .set_thread_level(LevelFilter::Trace)
                .set_target_level(LevelFilter::Error)
                .set_location_level(LevelFilter::Trace)
                .build(),
        ) {
            eprintln!("Failed to initialize logging system: {}", error);
        }
    });
}
