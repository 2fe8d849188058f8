//! Provides the `SymbolTable` which interns the components of scope labels.
//!
//! Scope labels like `blockTag/p`, `chapter/1` or `verses/16` repeat thousands of times within a
//! single document. Therefore we never store the label text within a channel. Instead each
//! component is put into the symbol table of the document once and only its `Symbol` is
//! written into the packed buffer.
//!
//! The table is append only. While a document is being built, there is a single writer. Once the
//! document is complete, the table is wrapped in an `Arc` and shared (read-only) by all blocks
//! of the document.
use fnv::FnvHashMap;

use crate::error::{SuccinctError, SuccinctResult};

/// Defines the representation of a symbol.
///
/// Symbols start at 1, as 0 is used to terminate the list of components of a scope label
/// within a packed channel.
pub type Symbol = u32;

/// Used to intern and resolve symbols.
#[derive(Clone, Default, Debug)]
pub struct SymbolTable {
    table: FnvHashMap<String, Symbol>,
    symbols: Vec<String>,
}

impl SymbolTable {
    /// Creates a new and empty symbol table.
    ///
    /// # Example
    ///
    /// ```
    /// # use lectio::succinct::symbols::SymbolTable;
    /// let table = SymbolTable::new();
    ///
    /// assert_eq!(table.len(), 0);
    /// ```
    pub fn new() -> Self {
        SymbolTable {
            table: FnvHashMap::default(),
            symbols: Vec::new(),
        }
    }

    /// Tries to find the `Symbol` of the given `string` without creating a new one.
    ///
    /// # Example
    /// ```
    /// # use lectio::succinct::symbols::SymbolTable;
    /// let mut table = SymbolTable::new();
    ///
    /// let symbol = table.intern("chapter").unwrap();
    ///
    /// assert_eq!(table.find("chapter"), Some(symbol));
    /// assert_eq!(table.find("verses"), None);
    /// ```
    pub fn find(&self, string: impl AsRef<str>) -> Option<Symbol> {
        self.table.get(string.as_ref()).copied()
    }

    /// Interns the given `string` and returns its new or existing `Symbol`.
    ///
    /// # Errors
    ///
    /// This will return an error if the symbol table overflows (if there are more than
    /// `u32::MAX - 1` symbols).
    ///
    /// # Example
    /// ```
    /// # use lectio::succinct::symbols::SymbolTable;
    /// let mut table = SymbolTable::new();
    ///
    /// let symbol = table.intern("blockTag").unwrap();
    /// assert_eq!(table.intern("blockTag").unwrap(), symbol);
    /// assert_eq!(symbol, 1);
    /// ```
    pub fn intern(&mut self, string: impl AsRef<str>) -> SuccinctResult<Symbol> {
        let value = string.as_ref();
        if let Some(symbol) = self.table.get(value) {
            Ok(*symbol)
        } else if self.symbols.len() >= (u32::MAX - 1) as usize {
            Err(SuccinctError::SymbolOverflow)
        } else {
            let new_symbol = (self.symbols.len() + 1) as Symbol;

            let _ = self.table.insert(value.to_owned(), new_symbol);
            self.symbols.push(value.to_owned());

            Ok(new_symbol)
        }
    }

    /// Retrieves the string of the given `Symbol`.
    ///
    /// This never fails for symbols which were produced by [intern](SymbolTable::intern) on
    /// the same table. For unknown symbols (including the reserved 0) `None` is returned.
    ///
    /// # Examples
    /// ```
    /// # use lectio::succinct::symbols::SymbolTable;
    /// let mut table = SymbolTable::new();
    ///
    /// let symbol = table.intern("verses").unwrap();
    ///
    /// assert_eq!(table.resolve(symbol), Some("verses"));
    /// assert_eq!(table.resolve(0), None);
    /// assert_eq!(table.resolve(1024), None);
    /// ```
    pub fn resolve(&self, symbol: Symbol) -> Option<&str> {
        if symbol == 0 {
            None
        } else {
            self.symbols
                .get((symbol - 1) as usize)
                .map(|string| string.as_str())
        }
    }

    /// Determines the number of known symbols in the table.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Determines if the symbol table is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Estimates the allocated memory required to represent the symbol table.
    ///
    /// Note that this is only an approximation as the hash table doesn't reveal its true size.
    pub fn allocated_size(&self) -> usize {
        // Internally a bit more than the capacity is allocated to keep a proper load factor...
        let table_size = self.table.capacity() * 11 / 10
            * (std::mem::size_of::<usize>()
                + std::mem::size_of::<String>()
                + std::mem::size_of::<Symbol>());

        let lookup_size = self.symbols.capacity() * std::mem::size_of::<String>();

        // Each string is stored twice, once as key and once in the lookup table...
        let content_size: usize = self.symbols.iter().map(|string| string.len() * 2).sum();

        table_size + lookup_size + content_size
    }
}
