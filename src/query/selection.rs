//! Parses field selections.
//!
//! A selection uses a GraphQL like syntax: a list of field names, each of which may carry a
//! nested selection in curly braces. Type specific fields are selected using inline fragments:
//!
//! ```text
//! cBL isL bs { label } is { label }
//! items {
//!     itemType
//!     ... on Token { chars }
//!     ... on Graft { subType sequenceId }
//! }
//! ```
//!
//! Commas are treated as whitespace and `#` starts a comment which runs until the end of the
//! line. The whole selection may optionally be wrapped in curly braces.
//!
//! Note that parsing only checks the syntax. Whether the selected fields actually exist is
//! determined when compiling a [DecodePlan](crate::query::plan::DecodePlan).
use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{SuccinctError, SuccinctResult};

/// Represents a parsed field selection.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Selection {
    entries: Vec<Selected>,
}

/// Represents a single entry of a selection.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Selected {
    /// A plain field with an optional nested selection.
    Field {
        /// The name of the field.
        name: String,
        /// The nested selection, if one was given.
        selection: Option<Selection>,
    },

    /// An inline fragment which only applies to the given type.
    Fragment {
        /// The name of the type, like `Token`.
        type_name: String,
        /// The fields to select for items of this type.
        selection: Selection,
    },
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Token {
    Name(String),
    Open,
    Close,
    Spread,
}

/// Limits the nesting of selections.
const MAX_DEPTH: usize = 16;

impl Selection {
    /// Parses the given selection.
    ///
    /// # Errors
    /// Fails with [SuccinctError::InvalidSelection] if the input isn't well formed.
    ///
    /// # Example
    /// ```
    /// # use lectio::query::selection::{Selected, Selection};
    /// let selection = Selection::parse("cL bs { label }").unwrap();
    ///
    /// assert_eq!(selection.len(), 2);
    /// assert_eq!(selection.field_names(), vec!["cL", "bs"]);
    /// assert!(Selection::parse("bs { label").is_err());
    /// ```
    pub fn parse(input: &str) -> SuccinctResult<Selection> {
        let tokens = tokenize(input)?;
        let mut parser = Parser { tokens, pos: 0 };

        let selection = if parser.peek() == Some(&Token::Open) {
            parser.pos += 1;
            parser.parse_selection(true, 1)?
        } else {
            parser.parse_selection(false, 0)?
        };

        if let Some(token) = parser.peek() {
            return Err(SuccinctError::InvalidSelection(format!(
                "unexpected {:?} after the end of the selection",
                token
            )));
        }
        if selection.is_empty() {
            return Err(SuccinctError::InvalidSelection(
                "the selection is empty".to_owned(),
            ));
        }

        Ok(selection)
    }

    /// Returns the entries of this selection in their given order.
    pub fn entries(&self) -> &[Selected] {
        &self.entries
    }

    /// Returns the names of all plain fields (ignoring fragments).
    pub fn field_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Selected::Field { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Determines if the selection is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn tokenize(input: &str) -> SuccinctResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<CharIndices> = input.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        match ch {
            '{' => tokens.push(Token::Open),
            '}' => tokens.push(Token::Close),
            ',' => (),
            '#' => {
                for (_, ch) in chars.by_ref() {
                    if ch == '\n' {
                        break;
                    }
                }
            }
            '.' => {
                if chars.next_if(|(_, ch)| *ch == '.').is_none()
                    || chars.next_if(|(_, ch)| *ch == '.').is_none()
                {
                    return Err(SuccinctError::InvalidSelection(format!(
                        "expected '...' at position {}",
                        index
                    )));
                }
                tokens.push(Token::Spread);
            }
            ch if ch.is_whitespace() => (),
            ch if ch.is_ascii_alphabetic() || ch == '_' => {
                let mut name = String::new();
                name.push(ch);
                while let Some((_, ch)) =
                    chars.next_if(|(_, ch)| ch.is_ascii_alphanumeric() || *ch == '_')
                {
                    name.push(ch);
                }
                tokens.push(Token::Name(name));
            }
            _ => {
                return Err(SuccinctError::InvalidSelection(format!(
                    "unexpected character '{}' at position {}",
                    ch, index
                )))
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }

        token
    }

    fn expect_name(&mut self, context: &str) -> SuccinctResult<String> {
        match self.advance() {
            Some(Token::Name(name)) => Ok(name),
            other => Err(SuccinctError::InvalidSelection(format!(
                "expected a name {} but found {:?}",
                context, other
            ))),
        }
    }

    fn parse_selection(&mut self, nested: bool, depth: usize) -> SuccinctResult<Selection> {
        if depth > MAX_DEPTH {
            return Err(SuccinctError::InvalidSelection(
                "the selection is nested too deeply".to_owned(),
            ));
        }

        let mut entries = Vec::new();
        loop {
            match self.advance() {
                Some(Token::Name(name)) => {
                    let selection = if self.peek() == Some(&Token::Open) {
                        self.pos += 1;
                        Some(self.parse_nested(depth + 1, &name)?)
                    } else {
                        None
                    };
                    entries.push(Selected::Field { name, selection });
                }
                Some(Token::Spread) => {
                    let on = self.expect_name("after '...'")?;
                    if on != "on" {
                        return Err(SuccinctError::InvalidSelection(format!(
                            "expected 'on' after '...' but found '{}'",
                            on
                        )));
                    }
                    let type_name = self.expect_name("after '... on'")?;
                    if self.advance() != Some(Token::Open) {
                        return Err(SuccinctError::InvalidSelection(format!(
                            "expected '{{' after '... on {}'",
                            type_name
                        )));
                    }
                    let selection = self.parse_nested(depth + 1, &type_name)?;
                    entries.push(Selected::Fragment {
                        type_name,
                        selection,
                    });
                }
                Some(Token::Close) if nested => return Ok(Selection { entries }),
                Some(Token::Close) => {
                    return Err(SuccinctError::InvalidSelection(
                        "unbalanced '}'".to_owned(),
                    ))
                }
                Some(Token::Open) => {
                    return Err(SuccinctError::InvalidSelection(
                        "unexpected '{' without a field name".to_owned(),
                    ))
                }
                None if nested => {
                    return Err(SuccinctError::InvalidSelection(
                        "missing '}' at the end of the selection".to_owned(),
                    ))
                }
                None => return Ok(Selection { entries }),
            }
        }
    }

    fn parse_nested(&mut self, depth: usize, owner: &str) -> SuccinctResult<Selection> {
        let selection = self.parse_selection(true, depth)?;
        if selection.is_empty() {
            return Err(SuccinctError::InvalidSelection(format!(
                "the selection of '{}' is empty",
                owner
            )));
        }

        Ok(selection)
    }
}
