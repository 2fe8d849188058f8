//! Defines the items stored in the channels of a block.
//!
//! An [Item] is either a **token** (a word, punctuation or whitespace), a **scope** (a structural
//! marker like `chapter/1` which is opened, closed or placed as point) or a **graft** (a reference
//! to another sequence like a footnote or heading).
//!
//! Within a packed channel, each item starts with a single tag byte. Its upper two bits contain the
//! [ItemType] and the lower six bits the sub type (for tokens and grafts) or the direction (for
//! scopes). All codes are stable, as they are part of the binary layout.
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::error::DecodeFailure;

/// Enumerates the kinds of items.
#[derive(FromPrimitive, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ItemType {
    /// Leaf content.
    Token = 0,
    /// A structural marker.
    Scope = 1,
    /// A reference to another sequence.
    Graft = 2,
}

/// Enumerates the kinds of tokens.
#[derive(FromPrimitive, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenType {
    /// A word or number.
    WordLike = 0,
    /// A punctuation character.
    Punctuation = 1,
    /// A run of horizontal whitespace.
    LineSpace = 2,
    /// A line break within the source.
    Eol = 3,
    /// An optional line break.
    SoftLineBreak = 4,
    /// A space which must not be used to break lines.
    NoBreakSpace = 5,
    /// A solitary slash.
    BareSlash = 6,
    /// Anything the tokenizer couldn't classify.
    Unknown = 7,
}

/// Enumerates the directions of a scope.
#[derive(FromPrimitive, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ScopeDirection {
    /// The scope starts here.
    Open = 0,
    /// The scope ends here.
    Close = 1,
    /// The scope has no extent (a milestone).
    Point = 2,
}

/// Enumerates the kinds of grafts.
#[derive(FromPrimitive, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GraftType {
    /// A book title.
    Title = 0,
    /// A title at the end of a book.
    EndTitle = 1,
    /// A section heading.
    Heading = 2,
    /// An introduction.
    Introduction = 3,
    /// The title of an introduction.
    IntroTitle = 4,
    /// A title at the end of an introduction.
    IntroEndTitle = 5,
    /// A footnote.
    Footnote = 6,
    /// A cross reference.
    Xref = 7,
    /// The caller of a note.
    NoteCaller = 8,
    /// A sidebar.
    Sidebar = 9,
    /// A figure.
    Figure = 10,
    /// An editorial remark.
    Remark = 11,
}

/// Represents a single item of a channel.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Item {
    /// Leaf content.
    Token {
        /// The kind of token.
        sub_type: TokenType,
        /// The actual text.
        chars: String,
    },
    /// A structural marker with a slash-delimited label.
    Scope {
        /// Determines if the scope is opened, closed or placed as point.
        direction: ScopeDirection,
        /// The label like `chapter/1`.
        label: String,
    },
    /// A reference to another sequence.
    Graft {
        /// The kind of graft.
        sub_type: GraftType,
        /// The id of the referenced sequence.
        sequence_id: u32,
    },
}

/// Contains the number of bits within the tag byte which are used for the sub type.
const SUB_TYPE_BITS: u8 = 6;

/// Masks the sub type within a tag byte.
const SUB_TYPE_MASK: u8 = (1 << SUB_TYPE_BITS) - 1;

/// Combines the given item type and sub type code into a tag byte.
pub fn tag(item_type: ItemType, code: u8) -> u8 {
    ((item_type as u8) << SUB_TYPE_BITS) | (code & SUB_TYPE_MASK)
}

/// Splits a tag byte into its item type and sub type code.
///
/// # Example
/// ```
/// # use lectio::succinct::item::{split_tag, tag, ItemType};
/// let tag_byte = tag(ItemType::Graft, 6);
///
/// assert_eq!(split_tag(tag_byte).unwrap(), (ItemType::Graft, 6));
/// assert!(split_tag(0xC0).is_err());
/// ```
pub fn split_tag(tag: u8) -> Result<(ItemType, u8), DecodeFailure> {
    let item_type =
        ItemType::from_u8(tag >> SUB_TYPE_BITS).ok_or(DecodeFailure::UnknownTag(tag))?;

    Ok((item_type, tag & SUB_TYPE_MASK))
}

macro_rules! external_names {
    ($enum:ident { $($variant:ident => $name:literal),* $(,)? }) => {
        impl $enum {
            /// Returns the name used by the query layer for this constant.
            pub fn name(&self) -> &'static str {
                match self {
                    $($enum::$variant => $name),*
                }
            }

            /// Parses the name used by the query layer back into a constant.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some($enum::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

external_names!(ItemType {
    Token => "token",
    Scope => "scope",
    Graft => "graft",
});

external_names!(TokenType {
    WordLike => "wordLike",
    Punctuation => "punctuation",
    LineSpace => "lineSpace",
    Eol => "eol",
    SoftLineBreak => "softLineBreak",
    NoBreakSpace => "noBreakSpace",
    BareSlash => "bareSlash",
    Unknown => "unknown",
});

external_names!(ScopeDirection {
    Open => "start",
    Close => "end",
    Point => "point",
});

external_names!(GraftType {
    Title => "title",
    EndTitle => "endTitle",
    Heading => "heading",
    Introduction => "introduction",
    IntroTitle => "introTitle",
    IntroEndTitle => "introEndTitle",
    Footnote => "footnote",
    Xref => "xref",
    NoteCaller => "noteCaller",
    Sidebar => "sidebar",
    Figure => "fig",
    Remark => "remark",
});

impl Item {
    /// Creates a new token.
    pub fn token(sub_type: TokenType, chars: impl Into<String>) -> Self {
        Item::Token {
            sub_type,
            chars: chars.into(),
        }
    }

    /// Creates a word-like token.
    pub fn word(chars: impl Into<String>) -> Self {
        Item::token(TokenType::WordLike, chars)
    }

    /// Creates a scope which is opened.
    pub fn open(label: impl Into<String>) -> Self {
        Item::Scope {
            direction: ScopeDirection::Open,
            label: label.into(),
        }
    }

    /// Creates a scope which is closed.
    pub fn close(label: impl Into<String>) -> Self {
        Item::Scope {
            direction: ScopeDirection::Close,
            label: label.into(),
        }
    }

    /// Creates a point scope.
    pub fn point(label: impl Into<String>) -> Self {
        Item::Scope {
            direction: ScopeDirection::Point,
            label: label.into(),
        }
    }

    /// Creates a graft pointing to the given sequence.
    pub fn graft(sub_type: GraftType, sequence_id: u32) -> Self {
        Item::Graft {
            sub_type,
            sequence_id,
        }
    }

    /// Returns the kind of this item.
    pub fn item_type(&self) -> ItemType {
        match self {
            Item::Token { .. } => ItemType::Token,
            Item::Scope { .. } => ItemType::Scope,
            Item::Graft { .. } => ItemType::Graft,
        }
    }

    /// Returns the label if this item is a scope.
    pub fn label(&self) -> Option<&str> {
        match self {
            Item::Scope { label, .. } => Some(label.as_str()),
            _ => None,
        }
    }

    /// Returns the text if this item is a token.
    pub fn chars(&self) -> Option<&str> {
        match self {
            Item::Token { chars, .. } => Some(chars.as_str()),
            _ => None,
        }
    }

    /// Returns the referenced sequence if this item is a graft.
    pub fn sequence_id(&self) -> Option<u32> {
        match self {
            Item::Graft { sequence_id, .. } => Some(*sequence_id),
            _ => None,
        }
    }

    /// Returns the name of the sub type (or direction for scopes).
    ///
    /// # Example
    /// ```
    /// # use lectio::succinct::item::{GraftType, Item};
    /// assert_eq!(Item::word("Jesus").sub_type_name(), "wordLike");
    /// assert_eq!(Item::open("chapter/1").sub_type_name(), "start");
    /// assert_eq!(Item::graft(GraftType::Footnote, 3).sub_type_name(), "footnote");
    /// ```
    pub fn sub_type_name(&self) -> &'static str {
        match self {
            Item::Token { sub_type, .. } => sub_type.name(),
            Item::Scope { direction, .. } => direction.name(),
            Item::Graft { sub_type, .. } => sub_type.name(),
        }
    }

    /// Computes the tag byte used to store this item.
    pub fn tag(&self) -> u8 {
        match self {
            Item::Token { sub_type, .. } => tag(ItemType::Token, *sub_type as u8),
            Item::Scope { direction, .. } => tag(ItemType::Scope, *direction as u8),
            Item::Graft { sub_type, .. } => tag(ItemType::Graft, *sub_type as u8),
        }
    }
}

#[cfg(test)]
mod tests {
    use num_traits::FromPrimitive;

    use crate::error::DecodeFailure;
    use crate::succinct::item::{
        split_tag, tag, GraftType, Item, ItemType, ScopeDirection, TokenType,
    };

    #[test]
    fn tags_survive_splitting() {
        for code in 0..8 {
            let token_type = TokenType::from_u8(code).unwrap();
            let item = Item::token(token_type, "x");
            assert_eq!(split_tag(item.tag()).unwrap(), (ItemType::Token, code));
        }
        for code in 0..12 {
            let graft_type = GraftType::from_u8(code).unwrap();
            let item = Item::graft(graft_type, 1);
            assert_eq!(split_tag(item.tag()).unwrap(), (ItemType::Graft, code));
        }
        assert_eq!(
            split_tag(Item::close("chapter/1").tag()).unwrap(),
            (ItemType::Scope, ScopeDirection::Close as u8)
        );
    }

    #[test]
    fn reserved_item_kind_is_rejected() {
        assert_eq!(split_tag(0xC1), Err(DecodeFailure::UnknownTag(0xC1)));
        assert_eq!(tag(ItemType::Scope, 2), 0x42);
    }

    #[test]
    fn names_are_symmetric() {
        for code in 0..12 {
            let graft_type = GraftType::from_u8(code).unwrap();
            assert_eq!(GraftType::from_name(graft_type.name()), Some(graft_type));
        }
        assert_eq!(TokenType::from_name("wordLike"), Some(TokenType::WordLike));
        assert_eq!(ItemType::from_name("scope"), Some(ItemType::Scope));
        assert_eq!(ItemType::from_name("block"), None);
    }

    #[test]
    fn accessors_only_yield_values_for_matching_variants() {
        let token = Item::word("Paul");
        let scope = Item::open("chapter/1");
        let graft = Item::graft(GraftType::Xref, 7);

        assert_eq!(token.chars(), Some("Paul"));
        assert_eq!(scope.chars(), None);
        assert_eq!(scope.label(), Some("chapter/1"));
        assert_eq!(graft.label(), None);
        assert_eq!(graft.sequence_id(), Some(7));
        assert_eq!(token.sequence_id(), None);
        assert_eq!(graft.item_type(), ItemType::Graft);
    }
}
