//! Compiles a [Selection] into a [DecodePlan].
//!
//! The plan determines up front which parts of a block have to be touched to answer a
//! selection: length fields and the block scope are read from the header, item lists decode
//! exactly their channel and nothing else. Unknown fields are reported here, before any buffer is
//! read.
//!
//! A plan is compiled once and can then be executed against any number of blocks.
use itertools::Itertools;

use crate::error::{SuccinctError, SuccinctResult};
use crate::query::selection::{Selected, Selection};
use crate::succinct::block::ChannelKind;
use crate::succinct::item::ItemType;

/// Enumerates the fields which can be selected for an item.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ItemField {
    /// The kind of the item (`token`, `scope` or `graft`).
    ItemType,
    /// The sub type of a token or graft, the direction of a scope.
    SubType,
    /// The text of a token.
    Chars,
    /// The label of a scope.
    Label,
    /// The sequence referenced by a graft.
    SequenceId,
}

impl ItemField {
    const ALL: [ItemField; 5] = [
        ItemField::ItemType,
        ItemField::SubType,
        ItemField::Chars,
        ItemField::Label,
        ItemField::SequenceId,
    ];

    /// Returns the name used in selections and results.
    pub fn name(&self) -> &'static str {
        match self {
            ItemField::ItemType => "itemType",
            ItemField::SubType => "subType",
            ItemField::Chars => "chars",
            ItemField::Label => "label",
            ItemField::SequenceId => "sequenceId",
        }
    }

    fn from_name(name: &str) -> Option<ItemField> {
        ItemField::ALL.iter().find(|field| field.name() == name).copied()
    }

    /// Determines if items of the given type carry this field.
    pub fn is_available_for(&self, item_type: ItemType) -> bool {
        match self {
            ItemField::ItemType | ItemField::SubType => true,
            ItemField::Chars => item_type == ItemType::Token,
            ItemField::Label => item_type == ItemType::Scope,
            ItemField::SequenceId => item_type == ItemType::Graft,
        }
    }
}

/// Represents a compiled entry of an item selection.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ItemSelection {
    /// A field which is emitted for every item.
    Field(ItemField),
    /// Fields which are only emitted for items of the given type.
    Fragment(ItemType, Vec<ItemField>),
}

/// Describes which fields to decode for each item of a channel.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ItemPlan {
    selections: Vec<ItemSelection>,
}

impl ItemPlan {
    /// Returns the compiled selections in their given order.
    pub fn selections(&self) -> &[ItemSelection] {
        &self.selections
    }

    /// Determines if only the label of each item is requested.
    ///
    /// In this case the payload of tokens and grafts never has to be inspected.
    pub fn is_label_only(&self) -> bool {
        self.selections
            .iter()
            .all(|selection| *selection == ItemSelection::Field(ItemField::Label))
    }
}

/// Represents a compiled field of a block.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BlockField {
    /// Reads the byte length of a channel from the header.
    ByteLength(ChannelKind),
    /// Reads the number of items of a channel from the header.
    Length(ChannelKind),
    /// Resolves the label of the block scope from the header.
    BlockScope,
    /// Decodes the items of a channel.
    Items(ChannelKind, ItemPlan),
}

impl BlockField {
    /// Returns the key under which the field is emitted.
    pub fn key(&self) -> String {
        match self {
            BlockField::ByteLength(kind) => format!("{}BL", kind.name()),
            BlockField::Length(kind) => format!("{}L", kind.name()),
            BlockField::BlockScope => "bs".to_owned(),
            BlockField::Items(kind, _) => item_list_name(*kind).to_owned(),
        }
    }
}

/// Returns the name of the item list field of a channel.
fn item_list_name(kind: ChannelKind) -> &'static str {
    match kind {
        ChannelKind::Content => "items",
        other => other.name(),
    }
}

/// Represents a compiled selection which can be executed against blocks.
///
/// # Example
/// ```
/// # use lectio::query::plan::DecodePlan;
/// # use lectio::query::selection::Selection;
/// # use lectio::succinct::block::ChannelKind;
/// let selection = Selection::parse("cBL osL bs { label } is { label }").unwrap();
/// let plan = DecodePlan::compile(&selection).unwrap();
///
/// assert_eq!(plan.decoded_channels(), vec![ChannelKind::IncludedScopes]);
///
/// let selection = Selection::parse("cBL unknownField").unwrap();
/// assert!(DecodePlan::compile(&selection).is_err());
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DecodePlan {
    fields: Vec<BlockField>,
}

impl DecodePlan {
    /// Compiles the given selection.
    ///
    /// # Errors
    /// Fails with [SuccinctError::InvalidSelection] if an unknown field is selected, if a scalar
    /// field has a nested selection or if an item list is selected without one.
    pub fn compile(selection: &Selection) -> SuccinctResult<DecodePlan> {
        let mut fields = Vec::with_capacity(selection.len());
        for entry in selection.entries() {
            match entry {
                Selected::Field { name, selection } => {
                    fields.push(compile_block_field(name, selection.as_ref())?)
                }
                Selected::Fragment { type_name, .. } => {
                    return Err(SuccinctError::InvalidSelection(format!(
                        "a fragment on '{}' cannot be applied to a block",
                        type_name
                    )))
                }
            }
        }

        Ok(DecodePlan { fields })
    }

    /// Parses and compiles the given selection.
    pub fn parse(selection: &str) -> SuccinctResult<DecodePlan> {
        DecodePlan::compile(&Selection::parse(selection)?)
    }

    /// Returns the compiled fields in their given order.
    pub fn fields(&self) -> &[BlockField] {
        &self.fields
    }

    /// Lists the channels which have to be decoded to execute this plan.
    pub fn decoded_channels(&self) -> Vec<ChannelKind> {
        self.fields
            .iter()
            .filter_map(|field| match field {
                BlockField::Items(kind, _) => Some(*kind),
                _ => None,
            })
            .unique()
            .collect()
    }

    /// Determines if this plan can be executed by only reading block headers.
    pub fn is_header_only(&self) -> bool {
        self.decoded_channels().is_empty()
    }
}

fn block_field_names() -> String {
    ChannelKind::ALL
        .iter()
        .flat_map(|kind| [format!("{}BL", kind.name()), format!("{}L", kind.name())])
        .chain(std::iter::once("bs".to_owned()))
        .chain(ChannelKind::ALL.iter().map(|kind| item_list_name(*kind).to_owned()))
        .join(", ")
}

fn compile_block_field(name: &str, selection: Option<&Selection>) -> SuccinctResult<BlockField> {
    let field = if name == "bs" {
        BlockField::BlockScope
    } else if let Some(kind) = ChannelKind::ALL
        .iter()
        .find(|kind| item_list_name(**kind) == name)
    {
        let selection = selection.ok_or_else(|| {
            SuccinctError::InvalidSelection(format!("the field '{}' requires a selection", name))
        })?;
        return Ok(BlockField::Items(*kind, compile_item_plan(selection)?));
    } else if let Some(kind) = name
        .strip_suffix("BL")
        .and_then(ChannelKind::from_name)
    {
        BlockField::ByteLength(kind)
    } else if let Some(kind) = name.strip_suffix('L').and_then(ChannelKind::from_name) {
        BlockField::Length(kind)
    } else {
        return Err(SuccinctError::InvalidSelection(format!(
            "unknown field '{}' (known fields: {})",
            name,
            block_field_names()
        )));
    };

    match (&field, selection) {
        (BlockField::BlockScope, Some(selection)) => {
            if selection.entries().iter().all(|entry| {
                matches!(entry, Selected::Field { name, selection: None } if name == "label")
            }) {
                Ok(field)
            } else {
                Err(SuccinctError::InvalidSelection(
                    "only 'label' can be selected for 'bs'".to_owned(),
                ))
            }
        }
        (BlockField::BlockScope, None) => Err(SuccinctError::InvalidSelection(
            "the field 'bs' requires a selection".to_owned(),
        )),
        (_, Some(_)) => Err(SuccinctError::InvalidSelection(format!(
            "the field '{}' is a number and cannot have a selection",
            name
        ))),
        (_, None) => Ok(field),
    }
}

fn compile_item_plan(selection: &Selection) -> SuccinctResult<ItemPlan> {
    let mut selections = Vec::with_capacity(selection.len());
    for entry in selection.entries() {
        match entry {
            Selected::Field { name, selection } => {
                selections.push(ItemSelection::Field(compile_item_field(
                    name,
                    selection.as_ref(),
                    None,
                )?))
            }
            Selected::Fragment {
                type_name,
                selection,
            } => {
                let item_type = parse_type_name(type_name)?;
                let mut fields = Vec::with_capacity(selection.len());
                for entry in selection.entries() {
                    match entry {
                        Selected::Field { name, selection } => fields.push(compile_item_field(
                            name,
                            selection.as_ref(),
                            Some(item_type),
                        )?),
                        Selected::Fragment { .. } => {
                            return Err(SuccinctError::InvalidSelection(format!(
                                "fragments cannot be nested within '... on {}'",
                                type_name
                            )))
                        }
                    }
                }
                selections.push(ItemSelection::Fragment(item_type, fields));
            }
        }
    }

    Ok(ItemPlan { selections })
}

fn compile_item_field(
    name: &str,
    selection: Option<&Selection>,
    item_type: Option<ItemType>,
) -> SuccinctResult<ItemField> {
    let field = ItemField::from_name(name).ok_or_else(|| {
        SuccinctError::InvalidSelection(format!(
            "unknown item field '{}' (known fields: {})",
            name,
            ItemField::ALL.iter().map(|field| field.name()).join(", ")
        ))
    })?;

    if selection.is_some() {
        return Err(SuccinctError::InvalidSelection(format!(
            "the item field '{}' cannot have a selection",
            name
        )));
    }

    if let Some(item_type) = item_type {
        if !field.is_available_for(item_type) {
            return Err(SuccinctError::InvalidSelection(format!(
                "the field '{}' doesn't exist on '{}'",
                name,
                type_display_name(item_type)
            )));
        }
    }

    Ok(field)
}

fn parse_type_name(name: &str) -> SuccinctResult<ItemType> {
    [ItemType::Token, ItemType::Scope, ItemType::Graft]
        .into_iter()
        .find(|item_type| type_display_name(*item_type) == name)
        .ok_or_else(|| {
            SuccinctError::InvalidSelection(format!(
                "unknown type '{}' (expected Token, Scope or Graft)",
                name
            ))
        })
}

fn type_display_name(item_type: ItemType) -> &'static str {
    match item_type {
        ItemType::Token => "Token",
        ItemType::Scope => "Scope",
        ItemType::Graft => "Graft",
    }
}
