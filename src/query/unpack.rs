//! Executes a [DecodePlan] against blocks and renders the results as JSON.
use serde_json::{Map, Value};

use crate::error::SuccinctResult;
use crate::query::plan::{BlockField, DecodePlan, ItemField, ItemPlan, ItemSelection};
use crate::succinct::block::{Block, ChannelKind};
use crate::succinct::decoder::Entry;
use crate::succinct::symbols::SymbolTable;

/// Unpacks a single block.
///
/// Returns a JSON object which contains the selected fields in their given order.
///
/// # Example
/// ```
/// # use lectio::query::plan::DecodePlan;
/// # use lectio::query::unpack::unpack_block;
/// # use lectio::succinct::assembler::BlockAssembler;
/// # use lectio::succinct::item::Item;
/// # use lectio::succinct::symbols::SymbolTable;
/// let mut symbols = SymbolTable::new();
/// let blocks = BlockAssembler::default().assemble(&[
///     Item::open("blockTag/p"),
///     Item::open("verses/1"),
///     Item::word("In"),
///     Item::close("blockTag/p"),
/// ], &mut symbols).unwrap();
///
/// let plan = DecodePlan::parse("cL bs { label } items { itemType ... on Token { chars } }").unwrap();
/// let result = unpack_block(&blocks[0], &symbols, &plan).unwrap();
///
/// assert_eq!(
///     result.to_string(),
///     r#"{"cL":2,"bs":{"label":"blockTag/p"},"items":[{"itemType":"scope"},{"itemType":"token","chars":"In"}]}"#
/// );
/// ```
pub fn unpack_block(
    block: &Block,
    symbols: &SymbolTable,
    plan: &DecodePlan,
) -> SuccinctResult<Value> {
    let mut result = Map::new();
    for field in plan.fields() {
        let value = match field {
            BlockField::ByteLength(kind) => Value::from(block.header().channel(*kind).byte_len()),
            BlockField::Length(kind) => Value::from(block.header().channel(*kind).len()),
            BlockField::BlockScope => {
                let mut bs = Map::new();
                let _ = bs.insert(
                    ItemField::Label.name().to_owned(),
                    Value::from(block.bs_label(symbols)?),
                );
                Value::Object(bs)
            }
            BlockField::Items(kind, items) => unpack_channel(block, *kind, symbols, items)?,
        };
        let _ = result.insert(field.key(), value);
    }

    Ok(Value::Object(result))
}

/// Unpacks all given blocks into a JSON array.
pub fn unpack_blocks<'a>(
    blocks: impl IntoIterator<Item = &'a Block>,
    symbols: &SymbolTable,
    plan: &DecodePlan,
) -> SuccinctResult<Value> {
    let results = blocks
        .into_iter()
        .map(|block| unpack_block(block, symbols, plan))
        .collect::<SuccinctResult<Vec<_>>>()?;

    Ok(Value::Array(results))
}

/// Decodes exactly the given channel.
///
/// The `os` and `is` channels only ever contain scopes. If only their labels are requested, the
/// label-only decoder is used.
fn unpack_channel(
    block: &Block,
    kind: ChannelKind,
    symbols: &SymbolTable,
    plan: &ItemPlan,
) -> SuccinctResult<Value> {
    let mut items = Vec::with_capacity(block.header().channel(kind).len());

    if plan.is_label_only()
        && matches!(kind, ChannelKind::OpenScopes | ChannelKind::IncludedScopes)
    {
        for label in block.labels(kind, symbols) {
            let mut item = Map::new();
            let _ = item.insert(ItemField::Label.name().to_owned(), Value::from(label?));
            items.push(Value::Object(item));
        }
    } else {
        for entry in block.entries(kind) {
            items.push(unpack_entry(&entry?, symbols, plan)?);
        }
    }

    Ok(Value::Array(items))
}

fn unpack_entry(entry: &Entry, symbols: &SymbolTable, plan: &ItemPlan) -> SuccinctResult<Value> {
    let mut item = Map::new();
    for selection in plan.selections() {
        match selection {
            ItemSelection::Field(field) => emit_field(entry, *field, symbols, &mut item)?,
            ItemSelection::Fragment(item_type, fields) if *item_type == entry.item_type() => {
                for field in fields {
                    emit_field(entry, *field, symbols, &mut item)?;
                }
            }
            ItemSelection::Fragment(..) => (),
        }
    }

    Ok(Value::Object(item))
}

/// Reads a single field of an entry.
///
/// Requesting a field which the entry doesn't carry yields a type mismatch.
fn emit_field(
    entry: &Entry,
    field: ItemField,
    symbols: &SymbolTable,
    item: &mut Map<String, Value>,
) -> SuccinctResult<()> {
    let value = match field {
        ItemField::ItemType => Value::from(entry.item_type().name()),
        ItemField::SubType => Value::from(entry.sub_type_name()),
        ItemField::Chars => Value::from(entry.chars()?),
        ItemField::Label => Value::from(entry.label(symbols)?),
        ItemField::SequenceId => Value::from(entry.sequence_id()?),
    };
    let _ = item.insert(field.name().to_owned(), value);

    Ok(())
}
