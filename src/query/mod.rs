//! Answers field selections on blocks by decoding only what is requested.
//!
//! A caller describes the fields it is interested in using a [Selection](selection::Selection)
//! (GraphQL-like syntax, e.g. `cBL isL bs { label } is { label }`). The selection is compiled into
//! a [DecodePlan](plan::DecodePlan) which is then [executed](unpack::unpack_block) against one or
//! more blocks:
//!
//! * length fields (`cBL`, `bgBL`, `osBL`, `isBL`, `cL`, `bgL`, `osL`, `isL`) and the block scope
//!   (`bs { label }`) are read from the block header,
//! * item lists (`items` for the content, `bg`, `os`, `is`) decode exactly their channel and only
//!   read the fields which have been selected for each item.
//!
//! Results are rendered as JSON, one object per block, with keys in the order of the selection.
//!
//! # Example
//!
//! ```
//! # use lectio::config::AssemblerSettings;
//! # use lectio::docs::{DocumentBuilder, ProcessorId};
//! # use lectio::query::succinct_blocks;
//! # use lectio::succinct::item::Item;
//! let mut builder = DocumentBuilder::new("TIT", ProcessorId::generate(), &AssemblerSettings::default());
//! builder.add_main_sequence(&[
//!     Item::open("chapter/1"),
//!     Item::open("blockTag/p"),
//!     Item::word("Paul"),
//!     Item::close("blockTag/p"),
//! ]).unwrap();
//! let document = builder.build().unwrap();
//!
//! let result = succinct_blocks(&document, "cL osL os { label }").unwrap();
//! assert_eq!(result.to_string(), r#"[{"cL":1,"osL":1,"os":[{"label":"chapter/1"}]}]"#);
//! ```
use serde_json::Value;

use crate::docs::Document;
use crate::error::SuccinctResult;
use crate::query::plan::DecodePlan;
use crate::query::unpack::unpack_blocks;

pub mod plan;
pub mod selection;
pub mod unpack;

/// Unpacks all blocks of the main sequence of the given document in document order.
///
/// # Errors
/// Fails if the selection is invalid or if a selected field cannot be decoded.
pub fn succinct_blocks(document: &Document, selection: &str) -> SuccinctResult<Value> {
    let plan = DecodePlan::parse(selection)?;
    unpack_blocks(
        document.main_sequence().blocks(),
        document.symbols(),
        &plan,
    )
}

/// Unpacks all blocks of the given sequence using a pre-compiled plan.
pub fn unpack_sequence(
    document: &Document,
    sequence_id: u32,
    plan: &DecodePlan,
) -> SuccinctResult<Value> {
    unpack_blocks(
        document.sequence(sequence_id)?.blocks(),
        document.symbols(),
        plan,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::error::SuccinctError;
    use crate::query::plan::DecodePlan;
    use crate::query::{succinct_blocks, unpack_sequence};
    use crate::succinct::block::ChannelKind;
    use crate::testing::{scenario_document, SCENARIO_FOOTNOTE};

    fn column(result: &Value, key: &str) -> Vec<Value> {
        result
            .as_array()
            .unwrap()
            .iter()
            .map(|block| block[key].clone())
            .collect()
    }

    #[test]
    fn byte_lengths_match_the_scenario() {
        let document = scenario_document();
        let result = succinct_blocks(&document, "cBL bgBL osBL isBL").unwrap();

        assert_eq!(
            result,
            json!([
                { "cBL": 1734, "bgBL": 9, "osBL": 0, "isBL": 57 },
                { "cBL": 198, "bgBL": 0, "osBL": 9, "isBL": 6 },
            ])
        );
    }

    #[test]
    fn item_counts_match_the_scenario() {
        let document = scenario_document();
        let result = succinct_blocks(&document, "cL bgL osL isL").unwrap();

        assert_eq!(
            result,
            json!([
                { "cL": 578, "bgL": 3, "osL": 0, "isL": 19 },
                { "cL": 66, "bgL": 0, "osL": 3, "isL": 2 },
            ])
        );
    }

    #[test]
    fn unpacked_labels_match_the_scenario() {
        let document = scenario_document();
        let result = succinct_blocks(&document, "is { label } os { label } bs { label }").unwrap();

        let counts = |key: &str| {
            column(&result, key)
                .iter()
                .map(|list| list.as_array().unwrap().len())
                .collect::<Vec<_>>()
        };
        assert_eq!(counts("is"), vec![19, 2]);
        assert_eq!(counts("os"), vec![0, 3]);
        assert_eq!(
            column(&result, "bs"),
            vec![json!({ "label": "blockTag/p" }), json!({ "label": "blockTag/p" })]
        );

        // Scopes left open by the first block show up as open scopes of the second...
        let first_included = column(&result, "is")[0].as_array().unwrap().clone();
        for open in column(&result, "os")[1].as_array().unwrap() {
            assert_eq!(first_included.contains(open), true);
        }
    }

    #[test]
    fn headers_match_a_full_decode_for_every_block() {
        let document = scenario_document();
        let symbols = document.symbols();
        for id in document.sequence_ids() {
            for block in document.sequence(id).unwrap().blocks() {
                for kind in ChannelKind::ALL {
                    let header = block.header().channel(kind);
                    let items = block
                        .items(kind, symbols)
                        .collect::<Result<Vec<_>, _>>()
                        .unwrap();
                    assert_eq!(header.len(), items.len());
                    assert_eq!(header.byte_len(), block.data(kind).len());
                }
            }
        }
    }

    #[test]
    fn label_only_decoding_matches_full_decoding_for_the_scenario() {
        let document = scenario_document();
        let symbols = document.symbols();
        for block in document.main_sequence().blocks() {
            for kind in [ChannelKind::OpenScopes, ChannelKind::IncludedScopes] {
                let fast = block
                    .labels(kind, symbols)
                    .collect::<Result<Vec<_>, _>>()
                    .unwrap();
                let full = block
                    .items(kind, symbols)
                    .map(|item| item.unwrap().label().unwrap().to_owned())
                    .collect::<Vec<_>>();
                assert_eq!(fast, full);
            }
        }
    }

    #[test]
    fn other_sequences_can_be_unpacked() {
        let document = scenario_document();
        let plan = DecodePlan::parse("bs { label } items { ... on Token { chars } }").unwrap();

        assert_eq!(
            unpack_sequence(&document, SCENARIO_FOOTNOTE, &plan).unwrap(),
            json!([
                { "bs": { "label": "blockTag/f" }, "items": [ { "chars": "Or" }, { "chars": "servant" } ] }
            ])
        );
        assert!(matches!(
            unpack_sequence(&document, 4711, &plan),
            Err(SuccinctError::UnknownSequence(4711))
        ));
    }

    #[test]
    fn invalid_selections_are_reported() {
        let document = scenario_document();
        assert!(matches!(
            succinct_blocks(&document, "cBL verses"),
            Err(SuccinctError::InvalidSelection(_))
        ));
    }
}
