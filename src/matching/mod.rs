//! Tool-to-catalog matching.
//!
//! A tool is looked up by its website first and by its name only when the
//! website yields nothing. Hits are collapsed into [`MatchGroup`]s, one per
//! vendor/product, so a product with many catalogued versions is reported
//! once.
//!
//! [`MatchGroup`]: crate::model::MatchGroup

mod batch;
mod engine;
mod grouping;

pub use batch::{
    match_csv, sniff_delimiter, CsvInput, MatchCsvOptions, MatchStats, MatchedRow,
};
pub use engine::{MatchingEngine, ToolMatch, DEFAULT_MATCH_RESULT_SIZE, LOOKUP_ORDER};
pub use grouping::group_hits;
