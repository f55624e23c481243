//! Snapshot diff generator.
//!
//! Compares the catalog as it was before an update against the freshly parsed
//! feed and classifies every identifier as added, removed, modified or
//! unchanged. Modified entries whose `deprecated` flag flipped to true are
//! additionally listed as deprecation transitions.
//!
//! # Example
//!
//! ```ignore
//! use cpe_catalog::diff::DiffEngine;
//!
//! let result = DiffEngine::new().diff(&old_snapshot, &new_snapshot);
//! println!("{} added", result.statistics.added);
//! ```

mod engine;
mod result;

pub use engine::DiffEngine;
pub use result::{
    ChangeReport, DiffResult, FieldChanges, FieldDelta, ModifiedEntry, UpdateCounters,
};
