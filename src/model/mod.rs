//! Record model for the CPE catalog.
//!
//! [`CatalogEntry`] is the single document shape shared by the feed mapper,
//! the search backend, backups and diff reports. [`Snapshot`] keys entries by
//! their identifier for diffing, and [`MatchGroup`] is what a lookup returns
//! after hits have been consolidated per vendor/product.

mod cpe;
mod entry;
mod group;
mod snapshot;

pub use cpe::*;
pub use entry::*;
pub use group::*;
pub use snapshot::*;
