//! Upstream feed acquisition.
//!
//! [`FeedDownloader`] fetches and unpacks the NVD CPE 2.0 tarball;
//! [`parser`] maps the extracted chunk files to catalog entries.

mod download;
pub mod parser;

use std::path::PathBuf;

use crate::error::Result;

pub use download::{list_chunk_files, FeedDownloader};
pub use parser::{load_snapshot, normalize_date, parse_chunk_file, ChunkParse, SnapshotLoad};

/// Source of feed chunk files.
pub trait FeedSource {
    /// Make the chunk files available locally, downloading again when
    /// `force` is set.
    fn fetch(&self, force: bool) -> Result<()>;

    /// Chunk files currently available, sorted by name.
    fn chunk_files(&self) -> Result<Vec<PathBuf>>;
}

impl<T: FeedSource + ?Sized> FeedSource for &T {
    fn fetch(&self, force: bool) -> Result<()> {
        (**self).fetch(force)
    }

    fn chunk_files(&self) -> Result<Vec<PathBuf>> {
        (**self).chunk_files()
    }
}
