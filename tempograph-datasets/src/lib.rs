//! Raw temporal-graph dataset retrieval and canonicalization.
//!
//! A declarative registry maps dataset names to their source URL, archive
//! kind, raw-file format descriptor, and replay parameters (survival time,
//! clock overrides, fixed test points). [`DatasetStore`] downloads and
//! caches raw files; the loader normalizes them into a canonical,
//! timestamp-sorted edge sequence consumed by `tempograph-core`.

mod errors;
mod fetch;
mod loader;
mod registry;

pub use crate::{
    errors::DatasetError,
    fetch::{DatasetStore, DownloadClient},
    loader::{EdgeSequence, load_edges},
    registry::{
        ArchiveKind, DatasetSpec, Delimiter, FormatDescriptor, TimestampDecode, dataset, datasets,
    },
};
