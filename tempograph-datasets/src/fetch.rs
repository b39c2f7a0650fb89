//! Download-and-cache store for raw dataset files.
//!
//! Raw files are cached under a per-user cache directory and downloaded at
//! most once; archives are unpacked before caching so the cache always holds
//! the plain edge file. Cache writes go through a `.part` rename so an
//! interrupted download never leaves a truncated raw file behind.

use std::env;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, info, instrument};
use zip::ZipArchive;

use crate::errors::DatasetError;
use crate::loader::{EdgeSequence, load_edges};
use crate::registry::{ArchiveKind, DatasetSpec};

/// Download client abstraction so tests can stub network access.
pub trait DownloadClient {
    /// Downloads URL contents as bytes.
    ///
    /// # Errors
    /// Returns [`DatasetError::Download`] if the request fails.
    fn download_bytes(&self, url: &str) -> Result<Vec<u8>, DatasetError>;
}

struct UreqDownloadClient;

impl DownloadClient for UreqDownloadClient {
    fn download_bytes(&self, url: &str) -> Result<Vec<u8>, DatasetError> {
        let mut response = ureq::get(url)
            .call()
            .map_err(|error| DatasetError::Download {
                url: url.to_owned(),
                message: error.to_string(),
            })?;

        response
            .body_mut()
            .read_to_vec()
            .map_err(|error| DatasetError::Download {
                url: url.to_owned(),
                message: error.to_string(),
            })
    }
}

/// Filesystem cache of raw dataset files.
#[derive(Clone, Debug)]
pub struct DatasetStore {
    cache_dir: PathBuf,
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new(default_cache_dir())
    }
}

impl DatasetStore {
    /// Creates a store rooted at an explicit cache directory.
    #[must_use]
    pub const fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// The directory raw files are cached under.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the raw bytes of a dataset's edge file, downloading and
    /// unpacking it on a cache miss.
    ///
    /// # Errors
    /// Returns [`DatasetError`] when the file is absent and has no source
    /// URL, the download fails, the archive cannot be unpacked, or the cache
    /// cannot be read or written.
    pub fn fetch(&self, spec: &DatasetSpec) -> Result<Vec<u8>, DatasetError> {
        self.fetch_with_client(spec, &UreqDownloadClient)
    }

    /// Fetches and canonicalizes a dataset in one step.
    ///
    /// # Errors
    /// Propagates fetch failures plus any parse error from the raw file.
    pub fn load(&self, spec: &DatasetSpec) -> Result<EdgeSequence, DatasetError> {
        let bytes = self.fetch(spec)?;
        load_edges(&spec.format, &bytes)
    }

    #[instrument(name = "datasets.fetch", skip(self, client), fields(dataset = spec.name))]
    fn fetch_with_client(
        &self,
        spec: &DatasetSpec,
        client: &dyn DownloadClient,
    ) -> Result<Vec<u8>, DatasetError> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.cache_dir.join(spec.file_name);
        if path.exists() {
            debug!(path = %path.display(), "cache hit");
            return fs::read(&path).map_err(DatasetError::from);
        }

        let Some(url) = spec.url else {
            return Err(DatasetError::Unavailable {
                name: spec.name.to_owned(),
                message: format!(
                    "no source URL; place `{}` in `{}` manually",
                    spec.file_name,
                    self.cache_dir.display()
                ),
            });
        };

        info!(url, "downloading raw dataset");
        let payload = client.download_bytes(url)?;
        let raw = unpack(spec, &path, payload)?;
        write_atomic(&path, &raw)?;
        Ok(raw)
    }
}

fn unpack(spec: &DatasetSpec, path: &Path, payload: Vec<u8>) -> Result<Vec<u8>, DatasetError> {
    match spec.archive {
        ArchiveKind::None => Ok(payload),
        ArchiveKind::Gzip => {
            let mut decoder = GzDecoder::new(payload.as_slice());
            let mut decoded = Vec::new();
            decoder
                .read_to_end(&mut decoded)
                .map_err(|error| invalid_archive(path, &format!("gzip decode failure: {error}")))?;
            Ok(decoded)
        }
        ArchiveKind::Zip => {
            let mut archive = ZipArchive::new(Cursor::new(payload))
                .map_err(|error| invalid_archive(path, &format!("zip decode failure: {error}")))?;
            let mut member = archive.by_name(spec.file_name).map_err(|error| {
                invalid_archive(path, &format!("missing member `{}`: {error}", spec.file_name))
            })?;
            let mut decoded = Vec::new();
            member
                .read_to_end(&mut decoded)
                .map_err(|error| invalid_archive(path, &format!("zip member read failure: {error}")))?;
            Ok(decoded)
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DatasetError> {
    let mut part_path = path.to_path_buf();
    part_path.set_extension("part");
    if part_path.exists() {
        fs::remove_file(&part_path)?;
    }
    fs::write(&part_path, bytes)?;
    fs::rename(&part_path, path)?;
    Ok(())
}

fn invalid_archive(path: &Path, message: &str) -> DatasetError {
    DatasetError::Archive {
        path: path.to_path_buf(),
        message: message.to_owned(),
    }
}

fn default_cache_dir() -> PathBuf {
    if let Some(explicit) = env::var_os("TEMPOGRAPH_CACHE_DIR") {
        return PathBuf::from(explicit);
    }

    if let Some(xdg_cache) = env::var_os("XDG_CACHE_HOME") {
        return PathBuf::from(xdg_cache).join("tempograph");
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".cache").join("tempograph");
    }

    env::temp_dir().join("tempograph")
}
