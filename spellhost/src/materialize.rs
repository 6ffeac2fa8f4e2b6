//! Resource materialization.
//!
//! Foreign analysis engines open their dictionary files directly from disk,
//! so resources living in a virtual store have to be copied out to a physical
//! path first. The copy target is derived from the resource's base file name
//! under a fixed per-process temp root, which makes repeated materialization
//! idempotent in its observable result: same handle, same path, same bytes.

use std::io::Read;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use thiserror::Error;

use crate::vfs::{File, Filesystem};

/// Failure to turn a resource handle into a physical path.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// The virtual resource could not be opened or read.
    #[error("resource `{0}` could not be opened for reading")]
    ResourceNotFound(String, #[source] std::io::Error),

    /// The temp root could not be created.
    #[error("could not create temp directory `{0}`")]
    DirectoryCreateFailed(PathBuf, #[source] std::io::Error),

    /// The materialized copy could not be written.
    #[error("could not write materialized file `{0}`")]
    FileWriteFailed(PathBuf, #[source] std::io::Error),
}

/// Copies virtual resources to physical paths the engine can open.
///
/// A materializer owns its temp root and a process-lifetime record of every
/// handle it has resolved. Materializing the same handle again re-reads and
/// re-writes the resource (the copy is cheap and the source may be treated
/// as authoritative), but always lands on the same derived path.
#[derive(Debug)]
pub struct Materializer {
    temp_root: PathBuf,
    resolved: HashMap<String, PathBuf>,
}

impl Materializer {
    /// Creates a materializer rooted under the system temp directory.
    pub fn new() -> Materializer {
        Materializer::with_root(std::env::temp_dir().join("spellhost"))
    }

    /// Creates a materializer with an explicit temp root.
    pub fn with_root(temp_root: PathBuf) -> Materializer {
        Materializer {
            temp_root,
            resolved: HashMap::new(),
        }
    }

    /// The directory materialized copies are written under.
    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// The physical path `handle` last resolved to, if it ever has.
    pub fn resolved(&self, handle: &str) -> Option<&Path> {
        self.resolved.get(handle).map(PathBuf::as_path)
    }

    /// Resolves `handle` to a physical path.
    ///
    /// A handle that already names a directly-openable physical file is
    /// returned unchanged. Anything else is opened through `fs`, read in
    /// full and written to `<temp root>/<base name>`, overwriting whatever
    /// was there from an earlier call.
    pub fn materialize<FS: Filesystem>(
        &mut self,
        fs: &FS,
        handle: &str,
    ) -> Result<PathBuf, MaterializeError> {
        let physical = Path::new(handle);
        if physical.is_file() {
            log::debug!("{}: using physical path as-is", handle);
            self.resolved
                .insert(handle.to_string(), physical.to_path_buf());
            return Ok(physical.to_path_buf());
        }

        let mut file = fs
            .open(physical)
            .map_err(|e| MaterializeError::ResourceNotFound(handle.to_string(), e))?;

        let mut buf = Vec::with_capacity(file.len().unwrap_or(0) as usize);
        file.read_to_end(&mut buf)
            .map_err(|e| MaterializeError::ResourceNotFound(handle.to_string(), e))?;

        let name = physical.file_name().ok_or_else(|| {
            MaterializeError::ResourceNotFound(
                handle.to_string(),
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "no base file name"),
            )
        })?;

        std::fs::create_dir_all(&self.temp_root)
            .map_err(|e| MaterializeError::DirectoryCreateFailed(self.temp_root.clone(), e))?;

        let target = self.temp_root.join(name);
        std::fs::write(&target, &buf)
            .map_err(|e| MaterializeError::FileWriteFailed(target.clone(), e))?;

        log::debug!("{}: materialized to {}", handle, target.display());
        self.resolved.insert(handle.to_string(), target.clone());
        Ok(target)
    }
}

impl Default for Materializer {
    fn default() -> Materializer {
        Materializer::new()
    }
}
