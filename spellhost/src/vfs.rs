//! Virtual filesystem abstraction for dictionary resources.
//!
//! Dictionary artifacts may live on disk, inside a packaged archive, or in
//! memory. The [`Filesystem`] trait is the seam between those stores and the
//! materializer, which only ever needs to open a resource and read it to the
//! end.

use std::fmt::Debug;
use std::io::{Read, Result};
use std::path::Path;

/// A store that dictionary resources can be opened from.
pub trait Filesystem {
    /// The readable handle type produced by [`open`](Filesystem::open).
    type File: File;

    /// Opens the resource at `path` for reading.
    fn open<P: AsRef<Path>>(&self, path: P) -> Result<Self::File>;
}

/// A readable resource handle.
pub trait File: Read + Debug {
    /// Size of the resource in bytes.
    fn len(&self) -> Result<u64>;

    /// Whether the resource is zero bytes long.
    fn is_empty(&self) -> Result<bool> {
        self.len().map(|x| x == 0)
    }
}

impl File for std::fs::File {
    fn len(&self) -> Result<u64> {
        self.metadata().map(|m| m.len())
    }
}

/// The physical filesystem.
pub struct Fs;

impl Filesystem for Fs {
    type File = std::fs::File;

    #[inline(always)]
    fn open<P: AsRef<Path>>(&self, path: P) -> Result<Self::File> {
        std::fs::File::open(&path)
    }
}

pub mod mem {
    //! In-memory resource store.
    //!
    //! Useful for tests and for embedders that compile resources into the
    //! binary instead of shipping them on disk.

    use std::io::{Read, Result};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use hashbrown::HashMap;

    /// A resource store backed by a map of in-memory buffers.
    #[derive(Debug, Default)]
    pub struct Filesystem {
        files: HashMap<PathBuf, Arc<Vec<u8>>>,
    }

    impl Filesystem {
        /// Creates an empty store.
        pub fn new() -> Filesystem {
            Filesystem {
                files: HashMap::new(),
            }
        }

        /// Inserts (or replaces) a resource under `path`.
        pub fn insert<P: AsRef<Path>>(&mut self, path: P, bytes: impl Into<Vec<u8>>) {
            self.files
                .insert(path.as_ref().to_path_buf(), Arc::new(bytes.into()));
        }
    }

    /// A cursor over one in-memory resource.
    #[derive(Debug)]
    pub struct File {
        data: Arc<Vec<u8>>,
        pos: usize,
    }

    impl Read for File {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            let remaining = &self.data[self.pos..];
            let n = remaining.len().min(buf.len());
            buf[..n].copy_from_slice(&remaining[..n]);
            self.pos += n;
            Ok(n)
        }
    }

    impl super::File for File {
        fn len(&self) -> Result<u64> {
            Ok(self.data.len() as u64)
        }
    }

    impl super::Filesystem for Filesystem {
        type File = File;

        fn open<P: AsRef<Path>>(&self, path: P) -> Result<Self::File> {
            match self.files.get(path.as_ref()) {
                Some(data) => Ok(File {
                    data: Arc::clone(data),
                    pos: 0,
                }),
                None => Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "not found",
                )),
            }
        }
    }
}

pub mod zip {
    //! Zip-archive resource store.
    //!
    //! Entry names are the resource paths; each open reads the entry out in
    //! full, so the returned handle does not borrow the archive.

    use std::io::{Cursor, Read, Result};
    use std::path::Path;

    use ::zip::result::ZipError;
    use ::zip::ZipArchive;
    use parking_lot::Mutex;

    /// A resource store backed by the entries of a zip archive.
    pub struct Filesystem {
        // ZipArchive::by_name needs &mut, but Filesystem::open takes &self.
        archive: Mutex<ZipArchive<std::fs::File>>,
    }

    impl Filesystem {
        /// Opens the archive at `path`.
        pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Filesystem> {
            let file = std::fs::File::open(path)?;
            let archive = ZipArchive::new(file).map_err(into_io_error)?;
            Ok(Filesystem {
                archive: Mutex::new(archive),
            })
        }
    }

    fn into_io_error(err: ZipError) -> std::io::Error {
        match err {
            ZipError::Io(e) => e,
            ZipError::FileNotFound => {
                std::io::Error::new(std::io::ErrorKind::NotFound, "not found")
            }
            e => std::io::Error::new(std::io::ErrorKind::Other, format!("{:?}", e)),
        }
    }

    /// One zip entry, fully read out of the archive.
    #[derive(Debug)]
    pub struct File {
        data: Cursor<Vec<u8>>,
    }

    impl Read for File {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            self.data.read(buf)
        }
    }

    impl super::File for File {
        fn len(&self) -> Result<u64> {
            Ok(self.data.get_ref().len() as u64)
        }
    }

    impl super::Filesystem for Filesystem {
        type File = File;

        fn open<P: AsRef<Path>>(&self, path: P) -> Result<Self::File> {
            let name = path.as_ref().to_str().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "non-UTF-8 entry name")
            })?;

            let mut archive = self.archive.lock();
            let mut entry = archive.by_name(name).map_err(into_io_error)?;

            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;

            Ok(File {
                data: Cursor::new(data),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mem_roundtrip() {
        let mut fs = mem::Filesystem::new();
        fs.insert("dict/en.dic", &b"3\nhello\nworld\ntest\n"[..]);

        let mut file = fs.open("dict/en.dic").unwrap();
        assert_eq!(File::len(&file).unwrap(), 19);

        let mut buf = String::new();
        file.read_to_string(&mut buf).unwrap();
        assert!(buf.ends_with("test\n"));

        assert!(fs.open("dict/missing.dic").is_err());
    }

    #[test]
    fn zip_entry_read() {
        use ::zip::write::FileOptions;
        use ::zip::CompressionMethod;

        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("pack.zip");

        let mut writer = ::zip::ZipWriter::new(std::fs::File::create(&archive_path).unwrap());
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file("en.aff", options).unwrap();
        writer.write_all(b"SET UTF-8\n").unwrap();
        writer.start_file("en.dic", options).unwrap();
        writer.write_all(b"1\nhello\n").unwrap();
        writer.finish().unwrap();

        let fs = super::zip::Filesystem::open_path(&archive_path).unwrap();
        let mut buf = Vec::new();
        fs.open("en.dic").unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"1\nhello\n");

        let err = fs.open("fr.dic").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
