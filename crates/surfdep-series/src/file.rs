//! On-disk page store: one file per page.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;
use crate::store::PageStore;

const VALUE_BYTES: usize = std::mem::size_of::<f64>();

/// Stores each page as `page-NNNNNNNN.f64` under a directory, encoded as
/// raw little-endian `f64` values.
///
/// The directory is created on [`open`](PageStore::open). Any access
/// before `open` or after [`close`](PageStore::close) fails with
/// [`StoreError::Closed`].
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    open: bool,
}

impl FileStore {
    /// A store rooted at `dir`. Nothing touches the filesystem until
    /// `open`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            open: false,
        }
    }

    /// The root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `page`.
    pub fn page_path(&self, page: usize) -> PathBuf {
        self.dir.join(format!("page-{page:08}.f64"))
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }

    fn is_page_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("page-") && n.ends_with(".f64"))
    }
}

impl PageStore for FileStore {
    fn open(&mut self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        self.open = true;
        debug!(dir = %self.dir.display(), "file store opened");
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.open = false;
        Ok(())
    }

    fn push_page(&mut self, page: usize, values: &[f64]) -> Result<(), StoreError> {
        self.check_open()?;
        let mut bytes = Vec::with_capacity(values.len() * VALUE_BYTES);
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        fs::write(self.page_path(page), bytes)?;
        Ok(())
    }

    fn pull_page(&mut self, page: usize) -> Result<Vec<f64>, StoreError> {
        self.check_open()?;
        let bytes = match fs::read(self.page_path(page)) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.len() % VALUE_BYTES != 0 {
            return Err(StoreError::Corrupt {
                page,
                detail: format!("{} bytes is not a whole number of values", bytes.len()),
            });
        }
        Ok(bytes
            .chunks_exact(VALUE_BYTES)
            .map(|c| {
                let mut raw = [0u8; VALUE_BYTES];
                raw.copy_from_slice(c);
                f64::from_le_bytes(raw)
            })
            .collect())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.check_open()?;
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let mut removed = 0usize;
        for entry in entries {
            let path = entry?.path();
            if Self::is_page_file(&path) {
                match fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        debug!(dir = %self.dir.display(), removed, "file store cleared");
        Ok(())
    }
}
