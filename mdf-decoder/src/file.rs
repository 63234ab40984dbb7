//! MDF file context
//!
//! [`MdfFile`] owns the immutable byte region holding one MDF file image and
//! the corruption flag shared by all lookups into it. Every block access goes
//! through [`MdfFile::resolve`], the single place where link/offset bounds
//! arithmetic happens; no other component touches the region directly.

use crate::blocks::{HdBlock, IdBlock, Link, HD_BLOCK_OFFSET};
use crate::types::{DecodeError, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// One attached MDF file image
///
/// The region is read-only for the lifetime of the context. Any number of
/// decode operations may run against it concurrently; the corruption flag is
/// atomic (set once, never cleared) so concurrent navigation stays sound.
pub struct MdfFile {
    data: Box<[u8]>,
    corrupt: AtomicBool,
}

impl MdfFile {
    /// Attach a file image already held in memory
    ///
    /// The region must at least cover the identification block; anything
    /// shorter cannot be an MDF file.
    pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> Result<Self> {
        let data = bytes.into();

        if data.len() < IdBlock::SIZE {
            return Err(DecodeError::InvalidFile(format!(
                "image is {} bytes, identification block needs {}",
                data.len(),
                IdBlock::SIZE
            )));
        }

        if &data[..3] != b"MDF" {
            log::warn!("File identifier is not 'MDF', continuing anyway");
        }

        Ok(Self {
            data,
            corrupt: AtomicBool::new(false),
        })
    }

    /// Read a file from disk and attach it
    ///
    /// Convenience wrapper around [`MdfFile::from_bytes`]; the whole file is
    /// read into memory, matching the random-access decode model.
    pub fn open(path: &Path) -> Result<Self> {
        log::info!("Opening MDF file: {:?}", path);
        let bytes = std::fs::read(path)?;
        let file = Self::from_bytes(bytes)?;
        log::info!(
            "MDF file opened: version {}, {} bytes",
            file.version(),
            file.len()
        );
        Ok(file)
    }

    /// Length of the file image in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the image is empty (never the case for a valid context)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True once any link failed bounds validation
    pub fn is_corrupt(&self) -> bool {
        self.corrupt.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_corrupt(&self) {
        self.corrupt.store(true, Ordering::Relaxed);
    }

    /// Resolve a link to a byte range of at least `size` bytes
    ///
    /// A link of 0 means "absent" and resolves to `None` without touching the
    /// corruption flag. A non-zero link succeeds only if `link + size` fits
    /// within the region; otherwise the context is marked corrupt and the
    /// block is reported absent. This is the only place in the crate where
    /// offset bounds arithmetic happens.
    pub(crate) fn resolve(&self, link: Link, size: usize) -> Option<&[u8]> {
        if link == 0 {
            return None;
        }

        let start = link as usize;
        if size > self.data.len() || start > self.data.len() - size {
            log::warn!(
                "Link {:#x} (+{} bytes) outside file image of {} bytes, marking corrupt",
                link,
                size,
                self.data.len()
            );
            self.mark_corrupt();
            return None;
        }

        Some(&self.data[start..])
    }

    /// The identification block at offset 0
    ///
    /// Always present: the constructor guarantees the region covers it.
    pub fn id_block(&self) -> IdBlock<'_> {
        IdBlock::new(&self.data)
    }

    /// The header block at its fixed offset
    pub fn header_block(&self) -> Option<HdBlock<'_>> {
        self.resolve(HD_BLOCK_OFFSET, HdBlock::SIZE).map(HdBlock::new)
    }

    /// Format version from the identification block (e.g. 212, 300, 330)
    pub fn version(&self) -> u16 {
        self.id_block().version_number()
    }

    /// True if the file's default byte order is big-endian (Motorola)
    pub fn default_big_endian(&self) -> bool {
        self.id_block().byte_order() != 0
    }

    /// True if the standard flags say record counters must be recomputed
    pub fn record_counters_need_recount(&self) -> bool {
        self.id_block().standard_flags() & IdBlock::FLAG_UPDATE_RECORD_COUNTERS != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn minimal_image() -> Vec<u8> {
        let mut image = vec![0u8; 64];
        image[..8].copy_from_slice(b"MDF     ");
        image[8..16].copy_from_slice(b"3.30    ");
        image[28..30].copy_from_slice(&330u16.to_le_bytes());
        image
    }

    #[test]
    fn test_rejects_truncated_image() {
        let result = MdfFile::from_bytes(vec![0u8; 10]);
        assert!(matches!(result, Err(DecodeError::InvalidFile(_))));
    }

    #[test]
    fn test_minimal_image_attaches() {
        let file = MdfFile::from_bytes(minimal_image()).unwrap();
        assert_eq!(file.version(), 330);
        assert!(!file.default_big_endian());
        assert!(!file.is_corrupt());
    }

    #[test]
    fn test_resolve_bounds() {
        let file = MdfFile::from_bytes(minimal_image()).unwrap();

        // Link 0 is "absent", never corrupt
        assert!(file.resolve(0, 4).is_none());
        assert!(!file.is_corrupt());

        // In-range link succeeds exactly when link + size <= len
        assert!(file.resolve(60, 4).is_some());
        assert!(file.resolve(61, 4).is_none());
        assert!(file.is_corrupt());
    }

    #[test]
    fn test_corrupt_flag_sticks() {
        let file = MdfFile::from_bytes(minimal_image()).unwrap();
        assert!(file.resolve(1000, 8).is_none());
        assert!(file.is_corrupt());
        // A later valid lookup does not clear it
        assert!(file.resolve(4, 4).is_some());
        assert!(file.is_corrupt());
    }

    #[test]
    fn test_open_from_disk() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&minimal_image()).unwrap();
        temp.flush().unwrap();

        let file = MdfFile::open(temp.path()).unwrap();
        assert_eq!(file.len(), 64);
        assert_eq!(file.version(), 330);
    }

    #[test]
    fn test_open_missing_file() {
        let result = MdfFile::open(Path::new("nonexistent.mdf"));
        assert!(matches!(result, Err(DecodeError::Io(_))));
    }
}
