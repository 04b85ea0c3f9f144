//! Fixed-size shared frame buffer, memory-mapped from a named backing file.
//!
//! Exactly one most-recent frame lives here, overwritten in place by the
//! capture process and copied out by any number of web-tier readers. There
//! is deliberately NO lock around reads and writes: a reader may observe a
//! torn frame mixing bytes from two writes. That is an accepted consistency
//! relaxation -- the result is still a decodable-enough JPEG, and the next
//! write (~10ms later) supersedes it. A mutex here would let a stalled
//! reader block the writer.
//!
//! Lifecycle: the writer creates (or re-attaches to) the backing file at
//! startup and unlinks it on graceful shutdown. Readers attach without
//! creating; a missing file is a first-class `Absent` condition, distinct
//! from an attached buffer that still holds all zeroes.

use log::{debug, info};
use memmap2::{Mmap, MmapMut};
use std::fs::OpenOptions;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameBufferError {
    #[error("frame buffer does not exist at {0}")]
    Absent(PathBuf),

    #[error("frame buffer at {path} is {actual} bytes, expected {expected}")]
    SizeMismatch {
        path: PathBuf,
        actual: u64,
        expected: u64,
    },

    #[error("frame has {actual} bytes, buffer holds {expected}")]
    FrameSizeMismatch { actual: usize, expected: usize },

    #[error("frame buffer I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writer end, owned by the Capture Supervisor.
pub struct FrameBufferWriter {
    mmap: MmapMut,
    path: PathBuf,
    len: usize,
}

impl FrameBufferWriter {
    /// Create the backing file (or attach to one left behind by a previous
    /// instance -- guards against duplicate-create races) and map it.
    /// The file is zero-filled on creation, so readers can tell "no frame
    /// written yet" from buffer absence.
    pub fn create(path: &Path, len: usize) -> Result<Self, FrameBufferError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.set_len(len as u64)?;
        // Safety: the mapping is backed by a regular file we just sized.
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        info!("🧵 Frame buffer created at {} ({} bytes)", path.display(), len);
        Ok(FrameBufferWriter {
            mmap,
            path: path.to_path_buf(),
            len,
        })
    }

    /// Overwrite the buffer with one full frame. Unsynchronized by design;
    /// see the module docs for the torn-read tolerance.
    pub fn write(&mut self, frame: &[u8]) -> Result<(), FrameBufferError> {
        if frame.len() != self.len {
            return Err(FrameBufferError::FrameSizeMismatch {
                actual: frame.len(),
                expected: self.len,
            });
        }
        self.mmap[..].copy_from_slice(frame);
        Ok(())
    }

    /// Remove the backing file. Readers holding an attachment will notice
    /// the identity change on their next snapshot and fall back.
    pub fn unlink(self) -> Result<(), FrameBufferError> {
        debug!("🧹 Unlinking frame buffer at {}", self.path.display());
        std::fs::remove_file(&self.path)?;
        Ok(())
    }
}

/// Reader end, attached (never created) by the web tier.
pub struct FrameBufferReader {
    mmap: Mmap,
    path: PathBuf,
    ino: u64,
    len: usize,
}

impl FrameBufferReader {
    pub fn attach(path: &Path, expected_len: usize) -> Result<Self, FrameBufferError> {
        let file = match OpenOptions::new().read(true).open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FrameBufferError::Absent(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        let meta = file.metadata()?;
        if meta.len() != expected_len as u64 {
            return Err(FrameBufferError::SizeMismatch {
                path: path.to_path_buf(),
                actual: meta.len(),
                expected: expected_len as u64,
            });
        }
        // Safety: read-only mapping of a regular file.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!("🔗 Attached to frame buffer at {}", path.display());
        Ok(FrameBufferReader {
            mmap,
            path: path.to_path_buf(),
            ino: meta.ino(),
            len: expected_len,
        })
    }

    /// Copy the current frame out of the shared region. Always a copy, never
    /// a reference: the writer may rewrite the region mid-encode.
    ///
    /// If the backing file was unlinked (or unlinked and recreated by a
    /// restarted capture process), this mapping is stale; report `Absent` so
    /// the caller drops the attachment and re-attaches.
    pub fn snapshot(&self) -> Result<Vec<u8>, FrameBufferError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.ino() == self.ino => {}
            _ => return Err(FrameBufferError::Absent(self.path.clone())),
        }
        let mut out = vec![0u8; self.len];
        out.copy_from_slice(&self.mmap[..]);
        Ok(out)
    }
}

/// A frame that was never written: the writer zero-fills on create, and a
/// live camera frame is never entirely black at every byte.
pub fn is_blank_frame(frame: &[u8]) -> bool {
    frame.iter().all(|&b| b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("frame")
    }

    #[test]
    fn attach_to_missing_buffer_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        match FrameBufferReader::attach(&buffer_path(&dir), 12) {
            Err(FrameBufferError::Absent(_)) => {}
            other => panic!("expected Absent, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn freshly_created_buffer_reads_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = buffer_path(&dir);
        let _writer = FrameBufferWriter::create(&path, 12).unwrap();
        let reader = FrameBufferReader::attach(&path, 12).unwrap();
        let frame = reader.snapshot().unwrap();
        assert!(is_blank_frame(&frame));
    }

    #[test]
    fn write_then_snapshot_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = buffer_path(&dir);
        let mut writer = FrameBufferWriter::create(&path, 12).unwrap();
        let reader = FrameBufferReader::attach(&path, 12).unwrap();

        let frame: Vec<u8> = (1..=12).collect();
        writer.write(&frame).unwrap();
        assert_eq!(reader.snapshot().unwrap(), frame);
        assert!(!is_blank_frame(&frame));

        // Overwritten in place: the same attachment sees the new frame.
        let frame2: Vec<u8> = (13..=24).collect();
        writer.write(&frame2).unwrap();
        assert_eq!(reader.snapshot().unwrap(), frame2);
    }

    #[test]
    fn writer_rejects_wrong_size_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FrameBufferWriter::create(&buffer_path(&dir), 12).unwrap();
        assert!(matches!(
            writer.write(&[0u8; 5]),
            Err(FrameBufferError::FrameSizeMismatch { .. })
        ));
    }

    #[test]
    fn reader_rejects_wrong_size_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = buffer_path(&dir);
        let _writer = FrameBufferWriter::create(&path, 12).unwrap();
        assert!(matches!(
            FrameBufferReader::attach(&path, 24),
            Err(FrameBufferError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn unlink_makes_existing_attachment_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = buffer_path(&dir);
        let mut writer = FrameBufferWriter::create(&path, 12).unwrap();
        writer.write(&[7u8; 12]).unwrap();
        let reader = FrameBufferReader::attach(&path, 12).unwrap();
        assert_eq!(reader.snapshot().unwrap(), vec![7u8; 12]);

        writer.unlink().unwrap();
        assert!(matches!(
            reader.snapshot(),
            Err(FrameBufferError::Absent(_))
        ));
    }

    #[test]
    fn recreated_buffer_invalidates_stale_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let path = buffer_path(&dir);
        let mut writer = FrameBufferWriter::create(&path, 12).unwrap();
        writer.write(&[1u8; 12]).unwrap();
        let reader = FrameBufferReader::attach(&path, 12).unwrap();

        // Capture process restarts: old file unlinked, new one created.
        writer.unlink().unwrap();
        let mut writer2 = FrameBufferWriter::create(&path, 12).unwrap();
        writer2.write(&[2u8; 12]).unwrap();

        // The stale mapping must not serve old bytes as if they were live.
        assert!(matches!(
            reader.snapshot(),
            Err(FrameBufferError::Absent(_))
        ));

        // Re-attaching picks up the new instance.
        let reader2 = FrameBufferReader::attach(&path, 12).unwrap();
        assert_eq!(reader2.snapshot().unwrap(), vec![2u8; 12]);
    }

    #[test]
    fn duplicate_create_attaches_to_existing_region() {
        let dir = tempfile::tempdir().unwrap();
        let path = buffer_path(&dir);
        let mut first = FrameBufferWriter::create(&path, 12).unwrap();
        first.write(&[9u8; 12]).unwrap();
        // A second create (e.g. racing restart) must not fail.
        let _second = FrameBufferWriter::create(&path, 12).unwrap();
        let reader = FrameBufferReader::attach(&path, 12).unwrap();
        assert_eq!(reader.snapshot().unwrap().len(), 12);
    }
}
