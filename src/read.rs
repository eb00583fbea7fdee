//! Ranged reads of file contents

use std::io::{self, ErrorKind, Read, Seek};

use tracing::debug;

use crate::archive::Archive;
use crate::cursor::skip_bytes;
use crate::error::{Error, Result};
use crate::header::{EntryKind, Header};

/// Outcome of [`Archive::read_file_into`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRead {
    /// Bytes written to the destination buffer
    pub copied: usize,
    /// Bytes left between the end of this read and the end of the file.
    /// Zero means the read reached the end of the file.
    pub remaining: u64,
}

impl FileRead {
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Reads a file at a given path in the archive.
    ///
    /// Copies up to `dest.len()` bytes starting `offset` bytes into the file.
    /// Symlinks are followed to the file they point to. Call again with
    /// `offset + copied` while `remaining` is positive to read the rest.
    ///
    /// Fails with [`Error::NotFound`] if `path` is not a file or symlink, and
    /// with [`Error::OffsetOutOfRange`] if `offset` is past the end of the
    /// file. An offset equal to the file size reads nothing and succeeds.
    ///
    /// Hardlinks are not followed: a hardlink path is [`Error::NotFound`].
    /// Use [`resolve`](Self::resolve) to find the entry it points at and read
    /// that name instead.
    pub fn read_file_into(&mut self, path: &str, offset: u64, dest: &mut [u8]) -> Result<FileRead> {
        self.scoped(|archive| {
            let header = archive.seek_file_data(path, offset)?;
            let available = header.size - offset;
            let copied = usize::try_from(available)
                .map_or(dest.len(), |a| a.min(dest.len()));
            archive.inner_mut().read_exact(&mut dest[..copied])?;
            let remaining = available - copied as u64;
            debug!(
                "read {copied} bytes of {:?} at {offset}, {remaining} left",
                header.name
            );
            Ok(FileRead { copied, remaining })
        })
    }

    /// Reads everything from `offset` to the end of the file at `path`
    pub fn read_file(&mut self, path: &str, offset: u64) -> Result<Vec<u8>> {
        self.scoped(|archive| {
            let header = archive.seek_file_data(path, offset)?;
            let available = header.size - offset;
            let mut data = Vec::new();
            archive.inner_mut().take(available).read_to_end(&mut data)?;
            if (data.len() as u64) < available {
                return Err(Error::Io(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("data of {:?} is truncated", header.name),
                )));
            }
            Ok(data)
        })
    }

    /// Locate the file behind `path`, following symlinks, and leave the
    /// stream `offset` bytes into its data.
    fn seek_file_data(&mut self, path: &str, offset: u64) -> Result<Header> {
        let mut target = path.to_string();
        let mut hops = 0;
        loop {
            let found = self.scan_for(|h| {
                h.name == target && (h.kind().is_file() || h.kind() == EntryKind::Symlink)
            })?;
            let Some(header) = found else {
                return Err(Error::NotFound(target));
            };
            if header.kind() == EntryKind::Symlink {
                self.hop(&mut hops, path)?;
                debug!("{target:?} links to {:?}", header.linkname);
                target = header.linkname;
                self.rewind()?;
                continue;
            }
            if offset > header.size {
                return Err(Error::OffsetOutOfRange {
                    path: target,
                    offset,
                    size: header.size,
                });
            }
            skip_bytes(self.inner_mut(), offset)?;
            return Ok(header);
        }
    }
}
