//! Archive handle, validation and entry lookups
//!
//! Every query scans the archive from its first header. The stream is
//! rewound to the archive start before each operation and again before it
//! returns, on success and on error, so queries compose freely on one handle.

use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, trace, warn};

use crate::cursor;
use crate::error::{Error, Result};
use crate::header::{EntryKind, Header};

/// Default bound on symlink/hardlink hops during resolution
pub const DEFAULT_MAX_LINK_HOPS: usize = 16;

/// Read-only view of a ustar archive stored in `R`.
///
/// The position of `R` when the archive is created is taken as the start of
/// the archive.
#[derive(Debug)]
pub struct Archive<R> {
    inner: R,
    start: u64,
    max_link_hops: usize,
}

impl<R: Read + Seek> Archive<R> {
    /// Wrap a stream positioned at the first header of an archive
    pub fn new(mut inner: R) -> Result<Self> {
        let start = inner.stream_position()?;
        Ok(Self {
            inner,
            start,
            max_link_hops: DEFAULT_MAX_LINK_HOPS,
        })
    }

    /// Set how many links `resolve`, `list` and `read_file` follow before
    /// giving up with [`Error::TooManyLinks`]
    pub fn with_max_link_hops(mut self, hops: usize) -> Self {
        self.max_link_hops = hops;
        self
    }

    pub fn max_link_hops(&self) -> usize {
        self.max_link_hops
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Give the stream back, positioned at the archive start
    pub fn into_inner(self) -> R {
        self.inner
    }

    pub(crate) fn rewind(&mut self) -> Result<()> {
        self.inner.seek(SeekFrom::Start(self.start))?;
        Ok(())
    }

    /// Run `op` from the archive start and rewind afterwards whatever the
    /// outcome. An error from `op` takes precedence over a failed rewind.
    pub(crate) fn scoped<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.rewind()?;
        let outcome = op(self);
        let restored = self.rewind();
        let value = outcome?;
        restored?;
        Ok(value)
    }

    pub(crate) fn next_header(&mut self) -> Result<Option<Header>> {
        let header = cursor::next_header(&mut self.inner)?;
        if let Some(h) = &header {
            trace!("header {:?} kind={:?} size={}", h.name, h.kind(), h.size);
        }
        Ok(header)
    }

    pub(crate) fn skip_data(&mut self, header: &Header) -> Result<()> {
        cursor::skip_data(&mut self.inner, header)?;
        Ok(())
    }

    pub(crate) fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Scan forward from the current position for the first header that
    /// satisfies `pred`. On a match the stream is left at the start of the
    /// entry's data.
    pub(crate) fn scan_for(
        &mut self,
        mut pred: impl FnMut(&Header) -> bool,
    ) -> Result<Option<Header>> {
        while let Some(header) = self.next_header()? {
            if pred(&header) {
                return Ok(Some(header));
            }
            self.skip_data(&header)?;
        }
        Ok(None)
    }

    /// Count one more link hop while resolving `path`
    pub(crate) fn hop(&self, hops: &mut usize, path: &str) -> Result<()> {
        *hops += 1;
        if *hops > self.max_link_hops {
            debug!("giving up on {path:?} after {} hops", self.max_link_hops);
            return Err(Error::TooManyLinks {
                path: path.to_string(),
                hops: self.max_link_hops,
            });
        }
        Ok(())
    }

    /// Checks whether the archive is valid.
    ///
    /// Each non-null header of a valid archive has the magic `"ustar\0"`,
    /// the version `"00"` and a correct checksum, tested in that order.
    /// Returns the number of headers, or the first violation found.
    pub fn check_archive(&mut self) -> Result<usize> {
        let result = self.scoped(|archive| {
            let mut count = 0;
            while let Some(header) = archive.next_header()? {
                validate(&header, count)?;
                count += 1;
                archive.skip_data(&header)?;
            }
            Ok(count)
        });
        match &result {
            Ok(count) => debug!("archive valid, {count} headers"),
            Err(e) => debug!("archive invalid: {e}"),
        }
        result
    }

    /// First header named exactly `path`, without following links
    pub fn find(&mut self, path: &str) -> Result<Option<Header>> {
        self.scoped(|archive| archive.scan_for(|h| h.name == path))
    }

    /// True if some entry is named exactly `path`
    pub fn exists(&mut self, path: &str) -> Result<bool> {
        self.matches(path, |_| true)
    }

    /// True if an entry named `path` is a directory
    pub fn is_dir(&mut self, path: &str) -> Result<bool> {
        self.matches(path, EntryKind::is_dir)
    }

    /// True if an entry named `path` is a regular file
    pub fn is_file(&mut self, path: &str) -> Result<bool> {
        self.matches(path, EntryKind::is_file)
    }

    /// True if an entry named `path` is a symlink
    pub fn is_symlink(&mut self, path: &str) -> Result<bool> {
        self.matches(path, |kind| kind == EntryKind::Symlink)
    }

    fn matches(&mut self, path: &str, kind: impl Fn(EntryKind) -> bool) -> Result<bool> {
        self.scoped(|archive| {
            let found = archive.scan_for(|h| h.name == path && kind(h.kind()))?;
            Ok(found.is_some())
        })
    }

    /// Follow symlinks and hardlinks from `path` to the entry they lead to.
    ///
    /// The first lookup is exact; a link target matches an entry with or
    /// without one trailing slash, so `dir_link -> dir` finds `dir/`.
    /// Returns `None` if `path` or a link target is missing.
    pub fn resolve(&mut self, path: &str) -> Result<Option<Header>> {
        self.scoped(|archive| {
            let mut target = path.to_string();
            let mut hops = 0;
            loop {
                let found = if hops == 0 {
                    archive.scan_for(|h| h.name == target)?
                } else {
                    archive.scan_for(|h| same_path(&h.name, &target))?
                };
                match found {
                    Some(header) if header.kind().is_link() => {
                        archive.hop(&mut hops, path)?;
                        debug!("{target:?} links to {:?}", header.linkname);
                        target = header.linkname;
                        archive.rewind()?;
                    }
                    other => return Ok(other),
                }
            }
        })
    }

    /// Lazily iterate over every header in archive order.
    ///
    /// The stream is rewound when the iterator is dropped.
    pub fn entries(&mut self) -> Result<Entries<'_, R>> {
        self.rewind()?;
        Ok(Entries {
            archive: self,
            pending: None,
            done: false,
        })
    }
}

fn validate(header: &Header, index: usize) -> Result<()> {
    if !header.has_valid_magic() {
        return Err(Error::InvalidMagic {
            index,
            name: header.name.clone(),
            found: header.magic,
        });
    }
    if !header.has_valid_version() {
        return Err(Error::InvalidVersion {
            index,
            name: header.name.clone(),
            found: header.version,
        });
    }
    if !header.verify_checksum() {
        return Err(Error::ChecksumMismatch {
            index,
            name: header.name.clone(),
            stored: header.checksum,
            computed: header.computed_checksum(),
        });
    }
    Ok(())
}

/// Strip exactly one trailing slash
pub(crate) fn strip_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

pub(crate) fn same_path(name: &str, target: &str) -> bool {
    strip_slash(name) == strip_slash(target)
}

/// Iterator over the headers of an [`Archive`], see [`Archive::entries`]
#[derive(Debug)]
pub struct Entries<'a, R: Read + Seek> {
    archive: &'a mut Archive<R>,
    pending: Option<Header>,
    done: bool,
}

impl<R: Read + Seek> Iterator for Entries<'_, R> {
    type Item = Result<Header>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(previous) = self.pending.take() {
            if let Err(e) = self.archive.skip_data(&previous) {
                self.done = true;
                return Some(Err(e));
            }
        }
        match self.archive.next_header() {
            Ok(Some(header)) => {
                self.pending = Some(header.clone());
                Some(Ok(header))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read + Seek> Drop for Entries<'_, R> {
    fn drop(&mut self) {
        if let Err(e) = self.archive.rewind() {
            warn!("failed to rewind archive after iteration: {e}");
        }
    }
}
