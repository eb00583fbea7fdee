//! Read-only access to ustar (POSIX tar) archives, in place
//!
//! Entries are looked up by scanning the archive headers directly from any
//! `Read + Seek` stream; nothing is extracted and nothing is cached between
//! queries.
//!
//! # Usage
//!
//! ## Validating an archive
//!
//! ```no_run
//! use std::fs::File;
//! use ustar_light::Archive;
//!
//! let mut archive = Archive::new(File::open("archive.tar")?)?;
//! let count = archive.check_archive()?;
//! println!("{count} valid headers");
//! # Ok::<(), ustar_light::Error>(())
//! ```
//!
//! ## Looking up entries
//!
//! ```no_run
//! # use std::fs::File;
//! # use ustar_light::Archive;
//! # let mut archive = Archive::new(File::open("archive.tar")?)?;
//! if archive.is_dir("dir/")? {
//!     for child in archive.list("dir/")? {
//!         println!("{child}");
//!     }
//! }
//! // Symlinks are followed when listing and reading
//! let resolved = archive.resolve("link")?;
//! # Ok::<(), ustar_light::Error>(())
//! ```
//!
//! ## Reading files
//!
//! ```no_run
//! # use std::fs::File;
//! # use ustar_light::Archive;
//! # let mut archive = Archive::new(File::open("archive.tar")?)?;
//! // Whole file
//! let data = archive.read_file("dir/a", 0)?;
//!
//! // In pieces, into a fixed buffer
//! let mut buf = [0u8; 4096];
//! let mut offset = 0;
//! loop {
//!     let read = archive.read_file_into("dir/a", offset, &mut buf)?;
//!     // use &buf[..read.copied]
//!     offset += read.copied as u64;
//!     if read.is_complete() {
//!         break;
//!     }
//! }
//! # Ok::<(), ustar_light::Error>(())
//! ```

pub mod archive;
pub mod cursor;
pub mod error;
pub mod header;
mod list;
mod read;

#[cfg(test)]
pub(crate) mod testutil;

pub use archive::{Archive, DEFAULT_MAX_LINK_HOPS, Entries};
pub use error::{Error, Result};
pub use header::{BLOCK_SIZE, EntryKind, Header};
pub use read::FileRead;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{TarBuilder, sample};
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn file_backed_archive() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&sample()).unwrap();
        let file = File::open(tmp.path()).unwrap();

        let mut archive = Archive::new(file).unwrap();
        assert_eq!(archive.check_archive().unwrap(), 11);
        assert!(archive.is_dir("dir/").unwrap());
        assert_eq!(
            archive.list("dir_link").unwrap(),
            ["dir/a", "dir/b", "dir/c/", "dir/e/"]
        );
        assert_eq!(archive.read_file("a_link", 0).unwrap(), b"hello");
    }

    #[test]
    fn operations_compose_on_one_handle() {
        let tar = TarBuilder::new()
            .dir("dir/")
            .file("dir/a", b"hello")
            .finish();
        let mut archive = Archive::new(std::io::Cursor::new(tar)).unwrap();

        // Each query leaves the stream where the next one expects it
        let mut buf = [0u8; 10];
        for _ in 0..2 {
            assert_eq!(archive.check_archive().unwrap(), 2);
            assert!(archive.exists("dir/a").unwrap());
            assert!(archive.is_dir("dir/").unwrap());
            assert_eq!(archive.list("dir/").unwrap(), ["dir/a"]);
            let read = archive.read_file_into("dir/a", 0, &mut buf).unwrap();
            assert_eq!((read.copied, read.remaining), (5, 0));
            assert_eq!(&buf[..5], b"hello");
        }
        // Errors restore the position as well
        assert!(archive.read_file_into("dir/a", 9, &mut buf).is_err());
        assert!(archive.list("dir/a").is_err());
        assert_eq!(archive.check_archive().unwrap(), 2);
    }
}
