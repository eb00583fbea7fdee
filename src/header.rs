//! ustar header codec
//!
//! # Usage
//!
//! ```rust
//! use ustar_light::header::{Header, EntryKind, BLOCK_SIZE};
//!
//! // Parse header from a 512-byte block
//! let block = [0u8; BLOCK_SIZE];
//! let header = Header::from_bytes(&block);
//!
//! // An all-null block marks the end of the archive
//! assert!(header.is_terminator());
//!
//! // Classify the entry
//! match header.kind() {
//!     EntryKind::Directory => println!("{} is a directory", header.name),
//!     kind if kind.is_file() => println!("{} holds {} bytes", header.name, header.size),
//!     _ => {}
//! }
//! ```

use chrono::{DateTime, Utc};
use std::ops::Range;

/// Size of a header block and of the data padding unit
pub const BLOCK_SIZE: usize = 512;

/// Magic tag of a ustar header, terminator included
pub const MAGIC: &[u8; 6] = b"ustar\0";

/// Version tag of a ustar header, no terminator
pub const VERSION: &[u8; 2] = b"00";

const NAME: Range<usize> = 0..100;
const MODE: Range<usize> = 100..108;
const UID: Range<usize> = 108..116;
const GID: Range<usize> = 116..124;
const SIZE: Range<usize> = 124..136;
const MTIME: Range<usize> = 136..148;
pub(crate) const CHKSUM: Range<usize> = 148..156;
const TYPEFLAG: usize = 156;
const LINKNAME: Range<usize> = 157..257;
const MAGIC_FIELD: Range<usize> = 257..263;
const VERSION_FIELD: Range<usize> = 263..265;
const UNAME: Range<usize> = 265..297;
const GNAME: Range<usize> = 297..329;
const DEVMAJOR: Range<usize> = 329..337;
const DEVMINOR: Range<usize> = 337..345;
const PREFIX: Range<usize> = 345..500;

/// Kind of entry, from the header typeflag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// `'0'`
    Regular,
    /// `'\0'`, the pre-POSIX spelling of a regular file
    AltRegular,
    /// `'1'`
    Hardlink,
    /// `'2'`
    Symlink,
    /// `'5'`
    Directory,
    /// Any other typeflag; never matched by the predicates
    Other(u8),
}

impl EntryKind {
    pub fn from_typeflag(flag: u8) -> Self {
        match flag {
            b'0' => Self::Regular,
            0 => Self::AltRegular,
            b'1' => Self::Hardlink,
            b'2' => Self::Symlink,
            b'5' => Self::Directory,
            other => Self::Other(other),
        }
    }

    /// Regular file, in either spelling
    pub fn is_file(self) -> bool {
        matches!(self, Self::Regular | Self::AltRegular)
    }

    /// Symlink or hardlink; both carry a target in `linkname`
    pub fn is_link(self) -> bool {
        matches!(self, Self::Symlink | Self::Hardlink)
    }

    pub fn is_dir(self) -> bool {
        self == Self::Directory
    }
}

/// Decoded ustar header.
///
/// Headers are transient: the scanners decode one, act on it and drop it
/// before reading the next block.
#[derive(Debug, Clone)]
pub struct Header {
    pub name: String,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub mtime: u64,
    /// Value stored in the chksum field
    pub checksum: u64,
    pub typeflag: u8,
    pub linkname: String,
    pub magic: [u8; 6],
    pub version: [u8; 2],
    pub uname: String,
    pub gname: String,
    pub devmajor: u32,
    pub devminor: u32,
    pub prefix: String,
    computed_checksum: u64,
}

impl Header {
    /// Parse a Header from a 512-byte block
    pub fn from_bytes(data: &[u8; BLOCK_SIZE]) -> Self {
        parse_tar_header(data)
    }

    pub fn kind(&self) -> EntryKind {
        EntryKind::from_typeflag(self.typeflag)
    }

    /// True when the name starts with a null byte, i.e. end of archive
    pub fn is_terminator(&self) -> bool {
        self.name.is_empty()
    }

    /// Verify the checksum of the header
    /// Returns true if the stored value matches the byte sum of the block
    pub fn verify_checksum(&self) -> bool {
        self.computed_checksum == self.checksum
    }

    /// Byte sum of the block this header was decoded from
    pub fn computed_checksum(&self) -> u64 {
        self.computed_checksum
    }

    pub fn has_valid_magic(&self) -> bool {
        &self.magic == MAGIC
    }

    pub fn has_valid_version(&self) -> bool {
        &self.version == VERSION
    }

    /// Length of the data region including padding to the next block
    pub fn padded_size(&self) -> u64 {
        crate::cursor::padded_len(self.size)
    }

    /// Modification time, if it fits a timestamp
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.mtime).ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

// String fields end at the first null byte, or at the field end when full.
fn read_tar_str(data: &[u8], range: Range<usize>) -> String {
    let field = &data[range];
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn read_tar_bytes<const N: usize>(data: &[u8], range: Range<usize>) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&data[range]);
    out
}

/// Decode an octal numeric field.
///
/// Leading spaces are skipped and digits are consumed up to the first
/// non-octal byte, so `"0000644\0"`, `"   644 "` and `"644\0 "` all read 420.
/// Overflow saturates.
pub fn parse_octal(field: &[u8]) -> u64 {
    field
        .iter()
        .skip_while(|&&b| b == b' ')
        .take_while(|b| (b'0'..=b'7').contains(*b))
        .fold(0u64, |acc, &b| {
            acc.saturating_mul(8).saturating_add(u64::from(b - b'0'))
        })
}

fn read_tar_u32(data: &[u8], range: Range<usize>) -> u32 {
    u32::try_from(parse_octal(&data[range])).unwrap_or(0)
}

fn read_tar_u64(data: &[u8], range: Range<usize>) -> u64 {
    parse_octal(&data[range])
}

fn parse_tar_header(data: &[u8; BLOCK_SIZE]) -> Header {
    Header {
        name: read_tar_str(data, NAME),
        mode: read_tar_u32(data, MODE),
        uid: read_tar_u32(data, UID),
        gid: read_tar_u32(data, GID),
        size: read_tar_u64(data, SIZE),
        mtime: read_tar_u64(data, MTIME),
        checksum: read_tar_u64(data, CHKSUM),
        typeflag: data[TYPEFLAG],
        linkname: read_tar_str(data, LINKNAME),
        magic: read_tar_bytes(data, MAGIC_FIELD),
        version: read_tar_bytes(data, VERSION_FIELD),
        uname: read_tar_str(data, UNAME),
        gname: read_tar_str(data, GNAME),
        devmajor: read_tar_u32(data, DEVMAJOR),
        devminor: read_tar_u32(data, DEVMINOR),
        prefix: read_tar_str(data, PREFIX),
        computed_checksum: u64::from(calc_checksum(data)),
    }
}

/// Calc checksum of the header bytes, counting the chksum field as spaces
pub fn calc_checksum(data: &[u8]) -> u32 {
    let Some(block) = data.get(..BLOCK_SIZE) else {
        return 0;
    };
    let blanked = u32::from(b' ') * CHKSUM.len() as u32;
    let stored: u32 = block[CHKSUM].iter().map(|&b| u32::from(b)).sum();
    let total: u32 = block.iter().map(|&b| u32::from(b)).sum();
    total - stored + blanked
}
