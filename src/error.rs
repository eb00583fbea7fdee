//! Error types for archive validation and lookups

use thiserror::Error;

/// Result type for archive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Archive error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error from the underlying stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Header magic is not `"ustar\0"`
    #[error("Invalid magic in header {index} ({name:?}): got {found:?}")]
    InvalidMagic {
        index: usize,
        name: String,
        found: [u8; 6],
    },

    /// Header version is not `"00"`
    #[error("Invalid version in header {index} ({name:?}): got {found:?}")]
    InvalidVersion {
        index: usize,
        name: String,
        found: [u8; 2],
    },

    /// Stored checksum disagrees with the byte sum of the header
    #[error(
        "Checksum mismatch in header {index} ({name:?}): stored {stored:o}, computed {computed:o}"
    )]
    ChecksumMismatch {
        index: usize,
        name: String,
        stored: u64,
        computed: u64,
    },

    /// No entry of the requested kind at this path
    #[error("No such entry: {0}")]
    NotFound(String),

    /// Read offset lies past the end of the file
    #[error("Offset {offset} is past the end of {path} ({size} bytes)")]
    OffsetOutOfRange {
        path: String,
        offset: u64,
        size: u64,
    },

    /// Link chain longer than the configured maximum, or cyclic
    #[error("Too many links resolving {path}: gave up after {hops} hops")]
    TooManyLinks { path: String, hops: usize },
}

impl Error {
    /// True for the three format violations reported by `check_archive`
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic { .. } | Self::InvalidVersion { .. } | Self::ChecksumMismatch { .. }
        )
    }
}
