//! Block cursor: moves a stream from one header block to the next

use std::io::{self, ErrorKind, Read, Seek, SeekFrom};

use crate::header::{BLOCK_SIZE, Header};

/// Round `size` up to the next multiple of the block size
pub fn padded_len(size: u64) -> u64 {
    let block = BLOCK_SIZE as u64;
    size.div_ceil(block).saturating_mul(block)
}

/// Read one full block.
///
/// Returns `None` when the stream ends before a whole block is available;
/// a short tail is treated as the end of the archive.
pub(crate) fn read_block<R: Read>(reader: &mut R) -> io::Result<Option<[u8; BLOCK_SIZE]>> {
    let mut block = [0u8; BLOCK_SIZE];
    let mut filled = 0;
    while filled < BLOCK_SIZE {
        match reader.read(&mut block[filled..]) {
            Ok(0) => return Ok(None),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(Some(block))
}

/// Decode the header at the current position.
///
/// Returns `None` at the end of the archive: a short read or a null name.
pub(crate) fn next_header<R: Read>(reader: &mut R) -> io::Result<Option<Header>> {
    let Some(block) = read_block(reader)? else {
        return Ok(None);
    };
    if block[0] == 0 {
        return Ok(None);
    }
    Ok(Some(Header::from_bytes(&block)))
}

/// Skip the padded data region of `header`, landing on the next header
pub(crate) fn skip_data<R: Seek>(reader: &mut R, header: &Header) -> io::Result<()> {
    skip_bytes(reader, header.padded_size())
}

pub(crate) fn skip_bytes<R: Seek>(reader: &mut R, len: u64) -> io::Result<()> {
    if len == 0 {
        return Ok(());
    }
    let delta = i64::try_from(len)
        .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "skip length exceeds i64"))?;
    reader.seek(SeekFrom::Current(delta))?;
    Ok(())
}
