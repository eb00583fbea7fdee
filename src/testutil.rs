//! Fixture archives for unit tests

use crate::header::{BLOCK_SIZE, CHKSUM, MAGIC, VERSION, calc_checksum};

pub const MTIME: u64 = 1_700_000_000;

fn put_str(block: &mut [u8], at: usize, max: usize, value: &str) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(max);
    block[at..at + len].copy_from_slice(&bytes[..len]);
}

fn put_octal(block: &mut [u8], at: usize, width: usize, value: u64) {
    let text = format!("{:0w$o}\0", value, w = width - 1);
    block[at..at + width].copy_from_slice(text.as_bytes());
}

/// Build one well-formed ustar header block
pub fn header_block(name: &str, typeflag: u8, linkname: &str, size: u64) -> [u8; BLOCK_SIZE] {
    let mut data = [0u8; BLOCK_SIZE];
    put_str(&mut data, 0, 100, name);
    let mode = if typeflag == b'5' { 0o755 } else { 0o644 };
    put_octal(&mut data, 100, 8, mode);
    put_octal(&mut data, 108, 8, 1000);
    put_octal(&mut data, 116, 8, 1000);
    put_octal(&mut data, 124, 12, size);
    put_octal(&mut data, 136, 12, MTIME);
    data[156] = typeflag;
    put_str(&mut data, 157, 100, linkname);
    data[257..263].copy_from_slice(MAGIC);
    data[263..265].copy_from_slice(VERSION);
    put_str(&mut data, 265, 32, "user");
    put_str(&mut data, 297, 32, "group");

    let checksum = calc_checksum(&data);
    let checksum_str = format!("{:06o}\0 ", checksum);
    data[CHKSUM].copy_from_slice(checksum_str.as_bytes());
    data
}

/// Appends entries in order; `finish` adds the two terminating zero blocks
#[derive(Default)]
pub struct TarBuilder {
    data: Vec<u8>,
}

impl TarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(self, name: &str) -> Self {
        self.entry(name, b'5', "", b"")
    }

    pub fn file(self, name: &str, content: &[u8]) -> Self {
        self.entry(name, b'0', "", content)
    }

    pub fn symlink(self, name: &str, target: &str) -> Self {
        self.entry(name, b'2', target, b"")
    }

    pub fn hardlink(self, name: &str, target: &str) -> Self {
        self.entry(name, b'1', target, b"")
    }

    pub fn entry(mut self, name: &str, typeflag: u8, linkname: &str, content: &[u8]) -> Self {
        let header = header_block(name, typeflag, linkname, content.len() as u64);
        self.data.extend_from_slice(&header);
        self.data.extend_from_slice(content);
        let padding = (BLOCK_SIZE - (content.len() % BLOCK_SIZE)) % BLOCK_SIZE;
        self.data.extend_from_slice(&vec![0u8; padding]);
        self
    }

    /// Append a block verbatim, for corrupted fixtures
    pub fn raw(mut self, block: &[u8; BLOCK_SIZE]) -> Self {
        self.data.extend_from_slice(block);
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.data.extend_from_slice(&[0u8; BLOCK_SIZE * 2]);
        self.data
    }

    /// Archive without terminating blocks
    pub fn finish_unterminated(self) -> Vec<u8> {
        self.data
    }
}

/// The tree used throughout the tests:
///
/// ```text
/// dir/
///  ├── a        "hello"
///  ├── b        600 bytes
///  ├── c/
///  │   └── d    "deep"
///  └── e/
/// dir_link -> dir
/// a_link -> dir/a
/// chain3 -> chain2 -> chain1 -> dir/b
/// ```
pub fn sample() -> Vec<u8> {
    TarBuilder::new()
        .dir("dir/")
        .file("dir/a", b"hello")
        .file("dir/b", &sample_b())
        .dir("dir/c/")
        .file("dir/c/d", b"deep")
        .dir("dir/e/")
        .symlink("dir_link", "dir")
        .symlink("a_link", "dir/a")
        .symlink("chain1", "dir/b")
        .symlink("chain2", "chain1")
        .symlink("chain3", "chain2")
        .finish()
}

pub fn sample_b() -> Vec<u8> {
    (0..600u32).map(|i| (i % 251) as u8).collect()
}
