//! Directory listing
//!
//! Lists the entries at a given path in the archive, without recursing into
//! the directories listed there.
//!
//! ```text
//! dir/          list("dir/") lists "dir/a", "dir/b", "dir/c/" and "dir/e/"
//!  ├── a
//!  ├── b
//!  ├── c/
//!  │   └── d
//!  └── e/
//! ```

use std::io::{Read, Seek};

use tracing::debug;

use crate::archive::{Archive, strip_slash};
use crate::error::{Error, Result};
use crate::header::EntryKind;

impl<R: Read + Seek> Archive<R> {
    /// Immediate children of the directory at `path`, in archive order.
    ///
    /// One trailing slash on `path` is ignored. If the entry at `path` is a
    /// symlink or hardlink, its target is listed instead. A directory with no
    /// entry of its own but with children in the archive is listed too.
    /// Fails with [`Error::NotFound`] if no such directory exists or `path`
    /// names something other than a directory.
    pub fn list(&mut self, path: &str) -> Result<Vec<String>> {
        self.list_children(path, None)
    }

    /// Like [`list`](Self::list), but stops scanning once `capacity`
    /// children have been collected
    pub fn list_capped(&mut self, path: &str, capacity: usize) -> Result<Vec<String>> {
        self.list_children(path, Some(capacity))
    }

    fn list_children(&mut self, path: &str, capacity: Option<usize>) -> Result<Vec<String>> {
        self.scoped(|archive| {
            let mut dir = strip_slash(path).to_string();
            let mut hops = 0;
            'restart: loop {
                let mut found = false;
                let mut children = Vec::new();
                while let Some(header) = archive.next_header()? {
                    let own = strip_slash(&header.name);
                    if own == dir {
                        match header.kind() {
                            kind if kind.is_link() => {
                                archive.hop(&mut hops, path)?;
                                debug!("listing {dir:?} through link to {:?}", header.linkname);
                                dir = strip_slash(&header.linkname).to_string();
                                archive.rewind()?;
                                continue 'restart;
                            }
                            EntryKind::Directory => found = true,
                            _ => {
                                debug!("{:?} is not a directory", header.name);
                                return Err(Error::NotFound(path.to_string()));
                            }
                        }
                    } else if parent(own) == dir {
                        found = true;
                        if capacity.is_none_or(|cap| children.len() < cap) {
                            children.push(header.name.clone());
                        }
                    }
                    if found && capacity == Some(children.len()) {
                        break;
                    }
                    archive.skip_data(&header)?;
                }
                if !found {
                    return Err(Error::NotFound(path.to_string()));
                }
                debug!("{dir:?} has {} listed children", children.len());
                return Ok(children);
            }
        })
    }
}

/// Directory component of an entry name with its trailing slash removed
fn parent(name: &str) -> &str {
    name.rfind('/').map_or("", |i| &name[..i])
}
