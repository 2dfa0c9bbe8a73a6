//! Byte-sink output: write a path → contents map under a directory.
//!
//! The core never interprets file contents; this is the final hand-off for
//! whatever a platform compiler produced from the tree.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Write every `relative path → bytes` entry under `dir`, creating parent
/// directories as needed. Existing files are overwritten.
pub fn write(dir: &Path, files: &BTreeMap<String, Vec<u8>>) -> io::Result<()> {
    for (relative, contents) in files {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
