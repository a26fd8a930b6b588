//! Source tree traversal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Collect files under `root` whose extension is `extension`.
///
/// The walk is depth-first with the entries of each directory visited in
/// file-name order, so the result is deterministic. Entries that are neither
/// directories nor regular files are skipped.
///
/// # Errors
///
/// Returns the first I/O error hit while listing a directory.
pub fn scan_sources(root: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    visit(root, extension, &mut sources)?;
    Ok(sources)
}

fn visit(dir: &Path, extension: &str, sources: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            visit(&path, extension, sources)?;
        } else if file_type.is_file()
            && path.extension().is_some_and(|ext| ext == extension)
        {
            sources.push(path);
        }
    }
    Ok(())
}
