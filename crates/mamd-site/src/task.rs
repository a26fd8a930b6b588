//! Per-file build task.

use std::path::{Component, Path, PathBuf};

/// A discovered source file with its output location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileTask {
    /// Source file path.
    pub source: PathBuf,
    /// Directory of the source relative to the input root.
    pub rel_dir: PathBuf,
    /// Output directory (`output_root/rel_dir`).
    pub out_dir: PathBuf,
    /// File name without extension, used as page title and output stem.
    pub title: String,
    /// Number of directories between the input root and the source.
    pub depth: usize,
    /// Relative prefix from the page back to the output root, e.g. `../../`.
    pub css_offset: String,
}

impl FileTask {
    /// Build the task for `source`, which must live under `input_root`.
    ///
    /// Returns `None` if `source` is outside `input_root` or has no file name.
    #[must_use]
    pub fn new(input_root: &Path, output_root: &Path, source: &Path) -> Option<Self> {
        let rel_dir = source
            .parent()?
            .strip_prefix(input_root)
            .ok()?
            .to_path_buf();
        let title = source.file_stem()?.to_string_lossy().into_owned();
        let depth = rel_dir
            .components()
            .filter(|component| matches!(component, Component::Normal(_)))
            .count();

        Some(Self {
            source: source.to_path_buf(),
            out_dir: output_root.join(&rel_dir),
            rel_dir,
            title,
            depth,
            css_offset: "../".repeat(depth),
        })
    }

    /// Path of the generated page.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.html", self.title))
    }
}
