//! Stylesheet asset copy.

use std::fs;
use std::io;
use std::path::Path;

/// Outcome of [`copy_stylesheet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StylesheetCopy {
    /// The stylesheet was written to the output root.
    Copied,
    /// The target exists and is not older than the source.
    UpToDate,
    /// Source and target are the same file.
    SameFile,
}

/// Copy `source` into `output_root`, keeping its file name.
///
/// The copy happens only when the target is missing or older than the
/// source, and never onto the source itself.
///
/// # Errors
///
/// Returns an I/O error if the source is missing or the copy fails.
pub fn copy_stylesheet(source: &Path, output_root: &Path) -> io::Result<StylesheetCopy> {
    let file_name = source.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("stylesheet path has no file name: {}", source.display()),
        )
    })?;
    let target = output_root.join(file_name);
    let source_meta = fs::metadata(source)?;

    let outcome = match fs::metadata(&target) {
        Ok(_) if fs::canonicalize(source)? == fs::canonicalize(&target)? => StylesheetCopy::SameFile,
        Ok(target_meta) if target_meta.modified()? >= source_meta.modified()? => {
            StylesheetCopy::UpToDate
        }
        Ok(_) => {
            fs::copy(source, &target)?;
            StylesheetCopy::Copied
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::copy(source, &target)?;
            StylesheetCopy::Copied
        }
        Err(err) => return Err(err),
    };

    tracing::debug!(
        source = %source.display(),
        target = %target.display(),
        ?outcome,
        "Stylesheet"
    );
    Ok(outcome)
}
