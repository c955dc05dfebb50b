//! Filesystem helpers.

use std::{
    io::{self, BufWriter, Write},
    path::Path,
};

use tempfile::NamedTempFile;

/// Writes a file so that readers observe either the old or the new contents.
///
/// The contents are produced by `fill` into a temporary file created in the
/// destination's directory, flushed, and then renamed over `path`.
/// If `fill` fails the temporary file is removed and `path` is untouched.
///
/// # Errors
///
/// Returns the first I/O error from creating, filling, or persisting the file.
pub fn write_atomic<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        fill(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;

    Ok(())
}
