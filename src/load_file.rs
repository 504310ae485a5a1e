use std::path::Path;

use crate::error::{Error, Result};

/// Reads a text file line by line and returns the lines joined with `\n`.
///
/// Every line, including the last one, is terminated by `\n`. Bytes that are
/// not valid UTF-8 are replaced, not rejected.
pub fn load_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| Error::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut content = String::with_capacity(bytes.len() + 1);
    for line in String::from_utf8_lossy(&bytes).lines() {
        content.push_str(line);
        content.push('\n');
    }
    log::debug!("loaded {} ({} bytes)", path.display(), content.len());
    Ok(content)
}
