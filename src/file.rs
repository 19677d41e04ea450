// src/file.rs

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(std::io::Error::other(format!("Path exists but is not a directory: {}", dir.display())).into());
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

/// Create `path`'s parent directory if it has one.
pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent),
        _ => Ok(()),
    }
}

/// `<path>.tmp`, next to `path`.
pub fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize to a temp sibling, sync, then rename over `path`.
/// Readers see either the old file or the complete new one.
pub fn write_json_replace<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    ensure_parent(path)?;
    let tmp = tmp_sibling(path);
    {
        let mut out = BufWriter::new(File::create(&tmp)?);
        if pretty {
            serde_json::to_writer_pretty(&mut out, value)?;
        } else {
            serde_json::to_writer(&mut out, value)?;
        }
        out.flush()?;
        out.get_ref().sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_file_as_directory() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("plain");
        fs::write(&f, "x").unwrap();
        assert!(ensure_directory(&f).is_err());
        assert!(ensure_parent(&f.join("child")).is_err());
    }

    #[test]
    fn tmp_sibling_appends_suffix() {
        assert_eq!(tmp_sibling(Path::new("d/a.json")), PathBuf::from("d/a.json.tmp"));
    }
}
