use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::Result;

/// File extensions, lowercase, recognized as Chapter 10 recordings.
pub const RECORDING_EXTENSIONS: [&str; 2] = ["c10", "ch10"];

fn is_recording(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| RECORDING_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

fn walk_dir(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<Vec<PathBuf>>>()?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            walk_dir(&path, found)?;
        } else if is_recording(&path) {
            trace!(path = %path.display(), "found recording");
            found.push(path);
        }
    }
    Ok(())
}

/// Expand `paths` into a list of recordings.
///
/// Paths that are not directories are provided as-is, regardless of extension.
/// Directories are walked recursively for files with a recording extension (see
/// [RECORDING_EXTENSIONS]), in sorted order.
///
/// # Errors
/// Any ``std::io::Error`` reading a directory.
pub fn find_recordings<P>(paths: &[P]) -> Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
{
    let mut found = Vec::default();
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            walk_dir(path, &mut found)?;
        } else {
            found.push(path.to_path_buf());
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_recordings_recursively() {
        let tmpdir = tempfile::tempdir().unwrap();
        let root = tmpdir.path();
        fs::create_dir(root.join("sub")).unwrap();
        for name in ["b.ch10", "a.C10", "notes.txt", "sub/c.c10"] {
            fs::write(root.join(name), b"").unwrap();
        }

        let found = find_recordings(&[root]).unwrap();

        assert_eq!(
            found,
            vec![root.join("a.C10"), root.join("b.ch10"), root.join("sub/c.c10")]
        );
    }

    #[test]
    fn files_are_passed_through() {
        let found = find_recordings(&["data.bin", "other"]).unwrap();
        assert_eq!(found, vec![PathBuf::from("data.bin"), PathBuf::from("other")]);
    }
}
