//! Path utilities: processed marker and glob root.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

use crate::utils::config::PROCESSED_MARKER;

/// Path the file is renamed to once consumed: same directory, base name prefixed with the marker.
pub fn processed_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    path.parent()
        .unwrap_or(Path::new("."))
        .join(format!("{PROCESSED_MARKER}{name}"))
}

/// Rename `path` to its processed name. Returns the new path.
pub fn mark_processed(path: &Path) -> Result<PathBuf> {
    let dest = processed_path_for(path);
    std::fs::rename(path, &dest).with_context(|| {
        format!(
            "mark processed ({} -> {})",
            path.display(),
            dest.display()
        )
    })?;
    Ok(dest)
}

/// True if the base name already carries the processed marker.
pub fn is_processed(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(PROCESSED_MARKER))
}

fn has_glob_meta(s: &str) -> bool {
    s.contains(['*', '?', '[', ']', '{', '}'])
}

/// Longest leading part of `pattern` without glob metacharacters, excluding the final
/// component when that one is literal too (it names a file, not the root).
///
/// `./data/*.tsv.gz` → `./data`; `logs/2024-*/x.gz` → `logs`; `a.gz` → `.`.
pub fn pattern_root(pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    let components: Vec<Component> = path.components().collect();
    let mut root = PathBuf::new();
    for (i, c) in components.iter().enumerate() {
        let s = c.as_os_str().to_string_lossy();
        if has_glob_meta(&s) || i + 1 == components.len() {
            break;
        }
        root.push(c.as_os_str());
    }
    if root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processed_path_keeps_directory() {
        assert_eq!(
            processed_path_for(Path::new("./data/a.tsv.gz")),
            PathBuf::from("./data/.a.tsv.gz")
        );
        assert_eq!(
            processed_path_for(Path::new("b.tsv.gz")),
            PathBuf::from(".b.tsv.gz")
        );
    }

    #[test]
    fn pattern_root_stops_at_first_glob() {
        assert_eq!(pattern_root("./data/*.tsv.gz"), PathBuf::from("./data"));
        assert_eq!(pattern_root("/srv/in/2024-*/x.gz"), PathBuf::from("/srv/in"));
        assert_eq!(pattern_root("*.gz"), PathBuf::from("."));
        assert_eq!(pattern_root("data/one.tsv.gz"), PathBuf::from("data"));
    }

    #[test]
    fn processed_detection() {
        assert!(is_processed(Path::new("data/.a.tsv.gz")));
        assert!(!is_processed(Path::new("data/a.tsv.gz")));
    }
}
