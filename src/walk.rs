use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::CollectorConfig;

/// Build the standard exclusion predicate: reject dot-directories and any
/// directory whose name is on the configured exclusion list.
pub fn default_exclusion(excluded_dirs: &[String]) -> impl Fn(&Path) -> bool + '_ {
    move |path: &Path| {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        name.starts_with('.') || excluded_dirs.iter().any(|dir| dir == &name)
    }
}

fn has_suffix(path: &Path, suffixes: &[String]) -> bool {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

fn is_ignored(path: &Path, ignored_filenames: &[String]) -> bool {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    ignored_filenames.iter().any(|ignored| ignored == &name)
}

/// Find candidate source files under the project root.
///
/// Entries directly at the root are matched non-recursively so that excluded
/// top-level directories are filtered before any descent. Each surviving
/// top-level subdirectory is then walked recursively. The result is
/// deduplicated; an empty result is valid.
pub fn find_files(config: &CollectorConfig, exclude: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    let mut found: BTreeSet<PathBuf> = BTreeSet::new();
    let mut sub_dirs: Vec<PathBuf> = Vec::new();

    let entries = match fs::read_dir(&config.project_root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(root = %config.project_root.display(), %err, "Could not read project root");
            return Vec::new();
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if !exclude(&path) {
                sub_dirs.push(path);
            }
        } else if has_suffix(&path, &config.suffixes) && !is_ignored(&path, &config.ignored_filenames)
        {
            found.insert(path);
        }
    }

    for dir in &sub_dirs {
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if entry.file_type().is_file()
                && has_suffix(path, &config.suffixes)
                && !is_ignored(path, &config.ignored_filenames)
            {
                found.insert(path.to_path_buf());
            }
        }
    }

    info!(
        files = found.len(),
        dirs = sub_dirs.len(),
        "Collected candidate files"
    );
    found.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_exclusion_rejects_dot_and_listed_dirs() {
        let excluded = vec!["target".to_string()];
        let exclude = default_exclusion(&excluded);
        assert!(exclude(&PathBuf::from("/p/.git")));
        assert!(exclude(&PathBuf::from("/p/target")));
        assert!(!exclude(&PathBuf::from("/p/src")));
    }

    #[test]
    fn test_has_suffix_matches_full_suffix() {
        let suffixes = vec![".rs".to_string()];
        assert!(has_suffix(&PathBuf::from("/p/main.rs"), &suffixes));
        assert!(!has_suffix(&PathBuf::from("/p/main.rst"), &suffixes));
        assert!(!has_suffix(&PathBuf::from("/p/Makefile"), &suffixes));
    }
}
