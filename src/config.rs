use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a code tag collection run.
///
/// Constructed once at startup (from a TOML table or [`CollectorConfig::new`])
/// and passed by reference into each stage. There is no ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Project root that scanning and relative display paths are based on
    pub project_root: PathBuf,

    /// Top-level directory names that are never descended into
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// File suffixes considered source text (e.g. ".rs")
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,

    /// Exact filenames dropped from the candidate list
    #[serde(default)]
    pub ignored_filenames: Vec<String>,

    /// Recognized tag kinds, in display order for the summary counts
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,

    /// Literal substring that opts a file out of scanning when found in its
    /// first four lines
    #[serde(default = "default_skip_marker")]
    pub skip_marker: String,

    /// Where the summary artifact is written, relative to the project root
    #[serde(default = "default_summary_path")]
    pub summary_path: PathBuf,
}

fn default_excluded_dirs() -> Vec<String> {
    vec![
        "target".to_string(),
        "build".to_string(),
        "dist".to_string(),
        "node_modules".to_string(),
        "__pycache__".to_string(),
    ]
}

fn default_suffixes() -> Vec<String> {
    vec![".rs".to_string()]
}

fn default_tags() -> Vec<String> {
    ["FIXME", "TODO", "PLANNED", "HACK", "REVIEW", "DEBUG"]
        .iter()
        .map(|tag| tag.to_string())
        .collect()
}

fn default_skip_marker() -> String {
    ":skip_tags:".to_string()
}

fn default_summary_path() -> PathBuf {
    PathBuf::from("docs/CODE_TAG_SUMMARY.md")
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

impl CollectorConfig {
    /// Create a configuration with default settings rooted at `project_root`.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            excluded_dirs: default_excluded_dirs(),
            suffixes: default_suffixes(),
            ignored_filenames: Vec::new(),
            tags: default_tags(),
            skip_marker: default_skip_marker(),
            summary_path: default_summary_path(),
        }
    }

    /// Load a configuration from a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse collector configuration")
    }

    /// Absolute path of the summary artifact.
    pub fn summary_file(&self) -> PathBuf {
        self.project_root.join(&self.summary_path)
    }

    /// Compile the tag-matching pattern from the configured vocabulary.
    ///
    /// The pattern has two named capture groups: `tag` (one of the vocabulary
    /// kinds, followed by `:` or ` -`) and `text` (the free-form remainder of
    /// the line).
    pub fn compile_tag_regex(&self) -> Result<Regex> {
        let alternates = self.tags.join("|");
        let pattern = format!(r"\b(?P<tag>{alternates})(?::| -)\s*(?P<text>[^\r\n]*)");
        Regex::new(&pattern)
            .with_context(|| format!("Invalid tag pattern built from vocabulary {:?}", self.tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CollectorConfig::new(PathBuf::from("/tmp/project"));
        assert_eq!(config.suffixes, vec![".rs"]);
        assert_eq!(config.skip_marker, ":skip_tags:");
        assert_eq!(
            config.summary_file(),
            PathBuf::from("/tmp/project/docs/CODE_TAG_SUMMARY.md")
        );
        assert!(config.tags.iter().any(|t| t == "TODO"));
    }

    #[test]
    fn test_from_toml_uses_defaults_for_missing_fields() {
        let config = CollectorConfig::from_toml_str(
            r#"
            project_root = "/tmp/project"
            suffixes = [".rs", ".md"]
            "#,
        )
        .unwrap();
        assert_eq!(config.project_root, PathBuf::from("/tmp/project"));
        assert_eq!(config.suffixes, vec![".rs", ".md"]);
        assert_eq!(config.skip_marker, ":skip_tags:");
        assert!(!config.excluded_dirs.is_empty());
    }

    #[test]
    fn test_compile_tag_regex_groups() {
        let config = CollectorConfig::default();
        let regex = config.compile_tag_regex().unwrap();
        let caps = regex.captures("// TODO: tighten this bound").unwrap();
        assert_eq!(&caps["tag"], "TODO");
        assert_eq!(&caps["text"], "tighten this bound");
    }

    #[test]
    fn test_compile_tag_regex_requires_delimiter() {
        let config = CollectorConfig::default();
        let regex = config.compile_tag_regex().unwrap();
        assert!(regex.captures("a TODOish word").is_none());
        assert!(regex.captures("TODO - dash form works").is_some());
    }
}
