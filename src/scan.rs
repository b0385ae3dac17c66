use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A single tagged comment (FIXME, TODO, ...) with its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTag {
    /// 1-indexed physical line number in the source document
    pub lineno: usize,
    pub tag: String,
    pub text: String,
}

/// All tags found in one source file, in ascending line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTagSet {
    pub source_path: PathBuf,
    pub tags: Vec<CodeTag>,
}

/// Search lines of text for matches to the compiled tag pattern.
///
/// The pattern must have named capture groups `tag` and `text`. Only the
/// first match on each line is taken. If any of the first four lines contains
/// the skip marker the whole file is opted out and nothing is emitted,
/// regardless of matches found before the marker line.
pub fn search_lines<S: AsRef<str>>(lines: &[S], regex: &Regex, skip_marker: &str) -> Vec<CodeTag> {
    let mut tags = Vec::new();
    for (lineno, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if lineno <= 3 && line.contains(skip_marker) {
            return Vec::new();
        }
        if let Some(caps) = regex.captures(line) {
            tags.push(CodeTag {
                lineno: lineno + 1,
                tag: caps["tag"].to_string(),
                text: caps["text"].to_string(),
            });
        }
    }
    tags
}

/// Read a file and split on newlines. A missing file yields no lines.
fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path)?;
    Ok(text.split('\n').map(str::to_string).collect())
}

/// Collect tag matches from multiple files.
///
/// A file that cannot be decoded as text is logged and treated as empty so a
/// single bad file never aborts the scan. Only files with at least one tag
/// produce a [`FileTagSet`].
pub fn search_files(paths: &[PathBuf], regex: &Regex, skip_marker: &str) -> Vec<FileTagSet> {
    let mut matches = Vec::new();
    for path in paths {
        let lines = match read_lines(path) {
            Ok(lines) => lines,
            Err(err) => {
                warn!(path = %path.display(), %err, "Could not parse file as text");
                Vec::new()
            }
        };
        let tags = search_lines(&lines, regex, skip_marker);
        if !tags.is_empty() {
            matches.push(FileTagSet {
                source_path: path.clone(),
                tags,
            });
        }
    }
    matches
}
