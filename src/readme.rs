use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors from a single patch pass. All of them are fatal for the pass: a
/// half-applied patch would corrupt the document, so nothing is written.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("no replacement content supplied for region `{key}`")]
    MissingKey { key: String },
    #[error("region `{key}` was never closed before end of document")]
    UnclosedRegion { key: String },
    #[error("end marker without a matching start marker: `{line}`")]
    UnmatchedEndMarker { line: String },
}

/// Parser state for one pass over a document.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PatchState {
    OutsideRegion,
    /// Between a start marker and its end marker; `key` is the open region
    InsideRegion { key: String },
}

fn is_end_marker(line: &str) -> bool {
    line.trim_start().starts_with("<!-- /")
}

/// Build the standard marker pattern for a family of region keys.
///
/// `key_pattern` is a regex fragment for the key itself, e.g. `CODE:.*` or
/// `COVERAGE`. The resulting pattern matches both the start marker
/// `<!-- KEY -->` and the end marker `<!-- /KEY -->`, capturing the key.
pub fn marker_pattern(key_pattern: &str) -> Result<Regex> {
    Regex::new(&format!(r"^\s*<!-- /?({key_pattern}) -->"))
        .with_context(|| format!("Invalid region key pattern: {key_pattern}"))
}

/// Replace the interior of every marked region with the supplied content.
///
/// Marker lines are copied verbatim. After a start marker, the replacement
/// block looked up by the captured key is inserted framed by one blank line
/// on each side; the previous interior is consumed until the end marker. All
/// lines outside regions pass through untouched.
pub fn patch_lines<S: AsRef<str>>(
    lines: &[S],
    marker_pattern: &Regex,
    replacements: &HashMap<String, Vec<String>>,
) -> Result<Vec<String>, PatchError> {
    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut state = PatchState::OutsideRegion;

    for line in lines {
        let line = line.as_ref();
        state = match state {
            PatchState::OutsideRegion => {
                if let Some(caps) = marker_pattern.captures(line) {
                    if is_end_marker(line) {
                        return Err(PatchError::UnmatchedEndMarker {
                            line: line.to_string(),
                        });
                    }
                    let key = caps
                        .get(1)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default();
                    let block = replacements
                        .get(&key)
                        .ok_or_else(|| PatchError::MissingKey { key: key.clone() })?;
                    debug!(%key, lines = block.len(), "Replacing region content");
                    output.push(line.to_string());
                    output.push(String::new());
                    output.extend(block.iter().cloned());
                    output.push(String::new());
                    PatchState::InsideRegion { key }
                } else {
                    output.push(line.to_string());
                    PatchState::OutsideRegion
                }
            }
            PatchState::InsideRegion { key } => {
                if marker_pattern.is_match(line) && is_end_marker(line) {
                    output.push(line.to_string());
                    PatchState::OutsideRegion
                } else {
                    // Stale generated content; dropped
                    debug!(%key, line, "Discarding old region line");
                    PatchState::InsideRegion { key }
                }
            }
        };
    }

    if let PatchState::InsideRegion { key } = state {
        return Err(PatchError::UnclosedRegion { key });
    }
    Ok(output)
}

/// Patch the marked regions of the document at `path` in place.
///
/// The whole document is read, transformed in memory, and written back in a
/// single full-content replace; on any error nothing is written.
pub fn patch_file(
    path: &Path,
    marker_pattern: &Regex,
    replacements: &HashMap<String, Vec<String>>,
) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Could not read document: {}", path.display()))?;
    let lines: Vec<&str> = text.split('\n').collect();
    let patched = patch_lines(&lines, marker_pattern, replacements)
        .with_context(|| format!("Could not patch document: {}", path.display()))?;
    fs::write(path, patched.join("\n"))
        .with_context(|| format!("Could not write document: {}", path.display()))?;
    Ok(())
}

/// Render a linked file as a fenced code block suitable as region content.
/// Trailing whitespace is stripped from each line.
pub fn file_replacement_block(path: &Path, fence: &str) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Could not read linked file: {}", path.display()))?;
    let mut block = vec![format!("```{fence}")];
    block.extend(text.split('\n').map(|line| line.trim_end().to_string()));
    block.push("```".to_string());
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> Regex {
        marker_pattern("[A-Z:./_a-z]+").unwrap()
    }

    fn replacements(key: &str, lines: &[&str]) -> HashMap<String, Vec<String>> {
        let mut map = HashMap::new();
        map.insert(
            key.to_string(),
            lines.iter().map(|line| line.to_string()).collect(),
        );
        map
    }

    #[test]
    fn test_lines_outside_regions_pass_through() {
        let lines = ["# Title", "", "plain text"];
        let patched = patch_lines(&lines, &pattern(), &HashMap::new()).unwrap();
        assert_eq!(patched, vec!["# Title", "", "plain text"]);
    }

    #[test]
    fn test_region_interior_is_replaced_and_framed() {
        let lines = [
            "before",
            "<!-- X -->",
            "old generated line",
            "another old line",
            "<!-- /X -->",
            "after",
        ];
        let patched = patch_lines(&lines, &pattern(), &replacements("X", &["new line"])).unwrap();
        assert_eq!(
            patched,
            vec![
                "before",
                "<!-- X -->",
                "",
                "new line",
                "",
                "<!-- /X -->",
                "after",
            ]
        );
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let lines = ["<!-- X -->", "old", "<!-- /X -->"];
        let err = patch_lines(&lines, &pattern(), &HashMap::new()).unwrap_err();
        assert!(matches!(err, PatchError::MissingKey { key } if key == "X"));
    }

    #[test]
    fn test_unclosed_region_is_fatal() {
        let lines = ["<!-- X -->", "old content, no end marker"];
        let err = patch_lines(&lines, &pattern(), &replacements("X", &["new"])).unwrap_err();
        assert!(matches!(err, PatchError::UnclosedRegion { key } if key == "X"));
    }

    #[test]
    fn test_stray_end_marker_is_fatal() {
        let lines = ["text", "<!-- /X -->"];
        let err = patch_lines(&lines, &pattern(), &HashMap::new()).unwrap_err();
        assert!(matches!(err, PatchError::UnmatchedEndMarker { .. }));
    }

    #[test]
    fn test_patching_is_idempotent() {
        let lines = ["a", "<!-- X -->", "stale", "<!-- /X -->", "b"];
        let map = replacements("X", &["fresh", "content"]);
        let once = patch_lines(&lines, &pattern(), &map).unwrap();
        let twice = patch_lines(&once, &pattern(), &map).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_multiple_regions_in_one_document() {
        let lines = [
            "<!-- CODE:demo.rs -->",
            "old",
            "<!-- /CODE:demo.rs -->",
            "between",
            "<!-- COVERAGE -->",
            "old table",
            "<!-- /COVERAGE -->",
        ];
        let mut map = replacements("CODE:demo.rs", &["fn main() {}"]);
        map.insert("COVERAGE".to_string(), vec!["| a | b |".to_string()]);
        let patched = patch_lines(&lines, &pattern(), &map).unwrap();
        assert_eq!(
            patched,
            vec![
                "<!-- CODE:demo.rs -->",
                "",
                "fn main() {}",
                "",
                "<!-- /CODE:demo.rs -->",
                "between",
                "<!-- COVERAGE -->",
                "",
                "| a | b |",
                "",
                "<!-- /COVERAGE -->",
            ]
        );
    }
}
