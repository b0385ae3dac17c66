use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

use crate::scan::FileTagSet;

/// Pretty-format the collected code tags by file and line number.
///
/// Files are listed in ascending path order with their tags in file order,
/// followed by a summary line counting each tag kind in `vocabulary` order.
/// Returns the empty string when nothing was found, which signals the caller
/// to delete any stale artifact instead of writing an empty report.
pub fn format_report(base_dir: &Path, file_tags: &[FileTagSet], vocabulary: &[String]) -> String {
    let mut output = String::new();
    let mut counter: HashMap<&str, usize> = HashMap::new();

    let mut sorted: Vec<&FileTagSet> = file_tags.iter().collect();
    sorted.sort_by(|a, b| a.source_path.cmp(&b.source_path));

    for file in sorted {
        let rel_path = file
            .source_path
            .strip_prefix(base_dir)
            .unwrap_or(&file.source_path);
        let _ = writeln!(output, "- {}", rel_path.display());
        for tag in &file.tags {
            let _ = writeln!(
                output,
                "    - line {:>3} {:>7}: {}",
                tag.lineno, tag.tag, tag.text
            );
            *counter.entry(tag.tag.as_str()).or_insert(0) += 1;
        }
        output.push('\n');
    }
    debug!(?counter, "Tag counts");

    let summary: Vec<String> = vocabulary
        .iter()
        .filter_map(|tag| {
            counter
                .get(tag.as_str())
                .map(|count| format!("{tag} ({count})"))
        })
        .collect();
    if !summary.is_empty() {
        let _ = writeln!(output, "Found code tags for {}", summary.join(", "));
    }
    output
}
