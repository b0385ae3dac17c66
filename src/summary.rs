use anyhow::{Context, Result};
use std::fs;
use tracing::info;

use crate::config::CollectorConfig;
use crate::report::format_report;
use crate::scan::search_files;
use crate::walk::{default_exclusion, find_files};

/// Run the full collection pipeline and write the summary artifact.
///
/// The header embeds the skip marker so the summary file never re-triggers
/// its own scan. When nothing is found the report is empty and any stale
/// artifact is deleted instead.
pub fn write_summary_file(config: &CollectorConfig) -> Result<()> {
    let regex = config.compile_tag_regex()?;
    let paths = find_files(config, default_exclusion(&config.excluded_dirs));
    let matches = search_files(&paths, &regex, &config.skip_marker);
    let report = format_report(&config.project_root, &matches, &config.tags);
    let report = report.trim();

    let path_summary = config.summary_file();
    if !report.is_empty() {
        if let Some(parent) = path_summary.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create directory: {}", parent.display()))?;
        }
        let header = format!(
            "# Task Summary\n\n<!-- {} -->\n\nAuto-Generated by {}",
            config.skip_marker,
            env!("CARGO_PKG_NAME")
        );
        fs::write(&path_summary, format!("{header}\n\n{report}\n"))
            .with_context(|| format!("Could not write summary: {}", path_summary.display()))?;
        info!(path = %path_summary.display(), files = matches.len(), "Wrote code tag summary");
    } else if path_summary.is_file() {
        info!(path = %path_summary.display(), "No code tags found, deleting stale summary");
        fs::remove_file(&path_summary)
            .with_context(|| format!("Could not delete summary: {}", path_summary.display()))?;
    }
    Ok(())
}
