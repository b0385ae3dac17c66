//! Collect code tags (TODO, FIXME, ...) from a project tree into a summary
//! report, and patch comment-delimited regions of Markdown documents with
//! generated content.
//!
//! The scanning pipeline is `walk` -> `scan` -> `report`, driven end to end
//! by [`summary::write_summary_file`]. The `readme` module is a separate,
//! independently invoked pass over a single document.

pub mod config;
pub mod readme;
pub mod report;
pub mod scan;
pub mod summary;
pub mod walk;
