//! Commit message composition.

use crate::result::ChangeCounts;

/// Suffix added when files changed outside the batch are committed too.
const EXTRA_FILES_SUFFIX: &str = " + extra files edited outside of Orbix";

/// Build the commit message for a batch.
///
/// `<prefix> <summary> - wrote N file(s), renamed N file(s), deleted N file(s)`,
/// listing only non-zero kinds and omitting the summary part when absent.
pub(crate) fn commit_message(
    prefix: &str,
    summary: Option<&str>,
    counts: &ChangeCounts,
    packages: usize,
    extra_files: bool,
) -> String {
    let mut changes = Vec::new();
    if counts.written > 0 {
        changes.push(format!("wrote {} file(s)", counts.written));
    }
    if counts.renamed > 0 {
        changes.push(format!("renamed {} file(s)", counts.renamed));
    }
    if counts.deleted > 0 {
        changes.push(format!("deleted {} file(s)", counts.deleted));
    }
    if packages > 0 {
        changes.push(format!("requested {packages} package(s)"));
    }
    let changes = changes.join(", ");

    let mut message = match summary.map(str::trim).filter(|s| !s.is_empty()) {
        Some(summary) => format!("{prefix} {summary} - {changes}"),
        None => format!("{prefix} {changes}"),
    };
    if extra_files {
        message.push_str(EXTRA_FILES_SUFFIX);
    }
    message
}
