//! Rendering an [`Inspection`] for people and for tools.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::walker::Inspection;

/// Plain-text report: the file table, then the review warnings.
///
/// ```text
/// Required Files:
///     Refs:   Filename:
///     2       /maps/fonts/vera.ttf
///     WARNING: Requires Manual Review
///     WARNING: CONNECTIONTYPE WMS requires manual review
/// ```
///
/// Columns are separated by tabs.
pub struct TextReport<'a>(pub &'a Inspection);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Inspection { ledger, review } = self.0;

        writeln!(f, "Required Files:")?;
        writeln!(f, "\tRefs:\tFilename:")?;
        for (path, refs) in ledger.entries() {
            writeln!(f, "\t{}\t{}", refs, path.display())?;
        }

        if review.needs_review() {
            writeln!(f, "\tWARNING: Requires Manual Review")?;
        }
        for warning in review.warnings() {
            writeln!(f, "\tWARNING: {}", warning)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: Vec<JsonFile>,
    needs_manual_review: bool,
    warnings: &'a [String],
}

#[derive(Serialize)]
struct JsonFile {
    path: String,
    refs: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    lossy_path: bool,
}

impl JsonFile {
    fn new(path: &Path, refs: usize) -> Self {
        match path.to_str() {
            Some(text) => JsonFile {
                path: text.to_owned(),
                refs,
                lossy_path: false,
            },
            None => {
                tracing::warn!(path = %path.display(), "Path is not valid UTF-8; JSON report shows it lossily");
                JsonFile {
                    path: path.to_string_lossy().into_owned(),
                    refs,
                    lossy_path: true,
                }
            }
        }
    }
}

/// Same content as [`TextReport`] as a pretty-printed JSON object.
///
/// JSON strings must be UTF-8. A path that is not keeps its entry, with
/// invalid bytes replaced by U+FFFD and `"lossy_path": true` added, so the
/// reported `path` cannot be opened as-is.
pub fn render_json(inspection: &Inspection) -> serde_json::Result<String> {
    let report = JsonReport {
        files: inspection
            .ledger
            .entries()
            .map(|(path, refs)| JsonFile::new(path, refs))
            .collect(),
        needs_manual_review: inspection.needs_review(),
        warnings: inspection.review.warnings(),
    };
    serde_json::to_string_pretty(&report)
}
