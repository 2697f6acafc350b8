//! Rendering change records into prompt text.

use tracing::{debug, warn};

use crate::git::ChangeRecord;

use super::decode::{EncodingStrategy, decode_text};
use super::filter::ExtensionFilter;

/// Why a fragment's content was replaced with a summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elision {
    /// Extension not in the allow-list.
    Excluded,
    /// Non-text content.
    Binary,
    /// Renamed without content changes.
    RenameOnly,
    /// No content to show and no rename.
    NoContent,
    /// Content could not be decoded as text.
    Undecodable,
}

/// Rendering policy for a whole run.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// `None` renders every text change in full.
    pub filter: Option<ExtensionFilter>,
    pub encoding: EncodingStrategy,
}

/// Rendered text for one changed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFragment {
    pub record: ChangeRecord,
    pub text: String,
    pub elision: Option<Elision>,
}

impl RenderedFragment {
    pub fn is_elided(&self) -> bool {
        self.elision.is_some()
    }

    fn full(record: ChangeRecord, path: &str, diff: &str) -> Self {
        let text = format!("Diff for {}:\n\n{}\n\n", path, diff);
        Self {
            record,
            text,
            elision: None,
        }
    }

    fn elided(record: ChangeRecord, text: String, elision: Elision) -> Self {
        Self {
            record,
            text,
            elision: Some(elision),
        }
    }
}

/// Render one change record.
///
/// Checks run in order: extension filter, binary content, rename without
/// content, then decoding. Decode failures produce a summary line instead of
/// an error.
pub fn render_fragment(
    record: ChangeRecord,
    filter: Option<&ExtensionFilter>,
    encoding: EncodingStrategy,
) -> RenderedFragment {
    let path = record.effective_path().to_string();
    let verb = record.status().as_str();

    if let Some(filter) = filter
        && !filter.allows(&path)
    {
        debug!("Excluding {} by extension", path);
        let text = format!("File {}: {} (excluded)", verb, path);
        return RenderedFragment::elided(record, text, Elision::Excluded);
    }

    if record.is_binary() {
        let text = format!("File {}: {} (binary or unspecified type)", verb, path);
        return RenderedFragment::elided(record, text, Elision::Binary);
    }

    let Some(payload) = record.payload() else {
        if !record.is_pure_rename() {
            let text = format!("File {}: {} (no content changes)", verb, path);
            return RenderedFragment::elided(record, text, Elision::NoContent);
        }
        let text = format!(
            "File renamed: {} -> {}",
            record.old_path().unwrap_or_default(),
            path
        );
        return RenderedFragment::elided(record, text, Elision::RenameOnly);
    };

    match decode_text(payload, encoding) {
        Ok(diff) => RenderedFragment::full(record, &path, &diff),
        Err(e) => {
            warn!("Could not decode diff for {}: {}", path, e);
            let text = format!(
                "Error decoding file: {} (may contain binary content or unknown encoding)",
                path
            );
            RenderedFragment::elided(record, text, Elision::Undecodable)
        }
    }
}

/// Render every record of a commit with the same options.
pub fn render_all(records: Vec<ChangeRecord>, options: &RenderOptions) -> Vec<RenderedFragment> {
    records
        .into_iter()
        .map(|record| render_fragment(record, options.filter.as_ref(), options.encoding))
        .collect()
}

/// Concatenate fragment texts, one summary line per elided fragment.
pub fn concat_fragments(fragments: &[RenderedFragment]) -> String {
    let mut text = String::new();
    for fragment in fragments {
        text.push_str(&fragment.text);
        if !fragment.text.ends_with('\n') {
            text.push('\n');
        }
    }
    text
}
