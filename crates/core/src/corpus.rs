//! Documentation corpus — the only knowledge the assistant may answer from.
//!
//! The corpus is loaded once at start-up from a JSON array of
//! `{"title": ..., "content": ...}` objects and frozen for the lifetime of
//! the process. [`Corpus`] is a cheap, clonable read-only handle.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::CorpusError;

/// One documentation article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationEntry {
    pub title: String,

    /// Article text. `content` is accepted as an alias in JSON.
    #[serde(alias = "content")]
    pub body: String,
}

impl DocumentationEntry {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// The ordered, immutable documentation corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Arc<[DocumentationEntry]>,
}

impl Corpus {
    pub fn new(entries: Vec<DocumentationEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    /// Load the corpus from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let content = std::fs::read_to_string(path).map_err(|e| CorpusError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let corpus = Self::from_json(&content).map_err(|e| CorpusError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!(
            entries = corpus.len(),
            path = %path.display(),
            "Documentation corpus loaded"
        );
        Ok(corpus)
    }

    /// Parse a corpus from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<DocumentationEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[DocumentationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render every entry as a `### title` heading followed by its body,
    /// in corpus order, separated by a blank line.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|doc| format!("### {}\n{}", doc.title, doc.body))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn render_keeps_corpus_order() {
        let corpus = Corpus::new(vec![
            DocumentationEntry::new("Refunds", "30-day refund window."),
            DocumentationEntry::new("Shipping", "Ships in 2 days."),
        ]);
        assert_eq!(
            corpus.render(),
            "### Refunds\n30-day refund window.\n\n### Shipping\nShips in 2 days."
        );
    }

    #[test]
    fn content_is_an_alias_for_body() {
        let corpus =
            Corpus::from_json(r#"[{"title": "Billing", "content": "Invoices are monthly."}]"#)
                .unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.entries()[0].body, "Invoices are monthly.");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "Security", "content": "Enable 2FA in settings."}}]"#
        )
        .unwrap();

        let corpus = Corpus::load(file.path()).unwrap();
        assert_eq!(corpus.entries()[0].title, "Security");
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Corpus::load(Path::new("/nonexistent/docs.json")).unwrap_err();
        assert!(matches!(err, CorpusError::Read { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = Corpus::load(file.path()).unwrap_err();
        assert!(matches!(err, CorpusError::Parse { .. }));
    }

    #[test]
    fn empty_corpus_renders_empty() {
        assert_eq!(Corpus::default().render(), "");
        assert!(Corpus::default().is_empty());
    }
}
