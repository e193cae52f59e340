//! Page text providers. Extraction itself lives outside the parser; these adapters
//! hand it per-page text blocks or positioned word boxes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A word with its position on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordBox {
    pub text: String,
    /// Distance from the top of the page
    pub top: f64,
    /// Distance from the left edge
    pub x0: f64,
}

/// Extracted content of a single page
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    Text(String),
    Words(Vec<WordBox>),
}

/// Anything that can produce page contents for a statement document
pub trait TextSource {
    fn pages(&self) -> Result<Vec<PageContent>>;
}

/// Split a multi-page text dump on form feeds, the page separator pdftotext-style tools emit
fn split_pages(text: &str) -> Vec<PageContent> {
    text.split('\u{000C}').map(|p| PageContent::Text(p.to_string())).collect()
}

/// PDF document read through `pdf-extract`
#[derive(Debug, Clone)]
pub struct PdfTextSource {
    path: PathBuf,
}

impl PdfTextSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TextSource for PdfTextSource {
    fn pages(&self) -> Result<Vec<PageContent>> {
        // pdf-extract panics on some malformed documents
        let text = std::panic::catch_unwind(|| pdf_extract::extract_text(&self.path))
            .map_err(|_| anyhow::anyhow!("pdf extraction panicked on {}", self.path.display()))?
            .map_err(|e| anyhow::anyhow!("extract text from {}: {e}", self.path.display()))?;
        Ok(split_pages(&text))
    }
}

/// Pre-extracted UTF-8 text; form feeds separate pages
#[derive(Debug, Clone)]
pub struct PlainTextSource {
    path: PathBuf,
}

impl PlainTextSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TextSource for PlainTextSource {
    fn pages(&self) -> Result<Vec<PageContent>> {
        let text = fs::read_to_string(&self.path).with_context(|| format!("read {}", self.path.display()))?;
        Ok(split_pages(&text))
    }
}

/// JSON word boxes: an array of pages, each an array of `{text, top, x0}`
#[derive(Debug, Clone)]
pub struct WordBoxSource {
    path: PathBuf,
}

impl WordBoxSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TextSource for WordBoxSource {
    fn pages(&self) -> Result<Vec<PageContent>> {
        let raw = fs::read_to_string(&self.path).with_context(|| format!("read {}", self.path.display()))?;
        let pages: Vec<Vec<WordBox>> =
            serde_json::from_str(&raw).with_context(|| format!("parse word boxes in {}", self.path.display()))?;
        Ok(pages.into_iter().map(PageContent::Words).collect())
    }
}

/// Pages already in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<PageContent>,
}

impl MemorySource {
    pub fn new(pages: Vec<PageContent>) -> Self {
        Self { pages }
    }

    /// One page per text block
    pub fn from_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self::new(texts.into_iter().map(|t| PageContent::Text(t.into())).collect())
    }
}

impl TextSource for MemorySource {
    fn pages(&self) -> Result<Vec<PageContent>> {
        Ok(self.pages.clone())
    }
}

/// Pick a source by file extension: `.pdf`, `.json` (word boxes), anything else as text.
pub fn source_for_path(path: &Path) -> Box<dyn TextSource> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => Box::new(PdfTextSource::new(path)),
        Some("json") => Box::new(WordBoxSource::new(path)),
        _ => Box::new(PlainTextSource::new(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages_on_form_feed() {
        let pages = split_pages("page one\n07-01 a 1.00\u{000C}page two");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], PageContent::Text("page two".to_string()));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let src = PlainTextSource::new("/nonexistent/statement.txt");
        assert!(src.pages().is_err());
    }

    #[test]
    fn test_word_boxes_from_json() {
        let dir = std::env::temp_dir().join(format!("tally-words-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("words.json");
        fs::write(&path, r#"[[{"text":"07-01","top":10.0,"x0":5.0},{"text":"Coffee","top":11.0,"x0":40.0}]]"#)
            .unwrap();

        let pages = WordBoxSource::new(&path).pages().unwrap();
        match &pages[0] {
            PageContent::Words(words) => {
                assert_eq!(words.len(), 2);
                assert_eq!(words[1].text, "Coffee");
            }
            other => panic!("expected words, got {other:?}"),
        }
        fs::remove_dir_all(&dir).unwrap();
    }
}
