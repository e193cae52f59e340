//! tally-ingest: turns extracted statement text into typed transactions.
//!
//! Pipeline: [`source`] pages -> [`lines`] normalized lines -> [`parsers`] per-line
//! records -> [`assembler`] sorted, cleaned table.

pub mod assembler;
pub mod lines;
pub mod parsers;
pub mod source;

pub use assembler::{ParseOptions, parse_bank_statement, parse_bank_statement_with, parse_lines};
pub use lines::{ExtractOptions, extract_raw_lines};
pub use parsers::DateOrder;
pub use source::{MemorySource, PageContent, PdfTextSource, PlainTextSource, TextSource, WordBox, WordBoxSource, source_for_path};
pub use tally_core::{StatementResult, Transaction};
