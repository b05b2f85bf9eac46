//! Schema-driven inverted index with BM25 ranking.
//!
//! Documents flow through [`IndexBuilder`] into an immutable
//! [`InvertedIndex`]; a [`Searcher`] answers ranked keyword queries against
//! it, OR-combining matches across fields. Per-field indexing behavior
//! (tokenization, stored values, positions) is declared once in a [`Schema`].

pub mod analyzer;
pub mod error;
pub mod index;
pub mod persist;
pub mod schema;
pub mod search;

pub use analyzer::Analyzer;
pub use error::{Error, Result};
pub use index::{build_index, DocId, Document, IndexBuilder, InvertedIndex, Posting};
pub use schema::{FieldConfig, Schema};
pub use search::{Bm25Params, SearchHit, Searcher, DEFAULT_TOP_K};
