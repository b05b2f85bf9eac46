//! Query parsing, BM25 scoring, and top-k retrieval.
//!
//! A query is tokenized per field with that field's own analyzer, so query
//! terms line up with what indexing produced. Matches OR-combine across
//! fields and across terms within a field; each matching (field, term)
//! pair contributes a BM25 term to the document's score.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::index::{DocId, InvertedIndex};

/// Result count used by the driver surface when the caller gives none.
pub const DEFAULT_TOP_K: usize = 5;

/// BM25 free parameters; the defaults are the usual library constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

/// One ranked result with its stored field values.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f32,
    pub fields: HashMap<String, String>,
}

/// Read-only handle answering ranked queries over a finalized index.
///
/// The index never changes after build, so any number of searchers (and
/// threads) may query it concurrently.
pub struct Searcher<'a> {
    index: &'a InvertedIndex,
    params: Bm25Params,
}

impl<'a> Searcher<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Self::with_params(index, Bm25Params::default())
    }

    pub fn with_params(index: &'a InvertedIndex, params: Bm25Params) -> Self {
        Self { index, params }
    }

    /// Search every indexed field, OR-combining per-field matches.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let fields = self.index.schema().default_search_fields();
        let names: Vec<&str> = fields.iter().map(String::as_str).collect();
        self.search_fields(query, &names, top_k)
    }

    /// Search an explicit set of fields, in the given order.
    ///
    /// Results come back score-descending; ties break by ascending doc id,
    /// so repeated calls return identical orderings.
    pub fn search_fields(
        &self,
        query: &str,
        fields: &[&str],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        if top_k == 0 {
            return Err(Error::InvalidArgument("top_k must be positive".into()));
        }

        // Query-time tokenization mirrors index-time: same analyzer per
        // field. Duplicate terms collapse, keeping first-occurrence order.
        let mut per_field: Vec<(&str, Vec<String>)> = Vec::with_capacity(fields.len());
        for &name in fields {
            let cfg = self.index.schema().field(name)?;
            let mut seen = HashSet::new();
            let mut terms = Vec::new();
            for (term, _pos) in cfg.analyzer.tokenize(query) {
                if seen.insert(term.clone()) {
                    terms.push(term);
                }
            }
            per_field.push((name, terms));
        }
        if per_field.iter().all(|(_, terms)| terms.is_empty()) {
            return Err(Error::EmptyQuery);
        }
        if self.index.is_empty() {
            return Ok(Vec::new());
        }

        let n = self.index.num_docs() as f32;
        let mut scores: HashMap<DocId, f32> = HashMap::new();
        for (name, terms) in &per_field {
            let Some(field) = self.index.field(name) else {
                continue;
            };
            let avgdl = field.average_length();
            for term in terms {
                let Some(postings) = field.postings(term) else {
                    continue;
                };
                let df = postings.len() as f32;
                let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
                for posting in postings {
                    let tf = posting.term_frequency as f32;
                    let dl = field.doc_length(posting.doc_id) as f32;
                    let norm = tf
                        + self.params.k1
                            * (1.0 - self.params.b + self.params.b * dl / avgdl);
                    *scores.entry(posting.doc_id).or_insert(0.0) +=
                        idf * tf * (self.params.k1 + 1.0) / norm;
                }
            }
        }

        let mut ranked: Vec<(DocId, f32)> = scores.into_iter().collect();
        ranked.sort_unstable_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(top_k);

        Ok(ranked
            .into_iter()
            .map(|(doc_id, score)| SearchHit {
                doc_id,
                score,
                fields: self
                    .index
                    .stored_fields(doc_id)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{build_index, Document};
    use crate::schema;

    #[test]
    fn repeated_query_terms_collapse() {
        let doc = Document::new().set(schema::TITLE, "cats");
        let index = build_index(vec![doc]).unwrap();
        let searcher = Searcher::new(&index);
        let once = searcher.search("cats", 5).unwrap();
        let twice = searcher.search("cats cats", 5).unwrap();
        assert_eq!(once[0].score, twice[0].score);
    }

    #[test]
    fn unknown_search_field_is_an_error() {
        let index = build_index(vec![Document::new().set(schema::TITLE, "x")]).unwrap();
        let searcher = Searcher::new(&index);
        assert!(matches!(
            searcher.search_fields("x", &["Comments"], 5),
            Err(Error::UnknownField(_))
        ));
    }
}
