//! The inverted index and its builder.
//!
//! [`IndexBuilder`] assigns dense sequential document ids in ingestion
//! order and accumulates per-field postings; [`IndexBuilder::finish`]
//! freezes them into an [`InvertedIndex`], which is read-only from then on
//! and safe to share across threads.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::Schema;

pub type DocId = u32;

/// A document to be indexed: field name → raw value, in insertion order.
/// Fields absent from the schema are ignored at indexing time.
#[derive(Debug, Clone, Default)]
pub struct Document {
    fields: Vec<(String, String)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value, replacing any previous value under the same name.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// One (term, document) entry in a postings list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_frequency: u32,
    /// Token offsets of each occurrence; empty unless the field records
    /// positions.
    pub positions: Vec<u32>,
}

/// Location of one term's postings inside the field arena.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct TermSpan {
    start: u32,
    len: u32,
}

/// Per-field term dictionary, postings arena, and length statistics.
///
/// Postings live in one contiguous arena, grouped per term with doc ids
/// ascending inside each group; the dictionary maps a term to its span.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FieldIndex {
    terms: HashMap<String, TermSpan>,
    postings: Vec<Posting>,
    doc_lengths: Vec<u32>,
    total_tokens: u64,
}

impl FieldIndex {
    /// Postings for `term`, doc id ascending; `None` if the term is absent.
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.terms
            .get(term)
            .map(|s| &self.postings[s.start as usize..(s.start + s.len) as usize])
    }

    /// Number of documents containing `term` in this field.
    pub fn doc_frequency(&self, term: &str) -> u32 {
        self.terms.get(term).map_or(0, |s| s.len)
    }

    /// Token count of one document in this field.
    pub fn doc_length(&self, doc_id: DocId) -> u32 {
        self.doc_lengths.get(doc_id as usize).copied().unwrap_or(0)
    }

    /// Mean token count across all documents in this field.
    pub fn average_length(&self) -> f32 {
        if self.doc_lengths.is_empty() {
            return 0.0;
        }
        self.total_tokens as f32 / self.doc_lengths.len() as f32
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }
}

/// The searchable index: written once by [`IndexBuilder`], read-only after.
#[derive(Debug, Serialize, Deserialize)]
pub struct InvertedIndex {
    schema: Schema,
    fields: HashMap<String, FieldIndex>,
    stored: Vec<HashMap<String, String>>,
    num_docs: u32,
}

impl InvertedIndex {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    pub fn is_empty(&self) -> bool {
        self.num_docs == 0
    }

    pub fn field(&self, name: &str) -> Option<&FieldIndex> {
        self.fields.get(name)
    }

    /// Stored field values of one document.
    pub fn stored_fields(&self, doc_id: DocId) -> Option<&HashMap<String, String>> {
        self.stored.get(doc_id as usize)
    }

    /// Total distinct (field, term) entries.
    pub fn term_count(&self) -> usize {
        self.fields.values().map(FieldIndex::term_count).sum()
    }
}

#[derive(Default)]
struct FieldAccumulator {
    postings: BTreeMap<String, Vec<Posting>>,
    doc_lengths: Vec<u32>,
    total_tokens: u64,
}

/// Accumulates documents and freezes them into an [`InvertedIndex`].
pub struct IndexBuilder {
    schema: Schema,
    next_doc_id: DocId,
    fields: HashMap<String, FieldAccumulator>,
    stored: Vec<HashMap<String, String>>,
}

impl IndexBuilder {
    pub fn new(schema: Schema) -> Self {
        let fields = schema
            .fields()
            .map(|f| (f.name.clone(), FieldAccumulator::default()))
            .collect();
        Self {
            schema,
            next_doc_id: 0,
            fields,
            stored: Vec::new(),
        }
    }

    /// Index one document, assigning it the next sequential id.
    ///
    /// A missing required field fails the call before any state changes;
    /// the build policy is to abandon the whole build on such an error
    /// rather than publish a partial index.
    pub fn add_document(&mut self, doc: &Document) -> Result<DocId> {
        for f in self.schema.fields() {
            if f.required && doc.get(&f.name).is_none() {
                return Err(Error::MissingRequiredField {
                    doc_ord: self.next_doc_id,
                    field: f.name.clone(),
                });
            }
        }

        let doc_id = self.next_doc_id;
        self.next_doc_id += 1;

        let mut stored = HashMap::new();
        for f in self.schema.fields() {
            // Optional fields default to the empty string.
            let raw = doc.get(&f.name).unwrap_or("");
            if f.stored {
                stored.insert(f.name.clone(), raw.to_string());
            }

            // Untokenized fields carry the keyword analyzer, so this one
            // path indexes both kinds.
            let tokens = f.analyzer.tokenize(raw);
            let mut per_term: BTreeMap<&str, (u32, Vec<u32>)> = BTreeMap::new();
            for (term, pos) in &tokens {
                let entry = per_term.entry(term.as_str()).or_insert((0, Vec::new()));
                entry.0 += 1;
                if f.positions {
                    entry.1.push(*pos as u32);
                }
            }

            let acc = self
                .fields
                .get_mut(&f.name)
                .expect("one accumulator per schema field");
            for (term, (tf, positions)) in per_term {
                acc.postings.entry(term.to_string()).or_default().push(Posting {
                    doc_id,
                    term_frequency: tf,
                    positions,
                });
            }
            acc.doc_lengths.push(tokens.len() as u32);
            acc.total_tokens += tokens.len() as u64;
        }
        self.stored.push(stored);
        Ok(doc_id)
    }

    /// Freeze the accumulated postings into their final arena layout.
    pub fn finish(self) -> InvertedIndex {
        let mut fields = HashMap::new();
        for (name, acc) in self.fields {
            let mut terms = HashMap::with_capacity(acc.postings.len());
            let mut arena = Vec::new();
            for (term, postings) in acc.postings {
                let span = TermSpan {
                    start: arena.len() as u32,
                    len: postings.len() as u32,
                };
                arena.extend(postings);
                terms.insert(term, span);
            }
            fields.insert(
                name,
                FieldIndex {
                    terms,
                    postings: arena,
                    doc_lengths: acc.doc_lengths,
                    total_tokens: acc.total_tokens,
                },
            );
        }
        tracing::debug!(num_docs = self.next_doc_id, "index finalized");
        InvertedIndex {
            schema: self.schema,
            fields,
            stored: self.stored,
            num_docs: self.next_doc_id,
        }
    }

    /// Build an index over `docs` in one pass. Any document failure aborts
    /// the whole build.
    pub fn build<I>(schema: Schema, docs: I) -> Result<InvertedIndex>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut builder = IndexBuilder::new(schema);
        for doc in docs {
            builder.add_document(&doc)?;
        }
        Ok(builder.finish())
    }
}

/// Build an index over the Reddit post schema ([`Schema::reddit_posts`]).
pub fn build_index<I>(docs: I) -> Result<InvertedIndex>
where
    I: IntoIterator<Item = Document>,
{
    IndexBuilder::build(Schema::reddit_posts(), docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{self, FieldConfig};

    fn post(title: &str, self_text: &str, subreddit: &str) -> Document {
        Document::new()
            .set(schema::TITLE, title)
            .set(schema::SELF_TEXT, self_text)
            .set(schema::SUBREDDIT, subreddit)
    }

    #[test]
    fn doc_ids_are_dense_and_sequential() {
        let mut builder = IndexBuilder::new(Schema::reddit_posts());
        for i in 0..3u32 {
            let id = builder
                .add_document(&post(&format!("post {i}"), "", "pets"))
                .unwrap();
            assert_eq!(id, i);
        }
        assert_eq!(builder.finish().num_docs(), 3);
    }

    #[test]
    fn postings_record_frequency_and_positions() {
        let index = build_index(vec![post("cats love cats", "", "pets")]).unwrap();
        let field = index.field(schema::TITLE).unwrap();
        let postings = field.postings("cats").unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].doc_id, 0);
        assert_eq!(postings[0].term_frequency, 2);
        assert_eq!(postings[0].positions, vec![0, 2]);
        assert_eq!(field.doc_frequency("cats"), 1);
        assert_eq!(field.doc_length(0), 3);
    }

    #[test]
    fn postings_are_ordered_by_doc_id() {
        let docs = vec![
            post("cats", "", "pets"),
            post("dogs", "", "pets"),
            post("cats again", "", "pets"),
        ];
        let index = build_index(docs).unwrap();
        let postings = index.field(schema::TITLE).unwrap().postings("cats").unwrap();
        let ids: Vec<DocId> = postings.iter().map(|p| p.doc_id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn missing_required_field_fails_the_build() {
        let docs = vec![
            post("fine", "", "pets"),
            Document::new().set(schema::SELF_TEXT, "no title here"),
        ];
        let err = build_index(docs).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredField { doc_ord: 1, ref field } if field == schema::TITLE
        ));
    }

    #[test]
    fn absent_optional_fields_default_to_empty() {
        let index = build_index(vec![Document::new().set(schema::TITLE, "just a title")])
            .unwrap();
        let stored = index.stored_fields(0).unwrap();
        assert_eq!(stored[schema::SELF_TEXT], "");
        assert_eq!(index.field(schema::SELF_TEXT).unwrap().doc_length(0), 0);
    }

    #[test]
    fn keyword_field_indexes_the_value_verbatim() {
        let schema = Schema::new(vec![
            FieldConfig::text("Title").required(),
            FieldConfig::keyword("Post id"),
        ])
        .unwrap();
        let doc = Document::new()
            .set("Title", "hello")
            .set("Post id", "t3_Abc123");
        let index = IndexBuilder::build(schema, vec![doc]).unwrap();
        let field = index.field("Post id").unwrap();
        // Verbatim single term: no case folding, no splitting.
        assert_eq!(field.doc_frequency("t3_Abc123"), 1);
        assert_eq!(field.doc_frequency("t3_abc123"), 0);
        assert!(field.postings("t3_Abc123").unwrap()[0].positions.is_empty());
    }

    #[test]
    fn unstored_field_is_searchable_but_not_retained() {
        let mut body = FieldConfig::text("Body");
        body.stored = false;
        let schema = Schema::new(vec![FieldConfig::text("Title"), body]).unwrap();
        let doc = Document::new().set("Title", "t").set("Body", "hidden words");
        let index = IndexBuilder::build(schema, vec![doc]).unwrap();
        assert_eq!(index.field("Body").unwrap().doc_frequency("hidden"), 1);
        assert!(!index.stored_fields(0).unwrap().contains_key("Body"));
    }
}
