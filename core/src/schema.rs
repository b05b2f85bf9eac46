use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::analyzer::Analyzer;
use crate::error::{Error, Result};

/// Field names of the Reddit post corpus.
pub const SUBREDDIT: &str = "Subreddit";
pub const TITLE: &str = "Title";
pub const SELF_TEXT: &str = "Self text";

/// Indexing behavior of a single field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub tokenized: bool,
    pub stored: bool,
    /// Record token offsets in postings. Requires `tokenized`.
    pub positions: bool,
    pub analyzer: Analyzer,
    pub required: bool,
}

impl FieldConfig {
    /// A tokenized, stored field recording term frequencies and positions.
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tokenized: true,
            stored: true,
            positions: true,
            analyzer: Analyzer::Standard,
            required: false,
        }
    }

    /// A stored identifier field, indexed verbatim as a single term.
    pub fn keyword(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tokenized: false,
            stored: true,
            positions: false,
            analyzer: Analyzer::Keyword,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = analyzer;
        self
    }
}

/// Ordered set of field configurations, validated once and immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldConfig>,
}

impl Schema {
    pub fn new(fields: Vec<FieldConfig>) -> Result<Self> {
        let mut seen = HashSet::new();
        for f in &fields {
            if !seen.insert(f.name.as_str()) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate field '{}'",
                    f.name
                )));
            }
            if f.positions && !f.tokenized {
                return Err(Error::InvalidArgument(format!(
                    "field '{}' records positions but is not tokenized",
                    f.name
                )));
            }
            if !f.tokenized && f.analyzer != Analyzer::Keyword {
                return Err(Error::InvalidArgument(format!(
                    "untokenized field '{}' must use the keyword analyzer",
                    f.name
                )));
            }
        }
        Ok(Self { fields })
    }

    /// The fixed schema for the Reddit post corpus: `Subreddit`, `Title`
    /// and `Self text`, each tokenized, stored, with positions; `Title`
    /// is required.
    pub fn reddit_posts() -> Self {
        Self::new(vec![
            FieldConfig::text(SUBREDDIT),
            FieldConfig::text(TITLE).required(),
            FieldConfig::text(SELF_TEXT),
        ])
        .expect("corpus schema is valid")
    }

    /// Look up one field's configuration.
    pub fn field(&self, name: &str) -> Result<&FieldConfig> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldConfig> {
        self.fields.iter()
    }

    /// Names of all indexed fields, in schema order.
    pub fn default_search_fields(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_field_lookup_fails() {
        let schema = Schema::reddit_posts();
        assert!(matches!(
            schema.field("Upvotes"),
            Err(Error::UnknownField(name)) if name == "Upvotes"
        ));
        assert!(schema.field(TITLE).is_ok());
    }

    #[test]
    fn positions_require_tokenization() {
        let mut cfg = FieldConfig::keyword("Id");
        cfg.positions = true;
        assert!(matches!(
            Schema::new(vec![cfg]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let fields = vec![FieldConfig::text("Body"), FieldConfig::text("Body")];
        assert!(matches!(
            Schema::new(fields),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn corpus_schema_shape() {
        let schema = Schema::reddit_posts();
        assert_eq!(
            schema.default_search_fields(),
            vec![SUBREDDIT, TITLE, SELF_TEXT]
        );
        let title = schema.field(TITLE).unwrap();
        assert!(title.required && title.tokenized && title.stored && title.positions);
    }
}
