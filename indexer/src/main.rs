use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use snoosearch_core::persist::{load_index, save_index, IndexPaths};
use snoosearch_core::{build_index, schema, Document, SearchHit, Searcher, DEFAULT_TOP_K};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

/// One line of a corpus file, as exported from Reddit.
#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Self text", default)]
    self_text: String,
    #[serde(rename = "Subreddit", default = "unknown_subreddit")]
    subreddit: String,
}

fn unknown_subreddit() -> String {
    "Unknown".to_string()
}

impl RawPost {
    fn into_document(self) -> Document {
        let mut doc = Document::new()
            .set(schema::SUBREDDIT, self.subreddit)
            .set(schema::SELF_TEXT, self.self_text);
        if let Some(title) = self.title {
            doc = doc.set(schema::TITLE, title);
        }
        doc
    }
}

#[derive(Parser)]
#[command(name = "snoosearch")]
#[command(about = "Index and search a Reddit post corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from line-delimited JSON files
    Build {
        /// Input path (a .json/.jsonl file, or a directory of them)
        #[arg(long)]
        input: PathBuf,
        /// Output index directory
        #[arg(long)]
        output: PathBuf,
    },
    /// Query an existing index
    Search {
        /// Index directory
        #[arg(long)]
        index: PathBuf,
        /// One-shot query; omit for an interactive prompt
        #[arg(long)]
        query: Option<String>,
        /// Number of results to return
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build(&input, &output),
        Commands::Search {
            index,
            query,
            top_k,
        } => search(&index, query.as_deref(), top_k),
    }
}

fn build(input: &Path, output: &Path) -> Result<()> {
    let docs = read_corpus(input)?;
    tracing::info!(num_records = docs.len(), "corpus read");

    let index = build_index(docs)?;
    tracing::info!(
        num_docs = index.num_docs(),
        num_terms = index.term_count(),
        "index built"
    );

    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();
    save_index(&IndexPaths::new(output), &index, &created_at)?;
    Ok(())
}

/// Collect documents from a JSONL file or a directory of them. Lines that
/// fail to parse are logged and skipped; they never reach the builder.
fn read_corpus(input: &Path) -> Result<Vec<Document>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file()
                && matches!(
                    p.extension().and_then(|s| s.to_str()),
                    Some("json") | Some("jsonl")
                )
            {
                files.push(p.to_path_buf());
            }
        }
        // Document ids follow ingestion order, so the walk order must not
        // depend on the filesystem.
        files.sort();
    } else {
        files.push(input.to_path_buf());
    }

    let mut docs = Vec::new();
    for file in &files {
        let f = File::open(file).with_context(|| format!("open {}", file.display()))?;
        for (line_no, line) in BufReader::new(f).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RawPost>(&line) {
                Ok(post) => docs.push(post.into_document()),
                Err(err) => {
                    tracing::warn!(
                        file = %file.display(),
                        line = line_no + 1,
                        %err,
                        "skipping malformed record"
                    );
                }
            }
        }
    }
    Ok(docs)
}

fn search(index_dir: &Path, query: Option<&str>, top_k: usize) -> Result<()> {
    let index = load_index(&IndexPaths::new(index_dir))?;
    let searcher = Searcher::new(&index);
    match query {
        Some(q) => run_query(&searcher, q, top_k),
        None => prompt_loop(&searcher, top_k),
    }
}

fn prompt_loop(searcher: &Searcher, top_k: usize) -> Result<()> {
    loop {
        print!("Enter your search query: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(());
        }
        let query = line.trim();
        if query.is_empty() {
            return Ok(());
        }
        run_query(searcher, query, top_k)?;
    }
}

fn run_query(searcher: &Searcher, query: &str, top_k: usize) -> Result<()> {
    let hits = match searcher.search(query, top_k) {
        Ok(hits) => hits,
        // A query with no searchable terms is zero results at the prompt,
        // not a failure.
        Err(snoosearch_core::Error::EmptyQuery) => Vec::new(),
        Err(err) => return Err(err.into()),
    };
    print_hits(&hits);
    Ok(())
}

fn print_hits(hits: &[SearchHit]) {
    println!("Search results:");
    for (idx, hit) in hits.iter().enumerate() {
        let field = |name: &str| hit.fields.get(name).map(String::as_str).unwrap_or("");
        println!("Document {}:", idx + 1);
        println!("Title: {}", field(schema::TITLE));
        println!("Subreddit: {}", field(schema::SUBREDDIT));
        println!("Self text: {}", field(schema::SELF_TEXT));
        println!("Score: {}", hit.score);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults_apply() {
        let post: RawPost = serde_json::from_str(r#"{"Title": "only a title"}"#).unwrap();
        let doc = post.into_document();
        assert_eq!(doc.get(schema::TITLE), Some("only a title"));
        assert_eq!(doc.get(schema::SELF_TEXT), Some(""));
        assert_eq!(doc.get(schema::SUBREDDIT), Some("Unknown"));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.jsonl");
        let mut f = File::create(&path).unwrap();
        writeln!(f, r#"{{"Title": "first", "Subreddit": "pets"}}"#).unwrap();
        writeln!(f, "this is not json").unwrap();
        writeln!(f).unwrap();
        writeln!(f, r#"{{"Title": "second", "Self text": "body"}}"#).unwrap();

        let docs = read_corpus(&path).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].get(schema::TITLE), Some("first"));
        assert_eq!(docs[1].get(schema::SELF_TEXT), Some("body"));
    }

    #[test]
    fn directory_walk_is_ordered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jsonl", "a.jsonl"] {
            let mut f = File::create(dir.path().join(name)).unwrap();
            writeln!(f, r#"{{"Title": "{name}"}}"#).unwrap();
        }
        let docs = read_corpus(dir.path()).unwrap();
        let titles: Vec<_> = docs.iter().filter_map(|d| d.get(schema::TITLE)).collect();
        assert_eq!(titles, vec!["a.jsonl", "b.jsonl"]);
    }
}
