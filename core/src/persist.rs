//! On-disk index layout: a bincode postings file plus human-readable
//! metadata carrying an explicit format version.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::index::InvertedIndex;

/// Version tag written into `meta.json`; bumped on any layout change.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub num_docs: u32,
    pub created_at: String,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn meta(&self) -> PathBuf {
        self.root.join("meta.json")
    }

    fn index(&self) -> PathBuf {
        self.root.join("index.bin")
    }
}

/// Write `index` under `paths.root`, creating the directory if needed.
pub fn save_index(paths: &IndexPaths, index: &InvertedIndex, created_at: &str) -> Result<()> {
    fs::create_dir_all(&paths.root)?;
    let bytes = bincode::serialize(index)?;
    fs::write(paths.index(), bytes)?;
    let meta = MetaFile {
        version: FORMAT_VERSION,
        num_docs: index.num_docs(),
        created_at: created_at.to_string(),
    };
    fs::write(paths.meta(), serde_json::to_string_pretty(&meta)?)?;
    tracing::info!(num_docs = meta.num_docs, root = %paths.root.display(), "index saved");
    Ok(())
}

/// Read the metadata alone, validating the format version.
pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let meta: MetaFile = serde_json::from_str(&fs::read_to_string(paths.meta())?)?;
    if meta.version != FORMAT_VERSION {
        return Err(Error::UnsupportedVersion {
            found: meta.version,
            expected: FORMAT_VERSION,
        });
    }
    Ok(meta)
}

/// Load a previously saved index.
pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let meta = load_meta(paths)?;
    let bytes = fs::read(paths.index())?;
    let index: InvertedIndex = bincode::deserialize(&bytes)?;
    tracing::info!(num_docs = meta.num_docs, "index loaded");
    Ok(index)
}
