use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub sha256: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizePaths {
    pub cache_root: String,
    pub input_path: String,
    pub output_path: String,
    pub manifest_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeOptions {
    pub skip_redirects: bool,
    pub max_documents: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeCounts {
    pub documents_read: usize,
    pub records_written: usize,
    pub redirects_skipped: usize,
    pub malformed_skipped: usize,
    pub sections_written: usize,
    pub section_key_collisions: usize,
    pub links_written: usize,
    pub unparsed_page_ids: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub options: NormalizeOptions,
    pub paths: NormalizePaths,
    pub source: SourceFile,
    pub counts: NormalizeCounts,
    pub warnings: Vec<String>,
}
