use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::NormalizeRunManifest;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.cache_root.join("manifests");
    let records_dir = args.cache_root.join("records");

    info!(cache_root = %args.cache_root.display(), "status requested");

    match latest_run_manifest(&manifest_dir)? {
        Some(path) => {
            let raw =
                fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            let manifest: NormalizeRunManifest = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;

            info!(
                path = %path.display(),
                run_id = %manifest.run_id,
                status = %manifest.status,
                started_at = %manifest.started_at,
                updated_at = %manifest.updated_at,
                input = %manifest.paths.input_path,
                input_sha256 = %manifest.source.sha256,
                output = %manifest.paths.output_path,
                skip_redirects = manifest.options.skip_redirects,
                "loaded latest normalize run manifest"
            );
            info!(
                documents_read = manifest.counts.documents_read,
                records_written = manifest.counts.records_written,
                redirects_skipped = manifest.counts.redirects_skipped,
                malformed_skipped = manifest.counts.malformed_skipped,
                sections_written = manifest.counts.sections_written,
                section_key_collisions = manifest.counts.section_key_collisions,
                links_written = manifest.counts.links_written,
                unparsed_page_ids = manifest.counts.unparsed_page_ids,
                warnings = manifest.warnings.len(),
                "latest run counts"
            );

            let output_path = Path::new(&manifest.paths.output_path);
            if !output_path.exists() {
                warn!(path = %output_path.display(), "records file from latest run is missing");
            }
        }
        None => warn!(path = %manifest_dir.display(), "no normalize run manifests found"),
    }

    if records_dir.exists() {
        let record_files = list_files_with_suffix(&records_dir, ".jsonl")?;
        info!(
            path = %records_dir.display(),
            files = record_files.len(),
            "records directory status"
        );
    } else {
        warn!(path = %records_dir.display(), "records directory missing");
    }

    Ok(())
}

/// Run manifests carry a compact UTC timestamp in their name, so the lexically last one is newest.
fn latest_run_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let manifests = list_files_with_suffix(manifest_dir, ".json")?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("normalize_run_"))
        })
        .max();

    Ok(manifests)
}

fn list_files_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(suffix));
        if matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
