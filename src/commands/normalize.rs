use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::NormalizeArgs;
use crate::model::{
    NormalizeCounts, NormalizeOptions, NormalizePaths, NormalizeRunManifest, SourceFile,
};
use crate::record::{Document, normalize_document};
use crate::util::{
    ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
};

const MAX_RECORDED_WARNINGS: usize = 200;

#[derive(Debug, Default)]
pub struct StreamOutcome {
    pub counts: NormalizeCounts,
    pub warnings: Vec<String>,
}

impl StreamOutcome {
    fn record_warning(&mut self, message: String) {
        if self.warnings.len() < MAX_RECORDED_WARNINGS {
            self.warnings.push(message);
        }
    }
}

pub fn run(args: NormalizeArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let cache_root = args.cache_root.clone();
    let manifest_dir = cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    if !args.input.is_file() {
        bail!("input file not found: {}", args.input.display());
    }

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cache_root, &args.input));
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "normalize_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });

    info!(
        input = %args.input.display(),
        output = %output_path.display(),
        run_id = %run_id,
        "starting normalize"
    );

    let input_digest = sha256_file(&args.input)?;

    let input = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    if let Some(parent) = output_path.parent() {
        ensure_directory(parent)?;
    }
    let output = File::create(&output_path)
        .with_context(|| format!("failed to create {}", output_path.display()))?;

    let options = NormalizeOptions {
        skip_redirects: args.skip_redirects,
        max_documents: args.max_documents,
    };

    let mut writer = BufWriter::new(output);
    let outcome = normalize_stream(BufReader::new(input), &mut writer, &options)?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", output_path.display()))?;

    let counts = outcome.counts;
    info!(
        documents_read = counts.documents_read,
        records_written = counts.records_written,
        redirects_skipped = counts.redirects_skipped,
        malformed_skipped = counts.malformed_skipped,
        sections_written = counts.sections_written,
        section_key_collisions = counts.section_key_collisions,
        links_written = counts.links_written,
        unparsed_page_ids = counts.unparsed_page_ids,
        "normalize counts"
    );

    let manifest = NormalizeRunManifest {
        manifest_version: 1,
        run_id,
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_normalize_command(&args),
        options,
        paths: NormalizePaths {
            cache_root: cache_root.display().to_string(),
            input_path: args.input.display().to_string(),
            output_path: output_path.display().to_string(),
            manifest_path: manifest_path.display().to_string(),
        },
        source: SourceFile {
            path: args.input.display().to_string(),
            sha256: input_digest.sha256,
            size_bytes: input_digest.size_bytes,
        },
        counts,
        warnings: outcome.warnings,
    };

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote normalize run manifest");

    Ok(())
}

/// Normalizes one document per input line and writes one record per output line.
///
/// Lines that fail to decode are logged and skipped; only I/O failures abort the stream.
pub fn normalize_stream<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    options: &NormalizeOptions,
) -> Result<StreamOutcome> {
    let mut outcome = StreamOutcome::default();

    for (line_idx, line) in reader.lines().enumerate() {
        if options
            .max_documents
            .is_some_and(|max| outcome.counts.documents_read >= max)
        {
            info!(max_documents = ?options.max_documents, "document limit reached");
            break;
        }

        let line_number = line_idx + 1;
        let line = line.with_context(|| format!("failed to read input line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }
        outcome.counts.documents_read += 1;

        let document: Document = match serde_json::from_str(&line) {
            Ok(document) => document,
            Err(err) => {
                warn!(line = line_number, error = %err, "skipping malformed document");
                outcome.counts.malformed_skipped += 1;
                outcome.record_warning(format!("line {line_number}: malformed document: {err}"));
                continue;
            }
        };

        if options.skip_redirects && document.is_redirect {
            outcome.counts.redirects_skipped += 1;
            continue;
        }

        let record = normalize_document(&document);

        let collisions = document.sections.len() - record.sections.len();
        if collisions > 0 {
            warn!(
                line = line_number,
                id = %record.id,
                collisions,
                "section keys collided; later sections kept"
            );
            outcome.counts.section_key_collisions += collisions;
            outcome.record_warning(format!(
                "line {line_number}: {collisions} section key collision(s) in {:?}",
                record.id
            ));
        }

        if record.page_id.is_nan() {
            warn!(line = line_number, id = %record.id, "page id is not numeric");
            outcome.counts.unparsed_page_ids += 1;
            outcome.record_warning(format!(
                "line {line_number}: non-numeric page id in {:?}",
                record.id
            ));
        }

        serde_json::to_writer(&mut writer, &record)
            .with_context(|| format!("failed to write record for line {line_number}"))?;
        writer
            .write_all(b"\n")
            .with_context(|| format!("failed to write record for line {line_number}"))?;

        outcome.counts.records_written += 1;
        outcome.counts.sections_written += record.sections.len();
        outcome.counts.links_written += record.link_count();
    }

    Ok(outcome)
}

fn default_output_path(cache_root: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("documents");
    cache_root
        .join("records")
        .join(format!("{stem}.records.jsonl"))
}

fn render_normalize_command(args: &NormalizeArgs) -> String {
    let mut command = vec![
        "wikirecords".to_string(),
        "normalize".to_string(),
        "--cache-root".to_string(),
        args.cache_root.display().to_string(),
        "--input".to_string(),
        args.input.display().to_string(),
    ];

    if let Some(path) = &args.output {
        command.push("--output".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if args.skip_redirects {
        command.push("--skip-redirects".to_string());
    }
    if let Some(max_documents) = args.max_documents {
        command.push("--max-documents".to_string());
        command.push(max_documents.to_string());
    }

    command.join(" ")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::record::NormalizedRecord;

    const DOG: &str = r#"{"title":"Dog","pageID":"123","isRedirect":false,"redirectTo":"","url":"https://en.wikipedia.org/wiki/Dog","sections":[{"title":"","index":0,"text":"A dog is...","sentences":[{"links":[{"type":"internal","page":"Canine"}]}]}]}"#;
    const DOGGO: &str = r#"{"title":"Doggo","pageID":"124","isRedirect":true,"redirectTo":"Dog","url":"u","sections":[]}"#;

    fn options(skip_redirects: bool, max_documents: Option<usize>) -> NormalizeOptions {
        NormalizeOptions {
            skip_redirects,
            max_documents,
        }
    }

    fn run_stream(input: &str, options: &NormalizeOptions) -> (StreamOutcome, Vec<NormalizedRecord>) {
        let mut output = Vec::new();
        let outcome = normalize_stream(Cursor::new(input), &mut output, options).unwrap();
        let records = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (outcome, records)
    }

    #[test]
    fn writes_one_record_per_document() {
        let input = format!("{DOG}\n\n{DOGGO}\n");

        let (outcome, records) = run_stream(&input, &options(false, None));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "Dog");
        assert_eq!(records[1].redirect_to, serde_json::json!("Dog"));
        assert_eq!(outcome.counts.documents_read, 2);
        assert_eq!(outcome.counts.records_written, 2);
        assert_eq!(outcome.counts.sections_written, 1);
        assert_eq!(outcome.counts.links_written, 1);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let input = format!("{{not json\n{DOG}\n");

        let (outcome, records) = run_stream(&input, &options(false, None));

        assert_eq!(records.len(), 1);
        assert_eq!(outcome.counts.malformed_skipped, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].starts_with("line 1:"));
    }

    #[test]
    fn skip_redirects_drops_redirect_documents() {
        let input = format!("{DOGGO}\n{DOG}\n");

        let (outcome, records) = run_stream(&input, &options(true, None));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "Dog");
        assert_eq!(outcome.counts.redirects_skipped, 1);
    }

    #[test]
    fn max_documents_limits_the_run() {
        let input = format!("{DOG}\n{DOGGO}\n{DOG}\n");

        let (outcome, records) = run_stream(&input, &options(false, Some(2)));

        assert_eq!(records.len(), 2);
        assert_eq!(outcome.counts.documents_read, 2);
    }

    #[test]
    fn collisions_and_bad_page_ids_are_counted() {
        let input = r#"{"title":"Odd","pageID":"n/a","sections":[{"title":"","index":0,"text":"a"},{"title":"","index":0,"text":"b"}]}"#;

        let (outcome, records) = run_stream(input, &options(false, None));

        assert_eq!(records.len(), 1);
        assert!(records[0].page_id.is_nan());
        assert_eq!(records[0].sections["Abstract"].text, "b");
        assert_eq!(outcome.counts.section_key_collisions, 1);
        assert_eq!(outcome.counts.unparsed_page_ids, 1);
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[test]
    fn object_shaped_wiki_and_redirect_fields_are_kept() {
        let interwiki = r#"{"title":"Chien","pageID":"9","sections":[{"title":"","index":0,"text":"t","sentences":[{"links":[{"type":"interwiki","wiki":{"lang":"fr"},"text":"Chien"}]}]}]}"#;
        let redirect = r#"{"title":"Doggo","pageID":"10","isRedirect":true,"redirectTo":{"page":"Dog","raw":"[[Dog]]"},"url":"u"}"#;
        let input = format!("{interwiki}\n{redirect}\n");

        let (outcome, records) = run_stream(&input, &options(false, None));

        assert_eq!(outcome.counts.malformed_skipped, 0);
        assert_eq!(outcome.counts.records_written, 2);
        assert_eq!(
            records[0].sections["Abstract"].links[0].wiki,
            Some(serde_json::json!({"lang": "fr"}))
        );
        assert_eq!(
            records[1].redirect_to,
            serde_json::json!({"page": "Dog", "raw": "[[Dog]]"})
        );
    }

    #[test]
    fn default_output_lands_under_records_dir() {
        let path = default_output_path(Path::new("cache"), Path::new("/data/enwiki-part1.jsonl"));
        assert_eq!(path, Path::new("cache/records/enwiki-part1.records.jsonl"));
    }
}
