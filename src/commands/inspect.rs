use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::InspectArgs;
use crate::record::{NormalizedRecord, TextCleaner, decode_key, lookup_key};

#[derive(Debug, Serialize)]
struct InspectResponse {
    id: String,
    title: String,
    page_id: Option<i64>,
    is_redirect: bool,
    redirect_to: Value,
    url: String,
    section_count: usize,
    link_count: usize,
    sections: Vec<SectionView>,
}

#[derive(Debug, Serialize)]
struct SectionView {
    key: String,
    title: String,
    index: u32,
    link_count: usize,
    text: String,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let file = File::open(&args.records)
        .with_context(|| format!("failed to open {}", args.records.display()))?;

    let Some(record) = find_record(BufReader::new(file), &args.id)? else {
        bail!("no record with id {:?} in {}", args.id, args.records.display());
    };
    info!(id = %record.id, sections = record.sections.len(), "found record");

    let cleaner = TextCleaner::new()?;
    let mut sections = section_views(&record, &cleaner);
    if let Some(title) = &args.section {
        if record.section(title).is_none() {
            bail!("record {:?} has no section titled {:?}", record.id, title);
        }
        let key = lookup_key(title);
        sections.retain(|view| view.key == key);
    }

    let response = InspectResponse {
        id: record.id.clone(),
        title: record.title.clone(),
        page_id: record.page_id.as_i64(),
        is_redirect: record.is_redirect,
        redirect_to: record.redirect_to.clone(),
        url: record.url.clone(),
        section_count: record.sections.len(),
        link_count: record.link_count(),
        sections,
    };

    if args.json {
        write_json_response(&response)
    } else {
        write_text_response(&response)
    }
}

/// Scans a record stream for the first record whose `_id` equals `id` exactly.
fn find_record<R: BufRead>(reader: R, id: &str) -> Result<Option<NormalizedRecord>> {
    for (line_idx, line) in reader.lines().enumerate() {
        let line_number = line_idx + 1;
        let line = line.with_context(|| format!("failed to read records line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: NormalizedRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(err) => {
                warn!(line = line_number, error = %err, "skipping unreadable record");
                continue;
            }
        };

        if record.id == id {
            return Ok(Some(record));
        }
    }

    Ok(None)
}

fn section_views(record: &NormalizedRecord, cleaner: &TextCleaner) -> Vec<SectionView> {
    let mut views = record
        .sections
        .iter()
        .map(|(key, section)| SectionView {
            key: key.clone(),
            title: decode_key(key),
            index: section.index,
            link_count: section.links.len(),
            text: cleaner.clean(&section.text),
        })
        .collect::<Vec<_>>();

    views.sort_by(|a, b| a.index.cmp(&b.index).then(a.key.cmp(&b.key)));
    views
}

fn write_json_response(response: &InspectResponse) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, response)
        .context("failed to serialize inspect json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_response(response: &InspectResponse) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Record: {}", response.id)?;
    writeln!(
        output,
        "Title: {} page_id={} redirect={} redirect_to={}",
        response.title,
        response
            .page_id
            .map_or_else(|| "NaN".to_string(), |id| id.to_string()),
        response.is_redirect,
        render_redirect_target(&response.redirect_to),
    )?;
    writeln!(output, "URL: {}", response.url)?;
    writeln!(
        output,
        "Sections: {} Links: {}",
        response.section_count, response.link_count
    )?;

    for section in &response.sections {
        writeln!(output)?;
        writeln!(
            output,
            "[{}] {} (links={})",
            section.index, section.title, section.link_count
        )?;
        if !section.text.is_empty() {
            writeln!(output, "{}", section.text)?;
        }
    }

    output.flush()?;
    Ok(())
}

fn render_redirect_target(target: &Value) -> String {
    match target {
        Value::Null => String::new(),
        Value::String(title) => title.clone(),
        other => other.to_string(),
    }
}
