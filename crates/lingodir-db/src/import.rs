//! CSV bulk loader.
//!
//! Each record names one company in up to four languages plus its tags as
//! `|`-separated lists, one list per language, aligned by position:
//!
//! ```text
//! company_ko,company_en,company_ja,tag_ko,tag_en,tag_ja
//! 원티드랩,Wantedlab,,태그_4|태그_16,tag_4|tag_16,タグ_4|タグ_16
//! ```
//!
//! Rows go through [`DirectoryService::import_row`], so loading the same
//! file twice leaves the directory unchanged.

use std::io::Read;
use std::time::Instant;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use lingodir_core::{DirectoryService, Language, LocalizedNames, TagInput};

/// Failure while loading a CSV file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: lingodir_core::Error,
    },
}

/// Raw CSV record. The `_tw` columns are optional.
#[derive(Debug, Default, Deserialize)]
struct CsvRecord {
    #[serde(default)]
    company_ko: String,
    #[serde(default)]
    company_en: String,
    #[serde(default)]
    company_ja: String,
    #[serde(default)]
    company_tw: String,
    #[serde(default)]
    tag_ko: String,
    #[serde(default)]
    tag_en: String,
    #[serde(default)]
    tag_ja: String,
    #[serde(default)]
    tag_tw: String,
}

/// One parsed row, ready for import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub company_name: LocalizedNames,
    pub tags: Vec<TagInput>,
}

/// Totals reported at the end of a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows_read: u64,
    pub rows_skipped: u64,
    pub companies_created: u64,
    pub links_created: u64,
}

fn split_cell(cell: &str) -> Vec<&str> {
    if cell.trim().is_empty() {
        Vec::new()
    } else {
        cell.split('|').map(str::trim).collect()
    }
}

fn names_from(cells: [(Language, &str); 4]) -> LocalizedNames {
    let mut names = LocalizedNames::new();
    for (lang, cell) in cells {
        let cell = cell.trim();
        if !cell.is_empty() {
            names.set(lang, cell);
        }
    }
    names
}

impl CsvRecord {
    fn into_row(self) -> ImportRow {
        let company_name = names_from([
            (Language::Ko, self.company_ko.as_str()),
            (Language::En, self.company_en.as_str()),
            (Language::Ja, self.company_ja.as_str()),
            (Language::Tw, self.company_tw.as_str()),
        ]);

        let columns = [
            (Language::Ko, split_cell(&self.tag_ko)),
            (Language::En, split_cell(&self.tag_en)),
            (Language::Ja, split_cell(&self.tag_ja)),
            (Language::Tw, split_cell(&self.tag_tw)),
        ];
        let positions = columns.iter().map(|(_, parts)| parts.len()).max().unwrap_or(0);

        let tags = (0..positions)
            .map(|i| {
                let mut names = LocalizedNames::new();
                for (lang, parts) in &columns {
                    if let Some(part) = parts.get(i).filter(|p| !p.is_empty()) {
                        names.set(*lang, *part);
                    }
                }
                names
            })
            .filter(|names| !names.is_empty())
            .map(TagInput::new)
            .collect();

        ImportRow { company_name, tags }
    }
}

/// Parse every record of a CSV stream with a header line.
///
/// Returns `(line, row)` pairs; rows without any company name are kept so
/// the caller can report them.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<(u64, ImportRow)>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let parsed: CsvRecord = record.deserialize(Some(&headers))?;
        rows.push((line, parsed.into_row()));
    }
    Ok(rows)
}

/// Load a CSV stream into the directory.
///
/// Stops at the first row the service rejects; rows already imported stay.
pub async fn load_csv<R: Read>(
    service: &DirectoryService,
    reader: R,
) -> Result<ImportSummary, LoadError> {
    let start = Instant::now();
    let rows = parse_rows(reader)?;
    let mut summary = ImportSummary::default();

    for (line, row) in rows {
        summary.rows_read += 1;
        if row.company_name.is_empty() {
            warn!(
                subsystem = "import",
                component = "loader",
                line,
                "Skipping row without a company name"
            );
            summary.rows_skipped += 1;
            continue;
        }

        let outcome = service
            .import_row(&row.company_name, &row.tags)
            .await
            .map_err(|source| LoadError::Row { line, source })?;

        if outcome.company_created {
            summary.companies_created += 1;
        }
        summary.links_created += outcome.links_created as u64;
        debug!(
            subsystem = "import",
            component = "loader",
            line,
            company_id = outcome.company_id,
            tag_count = row.tags.len(),
            "Row loaded"
        );
    }

    info!(
        subsystem = "import",
        component = "loader",
        op = "load_csv",
        rows_read = summary.rows_read,
        rows_skipped = summary.rows_skipped,
        companies_created = summary.companies_created,
        links_created = summary.links_created,
        duration_ms = start.elapsed().as_millis() as u64,
        "CSV load complete"
    );
    Ok(summary)
}
