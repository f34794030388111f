//! CSV codec for university listings
//!
//! Produces the `Name,Abbreviation,Country,Path` document offered for
//! download and reads the paginated listing the service returns.

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::warn;
use unisearch_common::University;

use crate::error::{DirectoryError, Result};

pub const HEADER: [&str; 4] = ["Name", "Abbreviation", "Country", "Path"];

/// Encode rows as a CSV document.
///
/// The header line is bare; every data field is quoted, with embedded quotes
/// doubled. Lines are joined by `\n` without a trailing newline.
pub fn encode_universities(rows: &[University]) -> Result<Vec<u8>> {
    let mut buf = HEADER.join(",").into_bytes();
    buf.push(b'\n');

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);

    for row in rows {
        writer.write_record([
            row.name.as_str(),
            row.abbreviation.as_str(),
            row.country.as_str(),
            row.path.as_deref().unwrap_or(""),
        ])?;
    }

    let mut buf = writer
        .into_inner()
        .map_err(|e| DirectoryError::Csv(e.into_error().into()))?;
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    Ok(buf)
}

/// Positions of the known columns in a header row, matched case-insensitively.
#[derive(Debug, Clone, Copy)]
struct Columns {
    name: usize,
    abbreviation: Option<usize>,
    country: Option<usize>,
    path: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |wanted: &str| {
            headers.iter().position(|h| {
                h.trim_start_matches('\u{feff}')
                    .trim()
                    .eq_ignore_ascii_case(wanted)
            })
        };

        Ok(Self {
            name: find("name").ok_or(DirectoryError::MissingNameColumn)?,
            abbreviation: find("abbreviation"),
            country: find("country"),
            path: find("path"),
        })
    }

    fn read(&self, record: &StringRecord) -> University {
        let field = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };

        University::new(field(Some(self.name)))
            .with_abbreviation(field(self.abbreviation))
            .with_country(field(self.country))
            .with_path(field(self.path))
    }
}

/// Decode a CSV listing. An empty body is an empty page, not an error.
///
/// Rows that fail to parse or have a blank name are skipped with a warning.
pub fn decode_universities(body: &str) -> Result<Vec<University>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let columns = Columns::from_headers(reader.headers()?)?;

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let line = index + 2;
        match result {
            Ok(record) => {
                let university = columns.read(&record);
                if university.name.trim().is_empty() {
                    warn!("Skipping CSV line {} without a name", line);
                    continue;
                }
                rows.push(university);
            }
            Err(e) => warn!("Error parsing CSV line {}: {}", line, e),
        }
    }

    Ok(rows)
}
