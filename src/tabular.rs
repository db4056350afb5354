use crate::errors::{AppError, ResultExt};
use crate::models::EnrichmentRecord;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::path::Path;

/// Delimiter of the enriched file and of the ranked report.
pub const OUTPUT_DELIMITER: u8 = b';';

/// Columns of the enriched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Identifier,
    OpeningDate,
    Name,
    PrimaryActivity,
    SecondaryActivity,
    LastUpdate,
    CapitalSocial,
}

/// Fixed column order of the enriched file.
pub const ENRICHED_COLUMNS: [Column; 7] = [
    Column::Identifier,
    Column::OpeningDate,
    Column::Name,
    Column::PrimaryActivity,
    Column::SecondaryActivity,
    Column::LastUpdate,
    Column::CapitalSocial,
];

impl Column {
    /// Header label written for this column.
    pub fn label(self) -> &'static str {
        match self {
            Column::Identifier => "CNPJ",
            Column::OpeningDate => "data de abertura",
            Column::Name => "nome",
            Column::PrimaryActivity => "atividade_principal",
            Column::SecondaryActivity => "atividade_secundaria",
            Column::LastUpdate => "ultima_atualizacao",
            Column::CapitalSocial => "capital_social",
        }
    }

    pub fn value(self, record: &EnrichmentRecord) -> &str {
        match self {
            Column::Identifier => &record.identifier,
            Column::OpeningDate => &record.opening_date,
            Column::Name => &record.name,
            Column::PrimaryActivity => &record.primary_activity_code,
            Column::SecondaryActivity => &record.secondary_activity_code,
            Column::LastUpdate => &record.last_update,
            Column::CapitalSocial => &record.capital_social,
        }
    }
}

/// Reads the first field of every non-empty row as an identifier.
///
/// No header detection: a header row is returned like any other row and is
/// dropped later when it normalizes to nothing.
pub fn read_identifiers(path: &Path, delimiter: u8) -> Result<Vec<String>, AppError> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file {}", path.display()))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(file);

    let mut identifiers = Vec::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("Failed to read {}", path.display()))?;
        if let Some(first) = row.get(0) {
            identifiers.push(first.to_string());
        }
    }

    tracing::debug!(
        "Read {} identifiers from {}",
        identifiers.len(),
        path.display()
    );
    Ok(identifiers)
}

/// Writes a header of column labels followed by one row per record.
///
/// Rejected lookups never become records, so every record is written, even
/// one whose fields are all empty.
pub fn write_records(
    path: &Path,
    records: &[EnrichmentRecord],
    columns: &[Column],
    delimiter: u8,
) -> Result<usize, AppError> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;

    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(file);
    writer.write_record(columns.iter().map(|c| c.label()))?;

    let mut written = 0;
    for record in records {
        writer.write_record(columns.iter().map(|c| c.value(record)))?;
        written += 1;
    }
    writer.flush()?;

    Ok(written)
}

/// Reads an enriched file written with [`ENRICHED_COLUMNS`] back into records.
pub fn read_records(path: &Path, delimiter: u8) -> Result<Vec<EnrichmentRecord>, AppError> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open enriched file {}", path.display()))?;

    let mut reader = ReaderBuilder::new().delimiter(delimiter).from_reader(file);
    let records = reader
        .deserialize()
        .collect::<Result<Vec<EnrichmentRecord>, csv::Error>>()?;

    Ok(records)
}
