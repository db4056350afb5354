//! Frequency classification of enriched records by opening date.
//!
//! Rows are grouped by their opening date and each group is counted. Groups
//! are ranked by count, highest first, with `RANK()` tie semantics: groups
//! with equal counts share a rank, and the next lower count is ranked one past
//! the number of groups above it.

use crate::errors::{AppError, ResultExt};
use crate::models::{EnrichmentRecord, Ranked, RankedRecord};
use crate::tabular::{self, Column};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Header label appended for the group size column.
pub const FREQUENCY_LABEL: &str = "frequencia";
/// Header label appended for the rank column.
pub const RANK_LABEL: &str = "rank";

/// Annotates every row with its group's frequency and rank.
///
/// Output is ordered by frequency descending. The sort is stable, so rows with
/// equal frequency keep their input order.
pub fn rank_by_frequency<T, F>(rows: Vec<T>, key: F) -> Vec<Ranked<T>>
where
    F: Fn(&T) -> &str,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in &rows {
        *counts.entry(key(row).to_string()).or_default() += 1;
    }

    let mut frequencies: Vec<usize> = counts.values().copied().collect();
    frequencies.sort_unstable_by(|a, b| b.cmp(a));

    // frequencies is sorted descending with one entry per group, so the first
    // position of a value is the number of groups strictly above it.
    let mut rank_of: HashMap<usize, usize> = HashMap::new();
    for (position, frequency) in frequencies.iter().enumerate() {
        rank_of.entry(*frequency).or_insert(position + 1);
    }

    let mut ranked: Vec<Ranked<T>> = rows
        .into_iter()
        .map(|row| {
            let frequency = counts.get(key(&row)).copied().unwrap_or_default();
            let rank = rank_of.get(&frequency).copied().unwrap_or_default();
            Ranked {
                row,
                frequency,
                rank,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    ranked
}

/// Ranks typed records by how often their opening date recurs.
pub fn rank_records(records: Vec<EnrichmentRecord>) -> Vec<RankedRecord> {
    rank_by_frequency(records, |r| r.opening_date.as_str())
}

/// Loads an enriched file as typed records and ranks them.
pub fn classify_records(path: &Path, delimiter: u8) -> Result<Vec<RankedRecord>, AppError> {
    let records = tabular::read_records(path, delimiter)?;
    Ok(rank_records(records))
}

/// A ranked delimited file: original header plus the ranked rows.
#[derive(Debug, Clone)]
pub struct RankedTable {
    pub headers: StringRecord,
    pub rows: Vec<Ranked<StringRecord>>,
}

impl RankedTable {
    /// Original header followed by the frequency and rank labels.
    pub fn report_headers(&self) -> Vec<&str> {
        self.headers
            .iter()
            .chain([FREQUENCY_LABEL, RANK_LABEL])
            .collect()
    }
}

/// Loads an enriched file and ranks its rows by opening date.
///
/// Every column is kept as text. The grouping column is found by its header
/// label.
pub fn classify_file(path: &Path, delimiter: u8) -> Result<RankedTable, AppError> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open enriched file {}", path.display()))?;

    let mut reader = ReaderBuilder::new().delimiter(delimiter).from_reader(file);
    let headers = reader.headers()?.clone();

    let label = Column::OpeningDate.label();
    let key_index = headers
        .iter()
        .position(|h| h == label)
        .ok_or_else(|| AppError::MissingColumn(label.to_string()))?;

    let rows = reader
        .records()
        .collect::<Result<Vec<StringRecord>, csv::Error>>()
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let rows = rank_by_frequency(rows, |row| row.get(key_index).unwrap_or(""));

    Ok(RankedTable { headers, rows })
}

/// Writes a ranked table with the given delimiter.
pub fn write_report(path: &Path, table: &RankedTable, delimiter: u8) -> Result<(), AppError> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;

    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(file);
    writer.write_record(table.report_headers())?;

    for ranked in &table.rows {
        let mut row = ranked.row.clone();
        row.push_field(&ranked.frequency.to_string());
        row.push_field(&ranked.rank.to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Classifies `input` and writes the report to `output` with the same delimiter.
pub fn classify_to_report(
    input: &Path,
    output: &Path,
    delimiter: u8,
) -> Result<RankedTable, AppError> {
    let table = classify_file(input, delimiter)?;
    write_report(output, &table, delimiter)?;

    tracing::info!(
        "Ranked {} rows by opening date into {}",
        table.rows.len(),
        output.display()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranks(dates: &[&str]) -> Vec<(String, usize, usize)> {
        let rows: Vec<String> = dates.iter().map(|d| d.to_string()).collect();
        rank_by_frequency(rows, |d| d.as_str())
            .into_iter()
            .map(|r| (r.row, r.frequency, r.rank))
            .collect()
    }

    #[test]
    fn test_majority_group_ranks_first() {
        assert_eq!(
            ranks(&["A", "A", "B"]),
            vec![
                ("A".to_string(), 2, 1),
                ("A".to_string(), 2, 1),
                ("B".to_string(), 1, 2),
            ]
        );
    }

    #[test]
    fn test_tied_groups_share_rank() {
        let result = ranks(&["A", "A", "B", "B"]);
        assert!(result.iter().all(|(_, frequency, rank)| *frequency == 2 && *rank == 1));
    }

    #[test]
    fn test_rank_skips_past_tied_groups() {
        let result = ranks(&["A", "B", "A", "B", "C"]);
        let c = result.iter().find(|(d, _, _)| d == "C").unwrap();
        assert_eq!((c.1, c.2), (1, 3));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let result = ranks(&["B", "A", "B", "A"]);
        let order: Vec<&str> = result.iter().map(|(d, _, _)| d.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "B", "A"]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(ranks(&[]).is_empty());
    }

    #[test]
    fn test_empty_opening_date_is_its_own_group() {
        let result = ranks(&["", "", "A"]);
        assert_eq!(result[0], (String::new(), 2, 1));
        assert_eq!(result[2], ("A".to_string(), 1, 2));
    }

    #[test]
    fn test_report_headers_append_labels() {
        let table = RankedTable {
            headers: StringRecord::from(vec!["CNPJ", "data de abertura"]),
            rows: Vec::new(),
        };
        assert_eq!(
            table.report_headers(),
            vec!["CNPJ", "data de abertura", "frequencia", "rank"]
        );
    }
}
