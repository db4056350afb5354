/// File-level tests for the enriched file and the ranked report
use cnpj_enrichment::classifier::{classify_file, classify_records, classify_to_report};
use cnpj_enrichment::errors::AppError;
use cnpj_enrichment::models::EnrichmentRecord;
use cnpj_enrichment::tabular::{read_records, write_records, ENRICHED_COLUMNS, OUTPUT_DELIMITER};

fn record(cnpj: &str, opening_date: &str) -> EnrichmentRecord {
    EnrichmentRecord {
        identifier: cnpj.to_string(),
        opening_date: opening_date.to_string(),
        name: "PADARIA SÃO JOÃO LTDA".to_string(),
        primary_activity_code: "1091102".to_string(),
        secondary_activity_code: String::new(),
        last_update: "2024-01-15T10:00:00.000Z".to_string(),
        capital_social: "R$ 15.000,00".to_string(),
    }
}

#[test]
fn test_enriched_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dados_tratados.csv");
    let records = vec![
        record("11222333000181", "01/02/2003"),
        record("99888777000166", ""),
    ];

    let written = write_records(&path, &records, &ENRICHED_COLUMNS, OUTPUT_DELIMITER).unwrap();
    let read_back = read_records(&path, OUTPUT_DELIMITER).unwrap();

    assert_eq!(written, 2);
    assert_eq!(read_back, records);
}

#[test]
fn test_header_only_file_for_no_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dados_tratados.csv");

    write_records(&path, &[], &ENRICHED_COLUMNS, OUTPUT_DELIMITER).unwrap();

    assert!(read_records(&path, OUTPUT_DELIMITER).unwrap().is_empty());
    let table = classify_file(&path, OUTPUT_DELIMITER).unwrap();
    assert!(table.rows.is_empty());
}

#[test]
fn test_classify_written_file() {
    let dir = tempfile::tempdir().unwrap();
    let enriched = dir.path().join("dados_tratados.csv");
    let report = dir.path().join("dados_classificados.csv");
    let records = vec![
        record("1", "B"),
        record("2", "A"),
        record("3", "A"),
        record("4", "B"),
        record("5", "C"),
    ];
    write_records(&enriched, &records, &ENRICHED_COLUMNS, OUTPUT_DELIMITER).unwrap();

    let table = classify_to_report(&enriched, &report, OUTPUT_DELIMITER).unwrap();

    let summary: Vec<(&str, usize, usize)> = table
        .rows
        .iter()
        .map(|r| (r.row.get(0).unwrap(), r.frequency, r.rank))
        .collect();
    assert_eq!(
        summary,
        vec![("1", 2, 1), ("2", 2, 1), ("3", 2, 1), ("4", 2, 1), ("5", 1, 3)]
    );

    let text = std::fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "CNPJ;data de abertura;nome;atividade_principal;atividade_secundaria;ultima_atualizacao;capital_social;frequencia;rank"
    );
    assert_eq!(lines.len(), 6);
    assert!(lines[5].starts_with("5;C;"));
    assert!(lines[5].ends_with(";1;3"));
}

#[test]
fn test_classify_requires_opening_date_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("other.csv");
    std::fs::write(&path, "CNPJ;nome\n1;X\n").unwrap();

    let result = classify_file(&path, OUTPUT_DELIMITER);

    assert!(matches!(result, Err(AppError::MissingColumn(_))));
}

#[test]
fn test_classify_typed_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dados_tratados.csv");
    let records = vec![record("1", "A"), record("2", "B"), record("3", "A")];
    write_records(&path, &records, &ENRICHED_COLUMNS, OUTPUT_DELIMITER).unwrap();

    let ranked = classify_records(&path, OUTPUT_DELIMITER).unwrap();

    let ids: Vec<(&str, usize, usize)> = ranked
        .iter()
        .map(|r| (r.row.identifier.as_str(), r.frequency, r.rank))
        .collect();
    assert_eq!(ids, vec![("1", 2, 1), ("3", 2, 1), ("2", 1, 2)]);
}
