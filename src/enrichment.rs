/// Record extraction from registry responses
///
/// 1. Normalize identifiers and codes to digits
/// 2. Pull the activity code from the first entry of each activity list
/// 3. Flatten a registry response into an `EnrichmentRecord`
use crate::models::{EnrichmentRecord, RegistryResponse};
use serde_json::Value;

/// Strips every character that is not an ASCII decimal digit.
///
/// The result may be empty, which callers treat as an invalid identifier.
pub fn normalize_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Digits of an activity entry's `code` field.
///
/// Returns an empty string when the entry is not an object or has no `code`.
pub fn activity_code(entry: &Value) -> String {
    match entry.as_object().and_then(|obj| obj.get("code")) {
        Some(Value::String(code)) => normalize_digits(code),
        Some(Value::Null) | None => String::new(),
        Some(other) => normalize_digits(&other.to_string()),
    }
}

/// Code of the first entry in an activity list; further entries are ignored.
fn first_activity_code(activities: &[Value]) -> String {
    activities.first().map(activity_code).unwrap_or_default()
}

/// Flattens a registry response into an enrichment record.
///
/// Returns `None` for a missing or empty response, or one carrying the
/// registry's error status. Rejection is silent.
pub fn extract_record(response: Option<&RegistryResponse>) -> Option<EnrichmentRecord> {
    let response = response?;
    if response.is_empty() {
        tracing::debug!("Registry response is empty, discarding");
        return None;
    }
    if response.is_error() {
        tracing::debug!("Registry response carries error status, discarding");
        return None;
    }

    Some(EnrichmentRecord {
        identifier: normalize_digits(&response.cnpj),
        opening_date: response.abertura.clone(),
        name: response.nome.clone(),
        primary_activity_code: first_activity_code(&response.atividade_principal),
        secondary_activity_code: first_activity_code(&response.atividades_secundarias),
        last_update: response.ultima_atualizacao.clone(),
        capital_social: response.capital_social.clone(),
    })
}
