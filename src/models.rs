use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ============ Registry Models ============

/// Status value the registry uses to mark a rejected lookup.
pub const REGISTRY_ERROR_STATUS: &str = "ERROR";

/// Body returned by the registry for one CNPJ lookup.
///
/// Every text field is optional in the wire format and decodes to an empty
/// string when absent or `null`. Activity lists keep their entries as raw JSON
/// since the registry does not guarantee each entry is an object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryResponse {
    /// CNPJ echoed back by the registry, usually formatted (`00.000.000/0000-00`).
    pub cnpj: String,
    /// Opening date, kept verbatim (`dd/mm/yyyy` in practice).
    pub abertura: String,
    /// Legal name.
    pub nome: String,
    /// Primary activities; entries look like `{"code": "62.01-5-01", "text": "..."}`.
    pub atividade_principal: Vec<Value>,
    /// Secondary activities, same shape as the primary list.
    pub atividades_secundarias: Vec<Value>,
    /// Timestamp of the registry's last refresh for this entity.
    pub ultima_atualizacao: String,
    /// Share capital as currency text.
    pub capital_social: String,
    /// `"OK"` or `"ERROR"`.
    pub status: String,
    /// The body was a JSON object with no keys at all.
    empty: bool,
}

impl RegistryResponse {
    /// Whether the registry flagged this response as an error.
    pub fn is_error(&self) -> bool {
        self.status == REGISTRY_ERROR_STATUS
    }

    /// Whether the registry answered with an empty object.
    pub fn is_empty(&self) -> bool {
        self.empty
    }
}

/// Wire shape of [`RegistryResponse`].
#[derive(Deserialize)]
struct RegistryFields {
    #[serde(default, deserialize_with = "lenient_string")]
    cnpj: String,
    #[serde(default, deserialize_with = "lenient_string")]
    abertura: String,
    #[serde(default, deserialize_with = "lenient_string")]
    nome: String,
    #[serde(default, deserialize_with = "lenient_list")]
    atividade_principal: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    atividades_secundarias: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    ultima_atualizacao: String,
    #[serde(default, deserialize_with = "lenient_string")]
    capital_social: String,
    #[serde(default, deserialize_with = "lenient_string")]
    status: String,
}

impl<'de> Deserialize<'de> for RegistryResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let body = Map::<String, Value>::deserialize(deserializer)?;
        let empty = body.is_empty();
        let fields: RegistryFields =
            serde_json::from_value(Value::Object(body)).map_err(D::Error::custom)?;

        Ok(Self {
            cnpj: fields.cnpj,
            abertura: fields.abertura,
            nome: fields.nome,
            atividade_principal: fields.atividade_principal,
            atividades_secundarias: fields.atividades_secundarias,
            ultima_atualizacao: fields.ultima_atualizacao,
            capital_social: fields.capital_social,
            status: fields.status,
            empty,
        })
    }
}

/// Decodes any JSON scalar into its text form, `null` into `""`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Decodes a JSON array into its entries; anything else becomes an empty list.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

// ============ Output Models ============

/// One accepted registry lookup, flattened for the enriched file.
///
/// Field renames are the header labels of the enriched file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    #[serde(rename = "CNPJ")]
    pub identifier: String,
    #[serde(rename = "data de abertura")]
    pub opening_date: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "atividade_principal")]
    pub primary_activity_code: String,
    #[serde(rename = "atividade_secundaria")]
    pub secondary_activity_code: String,
    #[serde(rename = "ultima_atualizacao")]
    pub last_update: String,
    #[serde(rename = "capital_social")]
    pub capital_social: String,
}

/// A row annotated with how often its opening date recurs and its rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked<T> {
    pub row: T,
    /// Number of rows sharing this row's opening date.
    pub frequency: usize,
    /// `RANK()`-style position over `frequency` descending, starting at 1.
    pub rank: usize,
}

/// Ranked view of typed enrichment records.
pub type RankedRecord = Ranked<EnrichmentRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let response: RegistryResponse = serde_json::from_value(json!({"status": "OK"})).unwrap();
        assert_eq!(response.cnpj, "");
        assert_eq!(response.abertura, "");
        assert!(response.atividade_principal.is_empty());
        assert!(!response.is_error());
        assert!(!response.is_empty());
    }

    #[test]
    fn test_empty_object_is_flagged() {
        let response: RegistryResponse = serde_json::from_str("{}").unwrap();
        assert!(response.is_empty());
        assert!(!response.is_error());
    }

    #[test]
    fn test_non_object_body_is_an_error() {
        assert!(serde_json::from_str::<RegistryResponse>("[]").is_err());
        assert!(serde_json::from_str::<RegistryResponse>("\"OK\"").is_err());
    }

    #[test]
    fn test_null_and_numeric_fields_become_text() {
        let response: RegistryResponse = serde_json::from_value(json!({
            "nome": null,
            "capital_social": 1500,
            "atividade_principal": "not a list"
        }))
        .unwrap();

        assert_eq!(response.nome, "");
        assert_eq!(response.capital_social, "1500");
        assert!(response.atividade_principal.is_empty());
    }

    #[test]
    fn test_error_status_detected() {
        let response: RegistryResponse = serde_json::from_value(json!({
            "status": "ERROR",
            "message": "CNPJ inválido"
        }))
        .unwrap();
        assert!(response.is_error());
    }
}
