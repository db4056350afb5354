use crate::config::Config;
use crate::enrichment::normalize_digits;
use crate::errors::AppError;
use crate::models::RegistryResponse;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A registry that answers one CNPJ lookup at a time.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Fetches the registry entry for an already-normalized CNPJ.
    ///
    /// Any transport problem, non-success status or undecodable body is an error.
    async fn fetch(&self, cnpj: &str) -> Result<RegistryResponse, AppError>;
}

/// Client for the ReceitaWS public CNPJ API.
pub struct ReceitaWsService {
    client: Client,
    base_url: Url,
}

impl ReceitaWsService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Self::with_base_url(
            &config.registry_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Builds a client against an explicit base URL (e.g. a mock server).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid registry URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "Registry URL '{}' cannot be used as a base",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::ExternalApiError(format!("Failed to create registry client: {}", e))
        })?;

        Ok(Self { client, base_url })
    }

    /// `{base}/cnpj/{digits}`
    fn lookup_url(&self, cnpj: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("cnpj").push(cnpj);
        }
        url
    }
}

#[async_trait]
impl RegistrySource for ReceitaWsService {
    async fn fetch(&self, cnpj: &str) -> Result<RegistryResponse, AppError> {
        let url = self.lookup_url(cnpj);
        tracing::debug!("Registry URL: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::ExternalApiError(format!("Registry request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Registry returned status {}: {}",
                status, error_text
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to read registry response: {}", e))
        })?;
        let result: RegistryResponse = serde_json::from_slice(&body)?;

        Ok(result)
    }
}

/// Result of one lookup attempt.
#[derive(Debug)]
pub enum LookupOutcome {
    /// Identifier had no digits; the registry was not contacted.
    Invalid,
    /// The registry could not be reached or answered badly.
    Failed(AppError),
    /// Decoded registry body, which may still carry an error status.
    Found(RegistryResponse),
}

/// Normalizes `identifier` and queries the registry once.
///
/// Transport failures are logged with the offending identifier and reported
/// as `Failed`; there is no retry.
pub async fn lookup<S>(source: &S, identifier: &str) -> LookupOutcome
where
    S: RegistrySource + ?Sized,
{
    let cnpj = normalize_digits(identifier);
    if cnpj.is_empty() {
        return LookupOutcome::Invalid;
    }

    match source.fetch(&cnpj).await {
        Ok(response) => LookupOutcome::Found(response),
        Err(e) => {
            tracing::error!(identifier = %identifier, cause = %e, "Failed to query CNPJ");
            LookupOutcome::Failed(e)
        }
    }
}
