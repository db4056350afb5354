use crate::errors::AppError;
use std::path::PathBuf;

pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://www.receitaws.com.br/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub report_file: PathBuf,
    pub registry_base_url: String,
    pub request_delay_secs: u64,
    pub request_timeout_secs: u64,
    pub input_delimiter: u8,
    pub generate_report: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("dados_iniciais.csv"),
            output_file: PathBuf::from("dados_tratados.csv"),
            report_file: PathBuf::from("dados_classificados.csv"),
            registry_base_url: DEFAULT_REGISTRY_BASE_URL.to_string(),
            request_delay_secs: 20,
            request_timeout_secs: 30,
            input_delimiter: b',',
            generate_report: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            input_file: var("CNPJ_INPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.input_file),
            output_file: var("CNPJ_OUTPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_file),
            report_file: var("CNPJ_REPORT_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.report_file),
            registry_base_url: var("RECEITAWS_BASE_URL")
                .map(validate_base_url)
                .transpose()?
                .unwrap_or(defaults.registry_base_url),
            request_delay_secs: var("REQUEST_DELAY_SECS")
                .map(|v| {
                    v.trim().parse().map_err(|_| {
                        AppError::Config("REQUEST_DELAY_SECS must be a whole number of seconds".into())
                    })
                })
                .transpose()?
                .unwrap_or(defaults.request_delay_secs),
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .map(|v| match v.trim().parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(secs),
                    _ => Err(AppError::Config(
                        "REQUEST_TIMEOUT_SECS must be a positive number of seconds".into(),
                    )),
                })
                .transpose()?
                .unwrap_or(defaults.request_timeout_secs),
            input_delimiter: lookup("INPUT_DELIMITER")
                .filter(|v| !v.is_empty())
                .map(|v| parse_delimiter(&v))
                .transpose()?
                .unwrap_or(defaults.input_delimiter),
            generate_report: defaults.generate_report,
        };

        tracing::debug!("Input file: {}", config.input_file.display());
        tracing::debug!("Output file: {}", config.output_file.display());
        tracing::debug!("Registry Base URL: {}", config.registry_base_url);
        tracing::debug!("Request delay: {}s", config.request_delay_secs);

        Ok(config)
    }
}

/// Rejects registry URLs without an `http://` or `https://` scheme.
pub fn validate_base_url(url: String) -> Result<String, AppError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::Config(
            "RECEITAWS_BASE_URL must start with http:// or https://".into(),
        ));
    }
    Ok(url)
}

/// Accepts a single ASCII character, or `\t` for tab.
pub fn parse_delimiter(value: &str) -> Result<u8, AppError> {
    match value {
        "\\t" => Ok(b'\t'),
        v if v.len() == 1 && v.is_ascii() => Ok(v.as_bytes()[0]),
        _ => Err(AppError::Config(format!(
            "Delimiter must be a single ASCII character, got '{}'",
            value
        ))),
    }
}
