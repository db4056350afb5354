use clap::Parser;
use cnpj_enrichment::config::{parse_delimiter, validate_base_url, Config};
use cnpj_enrichment::pipeline::{Pipeline, PipelinePaths};
use cnpj_enrichment::services::ReceitaWsService;
use cnpj_enrichment::throttle::TokioClock;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Enrich CNPJ numbers from the ReceitaWS registry and rank them by opening date.
#[derive(Debug, Parser)]
#[command(name = "cnpj-enrichment", version)]
struct Args {
    /// Input file with one CNPJ in the first field of each row
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Enriched output file (semicolon-delimited)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ranked report file (semicolon-delimited)
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Seconds to wait after every registry lookup
    #[arg(long)]
    delay_secs: Option<u64>,

    /// Registry base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Delimiter of the input file
    #[arg(long)]
    input_delimiter: Option<String>,

    /// Only write the enriched file, skip the ranked report
    #[arg(long)]
    skip_report: bool,
}

impl Args {
    fn apply(self, mut config: Config) -> anyhow::Result<Config> {
        if let Some(input) = self.input {
            config.input_file = input;
        }
        if let Some(output) = self.output {
            config.output_file = output;
        }
        if let Some(report) = self.report {
            config.report_file = report;
        }
        if let Some(delay) = self.delay_secs {
            config.request_delay_secs = delay;
        }
        if let Some(url) = self.base_url {
            config.registry_base_url = validate_base_url(url)?;
        }
        if let Some(delimiter) = self.input_delimiter {
            config.input_delimiter = parse_delimiter(&delimiter)?;
        }
        if self.skip_report {
            config.generate_report = false;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cnpj_enrichment=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.apply(Config::from_env()?)?;
    tracing::info!("Configuration loaded successfully");

    let service = ReceitaWsService::new(&config)?;
    let pipeline = Pipeline::new(
        service,
        Duration::from_secs(config.request_delay_secs),
        TokioClock,
    );

    let paths = PipelinePaths::from_config(&config);
    let summary = pipeline.run(&paths).await?;

    tracing::info!(
        "Looked up {} of {} identifiers, {} records enriched",
        summary.attempts,
        summary.total,
        summary.enriched
    );
    if paths.report.is_some() {
        tracing::info!("Ranked report saved to {}", config.report_file.display());
    }

    Ok(())
}
