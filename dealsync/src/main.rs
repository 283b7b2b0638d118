//! dealsync binary entry point

use clap::Parser;

use dealsync::services::{CsvDealSource, PipedriveClient};
use dealsync::{DealSync, EXIT_OK, SyncConfig, SyncResult, exit_code};
use shared::RunId;
use shared::logging::{init_tracing_with_level, log_error};

#[tokio::main]
async fn main() -> SyncResult<()> {
    // A missing .env file is fine, the environment may already be set
    let _ = dotenvy::dotenv();
    let config = SyncConfig::parse();

    init_tracing_with_level(Some(&config.log_level), config.log_format)?;

    let run_id = RunId::new();
    let report = match run(&config, run_id).await {
        Ok(report) => report,
        Err(e) => {
            log_error(&run_id, "Deal sync", &e);
            return Err(e);
        }
    };

    let code = exit_code(&report, config.strict);
    if code != EXIT_OK {
        std::process::exit(code);
    }
    Ok(())
}

async fn run(config: &SyncConfig, run_id: RunId) -> SyncResult<dealsync::SyncReport> {
    config.validate()?;

    let source = CsvDealSource::new(&config.input, config.mapping());
    let crm = PipedriveClient::new(&config.base_url, config.api_token.clone(), config.request_timeout())?
        .with_page_limit(config.page_limit);

    DealSync::new(run_id, source, crm, config.options()).run().await
}
