use clap::Parser;
use funnel_etl::utils::{logger, validation::Validate};
use funnel_etl::{
    ApiMerger, CliConfig, FileIngestor, FunnelEngine, LocalStorage, ProcessedResult, Storage,
    TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting funnel-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let storage = LocalStorage::current_dir();
    let result = if config.is_file_mode() {
        run_file_mode(&config, storage.clone()).await
    } else {
        run_api_mode(&config, &storage).await
    };

    match result {
        Ok(report) => {
            let json = serde_json::to_vec_pretty(&report)?;
            let output = LocalStorage::new(config.output_path.clone());
            output.write_file("funnel_report.json", &json).await?;

            tracing::info!("✅ Funnel analysis completed");
            println!("✅ Funnel analysis completed");
            println!(
                "📊 leads={} testDrives={} billed={} storeVisits={} dealers={}",
                report.leads,
                report.test_drives,
                report.billed,
                report.total_store_visits,
                report.dealers.len()
            );
            println!("📁 Report saved to: {}/funnel_report.json", config.output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Funnel analysis failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_file_mode(
    config: &CliConfig,
    storage: LocalStorage,
) -> funnel_etl::Result<ProcessedResult> {
    let path = config.input_path()?.clone();
    let ingestor = FileIngestor::new(storage, path);
    FunnelEngine::new(ingestor).run().await
}

async fn run_api_mode(
    config: &CliConfig,
    storage: &LocalStorage,
) -> funnel_etl::Result<ProcessedResult> {
    let visits = match &config.visits_file {
        Some(path) => Some(storage.read_file(path).await?),
        None => None,
    };

    match &config.config {
        Some(path) => {
            let toml_config = TomlConfig::from_file(path)?;
            toml_config.validate()?;
            let mut merger = ApiMerger::new(toml_config);
            if let Some(bytes) = visits {
                merger = merger.with_visits_workbook(bytes);
            }
            FunnelEngine::new(merger).run().await
        }
        None => {
            let mut merger = ApiMerger::new(config.clone());
            if let Some(bytes) = visits {
                merger = merger.with_visits_workbook(bytes);
            }
            FunnelEngine::new(merger).run().await
        }
    }
}
