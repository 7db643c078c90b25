pub mod storage;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "funnel-etl")]
#[command(about = "Ingests sales-funnel sheets and computes conversion metrics")]
pub struct CliConfig {
    /// Workbook to ingest (file path). When set, the API endpoints are ignored.
    #[arg(long)]
    pub input: Option<String>,

    /// TOML config file supplying the API endpoints.
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, default_value = "")]
    pub leads_url: String,

    #[arg(long, default_value = "")]
    pub test_drives_url: String,

    #[arg(long, default_value = "")]
    pub journeys_url: String,

    #[arg(long, default_value = "")]
    pub billed_url: String,

    /// Workbook whose first sheet supplies store visits in API mode.
    #[arg(long)]
    pub visits_file: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn is_file_mode(&self) -> bool {
        self.input.is_some()
    }

    /// The workbook path for file mode; an error when `--input` was not given.
    pub fn input_path(&self) -> Result<&String> {
        validation::validate_required_field("input", &self.input)
    }
}

impl ConfigProvider for CliConfig {
    fn leads_endpoint(&self) -> &str {
        &self.leads_url
    }

    fn test_drives_endpoint(&self) -> &str {
        &self.test_drives_url
    }

    fn journeys_endpoint(&self) -> &str {
        &self.journeys_url
    }

    fn billed_endpoint(&self) -> &str {
        &self.billed_url
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("output_path", &self.output_path)?;

        if self.is_file_mode() || self.config.is_some() {
            return Ok(());
        }

        validation::validate_url("leads_url", &self.leads_url)?;
        validation::validate_url("test_drives_url", &self.test_drives_url)?;
        validation::validate_url("journeys_url", &self.journeys_url)?;
        validation::validate_url("billed_url", &self.billed_url)?;
        Ok(())
    }
}
