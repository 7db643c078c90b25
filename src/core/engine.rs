use crate::core::analysis;
use crate::domain::model::ProcessedResult;
use crate::domain::ports::Ingestor;
use crate::utils::error::Result;

/// Drives one aggregate-ingestion call: extract the sheets through the
/// configured path, then analyze them.
pub struct FunnelEngine<I: Ingestor> {
    ingestor: I,
}

impl<I: Ingestor> FunnelEngine<I> {
    pub fn new(ingestor: I) -> Self {
        Self { ingestor }
    }

    pub async fn run(&self) -> Result<ProcessedResult> {
        tracing::info!("extracting funnel sheets");
        let sheets = self.ingestor.extract().await?;
        tracing::info!(
            leads = sheets.leads.len(),
            test_drives = sheets.test_drives.len(),
            complete_journey = sheets.complete_journey.len(),
            billed = sheets.billed.len(),
            store_visits = sheets.store_visits.len(),
            "sheets extracted"
        );
        if sheets.leads.is_empty() {
            tracing::warn!("no rows in the leads sheet, proceeding anyway");
        }

        let result = analysis::analyze(sheets);
        tracing::info!(
            leads = result.leads,
            test_drives = result.test_drives,
            billed = result.billed,
            dealers = result.dealers.len(),
            "analysis complete"
        );
        Ok(result)
    }
}
