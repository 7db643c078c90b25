pub mod analysis;
pub mod api;
pub mod dates;
pub mod dealers;
pub mod engine;
pub mod fields;
pub mod metrics;
pub mod workbook;

pub use crate::domain::model::{
    DateRange, FunnelMetricPair, FunnelMetrics, ProcessedResult, RawRecord, Sheet, SheetSet,
};
pub use crate::domain::ports::{ConfigProvider, Ingestor, Storage};
pub use crate::utils::error::Result;
