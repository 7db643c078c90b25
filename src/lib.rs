pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{storage::LocalStorage, toml_config::TomlConfig, CliConfig};
pub use crate::core::api::{ApiMerger, FetchCache};
pub use crate::core::engine::FunnelEngine;
pub use crate::core::workbook::FileIngestor;
pub use crate::domain::model::{ProcessedResult, RawRecord, SheetSet};
pub use crate::domain::ports::{ConfigProvider, Ingestor, Storage};
pub use crate::utils::error::{FunnelError, Result};
