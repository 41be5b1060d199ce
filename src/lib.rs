//! Parse DNS zone files line by line, filter the records and summarise them.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod zone;

pub use config::FilterConfig;
pub use error::{ConfigError, Result, ZoneScanError};
pub use zone::{ParseOutcome, RecordFilter, ZoneParser, ZoneRecord, ZoneStats};
