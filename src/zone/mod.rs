pub mod errors;
pub mod filter;
pub mod parser;
pub mod record;
pub mod stats;

pub use errors::LineError;
pub use filter::{DNSSEC_TYPES, Pattern, RecordFilter, Rejection};
pub use parser::{LineOutcome, ParseOutcome, ParserState, RecordLayout, ZoneParser};
pub use record::{NOT_AVAILABLE, ZoneRecord};
pub use stats::{TypeStats, ZoneStats};
