use crate::config::FilterConfig;
use crate::error::Result;
use crate::output;
use crate::zone::{ParseOutcome, RecordFilter, ZoneParser, ZoneStats};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Parse and display DNS zone file information
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "zonescan", author, version, about, long_about = None)]
pub struct Args {
    /// Path to DNS zone file (read stdin if not provided)
    pub zonefile: Option<PathBuf>,

    /// Print the (relevant) DNS records in the zone
    #[arg(long)]
    pub printrecords: bool,

    /// Print DNS record type statistics
    #[arg(long)]
    pub stats: bool,

    /// Emit records and statistics as JSON
    #[arg(long)]
    pub json: bool,

    /// Log debug diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Exclude DNSSEC-related records
    #[arg(long)]
    pub no_dnssec: bool,

    /// Comma-separated list of record types to include (e.g. A,AAAA,MX)
    #[arg(long, value_name = "TYPES")]
    pub rrtypes: Option<String>,

    /// Include records with names containing string (case insensitive, ^ for regex)
    #[arg(long, value_name = "NAME")]
    pub includename: Option<String>,

    /// Include records with data containing string (case insensitive, ^ for regex)
    #[arg(long, value_name = "DATA")]
    pub includedata: Option<String>,

    /// Exclude records with names containing string (case insensitive, ^ for regex)
    #[arg(long, value_name = "NAME")]
    pub excludename: Option<String>,

    /// Exclude records with data containing string (case insensitive, ^ for regex)
    #[arg(long, value_name = "DATA")]
    pub excludedata: Option<String>,

    /// Only process wildcard DNS records (names starting with *.)
    #[arg(long)]
    pub wildcard: bool,

    /// Only process delegation records (NS records not for zone origin)
    #[arg(long)]
    pub delegations: bool,

    /// Minimum TTL value (inclusive) for filtering records
    #[arg(long, value_name = "TTL")]
    pub ttl_min: Option<u32>,

    /// Maximum TTL value (inclusive) for filtering records
    #[arg(long, value_name = "TTL")]
    pub ttl_max: Option<u32>,

    /// Filter records by class (e.g. IN, CH, HS)
    #[arg(long = "class", value_name = "CLASS")]
    pub class_filter: Option<String>,
}

impl Args {
    /// Layer the command-line filter options over `base`.
    ///
    /// Flags can only switch a boolean option on; valued options replace the
    /// base value when given.
    pub fn filter_config(&self, base: FilterConfig) -> FilterConfig {
        FilterConfig {
            no_dnssec: base.no_dnssec || self.no_dnssec,
            rrtypes: self.rrtypes.clone().or(base.rrtypes),
            includename: self.includename.clone().or(base.includename),
            excludename: self.excludename.clone().or(base.excludename),
            includedata: self.includedata.clone().or(base.includedata),
            excludedata: self.excludedata.clone().or(base.excludedata),
            wildcard: base.wildcard || self.wildcard,
            delegations: base.delegations || self.delegations,
            ttl_min: self.ttl_min.or(base.ttl_min),
            ttl_max: self.ttl_max.or(base.ttl_max),
            class_filter: self.class_filter.clone().or(base.class_filter),
        }
    }
}

/// Parse the input named by `args` and write the requested reports to `out`
pub fn run<W: Write>(args: &Args, base: FilterConfig, out: &mut W) -> Result<ParseOutcome> {
    let config = args.filter_config(base);
    if let Err(e) = config.validate() {
        warn!("{}; no record will pass the TTL filter", e);
    }
    debug!("Filter configuration: {:?}", config);

    let filter = RecordFilter::new(&config);
    if filter.has_invalid_patterns() {
        warn!("Records tested against an invalid pattern will be excluded");
    }

    let mut parser = ZoneParser::with_filter(filter);
    let outcome = match &args.zonefile {
        Some(path) => parser.parse_file(path)?,
        None => parser.parse_reader(io::stdin().lock())?,
    };

    report(args, &outcome, out)?;
    Ok(outcome)
}

/// Write the outputs selected by `--printrecords`, `--stats` and `--json`
pub fn report<W: Write>(args: &Args, outcome: &ParseOutcome, out: &mut W) -> Result<()> {
    if args.json {
        let stats = args.stats.then(|| ZoneStats::from_outcome(outcome));
        return output::write_json(out, outcome, stats.as_ref(), args.printrecords);
    }

    if args.printrecords {
        output::write_records(out, &outcome.records)?;
    }

    if args.stats {
        if args.printrecords {
            writeln!(out)?;
        }
        output::write_statistics(out, &ZoneStats::from_outcome(outcome))?;
    }

    Ok(())
}
