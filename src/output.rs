//! Text and JSON renderings of a parse run

use crate::error::Result;
use crate::zone::{NOT_AVAILABLE, ParseOutcome, ZoneRecord, ZoneStats};
use serde::Serialize;
use std::io::Write;

/// Write one aligned row per record
pub fn write_records<W: Write>(out: &mut W, records: &[ZoneRecord]) -> Result<()> {
    if records.is_empty() {
        writeln!(out, "No DNS records found in the zone file.")?;
        return Ok(());
    }

    for record in records {
        writeln!(
            out,
            "{:<30} {:<8} {:<4} {:<8} {}",
            record.name,
            record.ttl_display(),
            or_placeholder(&record.class),
            or_placeholder(&record.rtype),
            record.data
        )?;
    }
    Ok(())
}

fn or_placeholder(field: &str) -> &str {
    if field.is_empty() {
        NOT_AVAILABLE
    } else {
        field
    }
}

/// Write the statistics report
pub fn write_statistics<W: Write>(out: &mut W, stats: &ZoneStats) -> Result<()> {
    writeln!(out, "### DNS Zone Statistics:")?;

    if let Some(origin) = &stats.zone_origin {
        writeln!(out, "### Zone: {}\n", origin)?;
    }

    if stats.records == 0 {
        writeln!(out, "No DNS records found to analyze.")?;
        write_skipped(out, stats.skipped_lines)?;
        return Ok(());
    }

    writeln!(out, "{:<12} {:>8}", "Records:", stats.records)?;
    write_skipped(out, stats.skipped_lines)?;
    writeln!(out, "{:<12} {:>8}", "RRsets:", stats.rrsets)?;
    writeln!(out, "{:<12} {:>8}", "Names:", stats.names)?;
    if stats.wildcards > 0 {
        writeln!(out, "{:<12} {:>8}", "Wildcards:", stats.wildcards)?;
    }
    if stats.delegations > 0 {
        writeln!(out, "{:<12} {:>8}", "Delegations:", stats.delegations)?;
    }

    writeln!(out, "\nRecord type statistics:")?;
    writeln!(
        out,
        "{:<10} {:>8} {:>11} {:>9} {:>9}",
        "Type", "RR", "RR%", "RRsets", "RRset%"
    )?;
    writeln!(out, "{}", "-".repeat(51))?;
    for row in &stats.types {
        writeln!(
            out,
            "{:<10} {:>8} {:>10.1}% {:>9} {:>8.1}%",
            row.rtype, row.records, row.record_percent, row.rrsets, row.rrset_percent
        )?;
    }
    Ok(())
}

fn write_skipped<W: Write>(out: &mut W, skipped_lines: usize) -> Result<()> {
    if skipped_lines > 0 {
        writeln!(out, "Lines skipped during parsing: {}", skipped_lines)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    zone_origin: Option<&'a str>,
    skipped_lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<&'a [ZoneRecord]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<&'a ZoneStats>,
}

/// Write the run as a single JSON document.
///
/// `records` and `statistics` are included only when requested.
pub fn write_json<W: Write>(
    out: &mut W,
    outcome: &ParseOutcome,
    stats: Option<&ZoneStats>,
    include_records: bool,
) -> Result<()> {
    let report = JsonReport {
        zone_origin: outcome.zone_origin.as_deref(),
        skipped_lines: outcome.skipped_lines,
        records: include_records.then_some(outcome.records.as_slice()),
        statistics: stats,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}
