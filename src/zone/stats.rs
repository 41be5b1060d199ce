use super::{ParseOutcome, ZoneRecord};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Per-type counts for the statistics table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeStats {
    pub rtype: String,
    pub records: usize,
    pub record_percent: f64,
    pub rrsets: usize,
    pub rrset_percent: f64,
}

/// Zone statistics over the accepted records
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ZoneStats {
    pub zone_origin: Option<String>,
    pub records: usize,
    pub skipped_lines: usize,
    /// Distinct (name, class, type) triples
    pub rrsets: usize,
    pub names: usize,
    pub wildcards: usize,
    /// Distinct NS owners other than the zone origin
    pub delegations: usize,
    /// Sorted by type
    pub types: Vec<TypeStats>,
}

impl ZoneStats {
    pub fn from_outcome(outcome: &ParseOutcome) -> Self {
        Self::compute(
            &outcome.records,
            outcome.skipped_lines,
            outcome.zone_origin.as_deref(),
        )
    }

    pub fn compute(records: &[ZoneRecord], skipped_lines: usize, zone_origin: Option<&str>) -> Self {
        let rrsets: HashSet<(&str, &str, &str)> = records
            .iter()
            .map(|r| (r.name.as_str(), r.class.as_str(), r.rtype.as_str()))
            .collect();

        let names: HashSet<&str> = records.iter().map(|r| r.name.as_str()).collect();

        let delegations: HashSet<&str> = records
            .iter()
            .filter(|r| r.is_delegation(zone_origin))
            .map(|r| r.name.as_str())
            .collect();

        let mut by_type: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for record in records {
            by_type.entry(record.rtype.as_str()).or_default().0 += 1;
        }
        for (_, _, rtype) in &rrsets {
            by_type.entry(*rtype).or_default().1 += 1;
        }

        let types = by_type
            .into_iter()
            .map(|(rtype, (count, rrset_count))| TypeStats {
                rtype: rtype.to_string(),
                records: count,
                record_percent: percent(count, records.len()),
                rrsets: rrset_count,
                rrset_percent: percent(rrset_count, rrsets.len()),
            })
            .collect();

        Self {
            zone_origin: zone_origin.map(str::to_string),
            records: records.len(),
            skipped_lines,
            rrsets: rrsets.len(),
            names: names.len(),
            wildcards: records.iter().filter(|r| r.is_wildcard()).count(),
            delegations: delegations.len(),
            types,
        }
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneParser;

    const ZONE: &str = "\
$ORIGIN example.com.
$TTL 3600
@       IN  SOA ns1.example.com. admin.example.com. 1 2 3 4 5
@       IN  NS  ns1.example.com.
@       IN  NS  ns2.example.com.
www     IN  A   192.0.2.1
www     IN  A   192.0.2.2
www     IN  AAAA 2001:db8::1
*.dev   IN  A   192.0.2.9
sub     IN  NS  ns1.sub.example.com.
sub     IN  NS  ns2.sub.example.com.
lab     IN  NS  ns.lab.example.com.
";

    #[test]
    fn test_compute_counts() {
        let outcome = ZoneParser::new().parse(ZONE);
        let stats = ZoneStats::from_outcome(&outcome);

        assert_eq!(stats.zone_origin.as_deref(), Some("example.com."));
        assert_eq!(stats.records, 10);
        assert_eq!(stats.skipped_lines, 0);
        // SOA, apex NS, www A, www AAAA, *.dev A, sub NS, lab NS
        assert_eq!(stats.rrsets, 7);
        assert_eq!(stats.names, 5);
        assert_eq!(stats.wildcards, 1);
        assert_eq!(stats.delegations, 2);
    }

    #[test]
    fn test_type_table_sorted_with_percentages() {
        let outcome = ZoneParser::new().parse(ZONE);
        let stats = ZoneStats::from_outcome(&outcome);

        let types: Vec<_> = stats.types.iter().map(|t| t.rtype.as_str()).collect();
        assert_eq!(types, ["A", "AAAA", "NS", "SOA"]);

        let ns = &stats.types[2];
        assert_eq!(ns.records, 5);
        assert_eq!(ns.rrsets, 3);
        assert!((ns.record_percent - 50.0).abs() < 1e-9);
        assert!((ns.rrset_percent - 3.0 / 7.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_delegations_without_origin_count_every_ns_owner() {
        let outcome = ZoneParser::new().parse(
            "example.com. IN NS ns1.example.com.\nsub.example.com. IN NS ns1.sub.example.com.\n",
        );
        assert_eq!(outcome.zone_origin, None);
        assert_eq!(ZoneStats::from_outcome(&outcome).delegations, 2);
    }

    #[test]
    fn test_empty_input() {
        let stats = ZoneStats::compute(&[], 4, None);
        assert_eq!(stats.records, 0);
        assert_eq!(stats.skipped_lines, 4);
        assert!(stats.types.is_empty());
    }
}
