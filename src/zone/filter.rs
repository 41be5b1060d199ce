use super::ZoneRecord;
use crate::config::FilterConfig;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// Record types dropped by `no_dnssec`
pub const DNSSEC_TYPES: [&str; 6] = ["DNSKEY", "DS", "NSEC3PARAM", "NSEC3", "NSEC", "RRSIG"];

/// A name or data pattern.
///
/// Patterns starting with `^` are case-insensitive regular expressions,
/// everything else is a case-insensitive substring.
#[derive(Debug, Clone)]
pub enum Pattern {
    Substring(String),
    Regex(Regex),
    /// A `^` pattern that failed to compile; matches nothing and fails its predicate
    Invalid { pattern: String, error: String },
}

impl Pattern {
    /// Compile a pattern, warning once if it is an invalid regex
    pub fn compile(pattern: &str) -> Self {
        if pattern.starts_with('^') {
            match RegexBuilder::new(pattern).case_insensitive(true).build() {
                Ok(re) => Self::Regex(re),
                Err(e) => {
                    warn!("Invalid regex pattern '{}': {}", pattern, e);
                    Self::Invalid {
                        pattern: pattern.to_string(),
                        error: e.to_string(),
                    }
                }
            }
        } else {
            Self::Substring(pattern.to_lowercase())
        }
    }

    /// `None` when the pattern is unusable
    pub fn matches(&self, field: &str) -> Option<bool> {
        match self {
            Self::Substring(needle) => Some(field.to_lowercase().contains(needle.as_str())),
            Self::Regex(re) => Some(re.is_match(field)),
            Self::Invalid { .. } => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid { .. })
    }
}

/// The predicate that excluded a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Dnssec,
    RrType,
    IncludeName,
    ExcludeName,
    IncludeData,
    ExcludeData,
    /// An include/exclude pattern could not be compiled
    InvalidPattern(&'static str),
    NotWildcard,
    NotDelegation,
    ZoneApex,
    TtlNotNumeric,
    TtlBelowMin,
    TtlAboveMax,
    Class,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dnssec => write!(f, "DNSSEC record type"),
            Self::RrType => write!(f, "type not in requested types"),
            Self::IncludeName => write!(f, "name does not match includename"),
            Self::ExcludeName => write!(f, "name matches excludename"),
            Self::IncludeData => write!(f, "data does not match includedata"),
            Self::ExcludeData => write!(f, "data matches excludedata"),
            Self::InvalidPattern(filter) => write!(f, "invalid {} pattern", filter),
            Self::NotWildcard => write!(f, "not a wildcard name"),
            Self::NotDelegation => write!(f, "not an NS record"),
            Self::ZoneApex => write!(f, "NS record at the zone origin"),
            Self::TtlNotNumeric => write!(f, "TTL is not numeric"),
            Self::TtlBelowMin => write!(f, "TTL below minimum"),
            Self::TtlAboveMax => write!(f, "TTL above maximum"),
            Self::Class => write!(f, "class does not match"),
        }
    }
}

/// Compiled form of a [`FilterConfig`]
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    no_dnssec: bool,
    rrtypes: Option<HashSet<String>>,
    includename: Option<Pattern>,
    excludename: Option<Pattern>,
    includedata: Option<Pattern>,
    excludedata: Option<Pattern>,
    wildcard: bool,
    delegations: bool,
    check_ttl: bool,
    ttl_min: Option<u32>,
    ttl_max: Option<u32>,
    class_filter: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl RecordFilter {
    /// Compile a filter configuration. Regex patterns are built once here.
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            no_dnssec: config.no_dnssec,
            rrtypes: non_empty(&config.rrtypes).map(|list| {
                list.split(',')
                    .map(|rtype| rtype.trim().to_uppercase())
                    .collect()
            }),
            includename: non_empty(&config.includename).map(Pattern::compile),
            excludename: non_empty(&config.excludename).map(Pattern::compile),
            includedata: non_empty(&config.includedata).map(Pattern::compile),
            excludedata: non_empty(&config.excludedata).map(Pattern::compile),
            wildcard: config.wildcard,
            delegations: config.delegations,
            check_ttl: config.has_ttl_bounds(),
            ttl_min: config.ttl_min,
            ttl_max: config.ttl_max,
            class_filter: non_empty(&config.class_filter).map(str::to_uppercase),
        }
    }

    /// A filter that keeps every record
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Decide whether `record` is kept, given the best-known zone origin
    pub fn includes(&self, record: &ZoneRecord, zone_origin: Option<&str>) -> bool {
        self.evaluate(record, zone_origin).is_ok()
    }

    /// Run every enabled predicate in order, stopping at the first failure
    pub fn evaluate(&self, record: &ZoneRecord, zone_origin: Option<&str>) -> Result<(), Rejection> {
        if self.no_dnssec && DNSSEC_TYPES.contains(&record.rtype.as_str()) {
            return Err(Rejection::Dnssec);
        }

        if let Some(allowed) = &self.rrtypes {
            if !allowed.contains(&record.rtype) {
                return Err(Rejection::RrType);
            }
        }

        check_include(&self.includename, &record.name, "includename", Rejection::IncludeName)?;
        check_exclude(&self.excludename, &record.name, "excludename", Rejection::ExcludeName)?;
        check_include(&self.includedata, &record.data, "includedata", Rejection::IncludeData)?;
        check_exclude(&self.excludedata, &record.data, "excludedata", Rejection::ExcludeData)?;

        if self.wildcard && !record.is_wildcard() {
            return Err(Rejection::NotWildcard);
        }

        if self.delegations {
            if record.rtype != "NS" {
                return Err(Rejection::NotDelegation);
            }
            if zone_origin == Some(record.name.as_str()) {
                return Err(Rejection::ZoneApex);
            }
        }

        if self.check_ttl {
            let ttl = record.ttl_seconds().ok_or(Rejection::TtlNotNumeric)?;
            if self.ttl_min.is_some_and(|min| ttl < u64::from(min)) {
                return Err(Rejection::TtlBelowMin);
            }
            if self.ttl_max.is_some_and(|max| ttl > u64::from(max)) {
                return Err(Rejection::TtlAboveMax);
            }
        }

        if let Some(class) = &self.class_filter {
            if record.class.to_uppercase() != *class {
                return Err(Rejection::Class);
            }
        }

        Ok(())
    }

    /// Whether any configured pattern failed to compile
    pub fn has_invalid_patterns(&self) -> bool {
        [
            &self.includename,
            &self.excludename,
            &self.includedata,
            &self.excludedata,
        ]
        .into_iter()
        .flatten()
        .any(|pattern| !pattern.is_valid())
    }
}

fn check_include(
    pattern: &Option<Pattern>,
    field: &str,
    filter: &'static str,
    rejection: Rejection,
) -> Result<(), Rejection> {
    match pattern.as_ref().map(|p| p.matches(field)) {
        None | Some(Some(true)) => Ok(()),
        Some(Some(false)) => Err(rejection),
        Some(None) => Err(Rejection::InvalidPattern(filter)),
    }
}

fn check_exclude(
    pattern: &Option<Pattern>,
    field: &str,
    filter: &'static str,
    rejection: Rejection,
) -> Result<(), Rejection> {
    match pattern.as_ref().map(|p| p.matches(field)) {
        None | Some(Some(false)) => Ok(()),
        Some(Some(true)) => Err(rejection),
        Some(None) => Err(Rejection::InvalidPattern(filter)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneParser;

    fn record(name: &str, ttl: Option<&str>, class: &str, rtype: &str, data: &str) -> ZoneRecord {
        ZoneRecord::new(
            name.to_string(),
            ttl.map(str::to_string),
            class.to_string(),
            rtype.to_string(),
            data.to_string(),
            1,
        )
    }

    fn a(name: &str, data: &str) -> ZoneRecord {
        record(name, Some("3600"), "IN", "A", data)
    }

    fn filter(config: FilterConfig) -> RecordFilter {
        RecordFilter::new(&config)
    }

    #[test]
    fn test_allow_all_keeps_everything() {
        let f = RecordFilter::allow_all();
        assert!(f.includes(&record("x", None, "IN", "TYPE65534", ""), None));
        assert!(f.includes(&record("x.", Some("abc"), "CH", "TXT", "a"), None));
    }

    #[test]
    fn test_no_dnssec() {
        let f = filter(FilterConfig {
            no_dnssec: true,
            ..Default::default()
        });
        for rtype in DNSSEC_TYPES {
            let r = record("example.com.", Some("3600"), "IN", rtype, "...");
            assert_eq!(f.evaluate(&r, None), Err(Rejection::Dnssec));
        }
        for rtype in ["A", "AAAA", "NS", "SOA", "MX", "CDS", "TXT"] {
            let r = record("example.com.", Some("3600"), "IN", rtype, "...");
            assert!(f.includes(&r, None), "{} should be kept", rtype);
        }
    }

    #[test]
    fn test_rrtypes_list_is_trimmed_and_uppercased() {
        let f = filter(FilterConfig {
            rrtypes: Some("a, aaaa ,Mx".to_string()),
            ..Default::default()
        });
        assert!(f.includes(&a("www.example.com.", "192.0.2.1"), None));
        assert!(f.includes(&record("m.", None, "IN", "MX", "10 mail."), None));
        assert!(f.includes(&record("v6.", None, "IN", "AAAA", "::1"), None));
        assert_eq!(
            f.evaluate(&record("m.", None, "IN", "TXT", "x"), None),
            Err(Rejection::RrType)
        );
        // record types are compared as written
        assert_eq!(
            f.evaluate(&record("m.", None, "IN", "a", "x"), None),
            Err(Rejection::RrType)
        );
    }

    #[test]
    fn test_empty_options_are_ignored() {
        let f = filter(FilterConfig {
            rrtypes: Some(String::new()),
            includename: Some(String::new()),
            class_filter: Some(String::new()),
            ..Default::default()
        });
        assert!(f.includes(&record("x.", None, "CH", "TXT", ""), None));
    }

    #[test]
    fn test_includename_substring_is_case_insensitive() {
        let f = filter(FilterConfig {
            includename: Some("WWW".to_string()),
            ..Default::default()
        });
        assert!(f.includes(&a("www.example.com.", "192.0.2.1"), None));
        assert_eq!(
            f.evaluate(&a("mail.example.com.", "192.0.2.1"), None),
            Err(Rejection::IncludeName)
        );
    }

    #[test]
    fn test_excludename_regex() {
        let f = filter(FilterConfig {
            excludename: Some("^_ACME".to_string()),
            ..Default::default()
        });
        assert_eq!(
            f.evaluate(&a("_acme-challenge.example.com.", "x"), None),
            Err(Rejection::ExcludeName)
        );
        // anchored: only a prefix match counts
        assert!(f.includes(&a("www._acme.example.com.", "x"), None));
    }

    #[test]
    fn test_includedata_regex_searches() {
        let f = filter(FilterConfig {
            includedata: Some("^192\\.0\\.2\\.".to_string()),
            ..Default::default()
        });
        assert!(f.includes(&a("a.", "192.0.2.10"), None));
        assert_eq!(
            f.evaluate(&a("a.", "198.51.100.1"), None),
            Err(Rejection::IncludeData)
        );
    }

    #[test]
    fn test_excludedata_substring() {
        let f = filter(FilterConfig {
            excludedata: Some("Example.NET".to_string()),
            ..Default::default()
        });
        let cname = record("a.", None, "IN", "CNAME", "host.example.net.");
        assert_eq!(f.evaluate(&cname, None), Err(Rejection::ExcludeData));
        assert!(f.includes(&a("a.", "192.0.2.1"), None));
    }

    #[test]
    fn test_invalid_regex_excludes_without_panicking() {
        let f = filter(FilterConfig {
            includename: Some("^(unclosed".to_string()),
            ..Default::default()
        });
        assert!(f.has_invalid_patterns());
        assert_eq!(
            f.evaluate(&a("unclosed.example.com.", "x"), None),
            Err(Rejection::InvalidPattern("includename"))
        );

        let f = filter(FilterConfig {
            excludedata: Some("^[z-a]".to_string()),
            ..Default::default()
        });
        assert_eq!(
            f.evaluate(&a("a.", "x"), None),
            Err(Rejection::InvalidPattern("excludedata"))
        );
    }

    #[test]
    fn test_wildcard() {
        let f = filter(FilterConfig {
            wildcard: true,
            ..Default::default()
        });
        assert!(f.includes(&a("*.example.com.", "x"), None));
        assert_eq!(
            f.evaluate(&a("www.example.com.", "x"), None),
            Err(Rejection::NotWildcard)
        );
        assert_eq!(f.evaluate(&a("*example.com.", "x"), None), Err(Rejection::NotWildcard));
    }

    #[test]
    fn test_delegations() {
        let f = filter(FilterConfig {
            delegations: true,
            ..Default::default()
        });
        let origin = Some("example.com.");
        let apex_ns = record("example.com.", None, "IN", "NS", "ns1.example.com.");
        let child_ns = record("sub.example.com.", None, "IN", "NS", "ns1.sub.example.com.");
        let glue = a("ns1.sub.example.com.", "192.0.2.53");

        assert_eq!(f.evaluate(&apex_ns, origin), Err(Rejection::ZoneApex));
        assert!(f.includes(&child_ns, origin));
        assert_eq!(f.evaluate(&glue, origin), Err(Rejection::NotDelegation));

        // no known origin: the apex clause never fires
        assert!(f.includes(&apex_ns, None));
    }

    #[test]
    fn test_ttl_bounds() {
        let f = filter(FilterConfig {
            ttl_min: Some(300),
            ttl_max: Some(3600),
            ..Default::default()
        });
        let ttl = |t: Option<&str>| record("a.", t, "IN", "A", "192.0.2.1");

        assert_eq!(f.evaluate(&ttl(Some("86400")), None), Err(Rejection::TtlAboveMax));
        assert!(f.includes(&ttl(Some("3600")), None));
        assert!(f.includes(&ttl(Some("300")), None));
        assert_eq!(f.evaluate(&ttl(Some("299")), None), Err(Rejection::TtlBelowMin));
        assert_eq!(f.evaluate(&ttl(Some("abc")), None), Err(Rejection::TtlNotNumeric));
        assert_eq!(f.evaluate(&ttl(None), None), Err(Rejection::TtlNotNumeric));
        assert_eq!(f.evaluate(&ttl(Some("5000000000")), None), Err(Rejection::TtlAboveMax));
    }

    #[test]
    fn test_ttl_beyond_u32_is_still_numeric() {
        let f = filter(FilterConfig {
            ttl_min: Some(300),
            ..Default::default()
        });
        let big = record("big.example.com.", Some("5000000000"), "IN", "A", "192.0.2.1");
        assert!(f.includes(&big, None));

        let mut parser = ZoneParser::with_filter(f);
        let outcome = parser.parse("big.example.com. 5000000000 IN A 192.0.2.1\n");
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped_lines, 0);
    }

    #[test]
    fn test_ttl_not_checked_without_bounds() {
        let f = filter(FilterConfig {
            includename: Some("a".to_string()),
            ..Default::default()
        });
        assert!(f.includes(&record("a.", Some("abc"), "IN", "A", ""), None));
        assert!(f.includes(&record("a.", None, "IN", "A", ""), None));
    }

    #[test]
    fn test_single_ttl_bound() {
        let f = filter(FilterConfig {
            ttl_max: Some(60),
            ..Default::default()
        });
        assert!(f.includes(&record("a.", Some("0"), "IN", "A", ""), None));
        assert_eq!(
            f.evaluate(&record("a.", Some("61"), "IN", "A", ""), None),
            Err(Rejection::TtlAboveMax)
        );
    }

    #[test]
    fn test_class_filter() {
        let f = filter(FilterConfig {
            class_filter: Some("ch".to_string()),
            ..Default::default()
        });
        assert!(f.includes(&record("version.bind.", None, "CH", "TXT", "x"), None));
        assert!(f.includes(&record("version.bind.", None, "ch", "TXT", "x"), None));
        assert_eq!(
            f.evaluate(&a("www.example.com.", "x"), None),
            Err(Rejection::Class)
        );
    }

    #[test]
    fn test_predicates_short_circuit_in_order() {
        let f = filter(FilterConfig {
            no_dnssec: true,
            rrtypes: Some("A".to_string()),
            class_filter: Some("CH".to_string()),
            ..Default::default()
        });
        let rrsig = record("a.", None, "IN", "RRSIG", "...");
        assert_eq!(f.evaluate(&rrsig, None), Err(Rejection::Dnssec));
        let a_in = a("a.", "192.0.2.1");
        assert_eq!(f.evaluate(&a_in, None), Err(Rejection::Class));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let f = filter(FilterConfig {
            includename: Some("^www".to_string()),
            delegations: false,
            ttl_min: Some(10),
            ..Default::default()
        });
        let r = a("www.example.com.", "192.0.2.1");
        let first = f.evaluate(&r, Some("example.com."));
        for _ in 0..5 {
            assert_eq!(f.evaluate(&r, Some("example.com.")), first);
        }
    }
}
