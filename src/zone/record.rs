use serde::Serialize;

/// Placeholder shown for fields a record does not carry
pub const NOT_AVAILABLE: &str = "N/A";

/// A single resource record line, with its owner name resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneRecord {
    /// Owner name, absolute once an origin was known
    pub name: String,
    /// TTL token as written (or inherited from `$TTL`); never coerced here
    pub ttl: Option<String>,
    /// Record class token (usually IN)
    pub class: String,
    /// Record type token (A, AAAA, MX, ...)
    #[serde(rename = "type")]
    pub rtype: String,
    /// Remaining tokens, joined with single spaces
    pub data: String,
    /// 1-based line number in the input
    pub line: usize,
}

impl ZoneRecord {
    /// Create a new zone record
    pub fn new(
        name: String,
        ttl: Option<String>,
        class: String,
        rtype: String,
        data: String,
        line: usize,
    ) -> Self {
        Self {
            name,
            ttl,
            class,
            rtype,
            data,
            line,
        }
    }

    /// TTL as a non-negative integer, if it is one.
    ///
    /// Not capped at the RFC 2181 range, so an oversized TTL still compares
    /// against the filter bounds.
    pub fn ttl_seconds(&self) -> Option<u64> {
        self.ttl.as_deref().and_then(|ttl| ttl.parse::<u64>().ok())
    }

    /// Whether the owner is a wildcard (`*.` prefix)
    pub fn is_wildcard(&self) -> bool {
        self.name.starts_with("*.")
    }

    /// Whether this is an NS record below the given zone origin.
    ///
    /// With no known origin every NS record counts.
    pub fn is_delegation(&self, zone_origin: Option<&str>) -> bool {
        self.rtype == "NS" && zone_origin != Some(self.name.as_str())
    }

    /// TTL for display, `N/A` when absent
    pub fn ttl_display(&self) -> &str {
        match self.ttl.as_deref() {
            Some(ttl) if !ttl.is_empty() => ttl,
            _ => NOT_AVAILABLE,
        }
    }
}
