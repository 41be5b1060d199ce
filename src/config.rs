use crate::error::ConfigError;

/// Filter options for a single run.
///
/// Every option is off by default; an unset option has no effect on which
/// records are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Drop DNSSEC records (DNSKEY, DS, NSEC3PARAM, NSEC3, NSEC, RRSIG)
    pub no_dnssec: bool,

    /// Comma-separated list of record types to keep
    pub rrtypes: Option<String>,

    /// Keep records whose name contains this string (or matches, if `^`-prefixed)
    pub includename: Option<String>,

    /// Drop records whose name contains this string (or matches, if `^`-prefixed)
    pub excludename: Option<String>,

    /// Keep records whose data contains this string (or matches, if `^`-prefixed)
    pub includedata: Option<String>,

    /// Drop records whose data contains this string (or matches, if `^`-prefixed)
    pub excludedata: Option<String>,

    /// Keep only wildcard owners (`*.`)
    pub wildcard: bool,

    /// Keep only NS records below the zone apex
    pub delegations: bool,

    /// Minimum TTL, inclusive
    pub ttl_min: Option<u32>,

    /// Maximum TTL, inclusive
    pub ttl_max: Option<u32>,

    /// Record class to keep (e.g. IN, CH, HS)
    pub class_filter: Option<String>,
}

impl FilterConfig {
    /// Build a FilterConfig from `ZONESCAN_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a FilterConfig from an arbitrary variable source.
    ///
    /// Unset variables leave the default in place. Empty string values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(no_dnssec) = var("ZONESCAN_NO_DNSSEC") {
            config.no_dnssec = parse_bool(&no_dnssec, false);
        }
        if let Some(wildcard) = var("ZONESCAN_WILDCARD") {
            config.wildcard = parse_bool(&wildcard, false);
        }
        if let Some(delegations) = var("ZONESCAN_DELEGATIONS") {
            config.delegations = parse_bool(&delegations, false);
        }

        config.rrtypes = var("ZONESCAN_RRTYPES");
        config.includename = var("ZONESCAN_INCLUDENAME");
        config.excludename = var("ZONESCAN_EXCLUDENAME");
        config.includedata = var("ZONESCAN_INCLUDEDATA");
        config.excludedata = var("ZONESCAN_EXCLUDEDATA");
        config.class_filter = var("ZONESCAN_CLASS");

        if let Some(ttl_min) = var("ZONESCAN_TTL_MIN") {
            config.ttl_min = Some(parse_ttl_bound("ZONESCAN_TTL_MIN", &ttl_min)?);
        }
        if let Some(ttl_max) = var("ZONESCAN_TTL_MAX") {
            config.ttl_max = Some(parse_ttl_bound("ZONESCAN_TTL_MAX", &ttl_max)?);
        }

        Ok(config)
    }

    /// Whether a TTL bound is active
    pub fn has_ttl_bounds(&self) -> bool {
        self.ttl_min.is_some() || self.ttl_max.is_some()
    }

    /// Check option combinations that can never match anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(min), Some(max)) = (self.ttl_min, self.ttl_max) {
            if min > max {
                return Err(ConfigError::InvertedTtlRange { min, max });
            }
        }
        Ok(())
    }
}

fn parse_ttl_bound(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidTtlBound {
            var,
            value: value.to_string(),
        })
}

/// Parse a boolean from a string, with a default value for invalid input
fn parse_bool(s: &str, default: bool) -> bool {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}
