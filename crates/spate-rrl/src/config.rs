//! Middleware configuration.
//!
//! Rates are configured in responses per second and stored internally as
//! nanosecond intervals (`interval = second / rate`); a rate of zero stores
//! an interval of zero, which disables that category. Response sub-category
//! rates left unset inherit `responses-per-second`.

use crate::clock::SECOND;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error("invalid zone {zone:?}: {source}")]
    InvalidZone {
        zone: String,
        source: spate_proto::Error,
    },

    #[error("file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Response rate limiting configuration. All fields are fixed once the
/// middleware is built from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RrlConfig {
    /// Zone suffixes the middleware applies to. Empty means all names.
    pub zones: Vec<String>,

    /// Accounting window in seconds: the most debt an account can carry,
    /// and the idle time after which it is evictable.
    pub window: f64,

    /// Bits of the client IPv4 address that identify a client.
    pub ipv4_prefix_length: u8,

    /// Bits of the client IPv6 address that identify a client.
    pub ipv6_prefix_length: u8,

    /// Allowed answers per second. Zero disables limiting for the category.
    pub responses_per_second: f64,

    /// Allowed empty answers per second. Defaults to `responses-per-second`.
    pub nodata_per_second: Option<f64>,

    /// Allowed name-error answers per second. Defaults to
    /// `responses-per-second`.
    pub nxdomains_per_second: Option<f64>,

    /// Allowed referrals per second. Defaults to `responses-per-second`.
    pub referrals_per_second: Option<f64>,

    /// Allowed error answers per second. Defaults to
    /// `responses-per-second`.
    pub errors_per_second: Option<f64>,

    /// Allowed requests per second per client prefix, charged before the
    /// query is resolved. Zero disables request limiting.
    pub requests_per_second: f64,

    /// Let one in this many over-limit responses through as a truncated
    /// reply, prompting the client to retry over TCP. Zero never slips.
    pub slip: u32,

    /// Count and log exceeded limits without dropping anything.
    pub report_only: bool,

    /// Total accounts kept across all table shards.
    pub max_table_size: usize,
}

impl Default for RrlConfig {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            window: 15.0,
            ipv4_prefix_length: 24,
            ipv6_prefix_length: 56,
            responses_per_second: 0.0,
            nodata_per_second: None,
            nxdomains_per_second: None,
            referrals_per_second: None,
            errors_per_second: None,
            requests_per_second: 0.0,
            slip: 0,
            report_only: false,
            max_table_size: 100_000,
        }
    }
}

impl RrlConfig {
    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.window > 0.0 && self.window.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "window",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.ipv4_prefix_length == 0 || self.ipv4_prefix_length > 32 {
            return Err(ConfigError::InvalidValue {
                field: "ipv4-prefix-length",
                message: "must be between 1 and 32".to_string(),
            });
        }
        if self.ipv6_prefix_length == 0 || self.ipv6_prefix_length > 128 {
            return Err(ConfigError::InvalidValue {
                field: "ipv6-prefix-length",
                message: "must be between 1 and 128".to_string(),
            });
        }

        let rates = [
            ("responses-per-second", Some(self.responses_per_second)),
            ("nodata-per-second", self.nodata_per_second),
            ("nxdomains-per-second", self.nxdomains_per_second),
            ("referrals-per-second", self.referrals_per_second),
            ("errors-per-second", self.errors_per_second),
            ("requests-per-second", Some(self.requests_per_second)),
        ];
        for (field, rate) in rates {
            if let Some(rate) = rate {
                if !(rate >= 0.0 && rate.is_finite()) {
                    return Err(ConfigError::InvalidValue {
                        field,
                        message: "cannot be negative".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Resolves the configured rates into per-category nanosecond intervals.
    pub(crate) fn intervals(&self) -> Intervals {
        let responses = interval(self.responses_per_second);
        Intervals {
            window: (self.window * SECOND as f64) as i64,
            responses,
            nodata: self.nodata_per_second.map(interval).unwrap_or(responses),
            nxdomains: self.nxdomains_per_second.map(interval).unwrap_or(responses),
            referrals: self.referrals_per_second.map(interval).unwrap_or(responses),
            errors: self.errors_per_second.map(interval).unwrap_or(responses),
            requests: interval(self.requests_per_second),
        }
    }
}

/// Nanosecond cost of one permitted unit at the given per-second rate.
/// A rate of zero disables the category, stored as a zero interval.
fn interval(rate: f64) -> i64 {
    if rate == 0.0 {
        0
    } else {
        (SECOND as f64 / rate) as i64
    }
}

/// The configured rates, resolved to nanosecond intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Intervals {
    pub window: i64,
    pub responses: i64,
    pub nodata: i64,
    pub nxdomains: i64,
    pub referrals: i64,
    pub errors: i64,
    pub requests: i64,
}
