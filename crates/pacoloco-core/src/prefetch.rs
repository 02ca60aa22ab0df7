//! Prefetch schedule configuration

use croner::Cron;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Days a package may go unrequested before prefetching stops refreshing it
pub const DEFAULT_TTL_UNACCESSED_DAYS: i64 = 30;

/// Days a package may go without an upstream update before it is dropped
/// from prefetching
pub const DEFAULT_TTL_UNUPDATED_DAYS: i64 = 200;

/// When and for how long cached packages are refreshed in the background
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshPeriod {
    /// Cron expression: `min hour dom month dow`, optionally followed by a
    /// year, or `sec min hour dom month dow year`
    #[serde(default)]
    pub cron: String,
    /// 0 means use the default
    #[serde(default)]
    pub ttl_unaccessed_in_days: i64,
    /// 0 means use the default
    #[serde(default)]
    pub ttl_unupdated_in_days: i64,
}

impl RefreshPeriod {
    /// Fill in default TTLs and check the schedule
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.ttl_unaccessed_in_days == 0 {
            debug!(
                "ttl_unaccessed_in_days not set, using {}",
                DEFAULT_TTL_UNACCESSED_DAYS
            );
            self.ttl_unaccessed_in_days = DEFAULT_TTL_UNACCESSED_DAYS;
        }
        if self.ttl_unupdated_in_days == 0 {
            debug!(
                "ttl_unupdated_in_days not set, using {}",
                DEFAULT_TTL_UNUPDATED_DAYS
            );
            self.ttl_unupdated_in_days = DEFAULT_TTL_UNUPDATED_DAYS;
        }

        if self.ttl_unaccessed_in_days < 0 {
            return Err(ConfigError::InvalidTtl {
                field: "ttl_unaccessed_in_days",
                value: self.ttl_unaccessed_in_days,
            });
        }
        if self.ttl_unupdated_in_days < 0 {
            return Err(ConfigError::InvalidTtl {
                field: "ttl_unupdated_in_days",
                value: self.ttl_unupdated_in_days,
            });
        }

        self.schedule()?;
        Ok(())
    }

    /// Parse the cron expression
    pub fn schedule(&self) -> Result<Cron, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidCronExpression {
            expression: self.cron.clone(),
            reason,
        };

        let pattern = strip_year_field(&self.cron).map_err(invalid)?;
        Cron::new(&pattern)
            .with_seconds_optional()
            .parse()
            .map_err(|e| invalid(e.to_string()))
    }
}

/// Drop the trailing year field of 6 and 7 field expressions
///
/// Schedules are pinned to no particular year, so only a wildcard year is
/// accepted. The 7 field form keeps its leading seconds field.
fn strip_year_field(expression: &str) -> Result<String, String> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    match fields.split_last() {
        Some((year, rest)) if fields.len() == 6 || fields.len() == 7 => {
            if *year != "*" && *year != "?" {
                return Err(format!(
                    "year field '{}' is not supported, use '*'",
                    year
                ));
            }
            Ok(rest.join(" "))
        }
        _ => Ok(expression.to_string()),
    }
}
