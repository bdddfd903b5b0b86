use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do when some dishes fail analysis while others succeed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialFailurePolicy {
    /// Drop failed dishes; fail only when every dish failed.
    #[default]
    Tolerate,
    /// Fail the request on the first failed dish in menu order.
    AbortOnAny,
}

impl FromStr for PartialFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tolerate" => Ok(PartialFailurePolicy::Tolerate),
            "abort" | "abort_on_any" => Ok(PartialFailurePolicy::AbortOnAny),
            other => Err(format!("unknown partial failure policy '{}'", other)),
        }
    }
}

/// Alternate-provider retries on `PROVIDER_UNAVAILABLE`. At most one retry per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub structuring_fallback: bool,
    pub dish_fallback: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            structuring_fallback: true,
            dish_fallback: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPolicy {
    pub partial_failure: PartialFailurePolicy,
    pub retry: RetryPolicy,
}
