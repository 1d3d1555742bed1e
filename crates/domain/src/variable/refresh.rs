//! When a query variable re-resolves its options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Refresh trigger of a query variable.
///
/// Definitions may use the numeric codes (`0`, `1`, `2`) or the names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "CodeOrName", into = "i64")]
pub enum VariableRefresh {
    /// Never refreshed automatically.
    Never,
    /// Resolved when the dashboard loads.
    #[default]
    OnDashboardLoad,
    /// Resolved on load and on every time range change.
    OnTimeRangeChanged,
}

impl VariableRefresh {
    /// Returns true if the variable follows the dashboard time range.
    #[must_use]
    pub const fn follows_time_range(self) -> bool {
        matches!(self, Self::OnTimeRangeChanged)
    }
}

impl TryFrom<i64> for VariableRefresh {
    type Error = DomainError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Never),
            1 => Ok(Self::OnDashboardLoad),
            2 => Ok(Self::OnTimeRangeChanged),
            other => Err(DomainError::UnknownRefreshCode(other)),
        }
    }
}

impl From<VariableRefresh> for i64 {
    fn from(refresh: VariableRefresh) -> Self {
        match refresh {
            VariableRefresh::Never => 0,
            VariableRefresh::OnDashboardLoad => 1,
            VariableRefresh::OnTimeRangeChanged => 2,
        }
    }
}

impl FromStr for VariableRefresh {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Self::Never),
            "onDashboardLoad" => Ok(Self::OnDashboardLoad),
            "onTimeRangeChanged" => Ok(Self::OnTimeRangeChanged),
            other => Err(DomainError::UnknownRefreshName(other.to_string())),
        }
    }
}

impl fmt::Display for VariableRefresh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Never => "never",
            Self::OnDashboardLoad => "onDashboardLoad",
            Self::OnTimeRangeChanged => "onTimeRangeChanged",
        };
        f.write_str(name)
    }
}

/// Wire form accepted for both refresh and sort enums.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum CodeOrName {
    Code(i64),
    Name(String),
}

impl TryFrom<CodeOrName> for VariableRefresh {
    type Error = DomainError;

    fn try_from(repr: CodeOrName) -> Result<Self, Self::Error> {
        match repr {
            CodeOrName::Code(code) => Self::try_from(code),
            CodeOrName::Name(name) => name.parse(),
        }
    }
}
