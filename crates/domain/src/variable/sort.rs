//! Sort orders for variable options.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::option::VariableValueOption;
use super::refresh::CodeOrName;
use crate::error::DomainError;

/// Sort order applied to resolved options.
///
/// Definitions may use the numeric codes `0..=6` or the names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "CodeOrName", into = "i64")]
pub enum VariableSort {
    /// Keep the order the datasource produced.
    Disabled,
    /// Case-sensitive alphabetical, ascending.
    #[default]
    AlphabeticalAsc,
    /// Case-sensitive alphabetical, descending.
    AlphabeticalDesc,
    /// Numerical, ascending.
    NumericalAsc,
    /// Numerical, descending.
    NumericalDesc,
    /// Case-insensitive alphabetical, ascending.
    AlphabeticalCaseInsensitiveAsc,
    /// Case-insensitive alphabetical, descending.
    AlphabeticalCaseInsensitiveDesc,
}

impl VariableSort {
    /// Returns true for the descending orders.
    #[must_use]
    pub fn is_descending(self) -> bool {
        matches!(
            self,
            Self::AlphabeticalDesc | Self::NumericalDesc | Self::AlphabeticalCaseInsensitiveDesc
        )
    }
}

impl TryFrom<i64> for VariableSort {
    type Error = DomainError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Disabled),
            1 => Ok(Self::AlphabeticalAsc),
            2 => Ok(Self::AlphabeticalDesc),
            3 => Ok(Self::NumericalAsc),
            4 => Ok(Self::NumericalDesc),
            5 => Ok(Self::AlphabeticalCaseInsensitiveAsc),
            6 => Ok(Self::AlphabeticalCaseInsensitiveDesc),
            other => Err(DomainError::UnknownSortCode(other)),
        }
    }
}

impl From<VariableSort> for i64 {
    fn from(sort: VariableSort) -> Self {
        match sort {
            VariableSort::Disabled => 0,
            VariableSort::AlphabeticalAsc => 1,
            VariableSort::AlphabeticalDesc => 2,
            VariableSort::NumericalAsc => 3,
            VariableSort::NumericalDesc => 4,
            VariableSort::AlphabeticalCaseInsensitiveAsc => 5,
            VariableSort::AlphabeticalCaseInsensitiveDesc => 6,
        }
    }
}

impl FromStr for VariableSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disabled" => Ok(Self::Disabled),
            "alphabeticalAsc" => Ok(Self::AlphabeticalAsc),
            "alphabeticalDesc" => Ok(Self::AlphabeticalDesc),
            "numericalAsc" => Ok(Self::NumericalAsc),
            "numericalDesc" => Ok(Self::NumericalDesc),
            "alphabeticalCaseInsensitiveAsc" => Ok(Self::AlphabeticalCaseInsensitiveAsc),
            "alphabeticalCaseInsensitiveDesc" => Ok(Self::AlphabeticalCaseInsensitiveDesc),
            other => Err(DomainError::UnknownSortName(other.to_string())),
        }
    }
}

impl fmt::Display for VariableSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disabled => "disabled",
            Self::AlphabeticalAsc => "alphabeticalAsc",
            Self::AlphabeticalDesc => "alphabeticalDesc",
            Self::NumericalAsc => "numericalAsc",
            Self::NumericalDesc => "numericalDesc",
            Self::AlphabeticalCaseInsensitiveAsc => "alphabeticalCaseInsensitiveAsc",
            Self::AlphabeticalCaseInsensitiveDesc => "alphabeticalCaseInsensitiveDesc",
        };
        f.write_str(name)
    }
}

impl TryFrom<CodeOrName> for VariableSort {
    type Error = DomainError;

    fn try_from(repr: CodeOrName) -> Result<Self, Self::Error> {
        match repr {
            CodeOrName::Code(code) => Self::try_from(code),
            CodeOrName::Name(name) => name.parse(),
        }
    }
}

/// Sorts options according to `sort`.
///
/// The sort is stable. Numerical orders place labels without a number
/// after all numeric ones. Every descending order is the exact reverse of
/// its ascending order, ties included.
#[must_use]
pub fn sort_variable_values(
    mut options: Vec<VariableValueOption>,
    sort: VariableSort,
) -> Vec<VariableValueOption> {
    match sort {
        VariableSort::Disabled => {}
        VariableSort::AlphabeticalAsc | VariableSort::AlphabeticalDesc => {
            options.sort_by(|a, b| a.label.cmp(&b.label));
        }
        VariableSort::NumericalAsc | VariableSort::NumericalDesc => {
            options.sort_by(|a, b| compare_numeric(&a.label, &b.label));
        }
        VariableSort::AlphabeticalCaseInsensitiveAsc
        | VariableSort::AlphabeticalCaseInsensitiveDesc => {
            options.sort_by_cached_key(|o| o.label.to_lowercase());
        }
    }
    if sort.is_descending() {
        options.reverse();
    }
    options
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    match (numeric_key(a), numeric_key(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The whole label as a number, else its first run of digits.
fn numeric_key(label: &str) -> Option<f64> {
    if let Ok(n) = label.trim().parse::<f64>()
        && n.is_finite()
    {
        return Some(n);
    }

    let start = label.find(|c: char| c.is_ascii_digit())?;
    let digits = &label[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<f64>().ok()
}
