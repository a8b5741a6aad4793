use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tally_core::{DomainError, DomainResult};

/// Name of a split rule, as it arrives from the command layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SplitKind {
    Equal,
    Exact,
    Percent,
    Share,
}

impl SplitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SplitKind::Equal => "EQUAL",
            SplitKind::Exact => "EXACT",
            SplitKind::Percent => "PERCENT",
            SplitKind::Share => "SHARE",
        }
    }
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUAL" => Ok(SplitKind::Equal),
            "EXACT" => Ok(SplitKind::Exact),
            "PERCENT" => Ok(SplitKind::Percent),
            "SHARE" => Ok(SplitKind::Share),
            other => Err(DomainError::validation(format!("unknown split kind: {other}"))),
        }
    }
}

/// How an expense total is divided, with the per-participant values the
/// rule needs. Values line up index-for-index with the expense participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "UPPERCASE")]
pub enum Split {
    Equal,
    /// Amount owed by each participant.
    Exact(Vec<Decimal>),
    /// Percentage of the total owed by each participant; must sum to 100.
    Percent(Vec<Decimal>),
    /// Non-negative weight of each participant.
    Share(Vec<Decimal>),
}

impl Split {
    /// Assemble a split from a parsed kind and its raw values.
    pub fn from_parts(kind: SplitKind, values: Vec<Decimal>) -> DomainResult<Self> {
        match kind {
            SplitKind::Equal if values.is_empty() => Ok(Split::Equal),
            SplitKind::Equal => Err(DomainError::validation(
                "EQUAL split does not take split values",
            )),
            SplitKind::Exact => Ok(Split::Exact(values)),
            SplitKind::Percent => Ok(Split::Percent(values)),
            SplitKind::Share => Ok(Split::Share(values)),
        }
    }

    pub fn kind(&self) -> SplitKind {
        match self {
            Split::Equal => SplitKind::Equal,
            Split::Exact(_) => SplitKind::Exact,
            Split::Percent(_) => SplitKind::Percent,
            Split::Share(_) => SplitKind::Share,
        }
    }

    /// Per-participant values, empty for [`Split::Equal`].
    pub fn values(&self) -> &[Decimal] {
        match self {
            Split::Equal => &[],
            Split::Exact(v) | Split::Percent(v) | Split::Share(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("percent".parse::<SplitKind>().unwrap(), SplitKind::Percent);
        assert_eq!(" SHARE ".parse::<SplitKind>().unwrap(), SplitKind::Share);
    }

    #[test]
    fn unknown_kind_is_a_validation_error() {
        let err = "RANDOM".parse::<SplitKind>().unwrap_err();
        assert_eq!(err, DomainError::validation("unknown split kind: RANDOM"));
    }

    #[test]
    fn equal_rejects_values() {
        assert!(Split::from_parts(SplitKind::Equal, vec![dec!(1)]).is_err());
        assert_eq!(Split::from_parts(SplitKind::Equal, vec![]).unwrap(), Split::Equal);
    }

    #[test]
    fn from_parts_keeps_kind_and_values() {
        let split = Split::from_parts(SplitKind::Share, vec![dec!(1), dec!(2)]).unwrap();
        assert_eq!(split.kind(), SplitKind::Share);
        assert_eq!(split.values(), &[dec!(1), dec!(2)]);
    }
}
