use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The comparison a [crate::Condition] applies between a subject's property value and the
/// condition's expected value.
///
/// The set is closed: every wire name maps to exactly one variant, and any other name is
/// rejected by [Operator::from_str] rather than falling back to a default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "&'static str")]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Operator {
    #[default]
    Exact,
    IsNot,
    GreaterThan,
    LessThan,
    GreaterThanOrEquals,
    LessThanOrEquals,
    ContainsIgnoreCase,
    DoesNotContainIgnoreCase,
    Regex,
    NotRegex,
    IsSet,
    IsDateBefore,
    IsDateAfter,
}

/// Returned when a filter names an operator outside the supported set.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unrecognized operator '{name}', expected one of: {}", supported_names())]
pub struct OperatorParseError {
    /// The operator name as it appeared in the filter.
    pub name: String,
}

fn supported_names() -> String {
    Operator::ALL.iter().map(Operator::as_str).join(", ")
}

impl Operator {
    /// Every supported operator, in wire-format documentation order.
    pub const ALL: [Operator; 13] = [
        Operator::Exact,
        Operator::IsNot,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::GreaterThanOrEquals,
        Operator::LessThanOrEquals,
        Operator::ContainsIgnoreCase,
        Operator::DoesNotContainIgnoreCase,
        Operator::Regex,
        Operator::NotRegex,
        Operator::IsSet,
        Operator::IsDateBefore,
        Operator::IsDateAfter,
    ];

    /// The wire-format name of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Exact => "exact",
            Operator::IsNot => "is_not",
            Operator::GreaterThan => "gt",
            Operator::LessThan => "lt",
            Operator::GreaterThanOrEquals => "gte",
            Operator::LessThanOrEquals => "lte",
            Operator::ContainsIgnoreCase => "icontains",
            Operator::DoesNotContainIgnoreCase => "not_icontains",
            Operator::Regex => "regex",
            Operator::NotRegex => "not_regex",
            Operator::IsSet => "is_set",
            Operator::IsDateBefore => "is_date_before",
            Operator::IsDateAfter => "is_date_after",
        }
    }

    /// For the negated operators, the operator they negate.
    pub fn negated(&self) -> Option<Operator> {
        match self {
            Operator::IsNot => Some(Operator::Exact),
            Operator::DoesNotContainIgnoreCase => Some(Operator::ContainsIgnoreCase),
            Operator::NotRegex => Some(Operator::Regex),
            _ => None,
        }
    }
}

impl FromStr for Operator {
    type Err = OperatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "exact" => Operator::Exact,
            "is_not" => Operator::IsNot,
            "gt" => Operator::GreaterThan,
            "lt" => Operator::LessThan,
            "gte" => Operator::GreaterThanOrEquals,
            "lte" => Operator::LessThanOrEquals,
            "icontains" => Operator::ContainsIgnoreCase,
            "not_icontains" => Operator::DoesNotContainIgnoreCase,
            "regex" => Operator::Regex,
            "not_regex" => Operator::NotRegex,
            "is_set" => Operator::IsSet,
            "is_date_before" => Operator::IsDateBefore,
            "is_date_after" => Operator::IsDateAfter,
            _ => {
                return Err(OperatorParseError {
                    name: s.to_owned(),
                })
            }
        };
        Ok(op)
    }
}

impl TryFrom<String> for Operator {
    type Error = OperatorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Operator> for &'static str {
    fn from(op: Operator) -> Self {
        op.as_str()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
