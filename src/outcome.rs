use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::operator::Operator;
use crate::property_value::PropertyValue;

/// The result of matching one [crate::Condition] against a subject's properties.
///
/// Inconclusive is deliberately not folded into NotMatched: it means the answer could not be
/// determined locally, and the caller should fall back to remote evaluation rather than report
/// the condition as failing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind", content = "reason")]
pub enum MatchOutcome {
    /// The subject satisfies the condition.
    Matched,
    /// The subject does not satisfy the condition.
    NotMatched,
    /// The condition cannot be decided with the properties available locally.
    Inconclusive(#[serde(serialize_with = "serialize_reason")] Inconclusive),
}

/// Explains why a condition could not be evaluated locally.
///
/// This implements [std::error::Error] so that an orchestrator combining several conditions can
/// propagate it with `?` via [MatchOutcome::into_result].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Inconclusive {
    /// The subject's properties contain no entry for the condition's key.
    #[error("no value provided for property '{key}'")]
    MissingProperty {
        /// The key that was looked up.
        key: String,
    },
    /// The condition's expected value is null, so there is nothing to compare against.
    #[error("filter value for property '{key}' is null")]
    NullFilterValue {
        /// The condition's key.
        key: String,
    },
    /// The subject's value is an explicit null and the operator has no defined answer for null.
    #[error("null value for property '{key}' cannot be evaluated with operator '{operator}'")]
    NullPropertyValue {
        /// The condition's key.
        key: String,
        /// The condition's operator.
        operator: Operator,
    },
    /// The two values have no meaningful ordering, e.g. a number against a non-numeric string.
    #[error("cannot order {subject:?} against {expected:?}")]
    Incomparable {
        /// The subject's value.
        subject: PropertyValue,
        /// The condition's expected value.
        expected: PropertyValue,
    },
    /// A value used with a date operator could not be interpreted as a date.
    #[error("{value:?} is not a recognized date")]
    InvalidDate {
        /// The value that failed to parse.
        value: PropertyValue,
    },
    /// The condition's expected value is not a valid regular expression.
    #[error("invalid regex '{pattern}': {message}")]
    InvalidRegex {
        /// The pattern as written in the condition.
        pattern: String,
        /// The compiler's description of the problem.
        message: String,
    },
}

impl Inconclusive {
    /// Returns true when the reason points at malformed flag data rather than at properties the
    /// caller simply didn't supply. Callers should still fall back to remote evaluation, but may
    /// want to log these distinctly.
    pub fn is_anomalous(&self) -> bool {
        matches!(self, Inconclusive::InvalidRegex { .. })
    }
}

fn serialize_reason<S>(reason: &Inconclusive, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(reason)
}

impl MatchOutcome {
    /// Returns true only for [MatchOutcome::Matched].
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched)
    }

    /// Returns true for [MatchOutcome::Inconclusive].
    pub fn is_inconclusive(&self) -> bool {
        matches!(self, MatchOutcome::Inconclusive(_))
    }

    /// The reason evaluation was inconclusive, if it was.
    pub fn reason(&self) -> Option<&Inconclusive> {
        match self {
            MatchOutcome::Inconclusive(reason) => Some(reason),
            _ => None,
        }
    }

    /// Swaps Matched and NotMatched. Inconclusive stays inconclusive: not knowing whether a
    /// condition holds also means not knowing whether its negation holds.
    pub fn negate(self) -> MatchOutcome {
        match self {
            MatchOutcome::Matched => MatchOutcome::NotMatched,
            MatchOutcome::NotMatched => MatchOutcome::Matched,
            inconclusive => inconclusive,
        }
    }

    /// Converts into a Result so that callers can short-circuit on an inconclusive condition.
    pub fn into_result(self) -> Result<bool, Inconclusive> {
        match self {
            MatchOutcome::Matched => Ok(true),
            MatchOutcome::NotMatched => Ok(false),
            MatchOutcome::Inconclusive(reason) => Err(reason),
        }
    }
}

impl From<bool> for MatchOutcome {
    fn from(matched: bool) -> Self {
        if matched {
            MatchOutcome::Matched
        } else {
            MatchOutcome::NotMatched
        }
    }
}

impl From<Result<bool, Inconclusive>> for MatchOutcome {
    fn from(result: Result<bool, Inconclusive>) -> Self {
        match result {
            Ok(matched) => matched.into(),
            Err(reason) => MatchOutcome::Inconclusive(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;
    use spectral::prelude::*;

    fn missing() -> Inconclusive {
        Inconclusive::MissingProperty { key: "age".into() }
    }

    #[test]
    fn negation() {
        assert_that!(MatchOutcome::Matched.negate()).is_equal_to(MatchOutcome::NotMatched);
        assert_that!(MatchOutcome::NotMatched.negate()).is_equal_to(MatchOutcome::Matched);
        assert_that!(MatchOutcome::Inconclusive(missing()).negate())
            .is_equal_to(MatchOutcome::Inconclusive(missing()));
    }

    #[test]
    fn conversions() {
        assert_that!(MatchOutcome::from(true)).is_equal_to(MatchOutcome::Matched);
        assert_that!(MatchOutcome::from(false)).is_equal_to(MatchOutcome::NotMatched);
        assert_that!(MatchOutcome::from(Err::<bool, _>(missing())).reason())
            .contains_value(&missing());

        assert_that!(MatchOutcome::Matched.into_result()).is_ok_containing(true);
        assert_that!(MatchOutcome::NotMatched.into_result()).is_ok_containing(false);
        assert_that!(MatchOutcome::Inconclusive(missing()).into_result()).is_err_containing(missing());
    }

    #[test]
    fn predicates() {
        assert!(MatchOutcome::Matched.is_match());
        assert!(!MatchOutcome::NotMatched.is_match());
        assert!(!MatchOutcome::Inconclusive(missing()).is_match());
        assert!(MatchOutcome::Inconclusive(missing()).is_inconclusive());
        assert!(!MatchOutcome::NotMatched.is_inconclusive());
        assert_that!(MatchOutcome::Matched.reason()).is_none();
    }

    #[test]
    fn anomalous_reasons() {
        let invalid_regex = Inconclusive::InvalidRegex {
            pattern: "[".into(),
            message: "unclosed character class".into(),
        };
        assert!(invalid_regex.is_anomalous());
        assert!(!missing().is_anomalous());
        assert!(!Inconclusive::InvalidDate {
            value: "fish".into()
        }
        .is_anomalous());
    }

    #[test]
    fn reason_messages() {
        assert_that!(missing().to_string().as_str())
            .is_equal_to("no value provided for property 'age'");
        assert_that!(Inconclusive::NullPropertyValue {
            key: "age".into(),
            operator: Operator::GreaterThan,
        }
        .to_string()
        .as_str())
        .is_equal_to("null value for property 'age' cannot be evaluated with operator 'gt'");
        assert_that!(Inconclusive::Incomparable {
            subject: "Tuesday".into(),
            expected: 7_i64.into(),
        }
        .to_string()
        .as_str())
        .is_equal_to(r#"cannot order String("Tuesday") against Number(7.0)"#);
    }

    #[test]
    fn serialization() {
        assert_json_eq!(json!(MatchOutcome::Matched), json!({"kind": "MATCHED"}));
        assert_json_eq!(json!(MatchOutcome::NotMatched), json!({"kind": "NOT_MATCHED"}));
        assert_json_eq!(
            json!(MatchOutcome::Inconclusive(missing())),
            json!({"kind": "INCONCLUSIVE", "reason": "no value provided for property 'age'"})
        );
    }
}
