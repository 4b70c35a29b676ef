use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::comparable::ComparableValue;
use crate::condition::Condition;
use crate::operator::Operator;
use crate::options::MatchOptions;
use crate::outcome::{Inconclusive, MatchOutcome};
use crate::properties::PropertySource;
use crate::property_value::PropertyValue;

/// Decide whether a single condition holds for a subject, using [MatchOptions::default].
///
/// # Example
/// ```
/// # use feature_flag_property_matching::{match_property, Condition, MatchOutcome, Operator, Properties};
/// # use maplit::hashmap;
/// let condition = Condition::new("age", Operator::GreaterThanOrEquals, 18_i64);
///
/// let adult: Properties = hashmap! {"age".to_string() => 21_i64.into()};
/// assert_eq!(match_property(&condition, &adult), MatchOutcome::Matched);
///
/// let unknown = Properties::new();
/// assert!(match_property(&condition, &unknown).is_inconclusive());
/// ```
pub fn match_property<P>(condition: &Condition, properties: &P) -> MatchOutcome
where
    P: PropertySource + ?Sized,
{
    PropertyMatcher::new().matches(condition, properties)
}

/// Evaluates property conditions locally.
///
/// The matcher holds only its [MatchOptions]; each call is independent, so one instance can be
/// shared freely across threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct PropertyMatcher {
    options: MatchOptions,
}

impl PropertyMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Decide whether `condition` holds for the subject described by `properties`.
    ///
    /// Relative dates are resolved against the current time.
    pub fn matches<P>(&self, condition: &Condition, properties: &P) -> MatchOutcome
    where
        P: PropertySource + ?Sized,
    {
        self.matches_at(condition, properties, Utc::now())
    }

    /// Like [PropertyMatcher::matches], with relative dates resolved against `now`.
    pub fn matches_at<P>(
        &self,
        condition: &Condition,
        properties: &P,
        now: DateTime<Utc>,
    ) -> MatchOutcome
    where
        P: PropertySource + ?Sized,
    {
        let outcome = self.evaluate(condition, properties, now);
        if let MatchOutcome::Inconclusive(reason) = &outcome {
            if reason.is_anomalous() {
                warn!("malformed condition on property '{}': {}", condition.key(), reason);
            } else {
                debug!("inconclusive match on property '{}': {}", condition.key(), reason);
            }
        }
        outcome
    }

    fn evaluate<P>(&self, condition: &Condition, properties: &P, now: DateTime<Utc>) -> MatchOutcome
    where
        P: PropertySource + ?Sized,
    {
        let key = condition.key();
        let operator = condition.operator();

        let subject = match properties.property(key) {
            Some(v) => v,
            None => {
                return MatchOutcome::Inconclusive(Inconclusive::MissingProperty { key: key.into() })
            }
        };

        // presence is the whole test, even for an explicit null
        if operator == Operator::IsSet {
            return MatchOutcome::Matched;
        }

        let expected = match ComparableValue::with_options(condition.value(), self.options) {
            Some(expected) => expected,
            None => {
                return MatchOutcome::Inconclusive(Inconclusive::NullFilterValue { key: key.into() })
            }
        };

        // an explicit null fails every operator except is_not, which still compares; ordering
        // and substring tests have no answer for it
        if subject.is_null() {
            match operator {
                Operator::IsNot => {}
                Operator::GreaterThan
                | Operator::GreaterThanOrEquals
                | Operator::LessThan
                | Operator::LessThanOrEquals
                | Operator::ContainsIgnoreCase
                | Operator::DoesNotContainIgnoreCase => {
                    return MatchOutcome::Inconclusive(Inconclusive::NullPropertyValue {
                        key: key.into(),
                        operator,
                    })
                }
                _ => return MatchOutcome::NotMatched,
            }
        }

        match operator {
            Operator::Exact => expected.is_exact_match(subject).into(),
            Operator::IsNot => (!expected.is_exact_match(subject)).into(),

            Operator::GreaterThan => ordering_op(&expected, subject, |o| o == Ordering::Greater),
            Operator::GreaterThanOrEquals => ordering_op(&expected, subject, |o| o != Ordering::Less),
            Operator::LessThan => ordering_op(&expected, subject, |o| o == Ordering::Less),
            Operator::LessThanOrEquals => ordering_op(&expected, subject, |o| o != Ordering::Greater),

            Operator::ContainsIgnoreCase => expected.contains_ignore_case(subject).into(),
            Operator::DoesNotContainIgnoreCase => (!expected.contains_ignore_case(subject)).into(),

            Operator::Regex => expected.matches_regex(subject).into(),
            Operator::NotRegex => expected.matches_regex(subject).map(|m| !m).into(),

            Operator::IsDateBefore => expected.is_date_before(subject, now).into(),
            Operator::IsDateAfter => expected.is_date_after(subject, now).into(),

            Operator::IsSet => MatchOutcome::Matched,
        }
    }
}

fn ordering_op<F: Fn(Ordering) -> bool>(
    expected: &ComparableValue,
    subject: &PropertyValue,
    f: F,
) -> MatchOutcome {
    match expected.compare_ordering(subject) {
        Some(ordering) => f(ordering).into(),
        None => MatchOutcome::Inconclusive(expected.incomparable(subject)),
    }
}
