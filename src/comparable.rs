use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::date;
use crate::options::MatchOptions;
use crate::outcome::Inconclusive;
use crate::property_value::PropertyValue;

/// A condition's expected value, wrapped with the comparison rules each operator needs.
///
/// The subject side of every comparison is an arbitrary [PropertyValue] whose type is not known
/// ahead of time; this type owns the coercions between the two.
#[derive(Clone, Copy, Debug)]
pub struct ComparableValue<'a> {
    expected: &'a PropertyValue,
    options: MatchOptions,
}

impl<'a> ComparableValue<'a> {
    /// Wrap an expected value. Returns None for a null value, which can't be compared with
    /// anything.
    pub fn new(expected: &'a PropertyValue) -> Option<Self> {
        Self::with_options(expected, MatchOptions::default())
    }

    pub fn with_options(expected: &'a PropertyValue, options: MatchOptions) -> Option<Self> {
        if expected.is_null() {
            None
        } else {
            Some(Self { expected, options })
        }
    }

    /// Equality with numeric normalization: when either side is a number and the other can be
    /// read as one, the values are compared as numbers, so `1`, `1.0` and `"1.0"` are all equal.
    /// Otherwise the string forms are compared, case-sensitively unless
    /// [MatchOptions::case_insensitive_exact] is set.
    ///
    /// An array of expected values matches if any element does, and an array subject matches if
    /// any of its elements does.
    pub fn is_exact_match(&self, subject: &PropertyValue) -> bool {
        match self.expected {
            PropertyValue::Array(candidates) => candidates
                .iter()
                .any(|candidate| self.values_equal(candidate, subject)),
            expected => self.values_equal(expected, subject),
        }
    }

    #[allow(clippy::float_cmp)]
    fn values_equal(&self, expected: &PropertyValue, subject: &PropertyValue) -> bool {
        if let PropertyValue::Array(values) = subject {
            return values.iter().any(|v| self.values_equal(expected, v));
        }
        if expected.is_null() || subject.is_null() {
            return expected.is_null() && subject.is_null();
        }

        let either_numeric =
            matches!(expected, PropertyValue::Number(_)) || matches!(subject, PropertyValue::Number(_));
        if either_numeric {
            if let (Some(e), Some(s)) = (expected.to_f64(), subject.to_f64()) {
                return e == s;
            }
        }

        match (expected.to_string_form(), subject.to_string_form()) {
            (Some(e), Some(s)) if self.options.case_insensitive_exact => {
                e.to_lowercase() == s.to_lowercase()
            }
            (Some(e), Some(s)) => e == s,
            _ => false,
        }
    }

    /// Orders the subject relative to the expected value, so `Some(Ordering::Greater)` means the
    /// subject is the larger one.
    ///
    /// A numeric expected value requires a subject that reads as a number. A string expected
    /// value compares numerically when both sides read as numbers and lexically otherwise. Any
    /// other pairing has no ordering and yields None.
    pub fn compare_ordering(&self, subject: &PropertyValue) -> Option<Ordering> {
        match self.expected {
            PropertyValue::Number(expected) => subject.to_f64()?.partial_cmp(expected),
            PropertyValue::String(expected) => {
                if !matches!(subject, PropertyValue::String(_) | PropertyValue::Number(_)) {
                    return None;
                }
                if let (Some(e), Some(s)) = (self.expected.to_f64(), subject.to_f64()) {
                    return s.partial_cmp(&e);
                }
                let subject = subject.to_string_form()?;
                Some(subject.as_str().cmp(expected.as_str()))
            }
            _ => None,
        }
    }

    /// The reason to report when [ComparableValue::compare_ordering] has no answer.
    pub fn incomparable(&self, subject: &PropertyValue) -> Inconclusive {
        Inconclusive::Incomparable {
            subject: subject.clone(),
            expected: self.expected.clone(),
        }
    }

    /// Case-insensitive substring test of the expected value's string form within the
    /// subject's string form. With an array of expected values, any one being contained is
    /// enough.
    pub fn contains_ignore_case(&self, subject: &PropertyValue) -> bool {
        let haystack = match subject.to_string_form() {
            Some(s) => s.to_lowercase(),
            None => return false,
        };
        let contained = |needle: &PropertyValue| {
            needle
                .to_string_form()
                .map_or(false, |needle| haystack.contains(&needle.to_lowercase()))
        };

        match self.expected {
            PropertyValue::Array(needles) => needles.iter().any(contained),
            needle => contained(needle),
        }
    }

    /// Compiles the expected value as a regular expression and searches the subject's string
    /// form for it. The pattern is unanchored.
    pub fn matches_regex(&self, subject: &PropertyValue) -> Result<bool, Inconclusive> {
        let pattern = self.expected.to_string_form().unwrap_or_default();
        let regex = Regex::new(&pattern).map_err(|e| Inconclusive::InvalidRegex {
            message: e.to_string(),
            pattern,
        })?;
        Ok(subject
            .to_string_form()
            .map_or(false, |text| regex.is_match(&text)))
    }

    /// True if the subject's date is strictly earlier than the expected date.
    pub fn is_date_before(
        &self,
        subject: &PropertyValue,
        now: DateTime<Utc>,
    ) -> Result<bool, Inconclusive> {
        Ok(subject_datetime(subject)? < self.expected_datetime(now)?)
    }

    /// True if the subject's date is strictly later than the expected date.
    pub fn is_date_after(
        &self,
        subject: &PropertyValue,
        now: DateTime<Utc>,
    ) -> Result<bool, Inconclusive> {
        Ok(subject_datetime(subject)? > self.expected_datetime(now)?)
    }

    fn expected_datetime(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, Inconclusive> {
        if self.options.relative_dates {
            if let Some(relative) = self
                .expected
                .as_str()
                .and_then(|s| date::parse_relative_date(s, now))
            {
                return Ok(relative);
            }
        }
        self.expected
            .to_datetime()
            .ok_or_else(|| Inconclusive::InvalidDate {
                value: self.expected.clone(),
            })
    }
}

fn subject_datetime(subject: &PropertyValue) -> Result<DateTime<Utc>, Inconclusive> {
    subject.to_datetime().ok_or_else(|| Inconclusive::InvalidDate {
        value: subject.clone(),
    })
}
