use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use itertools::Itertools;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::date;
use crate::util::format_number;

/// A loosely-typed property value, as supplied for a user or group, or as written in a filter.
///
/// Values usually come straight out of a JSON payload, so no key is assumed to have a single
/// canonical type; comparisons coerce between variants as each operator requires.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Stores a string value.
    String(String),
    /// Stores a number.
    Number(f64),
    /// Stores a boolean.
    Bool(bool),
    /// Stores a point in time. JSON strings are never deserialized into this variant; date
    /// strings stay strings and are parsed on demand by the date operators.
    #[serde(skip_deserializing)]
    Date(DateTime<Utc>),
    /// Stores an array of property values.
    Array(Vec<PropertyValue>),
    /// Stores a map of property values.
    Object(HashMap<String, PropertyValue>),
    /// Stores an explicit null.
    Null,
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> PropertyValue {
        PropertyValue::String(s.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> PropertyValue {
        PropertyValue::String(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> PropertyValue {
        PropertyValue::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Number(i as f64)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Number(f)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(dt: DateTime<Utc>) -> Self {
        PropertyValue::Date(dt)
    }
}

impl<T> From<Option<T>> for PropertyValue
where
    PropertyValue: From<T>,
{
    fn from(o: Option<T>) -> Self {
        o.map_or(PropertyValue::Null, PropertyValue::from)
    }
}

impl<T> From<Vec<T>> for PropertyValue
where
    PropertyValue: From<T>,
{
    fn from(v: Vec<T>) -> PropertyValue {
        v.into_iter().collect()
    }
}

impl<S, T> From<HashMap<S, T>> for PropertyValue
where
    String: From<S>,
    PropertyValue: From<T>,
{
    fn from(hashmap: HashMap<S, T>) -> PropertyValue {
        hashmap.into_iter().collect()
    }
}

impl<T> FromIterator<T> for PropertyValue
where
    PropertyValue: From<T>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        PropertyValue::Array(iter.into_iter().map(PropertyValue::from).collect())
    }
}

impl<S, T> FromIterator<(S, T)> for PropertyValue
where
    String: From<S>,
    PropertyValue: From<T>,
{
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        PropertyValue::Object(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&Value> for PropertyValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => PropertyValue::Null,
            Value::Bool(b) => PropertyValue::Bool(*b),
            Value::Number(n) => match n.as_f64() {
                Some(float) => PropertyValue::Number(float),
                None => {
                    warn!("could not interpret '{:?}' as f64", n);
                    PropertyValue::String(n.to_string())
                }
            },
            Value::String(str) => PropertyValue::String(str.clone()),
            Value::Array(arr) => PropertyValue::Array(arr.iter().map(PropertyValue::from).collect()),
            Value::Object(obj) => {
                PropertyValue::Object(obj.iter().map(|(k, v)| (k.into(), v.into())).collect())
            }
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(v: Value) -> Self {
        PropertyValue::from(&v)
    }
}

impl PropertyValue {
    /// Returns true for an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Returns None unless self is a String. It will not convert.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a float for numbers and for strings that parse as a finite number.
    /// Every other variant, and NaN or infinity, yields None.
    pub fn to_f64(&self) -> Option<f64> {
        let f = match self {
            PropertyValue::Number(f) => *f,
            PropertyValue::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        Some(f).filter(|f| f.is_finite())
    }

    /// Attempt to convert any of the following into a chrono::DateTime in UTC:
    ///  * a Date value
    ///  * RFC3339/ISO8601 timestamp (example: "2016-04-16T17:09:12.759-07:00")
    ///  * ISO8601 timestamp or calendar date without offset, taken as UTC
    ///  * Unix epoch milliseconds as number
    /// It will return None if the conversion fails or if no conversion is possible.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            PropertyValue::Date(dt) => Some(*dt),
            PropertyValue::Number(millis) => date::from_epoch_millis(*millis),
            PropertyValue::String(s) => date::parse_datetime(s),
            PropertyValue::Bool(_) | PropertyValue::Null => None,
            other => {
                warn!(
                    "Don't know how or whether to convert property value {:?} to datetime",
                    other
                );
                None
            }
        }
    }

    /// The text a value is compared as by the string operators.
    ///
    /// Integral numbers drop their fraction so `1.0` and `1` read the same, dates render as
    /// RFC3339 in UTC, and arrays and objects render as compact JSON. Null has no string form.
    pub fn to_string_form(&self) -> Option<String> {
        match self {
            PropertyValue::String(s) => Some(s.clone()),
            PropertyValue::Number(f) => Some(format_number(*f)),
            PropertyValue::Bool(b) => Some(b.to_string()),
            PropertyValue::Date(dt) => Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            PropertyValue::Array(values) => Some(format!(
                "[{}]",
                values.iter().map(PropertyValue::to_json_text).join(",")
            )),
            PropertyValue::Object(_) => Some(self.to_json_text()),
            PropertyValue::Null => None,
        }
    }

    fn to_json_text(&self) -> String {
        match self {
            PropertyValue::String(_) | PropertyValue::Date(_) => {
                serde_json::to_string(&self.to_string_form()).unwrap_or_default()
            }
            PropertyValue::Null => "null".to_string(),
            PropertyValue::Object(map) => format!(
                "{{{}}}",
                map.iter()
                    .sorted_by(|(a, _), (b, _)| a.cmp(b))
                    .map(|(k, v)| format!(
                        "{}:{}",
                        serde_json::to_string(k).unwrap_or_default(),
                        v.to_json_text()
                    ))
                    .join(",")
            ),
            other => other.to_string_form().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyValue;
    use chrono::{TimeZone, Utc};
    use maplit::hashmap;
    use spectral::prelude::*;
    use test_case::test_case;

    #[test]
    fn collect_array() {
        assert_eq!(
            Some(10_i64).into_iter().collect::<PropertyValue>(),
            PropertyValue::Array(vec![PropertyValue::Number(10_f64)])
        );
    }

    #[test]
    fn collect_object() {
        assert_eq!(
            Some(("abc", 10_i64)).into_iter().collect::<PropertyValue>(),
            PropertyValue::Object(hashmap! {"abc".to_string() => PropertyValue::Number(10_f64)})
        );
    }

    #[test]
    fn deserialization() {
        fn check(json: &str, expected: PropertyValue) {
            assert_eq!(
                serde_json::from_str::<PropertyValue>(json).unwrap(),
                expected
            );
        }

        check("1.0", PropertyValue::Number(1.0));
        check("1", PropertyValue::Number(1.0));
        check("true", PropertyValue::Bool(true));
        check("null", PropertyValue::Null);
        check("\"foo\"", PropertyValue::String("foo".to_string()));
        check(
            "\"2024-01-05T10:00:00Z\"",
            PropertyValue::String("2024-01-05T10:00:00Z".to_string()),
        );
        check("[1, \"a\"]", vec![PropertyValue::from(1_i64), "a".into()].into());
        check("{}", PropertyValue::Object(hashmap![]));
        check(
            r#"{"foo":123}"#,
            PropertyValue::Object(hashmap!["foo".to_string() => PropertyValue::Number(123.0)]),
        );
    }

    #[test]
    fn from_json_value() {
        let value = serde_json::json!({"plan": "pro", "seats": 3, "beta": null});
        assert_that!(PropertyValue::from(&value)).is_equal_to(PropertyValue::Object(hashmap! {
            "plan".to_string() => "pro".into(),
            "seats".to_string() => 3_i64.into(),
            "beta".to_string() => PropertyValue::Null,
        }));
    }

    #[test]
    fn option_converts_to_null() {
        assert_that!(PropertyValue::from(None::<&str>)).is_equal_to(PropertyValue::Null);
        assert_that!(PropertyValue::from(Some("x"))).is_equal_to(PropertyValue::from("x"));
    }

    #[test_case("42", Some(42.0))]
    #[test_case(" 4.5 ", Some(4.5); "whitespace is ignored")]
    #[test_case("-1e3", Some(-1000.0))]
    #[test_case("Tuesday", None)]
    #[test_case("NaN", None)]
    #[test_case("inf", None)]
    #[test_case("Infinity", None; "spelled out infinity")]
    #[test_case("-inf", None; "negative infinity")]
    #[test_case("1e400", None; "overflows to infinity")]
    #[test_case("", None; "empty")]
    fn numeric_strings(input: &str, expected: Option<f64>) {
        assert_that!(PropertyValue::from(input).to_f64()).is_equal_to(expected);
    }

    #[test]
    fn non_numeric_variants_have_no_float() {
        assert_that!(PropertyValue::Bool(true).to_f64()).is_none();
        assert_that!(PropertyValue::Null.to_f64()).is_none();
        assert_that!(PropertyValue::from(vec![1_i64]).to_f64()).is_none();
    }

    #[test]
    fn string_forms() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();

        assert_that!(PropertyValue::from("Pro").to_string_form()).contains_value("Pro".to_string());
        assert_that!(PropertyValue::from(1.0).to_string_form()).contains_value("1".to_string());
        assert_that!(PropertyValue::from(2.5).to_string_form()).contains_value("2.5".to_string());
        assert_that!(PropertyValue::from(false).to_string_form()).contains_value("false".to_string());
        assert_that!(PropertyValue::from(date).to_string_form())
            .contains_value("2024-01-05T10:00:00Z".to_string());
        assert_that!(PropertyValue::from(vec![PropertyValue::from("a"), 1_i64.into()]).to_string_form())
            .contains_value(r#"["a",1]"#.to_string());
        assert_that!(PropertyValue::from(hashmap! {"b" => 2_i64, "a" => 1_i64}).to_string_form())
            .contains_value(r#"{"a":1,"b":2}"#.to_string());
        assert_that!(PropertyValue::Null.to_string_form()).is_none();
    }

    #[test]
    fn datetimes() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();

        assert_that!(PropertyValue::from(date).to_datetime()).contains_value(date);
        assert_that!(PropertyValue::from("2024-01-05T10:00:00Z").to_datetime()).contains_value(date);
        assert_that!(PropertyValue::from(1704448800000_i64).to_datetime()).contains_value(date);
        assert_that!(PropertyValue::from("fish").to_datetime()).is_none();
        assert_that!(PropertyValue::from(true).to_datetime()).is_none();
        assert_that!(PropertyValue::Null.to_datetime()).is_none();
    }
}
