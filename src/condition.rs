use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::operator::Operator;
use crate::property_value::PropertyValue;

/// One targeting condition: a property key, a comparison operator and the expected value.
///
/// Deserializes from the flag definition wire format:
///
/// ```json
/// {"key": "email", "operator": "icontains", "value": "@acme.com", "type": "person"}
/// ```
///
/// A missing or null `operator` means `exact`. An operator name outside the supported set fails
/// deserialization of the whole condition.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Condition {
    key: String,
    #[serde(default, deserialize_with = "operator_or_exact")]
    operator: Operator,
    #[serde(default = "null_value")]
    value: PropertyValue,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
}

fn operator_or_exact<'de, D>(deserializer: D) -> Result<Operator, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(name) => name.parse().map_err(D::Error::custom),
        None => Ok(Operator::Exact),
    }
}

fn null_value() -> PropertyValue {
    PropertyValue::Null
}

impl Condition {
    pub fn new<K, V>(key: K, operator: Operator, value: V) -> Self
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        Condition {
            key: key.into(),
            operator,
            value: value.into(),
            kind: None,
        }
    }

    /// A condition that only checks the key is present; it carries no expected value.
    pub fn is_set<K: Into<String>>(key: K) -> Self {
        Condition::new(key, Operator::IsSet, PropertyValue::Null)
    }

    /// Tags the condition with the kind of subject it applies to, e.g. "person" or "group".
    pub fn with_kind<S: Into<String>>(mut self, kind: S) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// The `type` tag from the wire format. The matcher ignores it; it is there for callers
    /// that route conditions by subject kind.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spectral::prelude::*;

    #[test]
    fn deserialization() {
        let condition: Condition = serde_json::from_value(json!({
            "key": "email",
            "operator": "icontains",
            "value": "@acme.com",
            "type": "person"
        }))
        .unwrap();

        assert_that!(condition.key()).is_equal_to("email");
        assert_that!(condition.operator()).is_equal_to(Operator::ContainsIgnoreCase);
        assert_that!(condition.value()).is_equal_to(&PropertyValue::from("@acme.com"));
        assert_that!(condition.kind()).contains_value("person");
    }

    #[test]
    fn operator_defaults_to_exact() {
        let missing: Condition = serde_json::from_value(json!({"key": "plan", "value": "pro"})).unwrap();
        assert_that!(missing.operator()).is_equal_to(Operator::Exact);

        let null: Condition =
            serde_json::from_value(json!({"key": "plan", "operator": null, "value": "pro"})).unwrap();
        assert_that!(null.operator()).is_equal_to(Operator::Exact);
    }

    #[test]
    fn value_defaults_to_null() {
        let condition: Condition =
            serde_json::from_value(json!({"key": "country", "operator": "is_set"})).unwrap();
        assert_that!(condition.value()).is_equal_to(&PropertyValue::Null);
        assert_that!(condition.kind()).is_none();
        assert_that!(condition).is_equal_to(Condition::is_set("country"));
    }

    #[test]
    fn list_values() {
        let condition: Condition = serde_json::from_value(json!({
            "key": "plan",
            "operator": "exact",
            "value": ["pro", "enterprise"]
        }))
        .unwrap();
        assert_that!(condition.value()).is_equal_to(&PropertyValue::from(vec!["pro", "enterprise"]));
    }

    #[test]
    fn unknown_operator_fails_the_whole_condition() {
        let err = serde_json::from_value::<Condition>(json!({
            "key": "plan",
            "operator": "is_not_set",
            "value": "pro"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unrecognized operator 'is_not_set'"));

        assert_that!(serde_json::from_value::<Condition>(json!({"operator": "exact", "value": 1})))
            .is_err();
    }

    #[test]
    fn serialization_uses_wire_names() {
        let condition = Condition::new("age", Operator::GreaterThanOrEquals, 18_i64).with_kind("person");
        assert_that!(serde_json::to_value(&condition).unwrap()).is_equal_to(json!({
            "key": "age",
            "operator": "gte",
            "value": 18.0,
            "type": "person"
        }));
    }
}
