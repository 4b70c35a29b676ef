#![cfg(test)]

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use maplit::hashmap;
use proptest::prelude::*;

use crate::condition::Condition;
use crate::properties::Properties;
use crate::property_value::PropertyValue;

pub struct TestConditions {
    conditions: HashMap<String, Condition>,
}

impl TestConditions {
    pub fn new() -> Self {
        Self {
            conditions: hashmap! {
                "ageGte18".to_string() => serde_json::from_str(r#"{
                        "key": "age",
                        "operator": "gte",
                        "value": 18,
                        "type": "person"
                    }"#).unwrap(),
                "planIsPro".to_string() => serde_json::from_str(r#"{
                        "key": "plan",
                        "operator": "exact",
                        "value": "pro",
                        "type": "person"
                    }"#).unwrap(),
                "planInPaidTiers".to_string() => serde_json::from_str(r#"{
                        "key": "plan",
                        "value": ["pro", "enterprise"],
                        "type": "person"
                    }"#).unwrap(),
                "emailAtAcme".to_string() => serde_json::from_str(r#"{
                        "key": "email",
                        "operator": "icontains",
                        "value": "@acme.com",
                        "type": "person"
                    }"#).unwrap(),
                "countryIsSet".to_string() => serde_json::from_str(r#"{
                        "key": "country",
                        "operator": "is_set",
                        "value": "is_set",
                        "type": "person"
                    }"#).unwrap(),
                "idBadRegex".to_string() => serde_json::from_str(r#"{
                        "key": "id",
                        "operator": "regex",
                        "value": "[",
                        "type": "group"
                    }"#).unwrap(),
                "signedUpBefore2024".to_string() => serde_json::from_str(r#"{
                        "key": "signed_up",
                        "operator": "is_date_before",
                        "value": "2024-01-01",
                        "type": "person"
                    }"#).unwrap(),
                "signedUpAfter2024".to_string() => serde_json::from_str(r#"{
                        "key": "signed_up",
                        "operator": "is_date_after",
                        "value": "2024-01-01T00:00:00Z",
                        "type": "person"
                    }"#).unwrap(),
                "seenInLast30Days".to_string() => serde_json::from_str(r#"{
                        "key": "last_seen",
                        "operator": "is_date_after",
                        "value": "-30d",
                        "type": "person"
                    }"#).unwrap(),
            },
        }
    }

    pub fn condition(&self, name: &str) -> Condition {
        self.conditions
            .get(name)
            .unwrap_or_else(|| panic!("no test condition named {}", name))
            .clone()
    }
}

pub fn props(values: HashMap<&str, PropertyValue>) -> Properties {
    values
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// The instant relative dates are resolved against in tests: 2024-03-31T12:00:00Z.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap()
}

pub fn ymd(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Scalars of every shape a JSON payload can deliver, biased towards values that coerce
/// between types.
pub fn arb_scalar() -> impl Strategy<Value = PropertyValue> {
    prop_oneof![
        Just(PropertyValue::Null),
        any::<bool>().prop_map(PropertyValue::Bool),
        (-1000_i64..1000).prop_map(PropertyValue::from),
        (-1e6_f64..1e6).prop_map(PropertyValue::Number),
        "[a-zA-Z0-9@. ]{0,10}".prop_map(PropertyValue::String),
        (-1000_i64..1000).prop_map(|i| PropertyValue::String(i.to_string())),
        "20[0-9]{2}-0[1-9]-[0-2][1-9]".prop_map(PropertyValue::String),
        "-[0-9]{1,3}[hdwmy]".prop_map(PropertyValue::String),
    ]
}
