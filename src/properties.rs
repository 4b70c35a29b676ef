use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::property_value::PropertyValue;

/// A bag of known property values for the user or group being evaluated.
pub type Properties = HashMap<String, PropertyValue>;

/// PropertySource is the interface the matcher uses to look up a subject's property values.
///
/// An absent key and a key explicitly set to [PropertyValue::Null] mean different things to the
/// matcher, so implementations must return `Some(&PropertyValue::Null)` for the latter.
pub trait PropertySource {
    /// Retrieve the value stored under `key`, if the key is present at all.
    fn property(&self, key: &str) -> Option<&PropertyValue>;
}

impl<S: BuildHasher> PropertySource for HashMap<String, PropertyValue, S> {
    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.get(key)
    }
}

impl PropertySource for BTreeMap<String, PropertyValue> {
    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.get(key)
    }
}

// An object value, e.g. a JSON payload converted with `PropertyValue::from`, acts as a property bag.
impl PropertySource for PropertyValue {
    fn property(&self, key: &str) -> Option<&PropertyValue> {
        match self {
            PropertyValue::Object(map) => map.get(key),
            _ => None,
        }
    }
}

impl<T: PropertySource + ?Sized> PropertySource for &T {
    fn property(&self, key: &str) -> Option<&PropertyValue> {
        (**self).property(key)
    }
}
