use serde::{Deserialize, Serialize};

/// Tunables for a [crate::PropertyMatcher].
///
/// Deserializes from camelCase JSON; omitted fields take their defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchOptions {
    /// Compare strings case-insensitively for `exact` and `is_not`. Off by default.
    pub case_insensitive_exact: bool,
    /// Accept relative dates such as `-7d` as the expected value of `is_date_before` and
    /// `is_date_after`. On by default.
    pub relative_dates: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            case_insensitive_exact: false,
            relative_dates: true,
        }
    }
}

impl MatchOptions {
    pub fn case_insensitive_exact(mut self, enabled: bool) -> Self {
        self.case_insensitive_exact = enabled;
        self
    }

    pub fn relative_dates(mut self, enabled: bool) -> Self {
        self.relative_dates = enabled;
        self
    }
}
