use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal form of the wildcard dimension value.
pub const STAR: &str = "*";

/// Literal form of the overflow bucket dimension value.
pub const OTHER: &str = "?";

/// Value of a single dimension on a record.
///
/// `Star` stands for "any value" and is what a dimension turns into when a
/// record is relaxed or when merged records disagree on it. `Other` is the
/// catch-all bucket for values that are not materialized individually.
///
/// Strings equal to [`STAR`] or [`OTHER`] always convert into the sentinel
/// variants, so a concrete value can never spell a sentinel.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DimensionValue {
    Star,
    Other,
    Concrete(String),
}

impl DimensionValue {
    pub fn as_str(&self) -> &str {
        match self {
            DimensionValue::Star => STAR,
            DimensionValue::Other => OTHER,
            DimensionValue::Concrete(v) => v,
        }
    }

    #[inline]
    pub fn is_star(&self) -> bool {
        matches!(self, DimensionValue::Star)
    }

    #[inline]
    pub fn is_concrete(&self) -> bool {
        matches!(self, DimensionValue::Concrete(_))
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DimensionValue {
    fn from(v: &str) -> Self {
        match v {
            STAR => DimensionValue::Star,
            OTHER => DimensionValue::Other,
            _ => DimensionValue::Concrete(v.to_owned()),
        }
    }
}

impl From<String> for DimensionValue {
    fn from(v: String) -> Self {
        match v.as_str() {
            STAR => DimensionValue::Star,
            OTHER => DimensionValue::Other,
            _ => DimensionValue::Concrete(v),
        }
    }
}

impl From<&String> for DimensionValue {
    fn from(v: &String) -> Self {
        DimensionValue::from(v.as_str())
    }
}

impl From<DimensionValue> for String {
    fn from(v: DimensionValue) -> Self {
        match v {
            DimensionValue::Concrete(v) => v,
            sentinel => sentinel.as_str().to_owned(),
        }
    }
}

impl PartialEq<str> for DimensionValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for DimensionValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
