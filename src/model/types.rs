use std::collections::BTreeMap;

use super::dimension::DimensionValue;

pub type DimensionName = String;

pub type MetricName = String;

pub type MetricValue = i64;

// Opaque time bucket identifier; only equality matters.
pub type TimeBucket = i64;

// Ordered maps keep key rendering and hashing independent of insertion order.
pub type DimensionValues = BTreeMap<DimensionName, DimensionValue>;

pub type MetricValues = BTreeMap<MetricName, MetricValue>;
