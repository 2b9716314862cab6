use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use tracing::trace;

use super::builder::StarTreeRecordBuilder;
use super::dimension::DimensionValue;
use super::types::{DimensionValues, MetricValues, TimeBucket};
use crate::error::{Error, Result};
use crate::parser::{escape_dimension_value, escape_name};

/// An immutable fact record: dimension values, metric values and an optional
/// time bucket.
///
/// Identity (`Eq`/`Hash`) covers dimensions and time only. Two records that
/// differ in metrics alone land in the same bucket, which is what lets the
/// tree builder sum them up.
#[derive(Clone, Debug)]
pub struct StarTreeRecord {
    dimension_values: DimensionValues,
    metric_values: MetricValues,
    time: Option<TimeBucket>,
    key: OnceLock<String>,
    time_key: OnceLock<String>,
}

impl StarTreeRecord {
    pub fn new(
        dimension_values: DimensionValues,
        metric_values: MetricValues,
        time: Option<TimeBucket>,
    ) -> Self {
        Self {
            dimension_values,
            metric_values,
            time,
            key: OnceLock::new(),
            time_key: OnceLock::new(),
        }
    }

    pub fn builder() -> StarTreeRecordBuilder {
        StarTreeRecordBuilder::new()
    }

    #[inline]
    pub fn dimension_values(&self) -> &DimensionValues {
        &self.dimension_values
    }

    #[inline]
    pub fn metric_values(&self) -> &MetricValues {
        &self.metric_values
    }

    #[inline]
    pub fn time(&self) -> Option<TimeBucket> {
        self.time
    }

    pub fn dimension_value(&self, name: &str) -> Option<&DimensionValue> {
        self.dimension_values.get(name)
    }

    /// Grouping key of the record.
    ///
    /// Without time the key is the rendering of the dimension values, e.g.
    /// `{browser=chrome, country=*}`. With time the bucket is appended after
    /// an `@`, e.g. `{browser=chrome, country=*}@42`; an absent bucket renders
    /// as nothing (`{browser=chrome}@`). Names and values that need it are
    /// quoted (`{city="new york"}`), so distinct dimension maps never share a
    /// key.
    ///
    /// Both keys are computed on first access and cached for the lifetime of
    /// the record. Concurrent first reads all observe the same string.
    pub fn key(&self, include_time: bool) -> &str {
        if include_time {
            self.time_key.get_or_init(|| {
                let key = format!(
                    "{}@{}",
                    render_dimensions(&self.dimension_values),
                    render_time(self.time)
                );
                trace!(key = %key, "computed record time key");
                key
            })
        } else {
            self.key.get_or_init(|| {
                let key = render_dimensions(&self.dimension_values);
                trace!(key = %key, "computed record key");
                key
            })
        }
    }

    /// Replaces the named dimensions with the wildcard.
    ///
    /// Names the record doesn't carry are ignored. Metrics and time are copied
    /// as is.
    pub fn relax<I, S>(&self, dimension_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.substitute(dimension_names, DimensionValue::Star)
    }

    pub fn relax_one(&self, dimension_name: &str) -> Self {
        self.relax(std::iter::once(dimension_name))
    }

    /// Folds the named dimensions into the overflow bucket. Same rules as
    /// [`StarTreeRecord::relax`].
    pub fn alias_other<I, S>(&self, dimension_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.substitute(dimension_names, DimensionValue::Other)
    }

    pub fn alias_other_one(&self, dimension_name: &str) -> Self {
        self.alias_other(std::iter::once(dimension_name))
    }

    pub fn copy(&self, keep_metrics: bool) -> Self {
        let mut builder = StarTreeRecordBuilder::new();
        builder
            .set_dimension_values(self.dimension_values.clone())
            .set_time(self.time);

        if keep_metrics {
            builder.set_metric_values(self.metric_values.clone());
        }

        builder.build()
    }

    fn substitute<I, S>(&self, dimension_names: I, sentinel: DimensionValue) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: HashSet<String> = dimension_names
            .into_iter()
            .map(|name| name.as_ref().to_owned())
            .collect();

        let mut builder = StarTreeRecordBuilder::new();
        for (name, value) in self.dimension_values.iter() {
            if names.contains(name) {
                builder.set_dimension_value(name.clone(), sentinel.clone());
            } else {
                builder.set_dimension_value(name.clone(), value.clone());
            }
        }

        builder
            .set_metric_values(self.metric_values.clone())
            .set_time(self.time);

        builder.build()
    }
}

impl PartialEq for StarTreeRecord {
    fn eq(&self, other: &Self) -> bool {
        self.dimension_values == other.dimension_values && self.time == other.time
    }
}

impl Eq for StarTreeRecord {}

impl Hash for StarTreeRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dimension_values.hash(state);
        self.time.hash(state);
    }
}

impl fmt::Display for StarTreeRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "dimensions={};metrics={};time={}",
            render_dimensions(&self.dimension_values),
            render_metrics(&self.metric_values),
            render_time(self.time),
        )
    }
}

impl FromStr for StarTreeRecord {
    type Err = Error;

    /// Parses the `Display` form back into a record.
    fn from_str(s: &str) -> Result<Self> {
        crate::parser::parse_record(s)
    }
}

// Names and dimension values are escaped so that distinct maps never render
// alike and the output reads back through the text parser.
fn render_map<V, F>(map: &BTreeMap<String, V>, render_value: F) -> String
where
    F: Fn(&V) -> String,
{
    let pairs: Vec<String> = map
        .iter()
        .map(|(name, value)| format!("{}={}", escape_name(name), render_value(value)))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

fn render_dimensions(values: &DimensionValues) -> String {
    render_map(values, escape_dimension_value)
}

fn render_metrics(values: &MetricValues) -> String {
    render_map(values, |v| v.to_string())
}

fn render_time(time: Option<TimeBucket>) -> String {
    time.map(|t| t.to_string()).unwrap_or_default()
}
