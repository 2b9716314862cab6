use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::dimension::DimensionValue;
use super::record::StarTreeRecord;
use super::types::{
    DimensionName, DimensionValues, MetricName, MetricValue, MetricValues, TimeBucket,
};
use crate::error::{Error, ErrorKind, Result};

/// Mutable staging area for a [`StarTreeRecord`].
///
/// `set_*` methods overwrite. `update_*` methods merge: dimensions collapse
/// to the wildcard on conflict, metrics are summed. A builder is not meant to
/// be shared between threads, and `build()` leaves it usable.
#[derive(Clone, Debug, Default)]
pub struct StarTreeRecordBuilder {
    dimension_values: DimensionValues,
    metric_values: MetricValues,
    time: Option<TimeBucket>,
}

impl StarTreeRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(record: &StarTreeRecord) -> Self {
        Self {
            dimension_values: record.dimension_values().clone(),
            metric_values: record.metric_values().clone(),
            time: record.time(),
        }
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

    pub fn set_dimension_value<N, V>(&mut self, name: N, value: V) -> &mut Self
    where
        N: Into<DimensionName>,
        V: Into<DimensionValue>,
    {
        self.dimension_values.insert(name.into(), value.into());
        self
    }

    pub fn set_dimension_values<I, N, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<DimensionName>,
        V: Into<DimensionValue>,
    {
        for (name, value) in values {
            self.set_dimension_value(name, value);
        }
        self
    }

    /// Merges dimension values in.
    ///
    /// A name the builder hasn't seen is inserted. A name already holding a
    /// different value collapses to [`DimensionValue::Star`]. Equal values
    /// are left alone, so merging the same record twice changes nothing.
    pub fn update_dimension_values<I, N, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<DimensionName>,
        V: Into<DimensionValue>,
    {
        for (name, value) in values {
            let name = name.into();
            let value = value.into();

            match self.dimension_values.entry(name) {
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
                Entry::Occupied(mut entry) => {
                    if !entry.get().is_star() && *entry.get() != value {
                        debug!(
                            dimension = %entry.key(),
                            current = %entry.get(),
                            incoming = %value,
                            "dimension collapsed to wildcard"
                        );
                        entry.insert(DimensionValue::Star);
                    }
                }
            }
        }
        self
    }

    pub fn set_metric_value<N>(&mut self, name: N, value: MetricValue) -> &mut Self
    where
        N: Into<MetricName>,
    {
        self.metric_values.insert(name.into(), value);
        self
    }

    pub fn set_metric_values<I, N>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (N, MetricValue)>,
        N: Into<MetricName>,
    {
        for (name, value) in values {
            self.set_metric_value(name, value);
        }
        self
    }

    /// Sums metric values into the existing ones.
    ///
    /// Every incoming metric must already be present in the builder; seed it
    /// with `set_metric_value(name, 0)` first. Sums are checked: a result
    /// outside the `i64` range is an error, never a wrap. Either failure
    /// ([`ErrorKind::UnknownMetric`], [`ErrorKind::MetricOverflow`]) rejects
    /// the whole call and no value is touched.
    pub fn update_metric_values<'a, I>(&mut self, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (&'a MetricName, &'a MetricValue)>,
    {
        let mut sums: BTreeMap<&MetricName, MetricValue> = BTreeMap::new();

        for (name, value) in values {
            let current = match sums.get(name).or_else(|| self.metric_values.get(name)) {
                Some(current) => *current,
                None => {
                    warn!(metric = %name, "merge into undeclared metric");
                    return Err(Error::with_kind(
                        ErrorKind::UnknownMetric,
                        &format!(
                            "metric '{}' is not declared in the record being merged into",
                            name
                        ),
                    ));
                }
            };

            match current.checked_add(*value) {
                Some(sum) => {
                    sums.insert(name, sum);
                }
                None => {
                    warn!(metric = %name, current, incoming = *value, "metric sum overflows");
                    return Err(Error::with_kind(
                        ErrorKind::MetricOverflow,
                        &format!("metric '{}' overflows: {} + {}", name, current, value),
                    ));
                }
            }
        }

        for (name, sum) in sums {
            if let Some(current) = self.metric_values.get_mut(name) {
                *current = sum;
            }
        }
        Ok(self)
    }

    pub fn set_time(&mut self, time: Option<TimeBucket>) -> &mut Self {
        self.time = time;
        self
    }

    /// Folds a whole record into the builder: dimensions via
    /// `update_dimension_values`, metrics via `update_metric_values`.
    ///
    /// The record must share the builder's time bucket. On error the builder
    /// is unchanged.
    pub fn merge(&mut self, record: &StarTreeRecord) -> Result<&mut Self> {
        if self.time != record.time() {
            warn!(
                current = ?self.time,
                incoming = ?record.time(),
                "merge across time buckets"
            );
            return Err(Error::with_kind(
                ErrorKind::TimeMismatch,
                &format!(
                    "cannot merge record with time {:?} into time {:?}",
                    record.time(),
                    self.time
                ),
            ));
        }

        self.update_metric_values(record.metric_values())?;
        self.update_dimension_values(
            record
                .dimension_values()
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        Ok(self)
    }

    pub fn build(&self) -> StarTreeRecord {
        StarTreeRecord::new(
            self.dimension_values.clone(),
            self.metric_values.clone(),
            self.time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::STAR;

    fn metrics(values: &[(&str, i64)]) -> MetricValues {
        values
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn test_set_overwrites() {
        let mut builder = StarTreeRecordBuilder::new();
        builder
            .set_dimension_value("a", "x")
            .set_dimension_value("a", "y")
            .set_dimension_values(vec![("b", "1"), ("b", "2")])
            .set_metric_value("m", 1)
            .set_metric_values(vec![("m", 7)])
            .set_time(Some(3))
            .set_time(Some(4));

        let record = builder.build();
        assert_eq!(record.key(true), "{a=y, b=2}@4");
        assert_eq!(record.metric_values(), &metrics(&[("m", 7)]));
    }

    #[test]
    fn test_update_dimension_values_collapses() {
        let mut builder = StarTreeRecordBuilder::new();
        builder.set_dimension_value("a", "x");

        builder.update_dimension_values(vec![("a", "x")]);
        assert_eq!(builder.dimension_values()["a"], DimensionValue::from("x"));

        builder.update_dimension_values(vec![("b", "z")]);
        assert_eq!(builder.dimension_values()["b"], DimensionValue::from("z"));

        builder.update_dimension_values(vec![("a", "y")]);
        assert_eq!(builder.dimension_values()["a"], DimensionValue::Star);
        assert_eq!(builder.dimension_values()["b"], DimensionValue::from("z"));

        // A collapsed dimension stays collapsed.
        builder.update_dimension_values(vec![("a", "x"), ("a", STAR)]);
        assert_eq!(builder.dimension_values()["a"], DimensionValue::Star);
    }

    #[test]
    fn test_update_metric_values_sums() -> Result<()> {
        let mut builder = StarTreeRecordBuilder::new();
        builder.set_metric_values(vec![("m", 5), ("n", 0)]);

        builder.update_metric_values(&metrics(&[("m", 3)]))?;
        assert_eq!(builder.metric_values(), &metrics(&[("m", 8), ("n", 0)]));

        builder
            .update_metric_values(&metrics(&[("m", -10), ("n", 2)]))?
            .update_metric_values(&metrics(&[("n", 2)]))?;
        assert_eq!(builder.metric_values(), &metrics(&[("m", -2), ("n", 4)]));
        Ok(())
    }

    #[test]
    fn test_update_metric_values_fails_fast() {
        let mut builder = StarTreeRecordBuilder::new();
        builder.set_metric_value("m", 5);

        let err = builder
            .update_metric_values(&metrics(&[("m", 1), ("unknown", 1)]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownMetric);
        assert!(err.message().contains("unknown"));

        // Nothing got summed, not even the known metric.
        assert_eq!(builder.metric_values(), &metrics(&[("m", 5)]));
    }

    #[test]
    fn test_update_metric_values_rejects_overflow() {
        #[rustfmt::skip]
        let tests = [
            (i64::MAX, 1),
            (i64::MIN, -1),
            (1, i64::MAX),
        ];

        for (current, incoming) in &tests {
            let mut builder = StarTreeRecordBuilder::new();
            builder.set_metric_values(vec![("m", *current), ("n", 0)]);

            let err = builder
                .update_metric_values(&metrics(&[("m", *incoming), ("n", 1)]))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MetricOverflow, "while adding {} to {}", incoming, current);
            assert_eq!(builder.metric_values(), &metrics(&[("m", *current), ("n", 0)]));
        }
    }

    #[test]
    fn test_update_metric_values_reaches_bounds() -> Result<()> {
        let mut builder = StarTreeRecordBuilder::new();
        builder.set_metric_values(vec![("max", i64::MAX - 1), ("min", i64::MIN + 1)]);

        builder.update_metric_values(&metrics(&[("max", 1), ("min", -1)]))?;
        assert_eq!(builder.metric_values(), &metrics(&[("max", i64::MAX), ("min", i64::MIN)]));
        Ok(())
    }

    #[test]
    fn test_update_metric_values_sums_repeated_names() -> Result<()> {
        let mut builder = StarTreeRecordBuilder::new();
        builder.set_metric_value("m", 1);

        let (m, two) = ("m".to_owned(), 2);
        builder.update_metric_values(vec![(&m, &two), (&m, &two)])?;
        assert_eq!(builder.metric_values()["m"], 5);

        let max = i64::MAX;
        let err = builder
            .update_metric_values(vec![(&m, &two), (&m, &max)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MetricOverflow);
        assert_eq!(builder.metric_values()["m"], 5);
        Ok(())
    }

    #[test]
    fn test_merge_rejects_overflow() -> Result<()> {
        let first: StarTreeRecord = "dimensions={a=x};metrics={m=9223372036854775807};time=".parse()?;
        let second: StarTreeRecord = "dimensions={a=y};metrics={m=1};time=".parse()?;

        let mut builder = StarTreeRecordBuilder::from_record(&first);
        let err = builder.merge(&second).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MetricOverflow);
        assert_eq!(builder.build().to_string(), first.to_string());
        Ok(())
    }

    #[test]
    fn test_build_keeps_builder_usable() {
        let mut builder = StarTreeRecordBuilder::new();
        builder.set_dimension_value("a", "x").set_metric_value("m", 1);

        let first = builder.build();
        builder.set_dimension_value("a", "y");
        let second = builder.build();

        assert_eq!(first.key(false), "{a=x}");
        assert_eq!(second.key(false), "{a=y}");
        assert_eq!(builder.metric_values(), &metrics(&[("m", 1)]));
    }

    #[test]
    fn test_merge_records() -> Result<()> {
        let first: StarTreeRecord = "dimensions={browser=chrome, country=us};metrics={clicks=1, views=10};time=7".parse()?;
        let second: StarTreeRecord = "dimensions={browser=firefox, country=us};metrics={clicks=2, views=20};time=7".parse()?;

        let mut builder = StarTreeRecordBuilder::from_record(&first);
        builder.merge(&second)?;

        let merged = builder.build();
        assert_eq!(
            merged.to_string(),
            "dimensions={browser=*, country=us};metrics={clicks=3, views=30};time=7"
        );
        Ok(())
    }

    #[test]
    fn test_merge_rejects_other_time_bucket() -> Result<()> {
        let first: StarTreeRecord = "dimensions={a=x};metrics={m=1};time=7".parse()?;
        let second: StarTreeRecord = "dimensions={a=y};metrics={m=1};time=8".parse()?;

        let mut builder = StarTreeRecordBuilder::from_record(&first);
        let err = builder.merge(&second).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TimeMismatch);
        assert_eq!(builder.build().to_string(), first.to_string());
        Ok(())
    }

    #[test]
    fn test_merge_rejects_unknown_metric() -> Result<()> {
        let first: StarTreeRecord = "dimensions={a=x};metrics={m=1};time=".parse()?;
        let second: StarTreeRecord = "dimensions={a=y};metrics={m=1, n=1};time=".parse()?;

        let mut builder = StarTreeRecordBuilder::from_record(&first);
        let err = builder.merge(&second).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnknownMetric);
        assert_eq!(builder.build().to_string(), first.to_string());
        Ok(())
    }
}
