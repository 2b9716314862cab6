use serde::{Deserialize, Serialize};
use serde_json;

use super::formatter::Formatter;
use crate::error::{ErrorKind, Result};
use crate::model::{DimensionValues, MetricValues, StarTreeRecord, TimeBucket};

#[derive(Serialize)]
struct RecordRepr<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    dimensions: &'a DimensionValues,
    metrics: &'a MetricValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<TimeBucket>,
}

#[derive(Deserialize)]
struct OwnedRecordRepr {
    #[serde(default)]
    dimensions: DimensionValues,
    #[serde(default)]
    metrics: MetricValues,
    #[serde(default)]
    time: Option<TimeBucket>,
}

/// Renders records as single-line JSON objects:
/// `{"dimensions":{"country":"*"},"metrics":{"clicks":3},"time":42}`.
///
/// In verbose mode the time-inclusive grouping key is emitted as well.
pub struct JSONFormatter {
    verbose: bool,
}

impl JSONFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for JSONFormatter {
    fn format(&self, record: &StarTreeRecord) -> Result<Vec<u8>> {
        let repr = RecordRepr {
            key: if self.verbose {
                Some(record.key(true))
            } else {
                None
            },
            dimensions: record.dimension_values(),
            metrics: record.metric_values(),
            time: record.time(),
        };

        serde_json::to_vec(&repr)
            .map_err(|e| (ErrorKind::Encode, "JSON serialization failed", e).into())
    }
}

/// Decodes a record from the JSON shape produced by [`JSONFormatter`].
/// Missing maps decode as empty, a missing or `null` time as no time bucket,
/// and a `key` field is ignored.
pub fn decode_record(buf: &[u8]) -> Result<StarTreeRecord> {
    let repr: OwnedRecordRepr = serde_json::from_slice(buf)
        .map_err(|e| (ErrorKind::Decode, "JSON deserialization failed", e))?;

    Ok(StarTreeRecord::new(repr.dimensions, repr.metrics, repr.time))
}
