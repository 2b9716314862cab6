use nom::{
    bytes::complete::tag,
    character::complete::multispace0,
    combinator::opt,
    sequence::{delimited, preceded},
};

use super::common::{braced_entries, dimension_value, integer};
use super::result::{complete, IResult, Span};
use crate::error::Result;
use crate::model::StarTreeRecord;

/// Parses the `Display` form of a record:
///
/// `dimensions={browser=chrome, country=*};metrics={clicks=5};time=42`
///
/// The time may be left empty (`time=`) for records without a time bucket.
/// Names that aren't plain identifiers, and dimension values that hold `,`,
/// `}`, `=`, whitespace or `"`, are double-quoted with `\"` and `\\`
/// escapes: `{city="new york"}`. The literals `*` and `?` always read as the
/// wildcard and the overflow bucket.
pub fn parse_record(s: &str) -> Result<StarTreeRecord> {
    complete(record(Span::new(s)))
}

fn record(input: Span) -> IResult<StarTreeRecord> {
    let (rest, dimensions) = delimited(
        multispace0,
        preceded(tag("dimensions="), braced_entries(dimension_value, "dimensions")),
        tag(";"),
    )(input)?;

    let (rest, metrics) = preceded(tag("metrics="), braced_entries(integer, "metrics"))(rest)?;

    let (rest, time) = preceded(tag(";time="), opt(integer))(rest)?;

    Ok((
        rest,
        StarTreeRecord::new(
            dimensions.into_iter().collect(),
            metrics.into_iter().collect(),
            time,
        ),
    ))
}
