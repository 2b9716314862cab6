//! Fact records for star-tree rollup aggregation.
//!
//! A [`StarTreeRecord`] carries dimension values, integer metric values and
//! an optional time bucket. Records are immutable; new ones come out of a
//! [`StarTreeRecordBuilder`] or out of the record transformations
//! ([`StarTreeRecord::relax`], [`StarTreeRecord::alias_other`],
//! [`StarTreeRecord::copy`]). Equality and hashing look at dimensions and
//! time only, so records that differ in metrics alone group together.

pub mod error;
pub mod format;
pub mod model;
pub mod parser;

pub use error::{Error, ErrorKind, Result};
pub use model::{DimensionValue, StarTreeRecord, StarTreeRecordBuilder, OTHER, STAR};
