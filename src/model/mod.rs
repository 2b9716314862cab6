mod builder;
mod dimension;
mod record;
mod types;

pub use builder::StarTreeRecordBuilder;
pub use dimension::{DimensionValue, OTHER, STAR};
pub use record::StarTreeRecord;
pub use types::*;
