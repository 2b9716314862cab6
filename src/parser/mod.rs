mod common;
mod record;
mod result;

pub(crate) use common::{escape_dimension_value, escape_name};
pub use record::parse_record;
pub use result::{IResult, ParseError, Span};
