mod formatter;
mod json;

pub use formatter::*;
pub use json::{decode_record, JSONFormatter};
