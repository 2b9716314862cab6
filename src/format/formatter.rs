use crate::error::Result;
use crate::model::StarTreeRecord;

pub trait Formatter {
    fn format(&self, record: &StarTreeRecord) -> Result<Vec<u8>>;
}
