use crate::error::invalid_input;
use anyhow::Result;

pub fn parse_record_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| invalid_input(format!("not a record id: {}", raw)))
}
