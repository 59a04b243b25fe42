pub mod phone;
pub mod record;

pub use phone::{normalize_number, validate_raw_number};
pub use record::PhoneRecord;
