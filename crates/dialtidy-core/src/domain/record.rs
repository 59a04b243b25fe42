use serde::{Deserialize, Serialize};

/// A stored phone number. The id is assigned by the store and never changes;
/// the value is rewritten only by a reconciliation pass or a direct update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneRecord {
    pub id: i64,
    pub value: String,
}
