use crate::domain::{normalize_number, PhoneRecord};
use serde::Serialize;
use std::cell::RefCell;
use std::convert::Infallible;

/// Persistence contract the reconciliation pass runs against. Implementations
/// must return records from `list_all` in a stable order (the SQLite store
/// orders by id) and report "no match" from `find_by_value` as `None`.
pub trait RecordStore {
    type Error;

    fn list_all(&self) -> Result<Vec<PhoneRecord>, Self::Error>;
    fn find_by_value(&self, value: &str) -> Result<Option<PhoneRecord>, Self::Error>;
    fn update_value(&self, id: i64, value: &str) -> Result<(), Self::Error>;
    fn delete_by_id(&self, id: i64) -> Result<(), Self::Error>;
}

/// What happened to a single record during a pass. Exactly one outcome is
/// produced per listed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// The value was already all digits; no store write happened.
    Unchanged { id: i64, value: String },
    /// The value was rewritten to its normalized form.
    Updated {
        id: i64,
        old_value: String,
        new_value: String,
    },
    /// Another record already held the normalized value; this one was
    /// deleted and the match kept untouched.
    Deleted {
        id: i64,
        value: String,
        kept_id: i64,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl ReconcileReport {
    pub fn scanned(&self) -> usize {
        self.outcomes.len()
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Updated { .. }))
    }

    pub fn deleted(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Deleted { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Unchanged { .. }))
    }

    fn count(&self, pred: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Runs one reconciliation pass: every stored record is normalized and then
/// updated in place, deleted as a duplicate, or left alone.
///
/// Records are visited in store order and lookups observe writes made
/// earlier in the same pass, so duplicate resolution is order dependent: a
/// record is deleted only when the store already holds its normalized value
/// as an exact string, and the surviving twin is whichever record reached
/// canonical form first. Two records that are byte-identical and already
/// canonical never collapse (neither triggers a lookup).
///
/// The first store error aborts the pass and is returned as-is; records
/// after the failure point are not visited.
pub fn reconcile<S: RecordStore>(store: &S) -> Result<ReconcileReport, S::Error> {
    let mut report = ReconcileReport::default();

    for record in store.list_all()? {
        let normalized = normalize_number(&record.value);
        if normalized == record.value {
            report.outcomes.push(RecordOutcome::Unchanged {
                id: record.id,
                value: record.value,
            });
            continue;
        }

        match store.find_by_value(&normalized)? {
            Some(existing) => {
                store.delete_by_id(record.id)?;
                report.outcomes.push(RecordOutcome::Deleted {
                    id: record.id,
                    value: record.value,
                    kept_id: existing.id,
                });
            }
            None => {
                store.update_value(record.id, &normalized)?;
                report.outcomes.push(RecordOutcome::Updated {
                    id: record.id,
                    old_value: record.value,
                    new_value: normalized,
                });
            }
        }
    }

    Ok(report)
}

/// Infallible in-memory store. Backs the core tests and the CLI's dry-run
/// mode, which snapshots the real store into one of these and reconciles
/// the copy.
#[derive(Debug)]
pub struct MemoryStore {
    records: RefCell<Vec<PhoneRecord>>,
    next_id: RefCell<i64>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RefCell::new(Vec::new()),
            next_id: RefCell::new(1),
        }
    }

    /// Builds a store holding the given records verbatim. Ids are taken
    /// as-is; later inserts continue above the highest one.
    pub fn from_records(records: Vec<PhoneRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            records: RefCell::new(records),
            next_id: RefCell::new(next_id),
        }
    }

    pub fn insert(&self, value: &str) -> PhoneRecord {
        let mut next_id = self.next_id.borrow_mut();
        let record = PhoneRecord {
            id: *next_id,
            value: value.to_string(),
        };
        *next_id += 1;
        self.records.borrow_mut().push(record.clone());
        record
    }

    pub fn records(&self) -> Vec<PhoneRecord> {
        self.records.borrow().clone()
    }
}

impl RecordStore for MemoryStore {
    type Error = Infallible;

    fn list_all(&self) -> Result<Vec<PhoneRecord>, Infallible> {
        Ok(self.records.borrow().clone())
    }

    fn find_by_value(&self, value: &str) -> Result<Option<PhoneRecord>, Infallible> {
        Ok(self
            .records
            .borrow()
            .iter()
            .find(|r| r.value == value)
            .cloned())
    }

    fn update_value(&self, id: i64, value: &str) -> Result<(), Infallible> {
        let mut records = self.records.borrow_mut();
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            record.value = value.to_string();
        }
        Ok(())
    }

    fn delete_by_id(&self, id: i64) -> Result<(), Infallible> {
        self.records.borrow_mut().retain(|r| r.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{reconcile, MemoryStore, RecordOutcome, RecordStore};
    use crate::domain::PhoneRecord;
    use std::cell::Cell;

    fn store_with(values: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        for value in values {
            store.insert(value);
        }
        store
    }

    #[test]
    fn canonical_twin_wins_over_later_formatted_record() {
        let store = store_with(&["1234567890", "123-456-7890"]);
        let report = reconcile(&store).unwrap();

        assert_eq!(
            report.outcomes,
            vec![
                RecordOutcome::Unchanged {
                    id: 1,
                    value: "1234567890".to_string(),
                },
                RecordOutcome::Deleted {
                    id: 2,
                    value: "123-456-7890".to_string(),
                    kept_id: 1,
                },
            ]
        );
        let survivors = store.records();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].id, 1);
        assert_eq!(survivors[0].value, "1234567890");
    }

    #[test]
    fn first_formatted_twin_is_rewritten_then_matched_by_the_second() {
        let store = store_with(&["(123) 456-7892", "(123)456-7892"]);
        let report = reconcile(&store).unwrap();

        assert_eq!(
            report.outcomes,
            vec![
                RecordOutcome::Updated {
                    id: 1,
                    old_value: "(123) 456-7892".to_string(),
                    new_value: "1234567892".to_string(),
                },
                RecordOutcome::Deleted {
                    id: 2,
                    value: "(123)456-7892".to_string(),
                    kept_id: 1,
                },
            ]
        );
        let survivors = store.records();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].value, "1234567892");
    }

    #[test]
    fn canonical_input_is_a_no_op() {
        let store = store_with(&["1234567891"]);
        let report = reconcile(&store).unwrap();

        assert_eq!(report.scanned(), 1);
        assert_eq!(report.unchanged(), 1);
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.records()[0].value, "1234567891");
    }

    #[test]
    fn sample_data_collapses_to_distinct_numbers() {
        let store = store_with(&[
            "1234567890",
            "123 456 7891",
            "(123) 456 7892",
            "(123) 456-7893",
            "123-456-7894",
            "123-456-7890",
            "1234567892",
            "(123)456-7892",
        ]);
        let report = reconcile(&store).unwrap();

        assert_eq!(report.scanned(), 8);
        assert_eq!(report.deleted(), 3);
        let mut values: Vec<String> = store.records().into_iter().map(|r| r.value).collect();
        values.sort();
        assert_eq!(
            values,
            vec![
                "1234567890",
                "1234567891",
                "1234567892",
                "1234567893",
                "1234567894",
            ]
        );
    }

    #[test]
    fn every_record_gets_exactly_one_outcome() {
        let store = store_with(&["12 34", "1234", "(56) 78", "no digits here 9"]);
        let listed = store.records().len();
        let report = reconcile(&store).unwrap();
        assert_eq!(report.outcomes.len(), listed);
        assert_eq!(
            report.unchanged() + report.updated() + report.deleted(),
            listed
        );
    }

    #[test]
    fn surviving_values_are_distinct_after_a_pass() {
        let store = store_with(&[
            "555-0000",
            "5550000",
            "(555) 00 00",
            "555 1111",
            "5551111",
        ]);
        reconcile(&store).unwrap();

        let mut values: Vec<String> = store.records().into_iter().map(|r| r.value).collect();
        values.sort();
        values.dedup();
        assert_eq!(values.len(), store.records().len());
    }

    /// Store whose `find_by_value` fails after a configurable number of
    /// calls, for exercising the fail-fast path.
    struct FailingStore {
        inner: MemoryStore,
        lookups_before_failure: Cell<usize>,
        writes: Cell<usize>,
    }

    #[derive(Debug, PartialEq, Eq)]
    struct LookupFailed;

    impl RecordStore for FailingStore {
        type Error = LookupFailed;

        fn list_all(&self) -> Result<Vec<PhoneRecord>, LookupFailed> {
            Ok(self.inner.list_all().unwrap())
        }

        fn find_by_value(&self, value: &str) -> Result<Option<PhoneRecord>, LookupFailed> {
            if self.lookups_before_failure.get() == 0 {
                return Err(LookupFailed);
            }
            self.lookups_before_failure
                .set(self.lookups_before_failure.get() - 1);
            Ok(self.inner.find_by_value(value).unwrap())
        }

        fn update_value(&self, id: i64, value: &str) -> Result<(), LookupFailed> {
            self.writes.set(self.writes.get() + 1);
            self.inner.update_value(id, value).unwrap();
            Ok(())
        }

        fn delete_by_id(&self, id: i64) -> Result<(), LookupFailed> {
            self.writes.set(self.writes.get() + 1);
            self.inner.delete_by_id(id).unwrap();
            Ok(())
        }
    }

    #[test]
    fn first_lookup_error_halts_the_pass() {
        let store = FailingStore {
            inner: store_with(&["555-0000", "555-1111", "555-2222"]),
            lookups_before_failure: Cell::new(0),
            writes: Cell::new(0),
        };

        let err = reconcile(&store).unwrap_err();
        assert_eq!(err, LookupFailed);
        assert_eq!(store.writes.get(), 0);
        assert_eq!(store.inner.records().len(), 3);
    }

    #[test]
    fn error_mid_pass_leaves_earlier_writes_in_place() {
        let store = FailingStore {
            inner: store_with(&["555-0000", "555-1111", "555-2222"]),
            lookups_before_failure: Cell::new(1),
            writes: Cell::new(0),
        };

        assert!(reconcile(&store).is_err());
        assert_eq!(store.writes.get(), 1);
        let records = store.inner.records();
        assert_eq!(records[0].value, "5550000");
        assert_eq!(records[1].value, "555-1111");
        assert_eq!(records[2].value, "555-2222");
    }
}
