use crate::error::{Result, StoreError};
use dialtidy_core::domain::{validate_raw_number, PhoneRecord};
use dialtidy_core::reconcile::RecordStore;
use rusqlite::{Connection, Row};

pub struct PhonesRepo<'a> {
    conn: &'a Connection,
}

impl<'a> PhonesRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Inserts a raw value and returns the stored record. The value is
    /// validated but stored verbatim; normalization is the reconcile
    /// pass's job.
    pub fn insert(&self, value: &str) -> Result<PhoneRecord> {
        validate_raw_number(value)?;
        let id: i64 = self.conn.query_row(
            "INSERT INTO phone_numbers (value) VALUES (?1) RETURNING id;",
            [value],
            |row| row.get(0),
        )?;
        Ok(PhoneRecord {
            id,
            value: value.to_string(),
        })
    }

    pub fn get(&self, id: i64) -> Result<Option<PhoneRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, value FROM phone_numbers WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(record_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// All records in insertion order. The reconcile pass depends on this
    /// ordering being stable.
    pub fn list_all(&self) -> Result<Vec<PhoneRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, value FROM phone_numbers ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(record_from_row(row)?);
        }
        Ok(records)
    }

    /// Exact string match against stored values, lowest id wins. Values are
    /// not normalized before comparison.
    pub fn find_by_value(&self, value: &str) -> Result<Option<PhoneRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, value FROM phone_numbers WHERE value = ?1 ORDER BY id ASC LIMIT 1;",
        )?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            Ok(Some(record_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn update_value(&self, id: i64, value: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE phone_numbers SET value = ?2 WHERE id = ?1;",
            rusqlite::params![id, value],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("phone record {}", id)));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM phone_numbers WHERE id = ?1;", [id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("phone record {}", id)));
        }
        Ok(())
    }

    /// Removes every record and resets the id sequence, so a reseeded
    /// table starts from id 1 again.
    pub fn delete_all(&self) -> Result<usize> {
        let deleted = self.conn.execute("DELETE FROM phone_numbers;", [])?;
        self.conn.execute(
            "DELETE FROM sqlite_sequence WHERE name = 'phone_numbers';",
            [],
        )?;
        Ok(deleted)
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM phone_numbers;", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl RecordStore for PhonesRepo<'_> {
    type Error = StoreError;

    fn list_all(&self) -> Result<Vec<PhoneRecord>> {
        self.list_all()
    }

    fn find_by_value(&self, value: &str) -> Result<Option<PhoneRecord>> {
        self.find_by_value(value)
    }

    fn update_value(&self, id: i64, value: &str) -> Result<()> {
        self.update_value(id, value)
    }

    fn delete_by_id(&self, id: i64) -> Result<()> {
        self.delete(id)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PhoneRecord> {
    Ok(PhoneRecord {
        id: row.get(0)?,
        value: row.get(1)?,
    })
}
