//! Store abstraction for inventory entities
//!
//! The reconciler talks to storage through [`InventoryStore`]: entity-level
//! operations scoped inside a per-record transaction, plus the read
//! queries the HTTP surface needs. Two implementations:
//!
//! - [`SqliteInventoryStore`]: production, `Mutex<Connection>` with WAL,
//!   real BEGIN/COMMIT/ROLLBACK per record
//! - [`MemoryInventoryStore`]: tests, copy-on-write transaction scratch
//!   with optional failure injection

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{
    FetchWindow, PassengerType, PaxAvailability, Price, SlotAvailability, StoreOutcome,
};

// ============================================================================
// Read Types
// ============================================================================

/// A stored slot with its passenger-type lines, as served to readers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSlot {
    pub provider_slot_id: String,
    pub product_id: String,
    pub start_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub variant_id: i64,
    pub remaining: u32,
    pub currency_code: String,
    pub pax_availabilities: Vec<StoredPaxLine>,
}

/// One stored passenger-type line with its resolved type and price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPaxLine {
    pub passenger_type: PassengerType,
    pub min: u32,
    pub max: u32,
    pub remaining: u32,
    pub is_primary: bool,
    pub price: Price,
}

/// A date with one of its observed prices (per stored pax line).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatePrice {
    pub date: NaiveDate,
    pub price: Price,
}

// ============================================================================
// Store Traits
// ============================================================================

/// Entity operations available inside one record's transaction.
pub trait InventoryTx {
    /// Whether a slot with this external id exists.
    fn slot_exists(&self, provider_slot_id: &str) -> Result<bool>;

    /// Create a slot keyed by its provider id.
    fn create_slot(&self, slot: &SlotAvailability) -> Result<()>;

    /// Overwrite a slot's mutable fields (everything but id/product id).
    fn update_slot(&self, slot: &SlotAvailability) -> Result<()>;

    /// Whether a passenger type with this id exists.
    fn passenger_type_exists(&self, type_id: &str) -> Result<bool>;

    /// Create a passenger type from the first-seen line fields.
    fn create_passenger_type(&self, pax: &PaxAvailability) -> Result<()>;

    /// Find a price by exact 4-tuple match.
    fn find_price(&self, price: &Price) -> Result<Option<i64>>;

    /// Create a price row, returning its id.
    fn create_price(&self, price: &Price) -> Result<i64>;

    /// Find a pax line by its (slot, passenger type) identity.
    fn find_pax_line(&self, slot_id: &str, type_id: &str) -> Result<Option<i64>>;

    /// Create a pax line referencing slot, type and price.
    fn create_pax_line(
        &self,
        slot_id: &str,
        product_id: &str,
        pax: &PaxAvailability,
        price_id: i64,
    ) -> Result<()>;

    /// Update the only mutable pax-line fields: remaining and the price
    /// reference.
    fn update_pax_line(&self, line_id: i64, remaining: u32, price_id: i64) -> Result<()>;
}

/// Transaction body run against [`InventoryTx`].
pub type TxFn<'a> = &'a mut dyn FnMut(&dyn InventoryTx) -> Result<StoreOutcome>;

/// Durable record store for the four inventory entity kinds.
pub trait InventoryStore: Send + Sync {
    /// Run one record's reconciliation atomically. The body's changes are
    /// committed on `Ok` and fully rolled back on `Err`.
    fn with_transaction(&self, f: TxFn<'_>) -> Result<StoreOutcome>;

    /// Slots (with lines, types and prices) for one product on one day.
    fn slots_for_date(&self, product_id: &str, date: NaiveDate) -> Result<Vec<StoredSlot>>;

    /// Dates with observed prices for one product within a window, one
    /// entry per stored pax line, ordered by date.
    fn available_dates(&self, product_id: &str, window: &FetchWindow) -> Result<Vec<DatePrice>>;
}

/// Thread-safe shared store handle.
pub type SharedInventoryStore = Arc<dyn InventoryStore>;

/// Create a shared SQLite store.
pub fn create_sqlite_store(path: impl AsRef<Path>) -> Result<SharedInventoryStore> {
    let store = SqliteInventoryStore::new(path)?;
    Ok(Arc::new(store))
}

/// Create a shared in-memory store.
pub fn create_memory_store() -> SharedInventoryStore {
    Arc::new(MemoryInventoryStore::new())
}

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite implementation of [`InventoryStore`].
pub struct SqliteInventoryStore {
    conn: Mutex<Connection>,
}

impl SqliteInventoryStore {
    /// Open (or create) the database at `path`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .context("Failed to open SQLite database")
            .map_err(Error::from)?;

        // WAL for better read concurrency while a lane is writing
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite inventory store initialized");
        Ok(store)
    }

    /// Create in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("Failed to create in-memory SQLite")
            .map_err(Error::from)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS available_slots (
                id TEXT PRIMARY KEY,
                product_id TEXT NOT NULL,
                start_date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                variant_id INTEGER NOT NULL,
                remaining INTEGER NOT NULL,
                currency_code TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_slots_product_date
                ON available_slots(product_id, start_date);

            CREATE TABLE IF NOT EXISTS passenger_types (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                min_age INTEGER,
                max_age INTEGER,
                is_primary INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS prices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                original_price REAL NOT NULL,
                discount REAL NOT NULL,
                final_price REAL NOT NULL,
                currency_code TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_prices_values
                ON prices(original_price, discount, final_price, currency_code);

            CREATE TABLE IF NOT EXISTS pax_availabilities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slot_id TEXT NOT NULL REFERENCES available_slots(id),
                passenger_type_id TEXT NOT NULL REFERENCES passenger_types(id),
                price_id INTEGER NOT NULL REFERENCES prices(id),
                product_id TEXT NOT NULL,
                min INTEGER NOT NULL,
                max INTEGER NOT NULL,
                remaining INTEGER NOT NULL,
                is_primary INTEGER NOT NULL DEFAULT 0,
                UNIQUE(slot_id, passenger_type_id)
            );
            "#,
        )
        .context("Failed to create SQLite schema")
        .map_err(Error::from)?;

        Ok(())
    }

    fn read_pax_lines(conn: &Connection, slot_id: &str) -> Result<Vec<StoredPaxLine>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT pt.id, pt.name, pt.description, pt.min_age, pt.max_age, pt.is_primary,
                   pa.min, pa.max, pa.remaining, pa.is_primary,
                   p.original_price, p.discount, p.final_price, p.currency_code
            FROM pax_availabilities pa
            JOIN passenger_types pt ON pa.passenger_type_id = pt.id
            JOIN prices p ON pa.price_id = p.id
            WHERE pa.slot_id = ?1
            "#,
        )?;

        let lines = stmt
            .query_map(params![slot_id], |row| {
                Ok(StoredPaxLine {
                    passenger_type: PassengerType {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        min_age: row.get(3)?,
                        max_age: row.get(4)?,
                        is_primary: row.get(5)?,
                    },
                    min: row.get(6)?,
                    max: row.get(7)?,
                    remaining: row.get(8)?,
                    is_primary: row.get(9)?,
                    price: Price {
                        original_price: row.get(10)?,
                        discount: row.get(11)?,
                        final_price: row.get(12)?,
                        currency_code: row.get(13)?,
                    },
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(lines)
    }
}

/// Entity operations bound to one open SQLite transaction.
struct SqliteTx<'a> {
    tx: &'a Transaction<'a>,
}

impl InventoryTx for SqliteTx<'_> {
    fn slot_exists(&self, provider_slot_id: &str) -> Result<bool> {
        let exists: bool = self.tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM available_slots WHERE id = ?1)",
            params![provider_slot_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn create_slot(&self, slot: &SlotAvailability) -> Result<()> {
        self.tx.execute(
            r#"
            INSERT INTO available_slots
                (id, product_id, start_date, start_time, end_time, variant_id, remaining, currency_code, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                slot.provider_slot_id,
                slot.product_id,
                slot.start_date,
                slot.start_time,
                slot.end_time,
                slot.variant_id,
                slot.remaining,
                slot.currency_code,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn update_slot(&self, slot: &SlotAvailability) -> Result<()> {
        self.tx.execute(
            r#"
            UPDATE available_slots
            SET start_date = ?2, start_time = ?3, end_time = ?4, variant_id = ?5,
                remaining = ?6, currency_code = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
            params![
                slot.provider_slot_id,
                slot.start_date,
                slot.start_time,
                slot.end_time,
                slot.variant_id,
                slot.remaining,
                slot.currency_code,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn passenger_type_exists(&self, type_id: &str) -> Result<bool> {
        let exists: bool = self.tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM passenger_types WHERE id = ?1)",
            params![type_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn create_passenger_type(&self, pax: &PaxAvailability) -> Result<()> {
        self.tx.execute(
            "INSERT INTO passenger_types (id, name, description, min_age, max_age, is_primary)
             VALUES (?1, ?2, ?3, NULL, NULL, ?4)",
            params![pax.type_id, pax.name, pax.description, pax.is_primary],
        )?;
        Ok(())
    }

    fn find_price(&self, price: &Price) -> Result<Option<i64>> {
        let id = self
            .tx
            .query_row(
                "SELECT id FROM prices
                 WHERE original_price = ?1 AND discount = ?2 AND final_price = ?3 AND currency_code = ?4",
                params![
                    price.original_price,
                    price.discount,
                    price.final_price,
                    price.currency_code
                ],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn create_price(&self, price: &Price) -> Result<i64> {
        self.tx.execute(
            "INSERT INTO prices (original_price, discount, final_price, currency_code)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                price.original_price,
                price.discount,
                price.final_price,
                price.currency_code
            ],
        )?;
        Ok(self.tx.last_insert_rowid())
    }

    fn find_pax_line(&self, slot_id: &str, type_id: &str) -> Result<Option<i64>> {
        let id = self
            .tx
            .query_row(
                "SELECT id FROM pax_availabilities WHERE slot_id = ?1 AND passenger_type_id = ?2",
                params![slot_id, type_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn create_pax_line(
        &self,
        slot_id: &str,
        product_id: &str,
        pax: &PaxAvailability,
        price_id: i64,
    ) -> Result<()> {
        self.tx.execute(
            r#"
            INSERT INTO pax_availabilities
                (slot_id, passenger_type_id, price_id, product_id, min, max, remaining, is_primary)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                slot_id,
                pax.type_id,
                price_id,
                product_id,
                pax.min,
                pax.max,
                pax.remaining,
                pax.is_primary
            ],
        )?;
        Ok(())
    }

    fn update_pax_line(&self, line_id: i64, remaining: u32, price_id: i64) -> Result<()> {
        self.tx.execute(
            "UPDATE pax_availabilities SET remaining = ?2, price_id = ?3 WHERE id = ?1",
            params![line_id, remaining, price_id],
        )?;
        Ok(())
    }
}

impl InventoryStore for SqliteInventoryStore {
    fn with_transaction(&self, f: TxFn<'_>) -> Result<StoreOutcome> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        match f(&SqliteTx { tx: &tx }) {
            Ok(outcome) => {
                tx.commit()?;
                Ok(outcome)
            }
            Err(e) => {
                // dropping the transaction rolls it back
                drop(tx);
                Err(e)
            }
        }
    }

    fn slots_for_date(&self, product_id: &str, date: NaiveDate) -> Result<Vec<StoredSlot>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, product_id, start_date, start_time, end_time, variant_id, remaining, currency_code
             FROM available_slots
             WHERE product_id = ?1 AND start_date = ?2
             ORDER BY start_time",
        )?;

        let slots = stmt
            .query_map(params![product_id, date], |row| {
                Ok(StoredSlot {
                    provider_slot_id: row.get(0)?,
                    product_id: row.get(1)?,
                    start_date: row.get(2)?,
                    start_time: row.get(3)?,
                    end_time: row.get(4)?,
                    variant_id: row.get(5)?,
                    remaining: row.get(6)?,
                    currency_code: row.get(7)?,
                    pax_availabilities: Vec::new(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut result = Vec::with_capacity(slots.len());
        for mut slot in slots {
            slot.pax_availabilities = Self::read_pax_lines(&conn, &slot.provider_slot_id)?;
            result.push(slot);
        }

        Ok(result)
    }

    fn available_dates(&self, product_id: &str, window: &FetchWindow) -> Result<Vec<DatePrice>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT s.start_date, p.original_price, p.discount, p.final_price, p.currency_code
            FROM pax_availabilities pa
            JOIN available_slots s ON pa.slot_id = s.id
            JOIN prices p ON pa.price_id = p.id
            WHERE pa.product_id = ?1 AND s.start_date >= ?2 AND s.start_date <= ?3
            ORDER BY s.start_date
            "#,
        )?;

        let dates = stmt
            .query_map(
                params![product_id, window.start_date, window.end_date],
                |row| {
                    Ok(DatePrice {
                        date: row.get(0)?,
                        price: Price {
                            original_price: row.get(1)?,
                            discount: row.get(2)?,
                            final_price: row.get(3)?,
                            currency_code: row.get(4)?,
                        },
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(dates)
    }
}

// ============================================================================
// In-Memory Implementation (for testing)
// ============================================================================

#[derive(Debug, Clone, Default)]
struct MemoryState {
    slots: HashMap<String, SlotAvailability>,
    types: HashMap<String, PassengerType>,
    prices: Vec<Price>,
    lines: Vec<LineRow>,
    next_line_id: i64,
}

#[derive(Debug, Clone)]
struct LineRow {
    id: i64,
    slot_id: String,
    type_id: String,
    product_id: String,
    min: u32,
    max: u32,
    remaining: u32,
    is_primary: bool,
    price_id: i64,
}

/// In-memory implementation of [`InventoryStore`].
///
/// Transactions run against a cloned scratch state that only replaces the
/// real state on success, giving the same whole-record rollback semantics
/// as SQLite. Individual slots can be marked to fail, for testing
/// per-record isolation.
pub struct MemoryInventoryStore {
    state: Mutex<MemoryState>,
    fail_slots: Mutex<HashSet<String>>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            fail_slots: Mutex::new(HashSet::new()),
        }
    }

    /// Make every write touching this slot id fail (isolation tests).
    pub fn fail_on_slot(&self, provider_slot_id: &str) {
        self.fail_slots
            .lock()
            .unwrap()
            .insert(provider_slot_id.to_string());
    }

    /// Number of stored slots.
    pub fn slot_count(&self) -> usize {
        self.state.lock().unwrap().slots.len()
    }

    /// Number of distinct price rows.
    pub fn price_count(&self) -> usize {
        self.state.lock().unwrap().prices.len()
    }

    /// Number of stored pax lines.
    pub fn line_count(&self) -> usize {
        self.state.lock().unwrap().lines.len()
    }

    /// Stored passenger type by id.
    pub fn passenger_type(&self, type_id: &str) -> Option<PassengerType> {
        self.state.lock().unwrap().types.get(type_id).cloned()
    }
}

impl Default for MemoryInventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

struct MemoryTx {
    scratch: RefCell<MemoryState>,
    fail_slots: HashSet<String>,
}

impl MemoryTx {
    fn check_failure(&self, slot_id: &str) -> Result<()> {
        if self.fail_slots.contains(slot_id) {
            return Err(Error::other(format!("injected failure for slot {slot_id}")));
        }
        Ok(())
    }
}

impl InventoryTx for MemoryTx {
    fn slot_exists(&self, provider_slot_id: &str) -> Result<bool> {
        Ok(self.scratch.borrow().slots.contains_key(provider_slot_id))
    }

    fn create_slot(&self, slot: &SlotAvailability) -> Result<()> {
        self.check_failure(&slot.provider_slot_id)?;
        let mut stored = slot.clone();
        stored.pax_availability.clear();
        self.scratch
            .borrow_mut()
            .slots
            .insert(slot.provider_slot_id.clone(), stored);
        Ok(())
    }

    fn update_slot(&self, slot: &SlotAvailability) -> Result<()> {
        self.check_failure(&slot.provider_slot_id)?;
        let mut scratch = self.scratch.borrow_mut();
        if let Some(existing) = scratch.slots.get_mut(&slot.provider_slot_id) {
            existing.start_date = slot.start_date;
            existing.start_time = slot.start_time.clone();
            existing.end_time = slot.end_time.clone();
            existing.variant_id = slot.variant_id;
            existing.remaining = slot.remaining;
            existing.currency_code = slot.currency_code.clone();
        }
        Ok(())
    }

    fn passenger_type_exists(&self, type_id: &str) -> Result<bool> {
        Ok(self.scratch.borrow().types.contains_key(type_id))
    }

    fn create_passenger_type(&self, pax: &PaxAvailability) -> Result<()> {
        self.scratch.borrow_mut().types.insert(
            pax.type_id.clone(),
            PassengerType {
                id: pax.type_id.clone(),
                name: pax.name.clone(),
                description: pax.description.clone(),
                min_age: None,
                max_age: None,
                is_primary: pax.is_primary,
            },
        );
        Ok(())
    }

    fn find_price(&self, price: &Price) -> Result<Option<i64>> {
        Ok(self
            .scratch
            .borrow()
            .prices
            .iter()
            .position(|p| p == price)
            .map(|i| i as i64))
    }

    fn create_price(&self, price: &Price) -> Result<i64> {
        let mut scratch = self.scratch.borrow_mut();
        scratch.prices.push(price.clone());
        Ok((scratch.prices.len() - 1) as i64)
    }

    fn find_pax_line(&self, slot_id: &str, type_id: &str) -> Result<Option<i64>> {
        Ok(self
            .scratch
            .borrow()
            .lines
            .iter()
            .find(|l| l.slot_id == slot_id && l.type_id == type_id)
            .map(|l| l.id))
    }

    fn create_pax_line(
        &self,
        slot_id: &str,
        product_id: &str,
        pax: &PaxAvailability,
        price_id: i64,
    ) -> Result<()> {
        self.check_failure(slot_id)?;
        let mut scratch = self.scratch.borrow_mut();
        let id = scratch.next_line_id;
        scratch.next_line_id += 1;
        scratch.lines.push(LineRow {
            id,
            slot_id: slot_id.to_string(),
            type_id: pax.type_id.clone(),
            product_id: product_id.to_string(),
            min: pax.min,
            max: pax.max,
            remaining: pax.remaining,
            is_primary: pax.is_primary,
            price_id,
        });
        Ok(())
    }

    fn update_pax_line(&self, line_id: i64, remaining: u32, price_id: i64) -> Result<()> {
        let mut scratch = self.scratch.borrow_mut();
        if let Some(line) = scratch.lines.iter_mut().find(|l| l.id == line_id) {
            line.remaining = remaining;
            line.price_id = price_id;
        }
        Ok(())
    }
}

impl InventoryStore for MemoryInventoryStore {
    fn with_transaction(&self, f: TxFn<'_>) -> Result<StoreOutcome> {
        let mut state = self.state.lock().unwrap();
        let tx = MemoryTx {
            scratch: RefCell::new(state.clone()),
            fail_slots: self.fail_slots.lock().unwrap().clone(),
        };

        match f(&tx) {
            Ok(outcome) => {
                *state = tx.scratch.into_inner();
                Ok(outcome)
            }
            // scratch is discarded, nothing was applied
            Err(e) => Err(e),
        }
    }

    fn slots_for_date(&self, product_id: &str, date: NaiveDate) -> Result<Vec<StoredSlot>> {
        let state = self.state.lock().unwrap();

        let mut result = Vec::new();
        for slot in state.slots.values() {
            if slot.product_id != product_id || slot.start_date != date {
                continue;
            }

            let pax_availabilities = state
                .lines
                .iter()
                .filter(|l| l.slot_id == slot.provider_slot_id)
                .filter_map(|l| {
                    let passenger_type = state.types.get(&l.type_id)?.clone();
                    let price = state.prices.get(l.price_id as usize)?.clone();
                    Some(StoredPaxLine {
                        passenger_type,
                        min: l.min,
                        max: l.max,
                        remaining: l.remaining,
                        is_primary: l.is_primary,
                        price,
                    })
                })
                .collect();

            result.push(StoredSlot {
                provider_slot_id: slot.provider_slot_id.clone(),
                product_id: slot.product_id.clone(),
                start_date: slot.start_date,
                start_time: slot.start_time.clone(),
                end_time: slot.end_time.clone(),
                variant_id: slot.variant_id,
                remaining: slot.remaining,
                currency_code: slot.currency_code.clone(),
                pax_availabilities,
            });
        }

        result.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(result)
    }

    fn available_dates(&self, product_id: &str, window: &FetchWindow) -> Result<Vec<DatePrice>> {
        let state = self.state.lock().unwrap();

        let mut dates: Vec<DatePrice> = state
            .lines
            .iter()
            .filter(|l| l.product_id == product_id)
            .filter_map(|l| {
                let slot = state.slots.get(&l.slot_id)?;
                if slot.start_date < window.start_date || slot.start_date > window.end_date {
                    return None;
                }
                let price = state.prices.get(l.price_id as usize)?.clone();
                Some(DatePrice {
                    date: slot.start_date,
                    price,
                })
            })
            .collect();

        dates.sort_by_key(|d| d.date);
        Ok(dates)
    }
}

// ============================================================================
// Tests
// ============================================================================
