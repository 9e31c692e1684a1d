//! Integration tests for the SQLite store on disk
//!
//! The inline repository tests cover entity operations; these verify
//! that reconciled data survives closing and reopening the database
//! file, which is what the lanes rely on between process restarts.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::tempdir;

use slotsync::models::{FetchWindow, SlotAvailability};
use slotsync::storage::{InventoryStore, Reconciler, SqliteInventoryStore};

fn fetched_slot(id: &str, date: NaiveDate) -> SlotAvailability {
    let mut slot: SlotAvailability =
        serde_json::from_value(common::slot_json(id, date)).unwrap();
    // the pipeline tags this after deserialization
    slot.product_id = "14".to_string();
    slot
}

#[test]
fn test_reconciled_data_survives_reopen() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("inventory.db");
    let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();

    {
        let store = Arc::new(SqliteInventoryStore::new(&db_path).unwrap());
        let reconciler = Reconciler::new(store);
        let outcome =
            reconciler.store_slot_availabilities(&[fetched_slot("slot-1", date)]);
        // slot + its single pax line
        assert_eq!(outcome.saved, 2);
    }

    let reopened = SqliteInventoryStore::new(&db_path).unwrap();
    let slots = reopened.slots_for_date("14", date).unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].provider_slot_id, "slot-1");
    assert_eq!(slots[0].pax_availabilities.len(), 1);
    assert_eq!(slots[0].pax_availabilities[0].price.final_price, 45.0);
}

#[test]
fn test_reopened_store_updates_instead_of_duplicating() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("inventory.db");
    let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();

    {
        let store = Arc::new(SqliteInventoryStore::new(&db_path).unwrap());
        Reconciler::new(store).store_slot_availabilities(&[fetched_slot("slot-1", date)]);
    }

    let store = Arc::new(SqliteInventoryStore::new(&db_path).unwrap());
    let mut slot = fetched_slot("slot-1", date);
    slot.remaining = 2;
    let outcome = Reconciler::new(store.clone()).store_slot_availabilities(&[slot]);

    assert_eq!(outcome.updated, 2);
    assert_eq!(outcome.saved, 0);

    let slots = store.slots_for_date("14", date).unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].remaining, 2);

    let window = FetchWindow {
        start_date: date,
        end_date: date,
    };
    let dates = store.available_dates("14", &window).unwrap();
    assert_eq!(dates.len(), 1);
    assert_eq!(dates[0].date, date);
}
